//! PDF tally report
//!
//! A minimal single-font PDF 1.4 writer: A4 pages, Helvetica, one text
//! cell per line. Enough for a tabular summary, nothing more.

use std::fmt::Write as _;

use crate::constants::REPORT_TITLE;
use crate::logic::tally::TallySnapshot;
use super::text::summary_lines;

// ============================================================================
// PAGE GEOMETRY (points)
// ============================================================================

const MM: f32 = 72.0 / 25.4;
const PAGE_WIDTH: f32 = 210.0 * MM;
const PAGE_HEIGHT: f32 = 297.0 * MM;
const MARGIN: f32 = 10.0 * MM;
const LINE_HEIGHT: f32 = 10.0 * MM;

/// Rough Helvetica advance width per character, in em
const AVG_CHAR_WIDTH_EM: f32 = 0.52;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Accumulates text cells and lays them out top to bottom
#[derive(Debug)]
pub struct PdfDocument {
    pages: Vec<String>,
    cursor_y: f32,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    pub fn new() -> Self {
        Self {
            pages: vec![String::new()],
            cursor_y: PAGE_HEIGHT - MARGIN,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// One line of text in a full-width cell, then move down
    pub fn line(&mut self, text: &str, font_size: f32, align: Align) {
        if self.cursor_y - LINE_HEIGHT < MARGIN {
            self.pages.push(String::new());
            self.cursor_y = PAGE_HEIGHT - MARGIN;
        }

        let x = match align {
            Align::Left => MARGIN,
            Align::Center => {
                let width = text.chars().count() as f32 * font_size * AVG_CHAR_WIDTH_EM;
                ((PAGE_WIDTH - width) / 2.0).max(MARGIN)
            }
        };
        // Baseline sits slightly below the vertical centre of the cell
        let baseline = self.cursor_y - LINE_HEIGHT / 2.0 - font_size * 0.3;

        if let Some(page) = self.pages.last_mut() {
            let _ = writeln!(
                page,
                "BT /F1 {:.0} Tf {:.2} {:.2} Td ({}) Tj ET",
                font_size,
                x,
                baseline,
                escape(text)
            );
        }

        self.cursor_y -= LINE_HEIGHT;
    }

    /// Vertical gap
    pub fn skip(&mut self, height: f32) {
        self.cursor_y -= height;
    }

    /// Serialize to a complete PDF file
    pub fn to_bytes(&self) -> Vec<u8> {
        // 1 catalog, 2 page tree, 3 font, then (page, content) pairs
        let page_obj = |i: usize| 4 + 2 * i;
        let mut objects: Vec<String> = Vec::with_capacity(3 + 2 * self.pages.len());

        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());

        let kids = (0..self.pages.len())
            .map(|i| format!("{} 0 R", page_obj(i)))
            .collect::<Vec<_>>()
            .join(" ");
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            self.pages.len()
        ));

        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );

        for (i, content) in self.pages.iter().enumerate() {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH,
                PAGE_HEIGHT,
                page_obj(i) + 1
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ));
        }

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            let _ = write!(out, "{} 0 obj\n{}\nendobj\n", i + 1, body);
        }

        let xref_offset = out.len();
        let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = write!(out, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        );

        out.into_bytes()
    }
}

/// PDF string literal escaping. Non-ASCII falls back to `?`.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Title, total and per-category lines
pub fn render(snapshot: &TallySnapshot) -> Vec<u8> {
    let mut doc = PdfDocument::new();
    doc.line(REPORT_TITLE, 14.0, Align::Center);
    doc.skip(LINE_HEIGHT);
    for line in summary_lines(snapshot) {
        doc.line(&line, 12.0, Align::Left);
    }
    doc.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_special_chars() {
        assert_eq!(escape("a(b)c\\d"), "a\\(b\\)c\\\\d");
        assert_eq!(escape("brown-glass: 3"), "brown-glass: 3");
        assert_eq!(escape("♻"), "?");
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let mut doc = PdfDocument::new();
        doc.line("hello", 12.0, Align::Left);
        let bytes = doc.to_bytes();
        let text = String::from_utf8(bytes).unwrap();

        let startxref: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(text[startxref..].starts_with("xref"));

        let first_entry = text[startxref..].lines().nth(3).unwrap();
        let offset: usize = first_entry[..10].parse().unwrap();
        assert!(text[offset..].starts_with("1 0 obj"));
    }

    #[test]
    fn test_long_reports_paginate() {
        let mut doc = PdfDocument::new();
        for i in 0..60 {
            doc.line(&format!("line {}", i), 12.0, Align::Left);
        }
        assert!(doc.page_count() > 1);

        let text = String::from_utf8(doc.to_bytes()).unwrap();
        assert!(text.contains(&format!("/Count {}", doc.page_count())));
    }
}
