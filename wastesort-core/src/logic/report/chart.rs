//! Bar chart of the tally, drawn with plotters and encoded to PNG.
//!
//! Category on x (snapshot order), count on y, with the chart title and
//! both axis descriptions rendered into the image.

use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use thiserror::Error;

use crate::constants::CHART_TITLE;
use crate::logic::tally::TallySnapshot;

pub const WIDTH: u32 = 600;
pub const HEIGHT: u32 = 400;

pub const X_AXIS_LABEL: &str = "Category";
pub const Y_AXIS_LABEL: &str = "Count";

/// Family name the bundled font is registered under
const FONT: &str = "DejaVu Sans";
static FONT_BYTES: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSans.ttf");

const BAR: RGBColor = RGBColor(0, 128, 0);

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("font unavailable: {0}")]
    Font(String),

    #[error("drawing failed: {0}")]
    Draw(String),

    #[error(transparent)]
    Encode(#[from] image::ImageError),
}

fn draw_err(err: impl std::fmt::Display) -> ChartError {
    ChartError::Draw(err.to_string())
}

/// Rasterize the chart. `None` for an empty snapshot.
pub fn render(snapshot: &TallySnapshot) -> Result<Option<RgbImage>, ChartError> {
    if snapshot.is_empty() {
        return Ok(None);
    }

    register_font(FONT, FontStyle::Normal, FONT_BYTES)
        .map_err(|_| ChartError::Font(FONT.to_string()))?;

    let labels: Vec<&'static str> = snapshot.iter().map(|(label, _)| label.as_str()).collect();
    let max = snapshot.max_count().max(1);
    // Headroom above the tallest bar
    let y_top = max + max / 10 + 1;

    let mut buf = vec![0u8; WIDTH as usize * HEIGHT as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(CHART_TITLE, (FONT, 20))
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(50)
            .build_cartesian_2d((0..labels.len()).into_segmented(), 0u64..y_top)
            .map_err(draw_err)?;

        let tick = |value: &SegmentValue<usize>| match value {
            SegmentValue::CenterOf(i) => labels.get(*i).map(|s| s.to_string()).unwrap_or_default(),
            _ => String::new(),
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&tick)
            .x_desc(X_AXIS_LABEL)
            .y_desc(Y_AXIS_LABEL)
            .label_style((FONT, 11))
            .axis_desc_style((FONT, 14))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(snapshot.iter().enumerate().map(|(i, (_, count))| {
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(i), 0), (SegmentValue::Exact(i + 1), count)],
                    BAR.filled(),
                );
                bar.set_margin(0, 0, 8, 8);
                bar
            }))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    RgbImage::from_raw(WIDTH, HEIGHT, buf)
        .map(Some)
        .ok_or_else(|| ChartError::Draw("pixel buffer has the wrong size".to_string()))
}

/// Encode to PNG bytes
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, ChartError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
