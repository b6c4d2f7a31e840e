//! HTML views

use axum::http::StatusCode;
use wastesort_core::constants::{APP_VERSION, CHART_TITLE};
use wastesort_core::{route, Classification, TallySnapshot};

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:720px;margin:2rem auto;padding:0 1rem;color:#1f2937}\
nav a{margin-right:1rem}\
table{border-collapse:collapse;width:100%}\
td,th{border-bottom:1px solid #e5e7eb;padding:.4rem;text-align:left}\
.badge{display:inline-block;padding:.2rem .6rem;border-radius:.4rem;color:#fff}\
img.upload{max-width:320px;border-radius:.4rem}\
img.chart{max-width:100%}\
.error{color:#b91c1c}";

/// Minimal escaping for text and attribute values
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <nav><a href=\"/\">Classify</a><a href=\"/stats\">Statistics</a>\
         <a href=\"/download_csv\">CSV report</a><a href=\"/download_pdf\">PDF report</a></nav>\n\
         {body}\n<footer><small>WasteSort v{APP_VERSION}</small></footer>\n</body>\n</html>\n",
        title = escape(title),
    )
}

pub fn index_page() -> String {
    layout(
        "Waste Classifier",
        "<h1>Waste Classifier</h1>\n\
         <p>Upload a photo of an item to find out which bin it belongs in.</p>\n\
         <form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\" accept=\"image/*\" required>\n\
         <button type=\"submit\">Classify</button>\n\
         </form>",
    )
}

pub fn result_page(image_url: Option<&str>, filename: &str, result: &Classification) -> String {
    let image = match image_url {
        Some(url) => format!(
            "<img class=\"upload\" src=\"{}\" alt=\"{}\">\n",
            escape(url),
            escape(filename)
        ),
        None => String::new(),
    };
    let disposition = result.disposition;

    let body = format!(
        "<h1>Result</h1>\n{image}\
         <p>Category: <strong>{label}</strong></p>\n\
         <p>Confidence: <strong>{confidence}</strong></p>\n\
         <p>Bin: <span class=\"badge\" style=\"background:{color}\">{bin} {icon}</span></p>\n\
         <p><a href=\"/\">Classify another item</a></p>",
        label = escape(result.prediction.label.as_str()),
        confidence = escape(&result.prediction.confidence_percent()),
        color = disposition.color(),
        bin = disposition.as_str(),
        icon = disposition.icon(),
    );
    layout("Classification Result", &body)
}

pub fn stats_page(snapshot: &TallySnapshot, chart_url: Option<&str>) -> String {
    let mut body = format!(
        "<h1>{}</h1>\n<p>Total Items Processed: <strong>{}</strong></p>\n",
        escape(CHART_TITLE),
        snapshot.total()
    );

    if snapshot.is_empty() {
        body.push_str("<p>No items classified yet.</p>");
        return layout(CHART_TITLE, &body);
    }

    body.push_str("<table>\n<tr><th>Category</th><th>Count</th><th>Bin</th></tr>\n");
    for (label, count) in snapshot.iter() {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(label.as_str()),
            count,
            route(label)
        ));
    }
    body.push_str("</table>\n");

    if let Some(url) = chart_url {
        body.push_str(&format!(
            "<p><img class=\"chart\" src=\"{}\" alt=\"{}\"></p>",
            escape(url),
            escape(CHART_TITLE)
        ));
    }
    layout(CHART_TITLE, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        "<h1>Something went wrong</h1>\n<p class=\"error\">{}</p>\n\
         <p><small>HTTP {}</small></p>\n<p><a href=\"/\">Back</a></p>",
        escape(message),
        status.as_u16()
    );
    layout("Error", &body)
}
