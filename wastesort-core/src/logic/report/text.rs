//! Plain-text / CSV tally report

use crate::constants::REPORT_TITLE;
use crate::logic::tally::TallySnapshot;

/// Total line plus one line per category, in snapshot order
pub fn summary_lines(snapshot: &TallySnapshot) -> Vec<String> {
    let mut lines = Vec::with_capacity(snapshot.len() + 1);
    lines.push(format!("Total Items Processed: {}", snapshot.total()));
    for (label, count) in snapshot.iter() {
        lines.push(format!("{}: {}", label, count));
    }
    lines
}

/// Render the full report. Deterministic for a given snapshot.
pub fn render(snapshot: &TallySnapshot) -> String {
    let mut out = String::new();
    out.push_str(REPORT_TITLE);
    out.push('\n');
    for line in summary_lines(snapshot) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
