//! Report Module - read-only views over the tally
//!
//! Three artifacts at fixed paths (text/CSV, PDF, chart PNG). Each is
//! fully regenerated from a snapshot and atomically replaced.
//! Snapshot + write for one artifact is a single critical section, so a
//! later write never carries an older snapshot than an earlier one.

pub mod chart;
pub mod pdf;
pub mod text;
pub mod writer;


use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::constants::{DEFAULT_CHART_PATH, DEFAULT_CSV_REPORT_PATH, DEFAULT_PDF_REPORT_PATH};
use crate::error::ExportError;
use crate::logic::tally::{TallySnapshot, TallyStore};
use writer::atomic_write;

/// Where each artifact lives
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub pdf: PathBuf,
    pub chart: PathBuf,
}

impl Default for ReportPaths {
    fn default() -> Self {
        Self {
            csv: PathBuf::from(DEFAULT_CSV_REPORT_PATH),
            pdf: PathBuf::from(DEFAULT_PDF_REPORT_PATH),
            chart: PathBuf::from(DEFAULT_CHART_PATH),
        }
    }
}

/// Result of a chart refresh
#[derive(Debug, Clone)]
pub struct ChartExport {
    pub snapshot: TallySnapshot,
    /// `None` when the snapshot was empty and nothing was written
    pub path: Option<PathBuf>,
}

#[derive(Debug)]
pub struct ReportSet {
    paths: ReportPaths,
    csv_lock: Mutex<()>,
    pdf_lock: Mutex<()>,
    chart_lock: Mutex<()>,
}

impl ReportSet {
    pub fn new(paths: ReportPaths) -> Self {
        Self {
            paths,
            csv_lock: Mutex::new(()),
            pdf_lock: Mutex::new(()),
            chart_lock: Mutex::new(()),
        }
    }

    pub fn paths(&self) -> &ReportPaths {
        &self.paths
    }

    /// Regenerate the text/CSV report
    pub fn write_csv(&self, tally: &TallyStore) -> Result<&Path, ExportError> {
        let _guard = self.csv_lock.lock();
        let snapshot = tally.snapshot();
        atomic_write(&self.paths.csv, text::render(&snapshot).as_bytes())?;
        log::debug!("CSV report updated ({} items)", snapshot.total());
        Ok(&self.paths.csv)
    }

    /// Regenerate the PDF report
    pub fn write_pdf(&self, tally: &TallyStore) -> Result<&Path, ExportError> {
        let _guard = self.pdf_lock.lock();
        let snapshot = tally.snapshot();
        atomic_write(&self.paths.pdf, &pdf::render(&snapshot))?;
        log::info!("PDF report generated: {}", self.paths.pdf.display());
        Ok(&self.paths.pdf)
    }

    /// Regenerate the chart. Writes nothing while the tally is empty.
    ///
    /// Returns the snapshot the chart was drawn from.
    pub fn write_chart(&self, tally: &TallyStore) -> Result<ChartExport, ExportError> {
        let _guard = self.chart_lock.lock();
        let snapshot = tally.snapshot();

        let render_err = |e: chart::ChartError| ExportError::Render {
            path: self.paths.chart.clone(),
            message: e.to_string(),
        };
        let Some(img) = chart::render(&snapshot).map_err(render_err)? else {
            return Ok(ChartExport { snapshot, path: None });
        };

        let bytes = chart::encode_png(&img).map_err(render_err)?;
        atomic_write(&self.paths.chart, &bytes)?;
        Ok(ChartExport {
            snapshot,
            path: Some(self.paths.chart.clone()),
        })
    }
}
