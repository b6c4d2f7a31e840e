//! Classification Pipeline
//!
//! One instance per process. Owns the tally and the report set and is
//! shared (behind an `Arc`) with every request handler.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::error::{ClassifierError, ExportError, PipelineError};
use super::model::{Classifier, PredictionResult, Preprocessor};
use super::report::{ChartExport, ReportSet};
use super::router::{route, Disposition};
use super::tally::{TallySnapshot, TallyStore};

/// Outcome of one successfully classified upload
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub prediction: PredictionResult,
    pub disposition: Disposition,
}

pub struct WastePipeline {
    classifier: Arc<dyn Classifier>,
    preprocessor: Preprocessor,
    tally: TallyStore,
    reports: ReportSet,
}

impl WastePipeline {
    /// Wire the pipeline together.
    ///
    /// Fails when the preprocessor would feed the classifier a different
    /// resolution than it was trained on.
    pub fn new(
        classifier: Arc<dyn Classifier>,
        preprocessor: Preprocessor,
        reports: ReportSet,
    ) -> Result<Self, ClassifierError> {
        if classifier.input_size() != preprocessor.size() {
            return Err(ClassifierError::InputSizeMismatch {
                configured: preprocessor.size(),
                model: classifier.input_size(),
            });
        }

        Ok(Self {
            classifier,
            preprocessor,
            tally: TallyStore::new(),
            reports,
        })
    }

    /// Preprocess → classify → route → tally → refresh the CSV report.
    ///
    /// The tally only moves when classification succeeds. A failing CSV
    /// refresh is logged but does not undo or fail the classification.
    pub fn classify_file(&self, path: &Path) -> Result<Classification, PipelineError> {
        let input = self.preprocessor.preprocess(path)?;

        let start = Instant::now();
        let scores = self.classifier.predict(&input.batch)?;
        let elapsed_us = start.elapsed().as_micros() as u64;

        let prediction = PredictionResult::from_scores(&scores, elapsed_us)?;
        let disposition = route(prediction.label);

        self.tally.increment(prediction.label);

        log::info!(
            "Classified {} as {} ({}) -> {} in {}us",
            path.display(),
            prediction.label,
            prediction.confidence_percent(),
            disposition,
            elapsed_us
        );

        if let Err(e) = self.reports.write_csv(&self.tally) {
            log::warn!("CSV report not refreshed: {}", e);
        }

        Ok(Classification {
            prediction,
            disposition,
        })
    }

    pub fn snapshot(&self) -> TallySnapshot {
        self.tally.snapshot()
    }

    pub fn tally(&self) -> &TallyStore {
        &self.tally
    }

    pub fn reports(&self) -> &ReportSet {
        &self.reports
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn export_csv(&self) -> Result<&Path, ExportError> {
        self.reports.write_csv(&self.tally)
    }

    pub fn export_pdf(&self) -> Result<&Path, ExportError> {
        self.reports.write_pdf(&self.tally)
    }

    pub fn export_chart(&self) -> Result<ChartExport, ExportError> {
        self.reports.write_chart(&self.tally)
    }
}
