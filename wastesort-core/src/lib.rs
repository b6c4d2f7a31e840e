//! WasteSort Core - waste image classification engine
//!
//! Preprocess → classify → route to a bin → count → export, plus a
//! standalone document ingestion chain.

pub mod constants;
pub mod error;
pub mod logic;

pub use error::{ClassifierError, DecodeError, ExportError, PipelineError};
pub use logic::labels::ClassLabel;
pub use logic::model::{load_classifier, ChannelOrder, Classifier, ModelConfig, Preprocessor};
pub use logic::pipeline::{Classification, WastePipeline};
pub use logic::report::{ChartExport, ReportPaths, ReportSet};
pub use logic::router::{route, Disposition};
pub use logic::tally::{TallySnapshot, TallyStore, TallySummary};
