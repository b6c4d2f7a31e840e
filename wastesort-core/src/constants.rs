//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! The server reads environment overrides on top of these.

/// Side length of the square input the classifier was trained on.
///
/// Must match the exported model. The pipeline refuses to start when the
/// classifier declares a different size.
pub const DEFAULT_IMG_SIZE: u32 = 128;

/// Default location of the exported classifier
pub const DEFAULT_MODEL_PATH: &str = "model/mobilenetv2_garbage_best.onnx";

/// Text/CSV tally report
pub const DEFAULT_CSV_REPORT_PATH: &str = "waste_log.csv";

/// PDF tally report
pub const DEFAULT_PDF_REPORT_PATH: &str = "waste_report.pdf";

/// Bar chart rendered for the stats page
pub const DEFAULT_CHART_PATH: &str = "static/stats_chart.png";

/// Static assets root served by the web frontend
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Where uploaded images are stored
pub const DEFAULT_UPLOAD_DIR: &str = "static/uploads";

/// Title line shared by every report format
pub const REPORT_TITLE: &str = "Waste Classification Report";

/// Chart title, drawn into the PNG and used as the stats page heading
pub const CHART_TITLE: &str = "Waste Classification Statistics";

// ============================================
// Document ingestion defaults
// ============================================

/// Default directory for a persisted vector index
pub const DEFAULT_INDEX_DIR: &str = "data/faiss_index";

/// Default maximum chunk length (characters)
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default characters shared between neighbouring chunks
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
