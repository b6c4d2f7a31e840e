//! Error taxonomy for the classify → tally → export pipeline

use std::path::PathBuf;

/// Upload could not be turned into a tensor
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to build tensor: {0}")]
    Shape(String),
}

/// Model load or invocation failure
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier model is not loaded")]
    NotLoaded,

    #[error("inference failed: {0}")]
    Runtime(String),

    #[error("classifier returned {actual} scores, expected {expected}")]
    OutputShape { expected: usize, actual: usize },

    #[error("preprocessor resizes to {configured}px but classifier expects {model}px")]
    InputSizeMismatch { configured: u32, model: u32 },
}

/// Report could not be written
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render {path}: {message}")]
    Render { path: PathBuf, message: String },
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io { path: path.into(), source }
    }
}

/// Any failure along one classification request
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
