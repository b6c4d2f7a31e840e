//! Error handling

use std::path::PathBuf;

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use wastesort_core::{ClassifierError, DecodeError, ExportError, PipelineError};

use crate::views;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No file field, empty filename or empty body
    #[error("no file uploaded")]
    MissingUpload,

    #[error("invalid upload: {0}")]
    BadUpload(#[from] MultipartError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("failed to store upload: {0}")]
    UploadStore(#[source] ExportError),

    #[error("failed to access {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Decode(e) => AppError::Decode(e),
            PipelineError::Classifier(e) => AppError::Classifier(e),
            PipelineError::Export(e) => AppError::Export(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MissingUpload => return Redirect::to("/").into_response(),
            AppError::BadUpload(e) => {
                tracing::warn!("Rejected upload: {}", e);
                (e.status(), "The upload could not be read.".to_string())
            }
            AppError::Decode(e) => {
                tracing::warn!("Undecodable upload: {}", e);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "The uploaded file is not a readable image.".to_string(),
                )
            }
            AppError::Classifier(ClassifierError::NotLoaded) => {
                tracing::error!("Classification requested but no model is loaded");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The classifier model is not loaded.".to_string(),
                )
            }
            AppError::Classifier(e) => {
                tracing::error!("Classifier error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Classification failed.".to_string(),
                )
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The report could not be generated.".to_string(),
                )
            }
            AppError::UploadStore(e) => {
                tracing::error!("Upload not stored: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The upload could not be stored.".to_string(),
                )
            }
            AppError::Storage { .. } | AppError::Task(_) => {
                tracing::error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Html(views::error_page(status, &message))).into_response()
    }
}
