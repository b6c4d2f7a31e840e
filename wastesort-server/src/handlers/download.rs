//! Report download handlers

use std::path::{Path, PathBuf};

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::{AppError, AppResult, AppState};

pub async fn csv(State(state): State<AppState>) -> AppResult<Response> {
    let pipeline = state.pipeline.clone();
    let path = tokio::task::spawn_blocking(move || pipeline.export_csv().map(Path::to_path_buf))
        .await??;
    attachment(path, "text/csv; charset=utf-8").await
}

pub async fn pdf(State(state): State<AppState>) -> AppResult<Response> {
    let pipeline = state.pipeline.clone();
    let path = tokio::task::spawn_blocking(move || pipeline.export_pdf().map(Path::to_path_buf))
        .await??;
    attachment(path, "application/pdf").await
}

async fn attachment(path: PathBuf, content_type: &'static str) -> AppResult<Response> {
    let body = tokio::fs::read(&path)
        .await
        .map_err(|source| AppError::Storage {
            path: path.clone(),
            source,
        })?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("report");

    tracing::info!("Serving {} ({} bytes)", path.display(), body.len());

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}
