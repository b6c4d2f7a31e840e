//! Statistics handlers

use axum::{extract::State, response::Html, Json};
use wastesort_core::{ChartExport, TallySummary};

use crate::{views, AppResult, AppState};

/// Tally table plus a freshly rendered chart
pub async fn page(State(state): State<AppState>) -> AppResult<Html<String>> {
    let pipeline = state.pipeline.clone();
    let ChartExport { snapshot, path } =
        tokio::task::spawn_blocking(move || pipeline.export_chart()).await??;

    // Table, chart and cache-busting query all come from one snapshot
    let chart_url = path
        .as_deref()
        .and_then(|p| state.config.static_url(p))
        .map(|url| format!("{}?v={}", url, snapshot.total()));

    Ok(Html(views::stats_page(&snapshot, chart_url.as_deref())))
}

pub async fn api(State(state): State<AppState>) -> Json<TallySummary> {
    Json(state.pipeline.snapshot().summary())
}
