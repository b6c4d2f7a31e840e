//! WasteSort Web Server
//!
//! Upload a photo, get a category and a bin, watch the tally grow.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       WASTESORT SERVER                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────────────────────────────┐    │
//! │  │  HTTP     │   │  WastePipeline (wastesort-core)      │    │
//! │  │  (Axum)   │──▶│  preprocess → classify → route →     │    │
//! │  │           │   │  tally → CSV / PDF / chart           │    │
//! │  └───────────┘   └──────────────────────────────────────┘    │
//! │        │                          │                          │
//! │        ▼                          ▼                          │
//! │  static/ (uploads, chart)   waste_log.csv, waste_report.pdf  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod views;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wastesort_core::{load_classifier, Preprocessor, ReportSet, WastePipeline};

pub use config::Config;
pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (core's `log` records are bridged in)
    tracing_subscriber::registry()
        .with(startup_filter(None))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();

    tracing::info!("WasteSort server v{} starting...", env!("CARGO_PKG_VERSION"));
    tracing::info!("Model: {}", config.model_path.display());

    let state = build_state(config.clone())?;
    if !state.pipeline.classifier().is_loaded() {
        tracing::warn!("No classifier loaded - uploads will fail until a model is available");
    }

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Load `.env` (or `env_file`), then build the log filter.
///
/// The file has to be read first so a `RUST_LOG` set there takes effect.
fn startup_filter(env_file: Option<&Path>) -> EnvFilter {
    if let Some(path) = env_file {
        dotenvy::from_path(path).ok();
    } else {
        dotenvy::dotenv().ok();
    }

    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "wastesort=debug,wastesort_core=debug,tower_http=debug".into())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<WastePipeline>,
    pub config: Config,
}

/// Load the model and wire the pipeline
fn build_state(config: Config) -> anyhow::Result<AppState> {
    for dir in [&config.static_dir, &config.upload_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let classifier = load_classifier(&config.model_config());
    tracing::info!(
        "Classifier: {} (input {}x{})",
        classifier.name(),
        classifier.input_size(),
        classifier.input_size()
    );

    let pipeline = WastePipeline::new(
        classifier,
        Preprocessor::new(config.img_size, config.channel_order),
        ReportSet::new(config.report_paths()),
    )
    .context("classifier does not match the configured image size")?;

    Ok(AppState {
        pipeline: Arc::new(pipeline),
        config,
    })
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes();
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(handlers::upload::index).post(handlers::upload::upload))
        .route("/stats", get(handlers::stats::page))
        .route("/api/stats", get(handlers::stats::api))
        .route("/download_csv", get(handlers::download::csv))
        .route("/download_pdf", get(handlers::download::pdf))
        .route("/health", get(handlers::health::check))
        .nest_service("/static", static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
