//! Configuration module

use std::env;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use wastesort_core::constants::{
    DEFAULT_CHART_PATH, DEFAULT_CSV_REPORT_PATH, DEFAULT_IMG_SIZE, DEFAULT_MODEL_PATH,
    DEFAULT_PDF_REPORT_PATH, DEFAULT_STATIC_DIR, DEFAULT_UPLOAD_DIR,
};
use wastesort_core::{ChannelOrder, ModelConfig, ReportPaths};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Served under `/static`
    pub static_dir: PathBuf,

    /// Uploaded images (should live inside `static_dir` to be displayed)
    pub upload_dir: PathBuf,

    pub model_path: PathBuf,

    /// Square side the model expects
    pub img_size: u32,

    pub channel_order: ChannelOrder,

    pub csv_path: PathBuf,
    pub pdf_path: PathBuf,
    pub chart_path: PathBuf,

    /// Request body limit in MiB
    pub max_upload_mb: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            img_size: DEFAULT_IMG_SIZE,
            channel_order: ChannelOrder::Rgb,
            csv_path: PathBuf::from(DEFAULT_CSV_REPORT_PATH),
            pdf_path: PathBuf::from(DEFAULT_PDF_REPORT_PATH),
            chart_path: PathBuf::from(DEFAULT_CHART_PATH),
            max_upload_mb: 16,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parsed("PORT").unwrap_or(defaults.port),
            static_dir: path_var("STATIC_DIR").unwrap_or(defaults.static_dir),
            upload_dir: path_var("UPLOAD_DIR").unwrap_or(defaults.upload_dir),
            model_path: path_var("MODEL_PATH").unwrap_or(defaults.model_path),
            img_size: parsed("IMG_SIZE").unwrap_or(defaults.img_size),
            channel_order: parsed("CHANNEL_ORDER").unwrap_or(defaults.channel_order),
            csv_path: path_var("REPORT_CSV_PATH").unwrap_or(defaults.csv_path),
            pdf_path: path_var("REPORT_PDF_PATH").unwrap_or(defaults.pdf_path),
            chart_path: path_var("CHART_PATH").unwrap_or(defaults.chart_path),
            max_upload_mb: parsed("MAX_UPLOAD_MB").unwrap_or(defaults.max_upload_mb),
        }
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            model_path: self.model_path.clone(),
            input_size: self.img_size,
        }
    }

    pub fn report_paths(&self) -> ReportPaths {
        ReportPaths {
            csv: self.csv_path.clone(),
            pdf: self.pdf_path.clone(),
            chart: self.chart_path.clone(),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL under `/static` for a file inside `static_dir`, if it is one
    pub fn static_url(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.static_dir).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect::<Option<_>>()?;

        if parts.is_empty() {
            return None;
        }
        Some(format!("/static/{}", parts.join("/")))
    }
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}

fn path_var(key: &str) -> Option<PathBuf> {
    env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from)
}
