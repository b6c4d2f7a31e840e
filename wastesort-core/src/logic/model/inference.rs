//! Inference Engine
//!
//! The trained model is opaque: batch tensor in, one score per label out.
//! Backends implement [`Classifier`]; the rest of the pipeline only sees
//! the trait.

use std::path::PathBuf;
use std::sync::Arc;

use ndarray::Array4;
use serde::Serialize;

use crate::constants::{DEFAULT_IMG_SIZE, DEFAULT_MODEL_PATH};
use crate::error::ClassifierError;
use crate::logic::labels::ClassLabel;

// ============================================================================
// CONFIG
// ============================================================================

/// Load-time model configuration.
///
/// `input_size` is only used when the model leaves its spatial
/// dimensions dynamic.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub input_size: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            input_size: DEFAULT_IMG_SIZE,
        }
    }
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Capability: run one forward pass over a `(1, S, S, 3)` batch
pub trait Classifier: Send + Sync {
    /// One score per label, in `ClassLabel::ALL` order
    fn predict(&self, batch: &Array4<f32>) -> Result<Vec<f32>, ClassifierError>;

    /// Square input side the model was trained on
    fn input_size(&self) -> u32;

    fn is_loaded(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "unknown"
    }
}

/// Stand-in used when no model could be loaded.
///
/// Every prediction fails with `NotLoaded`, so the rest of the app keeps
/// serving stats and reports.
#[derive(Debug, Clone)]
pub struct UnavailableClassifier {
    input_size: u32,
}

impl UnavailableClassifier {
    pub fn new(input_size: u32) -> Self {
        Self { input_size }
    }
}

impl Classifier for UnavailableClassifier {
    fn predict(&self, _batch: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        Err(ClassifierError::NotLoaded)
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn is_loaded(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

/// Load the configured backend, falling back to [`UnavailableClassifier`]
pub fn load_classifier(config: &ModelConfig) -> Arc<dyn Classifier> {
    #[cfg(feature = "onnx")]
    {
        match super::onnx::OnnxClassifier::load(&config.model_path, config.input_size) {
            Ok(classifier) => return Arc::new(classifier),
            Err(e) => log::warn!("ONNX classifier unavailable: {}", e),
        }
    }

    #[cfg(not(feature = "onnx"))]
    {
        log::warn!(
            "Built without the `onnx` feature - {} will not be loaded",
            config.model_path.display()
        );
    }

    Arc::new(UnavailableClassifier::new(config.input_size))
}

/// Square side declared by a model's image input.
///
/// Accepts NHWC `[N, S, S, 3]` and NCHW `[N, 3, S, S]`. Returns `None` when
/// the spatial dimensions are dynamic (`-1`) or not square.
pub fn declared_input_side(dims: &[i64]) -> Option<u32> {
    let (h, w) = match dims {
        [_, h, w, 3] => (*h, *w),
        [_, 3, h, w] => (*h, *w),
        _ => return None,
    };
    if h > 0 && h == w {
        u32::try_from(h).ok()
    } else {
        None
    }
}

// ============================================================================
// PREDICTION
// ============================================================================

/// Argmax label of one classifier call
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub label: ClassLabel,
    pub index: usize,
    pub confidence: f32,      // 0.0 - 1.0
    pub inference_time_us: u64,
}

impl PredictionResult {
    /// Pick the highest-scoring label.
    ///
    /// Scores that are not already a probability distribution are passed
    /// through softmax first. Ties resolve to the lowest index. NaN or
    /// infinite scores are a runtime error, never a prediction.
    pub fn from_scores(scores: &[f32], inference_time_us: u64) -> Result<Self, ClassifierError> {
        if scores.len() != ClassLabel::COUNT {
            return Err(ClassifierError::OutputShape {
                expected: ClassLabel::COUNT,
                actual: scores.len(),
            });
        }

        if let Some(bad) = scores.iter().position(|s| !s.is_finite()) {
            return Err(ClassifierError::Runtime(format!(
                "non-finite score {} at index {}",
                scores[bad], bad
            )));
        }

        let probabilities = if is_distribution(scores) {
            scores.to_vec()
        } else {
            softmax(scores).ok_or_else(|| {
                ClassifierError::Runtime("softmax over classifier scores degenerated".to_string())
            })?
        };

        let mut index = 0;
        for (i, p) in probabilities.iter().enumerate() {
            if *p > probabilities[index] {
                index = i;
            }
        }

        let label = ClassLabel::from_index(index).ok_or(ClassifierError::OutputShape {
            expected: ClassLabel::COUNT,
            actual: scores.len(),
        })?;

        Ok(Self {
            label,
            index,
            confidence: probabilities[index].clamp(0.0, 1.0),
            inference_time_us,
        })
    }

    /// Confidence as shown to users, e.g. `91.00%`
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }
}

fn is_distribution(scores: &[f32]) -> bool {
    let in_range = scores.iter().all(|p| p.is_finite() && (0.0..=1.0).contains(p));
    let sum: f32 = scores.iter().sum();
    in_range && (sum - 1.0).abs() < 1e-3
}

/// `None` when the exponentials cannot be normalized
fn softmax(logits: &[f32]) -> Option<Vec<f32>> {
    let max_logit = logits.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let exp: Vec<f32> = logits.iter().map(|&x| (x - max_logit).exp()).collect();
    let sum: f32 = exp.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        Some(exp.iter().map(|e| e / sum).collect())
    } else {
        None
    }
}
