//! Model Module - image preprocessing and classifier backends
//!
//! Preprocessing is pure; the classifier is a swappable capability.

pub mod inference;
pub mod preprocess;

#[cfg(feature = "onnx")]
pub mod onnx;

// Re-export common types
pub use inference::{load_classifier, Classifier, ModelConfig, PredictionResult, UnavailableClassifier};
pub use preprocess::{ChannelOrder, Preprocessed, Preprocessor};

#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
