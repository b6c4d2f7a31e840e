//! ONNX Runtime backend
//!
//! Loads the exported garbage classifier once and serves `predict` calls.
//! The session is behind a mutex: `Session::run` needs exclusive access.

use std::path::Path;

use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{Value, ValueType};
use parking_lot::Mutex;

use crate::error::ClassifierError;
use super::inference::{declared_input_side, Classifier};

pub struct OnnxClassifier {
    session: Mutex<Session>,
    output_name: String,
    input_size: u32,
    model_name: String,
}

impl OnnxClassifier {
    /// Load an ONNX model from file.
    ///
    /// The input side comes from the model's first input. `configured_size`
    /// is used only when that shape is dynamic.
    pub fn load(model_path: &Path, configured_size: u32) -> Result<Self, ClassifierError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ClassifierError::Runtime(format!(
                "Model not found: {}",
                model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| ClassifierError::Runtime(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifierError::Runtime(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ClassifierError::Runtime(format!("Failed to load model: {}", e)))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ClassifierError::Runtime("No output defined".to_string()))?;

        let declared = session.inputs.first().and_then(|input| match &input.input_type {
            ValueType::Tensor { shape, .. } => {
                let dims: Vec<i64> = shape.iter().copied().collect();
                declared_input_side(&dims)
            }
            _ => None,
        });

        let input_size = match declared {
            Some(side) => side,
            None => {
                log::warn!(
                    "Model input size is dynamic, using configured {}px",
                    configured_size
                );
                configured_size
            }
        };

        log::info!("ONNX model loaded successfully (input {}px)", input_size);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            input_size,
            model_name: model_path.display().to_string(),
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, batch: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let input_tensor = Value::from_array(batch.clone())
            .map_err(|e| ClassifierError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ClassifierError::Runtime(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ClassifierError::Runtime("No output".to_string()))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Runtime(format!("Extract error: {}", e)))?;

        Ok(data.to_vec())
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}
