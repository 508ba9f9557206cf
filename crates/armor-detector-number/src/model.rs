//! Inference backends for numeral patches.

use crate::NumberClassifierError;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Errors raised while running a model on one patch.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NumberModelError {
    #[error("model expects {expected} inputs, got {got}")]
    InputSize { expected: usize, got: usize },
    #[error("inference backend failed: {0}")]
    Backend(String),
}

/// A classifier over flattened, `[0, 1]`-scaled numeral patches.
///
/// `forward` returns one raw score (logit) per class.
pub trait NumberModel {
    /// Expected input length, if the model is shape-checked.
    fn input_len(&self) -> Option<usize> {
        None
    }

    /// Number of output classes, if known up front.
    fn num_classes(&self) -> Option<usize> {
        None
    }

    fn forward(&self, input: &[f32]) -> Result<Vec<f32>, NumberModelError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Identity,
    Relu,
}

/// Fully connected layer; `weights` is row-major `outputs × inputs`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub inputs: usize,
    pub outputs: usize,
    pub weights: Vec<f32>,
    pub bias: Vec<f32>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.weights
            .chunks_exact(self.inputs)
            .zip(&self.bias)
            .map(|(row, b)| {
                let z = row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + b;
                match self.activation {
                    Activation::Identity => z,
                    Activation::Relu => z.max(0.0),
                }
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct MlpModelFile {
    layers: Vec<DenseLayer>,
}

/// Multi-layer perceptron evaluated on the CPU.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MlpModel {
    layers: Vec<DenseLayer>,
}

impl MlpModel {
    /// Validate layer shapes and chaining.
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, NumberClassifierError> {
        if layers.is_empty() {
            return Err(NumberClassifierError::EmptyModel);
        }
        for (index, layer) in layers.iter().enumerate() {
            if layer.inputs == 0 || layer.outputs == 0 {
                return Err(NumberClassifierError::InvalidLayer {
                    index,
                    reason: "zero-sized layer".into(),
                });
            }
            if layer.weights.len() != layer.inputs * layer.outputs {
                return Err(NumberClassifierError::InvalidLayer {
                    index,
                    reason: format!(
                        "expected {} weights, found {}",
                        layer.inputs * layer.outputs,
                        layer.weights.len()
                    ),
                });
            }
            if layer.bias.len() != layer.outputs {
                return Err(NumberClassifierError::InvalidLayer {
                    index,
                    reason: format!(
                        "expected {} biases, found {}",
                        layer.outputs,
                        layer.bias.len()
                    ),
                });
            }
            if index > 0 && layers[index - 1].outputs != layer.inputs {
                return Err(NumberClassifierError::InvalidLayer {
                    index,
                    reason: format!(
                        "takes {} inputs but previous layer yields {}",
                        layer.inputs,
                        layers[index - 1].outputs
                    ),
                });
            }
        }
        Ok(Self { layers })
    }

    /// Load `{"layers": [...]}` from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, NumberClassifierError> {
        let raw = fs::read_to_string(path)?;
        let file: MlpModelFile = serde_json::from_str(&raw)?;
        Self::new(file.layers)
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }
}

impl NumberModel for MlpModel {
    fn input_len(&self) -> Option<usize> {
        self.layers.first().map(|l| l.inputs)
    }

    fn num_classes(&self) -> Option<usize> {
        self.layers.last().map(|l| l.outputs)
    }

    fn forward(&self, input: &[f32]) -> Result<Vec<f32>, NumberModelError> {
        let expected = self.layers[0].inputs;
        if input.len() != expected {
            return Err(NumberModelError::InputSize {
                expected,
                got: input.len(),
            });
        }
        let mut activations = input.to_vec();
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }
        Ok(activations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn two_layer() -> MlpModel {
        MlpModel::new(vec![
            DenseLayer {
                inputs: 2,
                outputs: 2,
                weights: vec![1.0, -1.0, -1.0, 1.0],
                bias: vec![0.0, 0.0],
                activation: Activation::Relu,
            },
            DenseLayer {
                inputs: 2,
                outputs: 3,
                weights: vec![1.0, 0.0, 0.0, 1.0, 0.5, 0.5],
                bias: vec![0.0, 0.0, 0.25],
                activation: Activation::Identity,
            },
        ])
        .expect("valid model")
    }

    #[test]
    fn forward_applies_relu_between_layers() {
        let model = two_layer();
        assert_eq!(model.input_len(), Some(2));
        assert_eq!(model.num_classes(), Some(3));
        let out = model.forward(&[3.0, 1.0]).expect("forward");
        // hidden = relu([2, -2]) = [2, 0]
        assert_eq!(out, vec![2.0, 0.0, 1.25]);
    }

    #[test]
    fn forward_rejects_wrong_input_size() {
        let err = two_layer().forward(&[1.0]).unwrap_err();
        assert_eq!(err, NumberModelError::InputSize { expected: 2, got: 1 });
    }

    #[test]
    fn mismatched_layers_are_rejected() {
        let err = MlpModel::new(vec![
            DenseLayer {
                inputs: 2,
                outputs: 3,
                weights: vec![0.0; 6],
                bias: vec![0.0; 3],
                activation: Activation::Relu,
            },
            DenseLayer {
                inputs: 2,
                outputs: 1,
                weights: vec![0.0; 2],
                bias: vec![0.0],
                activation: Activation::Identity,
            },
        ])
        .unwrap_err();
        assert!(matches!(err, NumberClassifierError::InvalidLayer { index: 1, .. }));
        assert!(matches!(MlpModel::new(Vec::new()), Err(NumberClassifierError::EmptyModel)));
    }

    #[test]
    fn loads_model_from_json() {
        let mut file = tempfile::NamedTempFile::new().expect("tmp");
        write!(
            file,
            r#"{{"layers":[{{"inputs":2,"outputs":1,"weights":[0.5,0.5],"bias":[1.0]}}]}}"#
        )
        .expect("write");
        let model = MlpModel::load_json(file.path()).expect("load");
        assert_eq!(model.layers()[0].activation, Activation::Identity);
        assert_eq!(model.forward(&[2.0, 4.0]).expect("forward"), vec![4.0]);
    }
}
