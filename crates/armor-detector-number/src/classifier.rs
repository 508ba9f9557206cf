use crate::extract::{extract_number_image, NumberExtractParams};
use crate::model::{MlpModel, NumberModel, NumberModelError};
use armor_detector_core::{to_gray, Armor, ArmorType, GrayImage, NumberClassifier, RgbImageView};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors raised while building a numeral classifier.
#[derive(thiserror::Error, Debug)]
pub enum NumberClassifierError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("label file lists no classes")]
    EmptyLabels,
    #[error("model yields {model} classes but {labels} labels were given")]
    LabelCountMismatch { model: usize, labels: usize },
    #[error("model expects {model} inputs but the numeral patch has {patch} pixels")]
    InputSizeMismatch { model: usize, patch: usize },
    #[error("model has no layers")]
    EmptyModel,
    #[error("layer {index}: {reason}")]
    InvalidLayer { index: usize, reason: String },
    #[error("confidence threshold must lie in [0, 1], got {0}")]
    InvalidThreshold(f32),
}

fn default_ignore_classes() -> Vec<String> {
    vec!["negative".to_string()]
}

/// Acceptance policy and patch geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberClassifierParams {
    /// Minimum softmax confidence for an armor to be kept.
    pub threshold: f32,
    /// Labels treated as "no numeral".
    pub ignore_classes: Vec<String>,
    pub extract: NumberExtractParams,
}

impl Default for NumberClassifierParams {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            ignore_classes: default_ignore_classes(),
            extract: NumberExtractParams::default(),
        }
    }
}

/// Read one class name per line, skipping blank lines.
pub fn load_labels(path: impl AsRef<Path>) -> Result<Vec<String>, NumberClassifierError> {
    let raw = fs::read_to_string(path)?;
    let labels: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    if labels.is_empty() {
        return Err(NumberClassifierError::EmptyLabels);
    }
    Ok(labels)
}

/// Max-shifted softmax.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = logits.iter().map(|&z| (z - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

/// Labels that cannot appear on a plate of the given size.
fn mismatches_armor_type(label: &str, armor_type: ArmorType) -> bool {
    match armor_type {
        ArmorType::Large => matches!(label, "outpost" | "2" | "guard"),
        ArmorType::Small => matches!(label, "1" | "base"),
        ArmorType::Invalid => false,
    }
}

/// Numeral classifier: Otsu-binarized patch → model → softmax → label.
pub struct MlpNumberClassifier<M = MlpModel> {
    model: M,
    labels: Vec<String>,
    params: NumberClassifierParams,
}

impl<M: NumberModel> MlpNumberClassifier<M> {
    pub fn new(
        model: M,
        labels: Vec<String>,
        params: NumberClassifierParams,
    ) -> Result<Self, NumberClassifierError> {
        if labels.is_empty() {
            return Err(NumberClassifierError::EmptyLabels);
        }
        if !(0.0..=1.0).contains(&params.threshold) {
            return Err(NumberClassifierError::InvalidThreshold(params.threshold));
        }
        if let Some(classes) = model.num_classes() {
            if classes != labels.len() {
                return Err(NumberClassifierError::LabelCountMismatch {
                    model: classes,
                    labels: labels.len(),
                });
            }
        }
        let patch = params.extract.roi_len();
        if let Some(inputs) = model.input_len() {
            if inputs != patch {
                return Err(NumberClassifierError::InputSizeMismatch {
                    model: inputs,
                    patch,
                });
            }
        }
        Ok(Self {
            model,
            labels,
            params,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn params(&self) -> &NumberClassifierParams {
        &self.params
    }

    /// Best label and its softmax probability.
    pub fn predict(&self, number_img: &GrayImage) -> Result<(&str, f32), NumberModelError> {
        let input: Vec<f32> = number_img.data.iter().map(|&v| v as f32 / 255.0).collect();
        let logits = self.model.forward(&input)?;
        if logits.len() != self.labels.len() {
            return Err(NumberModelError::Backend(format!(
                "model produced {} scores for {} labels",
                logits.len(),
                self.labels.len()
            )));
        }
        let probs = softmax(&logits);
        let (label_id, confidence) = probs
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, p)| {
                if p > best.1 {
                    (i, p)
                } else {
                    best
                }
            });
        Ok((&self.labels[label_id], confidence))
    }

    fn keeps(&self, armor: &Armor) -> bool {
        if armor.number.is_empty() || armor.confidence < self.params.threshold {
            return false;
        }
        if self.params.ignore_classes.iter().any(|c| *c == armor.number) {
            return false;
        }
        !mismatches_armor_type(&armor.number, armor.armor_type)
    }
}

impl MlpNumberClassifier<MlpModel> {
    /// Load a JSON MLP and its label file.
    pub fn from_files(
        model_path: impl AsRef<Path>,
        label_path: impl AsRef<Path>,
        params: NumberClassifierParams,
    ) -> Result<Self, NumberClassifierError> {
        let model = MlpModel::load_json(model_path)?;
        let labels = load_labels(label_path)?;
        Self::new(model, labels, params)
    }
}

impl<M: NumberModel> NumberClassifier for MlpNumberClassifier<M> {
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame, armors), fields(armors = armors.len()))
    )]
    fn extract_numbers(&self, frame: &RgbImageView<'_>, armors: &mut [Armor]) {
        let gray = to_gray(frame);
        for armor in armors.iter_mut() {
            armor.number_img = extract_number_image(&gray.view(), armor, &self.params.extract);
        }
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, armors), fields(armors = armors.len()))
    )]
    fn classify(&self, armors: &mut Vec<Armor>) {
        for armor in armors.iter_mut() {
            let Some(img) = armor.number_img.as_ref() else {
                trace!("armor at {:?} has no numeral patch", armor.center);
                continue;
            };
            match self.predict(img) {
                Ok((label, confidence)) => {
                    armor.number = label.to_string();
                    armor.confidence = confidence;
                    armor.classification_result =
                        format!("{}: {:.1}%", label, confidence * 100.0);
                }
                Err(err) => {
                    warn!("numeral inference failed for armor at {:?}: {err}", armor.center);
                }
            }
        }

        let before = armors.len();
        armors.retain(|a| self.keeps(a));
        debug!("numeral classifier kept {}/{} armors", armors.len(), before);
    }
}
