//! JSON configuration and report helpers for armor detection.

use crate::core::{Armor, Light};
use crate::number::{MlpNumberClassifier, NumberClassifierError, NumberClassifierParams};
use crate::{Detector, DetectorParams, DetectorParamsError};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum DetectIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum DetectConfigError {
    #[error(transparent)]
    Params(#[from] DetectorParamsError),
    #[error(transparent)]
    Classifier(#[from] NumberClassifierError),
}

/// Model and label files plus the acceptance policy of the numeral classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberClassifierConfig {
    pub model_path: String,
    pub label_path: String,
    #[serde(flatten)]
    pub params: NumberClassifierParams,
}

/// Configuration for a detection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectConfig {
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub params: DetectorParams,
    #[serde(default)]
    pub report_path: Option<String>,
    /// Frame with lights and armors drawn on top.
    #[serde(default)]
    pub overlay_path: Option<String>,
    #[serde(default)]
    pub binary_path: Option<String>,
    /// Stacked numeral patches.
    #[serde(default)]
    pub numbers_path: Option<String>,
    #[serde(default)]
    pub number_classifier: Option<NumberClassifierConfig>,
}

impl DetectConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DetectIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DetectIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn report_path(&self) -> Option<PathBuf> {
        self.report_path.as_ref().map(PathBuf::from)
    }

    /// Build a detector, loading the numeral classifier when configured.
    pub fn build_detector(&self) -> Result<Detector, DetectConfigError> {
        let detector = Detector::new(self.params)?;
        let Some(cfg) = self.number_classifier.as_ref() else {
            return Ok(detector);
        };
        let classifier =
            MlpNumberClassifier::from_files(&cfg.model_path, &cfg.label_path, cfg.params.clone())?;
        Ok(detector.with_classifier(classifier))
    }
}

/// Detection output for one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectReport {
    #[serde(default)]
    pub image_path: Option<String>,
    pub width: usize,
    pub height: usize,
    pub params: DetectorParams,
    pub lights: Vec<Light>,
    pub armors: Vec<Armor>,
}

impl DetectReport {
    /// Snapshot the last frame processed by `detector`.
    pub fn from_detector(
        detector: &Detector,
        image_path: Option<String>,
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            image_path,
            width,
            height,
            params: *detector.params(),
            lights: detector.lights().to_vec(),
            armors: detector.armors().to_vec(),
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DetectIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DetectIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
