//! Numeral recognition for armor plates.
//!
//! This crate focuses on:
//! - warping the region between two light bars onto a canonical patch,
//! - Otsu binarization of that patch,
//! - classifying the patch with a pluggable [`NumberModel`] and filtering
//!   armors whose numeral is unreliable or inconsistent with the plate size.
//!
//! It does **not** find lights or armors; it consumes the output of
//! `armor-detector` through the [`NumberClassifier`] trait.

mod classifier;
mod extract;
mod model;
mod threshold;

pub use armor_detector_core::NumberClassifier;
pub use classifier::{load_labels, MlpNumberClassifier, NumberClassifierError, NumberClassifierParams};
pub use extract::{extract_number_image, NumberExtractParams};
pub use model::{Activation, DenseLayer, MlpModel, NumberModel, NumberModelError};
