//! Armor plate detection for robot turrets.
//!
//! This crate provides:
//! - the detection pipeline: fixed-threshold binarization, light bar
//!   extraction with color sampling, light pairing into small/large plates,
//! - the stateful [`Detector`] facade with an optional numeral classifier
//!   and a snapshot of the last frame for inspection,
//! - JSON config/report helpers ([`io`]),
//! - (feature-gated) `image`-crate helpers and debug overlays.
//!
//! ## Quickstart
//!
//! ```no_run
//! use armor_detector::{detect, Detector, DetectorParams};
//! use armor_detector::core::LightColor;
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("frame.png")?.decode()?.to_rgb8();
//! let mut params = DetectorParams::default();
//! params.detect_color = LightColor::Blue;
//!
//! let mut detector = Detector::new(params)?;
//! for armor in detector.detect(&detect::rgb_view(&img)) {
//!     println!("{:?} plate at {:?}", armor.armor_type, armor.center);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `armor_detector::core`: image views, contours, geometry, `Light`/`Armor`.
//! - `armor_detector::number`: numeral extraction and classification.
//! - `armor_detector::detect` (feature `image`): helpers from `image::RgbImage`.
//! - `armor_detector::debug` (feature `image`): overlay drawing.

pub use armor_detector_core as core;
pub use armor_detector_number as number;

mod binarize;
mod detector;
pub mod io;
mod lights;
mod matcher;
mod params;

pub use armor_detector_core::{Armor, ArmorType, Light, LightColor, NumberClassifier};
pub use binarize::binarize;
pub use detector::{all_numbers_image, Detector};
pub use lights::{find_lights, is_light, light_color};
pub use matcher::{contain_light, is_armor, match_lights, pair_metrics, PairMetrics};
pub use params::{ArmorParams, DetectorParams, DetectorParamsError, LightParams};

#[cfg(feature = "image")]
pub mod debug;
#[cfg(feature = "image")]
pub mod detect;
