use crate::binarize::binarize;
use crate::lights::find_lights;
use crate::matcher::match_lights;
use crate::params::{DetectorParams, DetectorParamsError};
use armor_detector_core::{Armor, GrayImage, Light, LightColor, NumberClassifier, RgbImageView};
use log::{debug, warn};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Size of the placeholder returned by [`Detector::all_numbers_image`] when no
/// armor carries a numeral patch.
const EMPTY_NUMBERS_SIZE: (usize, usize) = (20, 28);

/// Armor plate detector.
///
/// Each call to [`Detector::detect`] replaces the binary mask, lights and
/// armors kept for inspection; nothing else carries over between frames.
pub struct Detector {
    params: DetectorParams,
    classifier: Option<Box<dyn NumberClassifier + Send + Sync>>,
    binary_img: GrayImage,
    lights: Vec<Light>,
    armors: Vec<Armor>,
}

impl Detector {
    pub fn new(params: DetectorParams) -> Result<Self, DetectorParamsError> {
        params.validate()?;
        Ok(Self {
            params,
            classifier: None,
            binary_img: GrayImage::default(),
            lights: Vec::new(),
            armors: Vec::new(),
        })
    }

    /// Install a numeral classifier; it runs only on frames with armors.
    pub fn with_classifier(
        mut self,
        classifier: impl NumberClassifier + Send + Sync + 'static,
    ) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Replace the configuration between frames.
    pub fn set_params(&mut self, params: DetectorParams) -> Result<(), DetectorParamsError> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn set_detect_color(&mut self, color: LightColor) {
        self.params.detect_color = color;
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Binarize, extract lights, pair them and optionally classify numerals.
    ///
    /// A frame whose buffer is shorter than `width * height * 3` yields no
    /// armors.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame), fields(width = frame.width, height = frame.height))
    )]
    pub fn detect(&mut self, frame: &RgbImageView<'_>) -> Vec<Armor> {
        let expected = frame.width.saturating_mul(frame.height).saturating_mul(3);
        if frame.data.len() < expected {
            warn!(
                "frame buffer holds {} bytes, expected {expected}; skipping",
                frame.data.len()
            );
            self.binary_img = GrayImage::default();
            self.lights.clear();
            self.armors.clear();
            return Vec::new();
        }

        self.binary_img = self.preprocess(frame);
        self.lights = find_lights(frame, &self.binary_img.view(), &self.params.light);
        let mut armors = match_lights(
            &self.lights,
            &self.params.armor,
            self.params.detect_color,
        );

        if !armors.is_empty() {
            if let Some(classifier) = &self.classifier {
                classifier.extract_numbers(frame, &mut armors);
                classifier.classify(&mut armors);
            }
        }

        debug!(
            "frame {}x{}: {} lights, {} armors",
            frame.width,
            frame.height,
            self.lights.len(),
            armors.len()
        );
        self.armors = armors.clone();
        armors
    }

    /// Fixed-threshold binary mask of `frame`.
    pub fn preprocess(&self, frame: &RgbImageView<'_>) -> GrayImage {
        binarize(frame, self.params.binary_threshold)
    }

    /// Binary mask of the last frame.
    pub fn binary_image(&self) -> &GrayImage {
        &self.binary_img
    }

    /// Colored lights of the last frame, before pairing.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Armors returned for the last frame.
    pub fn armors(&self) -> &[Armor] {
        &self.armors
    }

    /// Numeral patches of the last frame stacked top to bottom.
    pub fn all_numbers_image(&self) -> GrayImage {
        all_numbers_image(&self.armors)
    }
}

/// Stack the numeral patches of `armors` vertically. Narrower patches are
/// left-aligned; a blank 20×28 image stands in when there are none.
pub fn all_numbers_image(armors: &[Armor]) -> GrayImage {
    let patches: Vec<&GrayImage> = armors
        .iter()
        .filter_map(|a| a.number_img.as_ref())
        .filter(|img| !img.is_empty())
        .collect();
    if patches.is_empty() {
        return GrayImage::new(EMPTY_NUMBERS_SIZE.0, EMPTY_NUMBERS_SIZE.1);
    }

    let width = patches.iter().map(|p| p.width).max().unwrap_or(0);
    let height = patches.iter().map(|p| p.height).sum();
    let mut out = GrayImage::new(width, height);
    let mut y0 = 0;
    for patch in patches {
        for (y, row) in patch.data.chunks_exact(patch.width).enumerate() {
            let start = (y0 + y) * width;
            out.data[start..start + patch.width].copy_from_slice(row);
        }
        y0 += patch.height;
    }
    out
}
