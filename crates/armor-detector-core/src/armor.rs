use crate::{GrayImage, Light, RgbImageView};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Plate size class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmorType {
    Small,
    Large,
    #[default]
    Invalid,
}

/// Armor plate hypothesis built from two light bars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    pub left_light: Light,
    pub right_light: Light,
    pub center: Point2<f32>,
    pub armor_type: ArmorType,
    /// Binarized numeral crop, filled by [`NumberClassifier::extract_numbers`].
    #[serde(skip)]
    pub number_img: Option<GrayImage>,
    /// Classifier label, empty until classified.
    pub number: String,
    pub confidence: f32,
    pub classification_result: String,
}

impl Armor {
    /// The light with the smaller center x becomes the left light.
    pub fn new(light_1: Light, light_2: Light, armor_type: ArmorType) -> Self {
        let (left_light, right_light) = if light_1.center.x < light_2.center.x {
            (light_1, light_2)
        } else {
            (light_2, light_1)
        };
        let center = Point2::from((left_light.center.coords + right_light.center.coords) * 0.5);
        Self {
            left_light,
            right_light,
            center,
            armor_type,
            number_img: None,
            number: String::new(),
            confidence: 0.0,
            classification_result: String::new(),
        }
    }
}

/// Numeral recognition stage run on the detected armors.
///
/// `classify` may drop armors whose numeral is not considered valid.
pub trait NumberClassifier {
    /// Crop and normalize the numeral region of every armor into `number_img`.
    fn extract_numbers(&self, frame: &RgbImageView<'_>, armors: &mut [Armor]);

    /// Assign `number`, `confidence` and `classification_result`.
    fn classify(&self, armors: &mut Vec<Armor>);
}
