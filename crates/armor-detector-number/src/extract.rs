//! Numeral patch extraction.
//!
//! The quad spanned by the two light bars is warped onto a canonical patch in
//! which the lights occupy a fixed band of rows. The numeral sits between the
//! lights, so only the central ROI of the patch is sampled.

use crate::threshold::binarize_otsu;
use armor_detector_core::{
    homography_from_4pt, warp_perspective_gray, Armor, ArmorType, GrayImage, GrayImageView,
};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Canonical patch geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberExtractParams {
    /// Light bar length in patch pixels.
    pub light_length: usize,
    pub warp_height: usize,
    pub small_armor_width: usize,
    pub large_armor_width: usize,
    pub roi_width: usize,
    pub roi_height: usize,
}

impl Default for NumberExtractParams {
    fn default() -> Self {
        Self {
            light_length: 12,
            warp_height: 28,
            small_armor_width: 32,
            large_armor_width: 54,
            roi_width: 20,
            roi_height: 28,
        }
    }
}

impl NumberExtractParams {
    #[inline]
    pub fn warp_width(&self, armor_type: ArmorType) -> usize {
        match armor_type {
            ArmorType::Large => self.large_armor_width,
            ArmorType::Small | ArmorType::Invalid => self.small_armor_width,
        }
    }

    #[inline]
    pub fn roi_len(&self) -> usize {
        self.roi_width * self.roi_height
    }
}

/// Warp, crop and binarize the numeral region of one armor.
///
/// Returns `None` when the light quad is degenerate.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "trace", skip(gray, armor, params), fields(center_x = armor.center.x))
)]
pub fn extract_number_image(
    gray: &GrayImageView<'_>,
    armor: &Armor,
    params: &NumberExtractParams,
) -> Option<GrayImage> {
    let warp_width = params.warp_width(armor.armor_type);
    let top_light_y = (params.warp_height.saturating_sub(params.light_length) / 2) as f32 - 1.0;
    let bottom_light_y = top_light_y + params.light_length as f32;
    let right_x = warp_width.saturating_sub(1) as f32;

    let patch = [
        Point2::new(0.0, bottom_light_y),
        Point2::new(0.0, top_light_y),
        Point2::new(right_x, top_light_y),
        Point2::new(right_x, bottom_light_y),
    ];
    let lights = [
        armor.left_light.bottom,
        armor.left_light.top,
        armor.right_light.top,
        armor.right_light.bottom,
    ];

    let h_img_from_patch = homography_from_4pt(&patch, &lights)?;
    let roi_x = warp_width.saturating_sub(params.roi_width) / 2;
    let h_img_from_roi = h_img_from_patch.pre_translated(roi_x as f64, 0.0);

    let roi = warp_perspective_gray(gray, &h_img_from_roi, params.roi_width, params.roi_height);
    Some(binarize_otsu(roi))
}
