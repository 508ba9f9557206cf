//! Pairing of same-colored lights into armor plates.

use crate::params::ArmorParams;
use armor_detector_core::{Armor, ArmorType, BoundingRect, Light, LightColor};
use log::{debug, trace};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Pair measurements that drive [`is_armor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairMetrics {
    /// Shorter over longer light length.
    pub light_length_ratio: f32,
    /// Center distance divided by the average light length.
    pub center_distance: f32,
    /// Slope of the center line in degrees; `None` when the lights are
    /// stacked vertically.
    pub angle: Option<f32>,
    pub armor_type: ArmorType,
}

/// Measure a light pair and classify it. Symmetric in its arguments.
pub fn pair_metrics(light_1: &Light, light_2: &Light, params: &ArmorParams) -> PairMetrics {
    let (short, long) = if light_1.length < light_2.length {
        (light_1.length, light_2.length)
    } else {
        (light_2.length, light_1.length)
    };
    let light_length_ratio = if long > 0.0 { short / long } else { 0.0 };
    let ratio_ok = light_length_ratio > params.min_light_ratio;

    let diff = light_1.center - light_2.center;
    let avg_length = (light_1.length + light_2.length) / 2.0;
    let center_distance = if avg_length > 0.0 {
        diff.norm() / avg_length
    } else {
        f32::NAN
    };
    // NaN falls outside both bands
    let in_small = params.min_small_center_distance <= center_distance
        && center_distance < params.max_small_center_distance;
    let in_large = params.min_large_center_distance <= center_distance
        && center_distance < params.max_large_center_distance;

    let angle = (diff.x != 0.0).then(|| (diff.y / diff.x).atan().abs().to_degrees());
    let angle_ok = angle.is_some_and(|a| a < params.max_angle);

    // anything at or past the large band start is a large plate
    let armor_type = if ratio_ok && (in_small || in_large) && angle_ok {
        if center_distance >= params.min_large_center_distance {
            ArmorType::Large
        } else {
            ArmorType::Small
        }
    } else {
        ArmorType::Invalid
    };

    PairMetrics {
        light_length_ratio,
        center_distance,
        angle,
        armor_type,
    }
}

/// Geometric plate test for two lights.
#[inline]
pub fn is_armor(light_1: &Light, light_2: &Light, params: &ArmorParams) -> ArmorType {
    pair_metrics(light_1, light_2, params).armor_type
}

/// True if some other light has its top, bottom or center inside the box
/// spanned by the endpoints of `light_1` and `light_2`.
///
/// Lights sharing a center with either pair member count as the pair itself.
pub fn contain_light(light_1: &Light, light_2: &Light, lights: &[Light]) -> bool {
    let Some(rect) = BoundingRect::from_points(&[
        light_1.top,
        light_1.bottom,
        light_2.top,
        light_2.bottom,
    ]) else {
        return false;
    };

    lights
        .iter()
        .filter(|l| l.center != light_1.center && l.center != light_2.center)
        .any(|l| rect.contains(l.top) || rect.contains(l.bottom) || rect.contains(l.center))
}

/// Enumerate unordered pairs `i < j` of lights colored `detect_color`,
/// reject pairs enclosing another light and keep the valid plates.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(lights, params), fields(lights = lights.len()))
)]
pub fn match_lights(lights: &[Light], params: &ArmorParams, detect_color: LightColor) -> Vec<Armor> {
    let mut armors = Vec::new();
    for (i, light_1) in lights.iter().enumerate() {
        if light_1.color != Some(detect_color) {
            continue;
        }
        for light_2 in &lights[i + 1..] {
            if light_2.color != Some(detect_color) {
                continue;
            }
            if contain_light(light_1, light_2, lights) {
                trace!(
                    "pair {:?}-{:?} encloses another light",
                    light_1.center,
                    light_2.center
                );
                continue;
            }

            let metrics = pair_metrics(light_1, light_2, params);
            trace!(
                "pair {:?}-{:?}: length ratio {:.2}, distance {:.2}, angle {:?} -> {:?}",
                light_1.center,
                light_2.center,
                metrics.light_length_ratio,
                metrics.center_distance,
                metrics.angle,
                metrics.armor_type
            );
            if metrics.armor_type != ArmorType::Invalid {
                armors.push(Armor::new(
                    light_1.clone(),
                    light_2.clone(),
                    metrics.armor_type,
                ));
            }
        }
    }
    debug!("{} lights -> {} armors", lights.len(), armors.len());
    armors
}
