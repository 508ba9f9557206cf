//! Light bar extraction from the binary mask.

use crate::params::LightParams;
use armor_detector_core::{
    find_external_contours, min_area_rect, point_in_polygon, BoundingRect, GrayImageView, Light,
    LightColor, RgbImageView,
};
use log::{debug, trace, warn};
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Contours with fewer points cannot describe a bar.
const MIN_CONTOUR_POINTS: usize = 5;

/// Fit a rotated rectangle to every external blob of `binary`, keep the
/// light-shaped ones and label each with its dominant color in `frame`.
///
/// Lights whose bounding box leaves the frame are dropped. Returns no lights
/// when either buffer is shorter than its stated dimensions.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame, binary, params), fields(width = binary.width, height = binary.height))
)]
pub fn find_lights(
    frame: &RgbImageView<'_>,
    binary: &GrayImageView<'_>,
    params: &LightParams,
) -> Vec<Light> {
    if binary.data.len() < binary.width * binary.height
        || frame.data.len() < frame.width * frame.height * 3
    {
        warn!(
            "short buffers: mask {} bytes for {}x{}, frame {} bytes for {}x{}",
            binary.data.len(),
            binary.width,
            binary.height,
            frame.data.len(),
            frame.width,
            frame.height
        );
        return Vec::new();
    }

    let contours = find_external_contours(binary);
    let mut lights = Vec::new();

    for contour in &contours {
        if contour.len() < MIN_CONTOUR_POINTS {
            continue;
        }
        let points: Vec<Point2<f32>> = contour
            .iter()
            .map(|p| Point2::new(p.x as f32, p.y as f32))
            .collect();
        let Some(rect) = min_area_rect(&points) else {
            continue;
        };

        let light = Light::from_rotated_rect(rect);
        if !is_light(&light, params) {
            trace!(
                "reject light at {:?}: ratio {:?}, tilt {:.1}",
                light.center,
                light.ratio(),
                light.tilt_angle
            );
            continue;
        }

        let Some(color) = light_color(frame, contour, &light.bounding_rect()) else {
            trace!("drop light at {:?}: box leaves the frame", light.center);
            continue;
        };
        lights.push(light.with_color(color));
    }

    debug!("{} contours -> {} lights", contours.len(), lights.len());
    lights
}

/// Shape test: `min_ratio < width / length < max_ratio` and tilt below
/// `max_angle`.
pub fn is_light(light: &Light, params: &LightParams) -> bool {
    let Some(ratio) = light.ratio() else {
        return false;
    };
    let ratio_ok = params.min_ratio < ratio && ratio < params.max_ratio;
    let angle_ok = light.tilt_angle < params.max_angle;
    ratio_ok && angle_ok
}

/// Compare summed red and blue over the pixels of `rect` that lie inside
/// `contour`. Ties go to blue. Returns `None` when `rect` is not fully inside
/// the frame.
pub fn light_color(
    frame: &RgbImageView<'_>,
    contour: &[Point2<i32>],
    rect: &BoundingRect,
) -> Option<LightColor> {
    if !rect.fits_within(frame.width, frame.height) {
        return None;
    }

    let (mut sum_r, mut sum_b) = (0u64, 0u64);
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            if point_in_polygon(contour, Point2::new(x, y)) {
                let [r, _, b] = frame.pixel(x as usize, y as usize);
                sum_r += r as u64;
                sum_b += b as u64;
            }
        }
    }

    Some(if sum_r > sum_b {
        LightColor::Red
    } else {
        LightColor::Blue
    })
}
