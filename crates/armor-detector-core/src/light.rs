use crate::{BoundingRect, RotatedRect};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Dominant color of a light bar (also the enemy color to aim at).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightColor {
    #[default]
    Red,
    Blue,
}

/// One light bar candidate derived from a contour's minimal rotated rectangle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// Source rectangle.
    pub rect: RotatedRect,
    /// Upper end of the long axis (`top.y <= bottom.y`).
    pub top: Point2<f32>,
    pub bottom: Point2<f32>,
    pub center: Point2<f32>,
    /// Long side.
    pub length: f32,
    /// Short side.
    pub width: f32,
    /// Deviation of the long axis from vertical, degrees in `[0, 90]`.
    pub tilt_angle: f32,
    /// `None` until the color-sampling pass has run.
    pub color: Option<LightColor>,
}

impl Light {
    pub fn from_rotated_rect(rect: RotatedRect) -> Self {
        let (u, v) = rect.axes();
        let (long_axis, length, width) = if rect.width >= rect.height {
            (u, rect.width, rect.height)
        } else {
            (v, rect.height, rect.width)
        };

        let half = long_axis * (0.5 * length);
        let (mut top, mut bottom) = (rect.center - half, rect.center + half);
        if top.y > bottom.y || (top.y == bottom.y && top.x > bottom.x) {
            std::mem::swap(&mut top, &mut bottom);
        }

        let tilt_angle = (top.x - bottom.x)
            .abs()
            .atan2((top.y - bottom.y).abs())
            .to_degrees();

        Self {
            rect,
            top,
            bottom,
            center: rect.center,
            length,
            width,
            tilt_angle,
            color: None,
        }
    }

    pub fn with_color(mut self, color: LightColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Short side over long side; `None` for a degenerate (zero-length) light.
    #[inline]
    pub fn ratio(&self) -> Option<f32> {
        (self.length > 0.0).then(|| self.width / self.length)
    }

    /// Integer box covering the whole rotated rectangle.
    #[inline]
    pub fn bounding_rect(&self) -> BoundingRect {
        self.rect.bounding_rect()
    }
}
