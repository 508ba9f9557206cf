//! Core types and geometry for armor plate detection.
//!
//! This crate holds everything that does not depend on detection policy:
//! image views, contour tracing, rotated-rectangle fitting, homographies and
//! the `Light` / `Armor` data model shared by the detector and the numeral
//! classifier.

mod armor;
mod contour;
mod geometry;
mod homography;
mod image;
mod light;
mod logger;

pub use armor::{Armor, ArmorType, NumberClassifier};
pub use contour::{approx_simple, find_external_contours, Contour};
pub use geometry::{convex_hull, min_area_rect, point_in_polygon, BoundingRect, RotatedRect};
pub use homography::{homography_from_4pt, warp_perspective_gray, Homography};
pub use image::{
    rgb_to_gray, sample_bilinear, sample_bilinear_u8, to_gray, GrayImage, GrayImageView,
    RgbImageView,
};
pub use light::{Light, LightColor};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
