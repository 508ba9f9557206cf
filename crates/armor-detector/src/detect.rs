use crate::core::Armor;
use crate::{core, Detector, DetectorParams, DetectorParamsError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid RGB image buffer length (expected {expected} bytes, got {got})")]
    InvalidRgbBuffer { expected: usize, got: usize },

    #[error("invalid RGB image dimensions (width={width}, height={height})")]
    InvalidRgbDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Params(#[from] DetectorParamsError),
}

/// Convert an `image::RgbImage` into the lightweight `armor-detector-core` view type.
pub fn rgb_view(img: &::image::RgbImage) -> core::RgbImageView<'_> {
    core::RgbImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Copy a core grayscale image into an `image::GrayImage`.
pub fn gray_to_image(img: &core::GrayImage) -> ::image::GrayImage {
    ::image::GrayImage::from_fn(img.width as u32, img.height as u32, |x, y| {
        ::image::Luma([img.get(x as usize, y as usize)])
    })
}

/// One-shot detection with a fresh detector (no numeral classifier).
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(width = img.width(), height = img.height()))
)]
pub fn detect_armors(
    img: &::image::RgbImage,
    params: DetectorParams,
) -> Result<Vec<Armor>, DetectError> {
    let mut detector = Detector::new(params)?;
    Ok(detector.detect(&rgb_view(img)))
}

/// Build an `image::RgbImage` from a raw interleaved RGB buffer.
pub fn rgb_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<::image::RgbImage, DetectError> {
    let w = usize::try_from(width).ok();
    let h = usize::try_from(height).ok();
    let Some((w, h)) = w.zip(h) else {
        return Err(DetectError::InvalidRgbDimensions { width, height });
    };
    let Some(expected) = w.checked_mul(h).and_then(|n| n.checked_mul(3)) else {
        return Err(DetectError::InvalidRgbDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(DetectError::InvalidRgbBuffer {
            expected,
            got: pixels.len(),
        });
    }
    ::image::RgbImage::from_raw(width, height, pixels.to_vec())
        .ok_or(DetectError::InvalidRgbDimensions { width, height })
}

pub fn detect_armors_from_rgb_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    params: DetectorParams,
) -> Result<Vec<Armor>, DetectError> {
    let img = rgb_image_from_slice(width, height, pixels)?;
    detect_armors(&img, params)
}
