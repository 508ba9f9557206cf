use armor_detector_core::{rgb_to_gray, GrayImage, RgbImageView};
use log::warn;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Fixed-threshold binarization: `gray > threshold → 255`, else `0`.
///
/// A frame whose buffer holds fewer than `width * height` pixels yields an
/// all-background mask of the full size.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame), fields(width = frame.width, height = frame.height))
)]
pub fn binarize(frame: &RgbImageView<'_>, threshold: u8) -> GrayImage {
    let n = frame.width * frame.height;
    if frame.data.len() < n * 3 {
        warn!(
            "frame buffer holds {} bytes, {}x{} needs {}",
            frame.data.len(),
            frame.width,
            frame.height,
            n * 3
        );
        return GrayImage::new(frame.width, frame.height);
    }
    let data = frame
        .data
        .chunks_exact(3)
        .take(n)
        .map(|px| {
            if rgb_to_gray([px[0], px[1], px[2]]) > threshold {
                255
            } else {
                0
            }
        })
        .collect();
    GrayImage {
        width: frame.width,
        height: frame.height,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_strict() {
        // gray levels: 0, 170, 171, 255
        let data = [0, 0, 0, 170, 170, 170, 171, 171, 171, 255, 255, 255];
        let frame = RgbImageView {
            width: 2,
            height: 2,
            data: &data,
        };
        let mask = binarize(&frame, 170);
        assert_eq!(mask.data, vec![0, 0, 255, 255]);
        assert_eq!((mask.width, mask.height), (2, 2));
    }

    #[test]
    fn short_buffer_gives_blank_mask() {
        let data = [255u8; 9];
        let frame = RgbImageView {
            width: 2,
            height: 2,
            data: &data,
        };
        let mask = binarize(&frame, 100);
        assert_eq!((mask.width, mask.height), (2, 2));
        assert_eq!(mask.data, vec![0; 4]);
    }

    #[test]
    fn empty_frame_gives_empty_mask() {
        let frame = RgbImageView {
            width: 0,
            height: 0,
            data: &[],
        };
        assert!(binarize(&frame, 100).is_empty());
    }
}
