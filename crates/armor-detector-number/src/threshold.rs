//! Otsu binarization of numeral patches.

use armor_detector_core::GrayImage;

/// Otsu threshold of a set of intensities.
///
/// Pixels strictly above the returned value belong to the bright class.
pub(crate) fn otsu_threshold(samples: &[u8]) -> u8 {
    if samples.is_empty() {
        return 127;
    }

    let mut hist = [0u32; 256];
    for &v in samples {
        hist[v as usize] += 1;
    }

    let total = samples.len() as f64;
    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = -1f64;
    let mut best_t = samples[0];

    for (t, &h) in hist.iter().enumerate() {
        w_b += h as f64;
        if w_b < 1.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f < 1.0 {
            break;
        }

        sum_b += t as f64 * h as f64;
        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;

        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    best_t
}

/// Binarize in place: `> otsu → 255`, else `0`.
pub(crate) fn binarize_otsu(mut img: GrayImage) -> GrayImage {
    let t = otsu_threshold(&img.data);
    for v in &mut img.data {
        *v = if *v > t { 255 } else { 0 };
    }
    img
}
