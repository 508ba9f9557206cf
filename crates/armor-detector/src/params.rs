use armor_detector_core::LightColor;
use serde::{Deserialize, Serialize};

/// Shape limits for a single light bar.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightParams {
    /// Exclusive bounds on `width / length`.
    pub min_ratio: f32,
    pub max_ratio: f32,
    /// Maximum deviation from vertical, degrees.
    pub max_angle: f32,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            min_ratio: 0.1,
            max_ratio: 0.4,
            max_angle: 40.0,
        }
    }
}

/// Pairing limits for two lights forming one plate.
///
/// Center distances are in units of the average light length; each band is
/// half-open `[min, max)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmorParams {
    /// Minimum `shorter / longer` light length ratio.
    pub min_light_ratio: f32,
    pub min_small_center_distance: f32,
    pub max_small_center_distance: f32,
    pub min_large_center_distance: f32,
    pub max_large_center_distance: f32,
    /// Maximum slope of the line joining the light centers, degrees.
    pub max_angle: f32,
}

impl Default for ArmorParams {
    fn default() -> Self {
        Self {
            min_light_ratio: 0.7,
            min_small_center_distance: 0.8,
            max_small_center_distance: 3.2,
            min_large_center_distance: 3.2,
            max_large_center_distance: 5.0,
            max_angle: 35.0,
        }
    }
}

/// Full detector configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    /// Gray levels strictly above this value are foreground.
    pub binary_threshold: u8,
    /// Color of the lights to pair.
    pub detect_color: LightColor,
    pub light: LightParams,
    pub armor: ArmorParams,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            binary_threshold: 170,
            detect_color: LightColor::Red,
            light: LightParams::default(),
            armor: ArmorParams::default(),
        }
    }
}

/// Configuration rejected at detector construction.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetectorParamsError {
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },
    #[error("light ratio bounds must satisfy 0 <= min_ratio < max_ratio, got [{min}, {max}]")]
    LightRatioRange { min: f32, max: f32 },
    #[error("{name} must lie in (0, 90] degrees, got {value}")]
    AngleOutOfRange { name: &'static str, value: f32 },
    #[error("min_light_ratio must lie in [0, 1], got {0}")]
    LightLengthRatio(f32),
    #[error("{band} center distance band [{min}, {max}) is empty")]
    EmptyBand {
        band: &'static str,
        min: f32,
        max: f32,
    },
    #[error("small band ends at {max_small}, past the large band start {min_large}")]
    OverlappingBands { max_small: f32, min_large: f32 },
}

impl DetectorParams {
    pub fn validate(&self) -> Result<(), DetectorParamsError> {
        let l = &self.light;
        let a = &self.armor;
        for (name, value) in [
            ("light.min_ratio", l.min_ratio),
            ("light.max_ratio", l.max_ratio),
            ("light.max_angle", l.max_angle),
            ("armor.min_light_ratio", a.min_light_ratio),
            ("armor.min_small_center_distance", a.min_small_center_distance),
            ("armor.max_small_center_distance", a.max_small_center_distance),
            ("armor.min_large_center_distance", a.min_large_center_distance),
            ("armor.max_large_center_distance", a.max_large_center_distance),
            ("armor.max_angle", a.max_angle),
        ] {
            if !value.is_finite() {
                return Err(DetectorParamsError::NonFinite { name, value });
            }
        }

        if l.min_ratio < 0.0 || l.min_ratio >= l.max_ratio {
            return Err(DetectorParamsError::LightRatioRange {
                min: l.min_ratio,
                max: l.max_ratio,
            });
        }
        for (name, value) in [("light.max_angle", l.max_angle), ("armor.max_angle", a.max_angle)]
        {
            if value <= 0.0 || value > 90.0 {
                return Err(DetectorParamsError::AngleOutOfRange { name, value });
            }
        }
        if !(0.0..=1.0).contains(&a.min_light_ratio) {
            return Err(DetectorParamsError::LightLengthRatio(a.min_light_ratio));
        }
        for (band, min, max) in [
            ("small", a.min_small_center_distance, a.max_small_center_distance),
            ("large", a.min_large_center_distance, a.max_large_center_distance),
        ] {
            if min >= max {
                return Err(DetectorParamsError::EmptyBand { band, min, max });
            }
        }
        if a.max_small_center_distance > a.min_large_center_distance {
            return Err(DetectorParamsError::OverlappingBands {
                max_small: a.max_small_center_distance,
                min_large: a.min_large_center_distance,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(DetectorParams::default().validate(), Ok(()));
    }

    #[test]
    fn inverted_ratio_bounds_fail() {
        let mut p = DetectorParams::default();
        p.light.min_ratio = 0.5;
        assert!(matches!(
            p.validate(),
            Err(DetectorParamsError::LightRatioRange { .. })
        ));
    }

    #[test]
    fn nan_and_angle_limits_fail() {
        let mut p = DetectorParams::default();
        p.armor.max_small_center_distance = f32::NAN;
        assert!(matches!(
            p.validate(),
            Err(DetectorParamsError::NonFinite {
                name: "armor.max_small_center_distance",
                ..
            })
        ));

        let mut p = DetectorParams::default();
        p.armor.max_angle = 120.0;
        assert!(matches!(
            p.validate(),
            Err(DetectorParamsError::AngleOutOfRange { .. })
        ));
    }

    #[test]
    fn empty_band_fails() {
        let mut p = DetectorParams::default();
        p.armor.max_large_center_distance = 3.0;
        assert_eq!(
            p.validate(),
            Err(DetectorParamsError::EmptyBand {
                band: "large",
                min: 3.2,
                max: 3.0
            })
        );
    }

    #[test]
    fn overlapping_bands_fail() {
        let mut p = DetectorParams::default();
        p.armor.max_small_center_distance = 6.0;
        assert_eq!(
            p.validate(),
            Err(DetectorParamsError::OverlappingBands {
                max_small: 6.0,
                min_large: 3.2
            })
        );

        // a gap between the bands is fine
        p.armor.max_small_center_distance = 2.0;
        p.armor.min_large_center_distance = 2.5;
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let p: DetectorParams =
            serde_json::from_str(r#"{"detect_color":"blue","armor":{"max_angle":20.0}}"#)
                .expect("parse");
        assert_eq!(p.detect_color, LightColor::Blue);
        assert_eq!(p.armor.max_angle, 20.0);
        assert_eq!(p.armor.min_light_ratio, 0.7);
        assert_eq!(p.binary_threshold, 170);
    }
}
