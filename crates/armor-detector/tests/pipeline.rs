#![cfg(feature = "image")]

use armor_detector::core::{Armor, RgbImageView};
use armor_detector::detect::{detect_armors, rgb_view};
use armor_detector::{ArmorType, Detector, DetectorParams, LightColor, NumberClassifier};
use image::{Rgb, RgbImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const RED: Rgb<u8> = Rgb([255, 200, 150]);
const BLUE: Rgb<u8> = Rgb([150, 200, 255]);

/// Filled ellipse; semi-axes 4.5 × 20.5 give a bar about 8 px wide and 40 px long.
fn draw_bar(img: &mut RgbImage, cx: f32, cy: f32, ax: f32, ay: f32, color: Rgb<u8>) {
    for y in 0..img.height() {
        for x in 0..img.width() {
            let dx = (x as f32 - cx) / ax;
            let dy = (y as f32 - cy) / ay;
            if dx * dx + dy * dy <= 1.0 {
                img.put_pixel(x, y, color);
            }
        }
    }
}

fn frame_with_bars(bars: &[(f32, f32, Rgb<u8>)]) -> RgbImage {
    let mut img = RgbImage::new(320, 240);
    for &(cx, cy, color) in bars {
        draw_bar(&mut img, cx, cy, 4.5, 20.5, color);
    }
    img
}

fn detector(color: LightColor) -> Detector {
    let params = DetectorParams {
        detect_color: color,
        ..DetectorParams::default()
    };
    Detector::new(params).expect("valid params")
}

#[test]
fn red_pair_forms_small_armor() {
    let img = frame_with_bars(&[(190.0, 120.0, RED), (100.0, 120.0, RED)]);
    let mut det = detector(LightColor::Red);
    let armors = det.detect(&rgb_view(&img));

    assert_eq!(armors.len(), 1);
    let armor = &armors[0];
    assert_eq!(armor.armor_type, ArmorType::Small);
    assert!(armor.left_light.center.x < armor.right_light.center.x);
    assert!((armor.center.x - 145.0).abs() < 1.0);
    assert!((armor.center.y - 120.0).abs() < 1.0);
    assert_eq!(armor.left_light.color, Some(LightColor::Red));
    assert!(armor.number.is_empty(), "no classifier installed");

    assert_eq!(det.lights().len(), 2);
    for light in det.lights() {
        assert!(light.length >= light.width);
        let ratio = light.ratio().expect("non-degenerate");
        assert!(0.1 < ratio && ratio < 0.4, "ratio {ratio}");
        assert!(light.tilt_angle < 40.0);
    }
}

#[test]
fn wide_pair_forms_large_armor() {
    let img = frame_with_bars(&[(80.0, 120.0, RED), (240.0, 120.0, RED)]);
    let armors = detect_armors(&img, DetectorParams::default()).expect("detect");
    assert_eq!(armors.len(), 1);
    assert_eq!(armors[0].armor_type, ArmorType::Large);
}

#[test]
fn other_color_is_found_but_not_paired() {
    let img = frame_with_bars(&[(100.0, 120.0, BLUE), (190.0, 120.0, BLUE)]);
    let mut det = detector(LightColor::Red);
    assert!(det.detect(&rgb_view(&img)).is_empty());
    assert_eq!(det.lights().len(), 2);
    assert!(det
        .lights()
        .iter()
        .all(|l| l.color == Some(LightColor::Blue)));

    det.set_detect_color(LightColor::Blue);
    assert_eq!(det.detect(&rgb_view(&img)).len(), 1);
}

#[test]
fn enclosed_light_blocks_outer_pair() {
    let img = frame_with_bars(&[
        (100.0, 120.0, RED),
        (150.0, 120.0, RED),
        (200.0, 120.0, RED),
    ]);
    let armors = detect_armors(&img, DetectorParams::default()).expect("detect");
    assert_eq!(armors.len(), 2);
    for armor in &armors {
        let span = armor.right_light.center.x - armor.left_light.center.x;
        assert!(span < 60.0, "outer pair accepted (span {span})");
    }
}

#[test]
fn lying_bars_are_not_lights() {
    let mut img = RgbImage::new(320, 240);
    draw_bar(&mut img, 100.0, 120.0, 20.5, 4.5, RED);
    draw_bar(&mut img, 220.0, 120.0, 20.5, 4.5, RED);
    let mut det = detector(LightColor::Red);
    assert!(det.detect(&rgb_view(&img)).is_empty());
    assert!(det.lights().is_empty());
}

#[test]
fn repeated_detection_is_stable_and_snapshot_is_replaced() {
    let img = frame_with_bars(&[(100.0, 120.0, RED), (190.0, 120.0, RED)]);
    let mut det = detector(LightColor::Red);
    let first = det.detect(&rgb_view(&img));
    let second = det.detect(&rgb_view(&img));
    assert_eq!(first, second);
    assert_eq!(det.armors(), first.as_slice());
    assert_eq!(det.binary_image().width, 320);

    let dark = RgbImage::new(64, 48);
    assert!(det.detect(&rgb_view(&dark)).is_empty());
    assert!(det.lights().is_empty());
    assert!(det.armors().is_empty());
    assert_eq!(
        (det.binary_image().width, det.binary_image().height),
        (64, 48)
    );
    assert!(det.binary_image().data.iter().all(|&v| v == 0));
}

#[test]
fn binary_mask_matches_threshold() {
    let img = frame_with_bars(&[(100.0, 120.0, RED)]);
    let det = detector(LightColor::Red);
    let mask = det.preprocess(&rgb_view(&img));
    assert_eq!(mask.get(100, 120), 255);
    assert_eq!(mask.get(10, 10), 0);
    assert!(mask.data.iter().all(|&v| v == 0 || v == 255));
}

struct CountingClassifier {
    calls: Arc<AtomicUsize>,
}

impl NumberClassifier for CountingClassifier {
    fn extract_numbers(&self, _frame: &RgbImageView<'_>, armors: &mut [Armor]) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for armor in armors {
            armor.number_img = Some(armor_detector::core::GrayImage::new(20, 28));
        }
    }

    fn classify(&self, armors: &mut Vec<Armor>) {
        for armor in armors.iter_mut() {
            armor.number = "3".into();
            armor.confidence = 0.9;
            armor.classification_result = "3: 90.0%".into();
        }
    }
}

#[test]
fn classifier_runs_only_on_frames_with_armors() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut det = detector(LightColor::Red).with_classifier(CountingClassifier {
        calls: Arc::clone(&calls),
    });
    assert!(det.has_classifier());

    det.detect(&rgb_view(&RgbImage::new(64, 48)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let img = frame_with_bars(&[(100.0, 120.0, RED), (190.0, 120.0, RED)]);
    let armors = det.detect(&rgb_view(&img));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(armors.len(), 1);
    assert_eq!(armors[0].classification_result, "3: 90.0%");

    let numbers = det.all_numbers_image();
    assert_eq!((numbers.width, numbers.height), (20, 28));
}
