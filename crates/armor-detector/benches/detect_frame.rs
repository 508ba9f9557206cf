use armor_detector::detect::rgb_view;
use armor_detector::{binarize, find_lights, match_lights, Detector, DetectorParams};
use criterion::{criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use std::hint::black_box;

/// 640×480 frame with three plates worth of red bars and some blue clutter.
fn make_frame() -> RgbImage {
    let mut img = RgbImage::from_pixel(640, 480, Rgb([30, 30, 40]));
    let bars = [
        (100.0, 120.0, Rgb([255, 200, 150])),
        (190.0, 120.0, Rgb([255, 200, 150])),
        (320.0, 300.0, Rgb([255, 200, 150])),
        (480.0, 300.0, Rgb([255, 200, 150])),
        (520.0, 100.0, Rgb([150, 200, 255])),
        (600.0, 100.0, Rgb([150, 200, 255])),
    ];
    for (cx, cy, color) in bars {
        for y in 0..img.height() {
            for x in 0..img.width() {
                let dx = (x as f32 - cx) / 4.5;
                let dy = (y as f32 - cy) / 20.5;
                if dx * dx + dy * dy <= 1.0 {
                    img.put_pixel(x, y, color);
                }
            }
        }
    }
    img
}

fn bench_stages(c: &mut Criterion) {
    let img = make_frame();
    let frame = rgb_view(&img);
    let params = DetectorParams::default();
    let mask = binarize(&frame, params.binary_threshold);
    let lights = find_lights(&frame, &mask.view(), &params.light);

    c.bench_function("binarize_640x480", |b| {
        b.iter(|| binarize(black_box(&frame), params.binary_threshold))
    });
    c.bench_function("find_lights_640x480", |b| {
        b.iter(|| find_lights(black_box(&frame), &mask.view(), &params.light))
    });
    c.bench_function("match_lights", |b| {
        b.iter(|| match_lights(black_box(&lights), &params.armor, params.detect_color))
    });
}

fn bench_full(c: &mut Criterion) {
    let img = make_frame();
    let mut detector = match Detector::new(DetectorParams::default()) {
        Ok(d) => d,
        Err(err) => panic!("default params rejected: {err}"),
    };
    c.bench_function("detect_640x480", |b| {
        b.iter(|| detector.detect(black_box(&rgb_view(&img))))
    });
}

criterion_group!(benches, bench_stages, bench_full);
criterion_main!(benches);
