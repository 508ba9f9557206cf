#![cfg(feature = "cli")]

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use std::path::Path;

fn write_frame(path: &Path) {
    let mut img = RgbImage::new(240, 160);
    for (cx, cy) in [(80.0f32, 80.0f32), (170.0, 80.0)] {
        for y in 0..img.height() {
            for x in 0..img.width() {
                let dx = (x as f32 - cx) / 4.5;
                let dy = (y as f32 - cy) / 20.5;
                if dx * dx + dy * dy <= 1.0 {
                    img.put_pixel(x, y, Rgb([255, 200, 150]));
                }
            }
        }
    }
    img.save(path).expect("save frame");
}

#[test]
fn default_config_prints_json() {
    Command::cargo_bin("armor-detector")
        .expect("binary")
        .arg("default-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"binary_threshold\": 170"))
        .stdout(predicate::str::contains("\"detect_color\": \"red\""));
}

#[test]
fn detect_writes_report_and_debug_images() {
    let dir = tempfile::tempdir().expect("tmp");
    let frame = dir.path().join("frame.png");
    let report = dir.path().join("report.json");
    let overlay = dir.path().join("overlay.png");
    let binary = dir.path().join("binary.png");
    write_frame(&frame);

    Command::cargo_bin("armor-detector")
        .expect("binary")
        .arg("detect")
        .arg(&frame)
        .arg("--report")
        .arg(&report)
        .arg("--overlay")
        .arg(&overlay)
        .arg("--binary")
        .arg(&binary)
        .assert()
        .success();

    let raw = std::fs::read_to_string(&report).expect("report");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    let armors = json["armors"].as_array().expect("armors");
    assert_eq!(armors.len(), 1);
    assert_eq!(armors[0]["armor_type"], "small");
    assert_eq!(json["lights"].as_array().map(Vec::len), Some(2));
    assert!(overlay.exists());
    assert!(binary.exists());
}

#[test]
fn blue_target_finds_nothing_in_red_frame() {
    let dir = tempfile::tempdir().expect("tmp");
    let frame = dir.path().join("frame.png");
    write_frame(&frame);

    Command::cargo_bin("armor-detector")
        .expect("binary")
        .args(["detect", "--color", "blue"])
        .arg(&frame)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"armors\": []"));
}

#[test]
fn missing_image_fails() {
    Command::cargo_bin("armor-detector")
        .expect("binary")
        .arg("detect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no input image"));
}

#[test]
fn invalid_config_fails() {
    let dir = tempfile::tempdir().expect("tmp");
    let frame = dir.path().join("frame.png");
    let config = dir.path().join("config.json");
    write_frame(&frame);
    std::fs::write(&config, r#"{"params":{"light":{"min_ratio":0.5,"max_ratio":0.2}}}"#)
        .expect("config");

    Command::cargo_bin("armor-detector")
        .expect("binary")
        .arg("detect")
        .arg(&frame)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("LightRatioRange"));
}
