//! Overlay rendering for inspecting detections.

use crate::core::{Armor, Light, LightColor};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use nalgebra::Point2;

const ENDPOINT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const RED_LIGHT_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
const BLUE_LIGHT_COLOR: Rgb<u8> = Rgb([0, 255, 255]);
const ARMOR_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const ENDPOINT_RADIUS: i32 = 3;

fn xy(p: Point2<f32>) -> (f32, f32) {
    (p.x, p.y)
}

/// Two-pixel-wide segment.
fn draw_thick_line(img: &mut RgbImage, a: Point2<f32>, b: Point2<f32>, color: Rgb<u8>) {
    draw_line_segment_mut(img, xy(a), xy(b), color);
    let d = b - a;
    let (ox, oy) = if d.x.abs() > d.y.abs() { (0.0, 1.0) } else { (1.0, 0.0) };
    draw_line_segment_mut(img, (a.x + ox, a.y + oy), (b.x + ox, b.y + oy), color);
}

/// Draw light endpoints and axes plus armor diagonals onto `img`.
///
/// Lights are magenta when red and cyan when blue; unlabelled lights are
/// drawn with endpoints only.
pub fn draw_results(img: &mut RgbImage, lights: &[Light], armors: &[Armor]) {
    for light in lights {
        for p in [light.top, light.bottom] {
            draw_hollow_circle_mut(
                img,
                (p.x.round() as i32, p.y.round() as i32),
                ENDPOINT_RADIUS,
                ENDPOINT_COLOR,
            );
        }
        let color = match light.color {
            Some(LightColor::Red) => RED_LIGHT_COLOR,
            Some(LightColor::Blue) => BLUE_LIGHT_COLOR,
            None => continue,
        };
        draw_thick_line(img, light.top, light.bottom, color);
    }

    for armor in armors {
        let (l, r) = (&armor.left_light, &armor.right_light);
        draw_thick_line(img, l.top, r.bottom, ARMOR_COLOR);
        draw_thick_line(img, l.bottom, r.top, ARMOR_COLOR);
    }
}
