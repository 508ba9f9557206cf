//! Planar geometry helpers: rotated rectangles, integer bounding boxes,
//! convex hulls and polygon containment.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Oriented rectangle.
///
/// `width` is measured along the direction `angle` (degrees, from +x towards
/// +y in image coordinates), `height` along the perpendicular.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    pub center: Point2<f32>,
    pub width: f32,
    pub height: f32,
    pub angle: f32,
}

impl RotatedRect {
    pub fn new(center: Point2<f32>, width: f32, height: f32, angle: f32) -> Self {
        Self {
            center,
            width,
            height,
            angle,
        }
    }

    /// Unit vectors along the `width` and `height` sides.
    #[inline]
    pub fn axes(&self) -> (Vector2<f32>, Vector2<f32>) {
        let (sin_a, cos_a) = self.angle.to_radians().sin_cos();
        (Vector2::new(cos_a, sin_a), Vector2::new(-sin_a, cos_a))
    }

    /// Corner points, walking around the rectangle.
    pub fn points(&self) -> [Point2<f32>; 4] {
        let (u, v) = self.axes();
        let hu = u * (0.5 * self.width);
        let hv = v * (0.5 * self.height);
        let c = self.center;
        [c - hu - hv, c + hu - hv, c + hu + hv, c - hu + hv]
    }

    /// Smallest integer rectangle covering all corners (`floor(min)` to
    /// `ceil(max)`, both ends inclusive).
    pub fn bounding_rect(&self) -> BoundingRect {
        let pts = self.points();
        let (min, max) = extent(&pts);
        let x = min.x.floor() as i32;
        let y = min.y.floor() as i32;
        BoundingRect {
            x,
            y,
            width: max.x.ceil() as i32 - x + 1,
            height: max.y.ceil() as i32 - y + 1,
        }
    }
}

/// Axis-aligned integer rectangle with half-open extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingRect {
    /// Bounding rectangle of a point set: `floor(min)` to `floor(max) + 1`.
    pub fn from_points(points: &[Point2<f32>]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let (min, max) = extent(points);
        let x = min.x.floor() as i32;
        let y = min.y.floor() as i32;
        Some(Self {
            x,
            y,
            width: max.x.floor() as i32 - x + 1,
            height: max.y.floor() as i32 - y + 1,
        })
    }

    #[inline]
    pub fn contains(&self, p: Point2<f32>) -> bool {
        self.x as f32 <= p.x
            && p.x < (self.x + self.width) as f32
            && self.y as f32 <= p.y
            && p.y < (self.y + self.height) as f32
    }

    /// True if the rectangle lies entirely inside a `width × height` raster.
    #[inline]
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.width >= 0
            && self.height >= 0
            && (self.x + self.width) as i64 <= width as i64
            && (self.y + self.height) as i64 <= height as i64
    }
}

fn extent(points: &[Point2<f32>]) -> (Point2<f32>, Point2<f32>) {
    let mut min = Point2::new(f32::INFINITY, f32::INFINITY);
    let mut max = Point2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

#[inline]
fn cross(o: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull via Andrew's monotone chain. Collinear points are dropped.
pub fn convex_hull(points: &[Point2<f32>]) -> Vec<Point2<f32>> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Point2<f32>> = Vec::with_capacity(2 * pts.len());
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// Minimal-area enclosing rotated rectangle.
///
/// One side of the optimal rectangle is collinear with a hull edge, so every
/// hull edge is tried as the rectangle's `width` direction.
pub fn min_area_rect(points: &[Point2<f32>]) -> Option<RotatedRect> {
    let hull = convex_hull(points);
    match hull.len() {
        0 => None,
        1 => Some(RotatedRect::new(hull[0], 0.0, 0.0, 0.0)),
        2 => {
            let d = hull[1] - hull[0];
            let center = Point2::from((hull[0].coords + hull[1].coords) * 0.5);
            Some(RotatedRect::new(center, d.norm(), 0.0, d.y.atan2(d.x).to_degrees()))
        }
        n => {
            let mut best: Option<(f32, RotatedRect)> = None;
            for i in 0..n {
                let origin = hull[i];
                let edge = hull[(i + 1) % n] - origin;
                let len = edge.norm();
                if len <= f32::EPSILON {
                    continue;
                }
                let u = edge / len;
                let v = Vector2::new(-u.y, u.x);

                let (mut min_u, mut max_u) = (f32::INFINITY, f32::NEG_INFINITY);
                let (mut min_v, mut max_v) = (f32::INFINITY, f32::NEG_INFINITY);
                for p in &hull {
                    let d = *p - origin;
                    let pu = d.dot(&u);
                    let pv = d.dot(&v);
                    min_u = min_u.min(pu);
                    max_u = max_u.max(pu);
                    min_v = min_v.min(pv);
                    max_v = max_v.max(pv);
                }

                let area = (max_u - min_u) * (max_v - min_v);
                if best.as_ref().is_none_or(|(a, _)| area < *a) {
                    let center = origin
                        + u * (0.5 * (min_u + max_u))
                        + v * (0.5 * (min_v + max_v));
                    let rect = RotatedRect::new(
                        center,
                        max_u - min_u,
                        max_v - min_v,
                        u.y.atan2(u.x).to_degrees(),
                    );
                    best = Some((area, rect));
                }
            }
            best.map(|(_, r)| r)
        }
    }
}

/// Closed-polygon containment test; points on an edge or vertex count as inside.
pub fn point_in_polygon(polygon: &[Point2<i32>], p: Point2<i32>) -> bool {
    let n = polygon.len();
    if n == 0 {
        return false;
    }
    if n == 1 {
        return polygon[0] == p;
    }

    let mut inside = false;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if on_segment(a, b, p) {
            return true;
        }
        if (a.y > p.y) != (b.y > p.y) {
            // p.x < a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y), kept in integers
            let dy = (b.y - a.y) as i64;
            let lhs = (p.x - a.x) as i64 * dy;
            let rhs = (p.y - a.y) as i64 * (b.x - a.x) as i64;
            let left_of_edge = if dy > 0 { lhs < rhs } else { lhs > rhs };
            if left_of_edge {
                inside = !inside;
            }
        }
    }
    inside
}

#[inline]
fn on_segment(a: Point2<i32>, b: Point2<i32>, p: Point2<i32>) -> bool {
    let cross = (b.x - a.x) as i64 * (p.y - a.y) as i64 - (b.y - a.y) as i64 * (p.x - a.x) as i64;
    cross == 0
        && a.x.min(b.x) <= p.x
        && p.x <= a.x.max(b.x)
        && a.y.min(b.y) <= p.y
        && p.y <= a.y.max(b.y)
}
