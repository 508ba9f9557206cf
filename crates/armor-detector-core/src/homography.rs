use crate::{sample_bilinear_u8, GrayImage, GrayImageView};
use nalgebra::{Matrix3, Point2, Vector2, Vector3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }

    /// `self ∘ translate(dx, dy)`: source coordinates are shifted before mapping.
    pub fn pre_translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.h * Matrix3::new_translation(&Vector2::new(dx, dy)))
    }
}

/// Below this `|det|` a map collapses the quad onto a line or a point.
const DEGENERATE_DET: f64 = 1e-9;

/// Projective map taking the unit square `(0,0), (1,0), (1,1), (0,1)` onto `q`
/// (corners in that order).
fn square_to_quad(q: &[Point2<f32>; 4]) -> Option<Matrix3<f64>> {
    let [p0, p1, p2, p3] = q.map(|p| Point2::new(p.x as f64, p.y as f64));
    // sum of the alternating corners vanishes for parallelograms
    let sx = p0.x - p1.x + p2.x - p3.x;
    let sy = p0.y - p1.y + p2.y - p3.y;

    let m = if sx == 0.0 && sy == 0.0 {
        Matrix3::new(
            p1.x - p0.x, p3.x - p0.x, p0.x, //
            p1.y - p0.y, p3.y - p0.y, p0.y, //
            0.0, 0.0, 1.0,
        )
    } else {
        let (dx1, dy1) = (p1.x - p2.x, p1.y - p2.y);
        let (dx2, dy2) = (p3.x - p2.x, p3.y - p2.y);
        let den = dx1 * dy2 - dx2 * dy1;
        if den.abs() < DEGENERATE_DET {
            return None;
        }
        let g = (sx * dy2 - dx2 * sy) / den;
        let h = (dx1 * sy - sx * dy1) / den;
        Matrix3::new(
            p1.x - p0.x + g * p1.x, p3.x - p0.x + h * p3.x, p0.x, //
            p1.y - p0.y + g * p1.y, p3.y - p0.y + h * p3.y, p0.y, //
            g, h, 1.0,
        )
    };

    let det = m.determinant();
    (det.is_finite() && det.abs() >= DEGENERATE_DET).then_some(m)
}

/// Compute H such that `dst ~ H * src` from four correspondences.
///
/// Both quads are expressed as images of the unit square and composed:
/// `H = S(dst) * S(src)^-1`. Corner order must be consistent between `src`
/// and `dst`. Returns `None` for degenerate (e.g. collinear) configurations.
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    let square_from_src = square_to_quad(src)?.try_inverse()?;
    let dst_from_square = square_to_quad(dst)?;
    let h = dst_from_square * square_from_src;

    let s = h[(2, 2)];
    if s.abs() < 1e-12 || h.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(Homography::new(h / s))
}

/// Resample `src` into an `out_w × out_h` patch: patch pixel `(x, y)` reads
/// the source at `h_img_from_patch * (x, y)`.
pub fn warp_perspective_gray(
    src: &GrayImageView<'_>,
    h_img_from_patch: &Homography,
    out_w: usize,
    out_h: usize,
) -> GrayImage {
    let mut out = GrayImage::new(out_w, out_h);
    for y in 0..out_h {
        for x in 0..out_w {
            let pi = h_img_from_patch.apply(Point2::new(x as f32, y as f32));
            out.data[y * out_w + x] = sample_bilinear_u8(src, pi.x, pi.y);
        }
    }
    out
}
