//! Outer-border extraction from binary masks.
//!
//! Foreground pixels (non-zero) are grouped into 8-connected components.
//! Only components that touch the background region surrounding the image
//! produce a contour; blobs sitting inside another blob's hole are skipped,
//! as are the holes themselves.

use crate::GrayImageView;
use nalgebra::{Point2, Vector2};

/// Closed polygon of pixel coordinates; the last point connects to the first.
pub type Contour = Vec<Point2<i32>>;

// Clockwise on screen (y points down): E, SE, S, SW, W, NW, N, NE.
const DIRS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
const WEST: usize = 4;

struct Mask<'a> {
    view: &'a GrayImageView<'a>,
}

impl Mask<'_> {
    #[inline]
    fn is_fg(&self, x: i32, y: i32) -> bool {
        x >= 0
            && y >= 0
            && (x as usize) < self.view.width
            && (y as usize) < self.view.height
            && self.view.data[y as usize * self.view.width + x as usize] != 0
    }

    #[inline]
    fn idx(&self, x: i32, y: i32) -> usize {
        y as usize * self.view.width + x as usize
    }
}

/// Trace the outer border of every external component.
///
/// Contours come out in raster order of each component's first pixel and are
/// compressed so that only direction-change vertices remain.
pub fn find_external_contours(mask: &GrayImageView<'_>) -> Vec<Contour> {
    let (w, h) = (mask.width, mask.height);
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let m = Mask { view: mask };
    let outside = outer_background(&m);

    let mut visited = vec![false; w * h];
    let mut stack = Vec::new();
    let mut contours = Vec::new();

    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let i = m.idx(x, y);
            if visited[i] || !m.is_fg(x, y) {
                continue;
            }

            visited[i] = true;
            stack.push((x, y));
            let mut size = 0usize;
            let mut external = false;
            while let Some((cx, cy)) = stack.pop() {
                size += 1;
                for (k, (dx, dy)) in DIRS.iter().enumerate() {
                    let (nx, ny) = (cx + dx, cy + dy);
                    let inside_raster =
                        nx >= 0 && ny >= 0 && (nx as usize) < w && (ny as usize) < h;
                    if !inside_raster {
                        external |= k % 2 == 0;
                        continue;
                    }
                    let ni = m.idx(nx, ny);
                    if m.is_fg(nx, ny) {
                        if !visited[ni] {
                            visited[ni] = true;
                            stack.push((nx, ny));
                        }
                    } else if k % 2 == 0 && outside[ni] {
                        external = true;
                    }
                }
            }

            if external {
                let border = trace_border(&m, Point2::new(x, y), 8 * size + 8);
                contours.push(approx_simple(border));
            }
        }
    }

    contours
}

/// Background pixels 4-connected to the area beyond the image edges.
fn outer_background(m: &Mask<'_>) -> Vec<bool> {
    let (w, h) = (m.view.width as i32, m.view.height as i32);
    let mut outside = vec![false; m.view.width * m.view.height];
    let mut stack = Vec::new();

    let seed = |x: i32, y: i32, outside: &mut Vec<bool>, stack: &mut Vec<(i32, i32)>| {
        let i = m.idx(x, y);
        if !m.is_fg(x, y) && !outside[i] {
            outside[i] = true;
            stack.push((x, y));
        }
    };
    for x in 0..w {
        seed(x, 0, &mut outside, &mut stack);
        seed(x, h - 1, &mut outside, &mut stack);
    }
    for y in 0..h {
        seed(0, y, &mut outside, &mut stack);
        seed(w - 1, y, &mut outside, &mut stack);
    }

    while let Some((x, y)) = stack.pop() {
        for (dx, dy) in DIRS.iter().step_by(2) {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || ny < 0 || nx >= w || ny >= h {
                continue;
            }
            seed(nx, ny, &mut outside, &mut stack);
        }
    }
    outside
}

fn dir_index(d: Vector2<i32>) -> usize {
    DIRS.iter()
        .position(|&(dx, dy)| dx == d.x && dy == d.y)
        .unwrap_or(WEST)
}

/// Moore-neighbour border following with Jacob's stopping criterion.
///
/// `start` must be the raster-first pixel of its component, so its west
/// neighbour is background.
fn trace_border(m: &Mask<'_>, start: Point2<i32>, max_steps: usize) -> Contour {
    let mut contour = vec![start];
    let mut current = start;
    let mut back_dir = WEST;
    let mut first_next: Option<Point2<i32>> = None;

    for _ in 0..max_steps {
        let found = (1..=8).map(|k| (back_dir + k) % 8).find_map(|d| {
            let (dx, dy) = DIRS[d];
            let n = Point2::new(current.x + dx, current.y + dy);
            m.is_fg(n.x, n.y).then_some((d, n))
        });
        let Some((d, next)) = found else {
            // isolated pixel
            return contour;
        };

        match first_next {
            None => first_next = Some(next),
            Some(f) if current == start && next == f => break,
            Some(_) => {}
        }

        let (bx, by) = DIRS[(d + 7) % 8];
        let backtrack = Point2::new(current.x + bx, current.y + by);
        back_dir = dir_index(backtrack - next);
        current = next;
        contour.push(current);
    }

    if contour.len() > 1 && contour.last() == contour.first() {
        contour.pop();
    }
    contour
}

/// Keep only the vertices where the walking direction changes.
pub fn approx_simple(points: Contour) -> Contour {
    let n = points.len();
    if n < 3 {
        return points;
    }
    let mut out: Contour = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            cur - prev != next - cur
        })
        .map(|i| points[i])
        .collect();
    if out.is_empty() {
        out.push(points[0]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GrayImage;

    fn mask_from_rows(rows: &[&str]) -> GrayImage {
        let height = rows.len();
        let width = rows[0].len();
        let data = rows
            .iter()
            .flat_map(|r| r.bytes().map(|b| if b == b'#' { 255 } else { 0 }))
            .collect();
        GrayImage {
            width,
            height,
            data,
        }
    }

    #[test]
    fn filled_rectangle_compresses_to_corners() {
        let mask = mask_from_rows(&[
            "........", //
            "..#####.", //
            "..#####.", //
            "..#####.", //
            "........",
        ]);
        let contours = find_external_contours(&mask.view());
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        assert_eq!(c.len(), 4);
        for corner in [(2, 1), (6, 1), (6, 3), (2, 3)] {
            assert!(c.contains(&Point2::new(corner.0, corner.1)), "missing {corner:?}");
        }
    }

    #[test]
    fn isolated_pixel_yields_single_point() {
        let mask = mask_from_rows(&["...", ".#.", "..."]);
        let contours = find_external_contours(&mask.view());
        assert_eq!(contours, vec![vec![Point2::new(1, 1)]]);
    }

    #[test]
    fn holes_and_nested_blobs_are_ignored() {
        let mask = mask_from_rows(&[
            "#########", //
            "#.......#", //
            "#..###..#", //
            "#..###..#", //
            "#.......#", //
            "#########",
        ]);
        let contours = find_external_contours(&mask.view());
        assert_eq!(contours.len(), 1);
        assert!(contours[0].contains(&Point2::new(0, 0)));
        assert!(contours[0].iter().all(|p| p.x == 0 || p.y == 0 || p.x == 8 || p.y == 5));
    }

    #[test]
    fn contours_follow_raster_discovery_order() {
        let mask = mask_from_rows(&[
            "......##", //
            "......##", //
            "##......", //
            "##......",
        ]);
        let contours = find_external_contours(&mask.view());
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0][0], Point2::new(6, 0));
        assert!(contours[1].contains(&Point2::new(0, 2)));
    }

    #[test]
    fn blobs_on_the_image_border_are_external() {
        let mask = mask_from_rows(&[
            "##....##", //
            "##....##", //
            "........", //
            "...##...", //
            "...##...",
        ]);
        let contours = find_external_contours(&mask.view());
        assert_eq!(contours.len(), 3);
        assert_eq!(contours[0][0], Point2::new(0, 0));
        assert!(contours[0].contains(&Point2::new(1, 1)));
        assert_eq!(contours[1][0], Point2::new(6, 0));
        assert!(contours[1].contains(&Point2::new(7, 1)));
        assert!(contours[2].contains(&Point2::new(3, 3)));
        assert!(contours[2].contains(&Point2::new(4, 4)));
    }

    #[test]
    fn diagonal_pixels_form_one_component() {
        let mask = mask_from_rows(&["#..", ".#.", "..#"]);
        let contours = find_external_contours(&mask.view());
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 2);
    }

    #[test]
    fn rounded_blob_keeps_many_vertices() {
        let mask = mask_from_rows(&[
            "..........", //
            "...###....", //
            "..#####...", //
            "..#####...", //
            "..#####...", //
            "...###....", //
            "..........",
        ]);
        let contours = find_external_contours(&mask.view());
        assert_eq!(contours.len(), 1);
        assert!(contours[0].len() >= 5);
    }

    #[test]
    fn empty_mask_has_no_contours() {
        let mask = GrayImage::new(0, 0);
        assert!(find_external_contours(&mask.view()).is_empty());
        let mask = GrayImage::new(4, 4);
        assert!(find_external_contours(&mask.view()).is_empty());
    }
}
