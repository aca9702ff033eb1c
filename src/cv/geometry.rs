// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/cv/geometry.rs

use crate::Point2i;

/// Area enclosed by a closed contour, computed with the shoelace formula over
/// its vertices. Orientation is ignored. Contours of fewer than three points
/// enclose nothing.
///
/// A filled `w` x `h` block traced along its border pixels yields
/// `(w - 1) * (h - 1)`, since the polygon runs through pixel centers.
pub fn contour_area(contour: &[Point2i]) -> f64 {
    let len = contour.len();
    if len < 3 {
        return 0.0;
    }

    let mut twice = 0i64;
    let mut j = len - 1;
    for i in 0..len {
        let a = contour[j];
        let b = contour[i];
        twice += i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y);
        j = i;
    }
    (twice.abs() as f64) / 2.0
}

/// Axis-aligned box around a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Smallest rectangle containing every point, inclusive of the edge pixels.
pub fn bounding_rect(points: &[Point2i]) -> Option<Rect> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(Rect {
        x: min_x,
        y: min_y,
        width: (max_x - min_x + 1) as u32,
        height: (max_y - min_y + 1) as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contour_area_square() {
        let square = [
            Point2i::new(0, 0),
            Point2i::new(0, 10),
            Point2i::new(10, 10),
            Point2i::new(10, 0),
        ];
        assert_eq!(contour_area(&square), 100.0);

        let mut reversed = square;
        reversed.reverse();
        assert_eq!(contour_area(&reversed), 100.0);
    }

    #[test]
    fn test_contour_area_degenerate() {
        assert_eq!(contour_area(&[]), 0.0);
        assert_eq!(contour_area(&[Point2i::new(3, 3)]), 0.0);
        let line = [Point2i::new(0, 0), Point2i::new(5, 0), Point2i::new(9, 0)];
        assert_eq!(contour_area(&line), 0.0);
    }

    #[test]
    fn test_bounding_rect() {
        let pts = [Point2i::new(4, 2), Point2i::new(1, 7), Point2i::new(6, 5)];
        assert_eq!(
            bounding_rect(&pts),
            Some(Rect {
                x: 1,
                y: 2,
                width: 6,
                height: 6
            })
        );
        assert_eq!(bounding_rect(&[]), None);
    }
}
