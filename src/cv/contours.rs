// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/cv/contours.rs

//! Border following (Suzuki and Abe, 1985) over binary change masks.

use crate::{ImageBuffer, Point2i};

/// Copies `src` into `dst` as 0/1 cells surrounded by a one-cell zero frame.
///
/// # Arguments
/// * `src` - The source `ImageBuffer`; any non-zero pixel is foreground.
/// * `dst` - Scratch cells, at least `(width + 2) * (height + 2)` long.
///
/// # Returns
/// The padded region of `dst`.
pub fn pad_binary<'a>(src: &ImageBuffer, dst: &'a mut [i32]) -> &'a [i32] {
    let width = src.width as usize;
    let height = src.height as usize;
    let stride = width + 2;
    let cells = &mut dst[..stride * (height + 2)];
    cells.fill(0);

    if width > 0 {
        for (row, pixels) in src.data.chunks_exact(width).take(height).enumerate() {
            let start = (row + 1) * stride + 1;
            for (cell, &p) in cells[start..start + width].iter_mut().zip(pixels) {
                *cell = i32::from(p != 0);
            }
        }
    }
    cells
}

/// Direction offsets (x, y), counter-clockwise from east.
pub const NEIGHBORHOOD: [[i32; 2]; 8] = [
    [1, 0],
    [1, -1],
    [0, -1],
    [-1, -1],
    [-1, 0],
    [-1, 1],
    [0, 1],
    [1, 1],
];

/// Flat-index offsets for each direction on rows `stride` cells wide, listed
/// twice so a search can run past direction 7 without wrapping.
pub fn neighbour_offsets(stride: i32) -> [i32; 16] {
    std::array::from_fn(|i| {
        let [dx, dy] = NEIGHBORHOOD[i % 8];
        dx + dy * stride
    })
}

/// One traced border.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    /// Border pixels in tracing order.
    pub points: Vec<Point2i>,
    /// True when this border surrounds a hole rather than a component.
    pub hole: bool,
    /// Index of the enclosing border in the returned list, `None` when the
    /// border sits directly on the image background.
    pub parent: Option<usize>,
}

impl Contour {
    /// Outer border of a component that is not nested inside any hole.
    pub fn is_external(&self) -> bool {
        !self.hole && self.parent.is_none()
    }
}

/// Follows a single border starting at `start`, labelling its cells with
/// `label` (negative where the border closes on the right).
///
/// # Arguments
/// * `cells` - Padded binary image from [`pad_binary`]. Overwritten with labels.
/// * `start` - Flat index of the first border cell.
/// * `label` - Sequence number of this border.
/// * `point` - Image coordinates of `start`.
/// * `hole` - True when tracing the inside of a hole.
/// * `offsets` - Output of [`neighbour_offsets`] for the padded stride.
pub fn trace_border(
    cells: &mut [i32],
    start: usize,
    label: i32,
    mut point: Point2i,
    hole: bool,
    offsets: &[i32; 16],
) -> Vec<Point2i> {
    let step = |from: usize, dir: usize| (from as isize + offsets[dir] as isize) as usize;
    let mut points = Vec::new();

    // Clockwise scan around the start for the first foreground neighbour.
    let first_dir: usize = if hole { 0 } else { 4 };
    let mut dir = first_dir;
    let second = loop {
        dir = dir.wrapping_sub(1) & 7;
        let candidate = step(start, dir);
        if cells[candidate] != 0 {
            break Some(candidate);
        }
        if dir == first_dir {
            break None;
        }
    };

    let Some(second) = second else {
        // Isolated pixel.
        cells[start] = -label;
        points.push(point);
        return points;
    };

    let mut current = start;
    loop {
        let search_from = dir;
        let next = loop {
            dir = (dir + 1) & 15;
            let candidate = step(current, dir);
            if cells[candidate] != 0 {
                break candidate;
            }
        };
        dir &= 7;

        // East neighbour was examined and is background.
        if dir.checked_sub(1).is_some_and(|d| d < search_from) {
            cells[current] = -label;
        } else if cells[current] == 1 {
            cells[current] = label;
        }

        points.push(point);
        let [dx, dy] = NEIGHBORHOOD[dir];
        point.x += dx;
        point.y += dy;

        if next == start && current == second {
            break;
        }
        current = next;
        dir = (dir + 4) & 7;
    }

    points
}

/// Border number to contour index. Number 1 is the image frame, which acts
/// as a hole with no parent.
fn contour_index(label: i32) -> Option<usize> {
    (label > 1).then(|| (label - 2) as usize)
}

/// Parent of a new border given the last border met on the same row.
fn parent_of(contours: &[Contour], hole: bool, last_label: i32) -> Option<usize> {
    let last = contour_index(last_label);
    let last_is_hole = last.map_or(true, |k| contours[k].hole);
    if hole == last_is_hole {
        last.and_then(|k| contours[k].parent)
    } else {
        last
    }
}

/// Traces every outer and hole border of a binary image, with its parent in
/// the border hierarchy.
///
/// # Arguments
/// * `src` - The binary image (any non-zero pixel is foreground).
/// * `scratch` - At least `(width + 2) * (height + 2)` cells.
pub fn find_contours(src: &ImageBuffer, scratch: &mut [i32]) -> Vec<Contour> {
    let width = src.width as usize;
    let height = src.height as usize;
    let mut contours = Vec::new();

    pad_binary(src, scratch);
    let offsets = neighbour_offsets((width + 2) as i32);
    let mut label = 1;

    for y in 0..height {
        let mut last_label = 1;
        let row = (y + 1) * (width + 2) + 1;

        for x in 0..width {
            let pos = row + x;
            let cell = scratch[pos];
            if cell == 0 {
                continue;
            }

            let outer = cell == 1 && scratch[pos - 1] == 0;
            let hole = !outer && cell >= 1 && scratch[pos + 1] == 0;
            if hole && cell > 1 {
                last_label = cell;
            }

            if outer || hole {
                label += 1;
                let parent = parent_of(&contours, hole, last_label);
                let start = Point2i::new(x as i32, y as i32);
                let points = trace_border(scratch, pos, label, start, hole, &offsets);
                contours.push(Contour {
                    points,
                    hole,
                    parent,
                });
            }

            if scratch[pos] != 1 {
                last_label = scratch[pos].abs();
            }
        }
    }

    contours
}

/// Outer borders of the top-level components only. Components nested inside
/// another component's hole are dropped.
pub fn find_external_contours(src: &ImageBuffer, scratch: &mut [i32]) -> Vec<Contour> {
    find_contours(src, scratch)
        .into_iter()
        .filter(Contour::is_external)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_rows(rows: &[&str]) -> (Vec<u8>, u32, u32) {
        let width = rows[0].len() as u32;
        let data = rows
            .iter()
            .flat_map(|r| r.bytes().map(|b| if b == b'1' { 255 } else { 0 }))
            .collect();
        (data, width, rows.len() as u32)
    }

    #[test]
    fn test_pad_binary() {
        let src = ImageBuffer {
            data: &[1, 0, 7, 0, 255, 0, 0, 0, 1],
            width: 3,
            height: 3,
        };

        let mut dst = vec![-5i32; 30];
        let padded = pad_binary(&src, &mut dst);
        assert_eq!(padded.len(), 25);

        #[rustfmt::skip]
        let expected = [
            0, 0, 0, 0, 0,
            0, 1, 0, 1, 0,
            0, 0, 1, 0, 0,
            0, 0, 0, 1, 0,
            0, 0, 0, 0, 0,
        ];
        assert_eq!(padded, &expected[..]);
    }

    #[test]
    fn test_neighbour_offsets_repeat() {
        let offsets = neighbour_offsets(7);
        assert_eq!(offsets[0], 1);
        assert_eq!(offsets[2], -7);
        assert_eq!(offsets[6], 7);
        assert_eq!(offsets[..8], offsets[8..]);
    }

    #[test]
    fn test_ring_has_outer_and_hole() {
        let (data, w, h) = from_rows(&["00000", "01110", "01010", "01110", "00000"]);
        let img = ImageBuffer {
            data: &data,
            width: w,
            height: h,
        };

        let mut scratch = vec![0i32; 7 * 7];
        let contours = find_contours(&img, &mut scratch);

        assert_eq!(contours.len(), 2);
        assert!(!contours[0].hole);
        assert_eq!(contours[0].parent, None);
        assert!(contours[1].hole);
        assert_eq!(contours[1].parent, Some(0));
    }

    #[test]
    fn test_nested_component_is_not_external() {
        let (data, w, h) = from_rows(&[
            "0000000", "0111110", "0100010", "0101010", "0100010", "0111110", "0000000",
        ]);
        let img = ImageBuffer {
            data: &data,
            width: w,
            height: h,
        };

        let mut scratch = vec![0i32; 9 * 9];
        let all = find_contours(&img, &mut scratch);
        assert_eq!(all.len(), 3);
        // The dot sits inside the ring's hole.
        assert!(!all[2].hole);
        assert_eq!(all[2].parent, Some(1));
        assert_eq!(all[2].points.len(), 1);

        let external = find_external_contours(&img, &mut scratch);
        assert_eq!(external.len(), 1);
        assert_eq!(external[0].points.len(), 16);
    }

    #[test]
    fn test_separate_components() {
        let (data, w, h) = from_rows(&["110011", "110011", "000000", "000100"]);
        let img = ImageBuffer {
            data: &data,
            width: w,
            height: h,
        };

        let mut scratch = vec![0i32; ((w + 2) * (h + 2)) as usize];
        let external = find_external_contours(&img, &mut scratch);
        assert_eq!(external.len(), 3);
        assert!(external.iter().all(|c| c.parent.is_none()));
    }

    #[test]
    fn test_trace_isolated_pixel() {
        let (data, w, h) = from_rows(&["000", "010", "000"]);
        let img = ImageBuffer {
            data: &data,
            width: w,
            height: h,
        };
        let mut scratch = vec![0i32; 25];
        pad_binary(&img, &mut scratch);
        let offsets = neighbour_offsets(5);

        let points = trace_border(&mut scratch, 12, 2, Point2i::new(1, 1), false, &offsets);
        assert_eq!(points, vec![Point2i::new(1, 1)]);
        assert_eq!(scratch[12], -2);
    }

    #[test]
    fn test_empty_image_has_no_contours() {
        let data = vec![0u8; 16];
        let img = ImageBuffer {
            data: &data,
            width: 4,
            height: 4,
        };
        let mut scratch = vec![0i32; 36];
        assert!(find_contours(&img, &mut scratch).is_empty());
    }
}
