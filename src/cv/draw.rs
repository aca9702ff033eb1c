// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/cv/draw.rs

//! Annotation helpers for incident snapshots.

use crate::cv::contours::Contour;
use crate::{Frame, Point2i};

/// Red in RGB order, used to outline anomalies.
pub const MARK_COLOR: [u8; 3] = [255, 0, 0];

/// Stamps a `thickness` x `thickness` square centered on `(x, y)`.
fn stamp(frame: &mut Frame, x: i32, y: i32, color: [u8; 3], thickness: u32) {
    let t = thickness.max(1) as i32;
    let start = -(t - 1) / 2;
    for dy in start..start + t {
        for dx in start..start + t {
            frame.put_pixel(x + dx, y + dy, color);
        }
    }
}

/// Bresenham line between two points, clipped to the frame.
pub fn draw_line(frame: &mut Frame, from: Point2i, to: Point2i, color: [u8; 3], thickness: u32) {
    let (mut x, mut y) = (from.x, from.y);
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        stamp(frame, x, y, color, thickness);
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Draws each contour as a closed polyline.
pub fn draw_contours(frame: &mut Frame, contours: &[Contour], color: [u8; 3], thickness: u32) {
    for contour in contours {
        let pts = &contour.points;
        match pts.len() {
            0 => {}
            1 => stamp(frame, pts[0].x, pts[0].y, color, thickness),
            n => {
                for i in 0..n {
                    draw_line(frame, pts[i], pts[(i + 1) % n], color, thickness);
                }
            }
        }
    }
}

/// Outlines the frame edge with a band `thickness` pixels wide.
pub fn draw_frame_outline(frame: &mut Frame, color: [u8; 3], thickness: u32) {
    let (w, h) = (frame.width() as i32, frame.height() as i32);
    let t = thickness as i32;
    for y in 0..h {
        for x in 0..w {
            if x < t || y < t || x >= w - t || y >= h - t {
                frame.put_pixel(x, y, color);
            }
        }
    }
}

/// Highlights masked pixels by dimming everything else.
///
/// Each output pixel is `alpha * masked + (1 - alpha) * original`, where
/// `masked` is the original pixel inside the mask and black outside it. With
/// the default `alpha` of 0.5 matched pixels keep their color and the rest of
/// the frame is darkened by half.
pub fn blend_masked(frame: &Frame, mask: &[u8], alpha: f32) -> Frame {
    let mut out = frame.clone();
    let alpha = alpha.clamp(0.0, 1.0);
    for (px, &m) in out.data_mut().chunks_exact_mut(Frame::CHANNELS).zip(mask) {
        for c in px.iter_mut() {
            let orig = *c as f32;
            let masked = if m != 0 { orig } else { 0.0 };
            *c = (alpha * masked + (1.0 - alpha) * orig).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}
