// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/core/discontinuity.rs

//! Tearing heuristic: luminance difference between consecutive frames,
//! binarized, then grouped into external contours. Only clusters with a
//! large enclosed area count, which rejects diffuse noise while catching
//! localized tear bands. This approximates tearing; it does not prove it.

use tracing::debug;

use crate::core::detector::AnomalyDetector;
use crate::core::incident::{Detection, DetectorKind};
use crate::core::window::SampleWindow;
use crate::cv::contours::{find_external_contours, Contour};
use crate::cv::draw::{draw_contours, MARK_COLOR};
use crate::cv::geometry::{bounding_rect, contour_area};
use crate::cv::ComputerVision;
use crate::{Frame, ImageBuffer, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscontinuityOptions {
    /// Luminance difference a pixel must exceed to count as changed.
    pub diff_threshold: u8,
    /// Regions must enclose strictly more than this area.
    pub min_area: f64,
}

impl Default for DiscontinuityOptions {
    fn default() -> Self {
        DiscontinuityOptions {
            diff_threshold: 30,
            min_area: 500.0,
        }
    }
}

/// Structural-discontinuity ("tearing") detector.
pub struct DiscontinuityDetector<CV: ComputerVision> {
    pub options: DiscontinuityOptions,
    pub cv: CV,
}

impl<CV: ComputerVision> DiscontinuityDetector<CV> {
    pub fn new(options: DiscontinuityOptions, cv: CV) -> Self {
        DiscontinuityDetector { options, cv }
    }

    /// Pipeline: Grayscale -> Abs Diff -> Threshold -> External Contours -> Area Filter
    pub fn changed_regions(&self, previous: &Frame, current: &Frame) -> Vec<Contour> {
        let width = current.width();
        let height = current.height();
        let len = current.pixel_count();

        // 1. Grayscale
        let mut grey_prev = vec![0u8; len];
        let mut grey_cur = vec![0u8; len];
        CV::grayscale(previous, &mut grey_prev);
        CV::grayscale(current, &mut grey_cur);

        // 2. Difference
        let mut diff = vec![0u8; len];
        CV::abs_diff(&grey_prev, &grey_cur, &mut diff);

        // 3. Threshold
        let mut mask = vec![0u8; len];
        CV::threshold(&diff, &mut mask, self.options.diff_threshold);

        // 4. Find Contours
        let mut binary = vec![0i32; (width as usize + 2) * (height as usize + 2)];
        let mask_buf = ImageBuffer {
            data: &mask,
            width,
            height,
        };
        let contours = find_external_contours(&mask_buf, &mut binary);

        // 5. Area filter
        contours
            .into_iter()
            .filter(|c| contour_area(&c.points) > self.options.min_area)
            .collect()
    }

    /// Compares two frames; the snapshot outlines the surviving regions on `current`.
    pub fn evaluate(&self, previous: &Frame, current: &Frame) -> Option<Detection> {
        if previous.width() != current.width() || previous.height() != current.height() {
            debug!(
                previous = ?(previous.width(), previous.height()),
                current = ?(current.width(), current.height()),
                "frame size changed, skipping difference check"
            );
            return None;
        }

        let regions = self.changed_regions(previous, current);
        if regions.is_empty() {
            return None;
        }

        debug!(
            regions = ?regions
                .iter()
                .filter_map(|c| bounding_rect(&c.points))
                .collect::<Vec<_>>(),
            "changed regions above minimum area"
        );

        let mut snapshot = current.clone();
        draw_contours(&mut snapshot, &regions, MARK_COLOR, 2);
        Some(Detection {
            kind: DetectorKind::StructuralDiscontinuity,
            detail: format!("Detected {} potential tears", regions.len()),
            snapshot,
        })
    }
}

impl<CV: ComputerVision + Send> AnomalyDetector for DiscontinuityDetector<CV> {
    fn kind(&self) -> DetectorKind {
        DetectorKind::StructuralDiscontinuity
    }

    fn inspect(&self, window: &SampleWindow) -> Result<Option<Detection>> {
        let pair = window.latest(2)?;
        Ok(self.evaluate(&pair[0].frame, &pair[1].frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::scalar::ScalarCV;

    const BG: [u8; 3] = [20, 20, 20];

    fn detector() -> DiscontinuityDetector<ScalarCV> {
        DiscontinuityDetector::new(DiscontinuityOptions::default(), ScalarCV)
    }

    fn with_block(x0: i32, y0: i32, w: i32, h: i32) -> Frame {
        let mut frame = Frame::filled(100, 80, BG);
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                frame.put_pixel(x, y, [255, 255, 255]);
            }
        }
        frame
    }

    #[test]
    fn test_identical_frames_never_fire() {
        let frame = with_block(10, 10, 40, 40);
        assert!(detector().evaluate(&frame, &frame).is_none());
    }

    #[test]
    fn test_large_block_fires() {
        let previous = Frame::filled(100, 80, BG);
        let current = with_block(10, 10, 40, 40);
        let detection = detector().evaluate(&previous, &current).unwrap();
        assert_eq!(detection.kind, DetectorKind::StructuralDiscontinuity);
        assert_eq!(detection.detail, "Detected 1 potential tears");
        // Outline drawn on the border of the changed block.
        assert_eq!(detection.snapshot.pixel(10, 10), Some(MARK_COLOR));
        assert_eq!(detection.snapshot.pixel(30, 30), Some([255, 255, 255]));
    }

    #[test]
    fn test_scattered_noise_never_fires() {
        let previous = Frame::filled(100, 80, BG);
        let mut current = previous.clone();
        for i in 0..200 {
            let x = (i * 37) % 100;
            let y = (i * 53 / 7) % 80;
            if x % 2 == 0 && y % 2 == 0 {
                current.put_pixel(x, y, [255, 255, 255]);
            }
        }
        assert!(detector().evaluate(&previous, &current).is_none());
    }

    #[test]
    fn test_small_block_below_min_area() {
        let previous = Frame::filled(100, 80, BG);
        // 20x20 block encloses 19 * 19 = 361.
        let current = with_block(5, 5, 20, 20);
        assert!(detector().evaluate(&previous, &current).is_none());
    }

    #[test]
    fn test_counts_each_surviving_region() {
        let previous = Frame::filled(100, 80, BG);
        let mut current = with_block(2, 2, 30, 30);
        for y in 40..75 {
            for x in 60..95 {
                current.put_pixel(x, y, [255, 255, 255]);
            }
        }
        let regions = detector().changed_regions(&previous, &current);
        assert_eq!(regions.len(), 2);
    }

    #[test]
    fn test_difference_at_threshold_is_ignored() {
        let previous = Frame::filled(100, 80, [100, 100, 100]);
        let current = Frame::filled(100, 80, [130, 130, 130]);
        assert!(detector().evaluate(&previous, &current).is_none());
        let brighter = Frame::filled(100, 80, [131, 131, 131]);
        assert!(detector().evaluate(&previous, &brighter).is_some());
    }

    #[test]
    fn test_size_change_is_skipped() {
        let previous = Frame::filled(50, 50, BG);
        let current = with_block(0, 0, 60, 60);
        assert!(detector().evaluate(&previous, &current).is_none());
    }
}
