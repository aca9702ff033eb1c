// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/core/saturation.rs

use crate::core::detector::AnomalyDetector;
use crate::core::incident::{Detection, DetectorKind};
use crate::core::window::SampleWindow;
use crate::cv::draw::blend_masked;
use crate::cv::ComputerVision;
use crate::{Frame, ImageBuffer, Result};

/// Inclusive HSV bounds on the 8-bit scale (hue in `[0, 180)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

/// Hue 70..170 degrees with saturation and value of at least 100/255.
pub const GREEN_BAND: HsvRange = HsvRange {
    lower: [35, 100, 100],
    upper: [85, 255, 255],
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturationOptions {
    /// The detector fires when strictly more pixels than this match.
    pub pixel_threshold: u64,
    pub band: HsvRange,
    /// Blend factor of the highlight overlay in the snapshot.
    pub overlay_alpha: f32,
}

impl Default for SaturationOptions {
    fn default() -> Self {
        SaturationOptions {
            pixel_threshold: 100,
            band: GREEN_BAND,
            overlay_alpha: 0.5,
        }
    }
}

/// Flags frames with too many pixels in a saturated green band.
pub struct SaturationDetector<CV: ComputerVision> {
    pub options: SaturationOptions,
    pub cv: CV,
}

impl<CV: ComputerVision> SaturationDetector<CV> {
    pub fn new(options: SaturationOptions, cv: CV) -> Self {
        SaturationDetector { options, cv }
    }

    /// Builds the per-pixel match mask (255 = in band) and counts matches.
    pub fn match_mask(&self, frame: &Frame) -> (Vec<u8>, usize) {
        let mut hsv = vec![0u8; frame.data().len()];
        CV::rgb_to_hsv(frame, &mut hsv);

        let mut mask = vec![0u8; frame.pixel_count()];
        CV::in_range(
            &hsv,
            &mut mask,
            self.options.band.lower,
            self.options.band.upper,
        );

        let count = CV::count_non_zero(&ImageBuffer {
            data: &mask,
            width: frame.width(),
            height: frame.height(),
        });
        (mask, count)
    }

    /// Checks one frame. The snapshot keeps matched pixels and dims the rest.
    pub fn evaluate(&self, frame: &Frame) -> Option<Detection> {
        let (mask, count) = self.match_mask(frame);
        if count as u64 <= self.options.pixel_threshold {
            return None;
        }

        Some(Detection {
            kind: DetectorKind::Saturation,
            detail: format!("Detected {} green pixels", count),
            snapshot: blend_masked(frame, &mask, self.options.overlay_alpha),
        })
    }
}

impl<CV: ComputerVision + Send> AnomalyDetector for SaturationDetector<CV> {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Saturation
    }

    fn inspect(&self, window: &SampleWindow) -> Result<Option<Detection>> {
        let latest = window.latest(1)?;
        Ok(self.evaluate(&latest[0].frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::window::Sample;
    use crate::cv::scalar::ScalarCV;

    const GREEN: [u8; 3] = [0, 200, 0];
    const GREY: [u8; 3] = [90, 90, 90];

    /// 20x20 grey frame with exactly `k` green pixels in raster order.
    fn frame_with_green(k: usize) -> Frame {
        let mut frame = Frame::filled(20, 20, GREY);
        for i in 0..k {
            frame.put_pixel((i % 20) as i32, (i / 20) as i32, GREEN);
        }
        frame
    }

    fn detector(threshold: u64) -> SaturationDetector<ScalarCV> {
        SaturationDetector::new(
            SaturationOptions {
                pixel_threshold: threshold,
                ..SaturationOptions::default()
            },
            ScalarCV,
        )
    }

    #[test]
    fn test_fires_above_threshold_with_exact_count() {
        let detection = detector(100).evaluate(&frame_with_green(137)).unwrap();
        assert_eq!(detection.kind, DetectorKind::Saturation);
        assert_eq!(detection.detail, "Detected 137 green pixels");
    }

    #[test]
    fn test_silent_at_or_below_threshold() {
        assert!(detector(100).evaluate(&frame_with_green(100)).is_none());
        assert!(detector(100).evaluate(&frame_with_green(3)).is_none());
    }

    #[test]
    fn test_band_edges() {
        let d = detector(0);
        // Dark green: value below 100.
        assert!(d.evaluate(&Frame::filled(2, 2, [0, 90, 0])).is_none());
        // Washed-out green: saturation below 100.
        assert!(d.evaluate(&Frame::filled(2, 2, [200, 255, 200])).is_none());
        // Cyan sits at hue 90, outside the band.
        assert!(d.evaluate(&Frame::filled(2, 2, [0, 255, 255])).is_none());
        // Yellow-green at hue 40 is inside.
        assert!(d.evaluate(&Frame::filled(2, 2, [170, 255, 0])).is_some());
    }

    #[test]
    fn test_degenerate_frames_terminate() {
        let d = detector(100);
        assert!(d.evaluate(&Frame::filled(64, 64, [0, 0, 0])).is_none());
        let all_green = d.evaluate(&Frame::filled(64, 64, [0, 255, 0])).unwrap();
        assert_eq!(all_green.detail, "Detected 4096 green pixels");
    }

    #[test]
    fn test_snapshot_highlights_matches() {
        let detection = detector(0).evaluate(&frame_with_green(1)).unwrap();
        assert_eq!(detection.snapshot.pixel(0, 0), Some(GREEN));
        assert_eq!(detection.snapshot.pixel(5, 5), Some([45, 45, 45]));
    }

    #[test]
    fn test_inspect_needs_one_sample() {
        let d = detector(100);
        let mut window = SampleWindow::new();
        assert!(d.inspect(&window).is_err());
        window.push(Sample::new(frame_with_green(150), 0.0));
        assert!(d.inspect(&window).unwrap().is_some());
    }
}
