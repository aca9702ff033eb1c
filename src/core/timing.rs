// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/core/timing.rs

use crate::core::detector::AnomalyDetector;
use crate::core::incident::{Detection, DetectorKind};
use crate::core::window::SampleWindow;
use crate::cv::draw::{draw_frame_outline, MARK_COLOR};
use crate::Result;

/// Measured interval that exceeded the allowed gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gap {
    pub expected: f64,
    pub actual: f64,
}

/// Infers dropped or delayed frames from the spacing of capture timestamps.
/// The frame source reports no drops itself, so elapsed time is the only signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingGapDetector {
    pub target_rate: f64,
    pub multiplier: f64,
}

impl TimingGapDetector {
    pub fn new(target_rate: f64, multiplier: f64) -> Self {
        TimingGapDetector {
            target_rate,
            multiplier,
        }
    }

    pub fn expected_interval(&self) -> f64 {
        1.0 / self.target_rate
    }

    /// Largest interval that still counts as on time.
    pub fn allowed_interval(&self) -> f64 {
        self.multiplier / self.target_rate
    }

    /// Compares two consecutive timestamps. Only an interval strictly longer
    /// than the allowed one is a gap.
    pub fn check(&self, previous: f64, latest: f64) -> Option<Gap> {
        let actual = latest - previous;
        if actual > self.allowed_interval() {
            Some(Gap {
                expected: self.expected_interval(),
                actual,
            })
        } else {
            None
        }
    }
}

impl AnomalyDetector for TimingGapDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::TimingGap
    }

    fn inspect(&self, window: &SampleWindow) -> Result<Option<Detection>> {
        let pair = window.latest(2)?;
        let (previous, latest) = (pair[0], pair[1]);

        Ok(self.check(previous.timestamp, latest.timestamp).map(|gap| {
            let mut snapshot = latest.frame.clone();
            draw_frame_outline(&mut snapshot, MARK_COLOR, 3);
            Detection {
                kind: DetectorKind::TimingGap,
                detail: format!(
                    "Expected: {:.4}s, Actual: {:.4}s",
                    gap.expected, gap.actual
                ),
                snapshot,
            }
        }))
    }
}
