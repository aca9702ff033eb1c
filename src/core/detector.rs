// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/core/detector.rs

use crate::config::Settings;
use crate::core::discontinuity::{DiscontinuityDetector, DiscontinuityOptions};
use crate::core::incident::{Detection, DetectorKind};
use crate::core::saturation::{SaturationDetector, SaturationOptions};
use crate::core::timing::TimingGapDetector;
use crate::core::window::SampleWindow;
use crate::cv::scalar::ScalarCV;
use crate::Result;

/// A read-only check over the sample window.
///
/// Implementations are pure: they never mutate the window and keep no state
/// between calls, so running them in any order gives the same incidents.
pub trait AnomalyDetector: Send {
    fn kind(&self) -> DetectorKind;

    /// Returns `Ok(None)` when the newest sample looks normal.
    ///
    /// Fails with [`crate::Error::InsufficientHistory`] when the window does
    /// not yet hold enough samples; the capture loop treats that as a skip.
    fn inspect(&self, window: &SampleWindow) -> Result<Option<Detection>>;
}

/// Builds the enabled detectors in their fixed evaluation order:
/// saturation, timing gap, structural discontinuity.
pub fn detectors_for(settings: &Settings) -> Vec<Box<dyn AnomalyDetector>> {
    let mut detectors: Vec<Box<dyn AnomalyDetector>> = Vec::with_capacity(3);

    if settings.detect_saturation {
        detectors.push(Box::new(SaturationDetector::new(
            SaturationOptions {
                pixel_threshold: settings.saturation_pixel_threshold,
                overlay_alpha: settings.saturation_overlay_alpha,
                ..SaturationOptions::default()
            },
            ScalarCV,
        )));
    }

    if settings.detect_timing_gap {
        detectors.push(Box::new(TimingGapDetector::new(
            settings.target_rate,
            settings.timing_gap_multiplier,
        )));
    }

    if settings.detect_discontinuity {
        detectors.push(Box::new(DiscontinuityDetector::new(
            DiscontinuityOptions {
                diff_threshold: settings.discontinuity_diff_threshold,
                min_area: settings.discontinuity_min_area,
            },
            ScalarCV,
        )));
    }

    detectors
}
