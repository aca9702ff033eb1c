// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/config.rs

//! Run configuration. A `Settings` value is cloned into the capture worker
//! when a run starts, so edits made afterwards only affect the next run.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Region, Result};

/// Capture rates offered by interactive front ends. Any positive rate is accepted.
pub const RATE_PRESETS: [u32; 4] = [15, 25, 30, 60];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Samples per second.
    pub target_rate: f64,
    pub region: Option<Region>,
    pub detect_saturation: bool,
    pub detect_timing_gap: bool,
    pub detect_discontinuity: bool,
    pub saturation_pixel_threshold: u64,
    pub saturation_overlay_alpha: f32,
    pub timing_gap_multiplier: f64,
    pub discontinuity_diff_threshold: u8,
    pub discontinuity_min_area: f64,
    /// Parent directory for exported reports.
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            target_rate: 30.0,
            region: None,
            detect_saturation: true,
            detect_timing_gap: true,
            detect_discontinuity: true,
            saturation_pixel_threshold: 100,
            saturation_overlay_alpha: 0.5,
            timing_gap_multiplier: 1.5,
            discontinuity_diff_threshold: 30,
            discontinuity_min_area: 500.0,
            output_dir: PathBuf::from("reports"),
        }
    }
}

impl Settings {
    /// Parses and validates a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(text).map_err(|e| Error::Config(e.message().to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.target_rate.is_finite() && self.target_rate > 0.0) {
            return Err(Error::Config(format!(
                "target_rate must be positive, got {}",
                self.target_rate
            )));
        }
        self.frame_interval()?;
        if self.saturation_pixel_threshold == 0 {
            return Err(Error::Config(
                "saturation_pixel_threshold must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.saturation_overlay_alpha) {
            return Err(Error::Config(format!(
                "saturation_overlay_alpha must be within [0, 1], got {}",
                self.saturation_overlay_alpha
            )));
        }
        if !(self.timing_gap_multiplier.is_finite() && self.timing_gap_multiplier > 1.0) {
            return Err(Error::Config(format!(
                "timing_gap_multiplier must be greater than 1.0, got {}",
                self.timing_gap_multiplier
            )));
        }
        if !(self.discontinuity_min_area.is_finite() && self.discontinuity_min_area > 0.0) {
            return Err(Error::Config(format!(
                "discontinuity_min_area must be positive, got {}",
                self.discontinuity_min_area
            )));
        }
        Ok(())
    }

    /// Time between samples at `target_rate`. Rates so small that the
    /// interval overflows a `Duration` are a `Config` error.
    pub fn frame_interval(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(1.0 / self.target_rate).map_err(|e| {
            Error::Config(format!(
                "target_rate {} gives an unusable frame interval: {}",
                self.target_rate, e
            ))
        })
    }

    /// The selected region, or `NoRegionSelected`.
    pub fn region(&self) -> Result<Region> {
        self.region.ok_or(Error::NoRegionSelected)
    }
}

/// Common capture sizes that can be centered on a screen instead of drawing a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPreset {
    Vga,
    Hd,
    FullHd,
}

impl ResolutionPreset {
    pub const ALL: [ResolutionPreset; 3] = [
        ResolutionPreset::Vga,
        ResolutionPreset::Hd,
        ResolutionPreset::FullHd,
    ];

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ResolutionPreset::Vga => (640, 480),
            ResolutionPreset::Hd => (1280, 720),
            ResolutionPreset::FullHd => (1920, 1080),
        }
    }

    /// Region of this size centered on a `screen_width` x `screen_height` screen.
    pub fn centered_on(&self, screen_width: u32, screen_height: u32) -> Result<Region> {
        let (w, h) = self.dimensions();
        Region::centered(w, h, screen_width, screen_height)
    }
}

impl FromStr for ResolutionPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| {
                let (w, h) = p.dimensions();
                s == format!("{}x{}", w, h)
            })
            .ok_or_else(|| Error::Config(format!("unknown resolution preset {:?}", s)))
    }
}
