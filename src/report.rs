// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/report.rs

//! Report export: one fresh directory per export holding `summary.txt` and
//! an `incident_<n>.png` snapshot for each incident. Files written before a
//! failure are left in place.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::ImageError;
use tracing::info;

use crate::config::Settings;
use crate::core::incident::IncidentLog;
use crate::{Error, Region, Result};

/// Run parameters recorded at the top of the summary.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMetadata {
    pub target_rate: f64,
    pub region: Region,
    pub detect_saturation: bool,
    pub saturation_pixel_threshold: u64,
    pub detect_timing_gap: bool,
    pub timing_gap_multiplier: f64,
    pub detect_discontinuity: bool,
    pub discontinuity_diff_threshold: u8,
    pub discontinuity_min_area: f64,
}

impl RunMetadata {
    pub fn new(settings: &Settings, region: Region) -> Self {
        RunMetadata {
            target_rate: settings.target_rate,
            region,
            detect_saturation: settings.detect_saturation,
            saturation_pixel_threshold: settings.saturation_pixel_threshold,
            detect_timing_gap: settings.detect_timing_gap,
            timing_gap_multiplier: settings.timing_gap_multiplier,
            detect_discontinuity: settings.detect_discontinuity,
            discontinuity_diff_threshold: settings.discontinuity_diff_threshold,
            discontinuity_min_area: settings.discontinuity_min_area,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The log was empty; nothing was written.
    NothingToReport,
    /// Path of the report directory.
    Written(PathBuf),
}

pub fn export(log: &IncidentLog, output_dir: &Path, meta: &RunMetadata) -> Result<ExportOutcome> {
    export_at(log, output_dir, meta, Local::now())
}

/// Same as [`export`] with an explicit clock reading for the directory name.
pub fn export_at(
    log: &IncidentLog,
    output_dir: &Path,
    meta: &RunMetadata,
    now: DateTime<Local>,
) -> Result<ExportOutcome> {
    if log.is_empty() {
        info!("no incidents, nothing to export");
        return Ok(ExportOutcome::NothingToReport);
    }

    fs::create_dir_all(output_dir).map_err(|e| io_err(output_dir, e))?;
    let stamp = now.format("%Y%m%d_%H%M%S").to_string();
    let report_dir = create_fresh_dir(output_dir, &stamp)?;

    let summary_path = report_dir.join("summary.txt");
    fs::write(&summary_path, render_summary(log, meta, &stamp))
        .map_err(|e| io_err(&summary_path, e))?;

    for (n, incident) in log.iter().enumerate() {
        let path = report_dir.join(format!("incident_{}.png", n + 1));
        let snapshot = incident.snapshot();
        let image = snapshot.to_rgb_image().ok_or_else(|| Error::InvalidBuffer {
            expected: snapshot.pixel_count() * 3,
            actual: snapshot.data().len(),
        })?;
        image.save(&path).map_err(|e| match e {
            ImageError::IoError(source) => Error::ExportIo { path, source },
            source => Error::ImageEncode { path, source },
        })?;
    }

    info!(
        path = %report_dir.display(),
        incidents = log.len(),
        "report exported"
    );
    Ok(ExportOutcome::Written(report_dir))
}

fn io_err(path: &Path, source: io::Error) -> Error {
    Error::ExportIo {
        path: path.to_path_buf(),
        source,
    }
}

/// Creates `report_<stamp>`, or `report_<stamp>_2`, `_3`, ... if taken.
fn create_fresh_dir(parent: &Path, stamp: &str) -> Result<PathBuf> {
    let mut attempt = 1u32;
    loop {
        let name = if attempt == 1 {
            format!("report_{}", stamp)
        } else {
            format!("report_{}_{}", stamp, attempt)
        };
        let path = parent.join(name);
        match fs::create_dir(&path) {
            Ok(()) => return Ok(path),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(io_err(&path, e)),
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

pub fn render_summary(log: &IncidentLog, meta: &RunMetadata, stamp: &str) -> String {
    Summary { log, meta, stamp }.to_string()
}

struct Summary<'a> {
    log: &'a IncidentLog,
    meta: &'a RunMetadata,
    stamp: &'a str,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let meta = self.meta;
        writeln!(f, "Screen Analysis Report - {}", self.stamp)?;
        writeln!(f, "FPS: {}", meta.target_rate)?;
        writeln!(f, "ROI: {}", meta.region)?;
        writeln!(f)?;
        writeln!(f, "Settings:")?;
        writeln!(
            f,
            "Saturation detection: {}, pixel threshold: {}",
            on_off(meta.detect_saturation),
            meta.saturation_pixel_threshold
        )?;
        writeln!(
            f,
            "Timing-gap detection: {}, multiplier: {}",
            on_off(meta.detect_timing_gap),
            meta.timing_gap_multiplier
        )?;
        writeln!(
            f,
            "Discontinuity detection: {}, diff threshold: {}, min area: {}",
            on_off(meta.detect_discontinuity),
            meta.discontinuity_diff_threshold,
            meta.discontinuity_min_area
        )?;
        writeln!(f)?;

        for (n, incident) in self.log.iter().enumerate() {
            writeln!(f, "Incident #{}", n + 1)?;
            writeln!(
                f,
                "Timestamp: {}",
                incident.timestamp().format("%Y-%m-%d %H:%M:%S%.3f")
            )?;
            writeln!(f, "Type: {}", incident.kind())?;
            writeln!(f, "Details: {}", incident.detail())?;
            writeln!(f)?;
        }
        Ok(())
    }
}
