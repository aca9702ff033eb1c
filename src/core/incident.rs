// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/core/incident.rs

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::core::window::Sample;
use crate::Frame;

/// Which detector produced an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectorKind {
    Saturation,
    TimingGap,
    StructuralDiscontinuity,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::Saturation => "saturation",
            DetectorKind::TimingGap => "timing-gap",
            DetectorKind::StructuralDiscontinuity => "structural-discontinuity",
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a detector firing, before it is stamped into the log.
#[derive(Debug, Clone)]
pub struct Detection {
    pub kind: DetectorKind,
    pub detail: String,
    pub snapshot: Frame,
}

/// Immutable record of one detected anomaly.
#[derive(Debug, Clone)]
pub struct Incident {
    timestamp: DateTime<Local>,
    offset: f64,
    kind: DetectorKind,
    detail: String,
    snapshot: Frame,
}

impl Incident {
    /// Stamps a detection with the capture time of the sample that triggered it.
    pub fn new(detection: Detection, sample: &Sample) -> Self {
        Incident {
            timestamp: sample.captured_at,
            offset: sample.timestamp,
            kind: detection.kind,
            detail: detection.detail,
            snapshot: detection.snapshot,
        }
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Seconds since the start of the run.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn kind(&self) -> DetectorKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn snapshot(&self) -> &Frame {
        &self.snapshot
    }
}

/// Append-only, detection-ordered list of incidents for one run.
///
/// Entries are reference counted, so cloning the log for export is cheap and
/// never races with an append in progress.
#[derive(Debug, Clone, Default)]
pub struct IncidentLog {
    incidents: Vec<Arc<Incident>>,
}

impl IncidentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, incident: Incident) {
        self.incidents.push(Arc::new(incident));
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Incident> {
        self.incidents.get(index).map(Arc::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.iter().map(Arc::as_ref)
    }

    /// Number of incidents per detector.
    pub fn count_of(&self, kind: DetectorKind) -> usize {
        self.iter().filter(|i| i.kind() == kind).count()
    }
}
