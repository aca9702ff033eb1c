// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/core/capture_loop.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::core::detector::{detectors_for, AnomalyDetector};
use crate::core::incident::{DetectorKind, Incident, IncidentLog};
use crate::core::window::{Sample, SampleWindow};
use crate::source::FrameSource;
use crate::{Error, Region, Result};

/// Lifecycle of a capture run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopping,
}

/// Hooks for front ends that want live feedback. Called on the capture
/// worker after the pipeline state for the iteration is settled.
pub trait LoopObserver: Send {
    /// Every captured sample, with the detectors that fired on it.
    fn on_sample(&mut self, _sample: &Sample, _fired: &[DetectorKind]) {}

    /// Each incident right after it is appended to the log.
    fn on_incident(&mut self, _incident: &Incident) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl LoopObserver for NoopObserver {}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared between the capture worker and its controller: the stop
/// flag, the lifecycle state, the incident log and the error that ended the
/// latest run, if any.
#[derive(Debug)]
pub struct RunControl {
    stop: AtomicBool,
    state: Mutex<LoopState>,
    log: Mutex<IncidentLog>,
    failure: Mutex<Option<Error>>,
}

impl Default for RunControl {
    fn default() -> Self {
        RunControl {
            stop: AtomicBool::new(false),
            state: Mutex::new(LoopState::Idle),
            log: Mutex::new(IncidentLog::new()),
            failure: Mutex::new(None),
        }
    }
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the loop to halt after its current iteration.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        let mut state = lock(&self.state);
        if *state == LoopState::Running {
            *state = LoopState::Stopping;
        }
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> LoopState {
        *lock(&self.state)
    }

    pub(crate) fn set_state(&self, state: LoopState) {
        *lock(&self.state) = state;
    }

    /// Clears the stop flag, the log and any leftover failure for a new run.
    pub(crate) fn reset(&self) {
        self.stop.store(false, Ordering::SeqCst);
        *lock(&self.log) = IncidentLog::new();
        *lock(&self.failure) = None;
    }

    pub(crate) fn record_failure(&self, error: Error) {
        *lock(&self.failure) = Some(error);
    }

    /// Removes and returns the error that ended the latest run. Each failure
    /// is handed out once.
    pub fn take_failure(&self) -> Option<Error> {
        lock(&self.failure).take()
    }

    fn append(&self, incident: Incident) {
        lock(&self.log).append(incident);
    }

    /// Consistent copy of the incidents appended so far.
    pub fn snapshot(&self) -> IncidentLog {
        lock(&self.log).clone()
    }
}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub iterations: u64,
    pub incidents: u64,
    /// Iterations whose processing exceeded the frame budget.
    pub overruns: u64,
    pub worst_case: Duration,
}

/// One capture run: pulls frames at the target rate, keeps the sample
/// window, runs the detectors and appends incidents.
pub struct CaptureLoop<S: FrameSource> {
    source: S,
    region: Region,
    frame_budget: Duration,
    detectors: Vec<Box<dyn AnomalyDetector>>,
    window: SampleWindow,
    control: Arc<RunControl>,
    observer: Box<dyn LoopObserver>,
    origin: Instant,
    summary: RunSummary,
}

impl<S: FrameSource> CaptureLoop<S> {
    pub fn new(
        settings: &Settings,
        source: S,
        control: Arc<RunControl>,
        observer: Box<dyn LoopObserver>,
    ) -> Result<Self> {
        settings.validate()?;
        let region = settings.region()?;
        let frame_budget = settings.frame_interval()?;

        Ok(CaptureLoop {
            source,
            region,
            frame_budget,
            detectors: detectors_for(settings),
            window: SampleWindow::new(),
            control,
            observer,
            origin: Instant::now(),
            summary: RunSummary::default(),
        })
    }

    /// Runs until a stop is requested or a capture fails. The state is
    /// `Idle` on return either way and the incidents gathered stay in the
    /// log. Returns `None` when a failure ended the run; the error is then
    /// held by [`RunControl::take_failure`].
    pub fn run(mut self) -> Option<RunSummary> {
        info!(
            region = %self.region,
            budget_ms = self.frame_budget.as_secs_f64() * 1000.0,
            detectors = self.detectors.len(),
            "capture started"
        );
        self.origin = Instant::now();

        let result = loop {
            if self.control.stop_requested() {
                break Ok(());
            }

            let cycle_start = Instant::now();

            if let Err(e) = self.step() {
                error!(error = %e, iteration = self.summary.iterations, "capture run aborted");
                break Err(e);
            }

            let elapsed = cycle_start.elapsed();
            if elapsed > self.summary.worst_case {
                self.summary.worst_case = elapsed;
            }

            if elapsed < self.frame_budget {
                thread::sleep(self.frame_budget - elapsed);
            } else {
                self.summary.overruns += 1;
                debug!(
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    "iteration over frame budget"
                );
            }
        };

        let failed = match result {
            Ok(()) => false,
            Err(e) => {
                self.control.record_failure(e);
                true
            }
        };
        self.control.set_state(LoopState::Idle);
        info!(
            iterations = self.summary.iterations,
            incidents = self.summary.incidents,
            overruns = self.summary.overruns,
            "capture stopped"
        );
        (!failed).then_some(self.summary)
    }

    /// One iteration without pacing: capture, window update, detection.
    /// Returns the detectors that fired.
    pub fn step(&mut self) -> Result<Vec<DetectorKind>> {
        let frame = self.source.capture(&self.region).map_err(|e| match e {
            Error::CaptureFailure(_) => e,
            other => Error::CaptureFailure(other.to_string()),
        })?;
        self.summary.iterations += 1;

        let timestamp = self.origin.elapsed().as_secs_f64();
        self.window.push(Sample::new(frame, timestamp));

        let mut fired = Vec::new();
        for detector in &self.detectors {
            let detection = match detector.inspect(&self.window) {
                Ok(Some(detection)) => detection,
                Ok(None) | Err(Error::InsufficientHistory { .. }) => continue,
                Err(e) => return Err(e),
            };

            let Some(latest) = self.window.newest() else {
                continue;
            };
            let incident = Incident::new(detection, latest);
            warn!(kind = %incident.kind(), detail = incident.detail(), "incident");
            self.observer.on_incident(&incident);
            self.control.append(incident);
            self.summary.incidents += 1;
            fired.push(detector.kind());
        }

        if let Some(latest) = self.window.newest() {
            self.observer.on_sample(latest, &fired);
        }
        Ok(fired)
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }
}
