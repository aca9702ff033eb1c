// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/analyzer.rs

//! Control surface shared by every front end: configure, `start`, `stop`,
//! export. The capture loop runs on its own thread so none of these calls
//! wait on capture latency, except `stop`, which waits for the current
//! iteration to finish.

use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::Settings;
use crate::core::capture_loop::{
    CaptureLoop, LoopObserver, LoopState, NoopObserver, RunControl, RunSummary,
};
use crate::core::incident::IncidentLog;
use crate::report::{self, ExportOutcome, RunMetadata};
use crate::source::FrameSource;
use crate::{Error, Region, Result};

type Worker = JoinHandle<Option<RunSummary>>;

pub struct Analyzer {
    settings: Settings,
    control: Arc<RunControl>,
    worker: Option<Worker>,
    /// Settings the latest run started with, used for report metadata.
    last_run: Option<RunMetadata>,
}

impl Analyzer {
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Analyzer {
            settings,
            control: Arc::new(RunControl::new()),
            worker: None,
            last_run: None,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the settings. A run already in progress keeps the copy it
    /// started with.
    pub fn set_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn set_region(&mut self, region: Region) {
        self.settings.region = Some(region);
    }

    pub fn state(&self) -> LoopState {
        self.control.state()
    }

    pub fn start<S: FrameSource + 'static>(&mut self, source: S) -> Result<()> {
        self.start_with_observer(source, Box::new(NoopObserver))
    }

    /// Starts a run on a worker thread. Fails with `AlreadyRunning` while a
    /// run is active and with `NoRegionSelected` when no region is set.
    ///
    /// If the previous run ended in a failure nobody collected, that error is
    /// returned instead and nothing starts; the next call starts normally.
    pub fn start_with_observer<S: FrameSource + 'static>(
        &mut self,
        source: S,
        observer: Box<dyn LoopObserver>,
    ) -> Result<()> {
        if self.state() != LoopState::Idle {
            return Err(Error::AlreadyRunning);
        }
        self.reap_worker();
        if let Some(failure) = self.control.take_failure() {
            return Err(failure);
        }

        let settings = self.settings.clone();
        let region = settings.region()?;
        let capture = CaptureLoop::new(&settings, source, self.control.clone(), observer)?;

        self.control.reset();
        self.control.set_state(LoopState::Running);
        self.last_run = Some(RunMetadata::new(&settings, region));

        let spawned = thread::Builder::new()
            .name("framewatch-capture".into())
            .spawn(move || capture.run());
        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.control.set_state(LoopState::Idle);
                Err(Error::CaptureFailure(format!("could not spawn capture thread: {}", e)))
            }
        }
    }

    /// Requests a stop and waits for the worker. Returns `Ok(None)` when the
    /// state is already `Idle`, including after a run that ended on its own
    /// failure; that error stays available from [`Analyzer::take_failure`]
    /// and [`Analyzer::wait`]. A failure in the run being stopped is returned.
    pub fn stop(&mut self) -> Result<Option<RunSummary>> {
        if self.state() == LoopState::Idle {
            self.reap_worker();
            return Ok(None);
        }
        self.control.request_stop();
        self.collect()
    }

    /// Waits for the run to end on its own and returns its summary, or the
    /// failure that ended it if nobody has collected it yet.
    pub fn wait(&mut self) -> Result<Option<RunSummary>> {
        self.collect()
    }

    /// The error that ended the latest run, handed out once. Returns `None`
    /// while a run is still active.
    pub fn take_failure(&mut self) -> Option<Error> {
        if self.state() == LoopState::Idle {
            self.reap_worker();
        }
        self.control.take_failure()
    }

    fn collect(&mut self) -> Result<Option<RunSummary>> {
        let summary = self.reap_worker();
        match self.control.take_failure() {
            Some(failure) => Err(failure),
            None => Ok(summary),
        }
    }

    /// Joins the worker if there is one. A panicked worker is recorded as a
    /// capture failure.
    fn reap_worker(&mut self) -> Option<RunSummary> {
        let handle = self.worker.take()?;
        let summary = match handle.join() {
            Ok(summary) => summary,
            Err(_) => {
                self.control
                    .record_failure(Error::CaptureFailure("capture thread panicked".into()));
                None
            }
        };
        self.control.set_state(LoopState::Idle);
        summary
    }

    /// Copy of the incidents gathered by the current or latest run.
    pub fn incidents(&self) -> IncidentLog {
        self.control.snapshot()
    }

    /// Exports the latest run's incidents. Uses the configured output
    /// directory when `dir` is `None`. Safe to call while running; the
    /// export covers the incidents appended so far.
    pub fn export_report(&self, dir: Option<&Path>) -> Result<ExportOutcome> {
        let log = self.control.snapshot();
        let dir = dir.unwrap_or(self.settings.output_dir.as_path());
        let meta = match &self.last_run {
            Some(meta) => meta.clone(),
            None => {
                if log.is_empty() {
                    return Ok(ExportOutcome::NothingToReport);
                }
                RunMetadata::new(&self.settings, self.settings.region()?)
            }
        };
        report::export(&log, dir, &meta)
    }
}

impl Drop for Analyzer {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _ = self.stop();
        }
    }
}
