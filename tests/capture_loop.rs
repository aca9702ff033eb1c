// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// tests/capture_loop.rs

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use framewatch::core::capture_loop::{CaptureLoop, LoopState, NoopObserver, RunControl};
use framewatch::report::ExportOutcome;
use framewatch::{Analyzer, DetectorKind, Error, Frame, Region, Result, Settings};

fn region() -> Region {
    Region::new(0, 0, 40, 30).unwrap()
}

fn settings() -> Settings {
    Settings {
        region: Some(region()),
        target_rate: 100.0,
        ..Settings::default()
    }
}

#[test]
fn test_capture_failure_keeps_partial_log() {
    let mut calls = 0u32;
    let source = move |r: &Region| -> Result<Frame> {
        calls += 1;
        if calls >= 3 {
            return Err(Error::CaptureFailure("display went away".into()));
        }
        Ok(Frame::filled(r.width(), r.height(), [0, 255, 0]))
    };

    let mut analyzer = Analyzer::new(Settings {
        detect_timing_gap: false,
        ..settings()
    })
    .unwrap();
    analyzer.start(source).unwrap();

    let err = analyzer.wait().unwrap_err();
    assert!(matches!(err, Error::CaptureFailure(_)));
    assert_eq!(analyzer.state(), LoopState::Idle);

    let log = analyzer.incidents();
    assert_eq!(log.len(), 2);
    assert_eq!(log.count_of(DetectorKind::Saturation), 2);

    let dir = tempfile::tempdir().unwrap();
    let ExportOutcome::Written(path) = analyzer.export_report(Some(dir.path())).unwrap() else {
        panic!("expected a written report");
    };
    assert!(path.join("incident_1.png").exists());
    assert!(path.join("incident_2.png").exists());
    assert!(!path.join("incident_3.png").exists());
}

#[test]
fn test_stop_running_loop() {
    let mut analyzer = Analyzer::new(Settings {
        detect_timing_gap: false,
        ..settings()
    })
    .unwrap();
    analyzer
        .start(|r: &Region| -> Result<Frame> {
            Ok(Frame::filled(r.width(), r.height(), [40, 40, 40]))
        })
        .unwrap();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(analyzer.state(), LoopState::Running);

    let summary = analyzer.stop().unwrap().unwrap();
    assert!(summary.iterations > 0);
    assert_eq!(summary.incidents, 0);
    assert_eq!(analyzer.state(), LoopState::Idle);
    assert!(analyzer.stop().unwrap().is_none());
}

#[test]
fn test_restart_resets_log() {
    let mut analyzer = Analyzer::new(Settings {
        detect_timing_gap: false,
        ..settings()
    })
    .unwrap();

    let mut first = 0u32;
    analyzer
        .start(move |r: &Region| -> Result<Frame> {
            first += 1;
            if first > 1 {
                return Err(Error::CaptureFailure("done".into()));
            }
            Ok(Frame::filled(r.width(), r.height(), [0, 255, 0]))
        })
        .unwrap();
    assert!(analyzer.wait().is_err());
    assert_eq!(analyzer.incidents().len(), 1);

    let mut second = 0u32;
    analyzer
        .start(move |r: &Region| -> Result<Frame> {
            second += 1;
            if second > 1 {
                return Err(Error::CaptureFailure("done".into()));
            }
            Ok(Frame::filled(r.width(), r.height(), [10, 10, 10]))
        })
        .unwrap();
    assert!(analyzer.wait().is_err());
    assert!(analyzer.incidents().is_empty());
}

#[test]
fn test_tear_between_consecutive_frames() {
    let mut calls = 0u32;
    let source = move |r: &Region| -> Result<Frame> {
        calls += 1;
        let mut frame = Frame::filled(r.width(), r.height(), [20, 20, 20]);
        if calls == 3 {
            for y in 5..30 {
                for x in 0..40 {
                    frame.put_pixel(x, y, [220, 220, 220]);
                }
            }
        }
        Ok(frame)
    };
    let control = Arc::new(RunControl::new());
    let mut run = CaptureLoop::new(
        &Settings {
            detect_timing_gap: false,
            ..settings()
        },
        source,
        control.clone(),
        Box::new(NoopObserver),
    )
    .unwrap();

    assert!(run.step().unwrap().is_empty());
    assert!(run.step().unwrap().is_empty());
    assert_eq!(
        run.step().unwrap(),
        vec![DetectorKind::StructuralDiscontinuity]
    );
    let log = control.snapshot();
    assert_eq!(log.len(), 1);
    assert_eq!(log.get(0).unwrap().detail(), "Detected 1 potential tears");
}

#[test]
fn test_late_sample_flags_timing_gap() {
    let mut calls = 0u32;
    let source = move |r: &Region| -> Result<Frame> {
        calls += 1;
        if calls == 2 {
            thread::sleep(Duration::from_millis(80));
        }
        Ok(Frame::filled(r.width(), r.height(), [20, 20, 20]))
    };
    let control = Arc::new(RunControl::new());
    let mut run = CaptureLoop::new(
        &Settings {
            target_rate: 30.0,
            ..settings()
        },
        source,
        control.clone(),
        Box::new(NoopObserver),
    )
    .unwrap();

    assert!(run.step().unwrap().is_empty());
    assert_eq!(run.step().unwrap(), vec![DetectorKind::TimingGap]);
    assert!(control
        .snapshot()
        .get(0)
        .unwrap()
        .detail()
        .starts_with("Expected: 0.0333s, Actual: 0."));
}
