// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/core/window.rs

use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::{Error, Frame, Result};

/// Number of samples the window retains.
pub const WINDOW_CAPACITY: usize = 3;

/// One captured image and when it was taken.
#[derive(Debug, Clone)]
pub struct Sample {
    pub frame: Frame,
    /// Monotonic seconds since the run started.
    pub timestamp: f64,
    /// Wall-clock capture time, used for reporting only.
    pub captured_at: DateTime<Local>,
}

impl Sample {
    pub fn new(frame: Frame, timestamp: f64) -> Self {
        Sample {
            frame,
            timestamp,
            captured_at: Local::now(),
        }
    }
}

/// Fixed-capacity ring of the most recent samples, oldest first.
#[derive(Debug, Default)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
}

impl SampleWindow {
    pub fn new() -> Self {
        SampleWindow {
            samples: VecDeque::with_capacity(WINDOW_CAPACITY + 1),
        }
    }

    /// Appends at the tail, evicting the head once over capacity.
    pub fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > WINDOW_CAPACITY {
            self.samples.pop_front();
        }
    }

    /// The last `n` samples in chronological order.
    pub fn latest(&self, n: usize) -> Result<Vec<&Sample>> {
        let available = self.samples.len();
        if n > available {
            return Err(Error::InsufficientHistory {
                needed: n,
                available,
            });
        }
        Ok(self.samples.range(available - n..).collect())
    }

    pub fn newest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: f64) -> Sample {
        Sample::new(Frame::filled(1, 1, [0, 0, 0]), t)
    }

    #[test]
    fn test_window_never_exceeds_capacity() {
        let mut window = SampleWindow::new();
        for i in 0..10 {
            window.push(sample(i as f64));
            assert!(window.len() <= WINDOW_CAPACITY);
            assert_eq!(window.newest().map(|s| s.timestamp), Some(i as f64));
        }
        let kept: Vec<f64> = window.iter().map(|s| s.timestamp).collect();
        assert_eq!(kept, vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_latest_in_chronological_order() {
        let mut window = SampleWindow::new();
        for t in [0.1, 0.2, 0.3, 0.4] {
            window.push(sample(t));
        }
        let last_two: Vec<f64> = window.latest(2).unwrap().iter().map(|s| s.timestamp).collect();
        assert_eq!(last_two, vec![0.3, 0.4]);
        assert!(window.latest(0).unwrap().is_empty());
    }

    #[test]
    fn test_latest_insufficient_history() {
        let mut window = SampleWindow::new();
        window.push(sample(0.0));
        assert!(matches!(
            window.latest(2),
            Err(Error::InsufficientHistory {
                needed: 2,
                available: 1
            })
        ));
    }
}
