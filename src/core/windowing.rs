//! Fixed-depth sliding window over the most recent converter samples.
//!
//! The window is pre-filled with a baseline value so the very first ticks
//! already see a full window. Early feature vectors therefore mix baseline
//! and real readings until N samples have been pushed.

use std::collections::VecDeque;

/// Default number of samples held by the window.
pub const DEFAULT_WINDOW_LEN: usize = 10;

/// Default fill value used before any sample has been read.
pub const DEFAULT_BASELINE: f64 = 177.0;

/// Ordered FIFO of the last N samples, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleWindow {
    samples: VecDeque<f64>,
}

impl SampleWindow {
    /// Create a window of `len` copies of `baseline`.
    ///
    /// A zero length is bumped to one so the window is never empty.
    pub fn new(len: usize, baseline: f64) -> Self {
        let len = len.max(1);
        Self {
            samples: std::iter::repeat(baseline).take(len).collect(),
        }
    }

    /// Append the newest sample and drop the oldest one.
    pub fn push(&mut self, sample: f64) {
        self.samples.pop_front();
        self.samples.push_back(sample);
    }

    /// Number of samples held (always the configured length).
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.samples.iter()
    }

    /// Copy the samples out as a contiguous vector, oldest first.
    pub fn to_vec(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    /// Most recently pushed sample.
    pub fn newest(&self) -> Option<f64> {
        self.samples.back().copied()
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_LEN, DEFAULT_BASELINE)
    }
}
