// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded sample history.

use alloc::collections::VecDeque;

/// Samples kept per window.
pub(crate) const WINDOW_CAPACITY: usize = 100;

/// Newest-first sample history, capped at [`WINDOW_CAPACITY`].
#[derive(Clone, Debug, Default)]
pub(crate) struct RollingWindow {
    samples: VecDeque<f64>,
}

impl RollingWindow {
    pub(crate) fn push(&mut self, sample: f64) {
        self.samples.push_front(sample);
        self.samples.truncate(WINDOW_CAPACITY);
    }

    pub(crate) fn clear(&mut self) {
        self.samples.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    /// `index` 0 is the newest sample.
    pub(crate) fn get(&self, index: usize) -> Option<f64> {
        self.samples.get(index).copied()
    }

    /// Sum of the newest `count` samples.
    pub(crate) fn sum_newest(&self, count: usize) -> f64 {
        self.samples.iter().take(count).sum()
    }
}
