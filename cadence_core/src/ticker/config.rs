// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ticker configuration.

/// How a ticker paces itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimingMode {
    /// Frame callbacks, ticking only once roughly an interval has passed
    /// since the previous tick.
    Synced,
    /// One tick per frame callback, ignoring the interval.
    Frame,
    /// One tick per fixed-delay callback of `interval` milliseconds.
    #[default]
    Interval,
}

/// Configuration for a [`Ticker`](super::Ticker).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickerConfig {
    /// Target milliseconds between ticks.
    pub interval: f64,
    /// Pacing strategy.
    pub timing_mode: TimingMode,
    /// Upper bound on the reported tick delta in milliseconds; `0.0`
    /// disables clamping.
    pub max_delta: f64,
}

impl TickerConfig {
    /// 20 ticks per second on fixed-delay callbacks, no clamping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interval: 50.0,
            timing_mode: TimingMode::Interval,
            max_delta: 0.0,
        }
    }

    /// 60 ticks per second synced to frames, with deltas clamped to 100 ms
    /// so a backgrounded page does not resume with one huge step.
    #[must_use]
    pub const fn animation() -> Self {
        Self {
            interval: 1000.0 / 60.0,
            timing_mode: TimingMode::Synced,
            max_delta: 100.0,
        }
    }

    /// One tick per frame, whatever the display rate.
    #[must_use]
    pub const fn frame_driven() -> Self {
        Self {
            interval: 1000.0 / 60.0,
            timing_mode: TimingMode::Frame,
            max_delta: 100.0,
        }
    }

    /// Ticks per second implied by [`interval`](Self::interval).
    #[must_use]
    pub fn framerate(&self) -> f64 {
        1000.0 / self.interval
    }
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self::new()
    }
}
