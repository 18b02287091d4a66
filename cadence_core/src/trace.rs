// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the ticker.
//!
//! This module provides a [`TraceSink`] trait with one method per ticker
//! event: a callback being scheduled, a frame callback that did not tick, a
//! tick, and a reset. All method bodies default to no-ops, so implementing
//! only the events you care about is fine.
//!
//! [`Tracer`] owns an optional boxed sink and is what a
//! [`Ticker`](crate::ticker::Ticker) reports through. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Sinks are called synchronously from inside the ticker. A sink must not
//! call back into the ticker that reports to it.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use crate::ticker::{Primitive, TickerId};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the ticker hands a callback to its timing host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduleEvent {
    /// Which ticker scheduled.
    pub ticker: TickerId,
    /// Sequence number of the scheduling request.
    pub request: u64,
    /// Which host primitive was used.
    pub primitive: Primitive,
    /// Requested delay in milliseconds (`0.0` for frame callbacks).
    pub delay: f64,
    /// Host time when the request was made.
    pub at: f64,
}

/// Emitted when a frame-synced callback fired too early to tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSkipEvent {
    /// Which ticker skipped.
    pub ticker: TickerId,
    /// Host time of the frame callback.
    pub now: f64,
    /// Milliseconds since the previous tick.
    pub elapsed: f64,
    /// Minimum elapsed time that would have ticked.
    pub threshold: f64,
}

/// Emitted after every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickTraceEvent {
    /// Which ticker ticked.
    pub ticker: TickerId,
    /// Tick counter after this tick (1-based).
    pub tick_index: u64,
    /// Host time of the tick.
    pub now: f64,
    /// Unclamped milliseconds since the previous tick.
    pub elapsed: f64,
    /// Delta reported to listeners (clamped by `max_delta`).
    pub delta: f64,
    /// Whether the ticker was paused.
    pub paused: bool,
    /// Milliseconds spent in tick listeners.
    pub cost: f64,
    /// Whether a `"tick"` event was dispatched.
    pub dispatched: bool,
}

/// Emitted when a ticker is reset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResetEvent {
    /// Which ticker was reset.
    pub ticker: TickerId,
    /// Host time of the reset.
    pub at: f64,
    /// The primitive of the pending callback that was cancelled, if any.
    pub cancelled: Option<Primitive>,
    /// Ticks counted before the reset.
    pub ticks: u64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from a ticker.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a host callback is scheduled.
    fn on_schedule(&mut self, e: &ScheduleEvent) {
        _ = e;
    }

    /// Called when a frame-synced callback arrives before the interval.
    fn on_frame_skipped(&mut self, e: &FrameSkipEvent) {
        _ = e;
    }

    /// Called after each tick.
    fn on_tick(&mut self, e: &TickTraceEvent) {
        _ = e;
    }

    /// Called when the ticker is reset.
    fn on_reset(&mut self, e: &ResetEvent) {
        _ = e;
    }
}

/// Shares one sink between a ticker and its owner, who can inspect it while
/// the ticker still reports to it.
impl<T: TraceSink + ?Sized> TraceSink for Rc<RefCell<T>> {
    fn on_schedule(&mut self, e: &ScheduleEvent) {
        self.borrow_mut().on_schedule(e);
    }

    fn on_frame_skipped(&mut self, e: &FrameSkipEvent) {
        self.borrow_mut().on_frame_skipped(e);
    }

    fn on_tick(&mut self, e: &TickTraceEvent) {
        self.borrow_mut().on_tick(e);
    }

    fn on_reset(&mut self, e: &ResetEvent) {
        self.borrow_mut().on_reset(e);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A trace sink that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Owns an optional [`TraceSink`].
///
/// When the `trace` feature is disabled, all methods are no-ops and the sink
/// passed to [`new`](Self::new) is dropped immediately.
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::none()
    }
}

impl Tracer {
    /// Creates a tracer that reports to `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            drop(sink);
            Self {}
        }
    }

    /// Creates a tracer with no sink.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {}
        }
    }

    /// Returns `true` if events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Reports a scheduled callback.
    #[inline]
    pub fn schedule(&mut self, e: &ScheduleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_schedule(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Reports a skipped frame callback.
    #[inline]
    pub fn frame_skipped(&mut self, e: &FrameSkipEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_skipped(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Reports a tick.
    #[inline]
    pub fn tick(&mut self, e: &TickTraceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_tick(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Reports a reset.
    #[inline]
    pub fn reset(&mut self, e: &ResetEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_reset(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_accepts_everything() {
        let mut sink = NoopSink;
        sink.on_tick(&TickTraceEvent {
            ticker: TickerId(0),
            tick_index: 1,
            now: 16.0,
            elapsed: 16.0,
            delta: 16.0,
            paused: false,
            cost: 0.0,
            dispatched: false,
        });
        sink.on_reset(&ResetEvent {
            ticker: TickerId(0),
            at: 20.0,
            cancelled: None,
            ticks: 1,
        });
    }

    #[test]
    fn tracer_none_is_disabled() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_enabled());
        tracer.frame_skipped(&FrameSkipEvent {
            ticker: TickerId(3),
            now: 5.0,
            elapsed: 5.0,
            threshold: 16.0,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_forwards_to_shared_sink() {
        use alloc::vec::Vec;

        #[derive(Default)]
        struct Ticks(Vec<u64>);

        impl TraceSink for Ticks {
            fn on_tick(&mut self, e: &TickTraceEvent) {
                self.0.push(e.tick_index);
            }
        }

        let shared = Rc::new(RefCell::new(Ticks::default()));
        let mut tracer = Tracer::new(Box::new(Rc::clone(&shared)));
        assert!(tracer.is_enabled());
        for i in 1..=3 {
            tracer.tick(&TickTraceEvent {
                ticker: TickerId(0),
                tick_index: i,
                now: 0.0,
                elapsed: 0.0,
                delta: 0.0,
                paused: false,
                cost: 0.0,
                dispatched: true,
            });
        }
        tracer.schedule(&ScheduleEvent {
            ticker: TickerId(0),
            request: 1,
            primitive: Primitive::Frame,
            delay: 0.0,
            at: 0.0,
        });
        assert_eq!(shared.borrow().0, [1, 2, 3]);
    }
}
