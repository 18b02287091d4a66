// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame-timing ticker.
//!
//! A [`Ticker`] keeps exactly one callback pending on its [`TimingHost`].
//! Each time the callback fires the ticker schedules the next one and then,
//! depending on its [`TimingMode`], ticks: it measures the time since the
//! previous tick, updates its counters, and dispatches a `"tick"` event
//! carrying a [`TickInfo`] to its listeners.
//!
//! ```text
//!   initialize ──► schedule ──► host callback ──► schedule ──► tick? ──► dispatch "tick"
//!                     ▲                               │
//!                     └───────────────────────────────┘
//!   reset ──► cancel pending, clear "tick" listeners and statistics
//! ```
//!
//! Timing modes:
//!
//! - [`TimingMode::Interval`]: a fixed-delay callback every `interval` ms,
//!   ticking every time.
//! - [`TimingMode::Frame`]: a frame callback, ticking every frame.
//! - [`TimingMode::Synced`]: a frame callback, ticking only once at least
//!   97% of `interval` has passed since the previous tick. The slack lets a
//!   tick land a little early instead of slipping a whole frame.
//!
//! Both frame modes fall back to fixed-delay callbacks when the host has no
//! frame primitive.

mod config;
#[cfg(feature = "std")]
pub mod global;
mod host;
mod manual;
mod window;

pub use config::{TickerConfig, TimingMode};
pub use host::{Callback, Primitive, TimerId, TimingHost};
pub use manual::ManualHost;

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::event::{Dispatcher, Event, Listener, ListenerOptions, Payload};
use crate::trace::{
    FrameSkipEvent, ResetEvent, ScheduleEvent, TickTraceEvent, TraceSink, Tracer,
};

use window::RollingWindow;

/// Event type a ticker dispatches on every tick.
pub const TICK: &str = "tick";

/// Fraction of the interval after which a frame-synced callback may tick.
const EARLY_FIRE_FACTOR: f64 = 0.97;

/// Timing data carried by a `"tick"` event as [`Payload::Tick`].
///
/// All times are milliseconds relative to [`Ticker::initialize`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickInfo {
    /// Time since the previous tick, clamped to the ticker's `max_delta`
    /// when that is non-zero.
    pub delta: f64,
    /// Whether the ticker was paused.
    pub paused: bool,
    /// Time of this tick.
    pub time: f64,
    /// Time of this tick, not counting time spent paused.
    pub run_time: f64,
}

/// Identifies a ticker in its events and traces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickerId(pub u32);

static NEXT_TICKER_ID: AtomicU32 = AtomicU32::new(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Handler {
    Synced,
    Frame,
    Timeout,
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    request: u64,
    id: TimerId,
    primitive: Primitive,
}

#[derive(Debug)]
struct TickerState {
    config: TickerConfig,
    paused: bool,
    initialized: bool,
    /// Host time of `initialize`.
    start_time: f64,
    /// Relative time of the previous tick.
    last_time: f64,
    paused_time: f64,
    ticks: u64,
    paused_ticks: u64,
    /// Relative tick times.
    times: RollingWindow,
    /// Milliseconds spent per tick.
    tick_times: RollingWindow,
    pending: Option<Pending>,
    next_request: u64,
    /// Bumped by `reset` so an in-flight tick leaves the fresh state alone.
    epoch: u64,
}

struct TickerInner {
    id: TickerId,
    host: Rc<dyn TimingHost>,
    dispatcher: Dispatcher<TickerId>,
    state: RefCell<TickerState>,
    tracer: RefCell<Tracer>,
}

/// A self-rescheduling heartbeat that dispatches `"tick"` events.
///
/// `Ticker` is a cheap handle: clones share the same state and listeners.
/// Host callbacks only hold a weak reference, so dropping every handle stops
/// the loop at its next callback.
///
/// Ticking starts with [`initialize`](Self::initialize) and stops with
/// [`reset`](Self::reset), which also clears statistics and `"tick"`
/// listeners. Configuration may change at any time; a new interval or mode
/// applies from the next scheduled callback.
#[derive(Clone)]
pub struct Ticker {
    inner: Rc<TickerInner>,
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.inner.state.borrow();
        f.debug_struct("Ticker")
            .field("id", &self.inner.id)
            .field("config", &s.config)
            .field("initialized", &s.initialized)
            .field("paused", &s.paused)
            .field("ticks", &s.ticks)
            .finish_non_exhaustive()
    }
}

impl Ticker {
    /// Creates an uninitialized ticker with [`TickerConfig::default`].
    #[must_use]
    pub fn new(host: Rc<dyn TimingHost>) -> Self {
        Self::with_config(host, TickerConfig::default())
    }

    /// Creates an uninitialized ticker.
    #[must_use]
    pub fn with_config(host: Rc<dyn TimingHost>, config: TickerConfig) -> Self {
        Self {
            inner: Rc::new(TickerInner {
                id: TickerId(NEXT_TICKER_ID.fetch_add(1, Ordering::Relaxed)),
                host,
                dispatcher: Dispatcher::new(),
                state: RefCell::new(TickerState {
                    config,
                    paused: false,
                    initialized: false,
                    start_time: 0.0,
                    last_time: 0.0,
                    paused_time: 0.0,
                    ticks: 0,
                    paused_ticks: 0,
                    times: RollingWindow::default(),
                    tick_times: RollingWindow::default(),
                    pending: None,
                    next_request: 0,
                    epoch: 0,
                }),
                tracer: RefCell::new(Tracer::none()),
            }),
        }
    }

    /// This ticker's id, the `target` of its events.
    #[must_use]
    pub fn id(&self) -> TickerId {
        self.inner.id
    }

    /// Reports scheduling and ticks to `sink` (requires the `trace` feature
    /// to have any effect).
    pub fn set_trace_sink(&self, sink: Box<dyn TraceSink>) {
        *self.inner.tracer.borrow_mut() = Tracer::new(sink);
    }

    /// Whether [`initialize`](Self::initialize) has run since the last reset.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.inner.state.borrow().initialized
    }

    // -- Lifecycle --

    /// Starts ticking: records the start time, clears statistics, and
    /// schedules the first callback. Does nothing if already initialized.
    pub fn initialize(&self) {
        {
            let mut s = self.inner.state.borrow_mut();
            if s.initialized {
                return;
            }
            s.initialized = true;
            s.start_time = self.inner.host.now();
            s.last_time = 0.0;
            s.times.clear();
            s.tick_times.clear();
            s.times.push(0.0);
        }
        self.setup_tick();
    }

    /// Stops ticking: cancels the pending callback, removes every `"tick"`
    /// listener, and clears statistics and counters. The configuration and
    /// the paused flag are kept. Does nothing if not initialized.
    pub fn reset(&self) {
        let (cancelled, ticks) = {
            let mut s = self.inner.state.borrow_mut();
            if !s.initialized {
                return;
            }
            let ticks = s.ticks;
            let cancelled = s.pending.take();
            s.initialized = false;
            s.start_time = 0.0;
            s.last_time = 0.0;
            s.paused_time = 0.0;
            s.ticks = 0;
            s.paused_ticks = 0;
            s.times.clear();
            s.tick_times.clear();
            s.epoch += 1;
            (cancelled, ticks)
        };
        if let Some(pending) = cancelled {
            match pending.primitive {
                Primitive::Frame => self.inner.host.cancel_frame(pending.id),
                Primitive::Timeout => self.inner.host.clear_timeout(pending.id),
            }
        }
        self.inner.dispatcher.remove_all_listeners(Some(TICK));
        self.inner.tracer.borrow_mut().reset(&ResetEvent {
            ticker: self.inner.id,
            at: self.inner.host.now(),
            cancelled: cancelled.map(|p| p.primitive),
            ticks,
        });
    }

    /// Ticks once, now: advances counters and dispatches `"tick"` if anyone
    /// listens. The host loop calls this; calling it directly forces an extra
    /// tick. Does nothing if not initialized.
    pub fn tick(&self) {
        let host = &self.inner.host;
        let started = host.now();
        let (info, elapsed, tick_index, epoch) = {
            let mut s = self.inner.state.borrow_mut();
            if !s.initialized {
                return;
            }
            let time = started - s.start_time;
            let elapsed = time - s.last_time;
            s.last_time = time;
            s.ticks += 1;
            if s.paused {
                s.paused_ticks += 1;
                s.paused_time += elapsed;
            }
            let max_delta = s.config.max_delta;
            let info = TickInfo {
                delta: if max_delta > 0.0 {
                    elapsed.min(max_delta)
                } else {
                    elapsed
                },
                paused: s.paused,
                time,
                run_time: time - s.paused_time,
            };
            (info, elapsed, s.ticks, s.epoch)
        };

        let dispatched = self.inner.dispatcher.has_listener(TICK);
        if dispatched {
            let mut event = Event::new(TICK, false, false).with_payload(Payload::Tick(info));
            self.inner.dispatcher.dispatch(self.inner.id, &mut event);
        }
        let cost = host.now() - started;

        {
            let mut s = self.inner.state.borrow_mut();
            if s.epoch == epoch {
                s.tick_times.push(cost);
                s.times.push(info.time);
            }
        }
        self.inner.tracer.borrow_mut().tick(&TickTraceEvent {
            ticker: self.inner.id,
            tick_index,
            now: started,
            elapsed,
            delta: info.delta,
            paused: info.paused,
            cost,
            dispatched,
        });
    }

    // -- Statistics --

    /// Average ticks per second over the newest `sample_count` tick intervals
    /// (default: the configured framerate), or `-1.0` with fewer than two
    /// recorded tick times.
    #[must_use]
    pub fn measured_fps(&self, sample_count: Option<usize>) -> f64 {
        let s = self.inner.state.borrow();
        let available = s.times.len();
        if available < 2 {
            return -1.0;
        }
        let count = sample_count
            .filter(|&n| n > 0)
            .unwrap_or_else(|| default_samples(s.config.interval))
            .min(available - 1);
        let (Some(newest), Some(oldest)) = (s.times.get(0), s.times.get(count)) else {
            return -1.0;
        };
        let span = newest - oldest;
        if span <= 0.0 {
            return -1.0;
        }
        1000.0 / (span / count as f64)
    }

    /// Average milliseconds spent per tick over the newest `sample_count`
    /// ticks (default: the configured framerate), or `-1.0` before the first
    /// tick.
    #[must_use]
    pub fn measured_tick_time(&self, sample_count: Option<usize>) -> f64 {
        let s = self.inner.state.borrow();
        let available = s.tick_times.len();
        if available == 0 {
            return -1.0;
        }
        let count = sample_count
            .filter(|&n| n > 0)
            .unwrap_or_else(|| default_samples(s.config.interval))
            .min(available);
        s.tick_times.sum_newest(count) / count as f64
    }

    /// Milliseconds since [`initialize`](Self::initialize), optionally not
    /// counting time spent paused. `-1.0` if not initialized.
    #[must_use]
    pub fn time(&self, run_time_only: bool) -> f64 {
        let s = self.inner.state.borrow();
        if !s.initialized {
            return -1.0;
        }
        let elapsed = self.inner.host.now() - s.start_time;
        if run_time_only {
            elapsed - s.paused_time
        } else {
            elapsed
        }
    }

    /// Like [`time`](Self::time), but as of the most recent tick.
    #[must_use]
    pub fn event_time(&self, run_time_only: bool) -> f64 {
        let s = self.inner.state.borrow();
        if !s.initialized {
            return -1.0;
        }
        if run_time_only {
            s.last_time - s.paused_time
        } else {
            s.last_time
        }
    }

    /// Ticks since [`initialize`](Self::initialize), optionally excluding
    /// ticks that happened while paused.
    #[must_use]
    pub fn ticks(&self, exclude_paused: bool) -> u64 {
        let s = self.inner.state.borrow();
        if exclude_paused {
            s.ticks - s.paused_ticks
        } else {
            s.ticks
        }
    }

    // -- Configuration --

    /// The current configuration.
    #[must_use]
    pub fn config(&self) -> TickerConfig {
        self.inner.state.borrow().config
    }

    /// Target milliseconds between ticks.
    #[must_use]
    pub fn interval(&self) -> f64 {
        self.inner.state.borrow().config.interval
    }

    /// Sets the target milliseconds between ticks. Non-positive or
    /// non-finite values are ignored. While running, the next scheduled
    /// callback uses the new interval.
    pub fn set_interval(&self, interval: f64) {
        if !(interval > 0.0 && interval.is_finite()) {
            return;
        }
        self.inner.state.borrow_mut().config.interval = interval;
        self.setup_tick();
    }

    /// Target ticks per second, `1000 / interval`.
    #[must_use]
    pub fn framerate(&self) -> f64 {
        self.inner.state.borrow().config.framerate()
    }

    /// Sets the interval to `1000 / framerate`. Non-positive values are
    /// ignored.
    pub fn set_framerate(&self, framerate: f64) {
        if framerate > 0.0 {
            self.set_interval(1000.0 / framerate);
        }
    }

    /// The pacing strategy.
    #[must_use]
    pub fn timing_mode(&self) -> TimingMode {
        self.inner.state.borrow().config.timing_mode
    }

    /// Changes the pacing strategy. Takes effect from the next scheduled
    /// callback.
    pub fn set_timing_mode(&self, mode: TimingMode) {
        self.inner.state.borrow_mut().config.timing_mode = mode;
        self.setup_tick();
    }

    /// Upper bound on reported deltas, `0.0` if unclamped.
    #[must_use]
    pub fn max_delta(&self) -> f64 {
        self.inner.state.borrow().config.max_delta
    }

    /// Sets the upper bound on reported deltas; `0.0` disables clamping.
    pub fn set_max_delta(&self, max_delta: f64) {
        self.inner.state.borrow_mut().config.max_delta = max_delta;
    }

    /// Whether ticks are currently counted as paused.
    #[must_use]
    pub fn paused(&self) -> bool {
        self.inner.state.borrow().paused
    }

    /// Pauses or resumes. A paused ticker keeps ticking; its ticks are
    /// flagged and their time is excluded from run time.
    pub fn set_paused(&self, paused: bool) {
        self.inner.state.borrow_mut().paused = paused;
    }

    // -- Listeners --

    /// The ticker's listener tables.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher<TickerId> {
        &self.inner.dispatcher
    }

    /// See [`Dispatcher::add_listener`].
    pub fn add_listener(
        &self,
        event_type: &str,
        listener: Listener<TickerId>,
        capture: bool,
    ) -> Listener<TickerId> {
        self.inner.dispatcher.add_listener(event_type, listener, capture)
    }

    /// See [`Dispatcher::on`].
    pub fn on<D, F>(
        &self,
        event_type: &str,
        data: D,
        options: ListenerOptions,
        handler: F,
    ) -> Listener<TickerId>
    where
        D: 'static,
        F: Fn(&mut Event<TickerId>, &D) + 'static,
    {
        self.inner.dispatcher.on(event_type, data, options, handler)
    }

    /// See [`Dispatcher::remove_listener`].
    pub fn remove_listener(
        &self,
        event_type: &str,
        listener: &Listener<TickerId>,
        capture: bool,
    ) {
        self.inner.dispatcher.remove_listener(event_type, listener, capture);
    }

    /// See [`Dispatcher::off`].
    pub fn off(&self, event_type: &str, listener: &Listener<TickerId>, capture: bool) {
        self.inner.dispatcher.off(event_type, listener, capture);
    }

    /// See [`Dispatcher::remove_all_listeners`].
    pub fn remove_all_listeners(&self, event_type: Option<&str>) {
        self.inner.dispatcher.remove_all_listeners(event_type);
    }

    /// See [`Dispatcher::has_listener`].
    #[must_use]
    pub fn has_listener(&self, event_type: &str) -> bool {
        self.inner.dispatcher.has_listener(event_type)
    }

    /// See [`Dispatcher::will_trigger`].
    #[must_use]
    pub fn will_trigger(&self, event_type: &str) -> bool {
        self.inner.dispatcher.will_trigger(event_type)
    }

    /// Dispatches `event` to this ticker's listeners.
    pub fn dispatch(&self, event: &mut Event<TickerId>) -> bool {
        self.inner.dispatcher.dispatch(self.inner.id, event)
    }

    /// Dispatches a new event of `event_type` to this ticker's listeners.
    pub fn dispatch_type(
        &self,
        event_type: impl Into<Cow<'static, str>>,
        bubbles: bool,
        cancelable: bool,
    ) -> bool {
        self.inner.dispatcher.dispatch_type(self.inner.id, event_type, bubbles, cancelable)
    }

    // -- Scheduling --

    fn setup_tick(&self) {
        let (request, primitive, handler, interval) = {
            let mut s = self.inner.state.borrow_mut();
            if !s.initialized || s.pending.is_some() {
                return;
            }
            s.next_request += 1;
            let mode = s.config.timing_mode;
            let frames = mode != TimingMode::Interval && self.inner.host.frames_available();
            let (primitive, handler) = match (frames, mode) {
                (true, TimingMode::Synced) => (Primitive::Frame, Handler::Synced),
                (true, _) => (Primitive::Frame, Handler::Frame),
                (false, _) => (Primitive::Timeout, Handler::Timeout),
            };
            (s.next_request, primitive, handler, s.config.interval)
        };

        let weak: Weak<TickerInner> = Rc::downgrade(&self.inner);
        let callback: Callback = Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Self { inner }.fire(request, handler);
            }
        });
        let host = &self.inner.host;
        let (id, delay) = match primitive {
            Primitive::Frame => (host.request_frame(callback), 0.0),
            Primitive::Timeout => (host.set_timeout(interval, callback), interval),
        };
        self.inner.state.borrow_mut().pending = Some(Pending {
            request,
            id,
            primitive,
        });
        self.inner.tracer.borrow_mut().schedule(&ScheduleEvent {
            ticker: self.inner.id,
            request,
            primitive,
            delay,
            at: host.now(),
        });
    }

    fn fire(&self, request: u64, handler: Handler) {
        {
            let mut s = self.inner.state.borrow_mut();
            match s.pending {
                Some(p) if p.request == request => s.pending = None,
                _ => return,
            }
        }
        self.setup_tick();

        if handler == Handler::Synced {
            let now = self.inner.host.now();
            let (elapsed, threshold) = {
                let s = self.inner.state.borrow();
                (
                    now - s.start_time - s.last_time,
                    s.config.interval * EARLY_FIRE_FACTOR,
                )
            };
            if elapsed < threshold {
                self.inner.tracer.borrow_mut().frame_skipped(&FrameSkipEvent {
                    ticker: self.inner.id,
                    now,
                    elapsed,
                    threshold,
                });
                return;
            }
        }
        self.tick();
    }
}

/// Default sample count for the statistics: the framerate, truncated.
fn default_samples(interval: f64) -> usize {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "framerate is positive and small; truncation is intended"
    )]
    let n = (1000.0 / interval) as usize;
    n.max(1)
}
