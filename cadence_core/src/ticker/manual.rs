// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A timing host driven by its owner.

use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use super::host::{Callback, TimerId, TimingHost};

struct Timeout {
    id: TimerId,
    due: f64,
    callback: Callback,
}

struct ManualState {
    now: f64,
    frames_available: bool,
    next_id: u64,
    frames: Vec<(TimerId, Callback)>,
    timeouts: Vec<Timeout>,
}

impl ManualState {
    fn next_id(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }
}

/// A [`TimingHost`] whose clock and callbacks only move when told to.
///
/// Useful for tests and for native loops that already own a frame clock:
/// call [`fire_frame`](Self::fire_frame) once per presented frame and
/// [`run_until`](Self::run_until) as time passes.
///
/// No internal borrow is held while a callback runs, so callbacks may
/// schedule, cancel, or advance the clock.
pub struct ManualHost {
    state: RefCell<ManualState>,
}

impl fmt::Debug for ManualHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.state.borrow();
        f.debug_struct("ManualHost")
            .field("now", &s.now)
            .field("frames_available", &s.frames_available)
            .field("pending_frames", &s.frames.len())
            .field("pending_timeouts", &s.timeouts.len())
            .finish()
    }
}

impl Default for ManualHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualHost {
    /// A host at time `0.0` that offers frame callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RefCell::new(ManualState {
                now: 0.0,
                frames_available: true,
                next_id: 0,
                frames: Vec::new(),
                timeouts: Vec::new(),
            }),
        }
    }

    /// A host without frame callbacks, as on a platform with no display.
    #[must_use]
    pub fn without_frames() -> Self {
        let host = Self::new();
        host.state.borrow_mut().frames_available = false;
        host
    }

    /// Sets the clock. Runs nothing.
    pub fn set_now(&self, now: f64) {
        self.state.borrow_mut().now = now;
    }

    /// Moves the clock forward by `ms`. Runs nothing.
    pub fn advance(&self, ms: f64) {
        self.state.borrow_mut().now += ms;
    }

    /// Number of frame callbacks waiting for [`fire_frame`](Self::fire_frame).
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    /// Number of scheduled timeouts.
    #[must_use]
    pub fn pending_timeouts(&self) -> usize {
        self.state.borrow().timeouts.len()
    }

    /// Due time of the earliest scheduled timeout.
    #[must_use]
    pub fn next_timeout_due(&self) -> Option<f64> {
        self.state
            .borrow()
            .timeouts
            .iter()
            .map(|t| t.due)
            .min_by(f64::total_cmp)
    }

    /// Runs every frame callback requested before this call. Callbacks
    /// requested while the batch runs wait for the next frame.
    ///
    /// Returns how many callbacks ran.
    pub fn fire_frame(&self) -> usize {
        let batch = core::mem::take(&mut self.state.borrow_mut().frames);
        let count = batch.len();
        for (_, callback) in batch {
            callback();
        }
        count
    }

    /// Runs the timeouts that are due at the current time, earliest first.
    /// Timeouts scheduled by those callbacks are left for a later call.
    ///
    /// Returns how many callbacks ran.
    pub fn run_due_timeouts(&self) -> usize {
        let mut due: Vec<(f64, TimerId)> = {
            let s = self.state.borrow();
            s.timeouts
                .iter()
                .filter(|t| t.due <= s.now)
                .map(|t| (t.due, t.id))
                .collect()
        };
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut ran = 0;
        for (_, id) in due {
            let Some(callback) = self.take_timeout(id) else {
                continue;
            };
            callback();
            ran += 1;
        }
        ran
    }

    /// Advances the clock to `until`, running every timeout that falls due on
    /// the way (including ones scheduled along the way) at its due time.
    ///
    /// Returns how many callbacks ran.
    pub fn run_until(&self, until: f64) -> usize {
        let mut ran = 0;
        loop {
            let next = {
                let s = self.state.borrow();
                s.timeouts
                    .iter()
                    .filter(|t| t.due <= until)
                    .min_by(|a, b| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)))
                    .map(|t| (t.id, t.due))
            };
            let Some((id, due)) = next else {
                break;
            };
            {
                let mut s = self.state.borrow_mut();
                if due > s.now {
                    s.now = due;
                }
            }
            if let Some(callback) = self.take_timeout(id) {
                callback();
                ran += 1;
            }
        }
        let mut s = self.state.borrow_mut();
        if until > s.now {
            s.now = until;
        }
        ran
    }

    fn take_timeout(&self, id: TimerId) -> Option<Callback> {
        let mut s = self.state.borrow_mut();
        let pos = s.timeouts.iter().position(|t| t.id == id)?;
        Some(s.timeouts.remove(pos).callback)
    }
}

impl TimingHost for ManualHost {
    fn now(&self) -> f64 {
        self.state.borrow().now
    }

    fn frames_available(&self) -> bool {
        self.state.borrow().frames_available
    }

    fn request_frame(&self, callback: Callback) -> TimerId {
        let mut s = self.state.borrow_mut();
        let id = s.next_id();
        s.frames.push((id, callback));
        id
    }

    fn cancel_frame(&self, id: TimerId) {
        self.state.borrow_mut().frames.retain(|(f, _)| *f != id);
    }

    fn set_timeout(&self, delay: f64, callback: Callback) -> TimerId {
        let mut s = self.state.borrow_mut();
        let id = s.next_id();
        let due = s.now + delay.max(0.0);
        s.timeouts.push(Timeout { id, due, callback });
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.state.borrow_mut().timeouts.retain(|t| t.id != id);
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    type Log = Rc<RefCell<Vec<(u32, f64)>>>;

    fn note(host: &Rc<ManualHost>, log: &Log, tag: u32) -> Callback {
        let host = Rc::clone(host);
        let log = Rc::clone(log);
        Box::new(move || log.borrow_mut().push((tag, host.now())))
    }

    #[test]
    fn timeouts_run_in_due_order() {
        let host = Rc::new(ManualHost::without_frames());
        let log: Log = Rc::default();
        host.set_timeout(30.0, note(&host, &log, 1));
        host.set_timeout(10.0, note(&host, &log, 2));
        host.set_timeout(99.0, note(&host, &log, 3));

        assert_eq!(host.run_until(50.0), 2);
        assert_eq!(*log.borrow(), vec![(2, 10.0), (1, 30.0)]);
        assert_eq!(host.now(), 50.0);
        assert_eq!(host.next_timeout_due(), Some(99.0));
    }

    #[test]
    fn cleared_timeout_never_runs() {
        let host = Rc::new(ManualHost::new());
        let log: Log = Rc::default();
        let id = host.set_timeout(5.0, note(&host, &log, 1));
        host.clear_timeout(id);
        host.advance(10.0);
        assert_eq!(host.run_due_timeouts(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn frames_requested_during_batch_wait() {
        let host = Rc::new(ManualHost::new());
        let log: Log = Rc::default();
        {
            let host2 = Rc::clone(&host);
            let log2 = Rc::clone(&log);
            host.request_frame(Box::new(move || {
                log2.borrow_mut().push((1, host2.now()));
                host2.request_frame(note(&host2, &log2, 2));
            }));
        }

        assert_eq!(host.fire_frame(), 1);
        assert_eq!(host.pending_frames(), 1);
        host.advance(16.0);
        assert_eq!(host.fire_frame(), 1);
        assert_eq!(*log.borrow(), vec![(1, 0.0), (2, 16.0)]);
    }

    #[test]
    fn cancelled_frame_is_dropped() {
        let host = Rc::new(ManualHost::new());
        let log: Log = Rc::default();
        let id = host.request_frame(note(&host, &log, 1));
        host.cancel_frame(id);
        assert_eq!(host.fire_frame(), 0);
    }

    #[test]
    fn without_frames_reports_unavailable() {
        assert!(ManualHost::new().frames_available());
        assert!(!ManualHost::without_frames().frames_available());
    }
}
