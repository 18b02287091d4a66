// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The platform timing contract.

use alloc::boxed::Box;

/// A one-shot callback handed to a [`TimingHost`].
pub type Callback = Box<dyn FnOnce()>;

/// Host-assigned handle of a scheduled callback, used to cancel it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Which host primitive a callback was scheduled with.
///
/// Cancellation must go through the matching primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Per-frame callback (`requestAnimationFrame` or equivalent).
    Frame,
    /// Fixed-delay callback (`setTimeout` or equivalent).
    Timeout,
}

/// Clock and scheduling primitives a [`Ticker`](super::Ticker) runs on.
///
/// Implementations must invoke callbacks asynchronously (never from inside
/// `request_frame` / `set_timeout`) and must not hold any internal borrow
/// while a callback runs: the ticker schedules its next callback from inside
/// the current one.
pub trait TimingHost {
    /// Monotonic time in milliseconds.
    fn now(&self) -> f64;

    /// Whether [`request_frame`](Self::request_frame) is usable. When it is
    /// not, frame timing modes fall back to
    /// [`set_timeout`](Self::set_timeout).
    fn frames_available(&self) -> bool;

    /// Runs `callback` once before the next frame.
    fn request_frame(&self, callback: Callback) -> TimerId;

    /// Cancels a pending frame callback. Unknown ids are ignored.
    fn cancel_frame(&self, id: TimerId);

    /// Runs `callback` once after `delay` milliseconds.
    fn set_timeout(&self, delay: f64, callback: Callback) -> TimerId;

    /// Cancels a pending timeout. Unknown ids are ignored.
    fn clear_timeout(&self, id: TimerId);
}
