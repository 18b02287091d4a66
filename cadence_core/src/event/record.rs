// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The event record passed to listeners.

use alloc::borrow::Cow;
use alloc::rc::Rc;
use core::any::Any;
use core::fmt;

use crate::ticker::TickInfo;

/// Which pass of a dispatch is currently delivering an [`Event`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventPhase {
    /// Not being dispatched.
    #[default]
    None = 0,
    /// Travelling from the topmost ancestor down toward the target.
    Capturing = 1,
    /// Being delivered by the target itself.
    AtTarget = 2,
    /// Travelling from the target's parent up to the topmost ancestor.
    Bubbling = 3,
}

/// Kind-specific data carried by an [`Event`].
#[derive(Clone, Default)]
pub enum Payload {
    /// No payload.
    #[default]
    Empty,
    /// Timing data for a ticker `"tick"` event.
    Tick(TickInfo),
    /// Load progress, in caller-defined units.
    Progress {
        /// Amount loaded so far.
        loaded: f64,
        /// Total amount expected.
        total: f64,
    },
    /// Arbitrary attached data.
    Data(Rc<dyn Any>),
}

impl Payload {
    /// Returns the tick data if this is a [`Payload::Tick`].
    #[must_use]
    pub fn tick(&self) -> Option<&TickInfo> {
        match self {
            Self::Tick(info) => Some(info),
            _ => None,
        }
    }

    /// Returns the attached data downcast to `T`, if present and of that type.
    #[must_use]
    pub fn data<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Data(data) => data.downcast_ref(),
            _ => None,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Tick(info) => f.debug_tuple("Tick").field(info).finish(),
            Self::Progress { loaded, total } => f
                .debug_struct("Progress")
                .field("loaded", loaded)
                .field("total", total)
                .finish(),
            Self::Data(_) => f.write_str("Data(..)"),
        }
    }
}

/// One occurrence of a named event.
///
/// `K` is the key type of the nodes the event travels through; it is what
/// [`target`](Self::target) and [`current_target`](Self::current_target)
/// report.
///
/// The propagation state (phase, targets) is written only by the dispatch
/// engine. Listeners influence dispatch exclusively through
/// [`prevent_default`](Self::prevent_default),
/// [`stop_propagation`](Self::stop_propagation),
/// [`stop_immediate_propagation`](Self::stop_immediate_propagation), and
/// [`remove`](Self::remove).
///
/// Records are reused across nested dispatch calls only by copy: dispatching a
/// record that already has a target dispatches a [`fresh_copy`](Self::fresh_copy)
/// of it instead.
#[derive(Clone, Debug)]
pub struct Event<K> {
    event_type: Cow<'static, str>,
    bubbles: bool,
    cancelable: bool,
    target: Option<K>,
    current_target: Option<K>,
    phase: EventPhase,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
    removed: bool,
    timestamp: f64,
    /// Kind-specific data.
    pub payload: Payload,
}

impl<K: Copy> Event<K> {
    /// Creates an event of the given type.
    ///
    /// With the `std` feature the timestamp is the current wall-clock time in
    /// milliseconds since the Unix epoch; otherwise it is `0.0` until set with
    /// [`with_timestamp`](Self::with_timestamp).
    #[must_use]
    pub fn new(
        event_type: impl Into<Cow<'static, str>>,
        bubbles: bool,
        cancelable: bool,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            bubbles,
            cancelable,
            target: None,
            current_target: None,
            phase: EventPhase::None,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
            removed: false,
            timestamp: creation_time(),
            payload: Payload::Empty,
        }
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Overrides the creation timestamp (milliseconds).
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns a copy with the same type, flags, payload, and timestamp but
    /// with fresh propagation state and no target.
    #[must_use]
    pub fn fresh_copy(&self) -> Self {
        Self {
            event_type: self.event_type.clone(),
            bubbles: self.bubbles,
            cancelable: self.cancelable,
            target: None,
            current_target: None,
            phase: EventPhase::None,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
            removed: false,
            timestamp: self.timestamp,
            payload: self.payload.clone(),
        }
    }

    /// The event type.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Whether the event travels through ancestors.
    #[must_use]
    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Whether [`prevent_default`](Self::prevent_default) has any effect.
    #[must_use]
    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// The node the event was dispatched on.
    #[must_use]
    pub fn target(&self) -> Option<K> {
        self.target
    }

    /// The node whose listeners are currently running.
    #[must_use]
    pub fn current_target(&self) -> Option<K> {
        self.current_target
    }

    /// The current propagation phase.
    #[must_use]
    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    /// Whether [`prevent_default`](Self::prevent_default) took effect.
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Whether propagation to further nodes has been stopped.
    #[must_use]
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Whether the remaining listeners of the current node are skipped.
    #[must_use]
    pub fn immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped
    }

    /// Whether the running listener has asked to be removed.
    #[must_use]
    pub fn removed(&self) -> bool {
        self.removed
    }

    /// Creation time in milliseconds.
    #[must_use]
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Marks the default action as prevented. No effect unless the event is
    /// cancelable.
    pub fn prevent_default(&mut self) -> &mut Self {
        self.default_prevented = self.cancelable;
        self
    }

    /// Stops the event from reaching any further node. Listeners already
    /// queued on the current node in the current phase still run.
    pub fn stop_propagation(&mut self) -> &mut Self {
        self.propagation_stopped = true;
        self
    }

    /// Stops propagation and skips the remaining listeners of the current
    /// node.
    pub fn stop_immediate_propagation(&mut self) -> &mut Self {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
        self
    }

    /// Asks the dispatcher to deregister the currently running listener once
    /// it returns.
    pub fn remove(&mut self) -> &mut Self {
        self.removed = true;
        self
    }

    pub(crate) fn set_target(&mut self, target: K) {
        self.target = Some(target);
    }

    pub(crate) fn enter(&mut self, current_target: K, phase: EventPhase) {
        self.current_target = Some(current_target);
        self.phase = phase;
        self.removed = false;
    }

    pub(crate) fn take_removed(&mut self) -> bool {
        core::mem::take(&mut self.removed)
    }
}

impl<K> fmt::Display for Event<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Event (type={})]", self.event_type)
    }
}

#[cfg(feature = "std")]
fn creation_time() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
}

#[cfg(not(feature = "std"))]
fn creation_time() -> f64 {
    0.0
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn prevent_default_requires_cancelable() {
        let mut plain = Event::<u32>::new("x", false, false);
        plain.prevent_default();
        assert!(!plain.default_prevented(), "non-cancelable ignores prevent");

        let mut cancelable = Event::<u32>::new("x", false, true);
        cancelable.prevent_default();
        assert!(cancelable.default_prevented());
    }

    #[test]
    fn immediate_stop_implies_stop() {
        let mut event = Event::<u32>::new("x", true, false);
        event.stop_immediate_propagation();
        assert!(event.propagation_stopped());
        assert!(event.immediate_propagation_stopped());
    }

    #[test]
    fn fresh_copy_resets_propagation_state() {
        let mut event = Event::<u32>::new("load", true, true)
            .with_payload(Payload::Progress {
                loaded: 3.0,
                total: 10.0,
            })
            .with_timestamp(42.0);
        event.set_target(7);
        event.enter(7, EventPhase::AtTarget);
        event.prevent_default().stop_immediate_propagation().remove();

        let copy = event.fresh_copy();
        assert_eq!(copy.event_type(), "load");
        assert!(copy.bubbles() && copy.cancelable());
        assert_eq!(copy.target(), None);
        assert_eq!(copy.current_target(), None);
        assert_eq!(copy.phase(), EventPhase::None);
        assert!(!copy.default_prevented());
        assert!(!copy.propagation_stopped());
        assert!(!copy.immediate_propagation_stopped());
        assert!(!copy.removed());
        assert_eq!(copy.timestamp(), 42.0);
        assert!(
            matches!(copy.payload, Payload::Progress { loaded, total } if loaded == 3.0 && total == 10.0),
            "payload is carried over"
        );
    }

    #[test]
    fn data_payload_downcasts() {
        let event =
            Event::<u32>::new("data", false, false).with_payload(Payload::Data(Rc::new(5_u8)));
        assert_eq!(event.payload.data::<u8>(), Some(&5));
        assert_eq!(event.payload.data::<u16>(), None);
        assert!(event.payload.tick().is_none());
    }

    #[test]
    fn display_names_type() {
        let event = Event::<u32>::new("click", true, false);
        assert_eq!(event.to_string(), "[Event (type=click)]");
    }
}
