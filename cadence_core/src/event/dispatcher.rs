// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node listener tables.

use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use super::listener::{Listener, ListenerOptions};
use super::record::{Event, EventPhase};

type Table<K> = BTreeMap<String, Vec<Listener<K>>>;

struct Tables<K> {
    bubble: Table<K>,
    capture: Table<K>,
}

impl<K> Tables<K> {
    fn table(&self, capture: bool) -> &Table<K> {
        if capture { &self.capture } else { &self.bubble }
    }

    fn table_mut(&mut self, capture: bool) -> &mut Table<K> {
        if capture {
            &mut self.capture
        } else {
            &mut self.bubble
        }
    }
}

/// Listener tables for one node: a capture table and a target/bubble table,
/// each mapping an event type to its listeners in firing order.
///
/// All methods take `&self`; the tables live behind a `RefCell` that is never
/// held across a listener call, so listeners may freely add and remove
/// listeners (on this or any other dispatcher) while a dispatch is running.
///
/// A type's listener list is never empty: removing the last listener drops
/// the entry, which keeps [`has_listener`](Self::has_listener) a map lookup.
pub struct Dispatcher<K> {
    tables: RefCell<Tables<K>>,
}

impl<K> Default for Dispatcher<K> {
    fn default() -> Self {
        Self {
            tables: RefCell::new(Tables {
                bubble: BTreeMap::new(),
                capture: BTreeMap::new(),
            }),
        }
    }
}

impl<K> fmt::Debug for Dispatcher<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables.borrow();
        let counts = |t: &Table<K>| {
            t.iter()
                .map(|(k, v)| (k.clone(), v.len()))
                .collect::<Vec<_>>()
        };
        f.debug_struct("Dispatcher")
            .field("bubble", &counts(&tables.bubble))
            .field("capture", &counts(&tables.capture))
            .finish()
    }
}

impl<K: Copy + 'static> Dispatcher<K> {
    /// Creates a dispatcher with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for `event_type` in the capture or target/bubble
    /// table.
    ///
    /// Registering a listener that is already present for the same type and
    /// phase moves it to the end of the firing order instead of adding a
    /// second entry. Returns the listener so it can be removed later.
    pub fn add_listener(
        &self,
        event_type: &str,
        listener: Listener<K>,
        capture: bool,
    ) -> Listener<K> {
        self.remove_listener(event_type, &listener, capture);
        self.tables
            .borrow_mut()
            .table_mut(capture)
            .entry(String::from(event_type))
            .or_default()
            .push(listener.clone());
        listener
    }

    /// Registers a closure that also receives `data`.
    ///
    /// With [`ListenerOptions::once`] the listener removes itself after its
    /// first invocation, and `handler` never runs twice even if it
    /// re-dispatches the same type before returning. The returned handle is the registered wrapper, which
    /// is what [`remove_listener`](Self::remove_listener) needs.
    pub fn on<D, F>(
        &self,
        event_type: &str,
        data: D,
        options: ListenerOptions,
        handler: F,
    ) -> Listener<K>
    where
        D: 'static,
        F: Fn(&mut Event<K>, &D) + 'static,
    {
        let once = options.once;
        let fired = Cell::new(false);
        let wrapper = Listener::new(move |event: &mut Event<K>| {
            if once {
                event.remove();
                if fired.replace(true) {
                    return;
                }
            }
            handler(event, &data);
        });
        self.add_listener(event_type, wrapper, options.capture)
    }

    /// Removes the first registration of `listener` for `event_type` in the
    /// given phase. Does nothing if it is not registered.
    pub fn remove_listener(&self, event_type: &str, listener: &Listener<K>, capture: bool) {
        let mut tables = self.tables.borrow_mut();
        let table = tables.table_mut(capture);
        let Some(bucket) = table.get_mut(event_type) else {
            return;
        };
        if let Some(pos) = bucket.iter().position(|l| l.ptr_eq(listener)) {
            bucket.remove(pos);
        }
        if bucket.is_empty() {
            table.remove(event_type);
        }
    }

    /// Alias of [`remove_listener`](Self::remove_listener).
    pub fn off(&self, event_type: &str, listener: &Listener<K>, capture: bool) {
        self.remove_listener(event_type, listener, capture);
    }

    /// Removes every listener of `event_type` in both phases, or every
    /// listener at all when `event_type` is `None`.
    pub fn remove_all_listeners(&self, event_type: Option<&str>) {
        let mut tables = self.tables.borrow_mut();
        match event_type {
            Some(ty) => {
                tables.bubble.remove(ty);
                tables.capture.remove(ty);
            }
            None => {
                tables.bubble.clear();
                tables.capture.clear();
            }
        }
    }

    /// Returns `true` if any listener for `event_type` is registered on this
    /// dispatcher, in either phase.
    #[must_use]
    pub fn has_listener(&self, event_type: &str) -> bool {
        let tables = self.tables.borrow();
        tables.bubble.contains_key(event_type) || tables.capture.contains_key(event_type)
    }

    /// Returns `true` if dispatching `event_type` here would reach a
    /// listener. A standalone dispatcher has no ancestors, so this is
    /// [`has_listener`](Self::has_listener); see
    /// [`EventTree::will_trigger`](super::EventTree::will_trigger) for nodes.
    #[must_use]
    pub fn will_trigger(&self, event_type: &str) -> bool {
        self.has_listener(event_type)
    }

    /// Dispatches `event` on a dispatcher with no ancestors, identified as
    /// `this` in the event's targets. Returns `true` unless a listener
    /// prevented the default action.
    pub fn dispatch(&self, this: K, event: &mut Event<K>) -> bool {
        if event.target().is_some() {
            return self.dispatch(this, &mut event.fresh_copy());
        }
        event.set_target(this);
        self.invoke(this, event, EventPhase::AtTarget);
        !event.default_prevented()
    }

    /// Dispatches a new event of `event_type`.
    ///
    /// Returns `true` without constructing an event when the event does not
    /// bubble and nothing here listens for it.
    pub fn dispatch_type(
        &self,
        this: K,
        event_type: impl Into<Cow<'static, str>>,
        bubbles: bool,
        cancelable: bool,
    ) -> bool {
        let event_type = event_type.into();
        if !self.has_listener(&event_type) {
            return true;
        }
        self.dispatch(this, &mut Event::new(event_type, bubbles, cancelable))
    }

    /// Runs this node's listeners for `phase`.
    ///
    /// Capturing uses the capture table and bubbling the target/bubble table;
    /// at the target both run, capture listeners first.
    pub(crate) fn invoke(&self, this: K, event: &mut Event<K>, phase: EventPhase) {
        match phase {
            EventPhase::Capturing => self.invoke_table(this, event, phase, true),
            EventPhase::Bubbling => self.invoke_table(this, event, phase, false),
            EventPhase::AtTarget => {
                self.invoke_table(this, event, phase, true);
                if !event.immediate_propagation_stopped() {
                    self.invoke_table(this, event, phase, false);
                }
            }
            EventPhase::None => {}
        }
    }

    fn invoke_table(&self, this: K, event: &mut Event<K>, phase: EventPhase, capture: bool) {
        // Snapshot: listeners added during this pass wait for the next dispatch.
        let snapshot = match self.tables.borrow().table(capture).get(event.event_type()) {
            Some(bucket) => bucket.clone(),
            None => return,
        };
        event.enter(this, phase);
        for listener in &snapshot {
            if event.immediate_propagation_stopped() {
                break;
            }
            listener.invoke(event);
            if event.take_removed() {
                self.remove_listener(event.event_type(), listener, capture);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::{Cell, RefCell};

    use super::*;
    use crate::event::HandleEvent;

    fn logger(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Listener<u32> {
        let log = Rc::clone(log);
        Listener::new(move |_: &mut Event<u32>| log.borrow_mut().push(name))
    }

    #[test]
    fn has_listener_tracks_both_tables() {
        let d = Dispatcher::<u32>::new();
        assert!(!d.has_listener("x"));

        let a = d.add_listener("x", Listener::new(|_| {}), false);
        let b = d.add_listener("x", Listener::new(|_| {}), true);
        assert!(d.has_listener("x"));

        d.remove_listener("x", &a, false);
        assert!(d.has_listener("x"), "capture listener remains");

        d.remove_listener("x", &b, false);
        assert!(d.has_listener("x"), "wrong phase is a no-op");

        d.remove_listener("x", &b, true);
        assert!(!d.has_listener("x"));
    }

    #[test]
    fn re_add_moves_to_end() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let d = Dispatcher::<u32>::new();
        let a = d.add_listener("x", logger(&log, "a"), false);
        d.add_listener("x", logger(&log, "b"), false);
        d.add_listener("x", a.clone(), false);

        d.dispatch(0, &mut Event::new("x", false, false));
        assert_eq!(*log.borrow(), vec!["b", "a"]);

        d.remove_listener("x", &a, false);
        log.borrow_mut().clear();
        d.dispatch(0, &mut Event::new("x", false, false));
        assert_eq!(*log.borrow(), vec!["b"], "only one registration existed");
    }

    #[test]
    fn removing_unknown_listener_is_noop() {
        let d = Dispatcher::<u32>::new();
        d.off("nothing", &Listener::new(|_| {}), false);
        assert!(!d.has_listener("nothing"));
    }

    #[test]
    fn remove_all_by_type_or_everything() {
        let d = Dispatcher::<u32>::new();
        d.add_listener("a", Listener::new(|_| {}), false);
        d.add_listener("a", Listener::new(|_| {}), true);
        d.add_listener("b", Listener::new(|_| {}), false);

        d.remove_all_listeners(Some("a"));
        assert!(!d.has_listener("a"));
        assert!(d.has_listener("b"));

        d.remove_all_listeners(None);
        assert!(!d.has_listener("b"));
    }

    #[test]
    fn once_fires_a_single_time() {
        let hits = Rc::new(Cell::new(0_u32));
        let d = Dispatcher::<u32>::new();
        let h = Rc::clone(&hits);
        d.on("x", 5_u32, ListenerOptions::ONCE, move |_, data| {
            h.set(h.get() + data);
        });

        assert!(d.dispatch_type(0, "x", false, false));
        assert!(d.dispatch_type(0, "x", false, false));
        assert_eq!(hits.get(), 5);
        assert!(!d.has_listener("x"));
    }

    #[test]
    fn once_survives_redispatch_from_its_own_handler() {
        let hits = Rc::new(Cell::new(0_u32));
        let d = Rc::new(Dispatcher::<u32>::new());
        {
            let hits = Rc::clone(&hits);
            let d2 = Rc::clone(&d);
            d.on("x", (), ListenerOptions::ONCE, move |_, _| {
                hits.set(hits.get() + 1);
                if hits.get() < 5 {
                    d2.dispatch_type(0, "x", false, false);
                }
            });
        }

        d.dispatch_type(0, "x", false, false);
        assert_eq!(hits.get(), 1, "once listener ran {} times", hits.get());
        assert!(!d.has_listener("x"));

        d.dispatch_type(0, "x", false, false);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listener_removed_mid_dispatch_still_runs_this_pass() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let d = Rc::new(Dispatcher::<u32>::new());
        let victim = logger(&log, "victim");
        {
            let d2 = Rc::clone(&d);
            let log = Rc::clone(&log);
            let victim = victim.clone();
            d.add_listener(
                "x",
                Listener::new(move |_| {
                    log.borrow_mut().push("remover");
                    d2.remove_listener("x", &victim, false);
                }),
                false,
            );
        }
        d.add_listener("x", victim, false);

        d.dispatch(0, &mut Event::new("x", false, false));
        assert_eq!(*log.borrow(), vec!["remover", "victim"]);

        log.borrow_mut().clear();
        d.dispatch(0, &mut Event::new("x", false, false));
        assert_eq!(*log.borrow(), vec!["remover"]);
    }

    #[test]
    fn dispatch_type_counts_capture_only_listeners() {
        let hits = Rc::new(Cell::new(0_u32));
        let d = Dispatcher::<u32>::new();
        assert!(d.dispatch_type(0, "x", false, true), "nobody listens");

        {
            let hits = Rc::clone(&hits);
            d.add_listener(
                "x",
                Listener::new(move |event: &mut Event<u32>| {
                    assert_eq!(event.phase(), EventPhase::AtTarget);
                    hits.set(hits.get() + 1);
                    event.prevent_default();
                }),
                true,
            );
        }
        assert!(!d.dispatch_type(0, "x", false, true));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listener_added_mid_dispatch_waits_for_next_pass() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let d = Rc::new(Dispatcher::<u32>::new());
        let late = logger(&log, "late");
        {
            let d2 = Rc::clone(&d);
            let log = Rc::clone(&log);
            d.add_listener(
                "x",
                Listener::new(move |_| {
                    log.borrow_mut().push("adder");
                    d2.add_listener("x", late.clone(), false);
                }),
                false,
            );
        }

        d.dispatch(0, &mut Event::new("x", false, false));
        assert_eq!(*log.borrow(), vec!["adder"]);

        log.borrow_mut().clear();
        d.dispatch(0, &mut Event::new("x", false, false));
        assert_eq!(*log.borrow(), vec!["adder", "late"]);
    }

    #[test]
    fn immediate_stop_skips_rest_of_table() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let d = Dispatcher::<u32>::new();
        {
            let log = Rc::clone(&log);
            d.add_listener(
                "x",
                Listener::new(move |e: &mut Event<u32>| {
                    log.borrow_mut().push("first");
                    e.stop_immediate_propagation();
                }),
                false,
            );
        }
        d.add_listener("x", logger(&log, "second"), false);

        d.dispatch(0, &mut Event::new("x", false, false));
        assert_eq!(*log.borrow(), vec!["first"]);
    }

    #[test]
    fn prevent_default_reported_by_dispatch() {
        let d = Dispatcher::<u32>::new();
        d.add_listener(
            "x",
            Listener::new(|e: &mut Event<u32>| {
                e.prevent_default();
            }),
            false,
        );
        assert!(!d.dispatch_type(0, "x", false, true));
        assert!(d.dispatch_type(0, "x", false, false), "not cancelable");
    }

    #[test]
    fn handler_objects_share_identity() {
        struct Counter(Cell<u32>);

        impl HandleEvent<u32> for Counter {
            fn handle_event(&self, _: &mut Event<u32>) {
                self.0.set(self.0.get() + 1);
            }
        }

        let counter = Rc::new(Counter(Cell::new(0)));
        let d = Dispatcher::<u32>::new();
        d.add_listener("x", Listener::from_handler(Rc::clone(&counter)), false);
        d.add_listener("x", Listener::from_handler(Rc::clone(&counter)), false);
        d.dispatch_type(0, "x", false, false);
        assert_eq!(counter.0.get(), 1, "same Rc registers once");

        d.remove_listener("x", &Listener::from_handler(Rc::clone(&counter)), false);
        assert!(!d.has_listener("x"));
    }
}
