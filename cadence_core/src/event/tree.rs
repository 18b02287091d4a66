// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capture / target / bubble propagation over any parent relation.

use alloc::borrow::Cow;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt::Debug;

use super::dispatcher::Dispatcher;
use super::record::{Event, EventPhase};

/// A tree whose nodes can take part in event propagation.
///
/// Implementors supply the parent relation and the dispatcher of each node;
/// the provided methods implement propagation on top of them. A node without
/// a parent is both the capture root and the bubble root of its own
/// dispatches. A node without a dispatcher is still walked through, it just
/// has no listeners.
///
/// If the tree lives behind a `RefCell`, call [`path`](Self::path) while
/// holding the borrow and [`PropagationPath::dispatch`] after releasing it,
/// so listeners can mutate the tree.
pub trait EventTree {
    /// Node handle.
    type Key: Copy + Eq + Debug + 'static;

    /// The parent of `node`, or `None` for a root.
    fn parent(&self, node: Self::Key) -> Option<Self::Key>;

    /// The listener tables of `node`, if it has any.
    fn dispatcher(&self, node: Self::Key) -> Option<Rc<Dispatcher<Self::Key>>>;

    /// Returns `true` if `node` itself has a listener for `event_type`.
    fn has_listener(&self, node: Self::Key, event_type: &str) -> bool {
        self.dispatcher(node).is_some_and(|d| d.has_listener(event_type))
    }

    /// Returns `true` if `node` or any of its ancestors has a listener for
    /// `event_type`. Producers use this to skip building an event nobody
    /// would see.
    fn will_trigger(&self, node: Self::Key, event_type: &str) -> bool {
        let mut cursor = Some(node);
        while let Some(key) = cursor {
            if self.has_listener(key, event_type) {
                return true;
            }
            cursor = self.parent(key);
        }
        false
    }

    /// Collects `node` and its ancestors, `node` first.
    fn path(&self, node: Self::Key) -> PropagationPath<Self::Key> {
        let mut nodes = Vec::new();
        let mut cursor = Some(node);
        while let Some(key) = cursor {
            nodes.push((key, self.dispatcher(key)));
            cursor = self.parent(key);
        }
        PropagationPath { nodes }
    }

    /// Dispatches `event` with `node` as its target. Returns `true` unless a
    /// listener prevented the default action.
    ///
    /// An event that already has a target is not reused: a
    /// [`fresh_copy`](Event::fresh_copy) of it is dispatched instead.
    fn dispatch(&self, node: Self::Key, event: &mut Event<Self::Key>) -> bool {
        if event.bubbles() {
            self.path(node).dispatch(event)
        } else {
            PropagationPath {
                nodes: Vec::from([(node, self.dispatcher(node))]),
            }
            .dispatch(event)
        }
    }

    /// Dispatches a new event of `event_type` with `node` as its target.
    ///
    /// Returns `true` without constructing an event when the event does not
    /// bubble and `node` has no listener for it.
    fn dispatch_type(
        &self,
        node: Self::Key,
        event_type: impl Into<Cow<'static, str>>,
        bubbles: bool,
        cancelable: bool,
    ) -> bool
    where
        Self: Sized,
    {
        let event_type = event_type.into();
        if !bubbles && !self.has_listener(node, &event_type) {
            return true;
        }
        self.dispatch(node, &mut Event::new(event_type, bubbles, cancelable))
    }
}

/// A target and its ancestors, captured before any listener runs.
///
/// Propagation follows the path as it was when collected; listeners that
/// reparent nodes mid-dispatch affect the next dispatch only.
#[derive(Debug)]
pub struct PropagationPath<K> {
    /// Target first, topmost ancestor last.
    nodes: Vec<(K, Option<Rc<Dispatcher<K>>>)>,
}

impl<K: Copy + Eq + Debug + 'static> PropagationPath<K> {
    /// Number of nodes on the path, including the target.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a path contains at least its target.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node keys from the target up to the topmost ancestor.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.nodes.iter().map(|(key, _)| *key)
    }

    /// Runs the capture, target and bubble passes for `event` along this
    /// path. Returns `true` unless a listener prevented the default action.
    pub fn dispatch(&self, event: &mut Event<K>) -> bool {
        if event.target().is_some() {
            return self.dispatch(&mut event.fresh_copy());
        }
        self.run(event);
        !event.default_prevented()
    }

    fn run(&self, event: &mut Event<K>) {
        let Some((origin, _)) = self.nodes.first() else {
            return;
        };
        event.set_target(*origin);

        if !event.bubbles() || self.nodes.len() == 1 {
            self.invoke_at(0, event, EventPhase::AtTarget);
            return;
        }

        for i in (0..self.nodes.len()).rev() {
            if event.propagation_stopped() {
                return;
            }
            let phase = if i == 0 {
                EventPhase::AtTarget
            } else {
                EventPhase::Capturing
            };
            self.invoke_at(i, event, phase);
        }

        for i in 1..self.nodes.len() {
            if event.propagation_stopped() {
                return;
            }
            self.invoke_at(i, event, EventPhase::Bubbling);
        }
    }

    fn invoke_at(&self, index: usize, event: &mut Event<K>, phase: EventPhase) {
        if let Some((key, Some(dispatcher))) = self.nodes.get(index) {
            dispatcher.invoke(*key, event, phase);
        }
    }
}
