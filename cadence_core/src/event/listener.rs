// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener capability and registration handles.

use alloc::rc::Rc;
use core::fmt;

use super::record::Event;

/// Something that can receive an [`Event`].
///
/// Implemented for every `Fn(&mut Event<K>)` closure, so plain closures and
/// objects exposing a handling method go through the same capability. Handlers
/// take `&self`: a listener may be re-entered by a nested dispatch, so any
/// state it keeps belongs in a `Cell` or `RefCell`.
pub trait HandleEvent<K> {
    /// Handles one delivery of `event`.
    fn handle_event(&self, event: &mut Event<K>);
}

impl<K, F> HandleEvent<K> for F
where
    F: Fn(&mut Event<K>),
{
    fn handle_event(&self, event: &mut Event<K>) {
        self(event);
    }
}

/// A registered (or registrable) listener.
///
/// Identity is pointer identity of the underlying handler: clones of a
/// `Listener` are the same listener, two `Listener::new` calls with equal
/// closures are not. Keep the value returned by
/// [`Dispatcher::add_listener`](super::Dispatcher::add_listener) or
/// [`Dispatcher::on`](super::Dispatcher::on) to remove it later.
pub struct Listener<K> {
    handler: Rc<dyn HandleEvent<K>>,
}

impl<K: 'static> Listener<K> {
    /// Wraps a closure.
    #[must_use]
    pub fn new(handler: impl Fn(&mut Event<K>) + 'static) -> Self {
        Self {
            handler: Rc::new(handler),
        }
    }

    /// Wraps a shared handler object. Passing clones of the same `Rc` yields
    /// the same listener identity.
    #[must_use]
    pub fn from_handler<H: HandleEvent<K> + 'static>(handler: Rc<H>) -> Self {
        Self { handler }
    }
}

impl<K> Listener<K> {
    /// Returns `true` if both handles refer to the same listener.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        core::ptr::addr_eq(Rc::as_ptr(&self.handler), Rc::as_ptr(&other.handler))
    }

    pub(crate) fn invoke(&self, event: &mut Event<K>) {
        self.handler.handle_event(event);
    }
}

impl<K> Clone for Listener<K> {
    fn clone(&self) -> Self {
        Self {
            handler: Rc::clone(&self.handler),
        }
    }
}

impl<K> fmt::Debug for Listener<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.handler).cast::<()>())
    }
}

/// Options for [`Dispatcher::on`](super::Dispatcher::on).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ListenerOptions {
    /// Register for the capture phase instead of the target/bubble phase.
    pub capture: bool,
    /// Remove the listener after its first invocation.
    pub once: bool,
}

impl ListenerOptions {
    /// Target/bubble phase, removed after the first invocation.
    pub const ONCE: Self = Self {
        capture: false,
        once: true,
    };

    /// Capture phase, persistent.
    pub const CAPTURE: Self = Self {
        capture: true,
        once: false,
    };
}
