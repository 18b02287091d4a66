// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events, listener tables, and propagation through a node tree.
//!
//! An [`Event`] dispatched on a node travels in up to three passes:
//!
//! 1. **Capture**: from the topmost ancestor down to the target's parent,
//!    running each node's capture listeners.
//! 2. **Target**: the target runs its capture listeners, then its
//!    target/bubble listeners.
//! 3. **Bubble**: from the target's parent up to the topmost ancestor,
//!    running each node's target/bubble listeners.
//!
//! Non-bubbling events only get the target pass. Any listener can end the
//! remaining passes with [`Event::stop_propagation`]; the listeners of the
//! node currently running still finish unless
//! [`Event::stop_immediate_propagation`] was used.
//!
//! Each node pass works on a snapshot of that node's listeners. A listener
//! added during a dispatch first fires on the next dispatch; a listener that
//! calls [`Event::remove`] is deregistered as soon as it returns.
//!
//! The tree is anything implementing [`EventTree`]. [`NodeStore`] is a
//! ready-made arena implementation.

mod dispatcher;
mod id;
mod listener;
mod record;
mod store;
mod traverse;
mod tree;

pub use dispatcher::Dispatcher;
pub use id::NodeId;
pub use listener::{HandleEvent, Listener, ListenerOptions};
pub use record::{Event, EventPhase, Payload};
pub use store::NodeStore;
pub use traverse::{Ancestors, Children};
pub use tree::{EventTree, PropagationPath};
