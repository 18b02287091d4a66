// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A default ticker per thread.
//!
//! Code that wants "the" ticker, rather than one passed to it, reaches it
//! here. The slot starts empty: the embedder decides which host drives it.
//!
//! ```
//! use std::rc::Rc;
//! use cadence_core::ticker::{global, ManualHost, Ticker};
//!
//! let host = Rc::new(ManualHost::new());
//! global::install(Ticker::new(host));
//! global::with_current(|t| t.initialize());
//! assert_eq!(global::with_current(|t| t.is_initialized()), Some(true));
//! ```

use core::cell::RefCell;

use super::Ticker;

std::thread_local! {
    static DEFAULT: RefCell<Option<Ticker>> = const { RefCell::new(None) };
}

/// Makes `ticker` this thread's default, returning the previous one.
pub fn install(ticker: Ticker) -> Option<Ticker> {
    DEFAULT.with(|slot| slot.borrow_mut().replace(ticker))
}

/// Empties this thread's default slot, returning what it held.
pub fn uninstall() -> Option<Ticker> {
    DEFAULT.with(|slot| slot.borrow_mut().take())
}

/// A handle to this thread's default ticker.
#[must_use]
pub fn current() -> Option<Ticker> {
    DEFAULT.with(|slot| slot.borrow().clone())
}

/// Runs `f` with this thread's default ticker, if one is installed.
///
/// The slot is not borrowed while `f` runs, so `f` may install or
/// uninstall.
pub fn with_current<R>(f: impl FnOnce(&Ticker) -> R) -> Option<R> {
    current().map(|ticker| f(&ticker))
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;

    use super::*;
    use crate::ticker::ManualHost;

    #[test]
    fn install_replace_uninstall() {
        let host = Rc::new(ManualHost::new());
        let first = Ticker::new(host.clone());
        let second = Ticker::new(host);

        assert!(current().is_none());
        assert!(install(first.clone()).is_none());
        assert_eq!(current().map(|t| t.id()), Some(first.id()));

        let previous = install(second.clone());
        assert_eq!(previous.map(|t| t.id()), Some(first.id()));
        assert_eq!(with_current(Ticker::id), Some(second.id()));

        assert_eq!(uninstall().map(|t| t.id()), Some(second.id()));
        assert!(with_current(Ticker::id).is_none());
    }

    #[test]
    fn with_current_may_replace_slot() {
        let host = Rc::new(ManualHost::new());
        install(Ticker::new(host.clone()));
        let replacement = Ticker::new(host);
        let id = replacement.id();
        with_current(move |_| install(replacement));
        assert_eq!(current().map(|t| t.id()), Some(id));
        uninstall();
    }
}
