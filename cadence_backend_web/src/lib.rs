// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser timing host for cadence.
//!
//! [`WebHost`] implements [`TimingHost`] on top of the page's global timing
//! functions:
//!
//! - clock: `performance.now()` ([`DOMHighResTimeStamp`][mdn] milliseconds)
//! - frame callbacks: `requestAnimationFrame` / `cancelAnimationFrame`
//! - timeouts: `setTimeout` / `clearTimeout`
//!
//! Callbacks are handed to JS as one-shot closures that free themselves after
//! running. A callback cancelled before it runs is never freed, so a ticker
//! that is reset every frame leaks one small closure per reset.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

#![no_std]

extern crate alloc;

use alloc::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use cadence_core::ticker::{Callback, Ticker, TickerConfig, TimerId, TimingHost};

// Direct global bindings instead of `web_sys::Window` methods, so the
// `Window`/`Performance` objects are not fetched on every call.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);

    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, delay: f64) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

/// A [`TimingHost`] backed by the browser's global timing functions.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebHost {
    _priv: (),
}

impl WebHost {
    /// Creates a host for the current JS global scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [`Ticker`] running on a new `WebHost`.
    #[must_use]
    pub fn ticker(config: TickerConfig) -> Ticker {
        Ticker::with_config(Rc::new(Self::new()), config)
    }
}

fn into_js(callback: Callback) -> JsValue {
    Closure::once_into_js(callback)
}

fn timer_id(id: i32) -> TimerId {
    TimerId(u64::from(id.cast_unsigned()))
}

fn js_id(id: TimerId) -> Option<i32> {
    u32::try_from(id.0).ok().map(u32::cast_signed)
}

impl TimingHost for WebHost {
    fn now(&self) -> f64 {
        performance_now()
    }

    fn frames_available(&self) -> bool {
        web_sys::window().is_some()
    }

    fn request_frame(&self, callback: Callback) -> TimerId {
        timer_id(request_animation_frame(&into_js(callback)))
    }

    fn cancel_frame(&self, id: TimerId) {
        if let Some(id) = js_id(id) {
            cancel_animation_frame(id);
        }
    }

    fn set_timeout(&self, delay: f64, callback: Callback) -> TimerId {
        timer_id(set_timeout(&into_js(callback), delay.max(0.0)))
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Some(id) = js_id(id) {
            clear_timeout(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_ids_map_both_ways() {
        for raw in [0, 1, 7_000, i32::MAX] {
            assert_eq!(js_id(timer_id(raw)), Some(raw));
        }
    }

    #[test]
    fn foreign_timer_id_is_ignored() {
        assert_eq!(js_id(TimerId(u64::MAX)), None);
    }
}
