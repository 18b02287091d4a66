// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchical event propagation and a frame-timing ticker.
//!
//! `cadence_core` provides the two pieces of a scene-graph runtime that have
//! real scheduling content and no rendering in them. It is `no_std`
//! compatible (with `alloc`) and single-threaded: all shared state lives
//! behind `Rc` / `RefCell`, and nothing here blocks.
//!
//! # Architecture
//!
//! ```text
//!   TimingHost (frame / delay primitives, clock)
//!       │ callback
//!       ▼
//!   Ticker ──► tick() ──► Event { "tick", Payload::Tick } ──► Dispatcher<TickerId>
//!
//!   Application ──► EventTree::dispatch(node, event)
//!                        │
//!                        ▼
//!                  PropagationPath: capture (root → target)
//!                                   at-target
//!                                   bubble (target → root)
//! ```
//!
//! **[`event`]** — Event records, per-type listener tables
//! ([`Dispatcher`](event::Dispatcher)), the [`EventTree`](event::EventTree)
//! capability contract with the capture/target/bubble propagation algorithm,
//! and an arena [`NodeStore`](event::NodeStore) that implements it.
//!
//! **[`ticker`]** — The [`Ticker`](ticker::Ticker) scheduling state machine
//! with frame-synced, frame-driven, and interval-driven timing, pause
//! accounting, and rolling throughput statistics. Platform timing is injected
//! through [`TimingHost`](ticker::TimingHost); [`ManualHost`](ticker::ManualHost)
//! drives it deterministically.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! ticker instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Wall-clock event timestamps and a per-thread
//!   default ticker ([`ticker::global`]).
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod event;
pub mod ticker;
pub mod trace;
