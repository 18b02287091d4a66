// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated frame loop that exercises the ticker, the scene event tree, and
//! the tracing pipeline.
//!
//! A [`ManualHost`] stands in for the display: 120 jittery frames are fired
//! into a frame-synced ticker whose `"tick"` listener dispatches a bubbling
//! `"frame"` event through a three-node scene. Ticker trace events go to both
//! a [`PrettyPrintSink`] and a [`RecorderSink`], and the recording is exported
//! as a Chrome trace JSON file.

use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use cadence_core::event::{Event, EventTree, ListenerOptions, NodeId, NodeStore, Payload};
use cadence_core::ticker::{ManualHost, TICK, Ticker, TickerConfig};
use cadence_core::trace::{FrameSkipEvent, ResetEvent, ScheduleEvent, TickTraceEvent, TraceSink};

use cadence_debug::pretty::PrettyPrintSink;
use cadence_debug::recorder::RecorderSink;

const FRAME_COUNT: usize = 120;
/// Display frame lengths in milliseconds, cycled. Includes a short frame that
/// the synced ticker skips and a long one that `max_delta` clamps.
const FRAME_PATTERN: [f64; 6] = [16.7, 16.6, 16.7, 9.0, 24.4, 150.0];

/// Forwards every event to two sinks.
struct Tee<A, B>(A, B);

impl<A: TraceSink, B: TraceSink> TraceSink for Tee<A, B> {
    fn on_schedule(&mut self, e: &ScheduleEvent) {
        self.0.on_schedule(e);
        self.1.on_schedule(e);
    }

    fn on_frame_skipped(&mut self, e: &FrameSkipEvent) {
        self.0.on_frame_skipped(e);
        self.1.on_frame_skipped(e);
    }

    fn on_tick(&mut self, e: &TickTraceEvent) {
        self.0.on_tick(e);
        self.1.on_tick(e);
    }

    fn on_reset(&mut self, e: &ResetEvent) {
        self.0.on_reset(e);
        self.1.on_reset(e);
    }
}

/// Builds `root > layer > sprite` and returns the scene with the sprite id.
fn build_scene(frames_seen: &Rc<Cell<u64>>) -> (NodeStore, NodeId) {
    let mut scene = NodeStore::new();
    let root = scene.create_node();
    let layer = scene.create_node();
    let sprite = scene.create_node();
    scene.add_child(root, layer);
    scene.add_child(layer, sprite);

    scene
        .listeners(sprite)
        .on("frame", (), ListenerOptions::default(), |event, _| {
            if let Some(info) = event.payload.tick() {
                // Pretend to animate; a paused ticker freezes the sprite.
                if info.paused {
                    event.stop_propagation();
                }
            }
        });
    scene.listeners(root).on(
        "frame",
        Rc::clone(frames_seen),
        ListenerOptions::default(),
        |_, seen| seen.set(seen.get() + 1),
    );
    (scene, sprite)
}

fn main() {
    // -- sinks -------------------------------------------------------------
    let pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let recorder = Rc::new(RefCell::new(RecorderSink::new()));

    // -- ticker ------------------------------------------------------------
    let host = Rc::new(ManualHost::new());
    host.set_now(1_000.0);
    let ticker = Ticker::with_config(host.clone(), TickerConfig::animation());
    ticker.set_trace_sink(Box::new(Tee(pretty, Rc::clone(&recorder))));

    // -- scene -------------------------------------------------------------
    let frames_seen = Rc::new(Cell::new(0_u64));
    let (scene, sprite) = build_scene(&frames_seen);
    let scene = Rc::new(scene);

    ticker.on(
        TICK,
        (Rc::clone(&scene), sprite),
        ListenerOptions::default(),
        |tick, (scene, sprite)| {
            let mut frame = Event::new("frame", true, false).with_payload(tick.payload.clone());
            scene.dispatch(*sprite, &mut frame);
        },
    );

    // -- simulated loop ----------------------------------------------------
    ticker.initialize();
    for frame in 0..FRAME_COUNT {
        if frame == 60 {
            ticker.set_paused(true);
        } else if frame == 90 {
            ticker.set_paused(false);
        }
        host.advance(FRAME_PATTERN[frame % FRAME_PATTERN.len()]);
        host.fire_frame();
    }

    println!(
        "ticks={} (running {}), frames bubbled to root={}, time={:.1}ms run_time={:.1}ms",
        ticker.ticks(false),
        ticker.ticks(true),
        frames_seen.get(),
        ticker.time(false),
        ticker.time(true),
    );
    println!(
        "measured fps={:.1}, mean tick cost={:.3}ms",
        ticker.measured_fps(None),
        ticker.measured_tick_time(None),
    );
    ticker.reset();

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    cadence_debug::chrome::export(recorder.borrow().as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({FRAME_COUNT} frames)");
}
