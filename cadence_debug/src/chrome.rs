// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Each ticker gets its own track (`tid`). Ticks become complete events whose
//! duration is the time spent in listeners, with a `delta` counter alongside.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use cadence_core::ticker::Primitive;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Recorded times are host milliseconds and are written as microseconds.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Schedule(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Schedule",
                    "cat": "Ticker",
                    "ts": ms_to_us(e.at),
                    "pid": 0,
                    "tid": e.ticker.0,
                    "s": "t",
                    "args": {
                        "request": e.request,
                        "primitive": primitive_name(e.primitive),
                        "delay_ms": e.delay,
                    }
                }));
            }
            RecordedEvent::FrameSkipped(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameSkipped",
                    "cat": "Ticker",
                    "ts": ms_to_us(e.now),
                    "pid": 0,
                    "tid": e.ticker.0,
                    "s": "t",
                    "args": {
                        "elapsed_ms": e.elapsed,
                        "threshold_ms": e.threshold,
                    }
                }));
            }
            RecordedEvent::Tick(e) => {
                events.push(json!({
                    "ph": "X",
                    "name": "Tick",
                    "cat": "Ticker",
                    "ts": ms_to_us(e.now),
                    "dur": ms_to_us(e.cost),
                    "pid": 0,
                    "tid": e.ticker.0,
                    "args": {
                        "tick_index": e.tick_index,
                        "elapsed_ms": e.elapsed,
                        "paused": e.paused,
                        "dispatched": e.dispatched,
                    }
                }));
                events.push(json!({
                    "ph": "C",
                    "name": "delta",
                    "cat": "Ticker",
                    "ts": ms_to_us(e.now),
                    "pid": 0,
                    "tid": e.ticker.0,
                    "args": {
                        "delta_ms": e.delta,
                    }
                }));
            }
            RecordedEvent::Reset(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Reset",
                    "cat": "Ticker",
                    "ts": ms_to_us(e.at),
                    "pid": 0,
                    "tid": e.ticker.0,
                    "s": "t",
                    "args": {
                        "ticks": e.ticks,
                        "cancelled": e.cancelled.map(primitive_name),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ms_to_us(ms: f64) -> f64 {
    ms * 1000.0
}

fn primitive_name(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::Frame => "frame",
        Primitive::Timeout => "timeout",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use cadence_core::ticker::TickerId;
    use cadence_core::trace::{FrameSkipEvent, ResetEvent, ScheduleEvent, TickTraceEvent, TraceSink};

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_schedule(&ScheduleEvent {
            ticker: TickerId(1),
            request: 1,
            primitive: Primitive::Frame,
            delay: 0.0,
            at: 1.0,
        });
        rec.on_frame_skipped(&FrameSkipEvent {
            ticker: TickerId(1),
            now: 8.0,
            elapsed: 8.0,
            threshold: 16.17,
        });
        rec.on_tick(&TickTraceEvent {
            ticker: TickerId(1),
            tick_index: 1,
            now: 17.0,
            elapsed: 17.0,
            delta: 17.0,
            paused: false,
            cost: 0.5,
            dispatched: true,
        });
        rec.on_reset(&ResetEvent {
            ticker: TickerId(1),
            at: 20.0,
            cancelled: None,
            ticks: 1,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 5);

        assert_eq!(parsed[0]["name"], "Schedule");
        assert_eq!(parsed[0]["args"]["primitive"], "frame");
        assert_eq!(parsed[1]["name"], "FrameSkipped");

        assert_eq!(parsed[2]["ph"], "X");
        assert_eq!(parsed[2]["ts"], 17_000.0);
        assert_eq!(parsed[2]["dur"], 500.0);
        assert_eq!(parsed[3]["ph"], "C");
        assert_eq!(parsed[3]["args"]["delta_ms"], 17.0);

        assert_eq!(parsed[4]["name"], "Reset");
        assert!(parsed[4]["args"]["cancelled"].is_null());
        assert_eq!(parsed[4]["tid"], 1);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
