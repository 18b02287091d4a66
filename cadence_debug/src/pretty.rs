// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Times are
//! host milliseconds.

use std::io::Write;

use cadence_core::ticker::Primitive;
use cadence_core::trace::{FrameSkipEvent, ResetEvent, ScheduleEvent, TickTraceEvent, TraceSink};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn primitive_name(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::Frame => "frame",
        Primitive::Timeout => "timeout",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_schedule(&mut self, e: &ScheduleEvent) {
        let _ = writeln!(
            self.writer,
            "[schedule] ticker={} request={} via={} delay={:.1}ms at={:.1}ms",
            e.ticker.0,
            e.request,
            primitive_name(e.primitive),
            e.delay,
            e.at,
        );
    }

    fn on_frame_skipped(&mut self, e: &FrameSkipEvent) {
        let _ = writeln!(
            self.writer,
            "[skip] ticker={} at={:.1}ms elapsed={:.1}ms < {:.1}ms",
            e.ticker.0, e.now, e.elapsed, e.threshold,
        );
    }

    fn on_tick(&mut self, e: &TickTraceEvent) {
        let paused = if e.paused { " PAUSED" } else { "" };
        let _ = writeln!(
            self.writer,
            "[tick] ticker={} #{} at={:.1}ms delta={:.1}ms cost={:.2}ms{paused}",
            e.ticker.0, e.tick_index, e.now, e.delta, e.cost,
        );
    }

    fn on_reset(&mut self, e: &ResetEvent) {
        let cancelled = e.cancelled.map_or("none", primitive_name);
        let _ = writeln!(
            self.writer,
            "[reset] ticker={} at={:.1}ms ticks={} cancelled={cancelled}",
            e.ticker.0, e.at, e.ticks,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::ticker::TickerId;

    #[test]
    fn pretty_print_tick() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_tick(&TickTraceEvent {
            ticker: TickerId(2),
            tick_index: 7,
            now: 116.0,
            elapsed: 16.0,
            delta: 16.0,
            paused: true,
            cost: 0.25,
            dispatched: true,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.starts_with("[tick] ticker=2 #7"), "got: {output}");
        assert!(output.contains("PAUSED"), "got: {output}");
    }

    #[test]
    fn pretty_print_reset_without_pending() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_reset(&ResetEvent {
            ticker: TickerId(0),
            at: 10.0,
            cancelled: None,
            ticks: 3,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("cancelled=none"), "got: {output}");
    }
}
