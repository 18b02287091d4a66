// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records, with times stored as raw
//! `f64` bits. [`decode`] reads them back as an iterator of [`RecordedEvent`].

use cadence_core::ticker::{Primitive, TickerId};
use cadence_core::trace::{FrameSkipEvent, ResetEvent, ScheduleEvent, TickTraceEvent, TraceSink};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_SCHEDULE: u8 = 1;
const TAG_FRAME_SKIPPED: u8 = 2;
const TAG_TICK: u8 = 3;
const TAG_RESET: u8 = 4;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_primitive(&mut self, p: Option<Primitive>) {
        self.write_u8(match p {
            None => 0,
            Some(Primitive::Frame) => 1,
            Some(Primitive::Timeout) => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_schedule(&mut self, e: &ScheduleEvent) {
        self.write_u8(TAG_SCHEDULE);
        self.write_u32(e.ticker.0);
        self.write_u64(e.request);
        self.write_primitive(Some(e.primitive));
        self.write_f64(e.delay);
        self.write_f64(e.at);
    }

    fn on_frame_skipped(&mut self, e: &FrameSkipEvent) {
        self.write_u8(TAG_FRAME_SKIPPED);
        self.write_u32(e.ticker.0);
        self.write_f64(e.now);
        self.write_f64(e.elapsed);
        self.write_f64(e.threshold);
    }

    fn on_tick(&mut self, e: &TickTraceEvent) {
        self.write_u8(TAG_TICK);
        self.write_u32(e.ticker.0);
        self.write_u64(e.tick_index);
        self.write_f64(e.now);
        self.write_f64(e.elapsed);
        self.write_f64(e.delta);
        self.write_bool(e.paused);
        self.write_f64(e.cost);
        self.write_bool(e.dispatched);
    }

    fn on_reset(&mut self, e: &ResetEvent) {
        self.write_u8(TAG_RESET);
        self.write_u32(e.ticker.0);
        self.write_f64(e.at);
        self.write_primitive(e.cancelled);
        self.write_u64(e.ticks);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`ScheduleEvent`].
    Schedule(ScheduleEvent),
    /// A [`FrameSkipEvent`].
    FrameSkipped(FrameSkipEvent),
    /// A [`TickTraceEvent`].
    Tick(TickTraceEvent),
    /// A [`ResetEvent`].
    Reset(ResetEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|b| b != 0)
    }

    fn read_primitive(&mut self) -> Option<Option<Primitive>> {
        Some(match self.read_u8()? {
            0 => None,
            1 => Some(Primitive::Frame),
            _ => Some(Primitive::Timeout),
        })
    }

    fn decode_schedule(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Schedule(ScheduleEvent {
            ticker: TickerId(self.read_u32()?),
            request: self.read_u64()?,
            primitive: self.read_primitive()?.unwrap_or(Primitive::Frame),
            delay: self.read_f64()?,
            at: self.read_f64()?,
        }))
    }

    fn decode_frame_skipped(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSkipped(FrameSkipEvent {
            ticker: TickerId(self.read_u32()?),
            now: self.read_f64()?,
            elapsed: self.read_f64()?,
            threshold: self.read_f64()?,
        }))
    }

    fn decode_tick(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Tick(TickTraceEvent {
            ticker: TickerId(self.read_u32()?),
            tick_index: self.read_u64()?,
            now: self.read_f64()?,
            elapsed: self.read_f64()?,
            delta: self.read_f64()?,
            paused: self.read_bool()?,
            cost: self.read_f64()?,
            dispatched: self.read_bool()?,
        }))
    }

    fn decode_reset(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Reset(ResetEvent {
            ticker: TickerId(self.read_u32()?),
            at: self.read_f64()?,
            cancelled: self.read_primitive()?,
            ticks: self.read_u64()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_SCHEDULE => self.decode_schedule(),
            TAG_FRAME_SKIPPED => self.decode_frame_skipped(),
            TAG_TICK => self.decode_tick(),
            TAG_RESET => self.decode_reset(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tick() -> TickTraceEvent {
        TickTraceEvent {
            ticker: TickerId(4),
            tick_index: 12,
            now: 1016.5,
            elapsed: 16.5,
            delta: 16.5,
            paused: false,
            cost: 0.125,
            dispatched: true,
        }
    }

    #[test]
    fn records_decode_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_schedule(&ScheduleEvent {
            ticker: TickerId(4),
            request: 3,
            primitive: Primitive::Timeout,
            delay: 50.0,
            at: 1000.0,
        });
        rec.on_tick(&sample_tick());
        rec.on_reset(&ResetEvent {
            ticker: TickerId(4),
            at: 1020.0,
            cancelled: Some(Primitive::Frame),
            ticks: 12,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            RecordedEvent::Schedule(ScheduleEvent {
                primitive: Primitive::Timeout,
                request: 3,
                ..
            })
        ));
        assert_eq!(events[1], RecordedEvent::Tick(sample_tick()));
        let RecordedEvent::Reset(reset) = events[2] else {
            panic!("expected a reset, got {:?}", events[2]);
        };
        assert_eq!(reset.cancelled, Some(Primitive::Frame));
        assert_eq!(reset.ticks, 12);
    }

    #[test]
    fn reset_without_pending_keeps_none() {
        let mut rec = RecorderSink::new();
        rec.on_reset(&ResetEvent {
            ticker: TickerId(0),
            at: 0.0,
            cancelled: None,
            ticks: 0,
        });
        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert!(matches!(
            events[..],
            [RecordedEvent::Reset(ResetEvent { cancelled: None, .. })]
        ));
    }

    #[test]
    fn truncated_record_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_frame_skipped(&FrameSkipEvent {
            ticker: TickerId(1),
            now: 8.0,
            elapsed: 8.0,
            threshold: 16.17,
        });
        rec.on_tick(&sample_tick());
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 3];

        let events: Vec<_> = decode(cut).collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], RecordedEvent::FrameSkipped(_)));
    }

    #[test]
    fn unknown_tag_stops_iteration() {
        assert_eq!(decode(&[0xFF, 1, 2, 3]).count(), 0);
    }

    #[test]
    fn clear_discards_recording() {
        let mut rec = RecorderSink::new();
        rec.on_tick(&sample_tick());
        assert!(!rec.as_bytes().is_empty());
        rec.clear();
        assert_eq!(decode(rec.as_bytes()).count(), 0);
    }
}
