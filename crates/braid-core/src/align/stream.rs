//! Per-stream buffering and delivery.
//!
//! A [`Stream`] is a single typed source: a bounded FIFO of timestamped
//! samples, the callback that receives them, and the expected period used
//! to predict the next arrival. Streams enforce two local policies on
//! ingress — non-monotonic samples are dropped, and a full buffer evicts
//! its oldest entry — while emission order is decided by the aligner.
//!
//! The aligner stores streams behind the non-generic [`StreamHandle`]
//! trait and recovers the typed form on each push via `Any` downcast, so
//! one aligner can own streams of arbitrary payload types.

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;

use tracing::trace;

use super::config::StreamConfig;
use super::registry::StreamId;
use super::stats::StreamStats;
use crate::time::Time;

/// Snapshot of a stream buffer's occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStatus {
    /// Number of buffered samples.
    pub fill: usize,

    /// Configured capacity; zero means unbounded.
    pub capacity: usize,
}

/// A timestamped sample awaiting emission.
struct Sample<T> {
    ts: Time,
    value: T,
}

/// Type-erased view of a [`Stream`], as stored by the registry.
///
/// Everything the step algorithm needs is payload-type independent; only
/// `push` has to recover the concrete [`Stream<T>`], through
/// [`StreamHandle::as_any_mut`].
pub(crate) trait StreamHandle {
    /// Removes the front sample. When `late` is false the sample is
    /// delivered through the callback and the overdue flag is cleared;
    /// when `late` is true it is discarded silently.
    fn pop(&mut self, late: bool);

    /// Returns true if the buffer is non-empty.
    fn has_data(&self) -> bool;

    /// Returns the earliest plausible time at which this stream has
    /// deliverable data: the front sample's timestamp, or
    /// `last_time + period` when the buffer is empty.
    ///
    /// Null means the stream is not expecting anything (aperiodic and
    /// never pushed).
    fn next_timestamp(&self) -> Time;

    /// Returns the buffer fill and capacity.
    fn buffer_status(&self) -> BufferStatus;

    /// Returns true if an expected sample missed the timeout window and
    /// was skipped over.
    fn is_overdue(&self) -> bool;

    /// Flags the stream as overdue.
    fn mark_overdue(&mut self);

    /// Returns a snapshot of the per-stream counters.
    fn stats(&self) -> StreamStats;

    /// Name of the payload type the stream was registered with.
    fn payload_type(&self) -> &'static str;

    /// Downcast hook for typed access on push.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl fmt::Debug for dyn StreamHandle + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("payload_type", &self.payload_type())
            .field("buffer_status", &self.buffer_status())
            .field("is_overdue", &self.is_overdue())
            .field("stats", &self.stats())
            .finish()
    }
}

/// A single typed sample source.
pub(crate) struct Stream<T> {
    id: StreamId,
    buffer: VecDeque<Sample<T>>,
    callback: Box<dyn FnMut(Time, T)>,
    capacity: usize,
    period: Time,
    last_time: Time,
    overdue: bool,
    stats: StreamStats,
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("id", &self.id)
            .field("buffer_len", &self.buffer.len())
            .field("capacity", &self.capacity)
            .field("period", &self.period)
            .field("last_time", &self.last_time)
            .field("overdue", &self.overdue)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<T: 'static> Stream<T> {
    pub(crate) fn new(id: StreamId, callback: Box<dyn FnMut(Time, T)>, config: StreamConfig) -> Self {
        Self {
            id,
            buffer: VecDeque::new(),
            callback,
            capacity: config.buffer_capacity,
            period: config.period,
            last_time: Time::ZERO,
            overdue: false,
            stats: StreamStats::default(),
        }
    }

    /// Accepts a sample into the buffer.
    ///
    /// Samples older than the last accepted one are dropped: out-of-order
    /// arrivals on a single stream are a producer bug or a duplicate.
    /// When the buffer is at capacity the oldest entry is evicted first.
    pub(crate) fn push(&mut self, ts: Time, value: T) {
        if ts < self.last_time {
            self.stats.non_monotonic_dropped += 1;
            trace!(
                stream = self.id.index(),
                ts = %ts,
                last = %self.last_time,
                "dropping non-monotonic sample"
            );
            return;
        }

        self.last_time = ts;

        while self.capacity > 0 && self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
            self.stats.evicted += 1;
            trace!(stream = self.id.index(), "buffer full, evicting oldest sample");
        }

        self.buffer.push_back(Sample { ts, value });
        self.stats.samples_accepted += 1;
    }
}

impl<T: 'static> StreamHandle for Stream<T> {
    fn pop(&mut self, late: bool) {
        let Some(sample) = self.buffer.pop_front() else {
            return;
        };

        if late {
            self.stats.late_discarded += 1;
        } else {
            self.overdue = false;
            self.stats.samples_emitted += 1;
            (self.callback)(sample.ts, sample.value);
        }
    }

    fn has_data(&self) -> bool {
        !self.buffer.is_empty()
    }

    fn next_timestamp(&self) -> Time {
        match self.buffer.front() {
            Some(sample) => sample.ts,
            None => self.last_time + self.period,
        }
    }

    fn buffer_status(&self) -> BufferStatus {
        BufferStatus {
            fill: self.buffer.len(),
            capacity: self.capacity,
        }
    }

    fn is_overdue(&self) -> bool {
        self.overdue
    }

    fn mark_overdue(&mut self) {
        self.overdue = true;
    }

    fn stats(&self) -> StreamStats {
        self.stats
    }

    fn payload_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
