//! Configuration types for the aligner and its streams.

use crate::time::Time;

/// Default per-stream buffer capacity.
///
/// Sized for slow consumers: a stream should be able to buffer at least
/// the samples that can arrive within one timeout window.
pub const DEFAULT_BUFFER_CAPACITY: usize = 10;

/// Buffer capacity value meaning "no bound".
pub const UNBOUNDED: usize = 0;

/// Default aligner timeout (1 second).
pub const DEFAULT_TIMEOUT: Time = Time::from_secs(1);

/// Configuration for a single registered stream.
///
/// # Example
///
/// ```rust
/// use braid_core::{StreamConfig, Time};
///
/// // A 100 Hz sensor, buffering up to 32 samples.
/// let config = StreamConfig::default()
///     .with_period(Time::from_millis(10))
///     .with_buffer_capacity(32);
/// assert_eq!(config.buffer_capacity, 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Buffer capacity; [`UNBOUNDED`] (zero) disables the bound.
    ///
    /// When full, the oldest buffered sample is evicted to make room
    /// (drop-oldest): old data is uninteresting once newer has arrived.
    pub buffer_capacity: usize,

    /// Expected time between samples; [`Time::ZERO`] marks the stream
    /// aperiodic.
    ///
    /// The period predicts the next expected arrival, which lets the
    /// aligner wait for a periodic stream that has not delivered yet
    /// instead of emitting newer data from its siblings.
    pub period: Time,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            period: Time::ZERO,
        }
    }
}

impl StreamConfig {
    /// Sets the buffer capacity.
    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Sets the expected sample period.
    #[must_use]
    pub fn with_period(mut self, period: Time) -> Self {
        self.period = period;
        self
    }

    /// Returns true if the stream is periodic.
    #[must_use]
    pub fn is_periodic(&self) -> bool {
        !self.period.is_null()
    }
}

/// Configuration for a [`StreamAligner`](crate::StreamAligner).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignerConfig {
    /// Upper bound on how long an expected-but-missing sample may hold
    /// back emission, measured against the newest timestamp seen on any
    /// stream.
    pub timeout: Time,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AlignerConfig {
    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Time) -> Self {
        self.timeout = timeout;
        self
    }
}
