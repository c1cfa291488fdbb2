//! # Align Module
//!
//! Multi-stream sample alignment: bounded per-stream buffering and
//! globally time-ordered emission.
//!
//! ## Components
//!
//! - [`StreamAligner`]: owns all registered streams and arbitrates
//!   emission order through its `step` algorithm
//! - [`StreamConfig`] / [`AlignerConfig`]: buffering, period, and timeout
//!   knobs
//! - [`StreamStats`] / [`AlignerStats`]: counters for the silent
//!   data-plane policies (stale, non-monotonic, eviction, late discard)
//!
//! ## Contract
//!
//! Producers push `(timestamp, value)` pairs keyed by the [`StreamId`]
//! returned at registration. The owner repeatedly calls
//! [`StreamAligner::step`]; every successful step invokes exactly one
//! callback, and the timestamps seen across all callbacks never decrease.
//! A stream that is expected to produce (it is periodic, or has produced
//! before) can hold emission back, but only until its expected arrival is
//! `timeout` older than the newest sample seen anywhere; after that the
//! stream is marked overdue and skipped.
//!
//! Only misrouted pushes are errors. Everything the data plane drops by
//! policy is silent and counted.

mod aligner;
mod config;
mod registry;
mod stats;
mod stream;

pub use aligner::StreamAligner;
pub use config::{AlignerConfig, StreamConfig, DEFAULT_BUFFER_CAPACITY, DEFAULT_TIMEOUT, UNBOUNDED};
pub use registry::StreamId;
pub use stats::{AlignerStats, StreamStats};
pub use stream::BufferStatus;

/// Errors for stream routing and typing.
///
/// These surface programming bugs in the host: pushing against an id that
/// was never registered, or with a payload type other than the one the
/// stream was registered with. Data-plane anomalies (stale samples,
/// non-monotonic samples, buffer overflow, overdue streams) are policy
/// outcomes, not errors; see [`AlignerStats`].
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    /// Push against a stream id that is not registered
    #[error("invalid stream id {id}: {registered} streams registered")]
    InvalidStream {
        /// The offending id
        id: usize,
        /// Number of registered streams
        registered: usize,
    },

    /// Push with a payload type other than the registered one
    #[error("type mismatch on stream {id}: registered {expected}, pushed {actual}")]
    TypeMismatch {
        /// The stream id
        id: usize,
        /// Payload type the stream was registered with
        expected: &'static str,
        /// Payload type of the rejected push
        actual: &'static str,
    },
}
