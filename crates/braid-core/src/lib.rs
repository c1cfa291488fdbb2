//! # Braid Core
//!
//! Time-ordered alignment of heterogeneous sample streams.
//!
//! Real-time pipelines (robotics, sensor fusion, telemetry) receive
//! timestamped samples from producers with differing rates and payload
//! types, usually out of order. `braid-core` buffers each source in a
//! bounded per-stream FIFO and re-emits samples through per-stream
//! callbacks in globally non-decreasing timestamp order, while a timeout
//! bounds how long a silent stream may hold the pipeline back.
//!
//! ## Design Principles
//!
//! 1. **Caller-driven** - no threads, no clocks; the owner calls
//!    [`StreamAligner::step`] and time advances only through sample
//!    timestamps
//! 2. **At most one emission per step** - each successful step delivers
//!    exactly one sample to exactly one callback
//! 3. **Bounded staleness** - expected-but-missing data delays emission
//!    for at most the configured timeout, then the slot is skipped
//! 4. **Silent data-plane policy** - stale, non-monotonic, and evicted
//!    samples are dropped without errors and show up in [`AlignerStats`]
//!
//! ## Example
//!
//! ```rust
//! use braid_core::{AlignerConfig, StreamAligner, StreamConfig, Time};
//!
//! let mut aligner = StreamAligner::new(AlignerConfig::default().with_timeout(Time::from_micros(2)));
//!
//! let imu = aligner.register_stream(
//!     |ts, value: i32| println!("imu @ {ts}: {value}"),
//!     StreamConfig::default().with_period(Time::from_micros(1)),
//! );
//! let gps = aligner.register_stream(
//!     |ts, fix: (f64, f64)| println!("gps @ {ts}: {fix:?}"),
//!     StreamConfig::default().with_period(Time::from_micros(1)),
//! );
//!
//! // Arrivals may interleave out of order across streams.
//! aligner.push(gps, Time::from_micros(2), (48.13, 11.58))?;
//! aligner.push(imu, Time::from_micros(1), 40)?;
//! aligner.push(imu, Time::from_micros(3), 42)?;
//!
//! // Drain: emits imu @ 1, gps @ 2, imu @ 3.
//! while aligner.step() {}
//! # Ok::<(), braid_core::Error>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod align;
pub mod time;

pub use align::{
    AlignError, AlignerConfig, AlignerStats, BufferStatus, StreamAligner, StreamConfig, StreamId,
    StreamStats,
};
pub use time::Time;

/// Result type for braid-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for braid-core
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Alignment errors (stream routing and typing)
    #[error("Align error: {0}")]
    Align(#[from] align::AlignError),
}
