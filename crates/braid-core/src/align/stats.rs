//! Counters for the aligner's silent data-plane policies.
//!
//! The alignment contract is "best effort in timestamp order, bounded by
//! timeout"; individual drops are not worth an error each. These counters
//! make the policies observable instead.

/// Per-stream counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Samples accepted into the buffer.
    pub samples_accepted: u64,

    /// Samples delivered through the callback.
    pub samples_emitted: u64,

    /// Samples dropped because their timestamp was older than the last
    /// accepted one.
    pub non_monotonic_dropped: u64,

    /// Samples evicted from a full buffer to make room for newer ones.
    pub evicted: u64,

    /// Buffered samples discarded because emission had already advanced
    /// past their timestamp.
    pub late_discarded: u64,
}

impl StreamStats {
    /// Returns the number of samples currently in flight (accepted but
    /// neither emitted nor dropped from the buffer).
    #[must_use]
    pub fn in_flight(&self) -> u64 {
        self.samples_accepted
            .saturating_sub(self.samples_emitted)
            .saturating_sub(self.evicted)
            .saturating_sub(self.late_discarded)
    }
}

/// Aligner-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignerStats {
    /// Pushes routed to a stream (valid id and type), including ones a
    /// policy then dropped.
    pub samples_in: u64,

    /// Samples emitted across all callbacks.
    pub samples_out: u64,

    /// Pushes dropped at ingress because their timestamp had already
    /// aged out of the timeout window.
    pub stale_dropped: u64,
}

impl AlignerStats {
    /// Returns the fraction of routed pushes dropped as stale
    /// (0.0 to 1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Stats are approximate, precision loss is acceptable
    pub fn stale_rate(&self) -> f64 {
        if self.samples_in == 0 {
            0.0
        } else {
            self.stale_dropped as f64 / self.samples_in as f64
        }
    }
}
