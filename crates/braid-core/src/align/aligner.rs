//! The stream aligner and its step algorithm.
//!
//! ## How It Works
//!
//! 1. Producers push `(timestamp, value)` samples keyed by stream id;
//!    each lands in its stream's bounded FIFO (or is dropped by the
//!    ingress policies: stale or non-monotonic)
//! 2. The owner calls [`StreamAligner::step`] in a loop; each step picks
//!    the stream whose next deliverable sample is earliest and emits it
//!    through that stream's callback
//! 3. A periodic stream with an empty buffer projects its next expected
//!    arrival (`last_time + period`); if that projection is earliest, the
//!    aligner withholds emission and waits for it
//! 4. Waiting is bounded: once the expected arrival is `timeout` older
//!    than the newest timestamp seen anywhere, the stream is marked
//!    overdue and its empty slot is skipped
//!
//! Emission timestamps never decrease; data that arrives behind the
//! emission clock is discarded without a callback.

use std::fmt;

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::config::{AlignerConfig, StreamConfig};
use super::registry::{StreamId, StreamRegistry};
use super::stats::{AlignerStats, StreamStats};
use super::stream::BufferStatus;
use crate::time::Time;
use crate::Result;

/// One stream's claim in a step: the earliest time it could deliver, and
/// whether that claim is backed by buffered data or only predicted.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    next_ts: Time,
    has_data: bool,
    id: StreamId,
}

/// Scratch list for step's candidate scan.
///
/// Uses `SmallVec` to keep the common case (a handful of streams) off
/// the heap.
type CandidateVec = SmallVec<[Candidate; 8]>;

/// Arbitrates globally time-ordered emission across registered streams.
///
/// The aligner owns every stream registered against it. It is
/// single-threaded and cooperative: all operations run on one logical
/// owner, callbacks are invoked synchronously from [`step`], and
/// callbacks must not call back into the aligner that invoked them.
///
/// # Example
///
/// ```rust
/// use braid_core::{AlignerConfig, StreamAligner, StreamConfig, Time};
///
/// let mut aligner =
///     StreamAligner::new(AlignerConfig::default().with_timeout(Time::from_millis(50)));
/// let temp = aligner.register_stream(
///     |ts, celsius: f32| println!("{ts}: {celsius}"),
///     StreamConfig::default().with_period(Time::from_millis(10)),
/// );
///
/// aligner.push(temp, Time::from_millis(10), 21.5f32)?;
/// while aligner.step() {}
/// # Ok::<(), braid_core::Error>(())
/// ```
///
/// [`step`]: StreamAligner::step
pub struct StreamAligner {
    registry: StreamRegistry,
    timeout: Time,
    /// Newest timestamp accepted by any push.
    latest_ts: Time,
    /// Timestamp of the most recently emitted sample.
    current_ts: Time,
    stats: AlignerStats,
}

impl StreamAligner {
    /// Creates an aligner with the given configuration.
    #[must_use]
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            registry: StreamRegistry::new(),
            timeout: config.timeout,
            latest_ts: Time::ZERO,
            current_ts: Time::ZERO,
            stats: AlignerStats::default(),
        }
    }

    /// Registers a stream and returns its id.
    ///
    /// Ids are dense, assigned in registration order, and must be
    /// registered before any push against them. The callback receives
    /// every emitted sample for this stream, in globally non-decreasing
    /// timestamp order across all streams.
    pub fn register_stream<T: 'static>(
        &mut self,
        callback: impl FnMut(Time, T) + 'static,
        config: StreamConfig,
    ) -> StreamId {
        let id = self.registry.register(Box::new(callback), config);
        debug!(
            stream = id.index(),
            payload = std::any::type_name::<T>(),
            capacity = config.buffer_capacity,
            period = %config.period,
            "registered stream"
        );
        id
    }

    /// Pushes a sample into the stream at `id`.
    ///
    /// Samples whose timestamp has already aged out of the timeout
    /// window are dropped silently: they could never be emitted without
    /// breaking emission order. Everything else is forwarded to the
    /// stream, which applies its own non-monotonicity and drop-oldest
    /// policies.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::InvalidStream`](super::AlignError::InvalidStream)
    /// if `id` was not issued by this aligner, and
    /// [`AlignError::TypeMismatch`](super::AlignError::TypeMismatch) if the
    /// stream was registered with a payload type other than `T`.
    pub fn push<T: 'static>(&mut self, id: StreamId, ts: Time, value: T) -> Result<()> {
        let stream = self.registry.get_typed_mut::<T>(id)?;

        self.stats.samples_in += 1;

        if ts + self.timeout < self.latest_ts {
            self.stats.stale_dropped += 1;
            trace!(
                stream = id.index(),
                ts = %ts,
                latest = %self.latest_ts,
                "dropping stale sample at ingress"
            );
            return Ok(());
        }

        if ts > self.latest_ts {
            self.latest_ts = ts;
        }

        stream.push(ts, value);
        Ok(())
    }

    /// Advances the pipeline by at most one emitted sample.
    ///
    /// Returns true if a sample was emitted and the caller should step
    /// again immediately; false if the caller should wait for further
    /// pushes (or for staler data to age past the timeout externally).
    ///
    /// Scanning earliest-first, a stream with buffered data is drained;
    /// a stream that is only *expected* to deliver blocks emission while
    /// its projection is within the timeout window, and is marked
    /// overdue and skipped once the window is exceeded. On equal
    /// timestamps the earlier-registered stream wins, whether its claim
    /// is buffered data or an expectation.
    pub fn step(&mut self) -> bool {
        if self.registry.is_empty() {
            return false;
        }

        let mut candidates = CandidateVec::new();
        let mut any_data = false;

        for (id, stream) in self.registry.iter_mut() {
            // Discard data the emission clock has already passed.
            while stream.has_data() && stream.next_timestamp() < self.current_ts {
                stream.pop(true);
            }

            let next_ts = stream.next_timestamp();
            let has_data = stream.has_data();

            // A stream participates only if it has data or expects some.
            if has_data || !next_ts.is_null() {
                candidates.push(Candidate {
                    next_ts,
                    has_data,
                    id,
                });
                any_data |= has_data;
            }
        }

        if candidates.is_empty() || !any_data {
            return false;
        }

        // Stable sort: equal timestamps keep registration order.
        candidates.sort_by_key(|candidate| candidate.next_ts);

        for candidate in &candidates {
            let stream = self
                .registry
                .get_mut(candidate.id)
                .expect("candidate ids index the registry");

            if candidate.has_data {
                stream.pop(false);
                self.current_ts = candidate.next_ts;
                self.stats.samples_out += 1;
                return true;
            }

            if candidate.next_ts + self.timeout > self.latest_ts {
                // The expected sample still has window left; hold
                // emission for it.
                return false;
            }

            debug!(
                stream = candidate.id.index(),
                expected = %candidate.next_ts,
                latest = %self.latest_ts,
                "expected sample overdue, skipping"
            );
            stream.mark_overdue();
        }

        false
    }

    /// Updates the timeout; takes effect on the next push or step.
    pub fn set_timeout(&mut self, timeout: Time) {
        self.timeout = timeout;
    }

    /// Returns the configured timeout.
    #[must_use]
    pub fn timeout(&self) -> Time {
        self.timeout
    }

    /// Returns the gap between the newest ingested timestamp and the
    /// newest emitted one.
    #[must_use]
    pub fn latency(&self) -> Time {
        self.latest_ts - self.current_ts
    }

    /// Returns the timestamp of the most recently emitted sample.
    #[must_use]
    pub fn current_time(&self) -> Time {
        self.current_ts
    }

    /// Returns the newest timestamp accepted by any push.
    #[must_use]
    pub fn latest_time(&self) -> Time {
        self.latest_ts
    }

    /// Returns the number of registered streams.
    #[must_use]
    pub fn stream_count(&self) -> usize {
        self.registry.len()
    }

    /// Returns the buffer fill and capacity of the stream at `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::InvalidStream`](super::AlignError::InvalidStream)
    /// if `id` was not issued by this aligner.
    pub fn buffer_status(&self, id: StreamId) -> Result<BufferStatus> {
        Ok(self.registry.get(id)?.buffer_status())
    }

    /// Returns true if the stream at `id` missed its timeout window and
    /// was skipped over. The flag clears on the stream's next delivery.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::InvalidStream`](super::AlignError::InvalidStream)
    /// if `id` was not issued by this aligner.
    pub fn is_overdue(&self, id: StreamId) -> Result<bool> {
        Ok(self.registry.get(id)?.is_overdue())
    }

    /// Returns a snapshot of the aligner-wide counters.
    #[must_use]
    pub fn stats(&self) -> AlignerStats {
        self.stats
    }

    /// Returns a snapshot of the counters of the stream at `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AlignError::InvalidStream`](super::AlignError::InvalidStream)
    /// if `id` was not issued by this aligner.
    pub fn stream_stats(&self, id: StreamId) -> Result<StreamStats> {
        Ok(self.registry.get(id)?.stats())
    }
}

impl Default for StreamAligner {
    fn default() -> Self {
        Self::new(AlignerConfig::default())
    }
}

impl fmt::Display for StreamAligner {
    /// One header line with the aligner clocks, then one row per stream:
    /// fill, capacity, overdue flag, next expected timestamp.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "current time: {} latest time: {} latency: {}",
            self.current_ts,
            self.latest_ts,
            self.latency()
        )?;
        for (id, stream) in self.registry.iter() {
            let status = stream.buffer_status();
            writeln!(
                f,
                "{id}: {}/{} overdue: {} next: {}",
                status.fill,
                status.capacity,
                stream.is_overdue(),
                stream.next_timestamp()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::AlignError;
    use crate::Error;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(&'static str, i64, i32)>>>;

    fn recorder(log: &Log, tag: &'static str) -> impl FnMut(Time, i32) {
        let log = Rc::clone(log);
        move |ts, value| log.borrow_mut().push((tag, ts.as_micros(), value))
    }

    fn micros(t: i64) -> Time {
        Time::from_micros(t)
    }

    /// Two periodic streams, timeout 2µs: the setup shared by most of
    /// the interleaving scenarios below.
    fn two_stream_aligner(log: &Log) -> (StreamAligner, StreamId, StreamId) {
        let mut aligner = StreamAligner::new(AlignerConfig::default().with_timeout(micros(2)));
        let config = StreamConfig::default().with_period(micros(1));
        let a = aligner.register_stream(recorder(log, "a"), config);
        let b = aligner.register_stream(recorder(log, "b"), config);
        (aligner, a, b)
    }

    fn drain(aligner: &mut StreamAligner) -> usize {
        let mut emitted = 0;
        while aligner.step() {
            emitted += 1;
        }
        emitted
    }

    // ==================== Interleaving Scenarios ====================

    #[test]
    fn test_two_streams_interleaved_in_order() {
        let log = Log::default();
        let (mut aligner, a, b) = two_stream_aligner(&log);

        aligner.push(a, micros(1), 10).unwrap();
        aligner.push(b, micros(2), 20).unwrap();
        aligner.push(a, micros(3), 30).unwrap();
        aligner.push(b, micros(4), 40).unwrap();

        // b's sample at 4 stays buffered: a is expected at 4 too, the
        // earlier-registered stream wins the tie, and its window has
        // not run out.
        assert_eq!(drain(&mut aligner), 3);
        assert_eq!(
            *log.borrow(),
            vec![("a", 1, 10), ("b", 2, 20), ("a", 3, 30)]
        );
        assert_eq!(aligner.buffer_status(b).unwrap().fill, 1);

        // The expected sample arrives; both drain, a first.
        aligner.push(a, micros(4), 31).unwrap();
        assert_eq!(drain(&mut aligner), 2);
        assert_eq!(
            *log.borrow(),
            vec![
                ("a", 1, 10),
                ("b", 2, 20),
                ("a", 3, 30),
                ("a", 4, 31),
                ("b", 4, 40)
            ]
        );
    }

    #[test]
    fn test_out_of_order_arrivals_reordered() {
        let log = Log::default();
        let (mut aligner, a, b) = two_stream_aligner(&log);

        aligner.push(b, micros(2), 20).unwrap();
        aligner.push(a, micros(1), 10).unwrap();

        // a's sample sorts first despite arriving second; b's is then
        // held while a is expected at the same timestamp.
        assert_eq!(drain(&mut aligner), 1);
        assert_eq!(*log.borrow(), vec![("a", 1, 10)]);

        // Real data on a replaces the expectation that gated b; b then
        // drains first and a's newer sample follows.
        aligner.push(a, micros(5), 30).unwrap();
        drain(&mut aligner);
        assert_eq!(
            *log.borrow(),
            vec![("a", 1, 10), ("b", 2, 20), ("a", 5, 30)]
        );
    }

    #[test]
    fn test_timeout_skips_silent_stream() {
        let log = Log::default();
        let (mut aligner, a, b) = two_stream_aligner(&log);

        for (ts, value) in [(1, 10), (2, 11), (3, 12), (4, 13), (5, 14)] {
            aligner.push(a, micros(ts), value).unwrap();
        }

        assert_eq!(drain(&mut aligner), 5);
        assert_eq!(
            *log.borrow(),
            vec![
                ("a", 1, 10),
                ("a", 2, 11),
                ("a", 3, 12),
                ("a", 4, 13),
                ("a", 5, 14)
            ]
        );
        // The silent stream exceeded its window and was skipped over.
        assert!(aligner.is_overdue(b).unwrap());
        assert!(!aligner.is_overdue(a).unwrap());
    }

    #[test]
    fn test_waits_for_expected_stream_within_window() {
        let log = Log::default();
        let (mut aligner, a, b) = two_stream_aligner(&log);

        aligner.push(a, micros(1), 10).unwrap();
        assert!(aligner.step());

        // a is now expected at 2, earlier than b's buffered sample at
        // 3, and its window has not run out: emission holds.
        aligner.push(b, micros(3), 20).unwrap();
        assert!(!aligner.step());
        assert_eq!(aligner.buffer_status(b).unwrap().fill, 1);
        assert!(!aligner.is_overdue(a).unwrap());

        // a catches up with newer data and the pipeline resumes.
        aligner.push(a, micros(4), 11).unwrap();
        assert_eq!(drain(&mut aligner), 2);
        assert_eq!(
            *log.borrow(),
            vec![("a", 1, 10), ("b", 3, 20), ("a", 4, 11)]
        );
    }

    #[test]
    fn test_earlier_registered_expectation_holds_tied_data() {
        let log = Log::default();
        let (mut aligner, a, b) = two_stream_aligner(&log);

        aligner.push(a, micros(5), 10).unwrap();
        assert!(aligner.step());

        // a is expected at 6; b has real data at the same timestamp.
        // The earlier-registered stream wins the tie, so the step holds
        // b's sample while a's window lasts.
        aligner.push(b, micros(6), 20).unwrap();
        assert!(!aligner.step());
        assert_eq!(aligner.buffer_status(b).unwrap().fill, 1);
        assert_eq!(*log.borrow(), vec![("a", 5, 10)]);
        assert!(!aligner.is_overdue(a).unwrap());

        // Once a's expected sample shows up, a drains ahead of b at the
        // shared timestamp.
        aligner.push(a, micros(6), 11).unwrap();
        assert_eq!(drain(&mut aligner), 2);
        assert_eq!(
            *log.borrow(),
            vec![("a", 5, 10), ("a", 6, 11), ("b", 6, 20)]
        );
    }

    #[test]
    fn test_stale_push_dropped_at_ingress() {
        let log = Log::default();
        let (mut aligner, a, b) = two_stream_aligner(&log);

        aligner.push(a, micros(10), 1).unwrap();
        // 7 + timeout(2) < 10: irrecoverably stale.
        aligner.push(b, micros(7), 2).unwrap();

        drain(&mut aligner);
        let emitted: Vec<&str> = log.borrow().iter().map(|(tag, _, _)| *tag).collect();
        assert!(!emitted.contains(&"b"));
        assert_eq!(aligner.stats().stale_dropped, 1);
        assert_eq!(aligner.buffer_status(b).unwrap().fill, 0);
    }

    #[test]
    fn test_drop_oldest_on_overflow() {
        let log = Log::default();
        let mut aligner = StreamAligner::new(AlignerConfig::default().with_timeout(micros(2)));
        let a = aligner.register_stream(
            recorder(&log, "a"),
            StreamConfig::default().with_buffer_capacity(2),
        );

        aligner.push(a, micros(1), 1).unwrap();
        aligner.push(a, micros(2), 2).unwrap();
        aligner.push(a, micros(3), 3).unwrap();

        assert_eq!(drain(&mut aligner), 2);
        assert_eq!(*log.borrow(), vec![("a", 2, 2), ("a", 3, 3)]);
        assert_eq!(aligner.stream_stats(a).unwrap().evicted, 1);
    }

    #[test]
    fn test_non_monotonic_push_ignored() {
        let log = Log::default();
        let mut aligner = StreamAligner::new(AlignerConfig::default().with_timeout(micros(10)));
        let a = aligner.register_stream(recorder(&log, "a"), StreamConfig::default());

        aligner.push(a, micros(5), 1).unwrap();
        aligner.push(a, micros(3), 2).unwrap();

        drain(&mut aligner);
        assert_eq!(*log.borrow(), vec![("a", 5, 1)]);
        assert_eq!(aligner.stream_stats(a).unwrap().non_monotonic_dropped, 1);
    }

    // ==================== Step Algorithm Details ====================

    #[test]
    fn test_step_on_empty_aligner() {
        let mut aligner = StreamAligner::default();
        assert!(!aligner.step());
    }

    #[test]
    fn test_idle_periodic_stream_alone_never_emits() {
        let log = Log::default();
        let mut aligner = StreamAligner::new(AlignerConfig::default().with_timeout(micros(2)));
        let _a = aligner.register_stream(
            recorder(&log, "a"),
            StreamConfig::default().with_period(micros(1)),
        );

        // Expected but no data anywhere: idle, not an emission.
        assert!(!aligner.step());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_idle_aperiodic_stream_is_not_a_candidate() {
        let log = Log::default();
        let mut aligner = StreamAligner::new(AlignerConfig::default().with_timeout(micros(2)));
        let a = aligner.register_stream(recorder(&log, "a"), StreamConfig::default());
        let b = aligner.register_stream(recorder(&log, "b"), StreamConfig::default());

        // b has never been pushed and is aperiodic: it is not expecting
        // anything and must not hold a back.
        aligner.push(a, micros(100), 1).unwrap();
        assert!(aligner.step());
        assert_eq!(*log.borrow(), vec![("a", 100, 1)]);
        assert!(!aligner.is_overdue(b).unwrap());
    }

    #[test]
    fn test_late_data_swept_without_callback() {
        let log = Log::default();
        let mut aligner = StreamAligner::new(AlignerConfig::default().with_timeout(micros(10)));
        let a = aligner.register_stream(recorder(&log, "a"), StreamConfig::default());
        let b = aligner.register_stream(recorder(&log, "b"), StreamConfig::default());

        aligner.push(a, micros(5), 1).unwrap();
        assert!(aligner.step());

        // Arrives behind the emission clock (3 < 5) but inside the stale
        // window, so ingress accepts it; the next step discards it
        // without a callback.
        aligner.push(b, micros(3), 2).unwrap();
        assert!(!aligner.step());

        assert_eq!(*log.borrow(), vec![("a", 5, 1)]);
        assert_eq!(aligner.stream_stats(b).unwrap().late_discarded, 1);
    }

    #[test]
    fn test_emission_at_current_timestamp_allowed() {
        let log = Log::default();
        let mut aligner = StreamAligner::new(AlignerConfig::default().with_timeout(micros(10)));
        let a = aligner.register_stream(recorder(&log, "a"), StreamConfig::default());
        let b = aligner.register_stream(recorder(&log, "b"), StreamConfig::default());

        aligner.push(b, micros(5), 1).unwrap();
        assert!(aligner.step());

        // a's sample carries the timestamp emission already reached;
        // it is not late and still goes out.
        aligner.push(a, micros(5), 2).unwrap();
        assert!(aligner.step());

        assert_eq!(*log.borrow(), vec![("b", 5, 1), ("a", 5, 2)]);
    }

    #[test]
    fn test_equal_timestamps_keep_registration_order() {
        let log = Log::default();
        let (mut aligner, a, b) = two_stream_aligner(&log);

        aligner.push(b, micros(3), 20).unwrap();
        aligner.push(a, micros(3), 10).unwrap();

        drain(&mut aligner);
        assert_eq!(*log.borrow(), vec![("a", 3, 10), ("b", 3, 20)]);
    }

    #[test]
    fn test_overdue_clears_when_stream_recovers() {
        let log = Log::default();
        let (mut aligner, a, b) = two_stream_aligner(&log);

        for ts in 1..=5 {
            aligner.push(a, micros(ts), 0).unwrap();
        }
        drain(&mut aligner);
        assert!(aligner.is_overdue(b).unwrap());

        aligner.push(b, micros(6), 1).unwrap();
        aligner.push(a, micros(6), 2).unwrap();
        drain(&mut aligner);
        assert!(!aligner.is_overdue(b).unwrap());
    }

    // ==================== Push Errors ====================

    #[test]
    fn test_push_invalid_stream() {
        let mut aligner = StreamAligner::default();
        let err = aligner.push(StreamId::new(0), micros(1), 1u32).unwrap_err();
        assert!(matches!(
            err,
            Error::Align(AlignError::InvalidStream { id: 0, registered: 0 })
        ));
    }

    #[test]
    fn test_push_type_mismatch() {
        let mut aligner = StreamAligner::default();
        let a = aligner.register_stream(|_, _: u32| {}, StreamConfig::default());

        let err = aligner.push(a, micros(1), "wrong").unwrap_err();
        assert!(matches!(
            err,
            Error::Align(AlignError::TypeMismatch { id: 0, .. })
        ));
        // The registered stream is untouched.
        assert_eq!(aligner.buffer_status(a).unwrap().fill, 0);
    }

    #[test]
    fn test_heterogeneous_payloads() {
        let texts = Rc::new(RefCell::new(Vec::new()));
        let text_sink = Rc::clone(&texts);
        let numbers = Rc::new(RefCell::new(Vec::new()));
        let number_sink = Rc::clone(&numbers);

        let mut aligner = StreamAligner::new(AlignerConfig::default().with_timeout(micros(2)));
        let words = aligner.register_stream(
            move |_, value: String| text_sink.borrow_mut().push(value),
            StreamConfig::default(),
        );
        let counts = aligner.register_stream(
            move |_, value: u64| number_sink.borrow_mut().push(value),
            StreamConfig::default(),
        );

        aligner.push(counts, micros(3), 7u64).unwrap();
        aligner.push(words, micros(1), "hello".to_owned()).unwrap();
        while aligner.step() {}

        assert_eq!(*texts.borrow(), vec!["hello".to_owned()]);
        assert_eq!(*numbers.borrow(), vec![7]);
    }

    // ==================== Clocks & Observers ====================

    #[test]
    fn test_clocks_and_latency() {
        let log = Log::default();
        let (mut aligner, a, _b) = two_stream_aligner(&log);

        assert_eq!(aligner.latency(), Time::ZERO);

        aligner.push(a, micros(10), 1).unwrap();
        assert_eq!(aligner.latest_time(), micros(10));
        assert_eq!(aligner.current_time(), Time::ZERO);
        assert_eq!(aligner.latency(), micros(10));

        aligner.step();
        assert_eq!(aligner.current_time(), micros(10));
        assert_eq!(aligner.latency(), Time::ZERO);
    }

    #[test]
    fn test_latest_time_advances_even_for_non_monotonic_drop() {
        let log = Log::default();
        let mut aligner = StreamAligner::new(AlignerConfig::default().with_timeout(micros(100)));
        let a = aligner.register_stream(recorder(&log, "a"), StreamConfig::default());
        let b = aligner.register_stream(recorder(&log, "b"), StreamConfig::default());

        aligner.push(a, micros(50), 1).unwrap();
        aligner.push(a, micros(40), 2).unwrap();
        // The second push was dropped by the stream, but its timestamp
        // passed the ingress filter and did not regress the clock.
        assert_eq!(aligner.latest_time(), micros(50));

        aligner.push(b, micros(60), 3).unwrap();
        assert_eq!(aligner.latest_time(), micros(60));
    }

    #[test]
    fn test_set_timeout_takes_effect() {
        let log = Log::default();
        let (mut aligner, a, b) = two_stream_aligner(&log);

        aligner.push(a, micros(1), 10).unwrap();
        aligner.push(a, micros(2), 11).unwrap();
        assert!(aligner.step());

        // Widen the window: b's expectation at 1 is no longer overdue,
        // so emission holds.
        aligner.set_timeout(micros(100));
        assert!(!aligner.step());
        assert_eq!(aligner.timeout(), micros(100));

        // Narrow it back: b is skipped and a drains.
        aligner.set_timeout(micros(1));
        assert!(aligner.step());
        assert!(aligner.is_overdue(b).unwrap());
    }

    #[test]
    fn test_stats_accounting() {
        let log = Log::default();
        let (mut aligner, a, b) = two_stream_aligner(&log);

        aligner.push(a, micros(10), 1).unwrap();
        aligner.push(b, micros(7), 2).unwrap(); // stale
        aligner.push(b, micros(11), 3).unwrap();
        aligner.push(a, micros(14), 4).unwrap();
        drain(&mut aligner);

        let stats = aligner.stats();
        assert_eq!(stats.samples_in, 4);
        assert_eq!(stats.stale_dropped, 1);
        assert_eq!(stats.samples_out, 3);

        let b_stats = aligner.stream_stats(b).unwrap();
        assert_eq!(b_stats.samples_accepted, 1);
        assert_eq!(b_stats.samples_emitted, 1);
    }

    #[test]
    fn test_display_status() {
        let log = Log::default();
        let (mut aligner, a, _b) = two_stream_aligner(&log);
        aligner.push(a, micros(1_000_000), 1).unwrap();

        let rendered = aligner.to_string();
        assert!(rendered.starts_with("current time: 0.000000s latest time: 1.000000s"));
        assert!(rendered.contains("0: 1/10"));
        assert!(rendered.contains("1: 0/10"));
    }

    // ==================== Ordering Invariant ====================

    #[test]
    fn test_emissions_globally_non_decreasing() {
        let log = Log::default();
        let mut aligner = StreamAligner::new(AlignerConfig::default().with_timeout(micros(3)));
        let a = aligner.register_stream(
            recorder(&log, "a"),
            StreamConfig::default().with_period(micros(2)),
        );
        let b = aligner.register_stream(
            recorder(&log, "b"),
            StreamConfig::default().with_period(micros(5)),
        );
        let c = aligner.register_stream(recorder(&log, "c"), StreamConfig::default());

        let pushes: &[(StreamId, i64)] = &[
            (a, 2),
            (b, 5),
            (a, 4),
            (c, 1),
            (a, 6),
            (b, 10),
            (c, 3),
            (a, 8),
            (c, 12),
            (a, 10),
        ];
        for &(id, ts) in pushes {
            aligner.push(id, micros(ts), 0).unwrap();
            while aligner.step() {}
        }

        let timestamps: Vec<i64> = log.borrow().iter().map(|(_, ts, _)| *ts).collect();
        assert!(!timestamps.is_empty());
        assert!(timestamps.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
