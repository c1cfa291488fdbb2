//! # Time Module
//!
//! The timestamp type that orders every sample flowing through the
//! aligner.
//!
//! [`Time`] is a microsecond count in an `i64`, kept opaque so call sites
//! deal in one vocabulary: total order, additive arithmetic, and a null
//! predicate. The zero value doubles as "null": a stream whose last
//! activity is [`Time::ZERO`] has never seen a sample, and the aligner
//! treats a null expected-arrival time as "not expecting anything".
//!
//! ```rust
//! use braid_core::Time;
//!
//! let period = Time::from_millis(10);
//! let last = Time::from_micros(25_000);
//!
//! assert_eq!(last + period, Time::from_micros(35_000));
//! assert!(Time::ZERO.is_null());
//! assert!(!(Time::ZERO + period).is_null());
//! ```

use std::fmt;
use std::ops::{Add, Sub};

/// A point in time, in microseconds.
///
/// `Time` is totally ordered and supports additive arithmetic; addition
/// and subtraction saturate instead of wrapping. The default value is
/// [`Time::ZERO`], the only value for which [`Time::is_null`] holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(i64);

impl Time {
    /// The zero (null) timestamp. `ZERO + t == t` for any `t`.
    pub const ZERO: Self = Self(0);

    /// Creates a timestamp from a microsecond count.
    #[inline]
    #[must_use]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Creates a timestamp from a millisecond count.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000))
    }

    /// Creates a timestamp from a second count.
    #[inline]
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(1_000_000))
    }

    /// Returns the microsecond count.
    #[inline]
    #[must_use]
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Returns true for the zero value.
    ///
    /// Null marks the absence of a timestamp: a stream that has never
    /// accepted a sample reports its last activity as null.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Returns the earlier of two timestamps.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    /// Returns the later of two timestamps.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }
}

impl Add for Time {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Time {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl From<i64> for Time {
    fn from(micros: i64) -> Self {
        Self(micros)
    }
}

impl From<Time> for i64 {
    fn from(time: Time) -> Self {
        time.0
    }
}

impl fmt::Display for Time {
    /// Formats as seconds with microsecond precision, e.g. `1.250000s`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:06}s", abs / 1_000_000, abs % 1_000_000)
    }
}
