//! Time abstraction traits for platform-agnostic timing.
//!
//! The engine never reads a clock on its own. Everything that depends on time
//! asks a [`TimeSource`] for the current instant, which keeps the animator,
//! particles and triggers deterministic under test.

use std::sync::Arc;

/// Trait for abstracting time sources.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

impl<I: TimeInstant, T: TimeSource<I> + ?Sized> TimeSource<I> for &T {
    fn now(&self) -> I {
        (**self).now()
    }
}

impl<I: TimeInstant, T: TimeSource<I> + ?Sized> TimeSource<I> for Arc<T> {
    fn now(&self) -> I {
        (**self).now()
    }
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq + PartialOrd + core::fmt::Debug {
    /// Zero duration constant.
    const ZERO: Self;

    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;

    /// Creates duration from milliseconds.
    fn from_millis(millis: u64) -> Self;

    /// Saturating subtraction (returns ZERO on underflow).
    fn saturating_sub(self, other: Self) -> Self;

    /// Saturating addition.
    fn saturating_add(self, other: Self) -> Self {
        Self::from_millis(self.as_millis().saturating_add(other.as_millis()))
    }

    /// Duration in (fractional) seconds.
    fn as_secs_f32(&self) -> f32 {
        self.as_millis() as f32 / 1000.0
    }
}

/// Trait abstraction for instant types.
///
/// Instants are totally ordered so the scheduler can ask whether a deadline
/// has been reached.
pub trait TimeInstant: Copy + PartialEq + PartialOrd + core::fmt::Debug {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant, ZERO if `earlier` is later.
    fn duration_since(&self, earlier: Self) -> Self::Duration;

    /// Adds duration to instant, returns None on overflow.
    fn checked_add(self, duration: Self::Duration) -> Option<Self>;

    /// Subtracts duration from instant, returns None on underflow.
    fn checked_sub(self, duration: Self::Duration) -> Option<Self>;

    /// Adds duration, holding the instant on overflow.
    fn add_or_hold(self, duration: Self::Duration) -> Self {
        self.checked_add(duration).unwrap_or(self)
    }
}

impl TimeDuration for std::time::Duration {
    const ZERO: Self = std::time::Duration::ZERO;

    fn as_millis(&self) -> u64 {
        u64::try_from(std::time::Duration::as_millis(self)).unwrap_or(u64::MAX)
    }

    fn from_millis(millis: u64) -> Self {
        std::time::Duration::from_millis(millis)
    }

    fn saturating_sub(self, other: Self) -> Self {
        std::time::Duration::saturating_sub(self, other)
    }
}

impl TimeInstant for std::time::Instant {
    type Duration = std::time::Duration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        self.saturating_duration_since(earlier)
    }

    fn checked_add(self, duration: Self::Duration) -> Option<Self> {
        std::time::Instant::checked_add(&self, duration)
    }

    fn checked_sub(self, duration: Self::Duration) -> Option<Self> {
        std::time::Instant::checked_sub(&self, duration)
    }
}

/// Monotonic wall clock backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StdClock;

impl TimeSource<std::time::Instant> for StdClock {
    fn now(&self) -> std::time::Instant {
        std::time::Instant::now()
    }
}
