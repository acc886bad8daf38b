use std::num::NonZeroU32;
use std::time::Duration;

use crate::errors::InvalidConfiguration;

/// A reservoir's configuration.
///
/// Quotas are expressed as a positive number of tokens (the capacity of the reservoir: the
/// largest burst of callers that can be admitted without waiting) and the amount of time it
/// takes the reservoir to restore a single token after it was dispensed.
///
/// Neither the capacity nor the refill period may be zero.
///
/// # Burst sizes
/// There are multiple ways of expressing the same steady-state rate: a quota given as
/// `Quota::per_second(1)` admits, on average, as many callers as `Quota::per_minute(60)`.
/// However, `Quota::per_minute(60)` has a capacity of 60 tokens, meaning 60 callers can be let
/// through at once after the reservoir has been idle for a minute.
///
/// # Examples
///
/// A reservoir holding 4 tokens that restores one token per second:
/// ```rust
/// # use reservoir::Quota;
/// # use std::time::Duration;
/// let q = Quota::new(4, Duration::from_secs(1)).unwrap();
/// assert_eq!(q.capacity().get(), 4);
/// assert_eq!(q.refill_period(), Duration::from_secs(1));
/// assert_eq!(q.refilled_in(), Duration::from_secs(4));
/// ```
///
/// 50 tokens per second (restoring one token every 20 milliseconds), with a capacity of 50:
/// ```rust
/// # use reservoir::Quota;
/// # use nonzero_ext::nonzero;
/// # use std::time::Duration;
/// let q = Quota::per_second(nonzero!(50u32));
/// assert_eq!(q.refill_period(), Duration::from_millis(20));
/// assert_eq!(q.capacity().get(), 50);
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Quota {
    pub(crate) capacity: NonZeroU32,
    pub(crate) refill_period: Duration,
}

/// Constructors for Quotas
impl Quota {
    /// Construct a quota from raw values, validating both.
    ///
    /// Returns [`InvalidConfiguration::ZeroCapacity`] for a capacity of zero (this is checked
    /// first) and [`InvalidConfiguration::ZeroRefillPeriod`] for a zero-length refill period.
    pub fn new(capacity: u32, refill_period: Duration) -> Result<Quota, InvalidConfiguration> {
        let capacity = NonZeroU32::new(capacity).ok_or(InvalidConfiguration::ZeroCapacity)?;
        Quota::with_period(refill_period).map(|q| q.allow_burst(capacity))
    }

    /// Construct a quota that restores one token every `refill_period`, with a capacity of
    /// one token.
    ///
    /// Use [`allow_burst`](#method.allow_burst) to raise the capacity.
    pub fn with_period(refill_period: Duration) -> Result<Quota, InvalidConfiguration> {
        if refill_period.is_zero() {
            return Err(InvalidConfiguration::ZeroRefillPeriod);
        }
        Ok(Quota {
            capacity: nonzero_ext::nonzero!(1u32),
            refill_period,
        })
    }

    /// Construct a quota for a number of tokens per second. The given number of tokens is also
    /// the capacity.
    pub const fn per_second(capacity: NonZeroU32) -> Quota {
        Quota::spread_over(capacity, Duration::from_secs(1))
    }

    /// Construct a quota for a number of tokens per 60-second period. The given number of tokens
    /// is also the capacity.
    pub const fn per_minute(capacity: NonZeroU32) -> Quota {
        Quota::spread_over(capacity, Duration::from_secs(60))
    }

    /// Construct a quota for a number of tokens per 60-minute (3600-second) period. The given
    /// number of tokens is also the capacity.
    pub const fn per_hour(capacity: NonZeroU32) -> Quota {
        Quota::spread_over(capacity, Duration::from_secs(60 * 60))
    }

    /// Adjusts the capacity of a quota, keeping its refill period.
    pub const fn allow_burst(self, capacity: NonZeroU32) -> Quota {
        Quota { capacity, ..self }
    }

    /// Restores `capacity` tokens per `unit`. The refill period is never shorter than one
    /// nanosecond, so more than a billion tokens per second are refilled at that pace.
    const fn spread_over(capacity: NonZeroU32, unit: Duration) -> Quota {
        let mut refill_period_ns = unit.as_nanos() / (capacity.get() as u128);
        if refill_period_ns == 0 {
            refill_period_ns = 1;
        }
        Quota {
            capacity,
            refill_period: Duration::from_nanos(refill_period_ns as u64),
        }
    }
}

/// Retrieving information about a quota
impl Quota {
    /// The maximum number of tokens the reservoir holds.
    pub const fn capacity(&self) -> NonZeroU32 {
        self.capacity
    }

    /// The time it takes to restore a single dispensed token.
    pub const fn refill_period(&self) -> Duration {
        self.refill_period
    }

    /// The time it takes an empty reservoir to fill back up to capacity.
    ///
    /// Saturates at [`Duration::MAX`].
    pub const fn refilled_in(&self) -> Duration {
        self.refill_period.saturating_mul(self.capacity.get())
    }
}
