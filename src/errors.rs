use std::fmt;

/// Error indicating that the caller's cancellation signal fired before
/// the limiter could hand out a token.
///
/// No token is consumed when this is returned. Retrying is up to the
/// caller; limiters never retry on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canceled;

impl fmt::Display for Canceled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "canceled before a token became available")
    }
}

impl std::error::Error for Canceled {}

/// Error indicating that a [`Quota`](crate::Quota) was requested with
/// parameters that can never admit anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidConfiguration {
    /// The reservoir would hold no tokens at all.
    ZeroCapacity,

    /// Tokens would be restored in zero time, i.e. the limiter would
    /// not limit anything.
    ZeroRefillPeriod,
}

impl fmt::Display for InvalidConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidConfiguration::ZeroCapacity => {
                write!(f, "reservoir capacity must be at least one token")
            }
            InvalidConfiguration::ZeroRefillPeriod => {
                write!(f, "refill period must be longer than zero")
            }
        }
    }
}

impl std::error::Error for InvalidConfiguration {}
