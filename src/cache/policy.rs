//! Expiration Policy Module

use std::fmt;
use std::time::Duration;

// == Expiration Policy ==
/// How expired rows get physically removed. Fixed for an engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationPolicy {
    /// A background task sweeps every `interval`
    Background { interval: Duration },
    /// Every `get` sweeps synchronously before its lookup
    Lazy,
    /// The engine never touches storage
    Disabled,
}

impl ExpirationPolicy {
    /// True when `get` must sweep before looking up.
    pub fn sweeps_on_get(&self) -> bool {
        matches!(self, Self::Lazy)
    }

    /// The background sweep interval, if a timer is used.
    pub fn sweep_interval(&self) -> Option<Duration> {
        match self {
            Self::Background { interval } => Some(*interval),
            _ => None,
        }
    }
}

impl fmt::Display for ExpirationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background { interval } => {
                write!(f, "background sweep every {}s", interval.as_secs())
            }
            Self::Lazy => write!(f, "expire on get"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}
