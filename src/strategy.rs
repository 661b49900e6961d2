//! Names and trade-offs of the five initialization strategies.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Identifies one of the initialization strategies shipped by this crate.
///
/// Every [`SingletonContract`](crate::SingletonContract) implementor exposes its
/// strategy through the `STRATEGY` associated constant. The string form is used in
/// error messages, log records and trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Check-then-construct without any synchronization. Single-threaded only.
    Unsynchronized,
    /// Every access serialized through one mutex.
    Synchronized,
    /// Lock-free fast path, lock only during the construction window.
    DoubleChecked,
    /// Constructed at load, before the slot is shared.
    Eager,
    /// Deferred to first access through a one-time initialization cell.
    Holder,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Unsynchronized,
        Strategy::Synchronized,
        Strategy::DoubleChecked,
        Strategy::Eager,
        Strategy::Holder,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Strategy::Unsynchronized => "unsynchronized",
            Strategy::Synchronized => "synchronized",
            Strategy::DoubleChecked => "double-checked",
            Strategy::Eager => "eager",
            Strategy::Holder => "holder",
        }
    }

    /// Whether construction waits for the first `get_instance` call.
    pub const fn is_lazy(self) -> bool {
        !matches!(self, Strategy::Eager)
    }

    /// Whether concurrent first access is guaranteed to construct at most once.
    pub const fn is_thread_safe(self) -> bool {
        !matches!(self, Strategy::Unsynchronized)
    }

    /// Whether `get_instance` avoids taking a lock once the instance exists.
    pub const fn is_lock_free_when_initialized(self) -> bool {
        matches!(
            self,
            Strategy::DoubleChecked | Strategy::Eager | Strategy::Holder
        )
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known [`Strategy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown singleton strategy: {0:?}")]
pub struct ParseStrategyError(String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| ParseStrategyError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse_all() {
        for strategy in Strategy::ALL {
            let parsed: Strategy = strategy.to_string().parse().unwrap();
            assert_eq!(parsed, strategy);
        }
    }

    #[test]
    fn test_parse_is_lenient_about_case_and_separators() {
        assert_eq!(
            "Double_Checked".parse::<Strategy>(),
            Ok(Strategy::DoubleChecked)
        );
        assert_eq!(" HOLDER ".parse::<Strategy>(), Ok(Strategy::Holder));
    }

    #[test]
    fn test_parse_unknown() {
        let err = "enum".parse::<Strategy>().unwrap_err();
        assert_eq!(err.to_string(), "unknown singleton strategy: \"enum\"");
    }

    #[test]
    fn test_tradeoffs() {
        assert!(!Strategy::Eager.is_lazy());
        assert!(Strategy::Holder.is_lazy());
        assert!(!Strategy::Unsynchronized.is_thread_safe());
        assert!(Strategy::Synchronized.is_thread_safe());
        assert!(!Strategy::Synchronized.is_lock_free_when_initialized());
        assert!(Strategy::DoubleChecked.is_lock_free_when_initialized());
    }
}
