//! The payload guarded by the singleton slots.
//!
//! [`SharedState`] carries a mutable label, a monotonically increasing counter and an
//! immutable creation timestamp. It is safe to use from any number of threads: the
//! label is replaced as a whole under a write lock and the counter only ever moves
//! through atomic increments.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossbeam_utils::CachePadded;

const DEFAULT_LABEL: &str = "shared state";

/// Mutable payload shared through a singleton handle.
///
/// # Examples
///
/// ```rust
/// use singleton_strategies::SharedState;
///
/// let state = SharedState::with_label("config");
/// state.increment_counter();
/// state.set_label("reloaded");
///
/// assert_eq!(state.counter(), 1);
/// assert_eq!(state.label(), "reloaded");
/// ```
#[derive(Debug)]
pub struct SharedState {
    label: RwLock<String>,
    counter: CachePadded<AtomicU64>,
    created_at: SystemTime,
    created: Instant,
}

impl SharedState {
    pub fn new() -> Self {
        Self::with_label(DEFAULT_LABEL)
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: RwLock::new(label.into()),
            counter: CachePadded::new(AtomicU64::new(0)),
            created_at: SystemTime::now(),
            created: Instant::now(),
        }
    }

    /// Replaces the label.
    ///
    /// The new string is built before the write lock is taken, so readers observe
    /// either the previous label or this one, never a mixture.
    pub fn set_label(&self, label: impl Into<String>) {
        let label = label.into();
        // Assignment cannot leave a half-written String, so a poisoned lock is safe to reuse.
        *self.label.write().unwrap_or_else(PoisonError::into_inner) = label;
    }

    pub fn label(&self) -> String {
        self.label
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Adds one to the counter and returns the new value.
    pub fn increment_counter(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn counter(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    /// Wall-clock time at which the constructor ran.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Time elapsed since the constructor ran.
    pub fn age(&self) -> Duration {
        self.created.elapsed()
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SharedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let created_ms = self
            .created_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        write!(
            f,
            "label: {}, counter: {}, created_at: {}ms",
            self.label(),
            self.counter(),
            created_ms
        )
    }
}
