//! The contract shared by every initialization strategy.
//!
//! All five strategies implement [`SingletonContract`] and differ only in how they
//! synchronize the first construction. Code written against the trait can swap one
//! strategy for another without changes.

use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use crate::{ConstructionError, SharedState, SingletonError, Strategy};

/// Exactly-once construction of a shared instance.
///
/// # Guarantees
///
/// For every thread-safe strategy ([`Strategy::is_thread_safe`]):
///
/// - the constructor runs at most once per slot, however many threads race on the
///   first call;
/// - every handle returned by [`get_instance`](Self::get_instance) points to the same
///   allocation (compare with [`Arc::ptr_eq`]);
/// - construction happens-before the return of every handle, so no caller ever
///   observes a partially built instance.
pub trait SingletonContract {
    /// The type held by the slot.
    type Payload;

    /// The strategy implemented by this slot.
    const STRATEGY: Strategy;

    /// Returns the shared instance, constructing it on the first call.
    ///
    /// # Errors
    ///
    /// - [`SingletonError::Construction`] if the constructor failed. Nothing is
    ///   published.
    /// - [`SingletonError::Interrupted`] if this caller was blocked on a lock whose
    ///   previous holder panicked.
    fn get_instance(&self) -> Result<Arc<Self::Payload>, SingletonError>;

    /// Whether the slot already holds its instance. Never triggers construction.
    fn is_initialized(&self) -> bool;

    /// Runs `f` against the shared instance, constructing it first if needed.
    ///
    /// Strategies that serialize every access run `f` while holding their lock.
    /// The closure must not call back into the same slot.
    fn with_instance<R>(&self, f: impl FnOnce(&Self::Payload) -> R) -> Result<R, SingletonError>
    where
        Self: Sized,
    {
        let instance = self.get_instance()?;
        Ok(f(&instance))
    }
}

/// Slot-level access to a [`SharedState`] payload.
///
/// Blanket-implemented for every slot holding a [`SharedState`], so the payload
/// operations are available directly on the slot:
///
/// ```rust
/// use singleton_strategies::{HolderSingleton, SharedState, SharedStateOps};
///
/// static STATE: HolderSingleton<SharedState> = HolderSingleton::new(SharedState::new);
///
/// STATE.set_label("ready").unwrap();
/// STATE.increment_counter().unwrap();
///
/// assert_eq!(STATE.label().unwrap(), "ready");
/// assert_eq!(STATE.counter().unwrap(), 1);
/// ```
pub trait SharedStateOps: SingletonContract<Payload = SharedState> + Sized {
    /// Replaces the label of the shared instance.
    fn set_label(&self, label: impl Into<String>) -> Result<(), SingletonError> {
        self.with_instance(|state| state.set_label(label))
    }

    /// Returns a copy of the current label.
    fn label(&self) -> Result<String, SingletonError> {
        self.with_instance(SharedState::label)
    }

    /// Adds one to the counter and returns the new value.
    fn increment_counter(&self) -> Result<u64, SingletonError> {
        self.with_instance(SharedState::increment_counter)
    }

    /// Returns the current counter value.
    fn counter(&self) -> Result<u64, SingletonError> {
        self.with_instance(SharedState::counter)
    }
}

impl<S> SharedStateOps for S where S: SingletonContract<Payload = SharedState> {}

/// Wraps a constructor failure with the slot that observed it.
pub(crate) fn construction_failed<T>(strategy: Strategy, source: ConstructionError) -> SingletonError {
    let type_name = std::any::type_name::<T>();
    log::warn!("{strategy} slot failed to construct {type_name}: {source}");
    SingletonError::Construction {
        strategy,
        type_name,
        source,
    }
}

/// Logs a completed construction.
pub(crate) fn constructed<T>(strategy: Strategy) {
    log::debug!(
        "{strategy} slot constructed {} on {:?}",
        std::any::type_name::<T>(),
        std::thread::current().id()
    );
}

/// Acquires a slot lock, recovering it if a previous holder panicked.
///
/// A caller that was blocked behind the panicking holder receives
/// [`SingletonError::Interrupted`]. A caller that arrives after the panic finds the
/// lock poisoned but free, recovers the guard and carries on with the usual
/// re-check and construct. Either way the poison is cleared while the guard is
/// still held, so exactly one caller observes it.
pub(crate) fn lock_slot<T>(
    lock: &Mutex<T>,
    strategy: Strategy,
) -> Result<MutexGuard<'_, T>, SingletonError> {
    let (result, waited) = match lock.try_lock() {
        Ok(guard) => return Ok(guard),
        Err(TryLockError::Poisoned(poisoned)) => (Err(poisoned), false),
        Err(TryLockError::WouldBlock) => (lock.lock(), true),
    };

    match result {
        Ok(guard) => Ok(guard),
        Err(poisoned) => {
            let guard = poisoned.into_inner();
            lock.clear_poison();
            if waited {
                drop(guard);
                log::warn!("{strategy} slot holder panicked while this caller was waiting");
                Err(SingletonError::Interrupted { strategy })
            } else {
                log::warn!("{strategy} slot lock was poisoned by a panicking holder; recovered");
                Ok(guard)
            }
        }
    }
}
