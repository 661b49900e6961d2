//! Strategy B: every access serialized through one mutex.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::contract::{constructed, construction_failed, lock_slot};
use crate::{ConstructionError, Constructor, SingletonContract, SingletonError, Strategy};

/// Lazy slot guarded by a single [`Mutex`].
///
/// The check, the construction and the return all happen while the lock is held,
/// which makes at-most-once construction unconditional. The price is that every
/// call is serialized, including the steady state where the instance already
/// exists. [`with_instance`](SingletonContract::with_instance) also runs under the
/// lock, so payload mutations through the slot are serialized as well.
///
/// # Examples
///
/// ```rust
/// use singleton_strategies::{SharedState, SharedStateOps, SynchronizedSingleton};
///
/// static STATE: SynchronizedSingleton<SharedState> = SynchronizedSingleton::new(SharedState::new);
///
/// std::thread::scope(|scope| {
///     for _ in 0..4 {
///         scope.spawn(|| STATE.increment_counter().unwrap());
///     }
/// });
///
/// assert_eq!(STATE.counter().unwrap(), 4);
/// ```
pub struct SynchronizedSingleton<T> {
    slot: Mutex<Option<Arc<T>>>,
    init: Constructor<T>,
}

impl<T> SynchronizedSingleton<T> {
    pub const fn new(init: fn() -> T) -> Self {
        Self::with_constructor(Constructor::Infallible(init))
    }

    pub const fn fallible(init: fn() -> Result<T, ConstructionError>) -> Self {
        Self::with_constructor(Constructor::Fallible(init))
    }

    const fn with_constructor(init: Constructor<T>) -> Self {
        Self {
            slot: Mutex::new(None),
            init,
        }
    }

    /// Empties the slot, returning the instance it held.
    pub fn take(&mut self) -> Option<Arc<T>> {
        // Exclusive access: a poisoned lock cannot hide a partially written slot.
        self.slot
            .get_mut()
            .unwrap_or_else(|p| p.into_inner())
            .take()
    }

    /// Acquires the slot lock.
    ///
    /// Recovering a poisoned lock is safe: the slot is only written after a
    /// constructor returns successfully.
    fn lock_slot(&self) -> Result<MutexGuard<'_, Option<Arc<T>>>, SingletonError> {
        lock_slot(&self.slot, Self::STRATEGY)
    }

    /// Returns the instance held by `slot`, constructing it if the slot is empty.
    fn get_or_construct(&self, slot: &mut Option<Arc<T>>) -> Result<Arc<T>, SingletonError> {
        if let Some(instance) = slot.as_ref() {
            return Ok(Arc::clone(instance));
        }

        let instance = self
            .init
            .construct()
            .map(Arc::new)
            .map_err(|err| construction_failed::<T>(Self::STRATEGY, err))?;
        constructed::<T>(Self::STRATEGY);

        *slot = Some(Arc::clone(&instance));
        Ok(instance)
    }
}

impl<T> SingletonContract for SynchronizedSingleton<T> {
    type Payload = T;

    const STRATEGY: Strategy = Strategy::Synchronized;

    fn get_instance(&self) -> Result<Arc<T>, SingletonError> {
        let mut slot = self.lock_slot()?;
        self.get_or_construct(&mut slot)
    }

    fn is_initialized(&self) -> bool {
        // Read-only: leave a poisoned lock for the next `get_instance` to report.
        self.slot
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_some()
    }

    fn with_instance<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, SingletonError> {
        let mut slot = self.lock_slot()?;
        let instance = self.get_or_construct(&mut slot)?;
        Ok(f(&instance))
    }
}
