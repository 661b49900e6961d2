//! Strategy C: double-checked initialization.
//!
//! The slot is an [`AtomicPtr`] holding the raw form of an `Arc<T>`. Readers load it
//! with `Acquire`; the single writer publishes it with `Release` after the instance is
//! fully built. That pairing is what makes the unsynchronized fast path sound: a
//! reader that sees a non-null pointer also sees every write the constructor made.
//! A plain (relaxed) store would let a reader observe the pointer before the fields.

use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::{Arc, Mutex};

use crate::contract::{constructed, construction_failed, lock_slot};
use crate::{ConstructionError, Constructor, SingletonContract, SingletonError, Strategy};

/// Lazy slot with a lock-free fast path and a lock around the construction window.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use singleton_strategies::{DoubleCheckedSingleton, SharedState, SingletonContract};
///
/// static STATE: DoubleCheckedSingleton<SharedState> = DoubleCheckedSingleton::new(SharedState::new);
///
/// let handles: Vec<Arc<SharedState>> = std::thread::scope(|scope| {
///     let workers: Vec<_> = (0..4).map(|_| scope.spawn(|| STATE.get_instance().unwrap())).collect();
///     workers.into_iter().map(|w| w.join().unwrap()).collect()
/// });
///
/// assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
/// ```
pub struct DoubleCheckedSingleton<T> {
    /// Null until published; afterwards owns one strong count of the `Arc`.
    slot: AtomicPtr<T>,
    lock: Mutex<()>,
    init: Constructor<T>,
    _owns: PhantomData<Arc<T>>,
}

impl<T> DoubleCheckedSingleton<T> {
    pub const fn new(init: fn() -> T) -> Self {
        Self::with_constructor(Constructor::Infallible(init))
    }

    pub const fn fallible(init: fn() -> Result<T, ConstructionError>) -> Self {
        Self::with_constructor(Constructor::Fallible(init))
    }

    const fn with_constructor(init: Constructor<T>) -> Self {
        Self {
            slot: AtomicPtr::new(ptr::null_mut()),
            lock: Mutex::new(()),
            init,
            _owns: PhantomData,
        }
    }

    /// Empties the slot, returning the instance it held.
    pub fn take(&mut self) -> Option<Arc<T>> {
        let raw = std::mem::replace(self.slot.get_mut(), ptr::null_mut());
        if raw.is_null() {
            return None;
        }
        // SAFETY: a non-null slot holds a pointer from `Arc::into_raw` together with
        // the strong count it represents, which is handed over to the caller here.
        Some(unsafe { Arc::from_raw(raw) })
    }

    /// Clones a new handle out of a published pointer.
    ///
    /// # Safety
    ///
    /// `raw` must have been loaded from `self.slot` while non-null. The slot keeps its
    /// strong count until `take` or `drop`, both of which need `&mut self`, so the
    /// allocation outlives this call.
    unsafe fn share(raw: *mut T) -> Arc<T> {
        // SAFETY: guaranteed by the caller.
        unsafe {
            Arc::increment_strong_count(raw);
            Arc::from_raw(raw)
        }
    }

    #[cold]
    fn get_slow(&self) -> Result<Arc<T>, SingletonError> {
        // The lock guards no data, so a poisoned lock is always safe to recover.
        let _guard = lock_slot(&self.lock, Self::STRATEGY)?;

        // Second check: another thread may have published while we waited.
        let raw = self.slot.load(Ordering::Acquire);
        if !raw.is_null() {
            log::trace!("{} slot lost the construction race", Self::STRATEGY);
            // SAFETY: `raw` was loaded from the slot and is non-null.
            return Ok(unsafe { Self::share(raw) });
        }

        let instance = self
            .init
            .construct()
            .map(Arc::new)
            .map_err(|err| construction_failed::<T>(Self::STRATEGY, err))?;
        constructed::<T>(Self::STRATEGY);

        let raw = Arc::into_raw(Arc::clone(&instance)).cast_mut();
        self.slot.store(raw, Ordering::Release);
        Ok(instance)
    }
}

impl<T> SingletonContract for DoubleCheckedSingleton<T> {
    type Payload = T;

    const STRATEGY: Strategy = Strategy::DoubleChecked;

    #[inline]
    fn get_instance(&self) -> Result<Arc<T>, SingletonError> {
        let raw = self.slot.load(Ordering::Acquire);
        if !raw.is_null() {
            // SAFETY: `raw` was loaded from the slot and is non-null.
            return Ok(unsafe { Self::share(raw) });
        }
        self.get_slow()
    }

    fn is_initialized(&self) -> bool {
        !self.slot.load(Ordering::Acquire).is_null()
    }
}

impl<T> Drop for DoubleCheckedSingleton<T> {
    fn drop(&mut self) {
        drop(self.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SharedState, SharedStateOps};
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    static SLOW_BUILDS: AtomicUsize = AtomicUsize::new(0);
    static PANICS: AtomicUsize = AtomicUsize::new(0);
    static STALLED_PANICS: AtomicUsize = AtomicUsize::new(0);
    static CONSTRUCTING: AtomicBool = AtomicBool::new(false);

    fn slow_build() -> SharedState {
        SLOW_BUILDS.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        SharedState::with_label("built slowly")
    }

    fn panics_once() -> SharedState {
        if PANICS.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("constructor panics");
        }
        SharedState::with_label("recovered")
    }

    // First call stalls while holding the construction lock, then panics.
    fn stalls_then_panics_once() -> SharedState {
        if STALLED_PANICS.fetch_add(1, Ordering::SeqCst) == 0 {
            CONSTRUCTING.store(true, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(200));
            panic!("constructor panics while others wait");
        }
        SharedState::with_label("rebuilt")
    }

    fn refuse() -> Result<SharedState, ConstructionError> {
        Err(ConstructionError::new("refused"))
    }

    #[test]
    fn test_racing_first_access_builds_once() {
        let slot = DoubleCheckedSingleton::new(slow_build);
        let slot = &slot;
        let barrier = &Barrier::new(16);

        let handles: Vec<Arc<SharedState>> = thread::scope(|scope| {
            let workers: Vec<_> = (0..16)
                .map(|_| {
                    scope.spawn(move || {
                        barrier.wait();
                        slot.get_instance().unwrap()
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(SLOW_BUILDS.load(Ordering::SeqCst), 1);
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
        // Published fields are visible through every handle.
        assert!(handles.iter().all(|h| h.label() == "built slowly"));
    }

    #[test]
    fn test_slot_owns_one_strong_count() {
        let slot = DoubleCheckedSingleton::new(SharedState::new);
        let handle = slot.get_instance().unwrap();
        assert_eq!(Arc::strong_count(&handle), 2); // slot + handle

        let again = slot.get_instance().unwrap();
        assert_eq!(Arc::strong_count(&again), 3);

        drop(slot);
        assert_eq!(Arc::strong_count(&handle), 2); // handle + again
    }

    #[test]
    fn test_handles_outlive_the_slot() {
        let handle = {
            let slot = DoubleCheckedSingleton::new(SharedState::new);
            slot.increment_counter().unwrap();
            slot.get_instance().unwrap()
        };
        assert_eq!(handle.counter(), 1);
        assert_eq!(Arc::strong_count(&handle), 1);
    }

    #[test]
    fn test_failed_construction_publishes_nothing() {
        let slot = DoubleCheckedSingleton::fallible(refuse);
        assert!(slot.get_instance().is_err());
        assert!(!slot.is_initialized());
        assert!(slot.get_instance().is_err());
    }

    #[test]
    fn test_take_resets_slot() {
        let mut slot = DoubleCheckedSingleton::new(SharedState::new);
        assert!(slot.take().is_none());

        let first = slot.get_instance().unwrap();
        let taken = slot.take().unwrap();
        assert!(Arc::ptr_eq(&first, &taken));
        assert!(!slot.is_initialized());

        let second = slot.get_instance().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_panicking_constructor_retries_on_next_call() {
        let slot = DoubleCheckedSingleton::new(panics_once);

        let result = panic::catch_unwind(AssertUnwindSafe(|| slot.get_instance()));
        assert!(result.is_err());
        assert!(!slot.is_initialized());

        assert_eq!(slot.get_instance().unwrap().label(), "recovered");
    }

    #[test]
    fn test_only_one_waiter_behind_panicking_constructor_is_interrupted() {
        let slot = &DoubleCheckedSingleton::new(stalls_then_panics_once);

        let outcomes: Vec<Result<Arc<SharedState>, SingletonError>> = thread::scope(|scope| {
            scope.spawn(move || {
                let _ = panic::catch_unwind(AssertUnwindSafe(|| slot.get_instance()));
            });

            let waiters: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(move || {
                        while !CONSTRUCTING.load(Ordering::SeqCst) {
                            thread::yield_now();
                        }
                        slot.get_instance()
                    })
                })
                .collect();
            waiters.into_iter().map(|w| w.join().unwrap()).collect()
        });

        let interrupted = outcomes
            .iter()
            .filter(|outcome| {
                matches!(
                    outcome,
                    Err(SingletonError::Interrupted {
                        strategy: Strategy::DoubleChecked
                    })
                )
            })
            .count();
        assert_eq!(interrupted, 1);

        // Every other waiter retried and shares the rebuilt instance.
        let rebuilt = slot.get_instance().unwrap();
        assert_eq!(rebuilt.label(), "rebuilt");
        assert!(outcomes
            .iter()
            .flatten()
            .all(|handle| Arc::ptr_eq(handle, &rebuilt)));
        assert_eq!(STALLED_PANICS.load(Ordering::SeqCst), 2);
    }
}
