//! Strategy A: check-then-construct without synchronization.

use std::cell::RefCell;
use std::sync::Arc;

use crate::contract::{constructed, construction_failed};
use crate::{ConstructionError, Constructor, SingletonContract, SingletonError, Strategy};

/// Lazy slot with no synchronization at all.
///
/// This is the baseline the other strategies improve on. The slot lives in a
/// [`RefCell`], which makes the type `!Sync`: the compiler rejects every attempt to
/// share it between threads, so the single-threaded envelope of this strategy is a
/// type error rather than a race.
///
/// ```compile_fail
/// use singleton_strategies::{SharedState, UnsyncSingleton};
///
/// // A `static` must be `Sync`.
/// static STATE: UnsyncSingleton<SharedState> = UnsyncSingleton::new(SharedState::new);
/// ```
///
/// A process-wide slot is therefore declared with `thread_local!`, which yields one
/// instance per thread:
///
/// ```rust
/// use singleton_strategies::{SharedState, SingletonContract, UnsyncSingleton};
///
/// thread_local! {
///     static STATE: UnsyncSingleton<SharedState> = const { UnsyncSingleton::new(SharedState::new) };
/// }
///
/// let first = STATE.with(|slot| slot.get_instance()).unwrap();
/// let second = STATE.with(|slot| slot.get_instance()).unwrap();
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// ```
///
/// # Known hazard
///
/// The check and the construction are separate steps. A constructor that re-enters
/// the same slot sees it empty and builds a second instance; whichever construction
/// finishes last is kept. No other strategy in this crate allows that.
pub struct UnsyncSingleton<T> {
    slot: RefCell<Option<Arc<T>>>,
    init: Constructor<T>,
}

impl<T> UnsyncSingleton<T> {
    pub const fn new(init: fn() -> T) -> Self {
        Self::with_constructor(Constructor::Infallible(init))
    }

    pub const fn fallible(init: fn() -> Result<T, ConstructionError>) -> Self {
        Self::with_constructor(Constructor::Fallible(init))
    }

    const fn with_constructor(init: Constructor<T>) -> Self {
        Self {
            slot: RefCell::new(None),
            init,
        }
    }

    /// Empties the slot, returning the instance it held.
    pub fn take(&mut self) -> Option<Arc<T>> {
        self.slot.get_mut().take()
    }
}

impl<T> SingletonContract for UnsyncSingleton<T> {
    type Payload = T;

    const STRATEGY: Strategy = Strategy::Unsynchronized;

    fn get_instance(&self) -> Result<Arc<T>, SingletonError> {
        if let Some(instance) = self.slot.borrow().as_ref() {
            return Ok(Arc::clone(instance));
        }

        // The borrow is released here; the constructor may observe the empty slot.
        let instance = self
            .init
            .construct()
            .map(Arc::new)
            .map_err(|err| construction_failed::<T>(Self::STRATEGY, err))?;
        constructed::<T>(Self::STRATEGY);

        *self.slot.borrow_mut() = Some(Arc::clone(&instance));
        Ok(instance)
    }

    fn is_initialized(&self) -> bool {
        self.slot.borrow().is_some()
    }
}
