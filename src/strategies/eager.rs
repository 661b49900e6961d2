//! Strategy D: construction at load time.

use std::sync::Arc;

use crate::contract::{constructed, construction_failed};
use crate::{ConstructionError, SingletonContract, SingletonError, Strategy};

/// Slot whose instance is built when the slot itself is loaded.
///
/// [`load`](Self::load) runs the constructor immediately, so by the time the slot is
/// shared with another thread (moved into it, wrapped in an `Arc`, or published
/// through a one-time initialized static) construction has already happened-before
/// any access. The slot never synchronizes on its own; it inherits the ordering of
/// whatever hands it to other threads. The instance is built even if nobody ever
/// asks for it.
///
/// # Examples
///
/// ```rust
/// use singleton_strategies::{EagerSingleton, SharedState, SingletonContract};
///
/// let slot = EagerSingleton::load(SharedState::new);
/// assert!(slot.is_initialized());
///
/// std::thread::scope(|scope| {
///     scope.spawn(|| slot.get_instance().unwrap().increment_counter());
/// });
/// assert_eq!(slot.get_instance().unwrap().counter(), 1);
/// ```
#[derive(Debug)]
pub struct EagerSingleton<T> {
    instance: Arc<T>,
}

impl<T> EagerSingleton<T> {
    pub fn load(init: fn() -> T) -> Self {
        let instance = Arc::new(init());
        constructed::<T>(Self::STRATEGY);
        Self { instance }
    }

    /// Loads the slot with a fallible constructor.
    ///
    /// A failure is permanent: no slot exists to retry with.
    pub fn try_load(init: fn() -> Result<T, ConstructionError>) -> Result<Self, SingletonError> {
        let instance = init()
            .map(Arc::new)
            .map_err(|err| construction_failed::<T>(Self::STRATEGY, err))?;
        constructed::<T>(Self::STRATEGY);
        Ok(Self { instance })
    }
}

impl<T> SingletonContract for EagerSingleton<T> {
    type Payload = T;

    const STRATEGY: Strategy = Strategy::Eager;

    fn get_instance(&self) -> Result<Arc<T>, SingletonError> {
        Ok(Arc::clone(&self.instance))
    }

    fn is_initialized(&self) -> bool {
        true
    }
}
