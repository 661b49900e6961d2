//! Strategy E: deferred holder initialization.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::contract::{constructed, construction_failed};
use crate::{ConstructionError, Constructor, SingletonContract, SingletonError, Strategy};

/// Nested unit holding the instance; loaded on first reference.
struct Holder<T> {
    instance: OnceCell<Arc<T>>,
}

impl<T> Holder<T> {
    const fn unloaded() -> Self {
        Self {
            instance: OnceCell::new(),
        }
    }
}

/// Lazy slot delegating the one-time guarantee to [`OnceCell`].
///
/// The instance lives in an inner holder that is initialized the first time
/// [`get_instance`](SingletonContract::get_instance) references it. The cell makes
/// concurrent first callers wait for a single construction and gives every later
/// reader a lock-free path with the required happens-before edge, without any
/// hand-written barrier.
///
/// If the constructor fails or panics the holder stays unloaded and the next call
/// tries again.
///
/// # Examples
///
/// ```rust
/// use singleton_strategies::{HolderSingleton, SharedState, SingletonContract};
///
/// static STATE: HolderSingleton<SharedState> = HolderSingleton::new(SharedState::new);
///
/// assert!(!STATE.is_initialized());
/// let state = STATE.get_instance().unwrap();
/// assert!(STATE.is_initialized());
/// assert_eq!(state.counter(), 0);
/// ```
pub struct HolderSingleton<T> {
    holder: Holder<T>,
    init: Constructor<T>,
}

impl<T> HolderSingleton<T> {
    pub const fn new(init: fn() -> T) -> Self {
        Self::with_constructor(Constructor::Infallible(init))
    }

    pub const fn fallible(init: fn() -> Result<T, ConstructionError>) -> Self {
        Self::with_constructor(Constructor::Fallible(init))
    }

    const fn with_constructor(init: Constructor<T>) -> Self {
        Self {
            holder: Holder::unloaded(),
            init,
        }
    }

    /// Empties the slot, returning the instance it held.
    pub fn take(&mut self) -> Option<Arc<T>> {
        self.holder.instance.take()
    }
}

impl<T> SingletonContract for HolderSingleton<T> {
    type Payload = T;

    const STRATEGY: Strategy = Strategy::Holder;

    fn get_instance(&self) -> Result<Arc<T>, SingletonError> {
        self.holder
            .instance
            .get_or_try_init(|| -> Result<Arc<T>, ConstructionError> {
                let instance = self.init.construct().map(Arc::new)?;
                constructed::<T>(Self::STRATEGY);
                Ok(instance)
            })
            .map(Arc::clone)
            .map_err(|err| construction_failed::<T>(Self::STRATEGY, err))
    }

    fn is_initialized(&self) -> bool {
        self.holder.instance.get().is_some()
    }
}
