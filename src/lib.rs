//! # Singleton Strategies
//!
//! Exactly-once, thread-safe construction of a shared instance, offered as five
//! interchangeable strategies behind one contract.
//!
//! Every strategy implements [`SingletonContract`]: the first call to
//! [`get_instance`](SingletonContract::get_instance) builds the instance, every later
//! call returns a handle to the same allocation, and no caller ever sees a partially
//! built value. They differ only in how they synchronize that first construction.
//!
//! ## Quick Start
//!
//! ```rust
//! use singleton_strategies::{HolderSingleton, SharedState, SharedStateOps, SingletonContract};
//! use std::sync::Arc;
//!
//! static STATE: HolderSingleton<SharedState> = HolderSingleton::new(SharedState::new);
//!
//! let a = STATE.get_instance().unwrap();
//! let b = STATE.get_instance().unwrap();
//! assert!(Arc::ptr_eq(&a, &b));
//!
//! STATE.increment_counter().unwrap();
//! assert_eq!(a.counter(), 1);
//! ```
//!
//! ## Strategies
//!
//! | Type | Thread-safe | Lazy | Lock-free once built |
//! |------|-------------|------|----------------------|
//! | [`UnsyncSingleton`] | no (`!Sync`) | yes | yes |
//! | [`SynchronizedSingleton`] | yes | yes | no |
//! | [`DoubleCheckedSingleton`] | yes | yes | yes |
//! | [`EagerSingleton`] | yes | no | yes |
//! | [`HolderSingleton`] | yes | yes | yes |
//!
//! ## Features
//!
//! - **Swappable**: code written against [`SingletonContract`] works with any strategy
//! - **Fallible constructors**: a failed construction publishes nothing and is
//!   reported as [`SingletonError::Construction`]
//! - **Poison aware**: a panicking constructor is retried by the next call; a
//!   caller that was blocked while the holder panicked gets
//!   [`SingletonError::Interrupted`]
//! - **Tracing support**: slots declared with [`define_singleton!`] report every
//!   access to an optional callback
//!
//! ## Logging
//!
//! Constructions, failed constructions and poisoned locks are reported through the
//! [`log`] facade. The crate never installs a logger.

mod constructor;
mod contract;
mod error;
mod macros;
mod shared_state;
mod slot_api;
mod slot_event;
mod strategies;
mod strategy;

pub(crate) use constructor::Constructor;
pub use contract::{SharedStateOps, SingletonContract};
pub use error::{ConstructionError, SingletonError};
pub use shared_state::SharedState;
pub use slot_api::{SlotApi, TraceCallback, TraceStorage};
pub use slot_event::SlotEvent;
pub use strategies::{
    DoubleCheckedSingleton, EagerSingleton, HolderSingleton, SynchronizedSingleton,
    UnsyncSingleton,
};
pub use strategy::{ParseStrategyError, Strategy};
