//! Macros for declaring process-wide singleton slots.
//!
//! This module provides a simple macro-based approach to create type-safe,
//! thread-safe `static` singletons with per-slot tracing.

/// Declares a process-wide singleton slot with a single macro invocation.
///
/// The macro generates a module containing:
/// - The slot static (hidden), using the given strategy type
/// - Trace callback static (hidden)
/// - An `Api` struct that implements `SlotApi`
/// - Free functions `get_instance`, `is_initialized`, `slot`,
///   `set_trace_callback` and `clear_trace_callback`
///
/// Supported strategies are the ones that can live in a `static`:
/// `SynchronizedSingleton`, `DoubleCheckedSingleton` and `HolderSingleton`.
/// Prefix the constructor with `fallible` when it returns
/// `Result<T, ConstructionError>`.
///
/// The generated module glob-imports its parent module, so the payload type and
/// the constructor must be nameable at module level (not only inside a function).
///
/// # Examples
///
/// ```rust
/// use singleton_strategies::{define_singleton, SharedState, SharedStateOps};
/// use std::sync::Arc;
///
/// define_singleton!(app_state, DoubleCheckedSingleton, SharedState, SharedState::new);
///
/// fn main() {
///     assert!(!app_state::is_initialized());
///
///     let a: Arc<SharedState> = app_state::get_instance().unwrap();
///     let b: Arc<SharedState> = app_state::get_instance().unwrap();
///     assert!(Arc::ptr_eq(&a, &b));
///
///     app_state::slot().increment_counter().unwrap();
///     assert_eq!(a.counter(), 1);
/// }
/// ```
///
/// # Fallible constructors
///
/// ```rust
/// use singleton_strategies::{define_singleton, ConstructionError};
///
/// fn connect() -> Result<String, ConstructionError> {
///     Err(ConstructionError::new("unreachable"))
/// }
///
/// define_singleton!(connection, HolderSingleton, String, fallible connect);
///
/// fn main() {
///     assert!(connection::get_instance().is_err());
///     assert!(!connection::is_initialized());
/// }
/// ```
#[macro_export]
macro_rules! define_singleton {
    ($name:ident, $strategy:ident, $payload:ty, fallible $init:path) => {
        $crate::define_singleton!(@module $name, $strategy, $payload, fallible, $init);
    };
    ($name:ident, $strategy:ident, $payload:ty, $init:path) => {
        $crate::define_singleton!(@module $name, $strategy, $payload, new, $init);
    };
    (@module $name:ident, $strategy:ident, $payload:ty, $ctor:ident, $init:path) => {
        pub mod $name {
            #[allow(unused_imports)]
            use super::*;

            // Slot storage (module-private)
            static SLOT: $crate::$strategy<$payload> = $crate::$strategy::$ctor($init);

            // Trace callback storage (module-private)
            static TRACE: $crate::TraceStorage = ::std::sync::RwLock::new(None);

            /// Zero-sized type that implements the slot API.
            ///
            /// All operations are provided by the `SlotApi` trait's default
            /// implementations. This struct only provides access to the statics.
            pub struct Api;

            impl $crate::SlotApi for Api {
                type Slot = $crate::$strategy<$payload>;

                fn trace() -> &'static $crate::TraceStorage {
                    &TRACE
                }

                fn slot() -> &'static Self::Slot {
                    &SLOT
                }
            }

            /// Convenient constant for accessing the slot API.
            pub const API: Api = Api;

            // Free functions for ergonomic usage - they delegate to API

            /// Return the shared instance, constructing it on first use.
            pub fn get_instance(
            ) -> ::std::result::Result<::std::sync::Arc<$payload>, $crate::SingletonError> {
                use $crate::SlotApi;
                API.get_instance()
            }

            /// Whether the slot already holds its instance.
            pub fn is_initialized() -> bool {
                use $crate::SlotApi;
                API.is_initialized()
            }

            /// The underlying slot, for strategy-level operations.
            pub fn slot() -> &'static $crate::$strategy<$payload> {
                &SLOT
            }

            /// Set a tracing callback for slot accesses.
            pub fn set_trace_callback(
                callback: impl Fn(&$crate::SlotEvent) + Send + Sync + 'static,
            ) {
                use $crate::SlotApi;
                API.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                use $crate::SlotApi;
                API.clear_trace_callback()
            }
        }
    };
}
