//! Process-wide slots with tracing.
//!
//! This module provides the `SlotApi` trait with default implementations for
//! accessing a `static` singleton slot and reporting every access to an optional
//! tracing callback. [`define_singleton!`](crate::define_singleton) generates the
//! statics and an implementor.

use std::sync::{Arc, PoisonError, RwLock};

use crate::{SingletonContract, SingletonError, SlotEvent};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `SlotEvent` every time the slot is
/// accessed. It must be thread-safe because the slot itself is globally shared.
pub type TraceCallback = dyn Fn(&SlotEvent) + Send + Sync + 'static;

/// Storage for the trace callback of one slot.
///
/// Note: `define_singleton!` declares its trace static with this type.
#[doc(hidden)]
pub type TraceStorage = RwLock<Option<Arc<TraceCallback>>>;

/// Access to a `static` singleton slot, with tracing.
///
/// Implementors provide the two statics (`slot` and `trace`); every other method has
/// a default implementation.
pub trait SlotApi {
    /// The strategy type stored in the static.
    type Slot: SingletonContract + 'static;

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Access the trace callback static.
    fn trace() -> &'static TraceStorage;

    /// Set a tracing callback for slot accesses.
    ///
    /// # Safety Restrictions
    ///
    /// The callback runs while the trace lock is read-held. It must not set or
    /// clear the callback of the same slot, as that would deadlock.
    fn set_trace_callback(&self, callback: impl Fn(&SlotEvent) + Send + Sync + 'static) {
        let mut guard = Self::trace()
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    fn clear_trace_callback(&self) {
        let mut guard = Self::trace()
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    /// Invoke the current callback, if any, with `event`.
    ///
    /// # Panics
    ///
    /// A panicking callback propagates to the caller. The slot lock is not held
    /// while callbacks run, so the slot itself is unaffected.
    fn emit_event(&self, event: &SlotEvent) {
        let guard = Self::trace()
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(callback) = guard.as_ref() {
            callback(event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Slot
    // -------------------------------------------------------------------------------------------------

    /// Access the slot static.
    fn slot() -> &'static Self::Slot;

    /// Return the shared instance, constructing it on first use.
    ///
    /// Emits [`SlotEvent::Access`] on success and [`SlotEvent::Failure`] on error.
    fn get_instance(
        &self,
    ) -> Result<Arc<<Self::Slot as SingletonContract>::Payload>, SingletonError> {
        let slot = Self::slot();
        let initialized = slot.is_initialized();
        let result = slot.get_instance();

        let strategy = <Self::Slot as SingletonContract>::STRATEGY;
        let type_name = std::any::type_name::<<Self::Slot as SingletonContract>::Payload>();
        match &result {
            Ok(_) => self.emit_event(&SlotEvent::Access {
                strategy,
                type_name,
                initialized,
            }),
            Err(err) => self.emit_event(&SlotEvent::Failure {
                strategy,
                type_name,
                reason: err.to_string(),
            }),
        }

        result
    }

    /// Whether the slot already holds its instance. Emits no event.
    fn is_initialized(&self) -> bool {
        Self::slot().is_initialized()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{SlotApi, TraceStorage};
    use crate::{
        ConstructionError, HolderSingleton, SharedState, SharedStateOps, SingletonError,
        SlotEvent, Strategy,
    };

    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, RwLock};

    static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);

    fn fails_first() -> Result<SharedState, ConstructionError> {
        if ATTEMPTS.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(ConstructionError::new("warming up"))
        } else {
            Ok(SharedState::new())
        }
    }

    static SLOT: HolderSingleton<SharedState> = HolderSingleton::new(SharedState::new);
    static TRACE: TraceStorage = RwLock::new(None);

    static FLAKY_SLOT: HolderSingleton<SharedState> = HolderSingleton::fallible(fails_first);
    static FLAKY_TRACE: TraceStorage = RwLock::new(None);

    struct Api;

    impl SlotApi for Api {
        type Slot = HolderSingleton<SharedState>;

        fn trace() -> &'static TraceStorage {
            &TRACE
        }

        fn slot() -> &'static Self::Slot {
            &SLOT
        }
    }

    struct FlakyApi;

    impl SlotApi for FlakyApi {
        type Slot = HolderSingleton<SharedState>;

        fn trace() -> &'static TraceStorage {
            &FLAKY_TRACE
        }

        fn slot() -> &'static Self::Slot {
            &FLAKY_SLOT
        }
    }

    const API: Api = Api;

    fn record(api: &impl SlotApi) -> Arc<Mutex<Vec<SlotEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        api.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(e.clone());
        });
        events
    }

    #[test]
    fn test_failure_then_access_events() {
        let api = FlakyApi;
        let events = record(&api);

        let err = api.get_instance().unwrap_err();
        assert!(matches!(err, SingletonError::Construction { .. }));
        api.get_instance().unwrap();
        api.get_instance().unwrap();

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 3);
        assert_eq!(
            captured[0],
            SlotEvent::Failure {
                strategy: Strategy::Holder,
                type_name: std::any::type_name::<SharedState>(),
                reason: err.to_string(),
            }
        );
        assert_eq!(
            captured[1],
            SlotEvent::Access {
                strategy: Strategy::Holder,
                type_name: std::any::type_name::<SharedState>(),
                initialized: false,
            }
        );
        assert!(matches!(
            captured[2],
            SlotEvent::Access {
                initialized: true,
                ..
            }
        ));

        api.clear_trace_callback();
    }

    #[test]
    #[serial]
    fn test_clear_trace_callback_stops_events() {
        let events = record(&API);
        let _ = API.get_instance();
        assert_eq!(events.lock().unwrap().len(), 1);

        API.clear_trace_callback();
        let _ = API.get_instance();
        assert!(API.is_initialized());
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    #[serial]
    fn test_slot_is_usable_directly() {
        let _ = API.get_instance();
        let before = Api::slot().counter().unwrap();
        Api::slot().increment_counter().unwrap();
        assert_eq!(API.get_instance().unwrap().counter(), before + 1);
    }
}
