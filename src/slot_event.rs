use crate::Strategy;

/// Events emitted by slots declared with [`define_singleton!`](crate::define_singleton).
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use singleton_strategies::{SlotEvent, Strategy};
///
/// let event = SlotEvent::Access {
///     strategy: Strategy::Holder,
///     type_name: "i32",
///     initialized: true,
/// };
/// println!("{}", event);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotEvent {
    /// `get_instance` returned a handle.
    Access {
        strategy: Strategy,
        /// The payload type name (e.g., "i32", "singleton_strategies::SharedState")
        type_name: &'static str,
        /// Whether the slot was already initialized when the call started
        initialized: bool,
    },

    /// `get_instance` returned an error.
    Failure {
        strategy: Strategy,
        type_name: &'static str,
        /// The rendered [`SingletonError`](crate::SingletonError)
        reason: String,
    },
}

impl std::fmt::Display for SlotEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotEvent::Access {
                strategy,
                type_name,
                initialized,
            } => write!(
                f,
                "access {{ strategy: {}, type_name: {}, initialized: {} }}",
                strategy, type_name, initialized
            ),
            SlotEvent::Failure {
                strategy,
                type_name,
                reason,
            } => write!(
                f,
                "failure {{ strategy: {}, type_name: {}, reason: {} }}",
                strategy, type_name, reason
            ),
        }
    }
}
