use thiserror::Error;

use crate::Strategy;

/// Error returned by a fallible constructor.
///
/// Constructors that can fail are registered with the `fallible` constructor of a
/// strategy (or [`EagerSingleton::try_load`](crate::EagerSingleton::try_load)).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConstructionError {
    message: String,
}

impl ConstructionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by [`SingletonContract::get_instance`](crate::SingletonContract::get_instance).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SingletonError {
    /// The one-time constructor failed. Nothing was published; lazy strategies
    /// retry on the next call.
    #[error("{strategy} slot failed to construct {type_name}: {source}")]
    Construction {
        strategy: Strategy,
        type_name: &'static str,
        #[source]
        source: ConstructionError,
    },

    /// The caller was blocked on a slot lock while its holder panicked.
    ///
    /// At most one waiter receives this error. The poison is cleared before the
    /// lock is released, so every later caller proceeds normally.
    #[error("wait on the {strategy} slot was interrupted by a panicking holder")]
    Interrupted { strategy: Strategy },
}

impl SingletonError {
    pub fn strategy(&self) -> Strategy {
        match self {
            SingletonError::Construction { strategy, .. } => *strategy,
            SingletonError::Interrupted { strategy } => *strategy,
        }
    }
}
