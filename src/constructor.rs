//! One-time constructors attached to a slot.

use crate::ConstructionError;

/// The function a slot runs to build its instance.
///
/// Plain function pointers keep every strategy `const`-constructible, so slots can
/// live in `static` items.
pub(crate) enum Constructor<T> {
    Infallible(fn() -> T),
    Fallible(fn() -> Result<T, ConstructionError>),
}

impl<T> Constructor<T> {
    pub(crate) fn construct(&self) -> Result<T, ConstructionError> {
        match self {
            Constructor::Infallible(init) => Ok(init()),
            Constructor::Fallible(init) => init(),
        }
    }
}

// Derived impls would require `T: Clone`.
impl<T> Clone for Constructor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Constructor<T> {}

impl<T> std::fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constructor::Infallible(_) => f.write_str("Constructor::Infallible"),
            Constructor::Fallible(_) => f.write_str("Constructor::Fallible"),
        }
    }
}
