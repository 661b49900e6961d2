//! The five initialization strategies.

mod double_checked;
mod eager;
mod holder;
mod synchronized;
mod unsync;

pub use double_checked::DoubleCheckedSingleton;
pub use eager::EagerSingleton;
pub use holder::HolderSingleton;
pub use synchronized::SynchronizedSingleton;
pub use unsync::UnsyncSingleton;
