//! The store: registry of model slices, write serialization, the event
//! feed and snapshot persistence.

mod error;
mod event;
mod handle;
mod persist;

pub use error::StoreError;
pub use event::{EventKind, StoreEvent};
pub use handle::Store;

pub(crate) use handle::SliceHandle;
