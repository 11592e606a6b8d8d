//! Base trait for the data held by a model slice.

/// Marker trait for slice data.
///
/// Data should be:
/// - Cheap to clone or wrapped in `Arc` fields (writes clone the slice)
/// - Comparable (PartialEq lets the store drop no-op writes)
/// - Shareable across threads (subscriptions may live on any task)
///
/// `()` is the data of a model that carries no state of its own.
pub trait ModelData: Clone + PartialEq + Send + Sync + 'static {}

impl<T> ModelData for T where T: Clone + PartialEq + Send + Sync + 'static {}
