//! Selector-based subscriptions.
//!
//! Components read a model through a [`Subscription`]: a selector applied
//! to the model's data plus a [`Comparator`] deciding when the selected
//! value counts as changed.

mod comparator;
mod subscription;

pub use comparator::{Comparator, Selection};
pub use subscription::Subscription;
