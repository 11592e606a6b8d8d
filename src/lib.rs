//! Typed state models over an explicit store.
//!
//! A [`Model`] owns one named slice of a [`Store`]. Views read it through
//! selector [`Subscription`]s (`use_data`, `use_data_with`) and change it
//! only through actions: sync [`ReducerAction`]s, typed [`mvi::Reducer`]s,
//! or async functions wrapped by [`Model::compose`] into [`ComposeAction`]s
//! whose lifecycle is observable.

pub mod config;
pub mod logging;
pub mod model;
pub mod mvi;
pub mod select;
pub mod store;

pub use config::StoreConfig;
pub use model::{use_loading, ActionMeta, ActionStatus, ComposeAction, Model, ReducerAction};
pub use select::{Comparator, Selection, Subscription};
pub use store::{EventKind, Store, StoreError, StoreEvent};
