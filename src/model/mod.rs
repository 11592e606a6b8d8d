//! Models: typed slices of store state with their read hooks and actions.

mod base;
mod compose;
mod reducer_action;

pub use base::{use_loading, Model};
pub use compose::{ActionMeta, ActionStatus, ComposeAction};
pub use reducer_action::ReducerAction;
