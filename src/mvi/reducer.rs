//! Reducer trait for MVI architecture.

use super::intent::Intent;
use super::state::ModelData;

/// Reducer transforms slice data based on intents.
///
/// It must be a pure function: (State, Intent) -> State
pub trait Reducer {
    /// The data type this reducer operates on.
    type State: ModelData;

    /// The intent type this reducer handles.
    type Intent: Intent;

    /// Process an intent and return the new data.
    ///
    /// This should be a pure function with no side effects. It runs under
    /// the store write lock; a write to the same model from inside it is
    /// lost when the reduced state is published.
    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}
