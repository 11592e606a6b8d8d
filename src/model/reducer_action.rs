//! Named sync actions folding a payload into a model's data.

use std::fmt;
use std::sync::{Arc, Weak};

use super::base::ModelInner;
use crate::mvi::ModelData;
use crate::store::{EventKind, StoreError};

type BoxedReducer<D, P> = Box<dyn Fn(&mut D, P) + Send + Sync>;

/// A sync action created by [`crate::Model::action`].
///
/// Holds only a weak reference to its model; dispatching after the model
/// is gone fails with `StoreError::ModelDropped`.
pub struct ReducerAction<D: ModelData, P> {
    name: String,
    model_name: String,
    model: Weak<ModelInner<D>>,
    reducer: BoxedReducer<D, P>,
}

impl<D: ModelData, P> ReducerAction<D, P> {
    pub(crate) fn new(model: &Arc<ModelInner<D>>, name: String, reducer: BoxedReducer<D, P>) -> Self {
        Self {
            name,
            model_name: model.name().to_string(),
            model: Arc::downgrade(model),
            reducer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the reducer to the data. Returns whether the data changed.
    pub fn dispatch(&self, payload: P) -> Result<bool, StoreError> {
        let model = self.model.upgrade().ok_or_else(|| StoreError::ModelDropped {
            name: self.model_name.clone(),
        })?;

        Ok(model.commit(&self.name, EventKind::Reduce, |mut data| {
            (self.reducer)(&mut data, payload);
            data
        }))
    }
}

impl<D: ModelData, P> fmt::Debug for ReducerAction<D, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReducerAction")
            .field("action", &format!("{}/{}", self.model_name, self.name))
            .finish()
    }
}
