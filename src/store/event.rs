//! Events broadcast by the store for every state transition.

/// What happened to a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A reducer wrote new data into the slice.
    Reduce,
    /// A composed action started.
    Prepare,
    /// A composed action settled successfully.
    Success,
    /// A composed action settled with an error.
    Fail { message: String },
    /// The slice went back to its initial data.
    Reset,
    /// The slice was restored from the snapshot file.
    Hydrate,
}

/// One store transition, as seen by observers of [`crate::store::Store::events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    /// Name of the model the event belongs to.
    pub model: String,
    /// Action type, `"{model}/{action}"`.
    pub action: String,
    pub kind: EventKind,
}

impl StoreEvent {
    pub fn new(model: &str, action: &str, kind: EventKind) -> Self {
        Self {
            model: model.to_string(),
            action: format!("{}/{}", model, action),
            kind,
        }
    }
}
