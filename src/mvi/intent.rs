//! Base trait for intents folded by typed reducers.

/// Marker trait for intent objects.
///
/// Intents represent:
/// - User requests (increment, rename, clear)
/// - Settled results of asynchronous work
///
/// Intents are processed by reducers to produce new data.
pub trait Intent: Send + 'static {
    /// Short label used as the action type in store events and logs.
    fn label(&self) -> &'static str {
        "intent"
    }
}
