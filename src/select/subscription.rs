//! Selector subscriptions over observable values.

use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::watch;

use super::comparator::{Comparator, Selection};
use crate::store::StoreError;

type ChangedFuture<'a> = Pin<Box<dyn Future<Output = Result<(), watch::error::RecvError>> + Send + 'a>>;

/// Type-erased view of a watched value through a selector.
trait Source<T>: Send + Sync {
    fn has_changed(&self) -> bool;
    fn select(&mut self) -> T;
    fn changed(&mut self) -> ChangedFuture<'_>;
}

struct Selected<V, F> {
    rx: watch::Receiver<Arc<V>>,
    selector: F,
}

impl<V, T, F> Source<T> for Selected<V, F>
where
    V: Send + Sync + 'static,
    F: Fn(&Arc<V>) -> T + Send + Sync,
{
    fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    fn select(&mut self) -> T {
        // The borrow guard must not be held while the selector runs.
        let value = Arc::clone(&self.rx.borrow_and_update());
        (self.selector)(&value)
    }

    fn changed(&mut self) -> ChangedFuture<'_> {
        Box::pin(self.rx.changed())
    }
}

/// A live subscription to a selected value.
///
/// Holds the last selected value and re-selects whenever the watched
/// value is written. A new value only replaces the held one when the
/// comparator says it changed. Dropping the subscription unsubscribes.
pub struct Subscription<T> {
    current: T,
    comparator: Comparator,
    owner: String,
    source: Box<dyn Source<T>>,
}

impl<T: Selection> Subscription<T> {
    pub(crate) fn new<V, F>(
        owner: &str,
        mut rx: watch::Receiver<Arc<V>>,
        selector: F,
        comparator: Comparator,
    ) -> Self
    where
        V: Send + Sync + 'static,
        F: Fn(&Arc<V>) -> T + Send + Sync + 'static,
    {
        let value = Arc::clone(&rx.borrow_and_update());
        let current = selector(&value);
        Self {
            current,
            comparator,
            owner: owner.to_string(),
            source: Box::new(Selected { rx, selector }),
        }
    }

    /// The last selected value.
    pub fn get(&self) -> &T {
        &self.current
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    /// Re-selects if the source was written since the last look.
    ///
    /// Returns `true` when the selected value changed under the comparator,
    /// i.e. when the subscriber has to re-render.
    pub fn refresh(&mut self) -> bool {
        if !self.source.has_changed() {
            return false;
        }
        let next = self.source.select();
        self.accept(next)
    }

    /// Waits until the selected value changes under the comparator.
    ///
    /// Writes that select an equal value are skipped. Fails once the
    /// owner of the watched value is gone.
    pub async fn changed(&mut self) -> Result<(), StoreError> {
        loop {
            if self.source.changed().await.is_err() {
                return Err(StoreError::ModelDropped {
                    name: self.owner.clone(),
                });
            }
            let next = self.source.select();
            if self.accept(next) {
                return Ok(());
            }
        }
    }

    fn accept(&mut self, next: T) -> bool {
        if self.comparator.equal(&self.current, &next) {
            return false;
        }
        self.current = next;
        true
    }
}

impl<T> Deref for Subscription<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.current
    }
}

impl<T: fmt::Debug> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("owner", &self.owner)
            .field("comparator", &self.comparator)
            .field("current", &self.current)
            .finish()
    }
}
