//! The model base: one named slice of store state plus the operations that
//! read and change it.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::compose::ComposeAction;
use super::reducer_action::ReducerAction;
use crate::mvi::{Intent, ModelData, Reducer};
use crate::select::{Comparator, Selection, Subscription};
use crate::store::{EventKind, SliceHandle, Store, StoreError, StoreEvent};

/// Returns `true` when any flag is set; `false` for no flags.
///
/// Loading subscriptions of several actions cannot be combined inside a
/// single condition of a view, so they are read first and folded here.
pub fn use_loading<I>(flags: I) -> bool
where
    I: IntoIterator<Item = bool>,
{
    flags.into_iter().any(|loading| loading)
}

struct Codec<D> {
    encode: fn(&D) -> serde_json::Result<Value>,
    decode: fn(Value) -> serde_json::Result<D>,
}

fn encode<D: Serialize>(data: &D) -> serde_json::Result<Value> {
    serde_json::to_value(data)
}

fn decode<D: DeserializeOwned>(value: Value) -> serde_json::Result<D> {
    serde_json::from_value(value)
}

pub(crate) struct ModelInner<D: ModelData> {
    name: String,
    store: Store,
    initial: Arc<D>,
    data: watch::Sender<Arc<D>>,
    codec: Option<Codec<D>>,
    compose_seq: AtomicUsize,
    /// Set once the store accepted the name. A model rejected as a
    /// duplicate must not touch the store's snapshot entries on drop.
    registered: AtomicBool,
}

impl<D: ModelData> ModelInner<D> {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    /// Applies `update` to a copy of the data and publishes it.
    ///
    /// Returns `false` when the result equals the current data; nothing is
    /// published or emitted then. `update` runs under the store write lock.
    /// It may write other models, but a nested write to this model is
    /// overwritten by the result of `update`.
    pub(crate) fn commit<F>(&self, action: &str, kind: EventKind, update: F) -> bool
    where
        F: FnOnce(D) -> D,
    {
        let changed = {
            let _guard = self.store.write_lock();
            let current = (**self.data.borrow()).clone();
            let next = update(current);
            let changed = self.data.send_if_modified(|current| {
                if **current == next {
                    return false;
                }
                *current = Arc::new(next);
                true
            });
            if changed {
                self.store
                    .emit(StoreEvent::new(&self.name, action, kind));
            }
            changed
        };

        if !changed {
            debug!(model = %self.name, action, "write left data unchanged");
            return false;
        }

        if self.codec.is_some() {
            if let Err(e) = self.store.persisted_commit() {
                warn!(model = %self.name, error = %e, "snapshot flush failed");
            }
        }
        true
    }

    fn hydrate(&self, value: Value) {
        let Some(codec) = self.codec.as_ref() else {
            return;
        };
        match (codec.decode)(value) {
            Ok(data) => {
                self.commit("hydrate", EventKind::Hydrate, |_| data);
            }
            Err(e) => {
                warn!(model = %self.name, error = %e, "discarding undecodable snapshot");
            }
        }
    }
}

impl<D: ModelData> Drop for ModelInner<D> {
    fn drop(&mut self) {
        if !self.registered.load(Ordering::Acquire) {
            return;
        }
        match self.snapshot() {
            Some(Ok(value)) => self.store.stash_snapshot(&self.name, value),
            Some(Err(e)) => warn!(model = %self.name, error = %e, "final snapshot lost"),
            None => {}
        }
    }
}

impl<D: ModelData> SliceHandle for ModelInner<D> {
    fn reset(&self) {
        let initial = (*self.initial).clone();
        self.commit("reset", EventKind::Reset, |_| initial);
    }

    fn snapshot(&self) -> Option<Result<Value, StoreError>> {
        let codec = self.codec.as_ref()?;
        let data = Arc::clone(&self.data.borrow());
        Some((codec.encode)(&data).map_err(|source| StoreError::Snapshot {
            model: self.name.clone(),
            source,
        }))
    }
}

/// A named slice of store state and the actions that change it.
///
/// Concrete models wrap a `Model<D>` and keep their actions next to it:
///
/// ```
/// use model_store::{Model, Store};
///
/// #[derive(Clone, Default, PartialEq)]
/// struct Counter {
///     count: u32,
/// }
///
/// # async fn demo() -> Result<(), model_store::StoreError> {
/// let store = Store::default();
/// let model = Model::new(&store, "counter", Counter::default())?;
///
/// let target = model.clone();
/// let increment = model.compose(move |step: u32| {
///     let target = target.clone();
///     async move {
///         target.change_data("increment", |d| d.count += step);
///         Ok::<_, std::convert::Infallible>(())
///     }
/// });
///
/// increment.call(2).await.ok();
/// assert_eq!(*model.use_data_with(|d| d.count, false), 2);
/// # Ok(())
/// # }
/// ```
pub struct Model<D: ModelData> {
    inner: Arc<ModelInner<D>>,
}

impl<D: ModelData> Model<D> {
    /// Registers a model named `name` holding `initial`.
    ///
    /// # Errors
    /// Returns `StoreError::DuplicateModel` if a live model already uses
    /// the name in this store.
    pub fn new(store: &Store, name: impl Into<String>, initial: D) -> Result<Self, StoreError> {
        Self::build(store, name.into(), initial, None)
    }

    /// Shared constructor; registers the slice with the store.
    fn build(
        store: &Store,
        name: String,
        initial: D,
        codec: Option<Codec<D>>,
    ) -> Result<Self, StoreError> {
        let initial = Arc::new(initial);
        let (data, _) = watch::channel(Arc::clone(&initial));
        let inner = Arc::new(ModelInner {
            name,
            store: store.clone(),
            initial,
            data,
            codec,
            compose_seq: AtomicUsize::new(0),
            registered: AtomicBool::new(false),
        });

        let weak = Arc::downgrade(&inner);
        let handle: Weak<dyn SliceHandle> = weak;
        store.register(&inner.name, handle)?;
        inner.registered.store(true, Ordering::Release);
        Ok(Self { inner })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Current data, without subscribing.
    pub fn data(&self) -> Arc<D> {
        Arc::clone(&self.inner.data.borrow())
    }

    /// See [`use_loading`].
    pub fn use_loading<I>(flags: I) -> bool
    where
        I: IntoIterator<Item = bool>,
    {
        use_loading(flags)
    }

    /// Subscribes to the whole slice.
    ///
    /// Every effective write replaces the slice, so the subscription changes
    /// on every write that altered the data.
    pub fn use_data(&self) -> Subscription<Arc<D>> {
        Subscription::new(
            &self.inner.name,
            self.inner.data.subscribe(),
            Arc::clone,
            Comparator::Identity,
        )
    }

    /// Subscribes to `selector(data)`.
    ///
    /// `comparator` accepts a [`Comparator`] or a bool: `true` compares
    /// shallowly, which keeps selectors that build a new record on every
    /// call from re-rendering when no field changed.
    pub fn use_data_with<T, F>(&self, selector: F, comparator: impl Into<Comparator>) -> Subscription<T>
    where
        T: Selection,
        F: Fn(&D) -> T + Send + Sync + 'static,
    {
        Subscription::new(
            &self.inner.name,
            self.inner.data.subscribe(),
            move |data: &Arc<D>| selector(data),
            comparator.into(),
        )
    }

    /// Wraps an async function into an action bound to this model.
    ///
    /// The action is named `compose#N` until renamed with
    /// [`ComposeAction::named`].
    pub fn compose<A, F, Fut, T, E>(&self, fun: F) -> ComposeAction<D, A, F>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let seq = self.inner.compose_seq.fetch_add(1, Ordering::Relaxed);
        ComposeAction::new(&self.inner, format!("compose#{}", seq), fun)
    }

    /// Declares a sync action folding a payload into the data.
    ///
    /// The reducer runs under the store write lock. Writing other models of
    /// the same store from it is fine; a write to this model from inside
    /// the reducer is overwritten when the reducer returns.
    pub fn action<P, F>(&self, name: impl Into<String>, reducer: F) -> ReducerAction<D, P>
    where
        F: Fn(&mut D, P) + Send + Sync + 'static,
    {
        ReducerAction::new(&self.inner, name.into(), Box::new(reducer))
    }

    /// One-off write. Returns whether the data changed.
    ///
    /// `update` runs under the store write lock, with the same rules as
    /// the reducer of [`Model::action`].
    pub fn change_data<F>(&self, action: &str, update: F) -> bool
    where
        F: FnOnce(&mut D),
    {
        self.inner.commit(action, EventKind::Reduce, |mut data| {
            update(&mut data);
            data
        })
    }

    /// Folds `intent` into the data with reducer `R`.
    ///
    /// `R::reduce` runs under the store write lock, with the same rules as
    /// the reducer of [`Model::action`].
    pub fn dispatch<R>(&self, intent: R::Intent) -> bool
    where
        R: Reducer<State = D>,
    {
        let label = Intent::label(&intent);
        self.inner
            .commit(label, EventKind::Reduce, |data| R::reduce(data, intent))
    }

    /// Restores the initial data.
    pub fn reset(&self) {
        self.inner.reset();
    }
}

impl<D> Model<D>
where
    D: ModelData + Serialize + DeserializeOwned,
{
    /// Like [`Model::new`], and the slice is included in store snapshots.
    ///
    /// If the store holds an entry for `name`, the data is restored from it
    /// right away. That entry is either the one read from the snapshot file
    /// or the final data of an earlier model with the same name.
    pub fn persisted(store: &Store, name: impl Into<String>, initial: D) -> Result<Self, StoreError> {
        let codec = Codec {
            encode: encode::<D>,
            decode: decode::<D>,
        };
        let model = Self::build(store, name.into(), initial, Some(codec))?;
        if let Some(value) = store.claim_snapshot(model.name()) {
            model.inner.hydrate(value);
        }
        Ok(model)
    }
}

impl<D: ModelData> Clone for Model<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: ModelData> fmt::Debug for Model<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model").field("name", &self.inner.name).finish()
    }
}
