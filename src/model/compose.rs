//! Async functions wrapped into dispatchable, inspectable actions.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use super::base::ModelInner;
use crate::mvi::ModelData;
use crate::select::{Comparator, Selection, Subscription};
use crate::store::{EventKind, StoreEvent};

/// Last lifecycle transition of an action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActionStatus {
    /// Never called, or every call was abandoned before settling.
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

impl Selection for ActionStatus {
    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

/// Lifecycle bookkeeping of one [`ComposeAction`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionMeta {
    pub status: ActionStatus,
    /// Calls started and not yet settled.
    pub in_flight: usize,
    /// Message of the last rejection, cleared by the next success.
    pub error: Option<String>,
    /// Number of settled calls.
    pub settled: u64,
}

impl ActionMeta {
    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }
}

/// An async function bound to a model.
///
/// Calling it runs the function and returns its result unchanged, while the
/// action tracks the call in its [`ActionMeta`] and announces the
/// `Prepare`/`Success`/`Fail` transitions on the store's event feed.
///
/// Data is never written by the lifecycle itself; the wrapped function
/// writes through the model (`change_data`, reducer actions) when it
/// wants its result in the slice.
pub struct ComposeAction<D: ModelData, A, F> {
    id: Uuid,
    name: String,
    model_name: String,
    model: Weak<ModelInner<D>>,
    fun: F,
    meta: watch::Sender<Arc<ActionMeta>>,
    _args: PhantomData<fn(A)>,
}

impl<D: ModelData, A, F> ComposeAction<D, A, F> {
    pub(crate) fn new(model: &Arc<ModelInner<D>>, name: String, fun: F) -> Self {
        let (meta, _) = watch::channel(Arc::new(ActionMeta::default()));
        Self {
            id: Uuid::new_v4(),
            name,
            model_name: model.name().to_string(),
            model: Arc::downgrade(model),
            fun,
            meta,
            _args: PhantomData,
        }
    }

    /// Renames the action. Used in event action types and logs.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `"{model}/{name}"`, as it appears in [`StoreEvent::action`].
    pub fn action_type(&self) -> String {
        format!("{}/{}", self.model_name, self.name)
    }

    pub fn meta(&self) -> ActionMeta {
        (**self.meta.borrow()).clone()
    }

    pub fn status(&self) -> ActionStatus {
        self.meta.borrow().status
    }

    pub fn loading(&self) -> bool {
        self.meta.borrow().loading()
    }

    /// Subscribes to whether any call is in flight.
    pub fn use_loading(&self) -> Subscription<bool> {
        Subscription::new(
            &self.action_type(),
            self.meta.subscribe(),
            |meta: &Arc<ActionMeta>| meta.loading(),
            Comparator::Identity,
        )
    }

    /// Subscribes to the whole meta; changes on every transition.
    pub fn use_meta(&self) -> Subscription<Arc<ActionMeta>> {
        Subscription::new(
            &self.action_type(),
            self.meta.subscribe(),
            Arc::clone,
            Comparator::Identity,
        )
    }

    fn update_meta(&self, update: impl FnOnce(&mut ActionMeta)) {
        self.meta.send_modify(|meta| {
            let mut next = (**meta).clone();
            update(&mut next);
            *meta = Arc::new(next);
        });
    }

    fn emit(&self, kind: EventKind) {
        match self.model.upgrade() {
            Some(model) => model
                .store()
                .emit(StoreEvent::new(model.name(), &self.name, kind)),
            None => warn!(
                action = %self.action_type(),
                "model dropped, lifecycle event not emitted"
            ),
        }
    }

    fn begin(&self) {
        self.update_meta(|meta| {
            meta.status = ActionStatus::Pending;
            meta.in_flight += 1;
        });
        self.emit(EventKind::Prepare);
    }

    fn settle(&self, outcome: Result<(), String>) {
        self.update_meta(|meta| {
            meta.in_flight = meta.in_flight.saturating_sub(1);
            meta.settled += 1;
            match &outcome {
                Ok(()) => {
                    meta.status = ActionStatus::Fulfilled;
                    meta.error = None;
                }
                Err(message) => {
                    meta.status = ActionStatus::Rejected;
                    meta.error = Some(message.clone());
                }
            }
        });
        match outcome {
            Ok(()) => self.emit(EventKind::Success),
            Err(message) => self.emit(EventKind::Fail { message }),
        }
    }

    fn abandon(&self) {
        debug!(action = %self.action_type(), "call dropped before settling");
        self.update_meta(|meta| {
            meta.in_flight = meta.in_flight.saturating_sub(1);
            if meta.in_flight == 0 && meta.status == ActionStatus::Pending {
                meta.status = ActionStatus::Idle;
            }
        });
    }
}

impl<D, A, F, Fut, T, E> ComposeAction<D, A, F>
where
    D: ModelData,
    F: Fn(A) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    /// Runs the wrapped function with `args`.
    ///
    /// The result is exactly the wrapped function's. Calls are independent:
    /// several may be in flight at once.
    pub async fn call(&self, args: A) -> Result<T, E> {
        self.begin();
        let pending = scopeguard::guard((), |()| self.abandon());

        let result = (self.fun)(args).await;

        scopeguard::ScopeGuard::into_inner(pending);
        match &result {
            Ok(_) => self.settle(Ok(())),
            Err(e) => self.settle(Err(e.to_string())),
        }
        result
    }
}

impl<D: ModelData, A, F> fmt::Debug for ComposeAction<D, A, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeAction")
            .field("id", &self.id)
            .field("action", &self.action_type())
            .field("meta", &self.meta())
            .finish()
    }
}
