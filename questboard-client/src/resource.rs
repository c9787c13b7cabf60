//! Resource hook: keeps one `ResourceState` in sync with one remote table.
//!
//! Every request is tagged with a generation; a response is applied only if
//! its generation is still the newest one issued and the hook is still
//! active. Table and ordering are fixed at activation, the equality filter is
//! the only reactive input.

use crate::state::{Completion, Generation, ResourceMachine, ResourceState, ResourceStatus};
use questboard_core::{EqualityFilter, OrderSpec, QueryError, Row, TableEntity, TableQuery};
use questboard_storage::RemoteTableService;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{watch, Notify};

/// Client-side state for one remote collection.
///
/// Spawns its requests on the ambient Tokio runtime, so it must be activated
/// from within one. Dropping the hook deactivates it.
pub struct ResourceHook<T: TableEntity> {
    shared: Arc<Shared<T>>,
}

struct Shared<T: TableEntity> {
    service: Arc<dyn RemoteTableService>,
    order: OrderSpec,
    machine: Mutex<ResourceMachine<T>>,
    state_tx: watch::Sender<ResourceState<T>>,
    deactivated: Notify,
}

/// What a new request should query.
enum Request {
    /// Query `filter` if it differs from the last issued one.
    Filter(Option<EqualityFilter>),
    /// Query the last issued filter again.
    Refresh,
}

impl<T: TableEntity> ResourceHook<T> {
    /// Activate with the entity's default ordering and issue the first query.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn activate(service: Arc<dyn RemoteTableService>, filter: Option<EqualityFilter>) -> Self {
        Self::activate_with_order(service, T::default_order(), filter)
    }

    /// Activate with an explicit ordering and issue the first query.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn activate_with_order(
        service: Arc<dyn RemoteTableService>,
        order: OrderSpec,
        filter: Option<EqualityFilter>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ResourceState::idle());
        let hook = Self {
            shared: Arc::new(Shared {
                service,
                order,
                machine: Mutex::new(ResourceMachine::new()),
                state_tx,
                deactivated: Notify::new(),
            }),
        };
        tracing::debug!(table = T::TABLE, order = ?hook.shared.order, "Resource activated");
        Shared::issue(&hook.shared, Request::Filter(filter));
        hook
    }

    pub fn table(&self) -> &'static str {
        T::TABLE
    }

    pub fn order(&self) -> &OrderSpec {
        &self.shared.order
    }

    /// Change the filter. Re-queries only when the value differs from the
    /// last issued filter; returns whether a query was issued.
    pub fn set_filter(&self, filter: Option<EqualityFilter>) -> bool {
        Shared::issue(&self.shared, Request::Filter(filter)).is_some()
    }

    /// Re-issue the query for the last issued filter, changed or not.
    pub fn refresh(&self) -> bool {
        Shared::issue(&self.shared, Request::Refresh).is_some()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ResourceState<T> {
        self.shared.state_tx.borrow().clone()
    }

    pub fn status(&self) -> ResourceStatus {
        self.shared.lock().status()
    }

    /// Filter of the most recently issued query.
    pub fn filter(&self) -> Option<EqualityFilter> {
        self.shared.lock().filter().cloned()
    }

    pub fn discarded_responses(&self) -> u64 {
        self.shared.lock().discarded_responses()
    }

    pub fn is_active(&self) -> bool {
        self.shared.lock().is_active()
    }

    /// Receiver notified on every applied transition.
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.shared.state_tx.subscribe()
    }

    /// Resolve once no request is outstanding, or once the hook is deactivated.
    ///
    /// A deactivated hook resolves at once with its last snapshot, which may
    /// still have `loading` set. There is no timeout otherwise: a service that
    /// never answers keeps this pending, same as `loading`.
    pub async fn wait_until_settled(&self) -> ResourceState<T> {
        let mut rx = self.subscribe();
        let deactivated = self.shared.deactivated.notified();
        tokio::pin!(deactivated);
        deactivated.as_mut().enable();
        if !self.is_active() {
            return self.state();
        }

        tokio::select! {
            settled = rx.wait_for(|state| !state.loading) => match settled {
                Ok(state) => state.clone(),
                Err(_) => self.state(),
            },
            _ = &mut deactivated => self.state(),
        }
    }

    /// Stop applying results. Responses still in flight are dropped on arrival.
    pub fn deactivate(&self) {
        let mut machine = self.shared.lock();
        if machine.is_active() {
            machine.deactivate();
            drop(machine);
            self.shared.deactivated.notify_waiters();
            tracing::debug!(table = T::TABLE, "Resource deactivated");
        }
    }
}

impl<T: TableEntity> Drop for ResourceHook<T> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl<T: TableEntity> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, ResourceMachine<T>> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decide the filter and start the request under one lock, so a concurrent
    /// `set_filter` cannot slip between reading the filter and issuing.
    fn issue(shared: &Arc<Self>, request: Request) -> Option<Generation> {
        let (generation, filter) = {
            let mut machine = shared.lock();
            let filter = match request {
                Request::Refresh => machine.filter().cloned(),
                Request::Filter(filter) => {
                    if !machine.filter_changed(&filter) {
                        return None;
                    }
                    filter
                }
            };
            let generation = machine.begin(filter.clone())?;
            shared.state_tx.send_replace(machine.state().clone());
            (generation, filter)
        };

        let query = TableQuery::new(T::TABLE, shared.order.clone()).with_filter(filter);
        tracing::debug!(
            table = T::TABLE,
            generation = generation.get(),
            filter = ?query.filter,
            "Issuing query"
        );

        let task = Arc::clone(shared);
        tokio::spawn(async move {
            let result = match query.validate() {
                Ok(()) => task.service.select(&query).await,
                Err(err) => Err(err),
            };
            let result = result.and_then(decode_rows::<T>);
            task.finish(generation, result);
        });
        Some(generation)
    }

    fn finish(&self, generation: Generation, result: Result<Vec<T>, QueryError>) {
        let mut machine = self.lock();
        match machine.complete(generation, result) {
            Completion::Applied => {
                let state = machine.state().clone();
                match &state.error {
                    None => tracing::debug!(
                        table = T::TABLE,
                        generation = generation.get(),
                        rows = state.data.len(),
                        "Query applied"
                    ),
                    Some(error) => tracing::warn!(
                        table = T::TABLE,
                        generation = generation.get(),
                        error = %error,
                        "Query failed"
                    ),
                }
                self.state_tx.send_replace(state);
            }
            Completion::Discarded(reason) => {
                tracing::debug!(
                    table = T::TABLE,
                    generation = generation.get(),
                    current = machine.current_generation().get(),
                    reason = ?reason,
                    "Discarded stale response"
                );
            }
        }
    }
}

fn decode_rows<T: TableEntity>(rows: Vec<Row>) -> Result<Vec<T>, QueryError> {
    rows.into_iter()
        .map(serde_json::from_value::<T>)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| QueryError::Decode {
            table: T::TABLE.to_string(),
            reason: e.to_string(),
        })
}
