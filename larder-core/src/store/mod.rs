//! Optimistic entity stores.
//!
//! A [`Store`] caches one collection of entities and mutates it
//! optimistically: the local change is visible before the server answers,
//! the server's answer wins on success, and the pre-mutation state of the
//! touched entity is restored on failure.
//!
//! Concurrency: mutations on the same entity ID are serialized through a
//! per-ID async lock, mutations on different IDs run concurrently. Snapshots
//! and rollbacks are scoped to one entity, so a failed mutation never undoes
//! an unrelated one. The store reports `Loading` while any operation is in
//! flight.
//!
//! A rollback never re-inserts an entity that a later list fetch or
//! [`Store::reset`] has dropped, and a confirmed delete removes the entity
//! even if a fetch brought it back meanwhile.
//!
//! There is a single `last_error` slot. Every operation clears it when it
//! starts, so a failure can be wiped by an operation that begins right
//! after it. Callers that need the error should use the returned `Result`.

mod cache;
mod lists;
mod locks;
mod sharing;
mod views;

pub use sharing::SharedWith;
pub use views::{CategoryGroup, ItemFilter};

use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::models::{Entity, EntityId};
use crate::pagination::{ListQuery, PaginationMeta};
use crate::resource::{Remote, Resource, RestResource};

use cache::Cache;
use locks::KeyedLocks;

/// Coarse state of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading,
    Error(ApiError),
}

type EntityOf<R> = <R as Resource>::Entity;
type QueryOf<R> = <R as Resource>::Query;

/// Cached collection of one resource, backed by a [`Remote`].
pub struct Store<R: Resource, S = RestResource<R>> {
    remote: S,
    state: Mutex<Cache<EntityOf<R>, QueryOf<R>>>,
    locks: KeyedLocks,
}

impl<R: Resource, S> std::fmt::Debug for Store<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("resource", &R::NAME).finish()
    }
}

/// Marks an operation as in flight until dropped.
struct Busy<'a, R: Resource, S> {
    store: &'a Store<R, S>,
}

impl<R: Resource, S> Drop for Busy<'_, R, S> {
    fn drop(&mut self) {
        let mut state = self.store.state();
        state.inflight = state.inflight.saturating_sub(1);
    }
}

impl<R: Resource, S> Store<R, S> {
    pub fn new(remote: S) -> Self {
        Self {
            remote,
            state: Mutex::new(Cache::default()),
            locks: KeyedLocks::default(),
        }
    }

    pub fn remote(&self) -> &S {
        &self.remote
    }

    fn state(&self) -> MutexGuard<'_, Cache<EntityOf<R>, QueryOf<R>>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Starts an operation: clears the previous error and bumps the
    /// in-flight count until the returned guard is dropped.
    fn begin(&self) -> Busy<'_, R, S> {
        let mut state = self.state();
        state.inflight += 1;
        state.last_error = None;
        Busy { store: self }
    }

    /// Records `error` as the last error and hands it back.
    fn fail(&self, error: ApiError) -> ApiError {
        warn!(
            resource = R::NAME,
            status = error.status,
            error = %error,
            "operation failed"
        );
        self.state().last_error = Some(error.clone());
        error
    }

    // State reads

    pub fn items(&self) -> Vec<EntityOf<R>> {
        self.state().items.clone()
    }

    /// Runs `f` over the cached items without cloning them.
    pub fn with_items<T>(&self, f: impl FnOnce(&[EntityOf<R>]) -> T) -> T {
        f(&self.state().items)
    }

    pub fn get(&self, id: EntityId) -> Option<EntityOf<R>> {
        let state = self.state();
        state.position(id).map(|i| state.items[i].clone())
    }

    pub fn current(&self) -> Option<EntityOf<R>> {
        self.state().current.clone()
    }

    pub fn pagination(&self) -> PaginationMeta {
        self.state().pagination
    }

    pub fn last_error(&self) -> Option<ApiError> {
        self.state().last_error.clone()
    }

    /// The query of the last successful list fetch.
    pub fn last_query(&self) -> Option<QueryOf<R>> {
        self.state().last_query.clone()
    }

    pub fn status(&self) -> Status {
        let state = self.state();
        if state.inflight > 0 {
            Status::Loading
        } else if let Some(error) = &state.last_error {
            Status::Error(error.clone())
        } else {
            Status::Idle
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state().inflight > 0
    }

    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().items.is_empty()
    }

    pub fn clear_error(&self) {
        self.state().last_error = None;
    }

    /// Drops everything cached. Operations still in flight keep counting,
    /// and their rollbacks will not bring dropped entities back.
    pub fn reset(&self) {
        let mut state = self.state();
        let inflight = state.inflight;
        let generation = state.generation + 1;
        *state = Cache::default();
        state.inflight = inflight;
        state.generation = generation;
    }

    /// Runs an optimistic mutation of one entity.
    ///
    /// `local` is applied to every cached copy of `id` before `remote` is
    /// awaited. On success the entity picked out of the response by
    /// `confirmed` replaces the optimistic copy; on failure the entity's
    /// previous state is restored and the error recorded.
    async fn optimistic<T, Fut>(
        &self,
        id: EntityId,
        local: impl FnMut(&mut EntityOf<R>),
        remote: Fut,
        confirmed: impl FnOnce(&T) -> &EntityOf<R>,
    ) -> ApiResult<T>
    where
        Fut: Future<Output = ApiResult<T>>,
    {
        let _busy = self.begin();
        let _key = self.locks.acquire(id).await;

        let snapshot = {
            let mut state = self.state();
            let snapshot = state.snapshot(id);
            state.patch(id, local);
            snapshot
        };

        match remote.await {
            Ok(response) => {
                debug!(resource = R::NAME, id, "mutation committed");
                self.state().commit(confirmed(&response));
                Ok(response)
            }
            Err(error) => {
                warn!(resource = R::NAME, id, "mutation failed, rolling back");
                self.state().restore(snapshot);
                Err(self.fail(error))
            }
        }
    }

    /// Runs a server call for one entity without touching the cache first,
    /// then lets `apply` fold the result in on success.
    async fn commit_only<T, Fut>(
        &self,
        id: EntityId,
        remote: Fut,
        apply: impl FnOnce(&mut Cache<EntityOf<R>, QueryOf<R>>, &T),
    ) -> ApiResult<T>
    where
        Fut: Future<Output = ApiResult<T>>,
    {
        let _busy = self.begin();
        let _key = self.locks.acquire(id).await;

        match remote.await {
            Ok(response) => {
                apply(&mut self.state(), &response);
                Ok(response)
            }
            Err(error) => Err(self.fail(error)),
        }
    }
}

impl<R: Resource, S: Remote<R>> Store<R, S> {
    /// Fetches one page. Items, pagination and the recorded query are
    /// replaced together on success and left untouched on failure.
    pub async fn fetch_list(&self, query: QueryOf<R>) -> ApiResult<()> {
        let _busy = self.begin();

        let resolved = query.resolve().map_err(|e| self.fail(e))?;
        match self.remote.list(&resolved).await {
            Ok(page) => {
                debug!(
                    resource = R::NAME,
                    count = page.data.len(),
                    total = page.pagination.total,
                    "list fetched"
                );
                let mut state = self.state();
                state.replace_items(page.data);
                state.pagination = page.pagination;
                state.last_query = Some(query);
                Ok(())
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Re-runs the last successful list query, or the default query.
    pub async fn refresh(&self) -> ApiResult<()> {
        let query = self.last_query().unwrap_or_default();
        self.fetch_list(query).await
    }

    /// Fetches one entity into `current`, refreshing its entry in `items`.
    pub async fn fetch_one(&self, id: EntityId) -> ApiResult<EntityOf<R>> {
        self.commit_only(id, self.remote.get(id), |state, entity| {
            state.commit(entity);
            state.current = Some(entity.clone());
        })
        .await
    }

    /// Creates an entity. Nothing is inserted until the server answers;
    /// the server's copy then goes to the head of `items`.
    pub async fn create(&self, input: R::Create) -> ApiResult<EntityOf<R>> {
        let _busy = self.begin();

        match self.remote.create(&input).await {
            Ok(entity) => {
                debug!(resource = R::NAME, id = entity.id(), "created");
                self.state().prepend(entity.clone());
                Ok(entity)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    pub async fn update(&self, id: EntityId, patch: R::Update) -> ApiResult<EntityOf<R>> {
        self.optimistic(
            id,
            |entity| R::apply_update(entity, &patch),
            self.remote.update(id, &patch),
            |entity| entity,
        )
        .await
    }

    /// Removes the entity locally, then on the server. A failed delete puts
    /// it back at its previous position.
    pub async fn delete(&self, id: EntityId) -> ApiResult<()> {
        let _busy = self.begin();
        let _key = self.locks.acquire(id).await;

        let snapshot = {
            let mut state = self.state();
            let snapshot = state.snapshot(id);
            state.remove(id);
            snapshot
        };

        match self.remote.delete(id).await {
            Ok(()) => {
                debug!(resource = R::NAME, id, "deleted");
                let mut state = self.state();
                state.remove(id);
                state.shared_users.remove(&id);
                Ok(())
            }
            Err(error) => {
                warn!(resource = R::NAME, id, "delete failed, restoring entity");
                self.state().restore(snapshot);
                Err(self.fail(error))
            }
        }
    }

    /// Generic optimistic action: applies `local` to the cached entity, then
    /// awaits `remote` and commits the entity it returns.
    pub async fn mutate<Fut>(
        &self,
        id: EntityId,
        local: impl FnMut(&mut EntityOf<R>),
        remote: Fut,
    ) -> ApiResult<EntityOf<R>>
    where
        Fut: Future<Output = ApiResult<EntityOf<R>>>,
    {
        self.optimistic(id, local, remote, |entity| entity).await
    }
}

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod tests;
