//! Local state of a store and the per-entity snapshots used for rollback.

use std::collections::HashMap;

use crate::error::ApiError;
use crate::models::{Entity, EntityId, User};
use crate::pagination::PaginationMeta;

/// Everything a store knows about its collection.
#[derive(Debug, Clone)]
pub(crate) struct Cache<E, Q> {
    pub items: Vec<E>,
    pub current: Option<E>,
    pub pagination: PaginationMeta,
    pub last_error: Option<ApiError>,
    pub last_query: Option<Q>,
    /// Users an entity is shared with, by entity ID.
    pub shared_users: HashMap<EntityId, Vec<User>>,
    /// Operations started and not yet settled.
    pub inflight: usize,
    /// Bumped whenever `items` is replaced wholesale or the cache is reset.
    pub generation: u64,
}

impl<E, Q> Default for Cache<E, Q> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current: None,
            pagination: PaginationMeta::default(),
            last_error: None,
            last_query: None,
            shared_users: HashMap::new(),
            inflight: 0,
            generation: 0,
        }
    }
}

impl<E: Entity, Q> Cache<E, Q> {
    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.items.iter().position(|e| e.id() == id)
    }

    pub fn find_mut(&mut self, id: EntityId) -> Option<&mut E> {
        self.items.iter_mut().find(|e| e.id() == id)
    }

    pub fn current_is(&self, id: EntityId) -> bool {
        self.current.as_ref().is_some_and(|c| c.id() == id)
    }

    /// Replaces the whole collection, keeping the first entry of any
    /// duplicated ID.
    pub fn replace_items(&mut self, items: Vec<E>) {
        let mut seen = std::collections::HashSet::with_capacity(items.len());
        self.items = items.into_iter().filter(|e| seen.insert(e.id())).collect();
        self.generation += 1;
    }

    /// Inserts a newly created entity at the head.
    pub fn prepend(&mut self, entity: E) {
        self.items.retain(|e| e.id() != entity.id());
        self.items.insert(0, entity);
    }

    /// Overwrites the cached copies of `entity` with the confirmed state.
    /// Entries no longer in the collection are not re-added.
    pub fn commit(&mut self, entity: &E) {
        let id = entity.id();
        if let Some(slot) = self.find_mut(id) {
            *slot = entity.clone();
        }
        if self.current_is(id) {
            self.current = Some(entity.clone());
        }
    }

    /// Applies `f` to every cached copy of `id`.
    pub fn patch(&mut self, id: EntityId, mut f: impl FnMut(&mut E)) {
        if let Some(item) = self.find_mut(id) {
            f(item);
        }
        if let Some(current) = self.current.as_mut().filter(|c| c.id() == id) {
            f(current);
        }
    }

    pub fn remove(&mut self, id: EntityId) {
        self.items.retain(|e| e.id() != id);
        if self.current_is(id) {
            self.current = None;
        }
    }

    pub fn snapshot(&self, id: EntityId) -> Snapshot<E> {
        Snapshot {
            id,
            generation: self.generation,
            entry: self
                .position(id)
                .map(|index| (index, self.items[index].clone())),
            current: self.current.clone().filter(|c| c.id() == id),
        }
    }

    /// Puts back what `snapshot` captured for its entity and nothing else.
    ///
    /// An entity that was absent when the snapshot was taken stays absent,
    /// so a failed delete racing a successful one cannot resurrect it. If
    /// `items` was replaced or reset since the snapshot, it holds newer
    /// state and is left alone.
    pub fn restore(&mut self, snapshot: Snapshot<E>) {
        let Snapshot {
            id,
            generation,
            entry,
            current,
        } = snapshot;
        let unchanged = generation == self.generation;

        if let Some((index, entity)) = entry.filter(|_| unchanged) {
            match self.position(id) {
                Some(existing) => self.items[existing] = entity,
                None => {
                    let index = index.min(self.items.len());
                    self.items.insert(index, entity);
                }
            }
        }

        if let Some(entity) = current {
            if unchanged || self.current_is(id) {
                self.current = Some(entity);
            }
        }
    }
}

/// Pre-mutation state of one entity.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot<E> {
    id: EntityId,
    generation: u64,
    entry: Option<(usize, E)>,
    current: Option<E>,
}
