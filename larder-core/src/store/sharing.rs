//! Sharing operations for stores of shareable entities.

use super::Store;
use crate::api::Sharing;
use crate::error::ApiResult;
use crate::models::{EntityId, Pantry, ShoppingList, User};
use crate::resource::{Remote, Resource};

/// Entities that carry the list of users they are shared with.
pub trait SharedWith {
    fn add_shared(&mut self, user: &User);
    fn remove_shared(&mut self, user_id: EntityId);
}

impl SharedWith for Pantry {
    fn add_shared(&mut self, user: &User) {
        let users = self.shared_with.get_or_insert_with(Vec::new);
        if !users.iter().any(|u| u.id == user.id) {
            users.push(user.clone());
        }
    }

    fn remove_shared(&mut self, user_id: EntityId) {
        if let Some(users) = &mut self.shared_with {
            users.retain(|u| u.id != user_id);
        }
    }
}

impl SharedWith for ShoppingList {
    fn add_shared(&mut self, user: &User) {
        if !self.shared_with.iter().any(|u| u.id == user.id) {
            self.shared_with.push(user.clone());
        }
    }

    fn remove_shared(&mut self, user_id: EntityId) {
        self.shared_with.retain(|u| u.id != user_id);
    }
}

impl<R, S> Store<R, S>
where
    R: Resource,
    R::Entity: SharedWith,
    S: Remote<R> + Sharing,
{
    /// Shares an entity with the user registered under `email`.
    pub async fn share(&self, id: EntityId, email: &str) -> ApiResult<User> {
        self.commit_only(id, self.remote.share(id, email), |state, user| {
            let users = state.shared_users.entry(id).or_default();
            if !users.iter().any(|u| u.id == user.id) {
                users.push(user.clone());
            }
            state.patch(id, |entity| entity.add_shared(user));
        })
        .await
    }

    pub async fn fetch_shared_users(&self, id: EntityId) -> ApiResult<Vec<User>> {
        self.commit_only(id, self.remote.shared_users(id), |state, users| {
            state.shared_users.insert(id, users.clone());
        })
        .await
    }

    /// Users last fetched for `id`, including shares and revocations made
    /// through this store since.
    pub fn shared_users(&self, id: EntityId) -> Vec<User> {
        self.state()
            .shared_users
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    /// Revokes a share. The user disappears from the cache immediately and
    /// comes back if the server refuses.
    pub async fn revoke_share(&self, id: EntityId, user_id: EntityId) -> ApiResult<()> {
        let _busy = self.begin();
        let _key = self.locks.acquire(id).await;

        let (snapshot, previous) = {
            let mut state = self.state();
            let snapshot = state.snapshot(id);
            let previous = state.shared_users.get(&id).cloned();
            if let Some(users) = state.shared_users.get_mut(&id) {
                users.retain(|u| u.id != user_id);
            }
            state.patch(id, |entity| entity.remove_shared(user_id));
            (snapshot, previous)
        };

        match self.remote.revoke(id, user_id).await {
            Ok(()) => Ok(()),
            Err(error) => {
                {
                    let mut state = self.state();
                    state.restore(snapshot);
                    // A reset since the revoke started drops the entry for good.
                    match previous {
                        Some(users) if state.shared_users.contains_key(&id) => {
                            state.shared_users.insert(id, users);
                        }
                        Some(_) => {}
                        None => {
                            state.shared_users.remove(&id);
                        }
                    }
                }
                Err(self.fail(error))
            }
        }
    }
}
