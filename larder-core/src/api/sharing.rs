//! Sharing pantries and shopping lists with other users.

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{EntityId, ShareRequest, User};
use crate::resource::{Resource, RestResource};
use crate::validate::{self, Validate};

/// Share, list and revoke access to one entity.
#[async_trait]
pub trait Sharing: Send + Sync {
    /// Shares the entity with the user registered under `email` and returns
    /// that user.
    async fn share(&self, id: EntityId, email: &str) -> ApiResult<User>;

    async fn shared_users(&self, id: EntityId) -> ApiResult<Vec<User>>;

    async fn revoke(&self, id: EntityId, user_id: EntityId) -> ApiResult<()>;
}

/// Resources whose members can be shared.
pub trait Shareable: Resource {}

impl Shareable for super::Pantries {}
impl Shareable for super::ShoppingLists {}

#[async_trait]
impl<R: Shareable> Sharing for RestResource<R> {
    async fn share(&self, id: EntityId, email: &str) -> ApiResult<User> {
        Self::check_id(id)?;
        let body = ShareRequest {
            email: email.trim().to_string(),
        };
        body.validate()?;
        self.gateway()
            .post(&self.endpoint().action(id, "share"), &body)
            .await
    }

    async fn shared_users(&self, id: EntityId) -> ApiResult<Vec<User>> {
        Self::check_id(id)?;
        self.gateway()
            .get(&self.endpoint().action(id, "shared-users"))
            .await
    }

    async fn revoke(&self, id: EntityId, user_id: EntityId) -> ApiResult<()> {
        Self::check_id(id)?;
        validate::id(user_id, "user")?;
        let path = format!("{}/{}", self.endpoint().action(id, "share"), user_id);
        self.gateway().delete(&path).await
    }
}
