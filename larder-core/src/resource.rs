//! Per-entity configuration and the remote side of a store.
//!
//! A [`Resource`] names the entity type, its payloads, its list query and
//! how an update patch is applied locally. A [`Remote`] performs the five
//! CRUD calls for one resource; [`RestResource`] is the HTTP implementation,
//! tests substitute scripted fakes.

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::gateway::Gateway;
use crate::models::{Entity, EntityId};
use crate::pagination::{ListQuery, ListResponse, Page, ResolvedQuery};
use crate::validate::{self, Validate};

/// Static description of one entity type.
pub trait Resource: Send + Sync + 'static {
    type Entity: Entity;
    type Create: Validate + Serialize + Clone + fmt::Debug + Send + Sync;
    type Update: Validate + Serialize + Clone + fmt::Debug + Send + Sync;
    type Query: ListQuery;

    /// Human-readable name used in logs and error messages.
    const NAME: &'static str;

    /// Applies `update` to a cached entity as the optimistic guess.
    fn apply_update(entity: &mut Self::Entity, update: &Self::Update);
}

/// Server side of a resource.
#[async_trait]
pub trait Remote<R: Resource>: Send + Sync {
    async fn list(&self, query: &ResolvedQuery) -> ApiResult<Page<R::Entity>>;
    async fn get(&self, id: EntityId) -> ApiResult<R::Entity>;
    async fn create(&self, input: &R::Create) -> ApiResult<R::Entity>;
    async fn update(&self, id: EntityId, patch: &R::Update) -> ApiResult<R::Entity>;
    async fn delete(&self, id: EntityId) -> ApiResult<()>;
}

/// Where a resource lives on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    path: String,
}

impl Endpoint {
    /// A top-level collection such as `/api/categories`.
    pub fn root(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// A collection under a parent entity, such as
    /// `/api/pantries/{id}/items`. The parent ID is checked up front.
    pub fn nested(parent: &str, parent_id: EntityId, child: &str) -> ApiResult<Self> {
        validate::id(parent_id, "parent")?;
        Ok(Self {
            path: format!("{}/{}/{}", parent, parent_id, child),
        })
    }

    pub fn collection(&self) -> &str {
        &self.path
    }

    pub fn member(&self, id: EntityId) -> String {
        format!("{}/{}", self.path, id)
    }

    /// A custom action on one member, e.g. `/api/shopping-lists/3/purchase`.
    pub fn action(&self, id: EntityId, action: &str) -> String {
        format!("{}/{}/{}", self.path, id, action)
    }
}

/// Single-entity responses come either bare or wrapped as `{ "item": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ItemResponse<T> {
    Wrapped { item: T },
    Bare(T),
}

impl<T> ItemResponse<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            ItemResponse::Wrapped { item } => item,
            ItemResponse::Bare(item) => item,
        }
    }
}

/// [`Remote`] over HTTP. IDs and payloads are validated before any request
/// is sent.
pub struct RestResource<R> {
    gateway: Gateway,
    endpoint: Endpoint,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for RestResource<R> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            endpoint: self.endpoint.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R> fmt::Debug for RestResource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestResource")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl<R: Resource> RestResource<R> {
    pub fn new(gateway: Gateway, endpoint: Endpoint) -> Self {
        Self {
            gateway,
            endpoint,
            _resource: PhantomData,
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub(crate) fn check_id(id: EntityId) -> ApiResult<()> {
        validate::id(id, R::NAME)
    }
}

#[async_trait]
impl<R: Resource> Remote<R> for RestResource<R> {
    async fn list(&self, query: &ResolvedQuery) -> ApiResult<Page<R::Entity>> {
        let response: ListResponse<R::Entity> = self
            .gateway
            .get_query(self.endpoint.collection(), &query.pairs())
            .await?;
        Ok(response.into_page(query))
    }

    async fn get(&self, id: EntityId) -> ApiResult<R::Entity> {
        Self::check_id(id)?;
        let response: ItemResponse<R::Entity> =
            self.gateway.get(&self.endpoint.member(id)).await?;
        Ok(response.into_inner())
    }

    async fn create(&self, input: &R::Create) -> ApiResult<R::Entity> {
        input.validate()?;
        let response: ItemResponse<R::Entity> = self
            .gateway
            .post(self.endpoint.collection(), input)
            .await?;
        Ok(response.into_inner())
    }

    async fn update(&self, id: EntityId, patch: &R::Update) -> ApiResult<R::Entity> {
        Self::check_id(id)?;
        patch.validate()?;
        let response: ItemResponse<R::Entity> =
            self.gateway.put(&self.endpoint.member(id), patch).await?;
        Ok(response.into_inner())
    }

    async fn delete(&self, id: EntityId) -> ApiResult<()> {
        Self::check_id(id)?;
        self.gateway.delete(&self.endpoint.member(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn test_endpoint_paths() {
        let root = Endpoint::root("/api/categories");
        assert_eq!(root.collection(), "/api/categories");
        assert_eq!(root.member(4), "/api/categories/4");

        let nested = Endpoint::nested("/api/shopping-lists", 3, "items").unwrap();
        assert_eq!(nested.collection(), "/api/shopping-lists/3/items");
        assert_eq!(nested.action(9, "purchase"), "/api/shopping-lists/3/items/9/purchase");
    }

    #[test]
    fn test_nested_rejects_bad_parent() {
        let err = Endpoint::nested("/api/pantries", 0, "items").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_item_response_shapes() {
        let wrapped: ItemResponse<Category> =
            serde_json::from_str(r#"{"item": {"id": 1, "name": "Dairy"}}"#).unwrap();
        assert_eq!(wrapped.into_inner().id, 1);

        let bare: ItemResponse<Category> =
            serde_json::from_str(r#"{"id": 2, "name": "Bakery"}"#).unwrap();
        assert_eq!(bare.into_inner().name, "Bakery");
    }
}
