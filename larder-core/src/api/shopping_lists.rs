use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::sort_keys;
use crate::error::ApiResult;
use crate::models::{
    EntityId, ListItem, ListItemCreate, ListItemUpdate, PurchaseRequest, ShoppingList,
    ShoppingListCreate, ShoppingListUpdate, ToggleResponse,
};
use crate::pagination::{ListQuery, PageRequest, ResolvedQuery, SortOrder, DEFAULT_PER_PAGE};
use crate::resource::{Endpoint, Resource, RestResource};
use crate::validate::Validate;

#[derive(Debug, Clone, Copy)]
pub struct ShoppingLists;

impl ShoppingLists {
    /// Collection path.
    pub const PATH: &'static str = "/api/shopping-lists";

    /// Endpoint of the items on one list.
    pub fn items_endpoint(list_id: EntityId) -> ApiResult<Endpoint> {
        Endpoint::nested(Self::PATH, list_id, "items")
    }
}

impl Resource for ShoppingLists {
    type Entity = ShoppingList;
    type Create = ShoppingListCreate;
    type Update = ShoppingListUpdate;
    type Query = ShoppingListQuery;

    const NAME: &'static str = "list";

    fn apply_update(entity: &mut ShoppingList, update: &ShoppingListUpdate) {
        entity.apply(update);
    }
}

sort_keys! {
    pub enum ShoppingListSort {
        #[default]
        Name => "name",
        Owner => "owner",
        CreatedAt => "createdAt",
        UpdatedAt => "updatedAt",
        LastPurchasedAt => "lastPurchasedAt",
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShoppingListQuery {
    pub name: Option<String>,
    pub owner: Option<bool>,
    pub recurring: Option<bool>,
    pub paging: PageRequest,
    pub sort_by: Option<ShoppingListSort>,
    pub order: Option<SortOrder>,
}

impl ListQuery for ShoppingListQuery {
    fn resolve(&self) -> ApiResult<ResolvedQuery> {
        Ok(ResolvedQuery::new(
            self.paging,
            DEFAULT_PER_PAGE,
            self.sort_by.unwrap_or_default().as_str(),
            self.order.unwrap_or(SortOrder::Asc),
        )?
        .text("name", self.name.as_deref())
        .flag("owner", self.owner)
        .flag("recurring", self.recurring))
    }
}

/// List-level actions beyond CRUD.
#[async_trait]
pub trait ShoppingListActions: Send + Sync {
    /// Marks the list as purchased and returns the updated list.
    async fn purchase(&self, id: EntityId, request: &PurchaseRequest) -> ApiResult<ShoppingList>;

    /// Clears the purchased flag on every item and returns the items.
    async fn reset(&self, id: EntityId) -> ApiResult<Vec<ListItem>>;

    /// Moves the purchased items into the user's pantry.
    async fn move_to_pantry(&self, id: EntityId) -> ApiResult<()>;
}

#[async_trait]
impl ShoppingListActions for RestResource<ShoppingLists> {
    async fn purchase(&self, id: EntityId, request: &PurchaseRequest) -> ApiResult<ShoppingList> {
        Self::check_id(id)?;
        request.validate()?;
        self.gateway()
            .post(&self.endpoint().action(id, "purchase"), request)
            .await
    }

    async fn reset(&self, id: EntityId) -> ApiResult<Vec<ListItem>> {
        Self::check_id(id)?;
        self.gateway()
            .post_empty(&self.endpoint().action(id, "reset"))
            .await
    }

    async fn move_to_pantry(&self, id: EntityId) -> ApiResult<()> {
        Self::check_id(id)?;
        let _: Value = self
            .gateway()
            .post_empty(&self.endpoint().action(id, "move-to-pantry"))
            .await?;
        Ok(())
    }
}

/// Marker for the items on a shopping list. The parent ID is part of the
/// endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ListItems;

impl Resource for ListItems {
    type Entity = ListItem;
    type Create = ListItemCreate;
    type Update = ListItemUpdate;
    type Query = ListItemQuery;

    const NAME: &'static str = "item";

    fn apply_update(entity: &mut ListItem, update: &ListItemUpdate) {
        entity.apply(update);
    }
}

sort_keys! {
    pub enum ListItemSort {
        UpdatedAt => "updatedAt",
        #[default]
        CreatedAt => "createdAt",
        LastPurchasedAt => "lastPurchasedAt",
        ProductName => "productName",
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListItemQuery {
    pub purchased: Option<bool>,
    pub pantry_id: Option<EntityId>,
    pub category_id: Option<EntityId>,
    pub search: Option<String>,
    pub paging: PageRequest,
    pub sort_by: Option<ListItemSort>,
    pub order: Option<SortOrder>,
}

impl ListQuery for ListItemQuery {
    fn resolve(&self) -> ApiResult<ResolvedQuery> {
        Ok(ResolvedQuery::new(
            self.paging,
            DEFAULT_PER_PAGE,
            self.sort_by.unwrap_or_default().as_str(),
            self.order.unwrap_or(SortOrder::Desc),
        )?
        .flag("purchased", self.purchased)
        .id("pantry_id", self.pantry_id)
        .id("category_id", self.category_id)
        .text("search", self.search.as_deref()))
    }
}

#[derive(Debug, Serialize)]
struct TogglePurchased {
    purchased: bool,
}

/// Item-level actions beyond CRUD.
#[async_trait]
pub trait ListItemActions: Send + Sync {
    async fn toggle_purchased(&self, id: EntityId, purchased: bool) -> ApiResult<ToggleResponse>;
}

#[async_trait]
impl ListItemActions for RestResource<ListItems> {
    async fn toggle_purchased(&self, id: EntityId, purchased: bool) -> ApiResult<ToggleResponse> {
        Self::check_id(id)?;
        self.gateway()
            .patch(&self.endpoint().member(id), &TogglePurchased { purchased })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_item_query_defaults_to_newest_first() {
        let q = ListItemQuery::default().resolve().unwrap();
        assert_eq!(q.sort_by, "createdAt");
        assert_eq!(q.order, SortOrder::Desc);
        assert_eq!(q.per_page, 10);
    }

    #[test]
    fn test_list_query_filters() {
        let q = ShoppingListQuery {
            name: Some("weekly".to_string()),
            recurring: Some(true),
            paging: PageRequest::new(2, 5),
            order: Some(SortOrder::Desc),
            ..Default::default()
        }
        .resolve()
        .unwrap();

        assert_eq!(
            q.pairs(),
            vec![
                ("name", "weekly".to_string()),
                ("recurring", "true".to_string()),
                ("page", "2".to_string()),
                ("per_page", "5".to_string()),
                ("sort_by", "name".to_string()),
                ("order", "DESC".to_string()),
            ]
        );
    }

    #[test]
    fn test_zero_per_page_never_resolves() {
        let q = ListItemQuery {
            paging: PageRequest::new(1, 0),
            ..Default::default()
        };
        assert!(q.resolve().unwrap_err().is_validation());
    }
}
