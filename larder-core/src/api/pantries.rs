use super::sort_keys;
use crate::error::ApiResult;
use crate::models::{
    EntityId, Pantry, PantryCreate, PantryItem, PantryItemCreate, PantryItemUpdate, PantryUpdate,
};
use crate::pagination::{ListQuery, PageRequest, ResolvedQuery, SortOrder, DEFAULT_PER_PAGE};
use crate::resource::{Endpoint, Resource};

#[derive(Debug, Clone, Copy)]
pub struct Pantries;

impl Pantries {
    /// Collection path.
    pub const PATH: &'static str = "/api/pantries";

    /// Endpoint of the items stocked in one pantry.
    pub fn items_endpoint(pantry_id: EntityId) -> ApiResult<Endpoint> {
        Endpoint::nested(Self::PATH, pantry_id, "items")
    }
}

impl Resource for Pantries {
    type Entity = Pantry;
    type Create = PantryCreate;
    type Update = PantryUpdate;
    type Query = PantryQuery;

    const NAME: &'static str = "pantry";

    fn apply_update(entity: &mut Pantry, update: &PantryUpdate) {
        entity.apply(update);
    }
}

sort_keys! {
    pub enum PantrySort {
        #[default]
        Name => "name",
        Owner => "owner",
        CreatedAt => "createdAt",
        UpdatedAt => "updatedAt",
    }
}

#[derive(Debug, Clone, Default)]
pub struct PantryQuery {
    pub name: Option<String>,
    /// `true` for pantries I own, `false` for pantries shared with me.
    pub owner: Option<bool>,
    pub paging: PageRequest,
    pub sort_by: Option<PantrySort>,
    pub order: Option<SortOrder>,
}

impl ListQuery for PantryQuery {
    fn resolve(&self) -> ApiResult<ResolvedQuery> {
        Ok(ResolvedQuery::new(
            self.paging,
            DEFAULT_PER_PAGE,
            self.sort_by.unwrap_or_default().as_str(),
            self.order.unwrap_or(SortOrder::Asc),
        )?
        .text("name", self.name.as_deref())
        .flag("owner", self.owner))
    }
}

/// Marker for the items of a pantry. The parent ID is part of the endpoint.
#[derive(Debug, Clone, Copy)]
pub struct PantryItems;

impl Resource for PantryItems {
    type Entity = PantryItem;
    type Create = PantryItemCreate;
    type Update = PantryItemUpdate;
    type Query = PantryItemQuery;

    const NAME: &'static str = "pantry item";

    fn apply_update(entity: &mut PantryItem, update: &PantryItemUpdate) {
        entity.apply(update);
    }
}

sort_keys! {
    pub enum PantryItemSort {
        Name => "name",
        Quantity => "quantity",
        Unit => "unit",
        #[default]
        ProductName => "productName",
    }
}

#[derive(Debug, Clone, Default)]
pub struct PantryItemQuery {
    pub search: Option<String>,
    pub category_id: Option<EntityId>,
    pub paging: PageRequest,
    pub sort_by: Option<PantryItemSort>,
    pub order: Option<SortOrder>,
}

impl ListQuery for PantryItemQuery {
    fn resolve(&self) -> ApiResult<ResolvedQuery> {
        Ok(ResolvedQuery::new(
            self.paging,
            DEFAULT_PER_PAGE,
            self.sort_by.unwrap_or_default().as_str(),
            self.order.unwrap_or(SortOrder::Asc),
        )?
        .text("search", self.search.as_deref())
        .id("category_id", self.category_id))
    }
}
