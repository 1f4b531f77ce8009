use super::sort_keys;
use crate::error::ApiResult;
use crate::models::{EntityId, Product, ProductInput};
use crate::pagination::{ListQuery, PageRequest, ResolvedQuery, SortOrder, DEFAULT_PER_PAGE};
use crate::resource::Resource;

/// Marker for the products resource. Create and update share one payload.
#[derive(Debug, Clone, Copy)]
pub struct Products;

impl Products {
    /// Collection path.
    pub const PATH: &'static str = "/api/products";
}

impl Resource for Products {
    type Entity = Product;
    type Create = ProductInput;
    type Update = ProductInput;
    type Query = ProductQuery;

    const NAME: &'static str = "product";

    fn apply_update(entity: &mut Product, update: &ProductInput) {
        entity.apply(update);
    }
}

sort_keys! {
    pub enum ProductSort {
        #[default]
        Name => "name",
        CategoryName => "categoryName",
        CreatedAt => "createdAt",
        UpdatedAt => "updatedAt",
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub name: Option<String>,
    pub category_id: Option<EntityId>,
    pub pantry_id: Option<EntityId>,
    pub paging: PageRequest,
    pub sort_by: Option<ProductSort>,
    pub order: Option<SortOrder>,
}

impl ListQuery for ProductQuery {
    fn resolve(&self) -> ApiResult<ResolvedQuery> {
        Ok(ResolvedQuery::new(
            self.paging,
            DEFAULT_PER_PAGE,
            self.sort_by.unwrap_or_default().as_str(),
            self.order.unwrap_or(SortOrder::Asc),
        )?
        .text("name", self.name.as_deref())
        .id("category_id", self.category_id)
        .id("pantry_id", self.pantry_id))
    }
}
