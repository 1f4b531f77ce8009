use super::sort_keys;
use crate::error::ApiResult;
use crate::models::{Category, CategoryCreate, CategoryUpdate};
use crate::pagination::{ListQuery, PageRequest, ResolvedQuery, SortOrder, DEFAULT_PER_PAGE};
use crate::resource::Resource;

/// Marker for the categories resource.
#[derive(Debug, Clone, Copy)]
pub struct Categories;

impl Categories {
    /// Collection path.
    pub const PATH: &'static str = "/api/categories";
}

impl Resource for Categories {
    type Entity = Category;
    type Create = CategoryCreate;
    type Update = CategoryUpdate;
    type Query = CategoryQuery;

    const NAME: &'static str = "category";

    fn apply_update(entity: &mut Category, update: &CategoryUpdate) {
        entity.apply(update);
    }
}

sort_keys! {
    pub enum CategorySort {
        Name => "name",
        #[default]
        CreatedAt => "createdAt",
        UpdatedAt => "updatedAt",
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryQuery {
    pub name: Option<String>,
    pub paging: PageRequest,
    pub sort_by: Option<CategorySort>,
    pub order: Option<SortOrder>,
}

impl ListQuery for CategoryQuery {
    fn resolve(&self) -> ApiResult<ResolvedQuery> {
        Ok(ResolvedQuery::new(
            self.paging,
            DEFAULT_PER_PAGE,
            self.sort_by.unwrap_or_default().as_str(),
            self.order.unwrap_or(SortOrder::Asc),
        )?
        .text("name", self.name.as_deref()))
    }
}
