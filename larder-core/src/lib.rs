//! Larder Core Library
//!
//! API models, the HTTP gateway and optimistic entity stores for the
//! Larder pantry and shopping-list service.

pub mod api;
pub mod error;
pub mod gateway;
pub mod models;
pub mod pagination;
pub mod resource;
pub mod session;
pub mod store;
pub mod validate;

pub use api::{
    Categories, CategoryQuery, CategorySort, ListItemActions, ListItemQuery, ListItemSort,
    ListItems, PantryItemQuery, PantryItemSort, PantryItems, PantryQuery, PantrySort, Pantries,
    ProductQuery, ProductSort, Products, Sharing, ShoppingListActions, ShoppingListQuery,
    ShoppingListSort, ShoppingLists, UsersApi,
};
pub use error::{ApiError, ApiResult, ErrorKind};
pub use gateway::{
    FileTokenStore, Gateway, GatewayConfig, MemoryTokenStore, TokenError, TokenStore,
};
pub use models::{
    Category, CategoryCreate, CategoryUpdate, Credentials, EntityId, ListItem, ListItemCreate,
    ListItemUpdate, Pantry, PantryCreate, PantryItem, PantryItemCreate, PantryItemUpdate,
    PantryUpdate, PasswordChange, Product, ProductInput, ProfileUpdate, ShoppingList,
    ShoppingListCreate, ShoppingListUpdate, User,
};
pub use pagination::{PageRequest, PaginationMeta, SortOrder};
pub use resource::{Endpoint, Remote, Resource, RestResource};
pub use session::{Session, SessionEvent};
pub use store::{CategoryGroup, ItemFilter, Status, Store};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
