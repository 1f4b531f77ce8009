use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

mod category;
mod pantry;
mod product;
mod shopping_list;
mod user;

pub use category::{Category, CategoryCreate, CategoryUpdate};
pub use pantry::{Pantry, PantryCreate, PantryItem, PantryItemCreate, PantryItemUpdate, PantryUpdate};
pub use product::{Product, ProductInput};
pub use shopping_list::{
    ListCompletion, ListItem, ListItemCreate, ListItemUpdate, PurchaseRequest, ShoppingList,
    ShoppingListCreate, ShoppingListUpdate, ToggleResponse,
};
pub use user::{AuthToken, Credentials, PasswordChange, ProfileUpdate, ShareRequest, User};

/// Server-assigned identity of every entity.
pub type EntityId = i64;

/// Anything a store can cache: cloneable, comparable, keyed by its ID.
pub trait Entity:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    fn id(&self) -> EntityId;
}

/// Reference to another entity by ID, as the API expects in request bodies
/// (`{ "product": { "id": 4 } }`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: EntityId,
}

impl From<EntityId> for IdRef {
    fn from(id: EntityId) -> Self {
        Self { id }
    }
}
