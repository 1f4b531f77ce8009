//! Shopping lists and the items on them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Entity, EntityId, IdRef, Product, User};
use crate::error::ApiResult;
use crate::validate::{self, Validate};

/// Maximum shopping list name length.
pub const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub owner: User,
    #[serde(default)]
    pub shared_with: Vec<User>,
    /// Reported by the server; never derived on the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_purchased_at: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl ShoppingList {
    pub fn is_completed(&self) -> bool {
        self.completed.unwrap_or(false)
    }

    pub fn apply(&mut self, update: &ShoppingListUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(recurring) = update.recurring {
            self.recurring = Some(recurring);
        }
        if let Some(metadata) = &update.metadata {
            self.metadata = Some(metadata.clone());
        }
    }
}

impl Entity for ShoppingList {
    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingListCreate {
    pub name: String,
    /// Required by the API, may be empty.
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ShoppingListCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            recurring: None,
            metadata: None,
        }
    }
}

impl Validate for ShoppingListCreate {
    fn validate(&self) -> ApiResult<()> {
        validate::required_text(&self.name, "Name", MAX_NAME_LEN)?;
        validate::metadata(self.metadata.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ShoppingListUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Validate for ShoppingListUpdate {
    fn validate(&self) -> ApiResult<()> {
        validate::optional_text(self.name.as_deref(), "Name", MAX_NAME_LEN)?;
        validate::metadata(self.metadata.as_ref())
    }
}

/// Body of the purchase endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PurchaseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Validate for PurchaseRequest {
    fn validate(&self) -> ApiResult<()> {
        validate::metadata(self.metadata.as_ref())
    }
}

/// An entry on a shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: EntityId,
    pub quantity: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub purchased: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_purchased_at: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    pub product: Product,
}

impl ListItem {
    pub fn apply(&mut self, update: &ListItemUpdate) {
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(unit) = &update.unit {
            self.unit = unit.clone();
        }
        if let Some(metadata) = &update.metadata {
            self.metadata = Some(metadata.clone());
        }
    }

    pub fn category_id(&self) -> Option<EntityId> {
        self.product.category.as_ref().map(|c| c.id)
    }
}

impl Entity for ListItem {
    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItemCreate {
    pub product: IdRef,
    pub quantity: f64,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ListItemCreate {
    pub fn new(product_id: EntityId, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            product: IdRef::from(product_id),
            quantity,
            unit: unit.into(),
            metadata: None,
        }
    }
}

impl Validate for ListItemCreate {
    fn validate(&self) -> ApiResult<()> {
        validate::id(self.product.id, "product")?;
        validate::quantity(self.quantity)?;
        validate::required_text(&self.unit, "Unit", usize::MAX)?;
        validate::metadata(self.metadata.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ListItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Validate for ListItemUpdate {
    fn validate(&self) -> ApiResult<()> {
        if let Some(quantity) = self.quantity {
            validate::quantity(quantity)?;
        }
        validate::optional_text(self.unit.as_deref(), "Unit", usize::MAX)?;
        validate::metadata(self.metadata.as_ref())
    }
}

/// Completion state of a list, as reported alongside a toggled item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCompletion {
    pub id: EntityId,
    pub completed: bool,
}

/// Response of the toggle-purchased endpoint. Newer servers wrap the item
/// and report the parent list's completion; older ones return the bare item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ToggleResponse {
    Wrapped {
        item: ListItem,
        #[serde(default)]
        list: Option<ListCompletion>,
    },
    Bare(ListItem),
}

impl ToggleResponse {
    pub fn item(&self) -> &ListItem {
        match self {
            ToggleResponse::Wrapped { item, .. } => item,
            ToggleResponse::Bare(item) => item,
        }
    }

    pub fn into_parts(self) -> (ListItem, Option<ListCompletion>) {
        match self {
            ToggleResponse::Wrapped { item, list } => (item, list),
            ToggleResponse::Bare(item) => (item, None),
        }
    }
}
