use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Entity, EntityId, IdRef, Product, User};
use crate::error::ApiResult;
use crate::validate::{self, Validate};

/// Maximum pantry name and unit length.
pub const MAX_NAME_LEN: usize = 50;
pub const MAX_UNIT_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pantry {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    pub owner: User,
    #[serde(default)]
    pub shared_with: Option<Vec<User>>,
}

impl Pantry {
    pub fn is_shared(&self) -> bool {
        self.shared_with.as_ref().is_some_and(|users| !users.is_empty())
    }

    pub fn apply(&mut self, update: &PantryUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(metadata) = &update.metadata {
            self.metadata = Some(metadata.clone());
        }
    }
}

impl Entity for Pantry {
    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PantryCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl PantryCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: None,
        }
    }
}

impl Validate for PantryCreate {
    fn validate(&self) -> ApiResult<()> {
        validate::required_text(&self.name, "Name", MAX_NAME_LEN)?;
        validate::metadata(self.metadata.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PantryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Validate for PantryUpdate {
    fn validate(&self) -> ApiResult<()> {
        validate::optional_text(self.name.as_deref(), "Name", MAX_NAME_LEN)?;
        validate::metadata(self.metadata.as_ref())
    }
}

/// A product stocked in a pantry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryItem {
    pub id: EntityId,
    pub quantity: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub product: Product,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl PantryItem {
    pub fn apply(&mut self, update: &PantryItemUpdate) {
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
}

impl Entity for PantryItem {
    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PantryItemCreate {
    pub product: IdRef,
    pub quantity: f64,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl PantryItemCreate {
    pub fn new(product_id: EntityId, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            product: IdRef::from(product_id),
            quantity,
            unit: unit.into(),
            metadata: None,
        }
    }
}

impl Validate for PantryItemCreate {
    fn validate(&self) -> ApiResult<()> {
        validate::id(self.product.id, "product")?;
        validate::quantity(self.quantity)?;
        validate::required_text(&self.unit, "Unit", MAX_UNIT_LEN)?;
        validate::metadata(self.metadata.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PantryItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Validate for PantryItemUpdate {
    fn validate(&self) -> ApiResult<()> {
        if let Some(quantity) = self.quantity {
            validate::quantity(quantity)?;
        }
        validate::optional_text(self.unit.as_deref(), "Unit", MAX_UNIT_LEN)?;
        validate::metadata(self.metadata.as_ref())
    }
}
