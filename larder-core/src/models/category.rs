use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Entity, EntityId};
use crate::error::ApiResult;
use crate::validate::{self, Validate};

/// Maximum category name length.
pub const MAX_NAME_LEN: usize = 50;

/// A product category (e.g. "Dairy", "Vegetables").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Category {
    /// Applies the fields present in `update`.
    pub fn apply(&mut self, update: &CategoryUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(metadata) = &update.metadata {
            self.metadata = Some(metadata.clone());
        }
    }
}

impl Entity for Category {
    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl CategoryCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: None,
        }
    }
}

impl Validate for CategoryCreate {
    fn validate(&self) -> ApiResult<()> {
        validate::required_text(&self.name, "Name", MAX_NAME_LEN)?;
        validate::metadata(self.metadata.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Validate for CategoryUpdate {
    fn validate(&self) -> ApiResult<()> {
        validate::optional_text(self.name.as_deref(), "Name", MAX_NAME_LEN)?;
        validate::metadata(self.metadata.as_ref())
    }
}
