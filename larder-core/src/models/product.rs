use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Category, Entity, EntityId, IdRef};
use crate::error::{ApiError, ApiResult};
use crate::validate::{self, Validate};

/// Maximum product name length.
pub const MAX_NAME_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub category: Option<Category>,
}

impl Product {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    /// Applies `input` locally. A category is only known by ID at this
    /// point, so the embedded category is kept unless it no longer matches.
    pub fn apply(&mut self, input: &ProductInput) {
        self.name = input.name.trim().to_string();
        if let Some(metadata) = &input.metadata {
            self.metadata = Some(metadata.clone());
        }
        match input.category {
            Some(IdRef { id }) if self.category.as_ref().map(|c| c.id) != Some(id) => {
                self.category = None;
            }
            _ => {}
        }
    }
}

impl Entity for Product {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Body for both creating and updating a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<IdRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ProductInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            metadata: None,
        }
    }

    pub fn with_category(mut self, category_id: EntityId) -> Self {
        self.category = Some(IdRef::from(category_id));
        self
    }
}

impl Validate for ProductInput {
    fn validate(&self) -> ApiResult<()> {
        validate::required_text(self.name.trim(), "Product name", MAX_NAME_LEN)?;
        if let Some(category) = self.category {
            if category.id < 1 {
                return Err(ApiError::validation("The selected category is not valid"));
            }
        }
        validate::metadata(self.metadata.as_ref())
    }
}
