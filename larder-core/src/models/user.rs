use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Entity, EntityId};
use crate::error::ApiResult;
use crate::validate::{self, Validate};

/// Maximum length of a user's name and surname.
pub const MAX_NAME_LEN: usize = 50;

/// A user as embedded in pantries and shopping lists (owner, shared-with).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub email: String,
    pub name: String,
    pub surname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname).trim().to_string()
    }
}

impl Entity for User {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Login credentials.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Validate for Credentials {
    fn validate(&self) -> ApiResult<()> {
        validate::email(&self.email)?;
        validate::password(&self.password)
    }
}

/// Token issued by the login endpoint. Opaque to the client.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthToken {
    pub token: String,
}

/// Replacement profile for the logged-in user. Name and surname are both
/// required by the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub surname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ProfileUpdate {
    /// Starts from `user`'s current profile.
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            surname: user.surname.clone(),
            metadata: user.metadata.clone(),
        }
    }
}

impl Validate for ProfileUpdate {
    fn validate(&self) -> ApiResult<()> {
        validate::required_text(&self.name, "Name", MAX_NAME_LEN)?;
        validate::required_text(&self.surname, "Surname", MAX_NAME_LEN)?;
        validate::metadata(self.metadata.as_ref())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl Validate for PasswordChange {
    fn validate(&self) -> ApiResult<()> {
        validate::password(&self.current_password)?;
        validate::password(&self.new_password)
    }
}

/// Body of the share endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ShareRequest {
    pub email: String,
}

impl Validate for ShareRequest {
    fn validate(&self) -> ApiResult<()> {
        validate::email(&self.email)
    }
}
