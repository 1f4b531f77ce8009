//! Authentication and profile endpoints.

use serde_json::Value;

use crate::error::ApiResult;
use crate::gateway::Gateway;
use crate::models::{AuthToken, Credentials, PasswordChange, ProfileUpdate, User};
use crate::validate::Validate;

const LOGIN_PATH: &str = "/api/users/login";
const LOGOUT_PATH: &str = "/api/users/logout";
const PROFILE_PATH: &str = "/api/users/profile";
const CHANGE_PASSWORD_PATH: &str = "/api/users/change-password";

#[derive(Debug, Clone)]
pub struct UsersApi {
    gateway: Gateway,
}

impl UsersApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Exchanges credentials for a token. The token is returned, not stored.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<AuthToken> {
        credentials.validate()?;
        self.gateway.post(LOGIN_PATH, credentials).await
    }

    /// Invalidates the token server-side.
    pub async fn logout(&self) -> ApiResult<()> {
        let _: Value = self.gateway.post_empty(LOGOUT_PATH).await?;
        Ok(())
    }

    pub async fn profile(&self) -> ApiResult<User> {
        self.gateway.get(PROFILE_PATH).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
        update.validate()?;
        self.gateway.put(PROFILE_PATH, update).await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> ApiResult<()> {
        change.validate()?;
        let _: Value = self.gateway.post(CHANGE_PASSWORD_PATH, change).await?;
        Ok(())
    }
}
