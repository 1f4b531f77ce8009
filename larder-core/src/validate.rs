//! Client-side payload validation.
//!
//! These checks mirror the server's constraints so obviously bad requests
//! fail fast, without a round trip, and with the same error shape the server
//! would produce.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::models::EntityId;

/// Minimum password length accepted by the server.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A payload that can be checked before it is sent.
pub trait Validate {
    fn validate(&self) -> ApiResult<()>;
}

/// Entity and parent identifiers are server-assigned positive integers.
pub fn id(value: EntityId, what: &str) -> ApiResult<()> {
    if value < 1 {
        return Err(ApiError::validation(format!("Invalid {} ID", what)));
    }
    Ok(())
}

/// A required string: must contain a non-whitespace character and fit `max`.
pub fn required_text(value: &str, field: &str, max: usize) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    if value.chars().count() > max {
        return Err(ApiError::validation(format!(
            "{} cannot exceed {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Same as [`required_text`] but only when the field is present.
pub fn optional_text(value: Option<&str>, field: &str, max: usize) -> ApiResult<()> {
    match value {
        Some(v) => required_text(v, field, max),
        None => Ok(()),
    }
}

pub fn quantity(value: f64) -> ApiResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ApiError::validation(
            "Quantity must be a number greater than 0",
        ));
    }
    Ok(())
}

/// Metadata is optional, but when present it must be a JSON object (or null).
pub fn metadata(value: Option<&Value>) -> ApiResult<()> {
    match value {
        None | Some(Value::Null) | Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(ApiError::validation("Metadata must be a JSON object")),
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

pub fn email(value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if !email_regex().is_match(value.trim()) {
        return Err(ApiError::validation("Email format is invalid"));
    }
    Ok(())
}

pub fn password(value: &str) -> ApiResult<()> {
    if value.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
