mod auth;
mod category;
mod config_cmd;
mod list;
mod pantry;
mod product;

pub use auth::AuthCommand;
pub use category::CategoryCommand;
pub use config_cmd::ConfigCommand;
pub use list::ListCommand;
pub use pantry::PantryCommand;
pub use product::ProductCommand;

use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use std::io;
use std::sync::Arc;

use larder_core::{
    ApiError, FileTokenStore, Gateway, PageRequest, PaginationMeta, Session, TokenError,
};

use crate::config::Config;

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Errors surfaced by API-backed commands
#[derive(Debug)]
pub enum CommandError {
    /// The API (or client-side validation) rejected the request
    Api(ApiError),
    /// Token file could not be read or written
    Token(TokenError),
    /// I/O error
    Io(io::Error),
    /// Output could not be encoded
    Json(serde_json::Error),
    /// Bad command-line input
    Input(String),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Api(e) if e.is_unauthorized() => {
                write!(f, "{} (run 'larder auth login')", e)
            }
            CommandError::Api(e) if e.is_network() => write!(f, "{}", e),
            CommandError::Api(e) => match &e.code {
                Some(code) => write!(f, "{} [{} {}]", e, e.status, code),
                None => write!(f, "{} [{}]", e, e.status),
            },
            CommandError::Token(e) => write!(f, "Token error: {}", e),
            CommandError::Io(e) => write!(f, "I/O error: {}", e),
            CommandError::Json(e) => write!(f, "JSON error: {}", e),
            CommandError::Input(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<ApiError> for CommandError {
    fn from(e: ApiError) -> Self {
        CommandError::Api(e)
    }
}

impl From<TokenError> for CommandError {
    fn from(e: TokenError) -> Self {
        CommandError::Token(e)
    }
}

impl From<io::Error> for CommandError {
    fn from(e: io::Error) -> Self {
        CommandError::Io(e)
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(e: serde_json::Error) -> Self {
        CommandError::Json(e)
    }
}

/// Builds a session whose token lives in the configured data directory.
pub fn connect(config: &Config) -> Result<Session, CommandError> {
    let tokens = Arc::new(FileTokenStore::new(config.data_dir.value.clone()));
    let gateway = Gateway::new(config.gateway(), tokens)?;
    Ok(Session::new(gateway))
}

/// Page request from the `--page` flag and the configured page size.
pub fn paging(page: Option<u32>, config: &Config) -> PageRequest {
    PageRequest {
        page,
        per_page: Some(config.per_page.value),
    }
}

/// Parses a `--metadata` argument, which must be a JSON object.
pub fn parse_metadata(raw: Option<&str>) -> Result<Option<Value>, CommandError> {
    match raw {
        None => Ok(None),
        Some(raw) => {
            let value: Value = serde_json::from_str(raw)
                .map_err(|e| CommandError::Input(format!("Invalid metadata JSON: {}", e)))?;
            if !value.is_object() {
                return Err(CommandError::Input(
                    "Metadata must be a JSON object".to_string(),
                ));
            }
            Ok(Some(value))
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints a list page together with its pagination as one JSON document.
pub fn print_page_json<T: Serialize>(
    items: &[T],
    pagination: &PaginationMeta,
) -> Result<(), CommandError> {
    print_json(&serde_json::json!({
        "data": items,
        "pagination": pagination,
    }))
}

/// Footer line under a table.
pub fn print_pagination(pagination: &PaginationMeta) {
    println!("{}", "-".repeat(44));
    let mut line = format!(
        "Page {} of {} ({} total)",
        pagination.page,
        pagination.total_pages.max(1),
        pagination.total
    );
    if pagination.has_next {
        line.push_str(&format!(", next: --page {}", pagination.page + 1));
    }
    println!("{}", line);
}

/// Format a quantity, removing unnecessary decimal places.
pub fn format_quantity(qty: f64) -> String {
    if qty.fract() == 0.0 {
        format!("{}", qty as i64)
    } else {
        format!("{:.1}", qty)
    }
}
