//! Bearer token persistence.
//!
//! The token is opaque to the client: it is stored exactly as the login
//! endpoint returned it and attached to every request while present.
//!
//! Storage layout:
//! ```text
//! ~/.local/share/larder/
//! └── auth_token                     # text file with the bearer token
//! ```

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::RwLock;

use thiserror::Error;

/// Filename for the stored token.
const TOKEN_FILE: &str = "auth_token";

/// Errors that can occur while reading or writing a token.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("IO error at {0}: {1}")]
    Io(PathBuf, #[source] io::Error),
}

/// Somewhere to keep the session token between requests.
pub trait TokenStore: Send + Sync {
    /// Returns the stored token, or `None` when logged out.
    fn load(&self) -> Result<Option<String>, TokenError>;

    fn save(&self, token: &str) -> Result<(), TokenError>;

    /// Discards the token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), TokenError>;
}

/// Token kept in a text file inside the data directory.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    data_dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Returns the path to the token file.
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(TOKEN_FILE)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, TokenError> {
        let path = self.path();
        match fs::read_to_string(&path) {
            Ok(content) => {
                let token = content.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TokenError::Io(path, e)),
        }
    }

    fn save(&self, token: &str) -> Result<(), TokenError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| TokenError::Io(self.data_dir.clone(), e))?;

        let path = self.path();
        fs::write(&path, token).map_err(|e| TokenError::Io(path, e))
    }

    fn clear(&self) -> Result<(), TokenError> {
        let path = self.path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TokenError::Io(path, e)),
        }
    }
}

/// Token held in memory only. Used by tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenError> {
        Ok(self.token.read().map(|t| t.clone()).unwrap_or_default())
    }

    fn save(&self, token: &str) -> Result<(), TokenError> {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenError> {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
        Ok(())
    }
}
