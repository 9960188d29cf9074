//! Bearer token persistence

use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    #[serde(rename = "authToken")]
    auth_token: String,
}

/// JSON file holding the token used for `Authorization: Bearer`
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when no token has been stored
    pub fn load(&self) -> Result<Option<String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredToken = serde_json::from_str(&content).map_err(|e| {
            GatewayError::Config(format!("{} is not a token file: {e}", self.path.display()))
        })?;
        Ok(Some(stored.auth_token).filter(|t| !t.is_empty()))
    }

    pub fn store(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(GatewayError::Config("Refusing to store an empty token".to_string()));
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let body = serde_json::to_string(&StoredToken {
            auth_token: token.to_string(),
        })
        .map_err(|e| GatewayError::Config(e.to_string()))?;
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // mode() only applies to new files; tighten one left by an older run
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(body.as_bytes())?;

        tracing::info!(path = %self.path.display(), "auth token stored");
        Ok(())
    }

    /// Remove the token file. Clearing an absent token is not an error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "auth token cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
