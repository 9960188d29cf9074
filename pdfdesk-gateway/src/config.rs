//! Gateway configuration from the environment
//!
//! Binaries call `dotenvy::dotenv().ok()` first so a local `.env` file can
//! provide the same variables.

use crate::auth::TokenStore;
use crate::error::{GatewayError, Result};
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

pub const API_URL_VAR: &str = "PDFDESK_API_URL";
pub const TOKEN_FILE_VAR: &str = "PDFDESK_TOKEN_FILE";
pub const AUTH_TOKEN_VAR: &str = "PDFDESK_AUTH_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL of the processing service, without a trailing slash
    pub api_url: String,
    pub token_file: PathBuf,
    /// Explicit token, takes precedence over the token file
    pub token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_file: default_token_file(),
            token: None,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from any variable lookup, empty values count as unset
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = Self::default();
        if let Some(url) = get(API_URL_VAR) {
            config = config.with_api_url(url)?;
        }
        if let Some(path) = get(TOKEN_FILE_VAR) {
            config.token_file = PathBuf::from(path);
        }
        config.token = get(AUTH_TOKEN_VAR);

        tracing::debug!(api_url = %config.api_url, token_file = %config.token_file.display(), "gateway configuration loaded");
        Ok(config)
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(GatewayError::Config(format!(
                "API URL must start with http:// or https://, got '{url}'"
            )));
        }
        self.api_url = trimmed.to_string();
        Ok(self)
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        if token.is_some() {
            self.token = token;
        }
        self
    }

    pub fn token_store(&self) -> TokenStore {
        TokenStore::new(&self.token_file)
    }

    /// The explicit token if set, otherwise whatever the token file holds
    pub fn resolve_token(&self) -> Result<Option<String>> {
        match &self.token {
            Some(token) => Ok(Some(token.clone())),
            None => self.token_store().load(),
        }
    }
}

/// `<config dir>/pdfdesk/auth.json`, or a dot file in the working directory
/// when the platform has no config directory
pub fn default_token_file() -> PathBuf {
    directories::ProjectDirs::from("", "", "pdfdesk")
        .map(|dirs| dirs.config_dir().join("auth.json"))
        .unwrap_or_else(|| PathBuf::from(".pdfdesk-auth.json"))
}
