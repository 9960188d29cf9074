//! "My files" listing types as returned by the backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file kept in the user's server-side storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_content_type() -> String {
    crate::document::PDF_MIME.to_string()
}

/// Storage usage of the current account, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageQuota {
    pub used: u64,
    pub limit: u64,
}

impl StorageQuota {
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }

    pub fn can_store(&self, size: u64) -> bool {
        size <= self.remaining()
    }

    /// Used share of the quota in percent, capped at 100
    pub fn percent_used(&self) -> f64 {
        if self.limit == 0 {
            return 100.0;
        }
        (self.used as f64 / self.limit as f64 * 100.0).min(100.0)
    }
}
