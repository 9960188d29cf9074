use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};

/// Compression strength requested from the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Smallest quality loss
    Low,
    #[default]
    Medium,
    /// Smallest output, images are downsampled aggressively
    High,
}

impl CompressionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            CompressionLevel::Low => "low",
            CompressionLevel::Medium => "medium",
            CompressionLevel::High => "high",
        }
    }
}

impl std::str::FromStr for CompressionLevel {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(CompressionLevel::Low),
            "medium" | "recommended" => Ok(CompressionLevel::Medium),
            "high" | "extreme" => Ok(CompressionLevel::High),
            other => Err(DeskError::InvalidOption(format!(
                "Unknown compression level '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

impl std::fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
