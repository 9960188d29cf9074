//! Fill & sign placement

use crate::error::{DeskError, Result};

/// Where the signature image is stamped, in PDF points from the bottom-left
/// corner of the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignaturePlacement {
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
}

impl Default for SignaturePlacement {
    fn default() -> Self {
        Self {
            page: 1,
            x: 72.0,
            y: 72.0,
            width: 150.0,
        }
    }
}

impl SignaturePlacement {
    pub fn check(&self, total_pages: u32) -> Result<()> {
        if self.page == 0 || self.page > total_pages {
            return Err(DeskError::InvalidOption(format!(
                "Signature page {} is outside the document (1-{})",
                self.page, total_pages
            )));
        }
        if self.x.is_nan() || self.y.is_nan() || self.x < 0.0 || self.y < 0.0 {
            return Err(DeskError::InvalidOption(
                "Signature position must not be negative".to_string(),
            ));
        }
        if self.width.is_nan() || self.width <= 0.0 {
            return Err(DeskError::InvalidOption(
                "Signature width must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("x", self.x.to_string()),
            ("y", self.y.to_string()),
            ("width", self.width.to_string()),
        ]
    }
}
