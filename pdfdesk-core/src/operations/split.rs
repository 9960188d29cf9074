//! Split mode option

use crate::error::{DeskError, Result};

/// How the backend should cut the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// One output file per page
    EveryPage,
    /// Start a new file after each selected page
    AtPages,
    /// Files of N pages each, the last one possibly shorter
    Chunks(u32),
}

impl SplitMode {
    /// Whether the page range input is used by this mode
    pub fn uses_selection(self) -> bool {
        matches!(self, SplitMode::AtPages)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SplitMode::EveryPage => "every-page",
            SplitMode::AtPages => "at-pages",
            SplitMode::Chunks(_) => "chunks",
        }
    }

    pub(crate) fn form_fields(self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("mode", self.as_str().to_string())];
        if let SplitMode::Chunks(size) = self {
            fields.push(("chunkSize", size.to_string()));
        }
        fields
    }

    /// Parse a mode name, `chunk_size` is required for `chunks`
    pub fn parse(name: &str, chunk_size: Option<u32>) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "every-page" | "pages" | "each" => Ok(SplitMode::EveryPage),
            "at-pages" | "at" | "ranges" => Ok(SplitMode::AtPages),
            "chunks" | "chunk" => chunk_size.map(SplitMode::Chunks).ok_or_else(|| {
                DeskError::InvalidOption("Split into chunks needs a chunk size".to_string())
            }),
            other => Err(DeskError::InvalidOption(format!(
                "Unknown split mode '{other}' (expected every-page, at-pages or chunks)"
            ))),
        }
    }

    /// Number of files the split produces, when it can be told in advance
    pub fn expected_outputs(self, total_pages: u32, split_points: usize) -> u32 {
        match self {
            SplitMode::EveryPage => total_pages,
            SplitMode::AtPages => (split_points as u32 + 1).min(total_pages.max(1)),
            SplitMode::Chunks(0) => 0,
            SplitMode::Chunks(size) => total_pages.div_ceil(size),
        }
    }
}
