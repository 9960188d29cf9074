//! Tool catalogue
//!
//! Each PDF tool offered by the backend is an [`OperationKind`]. A
//! [`ToolConfig`] holds the client-side parameters of a tool (size limit,
//! confirmation step) and [`OperationOptions`] the values the user picks.

pub mod compress;
pub mod convert;
pub mod merge;
pub mod rotate;
pub mod sign;
pub mod split;

pub use compress::CompressionLevel;
pub use convert::OutputFormat;
pub use merge::{check_merge_inputs, MIN_MERGE_FILES};
pub use rotate::RotationAngle;
pub use sign::SignaturePlacement;
pub use split::SplitMode;

use crate::document::{FileConstraints, MB};
use crate::error::{DeskError, Result};
use crate::ranges::SelectionMode;
use serde::{Deserialize, Serialize};

/// Operations offered by the processing backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    DeletePages,
    ExtractPages,
    Rotate,
    Split,
    Compress,
    Convert,
    Merge,
    Sign,
    GenerateCv,
}

impl OperationKind {
    pub const ALL: [OperationKind; 9] = [
        OperationKind::DeletePages,
        OperationKind::ExtractPages,
        OperationKind::Rotate,
        OperationKind::Split,
        OperationKind::Compress,
        OperationKind::Convert,
        OperationKind::Merge,
        OperationKind::Sign,
        OperationKind::GenerateCv,
    ];

    /// Path of the processing endpoint, relative to the API base URL
    pub fn endpoint(self) -> &'static str {
        match self {
            OperationKind::DeletePages => "/api/pdf/delete-pages",
            OperationKind::ExtractPages => "/api/pdf/extract-pages",
            OperationKind::Rotate => "/api/pdf/rotate",
            OperationKind::Split => "/api/pdf/split",
            OperationKind::Compress => "/api/pdf/compress",
            OperationKind::Convert => "/api/pdf/convert",
            OperationKind::Merge => "/api/pdf/merge",
            OperationKind::Sign => "/api/pdf/sign",
            OperationKind::GenerateCv => "/api/cv/generate",
        }
    }

    /// Filename used when the response carries no `Content-Disposition`
    pub fn default_filename(self) -> &'static str {
        match self {
            OperationKind::DeletePages => "pages-deleted.pdf",
            OperationKind::ExtractPages => "extracted-pages.pdf",
            OperationKind::Rotate => "rotated.pdf",
            OperationKind::Split => "split.zip",
            OperationKind::Compress => "compressed.pdf",
            OperationKind::Convert => "converted",
            OperationKind::Merge => "merged.pdf",
            OperationKind::Sign => "signed.pdf",
            OperationKind::GenerateCv => "cv.pdf",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OperationKind::DeletePages => "Delete pages",
            OperationKind::ExtractPages => "Extract pages",
            OperationKind::Rotate => "Rotate pages",
            OperationKind::Split => "Split PDF",
            OperationKind::Compress => "Compress PDF",
            OperationKind::Convert => "Convert PDF",
            OperationKind::Merge => "Merge PDFs",
            OperationKind::Sign => "Fill & sign",
            OperationKind::GenerateCv => "CV generator",
        }
    }

    /// Upload limit per input file
    pub fn max_file_size(self) -> u64 {
        match self {
            OperationKind::DeletePages | OperationKind::ExtractPages | OperationKind::Rotate => {
                50 * MB
            }
            OperationKind::Split | OperationKind::Compress => 100 * MB,
            OperationKind::Convert => 25 * MB,
            OperationKind::Merge => 50 * MB,
            OperationKind::Sign | OperationKind::GenerateCv => 10 * MB,
        }
    }

    /// Destructive operations ask the user before anything is sent
    pub fn requires_confirmation(self) -> bool {
        matches!(self, OperationKind::DeletePages)
    }

    /// Whether the operation runs through the single-document workflow
    pub fn is_single_document(self) -> bool {
        !matches!(self, OperationKind::Merge | OperationKind::GenerateCv)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Client-side parameters of one tool screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub kind: OperationKind,
    pub max_file_size: u64,
    pub requires_confirmation: bool,
}

impl ToolConfig {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            max_file_size: kind.max_file_size(),
            requires_confirmation: kind.requires_confirmation(),
        }
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn constraints(&self) -> FileConstraints {
        FileConstraints::pdf(self.max_file_size)
    }

    /// Options a freshly loaded document starts with, `None` for tools
    /// that do not work on a single document
    pub fn default_options(&self) -> Option<OperationOptions> {
        let options = match self.kind {
            OperationKind::DeletePages => OperationOptions::DeletePages,
            OperationKind::ExtractPages => OperationOptions::ExtractPages,
            OperationKind::Rotate => OperationOptions::Rotate {
                angle: RotationAngle::Clockwise90,
            },
            OperationKind::Split => OperationOptions::Split {
                mode: SplitMode::EveryPage,
            },
            OperationKind::Compress => OperationOptions::Compress {
                level: CompressionLevel::default(),
            },
            OperationKind::Convert => OperationOptions::Convert {
                format: OutputFormat::default(),
            },
            OperationKind::Sign => OperationOptions::Sign {
                placement: SignaturePlacement::default(),
            },
            OperationKind::Merge | OperationKind::GenerateCv => return None,
        };
        Some(options)
    }
}

/// Values picked by the user for a single-document operation
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOptions {
    DeletePages,
    ExtractPages,
    Rotate { angle: RotationAngle },
    Split { mode: SplitMode },
    Compress { level: CompressionLevel },
    Convert { format: OutputFormat },
    Sign { placement: SignaturePlacement },
}

impl OperationOptions {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationOptions::DeletePages => OperationKind::DeletePages,
            OperationOptions::ExtractPages => OperationKind::ExtractPages,
            OperationOptions::Rotate { .. } => OperationKind::Rotate,
            OperationOptions::Split { .. } => OperationKind::Split,
            OperationOptions::Compress { .. } => OperationKind::Compress,
            OperationOptions::Convert { .. } => OperationKind::Convert,
            OperationOptions::Sign { .. } => OperationKind::Sign,
        }
    }

    /// How the page range input is interpreted, `None` when the operation
    /// takes no page range
    pub fn selection_mode(&self) -> Option<SelectionMode> {
        match self {
            OperationOptions::DeletePages => Some(SelectionMode::Remove),
            OperationOptions::ExtractPages | OperationOptions::Rotate { .. } => {
                Some(SelectionMode::Select)
            }
            OperationOptions::Split { mode } => mode.uses_selection().then_some(SelectionMode::Select),
            OperationOptions::Compress { .. }
            | OperationOptions::Convert { .. }
            | OperationOptions::Sign { .. } => None,
        }
    }

    /// Checks that depend on the page count but not on the range input
    pub fn check(&self, total_pages: u32) -> Result<()> {
        match self {
            OperationOptions::Split {
                mode: SplitMode::Chunks(size),
            } => {
                if *size == 0 {
                    return Err(DeskError::InvalidOption(
                        "Chunk size must be at least 1".to_string(),
                    ));
                }
                Ok(())
            }
            OperationOptions::Sign { placement } => placement.check(total_pages),
            _ => Ok(()),
        }
    }

    /// Operation parameters as form fields, excluding the document and the
    /// page list
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            OperationOptions::DeletePages | OperationOptions::ExtractPages => Vec::new(),
            OperationOptions::Rotate { angle } => vec![("angle", angle.to_degrees().to_string())],
            OperationOptions::Split { mode } => mode.form_fields(),
            OperationOptions::Compress { level } => vec![("level", level.as_str().to_string())],
            OperationOptions::Convert { format } => vec![("format", format.as_str().to_string())],
            OperationOptions::Sign { placement } => placement.form_fields(),
        }
    }

    /// Fallback output name, specific to the chosen options
    pub fn default_filename(&self) -> String {
        match self {
            OperationOptions::Convert { format } => format!("converted.{}", format.extension()),
            _ => self.kind().default_filename().to_string(),
        }
    }
}
