//! # pdfdesk
//!
//! Client-side logic shared by every pdfdesk tool. The PDF processing itself
//! happens on a remote service; this crate decides what gets sent there.
//!
//! ## Features
//!
//! - **Page ranges**: lenient parsing of inputs such as `"1,3-5,8"` and
//!   user-facing validation of the result
//! - **Workflow**: one state machine for every single-document tool, from
//!   loading a file to downloading the result
//! - **Tool catalogue**: endpoints, size limits and options (rotation angle,
//!   compression level, output format, split mode, signature placement)
//! - **Artifacts**: filenames from `Content-Disposition`, safe local writes
//! - **CV generator**: profile model and a plain-text fallback rendering
//!
//! ## Quick Start
//!
//! ```rust
//! use pdfdesk::ranges::{parse_page_ranges, validate_selection, SelectionMode};
//!
//! let selection = parse_page_ranges("1, 3-4", 5);
//! assert_eq!(selection.pages(), &[1, 3, 4]);
//!
//! let result = validate_selection("1, 3-4", &selection, Some(5), SelectionMode::Remove);
//! assert!(result.valid);
//! assert_eq!(result.message, "3 pages will be deleted, 2 will remain");
//! ```
//!
//! ### Driving a workflow
//!
//! ```rust
//! use pdfdesk::operations::OperationKind;
//! use pdfdesk::workflow::{Event, Workflow, WorkflowStatus};
//! use pdfdesk::{DocumentHandle, ResultArtifact};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut workflow = Workflow::for_operation(OperationKind::DeletePages)?;
//! workflow.apply(Event::Load(DocumentHandle::from_bytes("a.pdf", b"%PDF-1.7".to_vec())))?;
//! workflow.apply(Event::PageCountResolved(4))?;
//! workflow.apply(Event::EditRange("2".to_string()))?;
//! assert_eq!(workflow.apply(Event::Submit)?, WorkflowStatus::Confirming);
//! workflow.apply(Event::Confirm)?;
//!
//! // The backend call happens here
//! let artifact = ResultArtifact::new("a.pdf", "application/pdf", b"%PDF-1.7".to_vec());
//! assert_eq!(workflow.apply(Event::Completed(artifact))?, WorkflowStatus::Done);
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod cv;
pub mod document;
pub mod error;
pub mod library;
pub mod operations;
pub mod ranges;
pub mod workflow;

pub use artifact::ResultArtifact;
pub use cv::CvProfile;
pub use document::{DocumentHandle, DocumentSource, FileConstraintError, FileConstraints};
pub use error::{DeskError, Result};
pub use library::{StorageQuota, StoredFile};
pub use operations::{OperationKind, OperationOptions, ToolConfig};
pub use ranges::{parse_page_ranges, validate_selection, PageSelection, ValidationResult};
pub use workflow::{Event, Workflow, WorkflowState, WorkflowStatus};

/// Current version of pdfdesk
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
