//! Client-side checks for the merge tool

use super::OperationKind;
use crate::document::{DocumentHandle, FileConstraints};
use crate::error::{DeskError, Result};

pub const MIN_MERGE_FILES: usize = 2;

/// Validate the documents queued for a merge, in the order they will be
/// joined. Every file must pass the merge size limit and be a PDF.
pub fn check_merge_inputs(documents: &[DocumentHandle]) -> Result<()> {
    if documents.len() < MIN_MERGE_FILES {
        return Err(DeskError::InvalidInput(format!(
            "At least {MIN_MERGE_FILES} PDF files are required for merging"
        )));
    }

    let constraints = FileConstraints::pdf(OperationKind::Merge.max_file_size());
    for document in documents {
        constraints.check(document)?;
    }
    Ok(())
}
