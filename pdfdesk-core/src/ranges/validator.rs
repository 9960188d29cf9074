//! User-facing validation of page selections

use super::{format_runs, pages_beyond, PageSelection};
use serde::{Deserialize, Serialize};

/// How an operation treats the selected pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Selected pages are removed from the document
    Remove,
    /// Selected pages are the ones the operation acts on
    Select,
}

impl SelectionMode {
    fn verb(self) -> &'static str {
        match self {
            SelectionMode::Remove => "delete",
            SelectionMode::Select => "select",
        }
    }
}

/// Machine-readable reason a selection was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    EmptyInput,
    NoDocument,
    NoValidPages,
    OutOfBounds,
    AllPagesSelected,
}

impl ValidationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationCode::EmptyInput => "EMPTY_INPUT",
            ValidationCode::NoDocument => "NO_DOCUMENT",
            ValidationCode::NoValidPages => "NO_VALID_PAGES",
            ValidationCode::OutOfBounds => "OUT_OF_BOUNDS",
            ValidationCode::AllPagesSelected => "ALL_PAGES_SELECTED",
        }
    }
}

impl std::fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ValidationCode>,
}

impl ValidationResult {
    fn ok(message: String) -> Self {
        Self {
            valid: true,
            message,
            code: None,
        }
    }

    fn reject(code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            code: Some(code),
        }
    }
}

/// Check a page selection against the loaded document.
///
/// `input` is the raw text the user typed and `parsed` the result of
/// [`parse_page_ranges`](super::parse_page_ranges) on it. `total_pages` is
/// `None` while no document is loaded. Rules are evaluated in order and the
/// first failing one decides the result.
pub fn validate_selection(
    input: &str,
    parsed: &PageSelection,
    total_pages: Option<u32>,
    mode: SelectionMode,
) -> ValidationResult {
    if input.trim().is_empty() {
        return ValidationResult::reject(
            ValidationCode::EmptyInput,
            format!("Please specify pages to {}", mode.verb()),
        );
    }

    let Some(total) = total_pages else {
        return ValidationResult::reject(ValidationCode::NoDocument, "Please upload a file first");
    };

    if parsed.is_empty() {
        return ValidationResult::reject(
            ValidationCode::NoValidPages,
            "No valid pages found in range",
        );
    }

    let beyond = pages_beyond(input, total);
    if !beyond.is_empty() {
        return ValidationResult::reject(
            ValidationCode::OutOfBounds,
            format!(
                "Pages {} exceed the document length ({} pages)",
                format_runs(&beyond),
                total
            ),
        );
    }

    let count = parsed.len();
    match mode {
        SelectionMode::Remove if parsed.covers_all(total) => ValidationResult::reject(
            ValidationCode::AllPagesSelected,
            "Cannot delete all pages. At least one page must remain",
        ),
        SelectionMode::Remove => ValidationResult::ok(format!(
            "{} {} will be deleted, {} will remain",
            count,
            plural(count),
            total as usize - count
        )),
        SelectionMode::Select => {
            ValidationResult::ok(format!("{} of {} pages selected", count, total))
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "page"
    } else {
        "pages"
    }
}
