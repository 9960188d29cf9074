use super::Configuration;
use crate::operations::{OperationOptions, SplitMode};
use crate::ranges::PageSelection;

/// Effect of a configuration on the document, shown before processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectPreview {
    /// Pages the operation touches
    pub affected: PageSelection,
    /// Page count of the output, when the operation produces a single PDF
    pub resulting_pages: Option<u32>,
    pub summary: String,
}

impl EffectPreview {
    pub(crate) fn of(configuration: &Configuration) -> Self {
        let total = configuration.page_count;
        let selection = &configuration.selection;
        let count = selection.len() as u32;

        match &configuration.options {
            OperationOptions::DeletePages => Self {
                affected: selection.clone(),
                resulting_pages: Some(total - count),
                summary: format!(
                    "Pages {} will be removed, {} of {} pages remain",
                    selection,
                    total - count,
                    total
                ),
            },
            OperationOptions::ExtractPages => Self {
                affected: selection.clone(),
                resulting_pages: Some(count),
                summary: format!("Pages {} will be copied into a new {}-page PDF", selection, count),
            },
            OperationOptions::Rotate { angle } => Self {
                affected: selection.clone(),
                resulting_pages: Some(total),
                summary: format!(
                    "Pages {} will be rotated {} degrees clockwise",
                    selection,
                    angle.to_degrees()
                ),
            },
            OperationOptions::Split { mode } => {
                let files = mode.expected_outputs(total, selection.len());
                let summary = match mode {
                    SplitMode::EveryPage => format!("The document will be split into {files} single-page files"),
                    SplitMode::AtPages => format!(
                        "The document will be split after pages {} into {} files",
                        selection, files
                    ),
                    SplitMode::Chunks(size) => format!(
                        "The document will be split into {files} files of up to {size} pages"
                    ),
                };
                Self {
                    affected: PageSelection::all(total),
                    resulting_pages: None,
                    summary,
                }
            }
            OperationOptions::Compress { level } => Self {
                affected: PageSelection::all(total),
                resulting_pages: Some(total),
                summary: format!("All {total} pages will be compressed ({level})"),
            },
            OperationOptions::Convert { format } => Self {
                affected: PageSelection::all(total),
                resulting_pages: None,
                summary: format!("All {total} pages will be converted to {format}"),
            },
            OperationOptions::Sign { placement } => Self {
                affected: PageSelection::from_pages([placement.page]),
                resulting_pages: Some(total),
                summary: format!("The signature will be placed on page {}", placement.page),
            },
        }
    }
}
