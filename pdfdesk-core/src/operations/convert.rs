use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};

/// Target format of the convert tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Docx,
    Xlsx,
    Pptx,
    Jpg,
    Png,
    Txt,
    Html,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 7] = [
        OutputFormat::Docx,
        OutputFormat::Xlsx,
        OutputFormat::Pptx,
        OutputFormat::Jpg,
        OutputFormat::Png,
        OutputFormat::Txt,
        OutputFormat::Html,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Pptx => "pptx",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Txt => "txt",
            OutputFormat::Html => "html",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            // Image conversions produce one image per page, bundled
            OutputFormat::Jpg | OutputFormat::Png => "zip",
            other => other.as_str(),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().trim_start_matches('.').to_ascii_lowercase();
        let wanted = match wanted.as_str() {
            "word" | "doc" => "docx",
            "excel" | "xls" => "xlsx",
            "powerpoint" | "ppt" => "pptx",
            "jpeg" => "jpg",
            "text" => "txt",
            "htm" => "html",
            other => other,
        };
        OutputFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| DeskError::InvalidOption(format!("Unsupported output format '{s}'")))
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
