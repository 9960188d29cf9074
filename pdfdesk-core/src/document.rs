//! Document handles and client-side file checks
//!
//! A [`DocumentHandle`] describes the file a tool works on. Its content is
//! never parsed locally; the backend is asked for anything beyond name, size
//! and MIME type.

use crate::error::Result;
use crate::library::StoredFile;
use std::path::Path;
use thiserror::Error;

pub const PDF_MIME: &str = "application/pdf";
pub const PNG_MIME: &str = "image/png";
pub const JPEG_MIME: &str = "image/jpeg";
const OCTET_STREAM: &str = "application/octet-stream";

/// One mebibyte, the unit tool size limits are expressed in
pub const MB: u64 = 1024 * 1024;

/// Where the document bytes live
#[derive(Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Read from the local disk and sent along with each request
    Bytes(Vec<u8>),
    /// Previously uploaded to "my files" and referenced by id
    Stored { id: String },
}

impl std::fmt::Debug for DocumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentSource::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            DocumentSource::Stored { id } => f.debug_struct("Stored").field("id", id).finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    name: String,
    size: u64,
    mime_type: String,
    source: DocumentSource,
}

impl DocumentHandle {
    /// Wrap in-memory bytes. The MIME type comes from the PDF signature when
    /// present, otherwise from the file extension.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = detect_mime(&name, &bytes);
        Self {
            size: bytes.len() as u64,
            name,
            mime_type,
            source: DocumentSource::Bytes(bytes),
        }
    }

    /// Read a local file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        tracing::debug!(path = %path.display(), size = bytes.len(), "opened local document");
        Ok(Self::from_bytes(name, bytes))
    }

    /// Reference a file that already lives in "my files"
    pub fn from_stored(file: &StoredFile) -> Self {
        Self {
            name: file.name.clone(),
            size: file.size,
            mime_type: file.content_type.clone(),
            source: DocumentSource::Stored {
                id: file.id.clone(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == PDF_MIME
    }
}

fn detect_mime(name: &str, bytes: &[u8]) -> String {
    if bytes.starts_with(b"%PDF-") {
        return PDF_MIME.to_string();
    }
    mime_guess::from_path(name)
        .first_raw()
        .unwrap_or(OCTET_STREAM)
        .to_string()
}

/// Client-side checks a file must pass before it is accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConstraints {
    pub max_size: u64,
    pub accepted_types: &'static [&'static str],
}

impl FileConstraints {
    pub fn pdf(max_size: u64) -> Self {
        Self {
            max_size,
            accepted_types: &[PDF_MIME],
        }
    }

    /// Signature images
    pub fn image(max_size: u64) -> Self {
        Self {
            max_size,
            accepted_types: &[PNG_MIME, JPEG_MIME],
        }
    }

    pub fn check(&self, document: &DocumentHandle) -> std::result::Result<(), FileConstraintError> {
        if !self.accepted_types.iter().any(|t| *t == document.mime_type()) {
            return Err(FileConstraintError::UnsupportedType {
                name: document.name().to_string(),
                mime_type: document.mime_type().to_string(),
                expected: self.accepted_types.join(", "),
            });
        }
        if document.size() == 0 {
            return Err(FileConstraintError::Empty(document.name().to_string()));
        }
        if document.size() > self.max_size {
            return Err(FileConstraintError::TooLarge {
                name: document.name().to_string(),
                size: document.size(),
                limit: self.max_size,
            });
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileConstraintError {
    #[error("{name} has type {mime_type}, expected {expected}")]
    UnsupportedType {
        name: String,
        mime_type: String,
        expected: String,
    },

    #[error("{name} is {} which exceeds the {} limit", size_label(.size), size_label(.limit))]
    TooLarge { name: String, size: u64, limit: u64 },

    #[error("{0} is empty")]
    Empty(String),
}

fn size_label(bytes: &u64) -> String {
    format_size(*bytes)
}

/// Human-readable byte count, e.g. `12.5 MB`
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
