//! Result artifacts returned by the backend
//!
//! An artifact lives from the moment a backend call completes until the user
//! downloads it or saves it to "my files".

use std::io::Write;
use std::path::{Path, PathBuf};

/// Name used when neither the response nor the caller supplies a usable one
const FALLBACK_FILENAME: &str = "download";

#[derive(Clone, PartialEq, Eq)]
pub struct ResultArtifact {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ResultArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultArtifact")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ResultArtifact {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Build an artifact from response headers. The filename comes from
    /// `Content-Disposition` when it carries one, otherwise `default_name`.
    pub fn from_response(
        content_disposition: Option<&str>,
        content_type: Option<&str>,
        default_name: &str,
        bytes: Vec<u8>,
    ) -> Self {
        let filename = content_disposition
            .and_then(filename_from_content_disposition)
            .or_else(|| sanitize_filename(default_name))
            .unwrap_or_else(|| FALLBACK_FILENAME.to_string());
        let content_type = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_string())
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Self::new(filename, content_type, bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the artifact into `dir`. The filename is reduced to a bare name
    /// first, so the file always lands directly inside `dir`. An existing
    /// file is never overwritten; a numeric suffix is appended instead
    /// (`report (1).pdf`).
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> std::io::Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let name = sanitize_filename(&self.filename)
            .unwrap_or_else(|| FALLBACK_FILENAME.to_string());
        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (name.as_str(), None),
        };

        for n in 0u32.. {
            let path = dir.join(numbered_name(stem, ext, n));
            let mut file = match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            };
            file.write_all(&self.bytes)?;

            tracing::info!(path = %path.display(), size = self.bytes.len(), "artifact written");
            return Ok(path);
        }

        Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("no free file name for {name} in {}", dir.display()),
        ))
    }
}

fn numbered_name(stem: &str, ext: Option<&str>, n: u32) -> String {
    match (n, ext) {
        (0, Some(ext)) => format!("{stem}.{ext}"),
        (0, None) => stem.to_string(),
        (n, Some(ext)) => format!("{stem} ({n}).{ext}"),
        (n, None) => format!("{stem} ({n})"),
    }
}

/// Split header parameters on `;`, leaving separators inside quoted strings
/// alone
fn header_params(value: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                params.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(&value[start..]);
    params
}

fn unquote(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) else {
        return raw.to_string();
    };
    // Only \" and \\ are unescaped; other backslashes stay as path separators
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        match (c, next) {
            ('\\', Some(escaped @ ('"' | '\\'))) => {
                out.push(escaped);
                chars.next();
            }
            (c, _) => out.push(c),
        }
    }
    out
}

/// Extract the filename from a `Content-Disposition` header value.
///
/// `filename*=` (RFC 5987) wins over `filename=`. The result is reduced to a
/// bare name so a hostile server cannot point it at another directory.
pub fn filename_from_content_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in header_params(value).into_iter().skip(1) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let raw = raw.trim();

        match key.as_str() {
            "filename*" => {
                // charset'language'percent-encoded
                let encoded = raw.splitn(3, '\'').nth(2).unwrap_or(raw);
                extended = urlencoding::decode(encoded).ok().map(|s| s.into_owned());
            }
            "filename" => plain = Some(unquote(raw)),
            _ => {}
        }
    }

    extended.or(plain).and_then(|name| sanitize_filename(&name))
}

fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let base: String = base.chars().filter(|c| !c.is_control()).collect();
    let base = base.trim();
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    Some(base.to_string())
}
