//! Multipart bodies for the processing endpoints
//!
//! Fields are first collected as plain values so the layout can be checked
//! without a server, then turned into a `reqwest` form.

use crate::error::Result;
use pdfdesk::artifact::ResultArtifact;
use pdfdesk::document::{DocumentHandle, DocumentSource};
use pdfdesk::workflow::Configuration;
use reqwest::multipart::{Form, Part};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    File {
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub value: FieldValue,
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Text(value.into()),
        }
    }

    pub fn text_value(&self) -> Option<&str> {
        match &self.value {
            FieldValue::Text(text) => Some(text),
            FieldValue::File { .. } => None,
        }
    }
}

/// The document under `file_name`, or its stored id under `id_name` when it
/// lives in "my files"
fn document_field(file_name: &str, id_name: &str, document: &DocumentHandle) -> FormField {
    match document.source() {
        DocumentSource::Bytes(bytes) => FormField {
            name: file_name.to_string(),
            value: FieldValue::File {
                filename: document.name().to_string(),
                content_type: document.mime_type().to_string(),
                bytes: bytes.clone(),
            },
        },
        DocumentSource::Stored { id } => FormField::text(id_name, id.clone()),
    }
}

/// Fields for a single-document operation: document, page list, options and
/// the signature image for fill & sign
pub fn operation_fields(configuration: &Configuration) -> Vec<FormField> {
    let mut fields = vec![document_field("file", "fileId", &configuration.document)];

    if configuration.options.selection_mode().is_some() {
        fields.extend(
            configuration
                .selection
                .iter()
                .map(|page| FormField::text("pages", page.to_string())),
        );
    }

    fields.extend(
        configuration
            .options
            .form_fields()
            .into_iter()
            .map(|(name, value)| FormField::text(name, value)),
    );

    if let Some(signature) = &configuration.attachment {
        fields.push(document_field("signature", "signatureId", signature));
    }
    fields
}

/// Input order is the merge order
pub fn merge_fields(documents: &[DocumentHandle]) -> Vec<FormField> {
    documents
        .iter()
        .map(|document| document_field("files", "fileIds", document))
        .collect()
}

pub fn single_document_fields(document: &DocumentHandle) -> Vec<FormField> {
    vec![document_field("file", "fileId", document)]
}

pub fn artifact_fields(artifact: &ResultArtifact) -> Vec<FormField> {
    vec![FormField {
        name: "file".to_string(),
        value: FieldValue::File {
            filename: artifact.filename.clone(),
            content_type: artifact.content_type.clone(),
            bytes: artifact.bytes.clone(),
        },
    }]
}

pub fn into_multipart(fields: Vec<FormField>) -> Result<Form> {
    let mut form = Form::new();
    for field in fields {
        form = match field.value {
            FieldValue::Text(text) => form.text(field.name, text),
            FieldValue::File {
                filename,
                content_type,
                bytes,
            } => {
                let part = Part::bytes(bytes)
                    .file_name(filename)
                    .mime_str(&content_type)?;
                form.part(field.name, part)
            }
        };
    }
    Ok(form)
}
