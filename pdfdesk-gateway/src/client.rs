//! HTTP gateway to the processing service

use crate::backend::{GatewayOutcome, PdfBackend};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::form::{self, FormField};
use async_trait::async_trait;
use pdfdesk::artifact::ResultArtifact;
use pdfdesk::cv::CvProfile;
use pdfdesk::document::{DocumentHandle, DocumentSource};
use pdfdesk::library::{StorageQuota, StoredFile};
use pdfdesk::operations::check_merge_inputs;
use pdfdesk::operations::OperationKind;
use pdfdesk::workflow::Configuration;
use pdfdesk::DeskError;
use reqwest::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const PAGE_COUNT_PATH: &str = "/api/pdf/page-count";
pub const FILES_PATH: &str = "/api/files";
pub const QUOTA_PATH: &str = "/api/files/quota";
pub const UPLOAD_PATH: &str = "/api/files/upload";
pub const SAVE_PATH: &str = "/api/files/save";

/// Longest raw body echoed back in a rejection message
const MAX_ERROR_TEXT: usize = 200;

#[derive(Deserialize)]
struct PageCountResponse {
    #[serde(rename = "pageCount", alias = "page_count", alias = "pages")]
    page_count: u32,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    /// Gateway for `config`, with the token resolved from the config or the
    /// token file
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let token = config.resolve_token()?;
        Self::connect(&config.api_url, token)
    }

    pub fn connect(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pdfdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and turn non-2xx answers into [`GatewayError::Rejected`]
    async fn send(&self, method: Method, path: &str, builder: RequestBuilder) -> Result<Response> {
        tracing::info!(%method, path, "backend request");
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "backend unreachable");
            GatewayError::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
        tracing::warn!(%method, path, status = status.as_u16(), %message, "backend rejected request");
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn post_form(&self, path: &str, fields: Vec<FormField>) -> Result<Response> {
        let form = form::into_multipart(fields)?;
        let builder = self.request(Method::POST, path).multipart(form);
        self.send(Method::POST, path, builder).await
    }

    async fn get(&self, path: &str) -> Result<Response> {
        let builder = self.request(Method::GET, path);
        self.send(Method::GET, path, builder).await
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn read_artifact(response: Response, default_name: &str) -> Result<ResultArtifact> {
        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let disposition = header(CONTENT_DISPOSITION);
        let content_type = header(CONTENT_TYPE);

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(GatewayError::EmptyResponse);
        }

        let artifact = ResultArtifact::from_response(
            disposition.as_deref(),
            content_type.as_deref(),
            default_name,
            bytes.to_vec(),
        );
        tracing::info!(filename = %artifact.filename, size = artifact.len(), "artifact received");
        Ok(artifact)
    }

    pub async fn page_count(&self, document: &DocumentHandle) -> Result<u32> {
        let response = self
            .post_form(PAGE_COUNT_PATH, form::single_document_fields(document))
            .await?;
        let parsed: PageCountResponse = Self::read_json(response).await?;
        tracing::debug!(document = document.name(), pages = parsed.page_count, "page count resolved");
        Ok(parsed.page_count)
    }

    /// Run a single-document operation
    pub async fn run(&self, job: &Configuration) -> Result<ResultArtifact> {
        let path = job.options.kind().endpoint();
        let response = self.post_form(path, form::operation_fields(job)).await?;
        Self::read_artifact(response, &job.options.default_filename()).await
    }

    /// Merge `documents` in the given order
    pub async fn merge(&self, documents: &[DocumentHandle]) -> Result<ResultArtifact> {
        check_merge_inputs(documents)?;
        let kind = OperationKind::Merge;
        let response = self
            .post_form(kind.endpoint(), form::merge_fields(documents))
            .await?;
        Self::read_artifact(response, kind.default_filename()).await
    }

    /// Generate a CV. When the backend cannot be reached the profile is
    /// rendered locally and returned as a fallback.
    pub async fn generate_cv(&self, profile: &CvProfile) -> Result<GatewayOutcome> {
        profile.check()?;
        let path = OperationKind::GenerateCv.endpoint();
        let builder = self.request(Method::POST, path).json(profile);

        let response = match self.send(Method::POST, path, builder).await {
            Ok(response) => response,
            Err(err) if err.is_network() => {
                tracing::warn!(error = %err, "CV backend unreachable, using plain-text fallback");
                return Ok(GatewayOutcome::Fallback {
                    artifact: profile.fallback_artifact(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        };

        let default_name = format!("{}.pdf", profile.file_stem());
        Self::read_artifact(response, &default_name)
            .await
            .map(GatewayOutcome::Completed)
    }

    pub async fn list_files(&self) -> Result<Vec<StoredFile>> {
        let response = self.get(FILES_PATH).await?;
        Self::read_json(response).await
    }

    pub async fn quota(&self) -> Result<StorageQuota> {
        let response = self.get(QUOTA_PATH).await?;
        Self::read_json(response).await
    }

    /// Upload a local document into "my files"
    pub async fn upload(&self, document: &DocumentHandle) -> Result<StoredFile> {
        if let DocumentSource::Stored { id } = document.source() {
            return Err(DeskError::InvalidInput(format!(
                "{} is already stored (id {id})",
                document.name()
            ))
            .into());
        }
        let response = self
            .post_form(UPLOAD_PATH, form::single_document_fields(document))
            .await?;
        let stored: StoredFile = Self::read_json(response).await?;
        tracing::info!(id = %stored.id, name = %stored.name, "file uploaded");
        Ok(stored)
    }

    pub async fn download(&self, file: &StoredFile) -> Result<ResultArtifact> {
        let response = self.get(&file_path(&file.id, "/download")).await?;
        Self::read_artifact(response, &file.name).await
    }

    /// Download by id when only the id is known
    pub async fn download_by_id(&self, id: &str) -> Result<ResultArtifact> {
        let response = self.get(&file_path(id, "/download")).await?;
        Self::read_artifact(response, &format!("{id}.pdf")).await
    }

    pub async fn delete_file(&self, id: &str) -> Result<()> {
        let path = file_path(id, "");
        let builder = self.request(Method::DELETE, &path);
        self.send(Method::DELETE, &path, builder).await?;
        tracing::info!(id, "stored file deleted");
        Ok(())
    }

    pub async fn save_artifact(&self, artifact: &ResultArtifact) -> Result<StoredFile> {
        let response = self
            .post_form(SAVE_PATH, form::artifact_fields(artifact))
            .await?;
        let stored: StoredFile = Self::read_json(response).await?;
        tracing::info!(id = %stored.id, name = %stored.name, "artifact saved");
        Ok(stored)
    }
}

#[async_trait]
impl PdfBackend for HttpGateway {
    async fn page_count(&self, document: &DocumentHandle) -> Result<u32> {
        HttpGateway::page_count(self, document).await
    }

    async fn process(&self, job: &Configuration) -> Result<ResultArtifact> {
        self.run(job).await
    }

    async fn save(&self, artifact: &ResultArtifact) -> Result<StoredFile> {
        self.save_artifact(artifact).await
    }
}

fn file_path(id: &str, suffix: &str) -> String {
    format!("{FILES_PATH}/{}{suffix}", urlencoding::encode(id))
}

/// Message from a JSON `{"error": ..}` or `{"message": ..}` body, else the
/// start of a plain-text body
fn error_message(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.error.or(parsed.message) {
            return Some(message);
        }
    }
    let text = body.trim();
    if text.is_empty() || text.starts_with('<') || text.starts_with('{') {
        return None;
    }
    Some(text.chars().take(MAX_ERROR_TEXT).collect())
}
