//! The seam between a tool session and the processing service

use crate::error::Result;
use async_trait::async_trait;
use pdfdesk::artifact::ResultArtifact;
use pdfdesk::document::DocumentHandle;
use pdfdesk::library::StoredFile;
use pdfdesk::workflow::Configuration;

/// Operations a [`ToolSession`](crate::session::ToolSession) needs from the
/// backend. Implemented over HTTP by [`HttpGateway`](crate::client::HttpGateway).
#[async_trait]
pub trait PdfBackend: Send + Sync {
    async fn page_count(&self, document: &DocumentHandle) -> Result<u32>;

    /// Run the operation described by `job`. A success never carries an
    /// empty artifact.
    async fn process(&self, job: &Configuration) -> Result<ResultArtifact>;

    /// Keep an artifact in "my files"
    async fn save(&self, artifact: &ResultArtifact) -> Result<StoredFile>;
}

/// Result of a call that can degrade to a locally produced artifact
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayOutcome {
    Completed(ResultArtifact),
    /// The backend was unreachable and `artifact` was built locally
    Fallback {
        artifact: ResultArtifact,
        reason: String,
    },
}

impl GatewayOutcome {
    pub fn artifact(&self) -> &ResultArtifact {
        match self {
            GatewayOutcome::Completed(artifact) | GatewayOutcome::Fallback { artifact, .. } => {
                artifact
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, GatewayOutcome::Fallback { .. })
    }
}
