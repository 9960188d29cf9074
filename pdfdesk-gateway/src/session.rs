//! A tool screen driven against a backend
//!
//! [`ToolSession`] owns a [`Workflow`] and performs the backend calls its
//! states call for: the page count after a load, the operation after
//! submission, and saving the result. Every method takes `&mut self` when it
//! can change state, so a session never has two backend calls in flight.

use crate::backend::PdfBackend;
use crate::error::{GatewayError, Result};
use pdfdesk::artifact::ResultArtifact;
use pdfdesk::document::DocumentHandle;
use pdfdesk::library::StoredFile;
use pdfdesk::operations::{OperationKind, OperationOptions, ToolConfig};
use pdfdesk::ranges::ValidationResult;
use pdfdesk::workflow::{Event, TransitionError, Workflow, WorkflowStatus};
use std::path::{Path, PathBuf};

pub struct ToolSession<B> {
    backend: B,
    workflow: Workflow,
}

impl<B: PdfBackend> ToolSession<B> {
    pub fn new(backend: B, config: ToolConfig) -> Self {
        Self {
            backend,
            workflow: Workflow::new(config),
        }
    }

    pub fn for_operation(backend: B, kind: OperationKind) -> Result<Self> {
        Ok(Self {
            backend,
            workflow: Workflow::for_operation(kind)?,
        })
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn status(&self) -> WorkflowStatus {
        self.workflow.status()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn not_allowed(&self, event: &'static str) -> GatewayError {
        TransitionError::NotAllowed {
            event,
            status: self.status(),
        }
        .into()
    }

    /// Load a document and ask the backend for its page count. On a backend
    /// failure the workflow moves to `Error` and the failure is returned.
    pub async fn load(&mut self, document: DocumentHandle) -> Result<WorkflowStatus> {
        self.workflow.apply(Event::Load(document))?;
        self.resolve_page_count().await
    }

    /// Fetch the page count for a loaded document, also used after a retry
    pub async fn resolve_page_count(&mut self) -> Result<WorkflowStatus> {
        if self.status() != WorkflowStatus::Loaded {
            return Err(self.not_allowed("resolve the page count"));
        }
        let Some(document) = self.workflow.document() else {
            return Err(self.not_allowed("resolve the page count"));
        };

        match self.backend.page_count(document).await {
            Ok(count) => Ok(self.workflow.apply(Event::PageCountResolved(count))?),
            Err(err) => {
                self.workflow
                    .apply(Event::PageCountFailed(format!("Could not read the PDF: {err}")))?;
                Err(err)
            }
        }
    }

    /// Update the page range text and return the fresh validation
    pub fn edit_range(&mut self, input: impl Into<String>) -> Result<Option<ValidationResult>> {
        self.workflow.apply(Event::EditRange(input.into()))?;
        Ok(self.workflow.validation().cloned())
    }

    pub fn set_options(&mut self, options: OperationOptions) -> Result<()> {
        self.workflow.apply(Event::SetOptions(options))?;
        Ok(())
    }

    pub fn attach(&mut self, file: DocumentHandle) -> Result<()> {
        self.workflow.apply(Event::Attach(file))?;
        Ok(())
    }

    /// `Confirming` for tools that ask first, otherwise `Processing`
    pub fn submit(&mut self) -> Result<WorkflowStatus> {
        Ok(self.workflow.apply(Event::Submit)?)
    }

    pub fn confirm(&mut self) -> Result<WorkflowStatus> {
        Ok(self.workflow.apply(Event::Confirm)?)
    }

    pub fn cancel(&mut self) -> Result<WorkflowStatus> {
        Ok(self.workflow.apply(Event::Cancel)?)
    }

    /// Run the submitted operation. Success moves to `Done`, any failure to
    /// `Error` with the failure's message.
    pub async fn process(&mut self) -> Result<&ResultArtifact> {
        let Some(job) = self.workflow.pending_job() else {
            return Err(self.not_allowed("process"));
        };
        let kind = job.options.kind();

        match self.backend.process(job).await {
            Ok(artifact) if artifact.is_empty() => {
                self.workflow
                    .apply(Event::Failed(GatewayError::EmptyResponse.to_string()))?;
                Err(GatewayError::EmptyResponse)
            }
            Ok(artifact) => {
                tracing::info!(tool = %kind, filename = %artifact.filename, size = artifact.len(), "operation completed");
                self.workflow.apply(Event::Completed(artifact))?;
                self.workflow
                    .artifact()
                    .ok_or_else(|| self.not_allowed("read the result"))
            }
            Err(err) => {
                self.workflow.apply(Event::Failed(err.to_string()))?;
                Err(err)
            }
        }
    }

    /// Leave `Error` for the state the failure interrupted
    pub fn retry(&mut self) -> Result<WorkflowStatus> {
        Ok(self.workflow.apply(Event::Retry)?)
    }

    /// "Process another file"
    pub fn reset(&mut self) -> Result<WorkflowStatus> {
        Ok(self.workflow.apply(Event::Reset)?)
    }

    pub fn remove_file(&mut self) -> Result<WorkflowStatus> {
        Ok(self.workflow.apply(Event::RemoveFile)?)
    }

    /// Write the result into `dir` without overwriting anything there
    pub fn download<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let artifact = self
            .workflow
            .artifact()
            .ok_or_else(|| self.not_allowed("download"))?;
        Ok(artifact.write_to(dir)?)
    }

    /// Keep the result in "my files"
    pub async fn save(&self) -> Result<StoredFile> {
        let artifact = self
            .workflow
            .artifact()
            .ok_or_else(|| self.not_allowed("save"))?;
        self.backend.save(artifact).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pdfdesk::workflow::Configuration;
    use std::sync::Mutex;

    /// Backend returning canned answers and recording processed jobs
    #[derive(Default)]
    struct ScriptedBackend {
        pages: Option<u32>,
        result: Option<Vec<u8>>,
        jobs: Mutex<Vec<Configuration>>,
    }

    impl ScriptedBackend {
        fn new(pages: u32, result: &[u8]) -> Self {
            Self {
                pages: Some(pages),
                result: Some(result.to_vec()),
                jobs: Mutex::default(),
            }
        }
    }

    #[async_trait]
    impl PdfBackend for ScriptedBackend {
        async fn page_count(&self, _document: &DocumentHandle) -> Result<u32> {
            self.pages.ok_or(GatewayError::Rejected {
                status: 400,
                message: "Invalid PDF".to_string(),
            })
        }

        async fn process(&self, job: &Configuration) -> Result<ResultArtifact> {
            self.jobs.lock().unwrap().push(job.clone());
            match &self.result {
                Some(bytes) => Ok(ResultArtifact::new(
                    job.options.default_filename(),
                    "application/pdf",
                    bytes.clone(),
                )),
                None => Err(GatewayError::Rejected {
                    status: 500,
                    message: "boom".to_string(),
                }),
            }
        }

        async fn save(&self, artifact: &ResultArtifact) -> Result<StoredFile> {
            Ok(StoredFile {
                id: "saved-1".to_string(),
                name: artifact.filename.clone(),
                size: artifact.len() as u64,
                content_type: artifact.content_type.clone(),
                created_at: None,
            })
        }
    }

    fn pdf() -> DocumentHandle {
        DocumentHandle::from_bytes("doc.pdf", b"%PDF-1.7 body".to_vec())
    }

    #[tokio::test]
    async fn test_delete_flow_reaches_done() {
        let backend = ScriptedBackend::new(4, b"%PDF-1.7 result");
        let mut session = ToolSession::for_operation(backend, OperationKind::DeletePages).unwrap();

        assert_eq!(session.load(pdf()).await.unwrap(), WorkflowStatus::Configuring);
        let validation = session.edit_range("2,4").unwrap().unwrap();
        assert!(validation.valid);
        assert_eq!(session.submit().unwrap(), WorkflowStatus::Confirming);
        assert_eq!(session.confirm().unwrap(), WorkflowStatus::Processing);

        let artifact = session.process().await.unwrap();
        assert_eq!(artifact.filename, "pages-deleted.pdf");
        assert_eq!(session.status(), WorkflowStatus::Done);

        let jobs = session.backend().jobs.lock().unwrap();
        assert_eq!(jobs[0].selection.pages(), &[2, 4]);
    }

    #[tokio::test]
    async fn test_page_count_failure_moves_to_error() {
        let backend = ScriptedBackend {
            pages: None,
            ..Default::default()
        };
        let mut session = ToolSession::for_operation(backend, OperationKind::Rotate).unwrap();

        let err = session.load(pdf()).await.unwrap_err();
        assert!(err.is_rejected());
        assert_eq!(session.status(), WorkflowStatus::Error);
        assert!(session
            .workflow()
            .error_message()
            .unwrap()
            .contains("Invalid PDF"));

        assert_eq!(session.retry().unwrap(), WorkflowStatus::Loaded);
        assert!(session.resolve_page_count().await.is_err());
    }

    #[tokio::test]
    async fn test_backend_failure_then_retry() {
        let backend = ScriptedBackend {
            pages: Some(3),
            result: None,
            ..Default::default()
        };
        let mut session = ToolSession::for_operation(backend, OperationKind::Compress).unwrap();
        session.load(pdf()).await.unwrap();
        assert_eq!(session.submit().unwrap(), WorkflowStatus::Processing);

        let err = session.process().await.unwrap_err();
        assert!(err.is_rejected());
        assert_eq!(session.status(), WorkflowStatus::Error);
        assert_eq!(session.retry().unwrap(), WorkflowStatus::Configuring);
    }

    #[tokio::test]
    async fn test_empty_result_is_an_error() {
        let backend = ScriptedBackend::new(3, b"");
        let mut session = ToolSession::for_operation(backend, OperationKind::Compress).unwrap();
        session.load(pdf()).await.unwrap();
        session.submit().unwrap();

        let err = session.process().await.unwrap_err();
        assert!(matches!(err, GatewayError::EmptyResponse));
        assert_eq!(
            session.workflow().error_message(),
            Some("The server returned an empty file")
        );
    }

    #[tokio::test]
    async fn test_process_requires_submission() {
        let backend = ScriptedBackend::new(3, b"x");
        let mut session = ToolSession::for_operation(backend, OperationKind::Compress).unwrap();
        session.load(pdf()).await.unwrap();

        let err = session.process().await.unwrap_err();
        assert!(matches!(err, GatewayError::Transition(_)));
        assert!(session.backend().jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_download_and_save() {
        let backend = ScriptedBackend::new(2, b"%PDF-1.7 out");
        let mut session = ToolSession::for_operation(backend, OperationKind::Compress).unwrap();
        let dir = tempfile::tempdir().unwrap();

        assert!(session.download(dir.path()).is_err());

        session.load(pdf()).await.unwrap();
        session.submit().unwrap();
        session.process().await.unwrap();

        let first = session.download(dir.path()).unwrap();
        let second = session.download(dir.path()).unwrap();
        assert_ne!(first, second);
        assert_eq!(std::fs::read(&first).unwrap(), b"%PDF-1.7 out");

        let stored = session.save().await.unwrap();
        assert_eq!(stored.name, "compressed.pdf");

        assert_eq!(session.reset().unwrap(), WorkflowStatus::Empty);
    }
}
