//! Tool workflow state machine
//!
//! A tool screen walks one document through
//! `Empty → Loaded → Configuring → Confirming? → Processing → Done`.
//! The whole screen state is a single [`WorkflowState`]; [`reduce`] maps a
//! state and an [`Event`] to the next state, so combinations such as
//! "processing without a document" cannot be represented.
//!
//! The machine performs no I/O. Whoever drives it (see `pdfdesk-gateway`)
//! asks the backend for the page count after `Load`, runs the operation once
//! `Processing` is reached, and feeds the outcome back as events.

mod preview;

pub use preview::EffectPreview;

use crate::artifact::ResultArtifact;
use crate::document::{DocumentHandle, FileConstraintError, FileConstraints};
use crate::error::{DeskError, Result};
use crate::operations::{OperationKind, OperationOptions, ToolConfig};
use crate::ranges::{parse_page_ranges, validate_selection, PageSelection, ValidationResult};
use serde::Serialize;
use thiserror::Error;

/// Coarse state of a tool screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Empty,
    Loaded,
    Configuring,
    Confirming,
    Processing,
    Done,
    Error,
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkflowStatus::Empty => "empty",
            WorkflowStatus::Loaded => "loaded",
            WorkflowStatus::Configuring => "configuring",
            WorkflowStatus::Confirming => "confirming",
            WorkflowStatus::Processing => "processing",
            WorkflowStatus::Done => "done",
            WorkflowStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// Everything the user has chosen for the loaded document
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub document: DocumentHandle,
    pub page_count: u32,
    /// Raw page range text as typed
    pub input: String,
    pub selection: PageSelection,
    /// `None` when the current options take no page range
    pub validation: Option<ValidationResult>,
    pub options: OperationOptions,
    /// Secondary file, the signature image for fill & sign
    pub attachment: Option<DocumentHandle>,
}

impl Configuration {
    fn new(document: DocumentHandle, page_count: u32, options: OperationOptions) -> Self {
        let mut configuration = Self {
            document,
            page_count,
            input: String::new(),
            selection: PageSelection::new(),
            validation: None,
            options,
            attachment: None,
        };
        configuration.revalidate();
        configuration
    }

    fn revalidate(&mut self) {
        match self.options.selection_mode() {
            Some(mode) => {
                self.selection = parse_page_ranges(&self.input, self.page_count);
                self.validation = Some(validate_selection(
                    &self.input,
                    &self.selection,
                    Some(self.page_count),
                    mode,
                ));
            }
            None => {
                self.selection = PageSelection::new();
                self.validation = None;
            }
        }
    }

    /// Why the configuration cannot be submitted yet, if anything
    pub fn blocker(&self) -> Option<String> {
        if let Some(validation) = self.validation.as_ref().filter(|v| !v.valid) {
            return Some(validation.message.clone());
        }
        if let Err(err) = self.options.check(self.page_count) {
            return Some(match err {
                DeskError::InvalidOption(msg) => msg,
                other => other.to_string(),
            });
        }
        if self.options.kind() == OperationKind::Sign && self.attachment.is_none() {
            return Some("Please add a signature image first".to_string());
        }
        None
    }

    pub fn is_ready(&self) -> bool {
        self.blocker().is_none()
    }
}

/// Where a failed workflow resumes after [`Event::Retry`]
#[derive(Debug, Clone, PartialEq)]
pub enum Resume {
    Loaded(DocumentHandle),
    Configuring(Configuration),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Empty,
    Loaded {
        document: DocumentHandle,
    },
    Configuring(Configuration),
    Confirming(Configuration),
    Processing(Configuration),
    Done {
        configuration: Configuration,
        artifact: ResultArtifact,
    },
    Error {
        message: String,
        resume: Resume,
    },
}

impl WorkflowState {
    pub fn status(&self) -> WorkflowStatus {
        match self {
            WorkflowState::Empty => WorkflowStatus::Empty,
            WorkflowState::Loaded { .. } => WorkflowStatus::Loaded,
            WorkflowState::Configuring(_) => WorkflowStatus::Configuring,
            WorkflowState::Confirming(_) => WorkflowStatus::Confirming,
            WorkflowState::Processing(_) => WorkflowStatus::Processing,
            WorkflowState::Done { .. } => WorkflowStatus::Done,
            WorkflowState::Error { .. } => WorkflowStatus::Error,
        }
    }

    pub fn configuration(&self) -> Option<&Configuration> {
        match self {
            WorkflowState::Configuring(c)
            | WorkflowState::Confirming(c)
            | WorkflowState::Processing(c)
            | WorkflowState::Done {
                configuration: c, ..
            }
            | WorkflowState::Error {
                resume: Resume::Configuring(c),
                ..
            } => Some(c),
            _ => None,
        }
    }

    pub fn document(&self) -> Option<&DocumentHandle> {
        match self {
            WorkflowState::Empty => None,
            WorkflowState::Loaded { document }
            | WorkflowState::Error {
                resume: Resume::Loaded(document),
                ..
            } => Some(document),
            other => other.configuration().map(|c| &c.document),
        }
    }
}

/// Inputs that drive the machine
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A file was picked or selected from "my files"
    Load(DocumentHandle),
    PageCountResolved(u32),
    PageCountFailed(String),
    EditRange(String),
    SetOptions(OperationOptions),
    Attach(DocumentHandle),
    Submit,
    Confirm,
    Cancel,
    Completed(ResultArtifact),
    Failed(String),
    Retry,
    /// "Process another file"
    Reset,
    RemoveFile,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Load(_) => "load a file",
            Event::PageCountResolved(_) | Event::PageCountFailed(_) => "resolve the page count",
            Event::EditRange(_) => "edit the page range",
            Event::SetOptions(_) => "change options",
            Event::Attach(_) => "attach a file",
            Event::Submit => "submit",
            Event::Confirm => "confirm",
            Event::Cancel => "cancel",
            Event::Completed(_) => "complete",
            Event::Failed(_) => "fail",
            Event::Retry => "retry",
            Event::Reset => "reset",
            Event::RemoveFile => "remove the file",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("cannot {event} while the workflow is {status}")]
    NotAllowed {
        event: &'static str,
        status: WorkflowStatus,
    },

    #[error("{0}")]
    NotReady(String),

    #[error(transparent)]
    File(#[from] FileConstraintError),

    #[error("{given} options do not apply to {expected}")]
    WrongOperation {
        expected: OperationKind,
        given: OperationKind,
    },

    #[error("an operation is already in progress")]
    Busy,
}

/// A refused event. The state is handed back untouched.
#[derive(Debug)]
pub struct Rejected {
    pub state: WorkflowState,
    pub error: TransitionError,
}

impl Rejected {
    fn new(state: WorkflowState, error: TransitionError) -> Self {
        Self { state, error }
    }
}

/// Compute the state that follows `state` on `event`.
pub fn reduce(
    config: &ToolConfig,
    state: WorkflowState,
    event: Event,
) -> std::result::Result<WorkflowState, Rejected> {
    use WorkflowState as S;

    match (state, event) {
        (_, Event::RemoveFile) => Ok(S::Empty),

        (S::Empty, Event::Load(document)) => match config.constraints().check(&document) {
            Ok(()) => Ok(S::Loaded { document }),
            Err(err) => Err(Rejected::new(S::Empty, err.into())),
        },

        (S::Loaded { document }, Event::PageCountResolved(0)) => Ok(S::Error {
            message: format!("{} has no pages", document.name()),
            resume: Resume::Loaded(document),
        }),
        (S::Loaded { document }, Event::PageCountResolved(pages)) => {
            match config.default_options() {
                Some(options) => Ok(S::Configuring(Configuration::new(document, pages, options))),
                None => Ok(S::Error {
                    message: format!("{} does not work on a single document", config.kind),
                    resume: Resume::Loaded(document),
                }),
            }
        }
        (S::Loaded { document }, Event::PageCountFailed(message)) => Ok(S::Error {
            message,
            resume: Resume::Loaded(document),
        }),

        (S::Configuring(mut c), Event::EditRange(input)) => {
            c.input = input;
            c.revalidate();
            Ok(S::Configuring(c))
        }
        (S::Configuring(mut c), Event::SetOptions(options)) => {
            if options.kind() != config.kind {
                let error = TransitionError::WrongOperation {
                    expected: config.kind,
                    given: options.kind(),
                };
                return Err(Rejected::new(S::Configuring(c), error));
            }
            c.options = options;
            c.revalidate();
            Ok(S::Configuring(c))
        }
        (S::Configuring(mut c), Event::Attach(file)) => {
            match FileConstraints::image(config.kind.max_file_size()).check(&file) {
                Ok(()) => {
                    c.attachment = Some(file);
                    Ok(S::Configuring(c))
                }
                Err(err) => Err(Rejected::new(S::Configuring(c), err.into())),
            }
        }
        (S::Configuring(c), Event::Submit) => match c.blocker() {
            Some(reason) => Err(Rejected::new(
                S::Configuring(c),
                TransitionError::NotReady(reason),
            )),
            None if config.requires_confirmation => Ok(S::Confirming(c)),
            None => Ok(S::Processing(c)),
        },
        (S::Configuring(c), Event::Failed(message)) => Ok(S::Error {
            message,
            resume: Resume::Configuring(c),
        }),

        (S::Confirming(c), Event::Confirm) => Ok(S::Processing(c)),
        (S::Confirming(c), Event::Cancel) => Ok(S::Configuring(c)),

        (S::Processing(configuration), Event::Completed(artifact)) => Ok(S::Done {
            configuration,
            artifact,
        }),
        (S::Processing(c), Event::Failed(message)) => Ok(S::Error {
            message,
            resume: Resume::Configuring(c),
        }),
        (state @ S::Processing(_), _) => Err(Rejected::new(state, TransitionError::Busy)),

        (S::Error { resume, .. }, Event::Retry) => Ok(match resume {
            Resume::Loaded(document) => S::Loaded { document },
            Resume::Configuring(c) => S::Configuring(c),
        }),

        (S::Done { .. } | S::Error { .. }, Event::Reset) => Ok(S::Empty),

        (state, event) => {
            let error = TransitionError::NotAllowed {
                event: event.name(),
                status: state.status(),
            };
            Err(Rejected::new(state, error))
        }
    }
}

/// A tool screen: its configuration plus the current state
#[derive(Debug, Clone)]
pub struct Workflow {
    config: ToolConfig,
    state: WorkflowState,
}

impl Workflow {
    pub fn new(config: ToolConfig) -> Self {
        Self {
            config,
            state: WorkflowState::Empty,
        }
    }

    /// Workflow for a single-document tool with its default configuration
    pub fn for_operation(kind: OperationKind) -> Result<Self> {
        if !kind.is_single_document() {
            return Err(DeskError::InvalidOption(format!(
                "{kind} does not work on a single document"
            )));
        }
        Ok(Self::new(ToolConfig::new(kind)))
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn status(&self) -> WorkflowStatus {
        self.state.status()
    }

    /// Feed an event. On error the state is left as it was.
    pub fn apply(&mut self, event: Event) -> std::result::Result<WorkflowStatus, TransitionError> {
        let from = self.state.status();
        let event_name = event.name();
        let state = std::mem::replace(&mut self.state, WorkflowState::Empty);

        match reduce(&self.config, state, event) {
            Ok(next) => {
                self.state = next;
                let to = self.state.status();
                tracing::debug!(tool = ?self.config.kind, %from, %to, event = event_name, "workflow transition");
                Ok(to)
            }
            Err(Rejected { state, error }) => {
                self.state = state;
                tracing::debug!(tool = ?self.config.kind, status = %from, event = event_name, %error, "event rejected");
                Err(error)
            }
        }
    }

    pub fn configuration(&self) -> Option<&Configuration> {
        self.state.configuration()
    }

    pub fn document(&self) -> Option<&DocumentHandle> {
        self.state.document()
    }

    pub fn validation(&self) -> Option<&ValidationResult> {
        self.configuration().and_then(|c| c.validation.as_ref())
    }

    pub fn artifact(&self) -> Option<&ResultArtifact> {
        match &self.state {
            WorkflowState::Done { artifact, .. } => Some(artifact),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Configuration of the operation being run, only while processing
    pub fn pending_job(&self) -> Option<&Configuration> {
        match &self.state {
            WorkflowState::Processing(c) => Some(c),
            _ => None,
        }
    }

    /// What the current configuration would do, while it is being edited or
    /// confirmed and is ready to submit
    pub fn preview(&self) -> Option<EffectPreview> {
        match &self.state {
            WorkflowState::Configuring(c) | WorkflowState::Confirming(c) if c.is_ready() => {
                Some(EffectPreview::of(c))
            }
            _ => None,
        }
    }
}
