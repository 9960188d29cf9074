use pdfdesk::workflow::TransitionError;
use pdfdesk::DeskError;
use thiserror::Error;

/// Failures of a gateway call, split the way the user is told about them
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request never got an HTTP answer
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// A success status with a zero-byte body
    #[error("The server returned an empty file")]
    EmptyResponse,

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Desk(#[from] DeskError),

    #[error("{0}")]
    Transition(#[from] TransitionError),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Network(err)
        }
    }
}

impl GatewayError {
    pub fn is_network(&self) -> bool {
        matches!(self, GatewayError::Network(_))
    }

    /// The backend refused the request, usually because of the input
    pub fn is_rejected(&self) -> bool {
        matches!(self, GatewayError::Rejected { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Rejected { status: 401 | 403, .. })
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
