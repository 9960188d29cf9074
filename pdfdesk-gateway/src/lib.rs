//! # pdfdesk-gateway
//!
//! HTTP gateway to the pdfdesk processing service, plus the session driver
//! that runs a tool workflow against it.
//!
//! ```no_run
//! use pdfdesk::operations::OperationKind;
//! use pdfdesk::DocumentHandle;
//! use pdfdesk_gateway::{GatewayConfig, HttpGateway, ToolSession};
//!
//! # async fn run() -> pdfdesk_gateway::Result<()> {
//! let config = GatewayConfig::from_env()?;
//! let gateway = HttpGateway::new(&config)?;
//!
//! let mut session = ToolSession::for_operation(gateway, OperationKind::DeletePages)?;
//! session.load(DocumentHandle::open("report.pdf")?).await?;
//! session.edit_range("1,3")?;
//! session.submit()?;
//! session.confirm()?;
//! session.process().await?;
//! session.download(".")?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod session;

pub use auth::TokenStore;
pub use backend::{GatewayOutcome, PdfBackend};
pub use client::HttpGateway;
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use session::ToolSession;
