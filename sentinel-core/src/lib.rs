//! # sentinel-core
//!
//! Core library for Sentinel - a scam defense assistant that streams
//! AI-driven investigations of URLs, files, and other targets.
//!
//! This library provides:
//! - Domain types for investigations, steps, and reports
//! - The incremental stream-protocol parser
//! - The investigation session model and runner
//! - A streaming client for the generative AI backend
//! - Configuration and logging infrastructure
//!
//! ## Architecture
//!
//! An investigation flows through three stages:
//! - **Producer:** [`genai::GenAiClient`] streams raw text fragments from the
//!   model over an mpsc channel
//! - **Parser:** [`protocol::StreamParser`] decodes delimiter blocks into
//!   ordered [`protocol::StreamEvent`]s, tolerating arbitrary fragmentation
//! - **Sink:** [`session::InvestigationSession`] folds events into the step
//!   history and terminal report
//!
//! The parser is pure (text in, events out) and never touches session state,
//! so the whole protocol can be tested without any producer.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sentinel_core::genai::{GenAiClient, InvestigationRequest};
//! use sentinel_core::{Config, InvestigationKind, InvestigationSession};
//!
//! # async fn run() -> sentinel_core::Result<()> {
//! let config = Config::load()?;
//! let client = GenAiClient::new(config.genai)?;
//!
//! let request = InvestigationRequest {
//!     kind: InvestigationKind::Url,
//!     subject: "https://example-shop.test".to_string(),
//!     simple_language: false,
//!     attachment: None,
//! };
//! let mut session = InvestigationSession::new(request.kind, request.subject.clone());
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(32);
//! tokio::spawn(async move { client.stream_investigation(request, tx).await });
//! sentinel_core::runner::run_session(rx, &mut session, |_event| {}).await;
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use protocol::{ReportTag, StreamEvent, StreamParser};
pub use session::InvestigationSession;
pub use types::*;

// Public modules
pub mod config;
pub mod error;
pub mod genai;
pub mod logging;
pub mod protocol;
pub mod runner;
pub mod session;
pub mod types;
