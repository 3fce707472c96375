//! Error types for ocingest
//!
//! Every failure inside the ingest protocol names the step it happened in,
//! so a caller can tell how far a run got before it aborted.

use crate::models::ProtocolStep;
use crate::xml::XmlError;
use std::path::PathBuf;
use thiserror::Error;

/// Ingest error type
#[derive(Debug, Error)]
pub enum IngestError {
    /// Backend answered with a non-success status; body is kept verbatim
    #[error("{step} failed, request failed with status code {status}: {body}")]
    Backend {
        step: ProtocolStep,
        status: u16,
        body: String,
    },

    /// Request never produced a response (connect, TLS, timeout, body read)
    #[error("{step} failed, network error: {source}")]
    Network {
        step: ProtocolStep,
        #[source]
        source: reqwest::Error,
    },

    /// Backend answered successfully but the body was not what the step expects
    #[error("{step} failed, unexpected response: {message}")]
    UnexpectedResponse { step: ProtocolStep, message: String },

    /// Backend call outside the protocol (series lookup) failed
    #[error("{operation} failed: {message}")]
    Lookup {
        operation: &'static str,
        message: String,
    },

    /// Neither explicit grants nor an ACL template name configured
    #[error("Configuration error: {0}")]
    Config(String),

    /// Named resource (ACL template) absent on the backend
    #[error("{step} failed, not found: {what}")]
    NotFound { step: ProtocolStep, what: String },

    /// Source media file missing or unreadable
    #[error("{step} failed, cannot read {}: {source}", .path.display())]
    Io {
        step: ProtocolStep,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest parsing or XML document generation failed
    #[error("{step} failed: {source}")]
    Xml {
        step: ProtocolStep,
        #[source]
        source: XmlError,
    },

    /// Input the protocol refuses to act on
    #[error("{step} failed, invalid input: {message}")]
    Validation { step: ProtocolStep, message: String },
}

impl IngestError {
    /// Step the run aborted in, if the failure happened inside the protocol
    pub fn step(&self) -> Option<ProtocolStep> {
        match self {
            IngestError::Backend { step, .. }
            | IngestError::Network { step, .. }
            | IngestError::UnexpectedResponse { step, .. }
            | IngestError::NotFound { step, .. }
            | IngestError::Io { step, .. }
            | IngestError::Xml { step, .. }
            | IngestError::Validation { step, .. } => Some(*step),
            IngestError::Config(_) | IngestError::Lookup { .. } => None,
        }
    }

    pub(crate) fn network(step: ProtocolStep) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| IngestError::Network { step, source }
    }

    pub(crate) fn xml(step: ProtocolStep) -> impl FnOnce(XmlError) -> Self {
        move |source| IngestError::Xml { step, source }
    }
}

/// Result type for ingest operations
pub type IngestResult<T> = Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_names_step_status_and_body() {
        let err = IngestError::Backend {
            step: ProtocolStep::AttachTrack,
            status: 500,
            body: "disk full".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("add track"), "{}", msg);
        assert!(msg.contains("500"), "{}", msg);
        assert!(msg.contains("disk full"), "{}", msg);
        assert_eq!(err.step(), Some(ProtocolStep::AttachTrack));
    }

    #[test]
    fn test_config_error_has_no_step() {
        let err = IngestError::Config("no ACL".to_string());
        assert_eq!(err.step(), None);
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = IngestError::Io {
            step: ProtocolStep::AttachTrack,
            path: PathBuf::from("/rec/missing.mp4"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/rec/missing.mp4"));
    }
}
