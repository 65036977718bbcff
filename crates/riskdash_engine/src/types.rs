use std::fmt;
use std::path::Path;

use riskdash_core::ValidationError;
use thiserror::Error;

/// A filing to upload, sent as one multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self { file_name, bytes })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestFailure {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} ({})", self.kind, self.message)
        }
    }
}

impl std::error::Error for RequestFailure {}

/// Failures surfaced by gateway operations, one variant per failing action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("analysis could not be started: {0}")]
    Submission(RequestFailure),
    #[error("document upload failed: {0}")]
    Upload(RequestFailure),
    #[error("job status poll failed: {0}")]
    Poll(RequestFailure),
    #[error("request failed: {0}")]
    Request(RequestFailure),
}

impl GatewayError {
    pub fn failure(&self) -> Option<&RequestFailure> {
        match self {
            GatewayError::Validation(_) => None,
            GatewayError::Submission(failure)
            | GatewayError::Upload(failure)
            | GatewayError::Poll(failure)
            | GatewayError::Request(failure) => Some(failure),
        }
    }
}
