use thiserror::Error;

use courier_common::error::AppError;
use courier_common::types::UnknownChannel;

/// Whether retrying an unchanged delivery attempt could succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Timeouts, dropped connections, provider temporarily unavailable.
    Transient,
    /// Malformed address, rejected recipient, bad credentials.
    Permanent,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Transient => write!(f, "transient"),
            FailureKind::Permanent => write!(f, "permanent"),
        }
    }
}

/// A single failed delivery attempt, classified by the transport that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} transport failure: {message}")]
pub struct TransportError {
    kind: FailureKind,
    message: String,
}

impl TransportError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transient,
            message: message.into(),
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Permanent,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn is_transient(&self) -> bool {
        self.kind == FailureKind::Transient
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Input errors caught before any transport is called. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid channel: {0}")]
    InvalidChannel(String),
}

impl From<UnknownChannel> for DispatchError {
    fn from(err: UnknownChannel) -> Self {
        DispatchError::InvalidChannel(err.to_string())
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        AppError::Validation(err.to_string())
    }
}
