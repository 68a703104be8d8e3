use bridge_traits::BridgeError;
use core_sync::SyncError;
use core_thumbnail::ThumbnailError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid arguments for {operation}: {message}")]
    InvalidArgument { operation: String, message: String },

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Thumbnail(#[from] ThumbnailError),

    #[error("Stream read failed: {0}")]
    Stream(#[from] std::io::Error),

    #[error("Task failed: {0}")]
    Task(String),
}

impl CoreError {
    pub fn invalid_argument(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Machine-readable category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            Self::Runtime(core_runtime::Error::Config(_)) => ErrorKind::InvalidArgument,
            Self::Runtime(core_runtime::Error::CapabilityMissing { .. }) => ErrorKind::NotSupported,
            Self::Sync(SyncError::InvalidDirectory(_)) => ErrorKind::InvalidArgument,
            Self::Sync(_) => ErrorKind::ResourceUnavailable,
            Self::Thumbnail(err) => match err {
                ThumbnailError::InvalidRequest(_) => ErrorKind::InvalidArgument,
                ThumbnailError::Exhausted { .. } => ErrorKind::ResourceUnavailable,
                ThumbnailError::OutOfMemory { .. } => ErrorKind::OutOfMemory,
                ThumbnailError::Encode(_) => ErrorKind::Internal,
                ThumbnailError::Bridge(BridgeError::NotAvailable(_)) => ErrorKind::NotSupported,
                ThumbnailError::Bridge(_) => ErrorKind::ResourceUnavailable,
            },
            Self::Stream(_) => ErrorKind::ResourceUnavailable,
            Self::Task(_) => ErrorKind::Internal,
        }
    }

    /// Error code reported to hosts, `<operation>-<suffix>`.
    pub fn code(&self, operation: &str) -> String {
        let suffix = match self {
            Self::InvalidArgument { .. }
            | Self::Thumbnail(ThumbnailError::InvalidRequest(_))
            | Self::Sync(SyncError::InvalidDirectory(_)) => "args",
            Self::Thumbnail(ThumbnailError::Exhausted { .. }) => "null",
            Self::Thumbnail(ThumbnailError::OutOfMemory { .. }) => "oom",
            _ => "exception",
        };
        format!("{}-{}", operation, suffix)
    }

    /// Underlying failure detail, when there is one beyond the message.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Thumbnail(ThumbnailError::Exhausted { detail, .. }) => detail.clone(),
            Self::Sync(SyncError::Query { source, .. } | SyncError::Cursor { source, .. }) => {
                Some(source.to_string())
            }
            Self::Thumbnail(ThumbnailError::Bridge(source)) => Some(format!("{:?}", source)),
            Self::Stream(source) => Some(format!("{:?}", source.kind())),
            _ => None,
        }
    }
}

/// Category of a failure surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    ResourceUnavailable,
    OutOfMemory,
    NotSupported,
    NotImplemented,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidArgument => "invalid_argument",
            Self::ResourceUnavailable => "resource_unavailable",
            Self::OutOfMemory => "out_of_memory",
            Self::NotSupported => "not_supported",
            Self::NotImplemented => "not_implemented",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
