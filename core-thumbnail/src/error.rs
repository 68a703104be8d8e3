use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("Invalid thumbnail request: {0}")]
    InvalidRequest(String),

    #[error("failed to get thumbnail for mimeType={mime_type} uri={uri}")]
    Exhausted {
        uri: String,
        mime_type: String,
        /// Last error reported by a strategy
        detail: Option<String>,
    },

    #[error("Not enough memory for a {required} byte thumbnail ({available} available)")]
    OutOfMemory { required: u64, available: u64 },

    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, ThumbnailError>;
