use bridge_traits::{BridgeError, MediaCollection};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Query against {collection} failed: {source}")]
    Query {
        collection: MediaCollection,
        #[source]
        source: BridgeError,
    },

    #[error("Cursor over {collection} failed after {rows_read} rows: {source}")]
    Cursor {
        collection: MediaCollection,
        rows_read: u64,
        #[source]
        source: BridgeError,
    },

    #[error("Invalid directory scope: {0:?}")]
    InvalidDirectory(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
