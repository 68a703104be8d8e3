//! # Catalog Scanner
//!
//! Differential scan of the repository's image and video collections.
//!
//! ## Workflow
//!
//! 1. Query the image collection, then the video collection, newest first
//! 2. Keep rows that are unknown or strictly newer than the known state
//! 3. With a directory scope, keep only direct children of that directory
//! 4. Backfill rows with missing dimensions or duration
//!
//! The result is a pull-based iterator. Nothing is read from the repository
//! until the caller asks for the next record, and dropping the iterator
//! releases the open cursor.
//!
//! ## Error Handling
//!
//! A collection that cannot be queried contributes no rows. A cursor that
//! fails part-way ends its collection, keeping the rows already produced.
//! Neither stops the other collection.

use crate::backfill::MetadataBackfill;
use crate::error::SyncError;
use crate::models::{DirectoryScope, KnownState, MediaRecord, RecordOrigin};
use bridge_traits::{
    Column, MediaCollection, MediaRepository, MediaRow, MetadataReader, RepositoryCapabilities,
    RowCursor, RowFilter, RowQuery, SortOrder,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const BASE_PROJECTION: &[Column] = &[
    Column::Id,
    Column::Data,
    Column::MimeType,
    Column::Size,
    Column::Width,
    Column::Height,
    Column::DateAdded,
    Column::DateModified,
    Column::DateTaken,
];

/// Scanner over the repository collections.
#[derive(Clone)]
pub struct CatalogScanner {
    repository: Arc<dyn MediaRepository>,
    backfill: Arc<MetadataBackfill>,
    capabilities: RepositoryCapabilities,
}

impl CatalogScanner {
    pub fn new(repository: Arc<dyn MediaRepository>, reader: Arc<dyn MetadataReader>) -> Self {
        let capabilities = repository.capabilities();
        Self {
            repository,
            backfill: Arc::new(MetadataBackfill::new(reader)),
            capabilities,
        }
    }

    /// Run with already resolved capabilities instead of the repository's own.
    pub fn with_capabilities(mut self, capabilities: RepositoryCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Start a differential scan against `known`.
    #[instrument(skip(self, known), fields(known = known.len(), scoped = known.directory().is_some()))]
    pub fn scan(&self, known: KnownState) -> CatalogScan {
        info!("Starting catalog scan");
        CatalogScan {
            repository: Arc::clone(&self.repository),
            backfill: Arc::clone(&self.backfill),
            capabilities: self.capabilities,
            known,
            pending: MediaCollection::ALL.into_iter(),
            current: None,
        }
    }

    /// Row count across both collections. Collections that fail to count
    /// contribute zero.
    #[instrument(skip(self))]
    pub fn count(&self, filter: Option<&RowFilter>) -> u64 {
        MediaCollection::ALL
            .into_iter()
            .map(|collection| match self.repository.count(collection, filter) {
                Ok(count) => count,
                Err(source) => {
                    let e = SyncError::Query { collection, source };
                    error!("Failed to count rows: {}", e);
                    0
                }
            })
            .sum()
    }

    /// Projection requested for a collection.
    pub fn projection(&self, collection: MediaCollection) -> Vec<Column> {
        projection_for(collection, &self.capabilities)
    }
}

fn projection_for(collection: MediaCollection, capabilities: &RepositoryCapabilities) -> Vec<Column> {
    let mut projection = BASE_PROJECTION.to_vec();
    match collection {
        MediaCollection::Images => projection.push(Column::Orientation),
        MediaCollection::Videos => {
            projection.push(Column::Duration);
            if capabilities.video_orientation {
                projection.push(Column::Orientation);
            }
        }
    }
    projection
}

/// Lazy sequence of new or updated records. Images come before videos.
pub struct CatalogScan {
    repository: Arc<dyn MediaRepository>,
    backfill: Arc<MetadataBackfill>,
    capabilities: RepositoryCapabilities,
    known: KnownState,
    pending: std::array::IntoIter<MediaCollection, 2>,
    current: Option<OpenCollection>,
}

struct OpenCollection {
    collection: MediaCollection,
    cursor: RowCursor,
    rows_read: u64,
}

impl CatalogScan {
    /// Open the next collection that can be queried. `None` once both are done.
    fn open_next(&mut self) -> Option<()> {
        loop {
            let collection = self.pending.next()?;
            let query = RowQuery::new(collection, &projection_for(collection, &self.capabilities))
                .with_filter(
                    self.known
                        .directory()
                        .map(|scope| RowFilter::PathPrefix(scope.prefix().to_string())),
                )
                .sorted_by(SortOrder::DateModifiedDesc);

            match self.repository.query(&query) {
                Ok(cursor) => {
                    debug!(%collection, "Opened collection cursor");
                    self.current = Some(OpenCollection {
                        collection,
                        cursor,
                        rows_read: 0,
                    });
                    return Some(());
                }
                Err(source) => {
                    let e = SyncError::Query { collection, source };
                    error!("Skipping collection: {}", e);
                }
            }
        }
    }

    fn accept(&self, collection: MediaCollection, row: MediaRow) -> Option<MediaRecord> {
        let date_modified_millis = row.date_modified_secs.unwrap_or(0).saturating_mul(1000);
        if !self.known.is_modified(row.id, date_modified_millis) {
            return None;
        }

        if let Some(scope) = self.known.directory() {
            if !in_scope(scope, row.path.as_deref()) {
                return None;
            }
        }

        let uri = collection.item_uri(row.id);
        let Some(mime_type) = row.mime_type else {
            warn!(%uri, "Skipping row without MIME type");
            return None;
        };

        if let Some(path) = row.path.as_deref() {
            if Path::new(path).is_dir() {
                warn!(%uri, "Skipping row whose path is a directory");
                return None;
            }
        }

        let mut record = MediaRecord {
            origin: RecordOrigin::MediaStoreContent,
            content_id: row.id,
            uri,
            path: row.path,
            mime_type,
            width: row.width.unwrap_or(0),
            height: row.height.unwrap_or(0),
            rotation_degrees: row.orientation.unwrap_or(0),
            size_bytes: row.size_bytes.unwrap_or(0),
            date_added_secs: row.date_added_secs.unwrap_or(0),
            date_modified_millis,
            date_taken_millis: row.date_taken_millis,
            duration_millis: row.duration_millis.unwrap_or(0),
        };

        if record.needs_backfill(collection == MediaCollection::Videos) {
            self.backfill.fill(&mut record);
        }

        Some(record)
    }
}

fn in_scope(scope: &DirectoryScope, path: Option<&str>) -> bool {
    path.is_some_and(|path| scope.contains_directly(path))
}

impl Iterator for CatalogScan {
    type Item = MediaRecord;

    fn next(&mut self) -> Option<MediaRecord> {
        loop {
            let Some(open) = self.current.as_mut() else {
                self.open_next()?;
                continue;
            };

            let collection = open.collection;
            match open.cursor.next() {
                None => {
                    debug!(%collection, rows = open.rows_read, "Collection exhausted");
                    self.current = None;
                }
                Some(Err(source)) => {
                    let e = SyncError::Cursor {
                        collection,
                        rows_read: open.rows_read,
                        source,
                    };
                    error!("Ending collection early: {}", e);
                    self.current = None;
                }
                Some(Ok(row)) => {
                    open.rows_read += 1;
                    if let Some(record) = self.accept(collection, row) {
                        return Some(record);
                    }
                }
            }
        }
    }
}
