//! Change detection against the live repository.
//!
//! Three read-only queries a caller runs beside (or instead of) a full scan:
//! which known ids are gone, which known ids moved, and which items changed
//! after a generation counter value.

use crate::error::{Result, SyncError};
use bridge_traits::{
    Column, MediaCollection, MediaRepository, MediaRow, RepositoryCapabilities, RowFilter,
    RowQuery,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, instrument};

pub struct ChangeDetector {
    repository: Arc<dyn MediaRepository>,
    capabilities: RepositoryCapabilities,
}

impl ChangeDetector {
    pub fn new(repository: Arc<dyn MediaRepository>) -> Self {
        let capabilities = repository.capabilities();
        Self {
            repository,
            capabilities,
        }
    }

    /// Run with already resolved capabilities instead of the repository's own.
    pub fn with_capabilities(mut self, capabilities: RepositoryCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Known ids that no longer exist in either collection, in the order they
    /// were given and without duplicates.
    #[instrument(skip(self, known_ids), fields(known = known_ids.len()))]
    pub fn obsolete_content_ids(&self, known_ids: &[i64]) -> Vec<i64> {
        let mut live = HashSet::new();
        for collection in MediaCollection::ALL {
            let query = RowQuery::new(collection, &[Column::Id]);
            self.absorb(collection, self.for_each_row(&query, |row| {
                live.insert(row.id);
            }));
        }

        let mut seen = HashSet::new();
        let obsolete: Vec<i64> = known_ids
            .iter()
            .copied()
            .filter(|id| !live.contains(id) && seen.insert(*id))
            .collect();
        debug!(live = live.len(), obsolete = obsolete.len(), "Checked content ids");
        obsolete
    }

    /// Known ids whose live path differs from the recorded one. A missing
    /// path is a value like any other.
    #[instrument(skip(self, known_path_by_id), fields(known = known_path_by_id.len()))]
    pub fn obsolete_paths(&self, known_path_by_id: &HashMap<i64, Option<String>>) -> Vec<i64> {
        let mut obsolete = Vec::new();
        for collection in MediaCollection::ALL {
            let query = RowQuery::new(collection, &[Column::Id, Column::Data]);
            self.absorb(collection, self.for_each_row(&query, |row| {
                if let Some(known) = known_path_by_id.get(&row.id) {
                    if *known != row.path {
                        obsolete.push(row.id);
                    }
                }
            }));
        }
        obsolete
    }

    /// URIs of items modified after `since_generation`.
    ///
    /// Empty when the repository has no generation counter; callers then fall
    /// back to a full scan.
    #[instrument(skip(self))]
    pub fn changed_uris(&self, since_generation: i64) -> Vec<String> {
        if !self.capabilities.generation_counter {
            debug!("Repository has no generation counter");
            return Vec::new();
        }

        let mut uris = Vec::new();
        for collection in MediaCollection::ALL {
            let query = RowQuery::new(collection, &[Column::Id])
                .with_filter(Some(RowFilter::GenerationAfter(since_generation)));
            self.absorb(collection, self.for_each_row(&query, |row| {
                uris.push(collection.item_uri(row.id));
            }));
        }
        uris
    }

    fn for_each_row(&self, query: &RowQuery, mut visit: impl FnMut(MediaRow)) -> Result<()> {
        let collection = query.collection;
        let cursor = self
            .repository
            .query(query)
            .map_err(|source| SyncError::Query { collection, source })?;

        let mut rows_read = 0;
        for row in cursor {
            let row = row.map_err(|source| SyncError::Cursor {
                collection,
                rows_read,
                source,
            })?;
            rows_read += 1;
            visit(row);
        }
        Ok(())
    }

    fn absorb(&self, collection: MediaCollection, result: Result<()>) {
        if let Err(e) = result {
            error!(%collection, "Change query failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{BridgeError, RowCursor};

    struct StaticRepository {
        images: Vec<MediaRow>,
        videos: Vec<MediaRow>,
        capabilities: RepositoryCapabilities,
        broken: Option<MediaCollection>,
    }

    impl MediaRepository for StaticRepository {
        fn capabilities(&self) -> RepositoryCapabilities {
            self.capabilities
        }

        fn query(&self, query: &RowQuery) -> BridgeResult<RowCursor> {
            if self.broken == Some(query.collection) {
                return Err(BridgeError::QueryFailed {
                    collection: query.collection.to_string(),
                    message: "provider crashed".to_string(),
                });
            }
            let rows = match query.collection {
                MediaCollection::Images => &self.images,
                MediaCollection::Videos => &self.videos,
            };
            let filter = query.filter.clone();
            let rows: Vec<_> = rows
                .iter()
                .filter(|row| filter.as_ref().map_or(true, |f| f.matches(row)))
                .cloned()
                .map(Ok)
                .collect();
            Ok(Box::new(rows.into_iter()))
        }
    }

    fn detector(images: Vec<MediaRow>, videos: Vec<MediaRow>) -> ChangeDetector {
        ChangeDetector::new(Arc::new(StaticRepository {
            images,
            videos,
            capabilities: RepositoryCapabilities::default(),
            broken: None,
        }))
    }

    #[test]
    fn test_obsolete_ids_keep_order_and_dedupe() {
        let detector = detector(vec![MediaRow::new(2)], vec![MediaRow::new(4)]);
        assert_eq!(detector.obsolete_content_ids(&[5, 1, 2, 5, 4]), vec![5, 1]);
    }

    #[test]
    fn test_obsolete_paths_compare_missing_paths() {
        let detector = detector(
            vec![
                MediaRow::new(1).with_path("/a/1.jpg"),
                MediaRow::new(2),
                MediaRow::new(3).with_path("/a/3.jpg"),
            ],
            vec![],
        );
        let known = HashMap::from([
            (1, Some("/a/1.jpg".to_string())),
            (2, Some("/a/2.jpg".to_string())),
            (3, None),
            (99, Some("/gone.jpg".to_string())),
        ]);

        let mut obsolete = detector.obsolete_paths(&known);
        obsolete.sort();
        assert_eq!(obsolete, vec![2, 3]);
    }

    #[test]
    fn test_changed_uris_without_generation_counter() {
        let detector = ChangeDetector::new(Arc::new(StaticRepository {
            images: vec![MediaRow::new(1).with_generation(10)],
            videos: vec![],
            capabilities: RepositoryCapabilities::legacy(),
            broken: None,
        }));
        assert!(detector.changed_uris(0).is_empty());
    }

    #[test]
    fn test_changed_uris_follow_resolved_capabilities() {
        let detector = detector(vec![MediaRow::new(1).with_generation(10)], vec![]);
        assert_eq!(detector.changed_uris(0).len(), 1);

        let detector = detector.with_capabilities(RepositoryCapabilities {
            generation_counter: false,
            ..RepositoryCapabilities::default()
        });
        assert!(detector.changed_uris(0).is_empty());
    }

    #[test]
    fn test_failed_collection_contributes_nothing() {
        let detector = ChangeDetector::new(Arc::new(StaticRepository {
            images: vec![MediaRow::new(1).with_generation(5)],
            videos: vec![MediaRow::new(2).with_generation(5)],
            capabilities: RepositoryCapabilities::default(),
            broken: Some(MediaCollection::Images),
        }));
        assert_eq!(
            detector.changed_uris(0),
            vec!["content://media/external/video/media/2".to_string()]
        );
    }
}
