//! In-memory media repository.
//!
//! Desktop platforms have no OS media index, so hosts register the files they
//! know about here. Every insert, update or removal bumps a generation
//! counter, which makes generation-based deltas available. Thumbnails are
//! produced from the file behind a row when there is one.

use bridge_traits::error::{BridgeError, Result};
use bridge_traits::uri::parse_content_id;
use bridge_traits::{
    MediaCollection, MediaRepository, MediaRow, RepositoryCapabilities, RowCursor, RowQuery,
    SortOrder,
};
use image::{DynamicImage, ImageReader};
use parking_lot::RwLock;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

#[derive(Default)]
struct Collections {
    images: BTreeMap<i64, MediaRow>,
    videos: BTreeMap<i64, MediaRow>,
    generation: i64,
    next_id: i64,
}

impl Collections {
    fn rows(&self, collection: MediaCollection) -> &BTreeMap<i64, MediaRow> {
        match collection {
            MediaCollection::Images => &self.images,
            MediaCollection::Videos => &self.videos,
        }
    }

    fn rows_mut(&mut self, collection: MediaCollection) -> &mut BTreeMap<i64, MediaRow> {
        match collection {
            MediaCollection::Images => &mut self.images,
            MediaCollection::Videos => &mut self.videos,
        }
    }
}

pub struct MemoryMediaRepository {
    state: RwLock<Collections>,
    capabilities: RepositoryCapabilities,
}

impl MemoryMediaRepository {
    pub fn new() -> Self {
        Self::with_capabilities(RepositoryCapabilities::default())
    }

    pub fn with_capabilities(capabilities: RepositoryCapabilities) -> Self {
        Self {
            state: RwLock::new(Collections {
                next_id: 1,
                ..Default::default()
            }),
            capabilities,
        }
    }

    /// Add or replace a row. A row with a non-positive id gets a fresh one.
    /// Returns the id.
    pub fn insert(&self, collection: MediaCollection, mut row: MediaRow) -> i64 {
        let mut state = self.state.write();
        if row.id <= 0 {
            row.id = state.next_id;
        }
        state.next_id = state.next_id.max(row.id + 1);
        state.generation += 1;
        row.generation_modified = Some(state.generation);

        let id = row.id;
        state.rows_mut(collection).insert(id, row);
        id
    }

    /// Modify a row in place. Returns false when the id is unknown.
    pub fn update(
        &self,
        collection: MediaCollection,
        id: i64,
        modify: impl FnOnce(&mut MediaRow),
    ) -> bool {
        let mut state = self.state.write();
        let generation = state.generation + 1;
        let Some(row) = state.rows_mut(collection).get_mut(&id) else {
            return false;
        };
        modify(row);
        row.id = id;
        row.generation_modified = Some(generation);
        state.generation = generation;
        true
    }

    pub fn remove(&self, collection: MediaCollection, id: i64) -> bool {
        let mut state = self.state.write();
        let removed = state.rows_mut(collection).remove(&id).is_some();
        if removed {
            state.generation += 1;
        }
        removed
    }

    /// Latest generation handed out.
    pub fn generation(&self) -> i64 {
        self.state.read().generation
    }

    /// Ids are unique only within a collection.
    fn find_path(&self, collection: MediaCollection, id: i64) -> Option<String> {
        self.state
            .read()
            .rows(collection)
            .get(&id)
            .and_then(|row| row.path.clone())
    }
}

impl Default for MemoryMediaRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaRepository for MemoryMediaRepository {
    fn capabilities(&self) -> RepositoryCapabilities {
        self.capabilities
    }

    fn query(&self, query: &RowQuery) -> Result<RowCursor> {
        let state = self.state.read();
        let mut rows: Vec<MediaRow> = state
            .rows(query.collection)
            .values()
            .filter(|row| query.filter.as_ref().map_or(true, |filter| filter.matches(row)))
            .map(|row| row.project(&query.projection))
            .collect();

        match query.sort {
            Some(SortOrder::DateModifiedDesc) => {
                rows.sort_by_key(|row| Reverse(row.date_modified_secs))
            }
            None => {}
        }

        debug!(collection = %query.collection, rows = rows.len(), "Queried memory repository");
        Ok(Box::new(rows.into_iter().map(Ok)))
    }

    fn load_thumbnail(&self, uri: &str, width: u32, height: u32) -> Result<Option<DynamicImage>> {
        let (Some(collection), Some(id)) =
            (MediaCollection::for_item_uri(uri), parse_content_id(uri))
        else {
            return Ok(None);
        };
        let Some(path) = self.find_path(collection, id) else {
            return Ok(None);
        };
        open_thumbnail(Path::new(&path), width, height)
    }

    fn legacy_thumbnail(
        &self,
        collection: MediaCollection,
        content_id: i64,
    ) -> Result<Option<DynamicImage>> {
        let Some(path) = self.find_path(collection, content_id) else {
            return Ok(None);
        };
        // "mini" thumbnails are 512 x 384
        open_thumbnail(Path::new(&path), 512, 384)
    }
}

fn open_thumbnail(path: &Path, width: u32, height: u32) -> Result<Option<DynamicImage>> {
    if !path.is_file() {
        return Ok(None);
    }
    let img = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| BridgeError::Decode(e.to_string()))?;
    Ok(Some(img.thumbnail(width, height)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{Column, RowFilter};

    fn image_row(path: &str, modified: i64) -> MediaRow {
        MediaRow::new(0)
            .with_path(path)
            .with_mime_type("image/jpeg")
            .with_date_modified_secs(modified)
    }

    #[test]
    fn test_insert_assigns_ids_and_generations() {
        let repo = MemoryMediaRepository::new();
        let a = repo.insert(MediaCollection::Images, image_row("/p/a.jpg", 1));
        let b = repo.insert(MediaCollection::Videos, MediaRow::new(10));
        let c = repo.insert(MediaCollection::Images, image_row("/p/c.jpg", 2));

        assert_eq!((a, b, c), (1, 10, 11));
        assert_eq!(repo.generation(), 3);
    }

    #[test]
    fn test_query_filters_sorts_and_projects() {
        let repo = MemoryMediaRepository::new();
        repo.insert(MediaCollection::Images, image_row("/p/a.jpg", 1));
        repo.insert(MediaCollection::Images, image_row("/p/b.jpg", 5));
        repo.insert(MediaCollection::Images, image_row("/q/c.jpg", 9));

        let query = RowQuery::new(MediaCollection::Images, &[Column::Id, Column::DateModified])
            .with_filter(Some(RowFilter::PathPrefix("/p/".to_string())))
            .sorted_by(SortOrder::DateModifiedDesc);
        let rows: Vec<MediaRow> = repo.query(&query).unwrap().map(|r| r.unwrap()).collect();

        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 1]);
        assert!(rows.iter().all(|r| r.path.is_none()));
    }

    #[test]
    fn test_update_and_remove_bump_generation() {
        let repo = MemoryMediaRepository::new();
        let id = repo.insert(MediaCollection::Images, image_row("/p/a.jpg", 1));

        assert!(repo.update(MediaCollection::Images, id, |row| {
            row.path = Some("/p/moved.jpg".to_string())
        }));
        assert_eq!(repo.generation(), 2);
        assert!(!repo.update(MediaCollection::Videos, id, |_| {}));

        let changed = RowQuery::new(MediaCollection::Images, &[Column::Id])
            .with_filter(Some(RowFilter::GenerationAfter(1)));
        assert_eq!(repo.query(&changed).unwrap().count(), 1);

        assert!(repo.remove(MediaCollection::Images, id));
        assert!(!repo.remove(MediaCollection::Images, id));
        assert_eq!(repo.generation(), 3);
    }

    #[test]
    fn test_thumbnails_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        DynamicImage::new_rgb8(1024, 768).save(&path).unwrap();

        let repo = MemoryMediaRepository::new();
        let id = repo.insert(
            MediaCollection::Images,
            image_row(&path.to_string_lossy(), 1),
        );
        let uri = MediaCollection::Images.item_uri(id);

        let thumb = repo.load_thumbnail(&uri, 256, 256).unwrap().unwrap();
        assert_eq!((thumb.width(), thumb.height()), (256, 192));

        let mini = repo
            .legacy_thumbnail(MediaCollection::Images, id)
            .unwrap()
            .unwrap();
        assert_eq!((mini.width(), mini.height()), (512, 384));

        assert!(repo
            .load_thumbnail("content://media/external/images/media/999", 10, 10)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_thumbnails_stay_within_their_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        DynamicImage::new_rgb8(300, 200).save(&path).unwrap();

        let repo = MemoryMediaRepository::new();
        let mut image = image_row(&path.to_string_lossy(), 1);
        image.id = 7;
        repo.insert(MediaCollection::Images, image);
        repo.insert(
            MediaCollection::Videos,
            MediaRow::new(7)
                .with_path("/clips/v.mp4")
                .with_mime_type("video/mp4"),
        );

        assert!(repo
            .load_thumbnail(&MediaCollection::Videos.item_uri(7), 64, 64)
            .unwrap()
            .is_none());
        assert!(repo
            .legacy_thumbnail(MediaCollection::Videos, 7)
            .unwrap()
            .is_none());

        let thumb = repo
            .load_thumbnail(&MediaCollection::Images.item_uri(7), 64, 64)
            .unwrap()
            .unwrap();
        assert_eq!((thumb.width(), thumb.height()), (64, 43));
        assert!(repo
            .legacy_thumbnail(MediaCollection::Images, 7)
            .unwrap()
            .is_some());
    }
}
