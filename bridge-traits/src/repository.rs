//! Media Repository Abstractions
//!
//! The repository is the OS-managed media index. It exposes two independent
//! collections (images and videos) that can be queried with a projection, an
//! optional filter and an optional sort order. Results come back as a cursor
//! that is pulled row by row.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BridgeError, Result};

/// One of the two source collections of the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaCollection {
    Images,
    Videos,
}

impl MediaCollection {
    /// Scan order: images are always exhausted before videos.
    pub const ALL: [MediaCollection; 2] = [MediaCollection::Images, MediaCollection::Videos];

    /// Base content URI of the collection.
    pub fn content_uri(&self) -> &'static str {
        match self {
            Self::Images => "content://media/external/images/media",
            Self::Videos => "content://media/external/video/media",
        }
    }

    /// Content URI of a single item, built by appending its identifier.
    pub fn item_uri(&self, content_id: i64) -> String {
        format!("{}/{}", self.content_uri(), content_id)
    }

    /// Collection an item URI belongs to, from its base content URI.
    pub fn for_item_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|collection| {
            uri.strip_prefix(collection.content_uri())
                .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Pick the collection matching a MIME type, if it is an image or a video.
    pub fn for_mime_type(mime_type: &str) -> Option<Self> {
        if mime_type.starts_with("image/") {
            Some(Self::Images)
        } else if mime_type.starts_with("video/") {
            Some(Self::Videos)
        } else {
            None
        }
    }
}

impl fmt::Display for MediaCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Images => f.write_str("images"),
            Self::Videos => f.write_str("videos"),
        }
    }
}

/// Columns that can be requested in a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Data,
    MimeType,
    Size,
    Width,
    Height,
    DateAdded,
    DateModified,
    DateTaken,
    Orientation,
    Duration,
    GenerationModified,
}

/// Source-level row filter.
///
/// The repository can only express prefix matching on paths; anything finer
/// has to be done by the caller on the returned rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFilter {
    /// `path LIKE '<prefix>%'`
    PathPrefix(String),
    /// `generation_modified > <value>`
    GenerationAfter(i64),
}

impl RowFilter {
    /// Evaluate the filter against a row, for repositories that filter in
    /// process.
    pub fn matches(&self, row: &MediaRow) -> bool {
        match self {
            Self::PathPrefix(prefix) => row
                .path
                .as_deref()
                .is_some_and(|path| path.starts_with(prefix.as_str())),
            Self::GenerationAfter(generation) => row
                .generation_modified
                .is_some_and(|value| value > *generation),
        }
    }
}

/// Sort orders supported by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    DateModifiedDesc,
}

/// A query against one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowQuery {
    pub collection: MediaCollection,
    pub projection: Vec<Column>,
    pub filter: Option<RowFilter>,
    pub sort: Option<SortOrder>,
}

impl RowQuery {
    pub fn new(collection: MediaCollection, projection: &[Column]) -> Self {
        Self {
            collection,
            projection: projection.to_vec(),
            filter: None,
            sort: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<RowFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn sorted_by(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn projects(&self, column: Column) -> bool {
        self.projection.contains(&column)
    }
}

/// A repository row. Columns outside the query projection are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaRow {
    pub id: i64,
    pub path: Option<String>,
    pub mime_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub date_added_secs: Option<i64>,
    pub date_modified_secs: Option<i64>,
    pub date_taken_millis: Option<i64>,
    pub orientation: Option<i32>,
    pub duration_millis: Option<i64>,
    pub generation_modified: Option<i64>,
}

impl MediaRow {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_date_modified_secs(mut self, secs: i64) -> Self {
        self.date_modified_secs = Some(secs);
        self
    }

    pub fn with_duration_millis(mut self, duration: i64) -> Self {
        self.duration_millis = Some(duration);
        self
    }

    pub fn with_generation(mut self, generation: i64) -> Self {
        self.generation_modified = Some(generation);
        self
    }

    /// Copy of the row restricted to the query projection.
    pub fn project(&self, projection: &[Column]) -> Self {
        let keep = |column: Column| projection.contains(&column);
        Self {
            id: self.id,
            path: self.path.clone().filter(|_| keep(Column::Data)),
            mime_type: self.mime_type.clone().filter(|_| keep(Column::MimeType)),
            size_bytes: self.size_bytes.filter(|_| keep(Column::Size)),
            width: self.width.filter(|_| keep(Column::Width)),
            height: self.height.filter(|_| keep(Column::Height)),
            date_added_secs: self.date_added_secs.filter(|_| keep(Column::DateAdded)),
            date_modified_secs: self.date_modified_secs.filter(|_| keep(Column::DateModified)),
            date_taken_millis: self.date_taken_millis.filter(|_| keep(Column::DateTaken)),
            orientation: self.orientation.filter(|_| keep(Column::Orientation)),
            duration_millis: self.duration_millis.filter(|_| keep(Column::Duration)),
            generation_modified: self
                .generation_modified
                .filter(|_| keep(Column::GenerationModified)),
        }
    }
}

/// Pull-based cursor over query results.
///
/// Dropping the cursor must release the native resources behind it. A
/// mid-iteration failure is reported as an `Err` item; callers stop reading
/// the cursor after the first error.
pub type RowCursor = Box<dyn Iterator<Item = Result<MediaRow>> + Send>;

/// Which repository thumbnail API the platform offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThumbnailApi {
    /// Size-aware thumbnail loading by URI.
    #[default]
    Resolver,
    /// Fixed-size thumbnails looked up by content identifier.
    Legacy,
    /// No repository thumbnails; always decode.
    None,
}

impl ThumbnailApi {
    /// Newer APIs imply the older ones are still served.
    fn level(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Legacy => 1,
            Self::Resolver => 2,
        }
    }
}

/// Platform capabilities, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryCapabilities {
    /// Rows carry a monotonically increasing `generation_modified` counter.
    pub generation_counter: bool,
    /// Thumbnail API offered by the repository.
    pub thumbnail_api: ThumbnailApi,
    /// Repository thumbnails already have orientation applied.
    pub normalizes_orientation: bool,
    /// The video collection exposes an orientation column.
    pub video_orientation: bool,
}

impl Default for RepositoryCapabilities {
    fn default() -> Self {
        Self {
            generation_counter: true,
            thumbnail_api: ThumbnailApi::Resolver,
            normalizes_orientation: true,
            video_orientation: true,
        }
    }
}

impl RepositoryCapabilities {
    /// Capabilities of an older platform: no generation counter, legacy
    /// thumbnails, orientation not applied.
    pub fn legacy() -> Self {
        Self {
            generation_counter: false,
            thumbnail_api: ThumbnailApi::Legacy,
            normalizes_orientation: false,
            video_orientation: false,
        }
    }

    /// First capability claimed here that `available` cannot back, if any.
    ///
    /// Claims may narrow what the repository offers. Orientation
    /// normalization describes the repository's thumbnails, so it must match
    /// exactly.
    pub fn unsupported_by(&self, available: &Self) -> Option<&'static str> {
        if self.generation_counter && !available.generation_counter {
            Some("generation_counter")
        } else if self.thumbnail_api.level() > available.thumbnail_api.level() {
            Some("thumbnail_api")
        } else if self.normalizes_orientation != available.normalizes_orientation {
            Some("normalizes_orientation")
        } else if self.video_orientation && !available.video_orientation {
            Some("video_orientation")
        } else {
            None
        }
    }
}

/// Media repository trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::repository::{Column, MediaCollection, MediaRepository, RowQuery};
///
/// fn live_ids(repo: &dyn MediaRepository) -> Result<Vec<i64>> {
///     let query = RowQuery::new(MediaCollection::Images, &[Column::Id]);
///     repo.query(&query)?.map(|row| row.map(|row| row.id)).collect()
/// }
/// ```
pub trait MediaRepository: Send + Sync {
    /// Capabilities of this repository.
    fn capabilities(&self) -> RepositoryCapabilities;

    /// Run a query against one collection.
    fn query(&self, query: &RowQuery) -> Result<RowCursor>;

    /// Number of rows in a collection matching the filter.
    fn count(&self, collection: MediaCollection, filter: Option<&RowFilter>) -> Result<u64> {
        let query = RowQuery::new(collection, &[Column::Id]).with_filter(filter.cloned());
        let mut total = 0u64;
        for row in self.query(&query)? {
            row?;
            total += 1;
        }
        Ok(total)
    }

    /// Size-aware repository thumbnail for an item URI.
    ///
    /// Returns `Ok(None)` when the repository has no thumbnail for the item.
    fn load_thumbnail(&self, uri: &str, width: u32, height: u32) -> Result<Option<DynamicImage>> {
        let _ = (uri, width, height);
        Err(BridgeError::NotAvailable("load_thumbnail".to_string()))
    }

    /// Fixed-size ("mini") repository thumbnail looked up by identifier.
    fn legacy_thumbnail(
        &self,
        collection: MediaCollection,
        content_id: i64,
    ) -> Result<Option<DynamicImage>> {
        let _ = (collection, content_id);
        Err(BridgeError::NotAvailable("legacy_thumbnail".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_uri() {
        assert_eq!(
            MediaCollection::Images.item_uri(42),
            "content://media/external/images/media/42"
        );
        assert_eq!(
            MediaCollection::Videos.item_uri(7),
            "content://media/external/video/media/7"
        );
    }

    #[test]
    fn test_collection_for_item_uri() {
        assert_eq!(
            MediaCollection::for_item_uri("content://media/external/video/media/7"),
            Some(MediaCollection::Videos)
        );
        assert_eq!(
            MediaCollection::for_item_uri(&MediaCollection::Images.item_uri(3)),
            Some(MediaCollection::Images)
        );
        assert_eq!(
            MediaCollection::for_item_uri("content://media/external/images/mediaX/3"),
            None
        );
        assert_eq!(MediaCollection::for_item_uri("file:///a.jpg"), None);
    }

    #[test]
    fn test_collection_for_mime_type() {
        assert_eq!(
            MediaCollection::for_mime_type("image/jpeg"),
            Some(MediaCollection::Images)
        );
        assert_eq!(
            MediaCollection::for_mime_type("video/mp4"),
            Some(MediaCollection::Videos)
        );
        assert_eq!(MediaCollection::for_mime_type("audio/mpeg"), None);
    }

    #[test]
    fn test_path_prefix_filter() {
        let filter = RowFilter::PathPrefix("/sdcard/DCIM/".to_string());
        assert!(filter.matches(&MediaRow::new(1).with_path("/sdcard/DCIM/a.jpg")));
        assert!(!filter.matches(&MediaRow::new(2).with_path("/sdcard/Pictures/a.jpg")));
        assert!(!filter.matches(&MediaRow::new(3)));
    }

    #[test]
    fn test_generation_filter() {
        let filter = RowFilter::GenerationAfter(10);
        assert!(filter.matches(&MediaRow::new(1).with_generation(11)));
        assert!(!filter.matches(&MediaRow::new(2).with_generation(10)));
        assert!(!filter.matches(&MediaRow::new(3)));
    }

    #[test]
    fn test_projection_hides_columns() {
        let row = MediaRow::new(5)
            .with_path("/a.jpg")
            .with_mime_type("image/jpeg")
            .with_size(10, 20);
        let projected = row.project(&[Column::Id, Column::Data]);
        assert_eq!(projected.id, 5);
        assert_eq!(projected.path.as_deref(), Some("/a.jpg"));
        assert_eq!(projected.mime_type, None);
        assert_eq!(projected.width, None);
    }

    struct EmptyRepository;

    impl MediaRepository for EmptyRepository {
        fn capabilities(&self) -> RepositoryCapabilities {
            RepositoryCapabilities::legacy()
        }

        fn query(&self, _query: &RowQuery) -> Result<RowCursor> {
            let rows = vec![Ok(MediaRow::new(1)), Ok(MediaRow::new(2))];
            Ok(Box::new(rows.into_iter()))
        }
    }

    #[test]
    fn test_capability_claims_may_only_narrow() {
        let modern = RepositoryCapabilities::default();
        let legacy = RepositoryCapabilities::legacy();

        assert_eq!(modern.unsupported_by(&modern), None);
        assert_eq!(modern.unsupported_by(&legacy), Some("generation_counter"));

        let narrowed = RepositoryCapabilities {
            generation_counter: false,
            thumbnail_api: ThumbnailApi::Legacy,
            video_orientation: false,
            ..modern
        };
        assert_eq!(narrowed.unsupported_by(&modern), None);

        let resolver_on_legacy = RepositoryCapabilities {
            thumbnail_api: ThumbnailApi::Resolver,
            ..legacy
        };
        assert_eq!(resolver_on_legacy.unsupported_by(&legacy), Some("thumbnail_api"));
        assert_eq!(legacy.unsupported_by(&modern), Some("normalizes_orientation"));
    }

    #[test]
    fn test_default_count_and_thumbnails() {
        let repo = EmptyRepository;
        assert_eq!(repo.count(MediaCollection::Images, None).unwrap(), 2);
        assert!(matches!(
            repo.load_thumbnail("content://x/1", 10, 10),
            Err(BridgeError::NotAvailable(_))
        ));
        assert!(matches!(
            repo.legacy_thumbnail(MediaCollection::Images, 1),
            Err(BridgeError::NotAvailable(_))
        ));
    }
}
