//! # Host Call Boundary
//!
//! Hosts talk to the service with a method or channel name and a JSON
//! argument map. Arguments are validated here, once, into typed values; a
//! missing or malformed field fails the call before any work starts.
//!
//! ## Methods
//!
//! | Method | Arguments | Result |
//! |---|---|---|
//! | `checkObsoleteContentIds` | `knownContentIds: [int]` | `[int]` |
//! | `checkObsoletePaths` | `knownPathById: {id: path?}` | `[int]` |
//! | `getChangedUris` | `sinceGeneration: int` | `[string]` |
//!
//! ## Streams
//!
//! - [`MEDIA_STORE_STREAM`]: `knownEntries: {id: millis?}`, `directory?`
//! - [`MEDIA_BYTE_STREAM`]: `op`, plus the thumbnail fields when
//!   `op == "getThumbnail"`. Any other `op` yields a stream that only ends.

use crate::error::{CoreError, Result};
use crate::streams::{spawn_guarded, StreamHandle};
use crate::MediaService;
use core_sync::KnownState;
use core_thumbnail::ThumbnailRequest;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, instrument};

pub const MEDIA_STORE_STREAM: &str = "mediastore_stream";
pub const MEDIA_BYTE_STREAM: &str = "media_byte_stream";

const GET_THUMBNAIL: &str = "getThumbnail";

/// A validated method call.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodCall {
    CheckObsoleteContentIds(Vec<i64>),
    CheckObsoletePaths(HashMap<i64, Option<String>>),
    GetChangedUris(i64),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObsoleteIdsArgs {
    known_content_ids: Vec<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObsoletePathsArgs {
    known_path_by_id: HashMap<String, Option<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangedUrisArgs {
    since_generation: i64,
}

impl MethodCall {
    pub fn parse(method: &str, args: &Value) -> Result<Self> {
        match method {
            "checkObsoleteContentIds" => {
                let args: ObsoleteIdsArgs = arguments(method, args)?;
                Ok(Self::CheckObsoleteContentIds(args.known_content_ids))
            }
            "checkObsoletePaths" => {
                let args: ObsoletePathsArgs = arguments(method, args)?;
                Ok(Self::CheckObsoletePaths(numeric_keys(args.known_path_by_id)))
            }
            "getChangedUris" => {
                let args: ChangedUrisArgs = arguments(method, args)?;
                Ok(Self::GetChangedUris(args.since_generation))
            }
            other => Err(CoreError::NotImplemented(other.to_string())),
        }
    }
}

/// Arguments of the catalog stream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanArgs {
    #[serde(default)]
    known_entries: Option<HashMap<String, Option<i64>>>,
    #[serde(default)]
    directory: Option<String>,
}

impl ScanArgs {
    /// Entries with a missing timestamp or a non-numeric id are treated as
    /// unknown.
    pub fn into_known_state(self) -> Result<KnownState> {
        let known: KnownState = self
            .known_entries
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(id, millis)| Some((id.parse::<i64>().ok()?, millis?)))
            .collect();
        match self.directory {
            Some(directory) => Ok(known.scoped_to(&directory)?),
            None => Ok(known),
        }
    }
}

/// Arguments of a thumbnail fetch. Sizes are in density-independent units.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailArgs {
    uri: String,
    mime_type: String,
    #[serde(default)]
    date_modified_millis: Option<i64>,
    rotation_degrees: i32,
    is_flipped: bool,
    width_dip: f64,
    height_dip: f64,
    default_size_dip: f64,
    quality: i64,
    #[serde(default)]
    decoded: bool,
    #[serde(default)]
    page_id: Option<i32>,
}

impl ThumbnailArgs {
    /// Build the request, scaling sizes by `density`. A missing modification
    /// date becomes `now_millis`.
    pub fn into_request(self, density: f64, now_millis: i64) -> Result<ThumbnailRequest> {
        let pixels = |dip: f64| (dip * density) as i64;
        ThumbnailRequest::builder(self.uri, self.mime_type)
            .date_modified_millis(self.date_modified_millis.unwrap_or(now_millis))
            .orientation(self.rotation_degrees, self.is_flipped)
            .size(Some(pixels(self.width_dip)), Some(pixels(self.height_dip)))
            .default_size(pixels(self.default_size_dip))
            .quality(self.quality)
            .decoded(self.decoded)
            .page_id(self.page_id)
            .build()
            .map_err(|e| CoreError::invalid_argument(GET_THUMBNAIL, e.to_string()))
    }
}

#[derive(Deserialize)]
struct ByteStreamOp {
    #[serde(default)]
    op: Option<String>,
}

/// Absent arguments read as an empty map.
fn arguments<T: DeserializeOwned>(operation: &str, args: &Value) -> Result<T> {
    let empty = Value::Object(serde_json::Map::new());
    let args = if args.is_null() { &empty } else { args };
    T::deserialize(args).map_err(|e| CoreError::invalid_argument(operation, e.to_string()))
}

fn numeric_keys<V>(map: HashMap<String, V>) -> HashMap<i64, V> {
    map.into_iter()
        .filter_map(|(id, value)| Some((id.parse::<i64>().ok()?, value)))
        .collect()
}

impl MediaService {
    /// Run a method call and return its JSON result.
    #[instrument(skip(self, args))]
    pub async fn handle_call(&self, method: &str, args: &Value) -> Result<Value> {
        let result = match MethodCall::parse(method, args)? {
            MethodCall::CheckObsoleteContentIds(ids) => {
                serde_json::to_value(self.check_obsolete_ids(&ids).await?)
            }
            MethodCall::CheckObsoletePaths(paths) => {
                serde_json::to_value(self.check_obsolete_paths(&paths).await?)
            }
            MethodCall::GetChangedUris(generation) => {
                serde_json::to_value(self.changed_since(generation).await?)
            }
        };
        result.map_err(|e| CoreError::Task(format!("Failed to serialize {} result: {}", method, e)))
    }

    /// Open a stream on a named channel.
    ///
    /// Invalid arguments fail here and no stream is opened.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime context.
    #[instrument(skip(self, args))]
    pub fn open_stream(&self, channel: &str, args: &Value) -> Result<StreamHandle> {
        match channel {
            MEDIA_STORE_STREAM => {
                let args: ScanArgs = arguments(channel, args)?;
                Ok(self.scan_catalog(args.into_known_state()?))
            }
            MEDIA_BYTE_STREAM => {
                let ByteStreamOp { op } = arguments(channel, args)?;
                match op.as_deref() {
                    Some(GET_THUMBNAIL) => {
                        let args: ThumbnailArgs = arguments(GET_THUMBNAIL, args)?;
                        let request = args.into_request(
                            self.config().display_density,
                            self.clock().unix_timestamp_millis(),
                        )?;
                        Ok(self.fetch_thumbnail(request))
                    }
                    other => {
                        debug!(op = ?other, "Unknown byte stream op, ending stream");
                        Ok(spawn_guarded(1, |_| Ok(())))
                    }
                }
            }
            other => Err(CoreError::NotImplemented(other.to_string())),
        }
    }
}
