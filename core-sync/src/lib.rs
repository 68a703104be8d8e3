//! # Catalog Sync Module
//!
//! Keeps a local media catalog consistent with the OS media repository
//! through differential scans instead of full rescans.
//!
//! ## Overview
//!
//! The caller owns the catalog. It hands in what it already knows (content id
//! to last modification time) and gets back only the records that are new or
//! updated. Deletions and moves are found separately by the change detector.
//!
//! ## Components
//!
//! - **Models** (`models`): `MediaRecord`, `KnownState` and directory scoping
//! - **Scanner** (`scanner`): lazy merge scan over the image and video collections
//! - **Backfill** (`backfill`): best-effort completion of rows missing dimensions or duration
//! - **Change Detector** (`changes`): obsolete ids, obsolete paths and generation deltas
//!
//! Everything here blocks on the repository cursor; async callers run it on
//! the blocking pool.

pub mod backfill;
pub mod changes;
pub mod error;
pub mod models;
pub mod scanner;

pub use backfill::MetadataBackfill;
pub use changes::ChangeDetector;
pub use error::{Result, SyncError};
pub use models::{DirectoryScope, KnownState, MediaRecord, RecordOrigin};
pub use scanner::{CatalogScan, CatalogScanner};
