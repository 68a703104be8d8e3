//! Workspace entry crate.
//!
//! Re-exports the service façade so host applications can depend on
//! `gallery-workspace` and pick a platform through features instead of
//! wiring each crate individually.
//!
//! - `desktop-shims` (default): pulls in `core-service` with the
//!   `bridge-desktop` implementations.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
