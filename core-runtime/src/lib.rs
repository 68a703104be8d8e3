//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the pipeline crates:
//! - Logging and tracing setup
//! - Pipeline configuration (batch and chunk sizes, buffer pool sizing,
//!   platform capabilities)
//!
//! ## Overview
//!
//! Hosts build a [`PipelineConfig`](config::PipelineConfig) once at startup,
//! call [`init_logging`](logging::init_logging), and hand both to the service
//! facade. Nothing here touches the media repository.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{Error, Result};
