//! # Pipeline Configuration
//!
//! Tunables for the catalog and thumbnail pipelines, plus the platform
//! capabilities that decide which thumbnail strategies exist and whether
//! generation-based deltas are available.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::PipelineConfig;
//! use bridge_traits::RepositoryCapabilities;
//!
//! let config = PipelineConfig::builder()
//!     .display_density(2.75)
//!     .capabilities(RepositoryCapabilities::legacy())
//!     .build()
//!     .expect("valid pipeline config");
//! ```
//!
//! The config is also deserializable, so a host can ship it as JSON:
//!
//! ```ignore
//! let config = PipelineConfig::from_json(r#"{ "batch_size": 50 }"#)?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::RepositoryCapabilities;
use serde::{Deserialize, Serialize};

/// Records per batch on the catalog stream.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Bytes per chunk on the thumbnail stream (256 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 18;

/// Initial capacity of pooled encode buffers (256 KiB).
pub const DEFAULT_BUFFER_CAPACITY: usize = 1 << 18;

pub const DEFAULT_BUFFER_POOL_SIZE: usize = 8;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Records grouped into one catalog stream event
    pub batch_size: usize,
    /// Bytes per thumbnail stream chunk
    pub chunk_size: usize,
    /// Bounded capacity of each stream's event channel
    pub channel_capacity: usize,
    /// Maximum number of idle buffers kept by the buffer pool
    pub buffer_pool_size: usize,
    /// Capacity of freshly allocated encode buffers
    pub buffer_initial_capacity: usize,
    /// Multiplier from density-independent request sizes to pixels
    pub display_density: f64,
    /// Capability override. `None` takes whatever the repository reports.
    pub capabilities: Option<RepositoryCapabilities>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            buffer_pool_size: DEFAULT_BUFFER_POOL_SIZE,
            buffer_initial_capacity: DEFAULT_BUFFER_CAPACITY,
            display_density: 1.0,
            capabilities: None,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Parse and validate a JSON configuration document. Missing fields take
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid pipeline config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every size is usable.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be at least 1".to_string()));
        }
        if self.channel_capacity == 0 {
            return Err(Error::Config(
                "channel_capacity must be at least 1".to_string(),
            ));
        }
        if self.buffer_initial_capacity == 0 {
            return Err(Error::Config(
                "buffer_initial_capacity must be at least 1".to_string(),
            ));
        }
        if !self.display_density.is_finite() || self.display_density <= 0.0 {
            return Err(Error::Config(format!(
                "display_density must be a positive number, got {}",
                self.display_density
            )));
        }
        Ok(())
    }

    /// Capabilities the pipeline runs with, given what the repository
    /// reports. An override may switch features off but never on.
    pub fn resolve_capabilities(
        &self,
        available: RepositoryCapabilities,
    ) -> Result<RepositoryCapabilities> {
        let Some(claimed) = self.capabilities else {
            return Ok(available);
        };
        match claimed.unsupported_by(&available) {
            Some(capability) => Err(Error::CapabilityMissing {
                capability: capability.to_string(),
                message: format!(
                    "configured {:?}, repository reports {:?}",
                    claimed, available
                ),
            }),
            None => Ok(claimed),
        }
    }
}

/// Builder for [`PipelineConfig`]. Validation happens in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    pub fn buffer_pool_size(mut self, size: usize) -> Self {
        self.config.buffer_pool_size = size;
        self
    }

    pub fn buffer_initial_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_initial_capacity = capacity;
        self
    }

    pub fn display_density(mut self, density: f64) -> Self {
        self.config.display_density = density;
        self
    }

    pub fn capabilities(mut self, capabilities: RepositoryCapabilities) -> Self {
        self.config.capabilities = Some(capabilities);
        self
    }

    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
