//! Tunable parameters of a flattening pass.
//!
//! ```
//! use octoflat_flatten::FlattenConfig;
//!
//! let config = FlattenConfig::from_toml_str("height_threshold = 0.2\nregion_depth = 3.0").unwrap();
//!
//! assert_eq!(config.height_threshold, 0.2);
//! assert_eq!(config.region_width, 1.0);
//! ```

use crate::{FlattenError, Result};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// All parameters read by one pass. Missing fields take their default values when parsed.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct FlattenConfig {
    /// Occupied voxels at most this far above the ground (meters) are moved onto it.
    pub height_threshold: f32,
    /// Extent of the region of interest across the robot's heading (meters).
    pub region_width: f32,
    /// Extent of the region of interest along the robot's heading (meters).
    pub region_depth: f32,
    /// The fixed frame that the octree is expressed in.
    pub world_frame: String,
    pub robot_frame: String,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            height_threshold: 0.3,
            region_width: 1.0,
            region_depth: 2.0,
            world_frame: "world".to_string(),
            robot_frame: "base_link_estimate".to_string(),
        }
    }
}

impl FlattenConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;

        Ok(config)
    }

    /// Rejects negative or non-finite distances and empty frame names. A zero-sized region is allowed, but it only produces
    /// empty height maps.
    pub fn validate(&self) -> Result<()> {
        for &(name, value) in [
            ("height_threshold", self.height_threshold),
            ("region_width", self.region_width),
            ("region_depth", self.region_depth),
        ]
        .iter()
        {
            if !value.is_finite() || value < 0.0 {
                return Err(FlattenError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.world_frame.is_empty() || self.robot_frame.is_empty() {
            return Err(FlattenError::InvalidConfig(
                "frame names must not be empty".to_string(),
            ));
        }

        if self.region_width == 0.0 || self.region_depth == 0.0 {
            tracing::warn!(
                width = self.region_width,
                depth = self.region_depth,
                "region of interest is degenerate; height maps will be empty"
            );
        }

        Ok(())
    }
}

/// A configuration that can be replaced at any time, e.g. by a parameter server, while passes read consistent snapshots.
#[derive(Clone, Debug, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<FlattenConfig>>,
}

impl ConfigHandle {
    pub fn new(config: FlattenConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Replace the whole configuration. Invalid configurations are rejected and the current one is kept.
    pub fn update(&self, config: FlattenConfig) -> Result<()> {
        config.validate()?;

        *self.inner.write() = config;

        Ok(())
    }

    /// A copy of the current configuration.
    pub fn snapshot(&self) -> FlattenConfig {
        self.inner.read().clone()
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(FlattenConfig::from_toml_str("").unwrap(), FlattenConfig::default());
    }

    #[test]
    fn negative_threshold_is_rejected() {
        assert!(matches!(
            FlattenConfig::from_toml_str("height_threshold = -0.1"),
            Err(FlattenError::InvalidConfig(_))
        ));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        assert!(matches!(
            FlattenConfig::from_toml_str("region_width = \"wide\""),
            Err(FlattenError::ConfigParse(_))
        ));
    }

    #[test]
    fn snapshots_are_isolated_from_updates() {
        let handle = ConfigHandle::default();
        let before = handle.snapshot();

        let mut wider = before.clone();
        wider.region_width = 4.0;
        handle.update(wider.clone()).unwrap();

        assert_eq!(before.region_width, 1.0);
        assert_eq!(handle.snapshot(), wider);
    }

    #[test]
    fn invalid_update_keeps_current_config() {
        let handle = ConfigHandle::default();
        let mut broken = FlattenConfig::default();
        broken.region_depth = f32::NAN;

        assert!(handle.update(broken).is_err());
        assert_eq!(handle.snapshot(), FlattenConfig::default());
    }

    #[test]
    fn handle_is_shared_between_clones() {
        let handle = ConfigHandle::default();
        let writer = handle.clone();
        let mut config = FlattenConfig::default();
        config.height_threshold = 0.1;

        std::thread::spawn(move || writer.update(config).unwrap())
            .join()
            .unwrap();

        assert_eq!(handle.snapshot().height_threshold, 0.1);
    }
}
