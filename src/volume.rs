//! Volumes and their configurations
//!
//! `VolumeConfig` is the unit the decision engine reasons about. Only the class
//! and the two provisioned performance knobs take part in equality; size and
//! location are context needed to price a configuration.

use crate::types::VolumeClass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tag holding the configuration a volume had the first time it was optimized
pub const INITIAL_CONFIGURATION_TAG: &str = "ebs_optimizer_initial_configuration";

/// Tag holding the configuration a volume had right before its latest modification
pub const PREVIOUS_CONFIGURATION_TAG: &str = "ebs_optimizer_previous_configuration";

/// A volume's class, provisioned performance, size and location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeConfig {
    pub class: VolumeClass,
    /// Provisioned IOPS (0 means the class default)
    #[serde(default)]
    pub iops: u32,
    /// Provisioned throughput in MB/s (0 means the class default)
    #[serde(default)]
    pub throughput: u32,
    #[serde(default)]
    pub size_gb: u32,
    #[serde(default)]
    pub location: String,
}

impl VolumeConfig {
    /// Create a configuration without provisioned performance
    pub fn new(class: VolumeClass, size_gb: u32, location: impl Into<String>) -> Self {
        Self {
            class,
            iops: 0,
            throughput: 0,
            size_gb,
            location: location.into(),
        }
    }

    pub fn with_iops(mut self, iops: u32) -> Self {
        self.iops = iops;
        self
    }

    pub fn with_throughput(mut self, throughput: u32) -> Self {
        self.throughput = throughput;
        self
    }

    /// Copy the decision-relevant fields of `target` onto this configuration
    pub fn apply(&mut self, target: &VolumeConfig) {
        self.class = target.class;
        self.iops = target.iops;
        self.throughput = target.throughput;
    }
}

impl PartialEq for VolumeConfig {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.iops == other.iops && self.throughput == other.throughput
    }
}

impl Eq for VolumeConfig {}

impl fmt::Display for VolumeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} GB, iops={}, throughput={}, {})",
            self.class, self.size_gb, self.iops, self.throughput, self.location
        )
    }
}

/// A block volume discovered by a region scan.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub id: String,
    /// Current configuration; its `location` is the volume's location
    pub config: VolumeConfig,
    pub tags: BTreeMap<String, String>,
}

impl Volume {
    pub fn new(id: impl Into<String>, config: VolumeConfig) -> Self {
        Self {
            id: id.into(),
            config,
            tags: BTreeMap::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    #[inline]
    pub fn location(&self) -> &str {
        &self.config.location
    }

    /// Snapshot of the configuration the volume has right now
    pub fn current_configuration(&self) -> VolumeConfig {
        self.config.clone()
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.id, self.location())
    }
}
