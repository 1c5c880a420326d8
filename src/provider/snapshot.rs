//! Inventory snapshot files.
//!
//! A snapshot is a JSON document describing a cloud account: volumes per
//! location plus the raw price catalog records. Loading one yields a
//! [`MemoryCloud`] and a [`MemoryCatalog`] the optimizer can run against; after
//! a live run the mutated state is written back.
//!
//! ```json
//! {
//!   "locations": {
//!     "us-east-1": { "volumes": [
//!       { "id": "vol-1", "class": "gp2", "size_gb": 100, "tags": {} }
//!     ] }
//!   },
//!   "catalog": { "records": ["{...raw catalog record...}"] }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::OptimizerError;
use crate::provider::memory::{MemoryCatalog, MemoryCloud};
use crate::types::VolumeClass;
use crate::volume::{Volume, VolumeConfig};

/// One volume as stored in a snapshot file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeRecord {
    pub id: String,
    /// Kept as a string so unknown classes survive a load/save cycle
    pub class: String,
    #[serde(default)]
    pub size_gb: u32,
    #[serde(default)]
    pub iops: u32,
    #[serde(default)]
    pub throughput: u32,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl VolumeRecord {
    fn to_volume(&self, location: &str) -> crate::error::Result<Volume> {
        let class = VolumeClass::from_str(&self.class)
            .map_err(|_| OptimizerError::UnknownClass(self.class.clone()))?;
        let config = VolumeConfig::new(class, self.size_gb, location)
            .with_iops(self.iops)
            .with_throughput(self.throughput);
        Ok(Volume {
            id: self.id.clone(),
            config,
            tags: self.tags.clone(),
        })
    }

    fn update_from(&mut self, volume: &Volume) {
        self.class = volume.config.class.to_string();
        self.iops = volume.config.iops;
        self.throughput = volume.config.throughput;
        self.size_gb = volume.config.size_gb;
        self.tags = volume.tags.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationInventory {
    #[serde(default)]
    pub volumes: Vec<VolumeRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDump {
    /// Raw catalog records, exactly as the price service returns them
    #[serde(default)]
    pub records: Vec<String>,
}

/// A saved cloud account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub locations: BTreeMap<String, LocationInventory>,
    #[serde(default)]
    pub catalog: CatalogDump,
}

impl InventorySnapshot {
    /// Save snapshot to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize snapshot to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load snapshot from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read snapshot from {:?}", path.as_ref()))?;

        let snapshot: Self =
            serde_json::from_str(&content).context("Failed to parse snapshot JSON")?;

        Ok(snapshot)
    }

    /// Build the in-memory account described by this snapshot
    pub fn to_cloud(&self) -> Result<MemoryCloud> {
        let cloud = MemoryCloud::new();
        for (location, inventory) in &self.locations {
            cloud.add_location(location)?;
            for record in &inventory.volumes {
                match record.to_volume(location) {
                    Ok(volume) => cloud.add_volume(volume)?,
                    Err(e) => tracing::warn!("Skipping volume {} in {}: {}", record.id, location, e),
                }
            }
        }
        Ok(cloud)
    }

    pub fn to_catalog(&self) -> MemoryCatalog {
        MemoryCatalog::new(self.catalog.records.clone())
    }

    /// Copy the current state of every known volume back from `cloud`.
    ///
    /// Records the cloud does not know about (skipped on load) are kept as is.
    pub fn update_from(&mut self, cloud: &MemoryCloud) -> Result<()> {
        let current = cloud.volumes()?;
        for (location, inventory) in self.locations.iter_mut() {
            let Some(volumes) = current.get(location) else {
                continue;
            };
            for record in inventory.volumes.iter_mut() {
                if let Some(volume) = volumes.iter().find(|v| v.id == record.id) {
                    record.update_from(volume);
                }
            }
        }
        Ok(())
    }

    pub fn volume_count(&self) -> usize {
        self.locations.values().map(|l| l.volumes.len()).sum()
    }
}
