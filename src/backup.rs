//! Configuration backups stored as volume tags.
//!
//! Before a volume is modified its current configuration is written to two
//! tags:
//!
//! | Tag                                     | Written                         |
//! |-----------------------------------------|---------------------------------|
//! | `ebs_optimizer_initial_configuration`   | once, the first time ever       |
//! | `ebs_optimizer_previous_configuration`  | before every modification       |
//!
//! # Tag payload
//!
//! A compact JSON object with PascalCase field names:
//!
//! ```json
//! {"VolumeType":"gp2","IOPS":300,"Throughput":0,"Region":"us-east-1","Size":100,"SchemaVersion":1}
//! ```
//!
//! The payload is durable: readers ignore unknown fields and default missing
//! ones, and `Region`/`Size` are always taken from the volume on read.

use crate::error::{OptimizerError, Result};
use crate::provider::LocationClient;
use crate::types::VolumeClass;
use crate::volume::{INITIAL_CONFIGURATION_TAG, PREVIOUS_CONFIGURATION_TAG, Volume, VolumeConfig};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Version written into new snapshots
pub const SCHEMA_VERSION: u32 = 1;

/// Serialized form of a `VolumeConfig` kept in a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSnapshot {
    #[serde(rename = "VolumeType")]
    pub volume_type: Option<VolumeClass>,
    #[serde(rename = "IOPS")]
    pub iops: u32,
    #[serde(rename = "Throughput")]
    pub throughput: u32,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Size")]
    pub size: u32,
    /// Absent in payloads written before versioning; reads as 0
    #[serde(rename = "SchemaVersion")]
    pub schema_version: u32,
}

impl ConfigSnapshot {
    pub fn from_config(config: &VolumeConfig) -> Self {
        Self {
            volume_type: Some(config.class),
            iops: config.iops,
            throughput: config.throughput,
            region: config.location.clone(),
            size: config.size_gb,
            schema_version: SCHEMA_VERSION,
        }
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(value: &str) -> Result<Self> {
        Ok(serde_json::from_str(value)?)
    }

    /// Configuration described by this snapshot, in the context of `volume`
    pub fn into_config(self, volume: &Volume) -> Result<VolumeConfig> {
        let class = self
            .volume_type
            .ok_or_else(|| OptimizerError::backup("snapshot has no volume type"))?;
        Ok(VolumeConfig::new(class, volume.config.size_gb, volume.location())
            .with_iops(self.iops)
            .with_throughput(self.throughput))
    }
}

/// Which backup tag to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SnapshotKind {
    Initial,
    Previous,
}

impl SnapshotKind {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Initial => INITIAL_CONFIGURATION_TAG,
            Self::Previous => PREVIOUS_CONFIGURATION_TAG,
        }
    }
}

/// Read a snapshot tag, failing if it is missing or malformed
pub fn read_snapshot(volume: &Volume, kind: SnapshotKind) -> Result<VolumeConfig> {
    let value = volume.tag(kind.tag()).ok_or_else(|| {
        OptimizerError::backup(format!("{} has no {} configuration", volume, kind))
    })?;
    ConfigSnapshot::decode(value)
        .and_then(|snapshot| snapshot.into_config(volume))
        .map_err(|e| {
            OptimizerError::backup(format!("unreadable {} configuration on {}: {}", kind, volume, e))
        })
}

fn snapshot(volume: &Volume, kind: SnapshotKind) -> Option<VolumeConfig> {
    if !volume.has_tag(kind.tag()) {
        return None;
    }
    match read_snapshot(volume, kind) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    }
}

/// Configuration the volume had before it was first optimized.
///
/// `None` when the tag is missing or cannot be read; the latter is logged.
pub fn initial_configuration(volume: &Volume) -> Option<VolumeConfig> {
    snapshot(volume, SnapshotKind::Initial)
}

/// Configuration the volume had before its most recent modification
pub fn previous_configuration(volume: &Volume) -> Option<VolumeConfig> {
    snapshot(volume, SnapshotKind::Previous)
}

/// What a backup call wrote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupOutcome {
    pub initial_written: bool,
}

/// Writes backup tags through a location client.
///
/// In dry-run mode nothing is sent to the client; the intended writes are
/// logged and only the local tag view of the volume changes.
pub struct BackupTracker<'a> {
    client: &'a dyn LocationClient,
    dry_run: bool,
}

impl<'a> BackupTracker<'a> {
    pub fn new(client: &'a dyn LocationClient, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Record the current configuration of `volume` before a mutation.
    pub fn backup(&self, volume: &mut Volume) -> Result<BackupOutcome> {
        tracing::debug!("Backing up configuration of {} to tags", volume);
        let value = ConfigSnapshot::from_config(&volume.config).encode()?;

        let initial_written = !volume.has_tag(INITIAL_CONFIGURATION_TAG);
        if initial_written {
            tracing::info!("Missing initial configuration for {}, backing it up", volume);
            self.write_tag(volume, INITIAL_CONFIGURATION_TAG, &value)?;
        }
        self.write_tag(volume, PREVIOUS_CONFIGURATION_TAG, &value)?;

        Ok(BackupOutcome { initial_written })
    }

    fn write_tag(&self, volume: &mut Volume, key: &str, value: &str) -> Result<()> {
        if self.dry_run {
            tracing::info!("Dry-run: would set tag {} on {} to {}", key, volume, value);
        } else {
            self.client.create_tag(&volume.id, key, value)?;
        }
        volume.tags.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Move a volume back to one of its recorded configurations.
    ///
    /// The configuration being replaced becomes the new "previous" snapshot.
    /// Returns the configuration the volume was restored to.
    pub fn restore(&self, volume: &mut Volume, kind: SnapshotKind) -> Result<VolumeConfig> {
        let target = read_snapshot(volume, kind)?;
        if target == volume.config {
            tracing::info!("{} already has its {} configuration", volume, kind);
            return Ok(target);
        }

        self.backup(volume)?;
        if self.dry_run {
            tracing::info!("Dry-run: would restore {} to {}", volume, target);
        } else {
            tracing::info!("Restoring {} to {}", volume, target);
            self.client.modify_volume(&volume.id, &target)?;
        }
        volume.config.apply(&target);
        Ok(target)
    }
}
