//! EBS Optimizer Library
//!
//! Decides whether block-storage volumes can move to a cheaper equivalent
//! class, applies the change with durable backups of the old configuration,
//! and reports the savings across every location of an account.

pub mod backup;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod config_file;
pub mod engine;
pub mod error;
pub mod logging;
pub mod pricing;
pub mod provider;
pub mod region;
pub mod report;
pub mod scheduler;
pub mod selection;
pub mod types;
pub mod volume;

// Re-export main types for convenience
pub use backup::{BackupOutcome, BackupTracker, ConfigSnapshot, SnapshotKind};
pub use catalog::{Catalog, PriceBand, VolumeClassInfo};
pub use config::RunOptions;
pub use config_file::OptimizerConfig;
pub use engine::{Decision, DecisionPolicy, Rule, decide, evaluate};
pub use error::{OptimizerError, Result};
pub use provider::memory::{ApiCall, MemoryCatalog, MemoryCloud};
pub use provider::snapshot::InventorySnapshot;
pub use provider::{CatalogFilter, CatalogPage, CloudProvider, LocationClient, PriceCatalogSource};
pub use region::{ProcessedVolume, RegionResult, RegionStage, RegionWorker, RunContext, VolumeOutcome};
pub use report::{GlobalReport, RegionSummary};
pub use selection::{LocationFilter, TagFilter};
pub use types::{TagFilteringMode, VolumeClass};
pub use volume::{INITIAL_CONFIGURATION_TAG, PREVIOUS_CONFIGURATION_TAG, Volume, VolumeConfig};
