//! Region Worker
//!
//! Processes every volume of one location and reports what it did.
//!
//! # Stage Flow
//!
//! ```text
//! Connecting
//!     ↓
//! Scanning
//!     ↓
//! Processing  (location enabled)   |   Skipped  (location disabled)
//!     ↓                                   ↓
//! ComputingSavings
//!     ↓
//! Published
//!
//! (Connecting and Scanning can transition to Failed)
//! ```
//!
//! # Failure scope
//!
//! | Failure                         | Effect                                       |
//! |---------------------------------|----------------------------------------------|
//! | connect / scan                  | location `Failed`, zero savings              |
//! | backup tag write / modify call  | volume `Failed`, savings excluded, continue  |
//! | malformed backup tag            | zero savings for that volume                 |
//!
//! Volumes are processed strictly in scan order; nothing is retried.

use crate::backup::BackupTracker;
use crate::catalog::Catalog;
use crate::config::RunOptions;
use crate::engine::{DecisionPolicy, evaluate};
use crate::error::Result;
use crate::pricing;
use crate::provider::{CloudProvider, LocationClient};
use crate::selection::{LocationFilter, TagFilter};
use crate::volume::{Volume, VolumeConfig};
use serde::Serialize;
use std::fmt;

/// Stages a region worker moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegionStage {
    Connecting,
    Scanning,
    Processing,
    /// Location is not on the allow-list; volumes are only priced
    Skipped,
    ComputingSavings,
    /// Result handed to the aggregator (terminal)
    Published,
    /// Connect or scan failed (terminal)
    Failed,
}

impl RegionStage {
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Published | Self::Failed)
    }

    /// Returns true if `next` may follow this stage
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Connecting, Self::Scanning)
                | (Self::Connecting, Self::Failed)
                | (Self::Scanning, Self::Processing)
                | (Self::Scanning, Self::Skipped)
                | (Self::Scanning, Self::Failed)
                | (Self::Processing, Self::ComputingSavings)
                | (Self::Skipped, Self::ComputingSavings)
                | (Self::ComputingSavings, Self::Published)
        )
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::Scanning => "Scanning volumes",
            Self::Processing => "Processing volumes",
            Self::Skipped => "Skipping disabled location",
            Self::ComputingSavings => "Computing savings",
            Self::Published => "Published",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for RegionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// What happened to one volume during a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VolumeOutcome {
    /// The decided target equals the current configuration
    Unchanged,
    /// Left alone because of a tag filter or a disabled location
    Skipped { reason: String },
    Modified { from: VolumeConfig, to: VolumeConfig },
    /// Dry run: the modification that would have been made
    WouldModify { from: VolumeConfig, to: VolumeConfig },
    Failed { reason: String },
}

impl VolumeOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_change(&self) -> bool {
        matches!(self, Self::Modified { .. } | Self::WouldModify { .. })
    }
}

impl fmt::Display for VolumeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => write!(f, "unchanged"),
            Self::Skipped { reason } => write!(f, "skipped ({})", reason),
            Self::Modified { from, to } => write!(f, "modified from {} to {}", from, to),
            Self::WouldModify { from, to } => {
                write!(f, "would be modified from {} to {}", from, to)
            }
            Self::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// A volume after processing, with its lifetime monthly savings
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedVolume {
    pub volume: Volume,
    pub outcome: VolumeOutcome,
    pub monthly_savings: f64,
}

/// Everything one location reports back to the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionResult {
    pub location: String,
    pub enabled: bool,
    /// Stages entered, in order
    pub stages: Vec<RegionStage>,
    pub volumes: Vec<ProcessedVolume>,
    pub hourly_savings: f64,
    /// Location-scoped failure, if the worker could not connect or scan
    pub error: Option<String>,
    /// Human-readable actions taken, for the final recap
    pub recap: Vec<String>,
}

impl RegionResult {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            enabled: false,
            stages: Vec::new(),
            volumes: Vec::new(),
            hourly_savings: 0.0,
            error: None,
            recap: Vec::new(),
        }
    }

    /// Result for a worker that died before reporting
    pub fn failed(location: impl Into<String>, error: impl Into<String>) -> Self {
        let mut result = Self::new(location);
        result.stages.push(RegionStage::Failed);
        result.error = Some(error.into());
        result
    }

    pub fn monthly_savings(&self) -> f64 {
        self.hourly_savings * pricing::HOURS_PER_MONTH
    }

    pub fn stage(&self) -> Option<RegionStage> {
        self.stages.last().copied()
    }

    pub fn count(&self, predicate: impl Fn(&VolumeOutcome) -> bool) -> usize {
        self.volumes.iter().filter(|v| predicate(&v.outcome)).count()
    }
}

/// Read-only inputs shared by every worker of a run.
#[derive(Debug, Clone)]
pub struct RunContext<'a> {
    pub catalog: &'a Catalog,
    pub dry_run: bool,
    pub policy: DecisionPolicy,
    pub locations: LocationFilter,
    pub tags: TagFilter,
}

impl<'a> RunContext<'a> {
    /// Fails on a malformed tag filter
    pub fn new(catalog: &'a Catalog, options: &RunOptions) -> Result<Self> {
        Ok(Self {
            catalog,
            dry_run: options.dry_run,
            policy: options.policy(),
            locations: options.location_filter(),
            tags: options.tag_filter()?,
        })
    }
}

/// Processes one location.
pub struct RegionWorker<'a> {
    context: &'a RunContext<'a>,
    result: RegionResult,
}

impl<'a> RegionWorker<'a> {
    pub fn new(location: impl Into<String>, context: &'a RunContext<'a>) -> Self {
        let mut result = RegionResult::new(location);
        result.enabled = context.locations.is_enabled(&result.location);
        Self { context, result }
    }

    fn enter(&mut self, stage: RegionStage) {
        if let Some(current) = self.result.stage() {
            debug_assert!(
                current.can_advance_to(stage),
                "invalid region transition {:?} -> {:?}",
                current,
                stage
            );
        }
        tracing::debug!("{}: {}", self.result.location, stage);
        self.result.stages.push(stage);
    }

    fn fail(mut self, error: String) -> RegionResult {
        tracing::error!("{}: {}", self.result.location, error);
        self.enter(RegionStage::Failed);
        self.result.error = Some(error);
        self.result
    }

    /// Run every stage against `provider`.
    pub fn run(mut self, provider: &dyn CloudProvider) -> RegionResult {
        self.enter(RegionStage::Connecting);
        let client = match provider.connect(&self.result.location) {
            Ok(client) => client,
            Err(e) => return self.fail(format!("could not connect: {}", e)),
        };

        self.enter(RegionStage::Scanning);
        let volumes = match client.list_volumes() {
            Ok(volumes) => volumes,
            Err(e) => return self.fail(format!("could not scan volumes: {}", e)),
        };
        tracing::debug!("{}: found {} volumes", self.result.location, volumes.len());

        if self.result.enabled {
            tracing::info!("Enabled to run in {}, processing region", self.result.location);
            self.enter(RegionStage::Processing);
            for volume in volumes {
                let processed = self.process_volume(client.as_ref(), volume);
                self.result.volumes.push(processed);
            }
        } else {
            tracing::debug!("Not enabled to run in {}", self.result.location);
            self.enter(RegionStage::Skipped);
            self.result.volumes = volumes
                .into_iter()
                .map(|volume| ProcessedVolume {
                    volume,
                    outcome: VolumeOutcome::Skipped {
                        reason: "location not enabled".to_string(),
                    },
                    monthly_savings: 0.0,
                })
                .collect();
        }

        self.enter(RegionStage::ComputingSavings);
        self.compute_savings();

        self.enter(RegionStage::Published);
        self.result
    }

    fn process_volume(&mut self, client: &dyn LocationClient, mut volume: Volume) -> ProcessedVolume {
        tracing::info!("Processing volume {}", volume);

        if !self.context.tags.is_selected(&volume.tags) {
            tracing::info!("Skipping volume {} due to tag filters", volume);
            return ProcessedVolume {
                volume,
                outcome: VolumeOutcome::Skipped {
                    reason: format!("tag filter ({})", self.context.tags.mode()),
                },
                monthly_savings: 0.0,
            };
        }

        let current = volume.current_configuration();
        let decision = evaluate(&current, &self.context.policy);
        if !decision.changes(&current) {
            tracing::info!("Volume configuration unchanged, skipping volume {}", volume);
            return ProcessedVolume {
                volume,
                outcome: VolumeOutcome::Unchanged,
                monthly_savings: 0.0,
            };
        }

        let target = decision.target;
        tracing::info!(
            "Current configuration for {}: {}, new configuration: {}",
            volume,
            current,
            target
        );

        let outcome = match self.modify(client, &mut volume, &target) {
            Ok(()) if self.context.dry_run => VolumeOutcome::WouldModify {
                from: current,
                to: target,
            },
            Ok(()) => VolumeOutcome::Modified {
                from: current,
                to: target,
            },
            Err(e) => {
                tracing::error!("Could not convert volume {}: {}", volume, e);
                VolumeOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        if outcome.is_change() || outcome.is_failed() {
            self.result.recap.push(format!("{}: {}", volume.id, outcome));
        }

        ProcessedVolume {
            volume,
            outcome,
            monthly_savings: 0.0,
        }
    }

    /// Back up, then apply `target`. The backup must succeed first.
    fn modify(&self, client: &dyn LocationClient, volume: &mut Volume, target: &VolumeConfig) -> Result<()> {
        let tracker = BackupTracker::new(client, self.context.dry_run);
        tracker.backup(volume)?;

        if self.context.dry_run {
            tracing::info!("Dry-run: would modify volume {} from {} to {}", volume, volume.config, target);
        } else {
            client.modify_volume(&volume.id, target)?;
        }
        volume.config.apply(target);
        Ok(())
    }

    /// Price every volume against its initial snapshot. Failed volumes count
    /// as zero.
    fn compute_savings(&mut self) {
        let catalog = self.context.catalog;
        let mut monthly_total = 0.0;

        for processed in self.result.volumes.iter_mut() {
            if processed.outcome.is_failed() {
                continue;
            }
            processed.monthly_savings = pricing::monthly_savings(&processed.volume, catalog);
            monthly_total += processed.monthly_savings;
        }

        self.result.hourly_savings = monthly_total / pricing::HOURS_PER_MONTH;
        if monthly_total > 0.0 {
            tracing::info!(
                "Calculated savings in {}: ${:.4} (monthly), ${:.6} (hourly)",
                self.result.location,
                monthly_total,
                self.result.hourly_savings
            );
        }
    }
}
