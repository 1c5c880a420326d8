//! Run totals and the final recap.

use crate::pricing::HOURS_PER_MONTH;
use crate::region::{RegionResult, RegionStage, VolumeOutcome};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Per-location line of the report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionSummary {
    pub enabled: bool,
    pub volumes: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub hourly_savings: f64,
    pub monthly_savings: f64,
    pub stage: Option<RegionStage>,
    pub error: Option<String>,
}

impl From<&RegionResult> for RegionSummary {
    fn from(result: &RegionResult) -> Self {
        Self {
            enabled: result.enabled,
            volumes: result.volumes.len(),
            changed: result.count(VolumeOutcome::is_change),
            unchanged: result.count(|o| matches!(o, VolumeOutcome::Unchanged)),
            skipped: result.count(|o| matches!(o, VolumeOutcome::Skipped { .. })),
            failed: result.count(VolumeOutcome::is_failed),
            hourly_savings: result.hourly_savings,
            monthly_savings: result.monthly_savings(),
            stage: result.stage(),
            error: result.error.clone(),
        }
    }
}

/// Savings of the whole run plus what happened in each location.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalReport {
    pub hourly_savings: f64,
    pub regions: BTreeMap<String, RegionSummary>,
    /// Actions taken, keyed by location
    pub recap: BTreeMap<String, Vec<String>>,
}

impl GlobalReport {
    /// Fold one location's result into the totals
    pub fn merge(&mut self, result: RegionResult) {
        self.hourly_savings += result.hourly_savings;
        self.regions
            .insert(result.location.clone(), RegionSummary::from(&result));

        let mut recap = result.recap;
        if let Some(error) = result.error {
            recap.push(format!("location failed: {}", error));
        }
        if !recap.is_empty() {
            self.recap.entry(result.location).or_default().extend(recap);
        }
    }

    pub fn monthly_savings(&self) -> f64 {
        self.hourly_savings * HOURS_PER_MONTH
    }

    pub fn failed_locations(&self) -> Vec<&str> {
        self.regions
            .iter()
            .filter(|(_, summary)| summary.error.is_some())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn log_totals(&self) {
        tracing::info!(
            "Total savings: ${:.4} (monthly), ${:.6} (hourly)",
            self.monthly_savings(),
            self.hourly_savings
        );
    }

    pub fn log_recap(&self) {
        tracing::info!("####### BEGIN FINAL RECAP #######");
        for (location, actions) in &self.recap {
            for action in actions {
                tracing::info!("{} {}", location, action);
            }
        }
        tracing::info!("####### END FINAL RECAP #######");
    }

    /// Write the report as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize report to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write report to {:?}", path.as_ref()))?;

        Ok(())
    }
}
