//! Configuration file handling for saving and loading optimizer settings.
//!
//! The file is a JSON object mirroring [`RunOptions`]. Every field is optional;
//! missing fields take their defaults and command-line flags override them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::RunOptions;
use crate::selection::TagFilter;
use crate::types::TagFilteringMode;

/// Optimizer configuration that can be saved/loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Location allow-list (globs, comma or whitespace separated)
    pub regions: String,
    pub tag_filters: String,
    pub tag_filtering_mode: TagFilteringMode,
    /// Give large gp2 volumes gp3 IOPS matching their gp2 baseline
    pub gp3_match_gp2_iops: bool,
    /// Give gp2 volumes gp3 throughput matching the gp2 burst
    pub gp3_match_gp2_throughput: bool,
    pub dry_run: bool,
    /// Overrides the built-in io2 location list when set
    pub io2_locations: Option<Vec<String>>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            regions: String::new(),
            tag_filters: String::new(),
            tag_filtering_mode: TagFilteringMode::OptOut,
            gp3_match_gp2_iops: false,
            gp3_match_gp2_throughput: false,
            dry_run: false,
            io2_locations: None,
        }
    }
}

impl OptimizerConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Location patterns only use `*` and `?` as wildcards
        if let Some(bad) = self
            .regions
            .split(|c: char| c == ',' || c.is_whitespace())
            .find(|p| p.contains(['[', ']', '{', '}']))
        {
            anyhow::bail!("Unsupported pattern syntax in region {:?}", bad);
        }

        TagFilter::parse(&self.tag_filters, self.tag_filtering_mode)
            .context("Invalid tag filters")?;

        if let Some(locations) = &self.io2_locations {
            if locations.iter().any(|l| l.trim().is_empty()) {
                anyhow::bail!("io2 location list contains an empty entry");
            }
        }

        Ok(())
    }

    /// Convert to the options value consumed by a run
    pub fn to_run_options(&self) -> RunOptions {
        let defaults = RunOptions::default();
        RunOptions {
            locations_allow_list: self.regions.clone(),
            match_iops: self.gp3_match_gp2_iops,
            match_throughput: self.gp3_match_gp2_throughput,
            dry_run: self.dry_run,
            tag_filters: self.tag_filters.clone(),
            tag_filtering_mode: self.tag_filtering_mode,
            io2_locations: self
                .io2_locations
                .clone()
                .unwrap_or(defaults.io2_locations),
        }
    }
}
