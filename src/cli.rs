use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use crate::backup::SnapshotKind;
use crate::types::{TagFilteringMode, VolumeClass};

/// EBS Optimizer - convert volumes to cheaper equivalent classes
#[derive(Parser)]
#[command(name = "ebs-optimizer")]
#[command(about = "Converts block-storage volumes to cheaper equivalent classes and reports the savings")]
#[command(version)]
pub struct Cli {
    /// Dry-run mode: decide and price everything, but issue no modify or
    /// tag-write calls. Intended changes are logged instead.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Path to a JSON configuration file; flags override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Optimize every volume of an inventory snapshot
    Run {
        /// Inventory snapshot to run against; rewritten after a live run
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Regions where it should be activated (separated by comma or
        /// whitespace, also supports globs)
        #[arg(long)]
        regions: Option<String>,

        /// Set of tags to filter the volumes on, e.g. 'optimize=true'
        #[arg(long)]
        tag_filters: Option<String>,

        /// Controls the behavior of --tag-filters (opt-in | opt-out)
        #[arg(long)]
        tag_filtering_mode: Option<TagFilteringMode>,

        /// Give large gp2 volumes gp3 IOPS matching their gp2 baseline
        #[arg(long)]
        match_iops: bool,

        /// Give gp2 volumes gp3 throughput matching the gp2 burst
        #[arg(long)]
        match_throughput: bool,

        /// Write the final report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        config: PathBuf,
    },
    /// Show what the optimizer would do with one volume
    Decide {
        /// Current volume class (gp2, gp3, io1, io2, st1, sc1, standard)
        #[arg(long)]
        class: VolumeClass,

        /// Size in GB
        #[arg(long)]
        size: u32,

        #[arg(long, default_value_t = 0)]
        iops: u32,

        /// Throughput in MB/s
        #[arg(long, default_value_t = 0)]
        throughput: u32,

        #[arg(long, default_value = "us-east-1")]
        location: String,

        /// Inventory snapshot whose catalog is used for prices
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        #[arg(long)]
        match_iops: bool,

        #[arg(long)]
        match_throughput: bool,
    },
    /// Move a volume back to its initial or previous configuration
    Restore {
        /// Inventory snapshot holding the volume
        #[arg(short, long)]
        snapshot: PathBuf,

        #[arg(long)]
        location: String,

        /// Volume identifier
        #[arg(long)]
        volume: String,

        /// Which recorded configuration to restore (initial | previous)
        #[arg(long, default_value = "initial")]
        to: SnapshotKind,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    pub fn print_help() {
        let _ = Self::command().print_help();
    }
}
