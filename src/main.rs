//! EBS Optimizer - Main entry point
//!
//! Loads options and an inventory snapshot, builds the price catalog once,
//! then hands everything to the scheduler.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, error, info, warn};

use ebs_optimizer::backup::BackupTracker;
use ebs_optimizer::catalog::Catalog;
use ebs_optimizer::cli::{Cli, Commands};
use ebs_optimizer::config_file::OptimizerConfig;
use ebs_optimizer::engine::evaluate;
use ebs_optimizer::logging::init_logging;
use ebs_optimizer::pricing;
use ebs_optimizer::provider::CloudProvider;
use ebs_optimizer::provider::memory::MemoryCloud;
use ebs_optimizer::provider::snapshot::InventorySnapshot;
use ebs_optimizer::scheduler;
use ebs_optimizer::volume::VolumeConfig;

/// Main application entry point
fn main() -> Result<()> {
    init_logging();
    info!("EBS Optimizer {} starting up", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse_args();
    debug!("CLI arguments parsed");

    let mut config = match &cli.config {
        Some(path) => OptimizerConfig::load_from_file(path)?,
        None => OptimizerConfig::default(),
    };
    config.dry_run |= cli.dry_run;

    match cli.command {
        Some(Commands::Validate { config }) => {
            info!("Validating configuration file: {:?}", config);
            match OptimizerConfig::load_from_file(&config) {
                Ok(config) => match config.validate() {
                    Ok(_) => {
                        info!("Configuration validation successful");
                        println!("✓ Configuration file is valid: {:?}", config);
                    }
                    Err(e) => {
                        error!("Configuration validation failed: {}", e);
                        eprintln!("✗ Configuration validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                },
                Err(e) => {
                    error!("Failed to load configuration file: {}", e);
                    eprintln!("✗ Failed to load configuration file: {:#}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Run {
            snapshot,
            regions,
            tag_filters,
            tag_filtering_mode,
            match_iops,
            match_throughput,
            report,
        }) => {
            if let Some(regions) = regions {
                config.regions = regions;
            }
            if let Some(tag_filters) = tag_filters {
                config.tag_filters = tag_filters;
            }
            if let Some(mode) = tag_filtering_mode {
                config.tag_filtering_mode = mode;
            }
            config.gp3_match_gp2_iops |= match_iops;
            config.gp3_match_gp2_throughput |= match_throughput;
            run_optimizer(&config, &snapshot, report.as_deref())?;
        }
        Some(Commands::Decide {
            class,
            size,
            iops,
            throughput,
            location,
            snapshot,
            match_iops,
            match_throughput,
        }) => {
            config.gp3_match_gp2_iops |= match_iops;
            config.gp3_match_gp2_throughput |= match_throughput;
            let current = VolumeConfig::new(class, size, location)
                .with_iops(iops)
                .with_throughput(throughput);
            decide_one(&config, &current, snapshot.as_deref())?;
        }
        Some(Commands::Restore {
            snapshot,
            location,
            volume,
            to,
        }) => {
            let inventory = InventorySnapshot::load_from_file(&snapshot)?;
            let cloud = inventory.to_cloud()?;
            let restored = {
                let client = cloud.connect(&location)?;
                let mut target = client
                    .list_volumes()?
                    .into_iter()
                    .find(|v| v.id == volume)
                    .with_context(|| format!("Volume {} not found in {}", volume, location))?;
                BackupTracker::new(client.as_ref(), config.dry_run).restore(&mut target, to)?
            };
            println!("{} in {} restored to {}", volume, location, restored);
            save_inventory(inventory, &cloud, &snapshot, config.dry_run)?;
        }
        None => {
            Cli::print_help();
        }
    }

    Ok(())
}

/// Full run against an inventory snapshot
fn run_optimizer(config: &OptimizerConfig, snapshot: &Path, report_path: Option<&Path>) -> Result<()> {
    config.validate()?;
    let options = config.to_run_options();
    if options.dry_run {
        info!("Dry-run mode: no volume or tag will be modified");
    }

    let inventory = InventorySnapshot::load_from_file(snapshot)?;
    info!("Loaded {} volumes from {:?}", inventory.volume_count(), snapshot);

    let catalog =
        Catalog::from_source(&inventory.to_catalog()).context("Failed to load pricing information")?;
    let cloud = inventory.to_cloud()?;

    let report = scheduler::run(&cloud, &catalog, &options)?;
    report.log_recap();

    let failed = report.failed_locations();
    if !failed.is_empty() {
        warn!("Locations that could not be processed: {}", failed.join(", "));
    }

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        info!("Report written to {:?}", path);
    }

    save_inventory(inventory, &cloud, snapshot, options.dry_run)
}

fn save_inventory(
    mut inventory: InventorySnapshot,
    cloud: &MemoryCloud,
    path: &Path,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        return Ok(());
    }
    inventory.update_from(cloud)?;
    inventory.save_to_file(path)?;
    debug!("Inventory written back to {:?}", path);
    Ok(())
}

/// Evaluate the rules for one volume and print the target and prices
fn decide_one(config: &OptimizerConfig, current: &VolumeConfig, snapshot: Option<&Path>) -> Result<()> {
    let catalog = match snapshot {
        Some(path) => {
            let inventory = InventorySnapshot::load_from_file(path)?;
            Catalog::from_source(&inventory.to_catalog())
                .context("Failed to load pricing information")?
        }
        None => Catalog::builtin(),
    };

    let policy = config.to_run_options().policy();
    let decision = evaluate(current, &policy);

    println!("current: {}", current);
    println!("target:  {}", decision.target);
    if decision.rules.is_empty() {
        println!("rules:   none, volume left unchanged");
    } else {
        let rules: Vec<String> = decision.rules.iter().map(|r| r.to_string()).collect();
        println!("rules:   {}", rules.join(", "));
    }
    println!(
        "monthly: {:.4} -> {:.4}",
        pricing::monthly_price(current, &catalog),
        pricing::monthly_price(&decision.target, &catalog)
    );
    Ok(())
}
