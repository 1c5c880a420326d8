//! Pricing model
//!
//! Prices a fully specified `VolumeConfig` against the ingested catalog:
//! storage is billed per GB-month, provisioned IOPS and throughput are billed
//! through piecewise price bands.
//!
//! # Band semantics
//!
//! Bands are half-open `[begin, end)` and sorted. For a requested quantity `q`:
//!
//! | Position of band    | Charge                        |
//! |---------------------|-------------------------------|
//! | `q >= end`          | `unit_price * (end - lower)`  |
//! | `lower <= q < end`  | `unit_price * (q - lower)`    |
//! | `q < lower`         | nothing                       |
//!
//! `lower` is the band's begin, except that a gap after the previous band is
//! closed by starting at the previous band's end. Quantities below the first
//! band are the free allowance.

use crate::backup;
use crate::catalog::Catalog;
use crate::volume::{Volume, VolumeConfig};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Average hours per month used to turn monthly prices into hourly ones
pub const HOURS_PER_MONTH: f64 = 730.0;

/// A numeric range with a per-unit monthly price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub begin_range: u32,
    pub end_range: u32,
    pub unit_price: f64,
}

impl PriceBand {
    pub const fn new(begin_range: u32, end_range: u32, unit_price: f64) -> Self {
        Self {
            begin_range,
            end_range,
            unit_price,
        }
    }

    /// Returns true if `quantity` falls inside `[begin, end)`
    #[inline]
    pub fn contains(&self, quantity: u32) -> bool {
        quantity >= self.begin_range && quantity < self.end_range
    }

    /// Returns true if the two ranges share at least one unit
    pub fn overlaps(&self, other: &PriceBand) -> bool {
        self.begin_range < other.end_range && other.begin_range < self.end_range
    }
}

impl fmt::Display for PriceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})@{}", self.begin_range, self.end_range, self.unit_price)
    }
}

/// Monthly cost of `quantity` units priced through sorted `bands`.
pub fn banded_cost(bands: &[PriceBand], quantity: u32) -> f64 {
    let mut cost = 0.0;
    let mut previous_end: Option<u32> = None;

    for band in bands {
        let lower = match previous_end {
            Some(end) if end < band.begin_range => end,
            _ => band.begin_range,
        };

        if quantity >= band.end_range {
            cost += band.unit_price * f64::from(band.end_range.saturating_sub(lower));
        } else if quantity >= lower {
            cost += band.unit_price * f64::from(quantity - lower);
        }

        previous_end = Some(band.end_range);
    }

    cost
}

/// Monthly price of a configuration.
///
/// A class/location pair missing from the catalog prices as zero; that is the
/// "nothing known, nothing charged" case, not an error.
pub fn monthly_price(config: &VolumeConfig, catalog: &Catalog) -> f64 {
    let Some(pricing) = catalog.pricing(config.class, &config.location) else {
        tracing::debug!(
            "No pricing for {} in {}, pricing as zero",
            config.class,
            config.location
        );
        return 0.0;
    };

    let storage = pricing.price_per_gb * f64::from(config.size_gb);
    let iops = banded_cost(&pricing.iops_bands, config.iops);
    let throughput = banded_cost(&pricing.throughput_bands, config.throughput);
    let total = storage + iops + throughput;

    tracing::debug!(
        "Cost for {}: storage={:.4} iops={:.4} throughput={:.4} total={:.4}",
        config,
        storage,
        iops,
        throughput,
        total
    );
    total
}

/// Hourly price of a configuration (monthly / 730)
pub fn hourly_price(config: &VolumeConfig, catalog: &Catalog) -> f64 {
    monthly_price(config, catalog) / HOURS_PER_MONTH
}

/// Lifetime monthly savings of a volume: initial price minus current price.
///
/// Zero when the volume was never optimized (no readable initial snapshot) and
/// clamped at zero when the current configuration costs more, which happens
/// after someone changed the volume by hand.
pub fn monthly_savings(volume: &Volume, catalog: &Catalog) -> f64 {
    let Some(initial) = backup::initial_configuration(volume) else {
        tracing::debug!("Missing initial configuration for {}", volume);
        return 0.0;
    };

    let current_cost = monthly_price(&volume.config, catalog);
    let initial_cost = monthly_price(&initial, catalog);
    let savings = initial_cost - current_cost;

    if savings > 0.0 {
        tracing::info!("Monthly savings for {}: {:.4}", volume, savings);
        savings
    } else {
        0.0
    }
}

/// Lifetime hourly savings of a volume
pub fn hourly_savings(volume: &Volume, catalog: &Catalog) -> f64 {
    monthly_savings(volume, catalog) / HOURS_PER_MONTH
}
