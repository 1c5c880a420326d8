//! Built-in descriptors of the volume classes
//!
//! Limits are published constants and do not come from the price catalog.
//! Only pricing is filled in at startup.

use crate::pricing::PriceBand;
use crate::types::VolumeClass;
use std::collections::BTreeMap;

/// Published size and performance limits of a volume class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassLimits {
    pub min_size_gb: u32,
    pub max_size_tb: u32,
    /// Annual durability, in percent
    pub min_durability: f64,
    pub max_iops: u32,
    /// 0 when IOPS are not bound to the volume size
    pub max_iops_per_gb: u32,
    /// MB/s
    pub max_throughput: u32,
    /// Throughput included in the storage price, MB/s
    pub throughput_free: u32,
    /// IOPS entitlement per GB for size-bound classes
    pub baseline_iops_per_gb: u32,
    pub min_iops: u32,
    pub iops_burst: u32,
    pub bootable: bool,
}

/// Static limits for `class`
pub const fn limits(class: VolumeClass) -> ClassLimits {
    match class {
        VolumeClass::Gp2 => ClassLimits {
            min_size_gb: 1,
            max_size_tb: 16,
            min_durability: 99.8,
            max_iops: 16000,
            max_iops_per_gb: 0,
            max_throughput: 250,
            throughput_free: 0,
            baseline_iops_per_gb: 3,
            min_iops: 100,
            iops_burst: 3000,
            bootable: true,
        },
        VolumeClass::Gp3 => ClassLimits {
            min_size_gb: 1,
            max_size_tb: 16,
            min_durability: 99.8,
            max_iops: 16000,
            max_iops_per_gb: 0,
            max_throughput: 1000,
            throughput_free: 125,
            baseline_iops_per_gb: 0,
            min_iops: 0,
            iops_burst: 0,
            bootable: true,
        },
        VolumeClass::Io1 => ClassLimits {
            min_size_gb: 4,
            max_size_tb: 16,
            min_durability: 99.8,
            max_iops: 64000,
            max_iops_per_gb: 50,
            max_throughput: 1000,
            throughput_free: 0,
            baseline_iops_per_gb: 0,
            min_iops: 0,
            iops_burst: 0,
            bootable: true,
        },
        VolumeClass::Io2 => ClassLimits {
            min_size_gb: 4,
            max_size_tb: 16,
            min_durability: 99.999,
            max_iops: 64000,
            max_iops_per_gb: 500,
            max_throughput: 1000,
            throughput_free: 0,
            baseline_iops_per_gb: 0,
            min_iops: 0,
            iops_burst: 0,
            bootable: true,
        },
        VolumeClass::St1 => ClassLimits {
            min_size_gb: 125,
            max_size_tb: 16,
            min_durability: 99.8,
            max_iops: 500,
            max_iops_per_gb: 0,
            max_throughput: 250,
            throughput_free: 0,
            baseline_iops_per_gb: 3,
            min_iops: 100,
            iops_burst: 3000,
            bootable: false,
        },
        VolumeClass::Sc1 => ClassLimits {
            min_size_gb: 125,
            max_size_tb: 16,
            min_durability: 99.8,
            max_iops: 250,
            max_iops_per_gb: 0,
            max_throughput: 250,
            throughput_free: 0,
            baseline_iops_per_gb: 0,
            min_iops: 0,
            iops_burst: 0,
            bootable: false,
        },
        VolumeClass::Standard => ClassLimits {
            min_size_gb: 1,
            max_size_tb: 1,
            min_durability: 99.8,
            max_iops: 200,
            max_iops_per_gb: 0,
            max_throughput: 90,
            throughput_free: 0,
            baseline_iops_per_gb: 0,
            min_iops: 0,
            iops_burst: 0,
            bootable: false,
        },
    }
}

/// Prices of one class in one location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionalPricing {
    /// Monthly price per GB of storage
    pub price_per_gb: f64,
    /// Provisioned IOPS bands, sorted and non-overlapping
    pub iops_bands: Vec<PriceBand>,
    /// Provisioned throughput bands (per MB/s), sorted and non-overlapping
    pub throughput_bands: Vec<PriceBand>,
}

impl RegionalPricing {
    /// Insert a band, replacing one with the same range and keeping the list sorted
    pub(crate) fn insert_band(bands: &mut Vec<PriceBand>, band: PriceBand) {
        if let Some(existing) = bands
            .iter_mut()
            .find(|b| b.begin_range == band.begin_range && b.end_range == band.end_range)
        {
            existing.unit_price = band.unit_price;
            return;
        }
        if let Some(clash) = bands.iter().find(|b| b.overlaps(&band)) {
            tracing::warn!("Price band {} overlaps {}, ignoring it", band, clash);
            return;
        }
        let position = bands
            .iter()
            .position(|b| b.begin_range > band.begin_range)
            .unwrap_or(bands.len());
        bands.insert(position, band);
    }
}

/// Descriptor of a storage class: limits plus pricing keyed by location.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeClassInfo {
    pub class: VolumeClass,
    pub limits: ClassLimits,
    pub pricing: BTreeMap<String, RegionalPricing>,
}

impl VolumeClassInfo {
    /// Descriptor without any pricing
    pub fn new(class: VolumeClass) -> Self {
        Self {
            class,
            limits: limits(class),
            pricing: BTreeMap::new(),
        }
    }
}
