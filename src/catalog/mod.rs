//! Volume class catalog
//!
//! Holds one descriptor per known volume class. Limits are built in; pricing is
//! ingested from a [`PriceCatalogSource`] once per run and then only read.
//!
//! # Design
//!
//! - The catalog is built before any region worker starts and is shared by
//!   reference afterwards, so it needs no locking.
//! - Missing pricing is not an error: pricing a class/location pair the catalog
//!   knows nothing about yields zero.

mod info;
mod ingest;
mod location;
mod record;

pub use info::{ClassLimits, RegionalPricing, VolumeClassInfo, limits};
pub use ingest::{CatalogPages, fetch_records, iops_tier};
pub use location::location_code;
pub use record::{PriceRecord, normalize_keys};

pub use crate::pricing::PriceBand;

use crate::error::Result;
use crate::provider::PriceCatalogSource;
use crate::types::VolumeClass;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

/// Descriptors of every volume class, keyed by class.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    classes: BTreeMap<VolumeClass, VolumeClassInfo>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Catalog with the built-in limits of every class and no pricing
    pub fn builtin() -> Self {
        let classes = VolumeClass::iter()
            .map(|class| (class, VolumeClassInfo::new(class)))
            .collect();
        Self { classes }
    }

    /// Build a catalog and fill in pricing from `source`.
    ///
    /// Any transport error aborts the whole ingestion.
    pub fn from_source(source: &dyn PriceCatalogSource) -> Result<Self> {
        let mut catalog = Self::builtin();
        ingest::populate(&mut catalog, source)?;
        tracing::info!(
            "Loaded pricing for {} class/location pairs",
            catalog.priced_pairs()
        );
        Ok(catalog)
    }


    /// Pricing of `class` in `location`, if any was ingested
    pub fn pricing(&self, class: VolumeClass, location: &str) -> Option<&RegionalPricing> {
        self.classes.get(&class)?.pricing.get(location)
    }

    /// Number of class/location pairs that carry pricing
    pub fn priced_pairs(&self) -> usize {
        self.classes.values().map(|info| info.pricing.len()).sum()
    }

    fn pricing_mut(&mut self, class: VolumeClass, location: &str) -> &mut RegionalPricing {
        self.classes
            .entry(class)
            .or_insert_with(|| VolumeClassInfo::new(class))
            .pricing
            .entry(location.to_string())
            .or_default()
    }

    pub fn set_price_per_gb(&mut self, class: VolumeClass, location: &str, price: f64) {
        self.pricing_mut(class, location).price_per_gb = price;
    }

    pub fn add_iops_band(&mut self, class: VolumeClass, location: &str, band: PriceBand) {
        RegionalPricing::insert_band(&mut self.pricing_mut(class, location).iops_bands, band);
    }

    pub fn add_throughput_band(&mut self, class: VolumeClass, location: &str, band: PriceBand) {
        RegionalPricing::insert_band(
            &mut self.pricing_mut(class, location).throughput_bands,
            band,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_every_class() {
        let catalog = Catalog::builtin();
        for class in VolumeClass::iter() {
            let info = &catalog.classes[&class];
            assert_eq!(info.class, class);
            assert!(info.pricing.is_empty());
        }
        assert_eq!(catalog.priced_pairs(), 0);
    }

    #[test]
    fn test_pricing_is_per_location() {
        let mut catalog = Catalog::builtin();
        catalog.set_price_per_gb(VolumeClass::Gp2, "us-east-1", 0.10);
        assert!(catalog.pricing(VolumeClass::Gp2, "us-east-1").is_some());
        assert!(catalog.pricing(VolumeClass::Gp2, "eu-west-1").is_none());
        assert!(catalog.pricing(VolumeClass::Gp3, "us-east-1").is_none());
        assert_eq!(catalog.priced_pairs(), 1);
    }

    #[test]
    fn test_bands_accumulate() {
        let mut catalog = Catalog::builtin();
        catalog.add_iops_band(VolumeClass::Io2, "us-east-1", PriceBand::new(32000, 64000, 0.0455));
        catalog.add_iops_band(VolumeClass::Io2, "us-east-1", PriceBand::new(0, 32000, 0.065));
        let pricing = catalog.pricing(VolumeClass::Io2, "us-east-1").unwrap();
        assert_eq!(pricing.iops_bands.len(), 2);
        assert_eq!(pricing.iops_bands[0].begin_range, 0);
        assert_eq!(pricing.price_per_gb, 0.0);
    }
}
