//! Catalog ingestion passes
//!
//! Pricing is loaded with a fixed sequence of filtered catalog queries:
//!
//! | Pass | Filter                                         | Result                          |
//! |------|------------------------------------------------|---------------------------------|
//! | 1    | productFamily=Storage                          | per-GB price, every class       |
//! | 2    | gp3 + System Operation                         | IOPS band `[3000, 16000)`       |
//! | 3    | gp3 + Provisioned Throughput                   | throughput band `[125, 1000)`   |
//! | 4    | io1 / io2 + System Operation                   | tiered IOPS bands               |
//!
//! A transport failure aborts ingestion. A single record that cannot be
//! normalized, decoded or priced is skipped with a warning.

use crate::catalog::Catalog;
use crate::catalog::record::PriceRecord;
use crate::error::{OptimizerError, Result};
use crate::pricing::PriceBand;
use crate::provider::{CatalogFilter, PriceCatalogSource, SERVICE_CODE};
use crate::types::VolumeClass;
use std::str::FromStr;

/// Free gp3 IOPS; provisioned IOPS are billed above this
pub const GP3_FREE_IOPS: u32 = 3000;
/// gp3 IOPS ceiling
pub const GP3_MAX_IOPS: u32 = 16000;
/// Free gp3 throughput in MB/s
pub const GP3_FREE_THROUGHPUT: u32 = 125;
/// gp3 throughput ceiling in MB/s
pub const GP3_MAX_THROUGHPUT: u32 = 1000;
/// io1 IOPS are billed at a single rate up to this ceiling
pub const IO1_MAX_IOPS: u32 = 64000;
/// Upper bound of the first io2 IOPS tier
pub const IO2_TIER_1_END: u32 = 32000;
/// Upper bound of the second io2 IOPS tier
pub const IO2_TIER_2_END: u32 = 64000;
/// Upper bound of the third io2 IOPS tier
pub const IO2_TIER_3_END: u32 = 256000;
/// The catalog prices throughput per GiBps
const MBPS_PER_GIBPS: f64 = 1024.0;

/// Lazily fetched pages of raw catalog records.
///
/// Each call to `next` issues one catalog request; iteration stops after the
/// last page or after the first error.
pub struct CatalogPages<'a> {
    source: &'a dyn PriceCatalogSource,
    filters: Vec<CatalogFilter>,
    next_token: Option<String>,
    finished: bool,
}

impl<'a> CatalogPages<'a> {
    pub fn new(source: &'a dyn PriceCatalogSource, filters: Vec<CatalogFilter>) -> Self {
        Self {
            source,
            filters,
            next_token: None,
            finished: false,
        }
    }
}

impl Iterator for CatalogPages<'_> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self
            .source
            .get_products(SERVICE_CODE, &self.filters, self.next_token.as_deref())
        {
            Ok(page) => {
                self.next_token = page.next_token;
                self.finished = self.next_token.is_none();
                Some(Ok(page.price_list))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Fetch and decode every record matching `filters`, skipping bad records.
pub fn fetch_records(
    source: &dyn PriceCatalogSource,
    filters: Vec<CatalogFilter>,
) -> Result<Vec<PriceRecord>> {
    let mut records = Vec::new();

    for page in CatalogPages::new(source, filters) {
        for raw in page? {
            match PriceRecord::parse(&raw) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping catalog record: {}", e),
            }
        }
    }

    Ok(records)
}

/// A decoded record reduced to what the passes need.
struct PricedRecord {
    class: VolumeClass,
    location: String,
    price: f64,
    group: String,
}

fn priced(record: &PriceRecord) -> Option<PricedRecord> {
    let class = match VolumeClass::from_str(record.volume_api_name()) {
        Ok(class) => class,
        Err(_) => {
            tracing::debug!(
                "Skipping catalog record for unknown volume class {:?}",
                record.volume_api_name()
            );
            return None;
        }
    };

    match record.usd_price() {
        Ok(price) => Some(PricedRecord {
            class,
            location: record.location(),
            price,
            group: record.group().to_string(),
        }),
        Err(e) => {
            tracing::warn!("Skipping catalog record for {}: {}", class, e);
            None
        }
    }
}

fn pass_failed(pass: &str, e: OptimizerError) -> OptimizerError {
    OptimizerError::catalog(format!("failed to get {} pricing information: {}", pass, e))
}

/// Run all ingestion passes against `source`, filling in `catalog`.
pub fn populate(catalog: &mut Catalog, source: &dyn PriceCatalogSource) -> Result<()> {
    populate_storage_pricing(catalog, source).map_err(|e| pass_failed("storage", e))?;
    populate_gp3_iops_pricing(catalog, source).map_err(|e| pass_failed("gp3 IOPS", e))?;
    populate_gp3_throughput_pricing(catalog, source)
        .map_err(|e| pass_failed("gp3 throughput", e))?;
    populate_tiered_iops_pricing(catalog, source, VolumeClass::Io1)
        .map_err(|e| pass_failed("io1 IOPS", e))?;
    populate_tiered_iops_pricing(catalog, source, VolumeClass::Io2)
        .map_err(|e| pass_failed("io2 IOPS", e))?;
    Ok(())
}

fn populate_storage_pricing(catalog: &mut Catalog, source: &dyn PriceCatalogSource) -> Result<()> {
    let filters = vec![
        CatalogFilter::term_match("ServiceCode", SERVICE_CODE),
        CatalogFilter::term_match("productFamily", "Storage"),
    ];

    for record in fetch_records(source, filters)?.iter().filter_map(priced) {
        tracing::debug!(
            "{}: {} storage costs {} per GB-month",
            record.class,
            record.location,
            record.price
        );
        catalog.set_price_per_gb(record.class, &record.location, record.price);
    }
    Ok(())
}

fn populate_gp3_iops_pricing(catalog: &mut Catalog, source: &dyn PriceCatalogSource) -> Result<()> {
    let filters = vec![
        CatalogFilter::term_match("volumeApiName", "gp3"),
        CatalogFilter::term_match("productFamily", "System Operation"),
    ];

    for record in fetch_records(source, filters)?.iter().filter_map(priced) {
        tracing::debug!("{}: {} PIOPS costs {}", record.class, record.location, record.price);
        catalog.add_iops_band(
            record.class,
            &record.location,
            PriceBand::new(GP3_FREE_IOPS, GP3_MAX_IOPS, record.price),
        );
    }
    Ok(())
}

fn populate_gp3_throughput_pricing(
    catalog: &mut Catalog,
    source: &dyn PriceCatalogSource,
) -> Result<()> {
    let filters = vec![
        CatalogFilter::term_match("volumeApiName", "gp3"),
        CatalogFilter::term_match("productFamily", "Provisioned Throughput"),
    ];

    for record in fetch_records(source, filters)?.iter().filter_map(priced) {
        let price = record.price / MBPS_PER_GIBPS;
        tracing::debug!("{}: {} throughput costs {} per MBps", record.class, record.location, price);
        catalog.add_throughput_band(
            record.class,
            &record.location,
            PriceBand::new(GP3_FREE_THROUGHPUT, GP3_MAX_THROUGHPUT, price),
        );
    }
    Ok(())
}

/// IOPS range billed by a provisioned IOPS record.
///
/// io1 has a single rate. io2 selects the tier from the catalog group label;
/// records without a recognised label price the first tier.
pub fn iops_tier(class: VolumeClass, group: &str) -> (u32, u32) {
    match (class, group) {
        (VolumeClass::Io1, _) => (0, IO1_MAX_IOPS),
        (_, "EBS IOPS Tier 3") => (IO2_TIER_2_END, IO2_TIER_3_END),
        (_, "EBS IOPS Tier 2") => (IO2_TIER_1_END, IO2_TIER_2_END),
        _ => (0, IO2_TIER_1_END),
    }
}

fn populate_tiered_iops_pricing(
    catalog: &mut Catalog,
    source: &dyn PriceCatalogSource,
    class: VolumeClass,
) -> Result<()> {
    let filters = vec![
        CatalogFilter::term_match("volumeApiName", class.to_string()),
        CatalogFilter::term_match("productFamily", "System Operation"),
    ];

    for record in fetch_records(source, filters)?.iter().filter_map(priced) {
        let (begin, end) = iops_tier(record.class, &record.group);
        tracing::debug!(
            "{}: {} PIOPS [{}, {}) costs {}",
            record.class,
            record.location,
            begin,
            end,
            record.price
        );
        catalog.add_iops_band(record.class, &record.location, PriceBand::new(begin, end, record.price));
    }
    Ok(())
}
