//! Price catalog ingestion against a paged in-memory catalog

mod common;

use common::{catalog, memory_catalog, raw_record, US_EAST_1};
use ebs_optimizer::{Catalog, MemoryCatalog, PriceBand, VolumeClass};

#[test]
fn test_storage_prices_per_location() {
    let catalog = catalog();
    let gp2 = catalog.pricing(VolumeClass::Gp2, "us-east-1").unwrap();
    assert_eq!(gp2.price_per_gb, 0.10);
    let gp3 = catalog.pricing(VolumeClass::Gp3, "eu-west-1").unwrap();
    assert_eq!(gp3.price_per_gb, 0.08);
    assert!(catalog.pricing(VolumeClass::Gp2, "us-west-2").is_none());
}

#[test]
fn test_gp3_bands_start_at_free_allowance() {
    let catalog = catalog();
    let gp3 = catalog.pricing(VolumeClass::Gp3, "us-east-1").unwrap();
    assert_eq!(gp3.iops_bands, vec![PriceBand::new(3000, 16000, 0.005)]);
    assert_eq!(gp3.throughput_bands.len(), 1);
    let band = gp3.throughput_bands[0];
    assert_eq!((band.begin_range, band.end_range), (125, 1000));
    // catalog prices throughput per GiBps
    assert!((band.unit_price - 0.04).abs() < 1e-12);
}

#[test]
fn test_io2_tiers() {
    let catalog = catalog();
    let io2 = catalog.pricing(VolumeClass::Io2, "us-east-1").unwrap();
    assert_eq!(
        io2.iops_bands,
        vec![
            PriceBand::new(0, 32000, 0.065),
            PriceBand::new(32000, 64000, 0.0455),
            PriceBand::new(64000, 256000, 0.03185),
        ]
    );
    let io1 = catalog.pricing(VolumeClass::Io1, "us-east-1").unwrap();
    assert_eq!(io1.iops_bands, vec![PriceBand::new(0, 64000, 0.065)]);
}

#[test]
fn test_bad_records_are_skipped() {
    let catalog = catalog();
    assert!(catalog.pricing(VolumeClass::Gp2, "Moon Base (Alpha)").is_none());
    // 7 storage classes, each in two locations
    assert_eq!(catalog.priced_pairs(), 14);
}

#[test]
fn test_page_size_does_not_change_result() {
    let small = Catalog::from_source(&memory_catalog().with_page_size(1)).unwrap();
    let large = Catalog::from_source(&memory_catalog().with_page_size(1000)).unwrap();
    assert_eq!(small, large);
}

#[test]
fn test_unavailable_catalog_is_fatal() {
    let err = Catalog::from_source(&MemoryCatalog::unavailable()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("storage"), "unexpected error: {}", message);
    assert!(message.contains("unavailable"), "unexpected error: {}", message);
}

#[test]
fn test_empty_catalog_prices_nothing() {
    let catalog = Catalog::from_source(&MemoryCatalog::new(Vec::new())).unwrap();
    assert_eq!(catalog.priced_pairs(), 0);
    assert_eq!(catalog, Catalog::builtin());
}

#[test]
fn test_later_record_replaces_price() {
    let records = vec![
        raw_record("Storage", "gp2", US_EAST_1, "", "0.10"),
        raw_record("Storage", "gp2", US_EAST_1, "", "0.11"),
    ];
    let catalog = Catalog::from_source(&MemoryCatalog::new(records)).unwrap();
    assert_eq!(
        catalog.pricing(VolumeClass::Gp2, "us-east-1").unwrap().price_per_gb,
        0.11
    );
}
