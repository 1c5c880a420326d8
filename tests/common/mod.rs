//! Shared fixtures for the integration tests

#![allow(dead_code)]

use ebs_optimizer::{Catalog, MemoryCatalog, MemoryCloud, Volume, VolumeClass, VolumeConfig};

/// A raw catalog record shaped like the price service output, with opaque
/// identifier keys that still need normalizing.
pub fn raw_record(family: &str, class: &str, location: &str, group: &str, price: &str) -> String {
    format!(
        r#"{{
            "product": {{
                "productFamily": "{family}",
                "attributes": {{
                    "volumeApiName": "{class}",
                    "location": "{location}",
                    "group": "{group}"
                }},
                "sku": "7U4BYD2ABJ4NZRNM"
            }},
            "serviceCode": "AmazonEC2",
            "terms": {{
                "OnDemand": {{
                    "7U4BYD2ABJ4NZRNM.JRTCKXETXF": {{
                        "priceDimensions": {{
                            "7U4BYD2ABJ4NZRNM.JRTCKXETXF.6YS6EN2CT7": {{
                                "unit": "GB-Mo",
                                "pricePerUnit": {{ "USD": "{price}" }}
                            }}
                        }},
                        "offerTermCode": "JRTCKXETXF"
                    }}
                }}
            }}
        }}"#
    )
}

pub const US_EAST_1: &str = "US East (N. Virginia)";
pub const EU_WEST_1: &str = "EU (Ireland)";

/// Catalog records for us-east-1 and eu-west-1, plus a few bad ones
pub fn catalog_records() -> Vec<String> {
    let mut records = Vec::new();
    for location in [US_EAST_1, EU_WEST_1] {
        for (class, price) in [
            ("gp2", "0.1000000000"),
            ("gp3", "0.0800000000"),
            ("io1", "0.1250000000"),
            ("io2", "0.1250000000"),
            ("st1", "0.0450000000"),
            ("sc1", "0.0150000000"),
            ("standard", "0.0500000000"),
        ] {
            records.push(raw_record("Storage", class, location, "", price));
        }
        records.push(raw_record("System Operation", "gp3", location, "EBS IOPS", "0.0050000000"));
        records.push(raw_record("Provisioned Throughput", "gp3", location, "", "40.9600000000"));
        records.push(raw_record("System Operation", "io1", location, "EBS IOPS", "0.0650000000"));
        records.push(raw_record("System Operation", "io2", location, "EBS IOPS", "0.0650000000"));
        records.push(raw_record("System Operation", "io2", location, "EBS IOPS Tier 2", "0.0455000000"));
        records.push(raw_record("System Operation", "io2", location, "EBS IOPS Tier 3", "0.0318500000"));
    }
    // data-quality problems that must be skipped
    records.push(raw_record("Storage", "io2-express", US_EAST_1, "", "0.5"));
    records.push(raw_record("Storage", "gp2", "Moon Base (Alpha)", "", "not-a-price"));
    records.push("{ this is not json".to_string());
    records
}

pub fn memory_catalog() -> MemoryCatalog {
    MemoryCatalog::new(catalog_records()).with_page_size(7)
}

pub fn catalog() -> Catalog {
    Catalog::from_source(&memory_catalog()).unwrap()
}

pub fn volume(id: &str, class: VolumeClass, size_gb: u32, location: &str) -> Volume {
    Volume::new(id, VolumeConfig::new(class, size_gb, location))
}

/// Three locations with a mix of volumes
pub fn cloud() -> MemoryCloud {
    let cloud = MemoryCloud::new();
    let volumes = [
        volume("vol-gp2", VolumeClass::Gp2, 2000, "us-east-1"),
        volume("vol-gp3", VolumeClass::Gp3, 100, "us-east-1"),
        Volume::new(
            "vol-io1",
            VolumeConfig::new(VolumeClass::Io1, 500, "us-east-1").with_iops(10000),
        ),
        volume("vol-eu", VolumeClass::Gp2, 100, "eu-west-1"),
        volume("vol-west", VolumeClass::Gp2, 100, "us-west-2"),
    ];
    for v in volumes {
        cloud.add_volume(v).unwrap();
    }
    cloud
}
