//! Pricing of configurations and savings against the fixture catalog

mod common;

use common::{catalog, volume};
use ebs_optimizer::backup::ConfigSnapshot;
use ebs_optimizer::pricing::{HOURS_PER_MONTH, hourly_price, monthly_price, monthly_savings};
use ebs_optimizer::{INITIAL_CONFIGURATION_TAG, Volume, VolumeClass, VolumeConfig};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_gp2_storage_only() {
    let config = VolumeConfig::new(VolumeClass::Gp2, 100, "us-east-1");
    assert!(close(monthly_price(&config, &catalog()), 10.0));
}

#[test]
fn test_gp3_free_allowance() {
    let catalog = catalog();
    let base = VolumeConfig::new(VolumeClass::Gp3, 100, "us-east-1");
    let at_allowance = base.clone().with_iops(3000).with_throughput(125);
    assert!(close(monthly_price(&base, &catalog), 8.0));
    assert!(close(monthly_price(&at_allowance, &catalog), 8.0));
}

#[test]
fn test_gp3_provisioned_performance() {
    let config = VolumeConfig::new(VolumeClass::Gp3, 100, "us-east-1")
        .with_iops(4000)
        .with_throughput(250);
    // 8 storage + 1000 * 0.005 iops + 125 * 0.04 throughput
    assert!(close(monthly_price(&config, &catalog()), 8.0 + 5.0 + 5.0));
}

#[test]
fn test_io2_crosses_tiers() {
    let config = VolumeConfig::new(VolumeClass::Io2, 100, "us-east-1").with_iops(40000);
    let expected = 12.5 + 32000.0 * 0.065 + 8000.0 * 0.0455;
    assert!(close(monthly_price(&config, &catalog()), expected));
}

#[test]
fn test_unknown_location_prices_zero() {
    let config = VolumeConfig::new(VolumeClass::Gp2, 100, "us-west-2");
    assert_eq!(monthly_price(&config, &catalog()), 0.0);
}

#[test]
fn test_hourly_is_monthly_over_730() {
    let catalog = catalog();
    let config = VolumeConfig::new(VolumeClass::Gp2, 730, "us-east-1");
    assert!(close(hourly_price(&config, &catalog), 73.0 / HOURS_PER_MONTH));
}

fn optimized(initial: VolumeConfig, current: VolumeConfig) -> Volume {
    let payload = ConfigSnapshot::from_config(&initial).encode().unwrap();
    Volume::new("vol-1", current).with_tag(INITIAL_CONFIGURATION_TAG, payload)
}

#[test]
fn test_savings_from_initial_configuration() {
    let volume = optimized(
        VolumeConfig::new(VolumeClass::Gp2, 100, "us-east-1"),
        VolumeConfig::new(VolumeClass::Gp3, 100, "us-east-1"),
    );
    assert!(close(monthly_savings(&volume, &catalog()), 2.0));
}

#[test]
fn test_savings_zero_without_initial_tag() {
    let volume = volume("vol-1", VolumeClass::Gp2, 100, "us-east-1");
    assert_eq!(monthly_savings(&volume, &catalog()), 0.0);
}

#[test]
fn test_savings_clamped_when_more_expensive() {
    let volume = optimized(
        VolumeConfig::new(VolumeClass::Gp3, 100, "us-east-1"),
        VolumeConfig::new(VolumeClass::Gp3, 100, "us-east-1").with_iops(10000),
    );
    assert_eq!(monthly_savings(&volume, &catalog()), 0.0);
}

#[test]
fn test_savings_ignore_unreadable_initial_tag() {
    let volume = volume("vol-1", VolumeClass::Gp3, 100, "us-east-1")
        .with_tag(INITIAL_CONFIGURATION_TAG, "not json");
    assert_eq!(monthly_savings(&volume, &catalog()), 0.0);
}
