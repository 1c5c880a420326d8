//! Property-Based Tests for the optimizer
//!
//! These tests verify:
//! - Enum string round-trips (parse → to_string → parse)
//! - Decision invariants (idempotence, classes the rules never produce)
//! - Pricing invariants (monotonic in size, IOPS and throughput, non-negative savings)
//! - Location and tag selection

use proptest::prelude::*;
use std::collections::BTreeMap;

use ebs_optimizer::backup::ConfigSnapshot;
use ebs_optimizer::pricing::{banded_cost, monthly_price, monthly_savings};
use ebs_optimizer::selection::glob_match;
use ebs_optimizer::{
    Catalog, DecisionPolicy, INITIAL_CONFIGURATION_TAG, LocationFilter, PriceBand, TagFilter,
    TagFilteringMode, Volume, VolumeClass, VolumeConfig, decide,
};

// =============================================================================
// Strategies
// =============================================================================

fn class_strategy() -> impl Strategy<Value = VolumeClass> {
    prop_oneof![
        Just(VolumeClass::Standard),
        Just(VolumeClass::Gp2),
        Just(VolumeClass::Gp3),
        Just(VolumeClass::Io1),
        Just(VolumeClass::Io2),
        Just(VolumeClass::St1),
        Just(VolumeClass::Sc1),
    ]
}

fn location_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("us-east-1".to_string()),
        Just("eu-west-1".to_string()),
        Just("sa-east-1".to_string()),
        Just("af-south-1".to_string()),
    ]
}

fn config_strategy() -> impl Strategy<Value = VolumeConfig> {
    (
        class_strategy(),
        1u32..20000,
        0u32..100000,
        0u32..2000,
        location_strategy(),
    )
        .prop_map(|(class, size, iops, throughput, location)| {
            VolumeConfig::new(class, size, location)
                .with_iops(iops)
                .with_throughput(throughput)
        })
}

fn policy_strategy() -> impl Strategy<Value = DecisionPolicy> {
    (any::<bool>(), any::<bool>()).prop_map(|(match_iops, match_throughput)| DecisionPolicy {
        match_iops,
        match_throughput,
        ..DecisionPolicy::default()
    })
}

fn tiered_catalog() -> Catalog {
    let mut catalog = Catalog::builtin();
    for location in ["us-east-1", "eu-west-1", "sa-east-1", "af-south-1"] {
        for (class, price) in [
            (VolumeClass::Gp2, 0.10),
            (VolumeClass::Gp3, 0.08),
            (VolumeClass::Io1, 0.125),
            (VolumeClass::Io2, 0.125),
        ] {
            catalog.set_price_per_gb(class, location, price);
        }
        catalog.add_iops_band(VolumeClass::Gp3, location, PriceBand::new(3000, 16000, 0.005));
        catalog.add_throughput_band(VolumeClass::Gp3, location, PriceBand::new(125, 1000, 0.04));
        catalog.add_iops_band(VolumeClass::Io1, location, PriceBand::new(0, 64000, 0.065));
        catalog.add_iops_band(VolumeClass::Io2, location, PriceBand::new(0, 32000, 0.065));
        catalog.add_iops_band(VolumeClass::Io2, location, PriceBand::new(32000, 64000, 0.0455));
        catalog.add_iops_band(VolumeClass::Io2, location, PriceBand::new(64000, 256000, 0.03185));
    }
    catalog
}

// =============================================================================
// VolumeClass / TagFilteringMode Enum Property Tests
// =============================================================================

proptest! {
    /// VolumeClass: to_string → parse round-trip is identity
    #[test]
    fn volume_class_roundtrip(class in class_strategy()) {
        let s = class.to_string();
        let parsed: VolumeClass = s.parse().expect("Should parse");
        prop_assert_eq!(class, parsed);
    }

    /// VolumeClass: Display output matches the serde name
    #[test]
    fn volume_class_display_matches_serde(class in class_strategy()) {
        let json = serde_json::to_string(&class).unwrap();
        prop_assert_eq!(json, format!("\"{}\"", class));
    }

    /// TagFilteringMode: parse accepts only the two hyphenated names
    #[test]
    fn tag_filtering_mode_rejects_garbage(s in "[a-z]{1,10}") {
        prop_assert!(s.parse::<TagFilteringMode>().is_err());
    }
}

// =============================================================================
// Decision Property Tests
// =============================================================================

proptest! {
    /// Deciding twice gives the same target as deciding once
    #[test]
    fn decide_is_idempotent(config in config_strategy(), policy in policy_strategy()) {
        let once = decide(&config, &policy);
        let twice = decide(&once, &policy);
        prop_assert_eq!(once, twice);
    }

    /// Size and location are never changed by a decision
    #[test]
    fn decide_keeps_size_and_location(config in config_strategy(), policy in policy_strategy()) {
        let target = decide(&config, &policy);
        prop_assert_eq!(target.size_gb, config.size_gb);
        prop_assert_eq!(target.location, config.location);
    }

    /// No rule ever targets gp2, and io1 only stays where io2 is unavailable
    #[test]
    fn decide_never_targets_legacy_classes(config in config_strategy(), policy in policy_strategy()) {
        let target = decide(&config, &policy);
        prop_assert_ne!(target.class, VolumeClass::Gp2);
        if target.class == VolumeClass::Io1 {
            prop_assert!(!policy.supports_io2(&config.location));
        }
    }

    /// gp3 targets stay within gp3 limits when converted from gp2
    #[test]
    fn gp2_targets_within_gp3_limits(size in 1u32..100000, policy in policy_strategy()) {
        let config = VolumeConfig::new(VolumeClass::Gp2, size, "us-east-1");
        let target = decide(&config, &policy);
        prop_assert_eq!(target.class, VolumeClass::Gp3);
        prop_assert!(target.iops <= 16000);
        prop_assert!(target.throughput <= 1000);
    }
}

// =============================================================================
// Pricing Property Tests
// =============================================================================

proptest! {
    /// Banded cost never decreases as the quantity grows
    #[test]
    fn banded_cost_is_monotonic(a in 0u32..300000, b in 0u32..300000) {
        let bands = [
            PriceBand::new(0, 32000, 0.065),
            PriceBand::new(32000, 64000, 0.0455),
            PriceBand::new(64000, 256000, 0.03185),
        ];
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(banded_cost(&bands, low) <= banded_cost(&bands, high));
    }

    /// Bands with a gap between them still never decrease in cost
    #[test]
    fn gapped_banded_cost_is_monotonic(a in 0u32..100000, b in 0u32..100000) {
        let bands = [PriceBand::new(0, 32000, 0.065), PriceBand::new(32001, 64000, 0.0455)];
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(banded_cost(&bands, low) <= banded_cost(&bands, high));
    }

    /// Price never decreases as the size grows
    #[test]
    fn monthly_price_monotonic_in_size(config in config_strategy(), extra in 0u32..20000) {
        let catalog = tiered_catalog();
        let mut larger = config.clone();
        larger.size_gb = config.size_gb + extra;
        prop_assert!(monthly_price(&config, &catalog) <= monthly_price(&larger, &catalog));
    }

    /// Price never decreases as provisioned IOPS grow
    #[test]
    fn monthly_price_monotonic_in_iops(config in config_strategy(), extra in 0u32..300000) {
        let catalog = tiered_catalog();
        let mut larger = config.clone();
        larger.iops = config.iops + extra;
        prop_assert!(monthly_price(&config, &catalog) <= monthly_price(&larger, &catalog));
    }

    /// Price never decreases as provisioned throughput grows
    #[test]
    fn monthly_price_monotonic_in_throughput(config in config_strategy(), extra in 0u32..2000) {
        let catalog = tiered_catalog();
        let mut larger = config.clone();
        larger.throughput = config.throughput + extra;
        prop_assert!(monthly_price(&config, &catalog) <= monthly_price(&larger, &catalog));
    }

    /// Prices are never negative
    #[test]
    fn monthly_price_non_negative(config in config_strategy()) {
        prop_assert!(monthly_price(&config, &tiered_catalog()) >= 0.0);
    }

    /// Savings are never negative, whatever happened to the volume
    #[test]
    fn savings_non_negative(initial in config_strategy(), current in config_strategy()) {
        let mut current = current;
        current.location = initial.location.clone();
        current.size_gb = initial.size_gb;
        let payload = ConfigSnapshot::from_config(&initial).encode().unwrap();
        let volume = Volume::new("vol-1", current).with_tag(INITIAL_CONFIGURATION_TAG, payload);
        prop_assert!(monthly_savings(&volume, &tiered_catalog()) >= 0.0);
    }

    /// Converting a gp2 volume at the free baseline never costs more
    #[test]
    fn gp2_conversion_never_costs_more(size in 1u32..16000) {
        let catalog = tiered_catalog();
        let config = VolumeConfig::new(VolumeClass::Gp2, size, "us-east-1");
        let target = decide(&config, &DecisionPolicy::default());
        prop_assert!(monthly_price(&target, &catalog) <= monthly_price(&config, &catalog));
    }
}

// =============================================================================
// Selection Property Tests
// =============================================================================

proptest! {
    /// A literal pattern matches itself
    #[test]
    fn glob_literal_matches_itself(s in "[a-z0-9-]{0,20}") {
        prop_assert!(glob_match(&s, &s));
    }

    /// `*` matches anything
    #[test]
    fn glob_star_matches_all(s in "[a-z0-9-]{0,20}") {
        prop_assert!(glob_match("*", &s));
    }

    /// A prefix followed by `*` matches every extension of the prefix
    #[test]
    fn glob_prefix_star(prefix in "[a-z]{1,5}", rest in "[a-z0-9-]{0,10}") {
        let pattern = format!("{}*", prefix);
        let value = format!("{}{}", prefix, rest);
        prop_assert!(glob_match(&pattern, &value));
    }

    /// An empty allow-list enables every location
    #[test]
    fn empty_allow_list_enables_all(location in "[a-z]{2}-[a-z]{4,9}-[1-3]") {
        prop_assert!(LocationFilter::parse("").is_enabled(&location));
        prop_assert!(LocationFilter::parse(" , ").is_enabled(&location));
    }

    /// Opt-in and opt-out select complementary sets
    #[test]
    fn tag_modes_are_complementary(value in "[a-z]{1,5}") {
        let mut tags = BTreeMap::new();
        tags.insert("env".to_string(), value);
        let opt_in = TagFilter::parse("env=prod", TagFilteringMode::OptIn).unwrap();
        let opt_out = TagFilter::parse("env=prod", TagFilteringMode::OptOut).unwrap();
        prop_assert_ne!(opt_in.is_selected(&tags), opt_out.is_selected(&tags));
    }
}
