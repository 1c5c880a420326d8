//! Decision Engine
//!
//! Maps a volume's current configuration to the configuration it should be
//! moved to. Returning the input unchanged means "leave the volume alone".
//!
//! # Rules
//!
//! Evaluated in this order; a later rule overwrites what an earlier one set.
//!
//! | # | Applies to                          | Target                                  |
//! |---|-------------------------------------|-----------------------------------------|
//! | 1 | everything                          | current configuration                   |
//! | 2 | gp2                                 | gp3, optionally matching gp2 IOPS/burst |
//! | 3 | io1 in an io2 location              | io2, performance carried over           |
//! | 4 | io1/io2 below the gp3 IOPS ceiling  | gp3, IOPS and throughput carried over   |
//!
//! An io1 volume that qualifies for both rule 3 and rule 4 ends up on gp3.
//!
//! # Design
//!
//! - **Pure logic**: no I/O and no global state; the policy is a parameter
//! - **Total**: every input yields a target
//! - **Explainable**: `evaluate` reports which rules fired

use crate::catalog::limits;
use crate::types::VolumeClass;
use crate::volume::VolumeConfig;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// gp2 volumes larger than this get IOPS matching their gp2 baseline
pub const MATCH_IOPS_MIN_SIZE_GB: u32 = 1000;

/// gp2 volumes larger than this get throughput matching the gp2 burst
pub const MATCH_THROUGHPUT_MIN_SIZE_GB: u32 = 170;

/// Locations where io2 was available when io1 conversion was introduced
pub const DEFAULT_IO2_LOCATIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ca-central-1",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    "eu-north-1",
    "ap-east-1",
    "ap-south-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "ap-northeast-2",
    "me-south-1",
];

/// Knobs that change what the rules decide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    /// Give large gp2 volumes provisioned IOPS equal to their gp2 baseline
    pub match_iops: bool,
    /// Give gp2 volumes provisioned throughput equal to the gp2 burst
    pub match_throughput: bool,
    /// Locations where io1 may be converted to io2
    pub io2_locations: Vec<String>,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            match_iops: false,
            match_throughput: false,
            io2_locations: DEFAULT_IO2_LOCATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DecisionPolicy {
    pub fn supports_io2(&self, location: &str) -> bool {
        self.io2_locations.iter().any(|l| l == location)
    }
}

/// A rule that changed the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Rule {
    #[strum(serialize = "gp2 to gp3")]
    LegacyGeneralPurpose,
    #[strum(serialize = "io1 to io2")]
    ProvisionedIopsUpgrade,
    #[strum(serialize = "provisioned IOPS to gp3")]
    ProvisionedIopsToGeneralPurpose,
}

/// Result of evaluating the rules for one configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub target: VolumeConfig,
    /// Rules that fired, in evaluation order
    pub rules: Vec<Rule>,
}

impl Decision {
    /// Returns true if the target differs from `current`
    pub fn changes(&self, current: &VolumeConfig) -> bool {
        self.target != *current
    }
}

/// Target configuration for `current`
pub fn decide(current: &VolumeConfig, policy: &DecisionPolicy) -> VolumeConfig {
    evaluate(current, policy).target
}

/// Evaluate every rule against `current`, recording the ones that fired
pub fn evaluate(current: &VolumeConfig, policy: &DecisionPolicy) -> Decision {
    let mut target = current.clone();
    let mut rules = Vec::new();

    if current.class == VolumeClass::Gp2 {
        target = legacy_general_purpose_target(current, policy);
        rules.push(Rule::LegacyGeneralPurpose);
    }

    if current.class == VolumeClass::Io1 && policy.supports_io2(&current.location) {
        target.class = VolumeClass::Io2;
        rules.push(Rule::ProvisionedIopsUpgrade);
    }

    let gp3_max_iops = limits(VolumeClass::Gp3).max_iops;
    if current.class.is_provisioned_iops() && current.iops < gp3_max_iops {
        target.class = VolumeClass::Gp3;
        target.iops = current.iops;
        target.throughput = current.throughput;
        rules.push(Rule::ProvisionedIopsToGeneralPurpose);
    }

    tracing::debug!(
        "Decision for {}: {} via {:?}",
        current,
        target,
        rules
    );
    Decision { target, rules }
}

/// gp2 performance is an entitlement of the volume size, not a purchase, so
/// the gp3 target starts from the free baseline.
fn legacy_general_purpose_target(current: &VolumeConfig, policy: &DecisionPolicy) -> VolumeConfig {
    let gp2 = limits(VolumeClass::Gp2);
    let gp3 = limits(VolumeClass::Gp3);
    let mut target = VolumeConfig::new(
        VolumeClass::GENERAL_PURPOSE,
        current.size_gb,
        current.location.clone(),
    );

    if policy.match_iops && current.size_gb > MATCH_IOPS_MIN_SIZE_GB {
        target.iops = current
            .size_gb
            .saturating_mul(gp2.baseline_iops_per_gb)
            .min(gp3.max_iops);
    }
    if policy.match_throughput && current.size_gb > MATCH_THROUGHPUT_MIN_SIZE_GB {
        target.throughput = gp2.max_throughput;
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both_flags() -> DecisionPolicy {
        DecisionPolicy {
            match_iops: true,
            match_throughput: true,
            ..DecisionPolicy::default()
        }
    }

    // ========================================================================
    // gp2
    // ========================================================================

    #[test]
    fn test_gp2_large_volume_matches_both() {
        let current = VolumeConfig::new(VolumeClass::Gp2, 2000, "us-east-1");
        let target = decide(&current, &both_flags());
        assert_eq!(target.class, VolumeClass::Gp3);
        assert_eq!(target.iops, 6000);
        assert_eq!(target.throughput, 250);
        assert_eq!(target.size_gb, 2000);
    }

    #[test]
    fn test_gp2_without_flags_uses_free_baseline() {
        let current = VolumeConfig::new(VolumeClass::Gp2, 2000, "us-east-1").with_iops(6000);
        let target = decide(&current, &DecisionPolicy::default());
        assert_eq!(target, VolumeConfig::new(VolumeClass::Gp3, 2000, "us-east-1"));
    }

    #[test]
    fn test_gp2_size_thresholds_are_exclusive() {
        let policy = both_flags();
        let at_iops_threshold = decide(&VolumeConfig::new(VolumeClass::Gp2, 1000, "x"), &policy);
        assert_eq!(at_iops_threshold.iops, 0);
        assert_eq!(at_iops_threshold.throughput, 250);

        let at_throughput_threshold = decide(&VolumeConfig::new(VolumeClass::Gp2, 170, "x"), &policy);
        assert_eq!(at_throughput_threshold.throughput, 0);

        let above = decide(&VolumeConfig::new(VolumeClass::Gp2, 171, "x"), &policy);
        assert_eq!(above.throughput, 250);
    }

    #[test]
    fn test_gp2_matched_iops_capped_at_gp3_ceiling() {
        let target = decide(&VolumeConfig::new(VolumeClass::Gp2, 16000, "x"), &both_flags());
        assert_eq!(target.iops, 16000);
    }

    // ========================================================================
    // io1 / io2
    // ========================================================================

    #[test]
    fn test_io1_below_gp3_ceiling_cascades_to_gp3() {
        let current = VolumeConfig::new(VolumeClass::Io1, 500, "us-east-1").with_iops(10000);
        let decision = evaluate(&current, &DecisionPolicy::default());
        assert_eq!(decision.target.class, VolumeClass::Gp3);
        assert_eq!(decision.target.iops, 10000);
        assert_eq!(
            decision.rules,
            vec![Rule::ProvisionedIopsUpgrade, Rule::ProvisionedIopsToGeneralPurpose]
        );
    }

    #[test]
    fn test_io1_above_gp3_ceiling_becomes_io2() {
        let current = VolumeConfig::new(VolumeClass::Io1, 500, "eu-west-1").with_iops(20000);
        let target = decide(&current, &DecisionPolicy::default());
        assert_eq!(target.class, VolumeClass::Io2);
        assert_eq!(target.iops, 20000);
    }

    #[test]
    fn test_io1_outside_io2_locations_stays() {
        let current = VolumeConfig::new(VolumeClass::Io1, 500, "sa-east-1").with_iops(20000);
        let decision = evaluate(&current, &DecisionPolicy::default());
        assert!(!decision.changes(&current));
        assert!(decision.rules.is_empty());
    }

    #[test]
    fn test_io2_below_ceiling_carries_throughput() {
        let current = VolumeConfig::new(VolumeClass::Io2, 100, "sa-east-1")
            .with_iops(15999)
            .with_throughput(500);
        let target = decide(&current, &DecisionPolicy::default());
        assert_eq!(target.class, VolumeClass::Gp3);
        assert_eq!(target.iops, 15999);
        assert_eq!(target.throughput, 500);
    }

    #[test]
    fn test_io2_at_ceiling_stays() {
        let current = VolumeConfig::new(VolumeClass::Io2, 100, "us-east-1").with_iops(16000);
        assert_eq!(decide(&current, &DecisionPolicy::default()), current);
    }

    // ========================================================================
    // Other classes
    // ========================================================================

    #[test]
    fn test_other_classes_unchanged() {
        for class in [VolumeClass::Gp3, VolumeClass::St1, VolumeClass::Sc1, VolumeClass::Standard] {
            let current = VolumeConfig::new(class, 500, "us-east-1").with_iops(100);
            let decision = evaluate(&current, &both_flags());
            assert_eq!(decision.target, current);
            assert!(decision.rules.is_empty());
        }
    }

    #[test]
    fn test_custom_io2_locations() {
        let policy = DecisionPolicy {
            io2_locations: vec!["sa-east-1".to_string()],
            ..DecisionPolicy::default()
        };
        assert!(policy.supports_io2("sa-east-1"));
        assert!(!policy.supports_io2("us-east-1"));
    }
}
