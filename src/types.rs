//! Type-safe domain enums for the optimizer
//!
//! Volume classes and filtering modes are closed sets, so they are modelled as
//! enums instead of the raw strings the cloud APIs hand back.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Storage class of a block volume, named after its API identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VolumeClass {
    /// Previous-generation magnetic
    Standard,
    /// Legacy general purpose SSD (size-bound baseline performance)
    Gp2,
    /// General purpose SSD with flat pricing and provisionable performance
    Gp3,
    /// Older provisioned IOPS SSD
    Io1,
    /// Newer provisioned IOPS SSD with tiered IOPS pricing
    Io2,
    /// Throughput optimized HDD
    St1,
    /// Cold HDD
    Sc1,
}

impl VolumeClass {
    /// The class general purpose volumes get converted to
    pub const GENERAL_PURPOSE: Self = Self::Gp3;

    /// Returns true for the classes billed per provisioned IOPS
    pub fn is_provisioned_iops(self) -> bool {
        matches!(self, Self::Io1 | Self::Io2)
    }
}

/// How tag filters select the volumes to process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum TagFilteringMode {
    /// Only volumes matching the filter are processed
    #[strum(serialize = "opt-in")]
    #[serde(rename = "opt-in")]
    OptIn,
    /// Volumes matching the filter are left alone
    #[default]
    #[strum(serialize = "opt-out")]
    #[serde(rename = "opt-out")]
    OptOut,
}
