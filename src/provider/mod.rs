//! Cloud collaborator contracts.
//!
//! The optimizer never talks to a cloud API directly. Everything it needs goes
//! through three narrow traits so the decision, backup and scheduling logic can
//! run against any backend.
//!
//! # Contract
//!
//! - `CloudProvider`: lists locations and opens a per-location client.
//! - `LocationClient`: lists, modifies and tags the volumes of one location.
//! - `PriceCatalogSource`: answers filtered, paginated price queries.
//!
//! # Invariants
//!
//! - Implementations do not retry; a failed call surfaces as an error and the
//!   caller decides how far the failure reaches.
//! - `CloudProvider` is shared by every region worker, so it must be `Sync`.
//!   A `LocationClient` is used by exactly one worker.

pub mod memory;
pub mod snapshot;

use crate::error::Result;
use crate::volume::{Volume, VolumeConfig};
use serde::{Deserialize, Serialize};

/// Service code the catalog is queried for
pub const SERVICE_CODE: &str = "AmazonEC2";

/// Entry point to a cloud account.
pub trait CloudProvider: Sync {
    /// List every location the account can use.
    fn list_locations(&self) -> Result<Vec<String>>;

    /// Open a client scoped to one location.
    fn connect(&self, location: &str) -> Result<Box<dyn LocationClient + '_>>;
}

/// Volume operations within one location.
pub trait LocationClient {
    /// Location this client is bound to.
    fn location(&self) -> &str;

    /// List all volumes in the location, in a stable order.
    fn list_volumes(&self) -> Result<Vec<Volume>>;

    /// Change the class and provisioned performance of a volume.
    ///
    /// Only `class`, `iops` and `throughput` of `target` are applied.
    fn modify_volume(&self, volume_id: &str, target: &VolumeConfig) -> Result<()>;

    /// Create or overwrite one tag on a volume.
    fn create_tag(&self, volume_id: &str, key: &str, value: &str) -> Result<()>;
}

/// An exact-match catalog filter (`TERM_MATCH` on one field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    pub field: String,
    pub value: String,
}

impl CatalogFilter {
    pub fn term_match(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// One page of raw catalog records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    /// Raw JSON documents, one per record, keys not yet normalized
    pub price_list: Vec<String>,
    /// Token for the next page; `None` on the last page
    pub next_token: Option<String>,
}

/// Paginated access to the price catalog.
pub trait PriceCatalogSource {
    /// Fetch one page of records matching all `filters`.
    fn get_products(
        &self,
        service_code: &str,
        filters: &[CatalogFilter],
        next_token: Option<&str>,
    ) -> Result<CatalogPage>;
}
