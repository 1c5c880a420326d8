//! In-memory cloud backend
//!
//! Keeps locations, volumes and catalog records in process memory. Used by the
//! snapshot-driven CLI and by the tests; it records every mutating call so a
//! dry run can be checked for silence.

use crate::catalog::PriceRecord;
use crate::error::{OptimizerError, Result};
use crate::provider::{
    CatalogFilter, CatalogPage, CloudProvider, LocationClient, PriceCatalogSource,
};
use crate::volume::{Volume, VolumeConfig};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

/// A mutating call issued against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ModifyVolume {
        location: String,
        volume_id: String,
        target: VolumeConfig,
    },
    CreateTag {
        location: String,
        volume_id: String,
        key: String,
        value: String,
    },
}

#[derive(Debug, Default)]
struct LocationState {
    volumes: Vec<Volume>,
    connect_error: Option<String>,
    scan_error: Option<String>,
    rejected: BTreeSet<String>,
    rejected_tags: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct CloudState {
    locations: BTreeMap<String, LocationState>,
    calls: Vec<ApiCall>,
}

/// A cloud account held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryCloud {
    state: Mutex<CloudState>,
}

impl MemoryCloud {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, CloudState>> {
        self.state
            .lock()
            .map_err(|_| OptimizerError::provider("cloud state lock poisoned"))
    }

    /// Register an empty location
    pub fn add_location(&self, location: &str) -> Result<()> {
        self.lock()?.locations.entry(location.to_string()).or_default();
        Ok(())
    }

    /// Add a volume to the location named in its configuration
    pub fn add_volume(&self, volume: Volume) -> Result<()> {
        let mut state = self.lock()?;
        state
            .locations
            .entry(volume.location().to_string())
            .or_default()
            .volumes
            .push(volume);
        Ok(())
    }

    /// Make `connect` fail for `location`
    pub fn fail_connect(&self, location: &str, message: &str) -> Result<()> {
        self.lock()?
            .locations
            .entry(location.to_string())
            .or_default()
            .connect_error = Some(message.to_string());
        Ok(())
    }

    /// Make `list_volumes` fail for `location`
    pub fn fail_scan(&self, location: &str, message: &str) -> Result<()> {
        self.lock()?
            .locations
            .entry(location.to_string())
            .or_default()
            .scan_error = Some(message.to_string());
        Ok(())
    }

    /// Make `modify_volume` fail for one volume
    pub fn reject_modify(&self, location: &str, volume_id: &str) -> Result<()> {
        self.lock()?
            .locations
            .entry(location.to_string())
            .or_default()
            .rejected
            .insert(volume_id.to_string());
        Ok(())
    }

    /// Make `create_tag` fail for one volume
    pub fn reject_tag(&self, location: &str, volume_id: &str) -> Result<()> {
        self.lock()?
            .locations
            .entry(location.to_string())
            .or_default()
            .rejected_tags
            .insert(volume_id.to_string());
        Ok(())
    }

    /// Every mutating call received so far, in order
    pub fn calls(&self) -> Result<Vec<ApiCall>> {
        Ok(self.lock()?.calls.clone())
    }

    /// Current state of one volume
    pub fn volume(&self, location: &str, volume_id: &str) -> Result<Option<Volume>> {
        Ok(self
            .lock()?
            .locations
            .get(location)
            .and_then(|loc| loc.volumes.iter().find(|v| v.id == volume_id))
            .cloned())
    }

    /// Current state of every volume, keyed by location
    pub fn volumes(&self) -> Result<BTreeMap<String, Vec<Volume>>> {
        Ok(self
            .lock()?
            .locations
            .iter()
            .map(|(name, loc)| (name.clone(), loc.volumes.clone()))
            .collect())
    }

    fn with_volume<F>(&self, location: &str, volume_id: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Volume),
    {
        let mut state = self.lock()?;
        let volume = state
            .locations
            .get_mut(location)
            .and_then(|loc| loc.volumes.iter_mut().find(|v| v.id == volume_id))
            .ok_or_else(|| {
                OptimizerError::provider(format!("volume {} not found in {}", volume_id, location))
            })?;
        f(volume);
        Ok(())
    }
}

impl CloudProvider for MemoryCloud {
    fn list_locations(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.locations.keys().cloned().collect())
    }

    fn connect(&self, location: &str) -> Result<Box<dyn LocationClient + '_>> {
        let state = self.lock()?;
        let loc = state
            .locations
            .get(location)
            .ok_or_else(|| OptimizerError::provider(format!("unknown location {}", location)))?;
        if let Some(message) = &loc.connect_error {
            return Err(OptimizerError::provider(format!(
                "failed to connect to {}: {}",
                location, message
            )));
        }
        Ok(Box::new(MemoryLocationClient {
            cloud: self,
            location: location.to_string(),
        }))
    }
}

/// Client bound to one location of a [`MemoryCloud`].
pub struct MemoryLocationClient<'a> {
    cloud: &'a MemoryCloud,
    location: String,
}

impl LocationClient for MemoryLocationClient<'_> {
    fn location(&self) -> &str {
        &self.location
    }

    fn list_volumes(&self) -> Result<Vec<Volume>> {
        let state = self.cloud.lock()?;
        let Some(loc) = state.locations.get(&self.location) else {
            return Ok(Vec::new());
        };
        if let Some(message) = &loc.scan_error {
            return Err(OptimizerError::provider(format!(
                "failed to list volumes in {}: {}",
                self.location, message
            )));
        }
        Ok(loc.volumes.clone())
    }

    fn modify_volume(&self, volume_id: &str, target: &VolumeConfig) -> Result<()> {
        {
            let mut state = self.cloud.lock()?;
            state.calls.push(ApiCall::ModifyVolume {
                location: self.location.clone(),
                volume_id: volume_id.to_string(),
                target: target.clone(),
            });
            let rejected = state
                .locations
                .get(&self.location)
                .is_some_and(|loc| loc.rejected.contains(volume_id));
            if rejected {
                return Err(OptimizerError::provider(format!(
                    "modification of {} rejected",
                    volume_id
                )));
            }
        }
        self.cloud
            .with_volume(&self.location, volume_id, |volume| volume.config.apply(target))
    }

    fn create_tag(&self, volume_id: &str, key: &str, value: &str) -> Result<()> {
        {
            let mut state = self.cloud.lock()?;
            state.calls.push(ApiCall::CreateTag {
                location: self.location.clone(),
                volume_id: volume_id.to_string(),
                key: key.to_string(),
                value: value.to_string(),
            });
            let rejected = state
                .locations
                .get(&self.location)
                .is_some_and(|loc| loc.rejected_tags.contains(volume_id));
            if rejected {
                return Err(OptimizerError::provider(format!(
                    "tagging of {} rejected",
                    volume_id
                )));
            }
        }
        self.cloud.with_volume(&self.location, volume_id, |volume| {
            volume.tags.insert(key.to_string(), value.to_string());
        })
    }
}

/// Raw catalog records served with term-match filtering and pagination.
#[derive(Debug, Clone)]
pub struct MemoryCatalog {
    records: Vec<String>,
    page_size: usize,
    unavailable: bool,
}

impl MemoryCatalog {
    pub fn new(records: Vec<String>) -> Self {
        Self {
            records,
            page_size: 100,
            unavailable: false,
        }
    }

    /// A catalog whose every request fails
    pub fn unavailable() -> Self {
        Self {
            records: Vec::new(),
            page_size: 100,
            unavailable: true,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Records that cannot be decoded are served unfiltered, the same way a
    /// remote catalog hands back whatever it has.
    fn selected(&self, filters: &[CatalogFilter]) -> Vec<&String> {
        self.records
            .iter()
            .filter(|raw| match PriceRecord::parse(raw) {
                Ok(record) => record.matches(filters),
                Err(_) => true,
            })
            .collect()
    }
}

impl PriceCatalogSource for MemoryCatalog {
    fn get_products(
        &self,
        service_code: &str,
        filters: &[CatalogFilter],
        next_token: Option<&str>,
    ) -> Result<CatalogPage> {
        if self.unavailable {
            return Err(OptimizerError::provider(format!(
                "price catalog for {} is unavailable",
                service_code
            )));
        }

        let start = match next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| OptimizerError::provider(format!("invalid page token {:?}", token)))?,
            None => 0,
        };

        let selected = self.selected(filters);
        let end = (start + self.page_size).min(selected.len());
        let price_list = selected
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|raw| (*raw).clone())
            .collect();
        let next_token = (end < selected.len()).then(|| end.to_string());

        Ok(CatalogPage {
            price_list,
            next_token,
        })
    }
}
