//! Run options
//!
//! The plain options value threaded from the entry point through the scheduler
//! into every region worker. Nothing in the crate reads options from global
//! state.

use crate::engine::DecisionPolicy;
use crate::engine::decision::DEFAULT_IO2_LOCATIONS;
use crate::error::Result;
use crate::selection::{LocationFilter, TagFilter};
use crate::types::TagFilteringMode;
use serde::{Deserialize, Serialize};

/// Options for one optimization run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Comma/whitespace-separated location globs; empty enables every location
    pub locations_allow_list: String,
    pub match_iops: bool,
    pub match_throughput: bool,
    /// Log mutating calls instead of issuing them
    pub dry_run: bool,
    /// `key=value[,key=value]`; empty disables tag filtering
    pub tag_filters: String,
    pub tag_filtering_mode: TagFilteringMode,
    /// Locations where io1 volumes may be converted to io2
    pub io2_locations: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            locations_allow_list: String::new(),
            match_iops: false,
            match_throughput: false,
            dry_run: false,
            tag_filters: String::new(),
            tag_filtering_mode: TagFilteringMode::default(),
            io2_locations: DEFAULT_IO2_LOCATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RunOptions {
    pub fn policy(&self) -> DecisionPolicy {
        DecisionPolicy {
            match_iops: self.match_iops,
            match_throughput: self.match_throughput,
            io2_locations: self.io2_locations.clone(),
        }
    }

    pub fn location_filter(&self) -> LocationFilter {
        LocationFilter::parse(&self.locations_allow_list)
    }

    /// Fails on a malformed tag filter
    pub fn tag_filter(&self) -> Result<TagFilter> {
        TagFilter::parse(&self.tag_filters, self.tag_filtering_mode)
    }
}
