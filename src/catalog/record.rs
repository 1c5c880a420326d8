//! Raw price catalog records
//!
//! The catalog nests the interesting price under object keys that are opaque
//! offer identifiers, e.g.
//!
//! ```text
//! "terms": { "OnDemand": { "7U4BYD2ABJ4NZRNM.JRTCKXETXF": {
//!     "priceDimensions": { "7U4BYD2ABJ4NZRNM.JRTCKXETXF.6YS6EN2CT7": { ... } } } } }
//! ```
//!
//! Those keys are rewritten to `"Dimension"` and `"SKU"` before decoding so the
//! record maps onto a fixed structure.

use crate::catalog::location::location_code;
use crate::error::{OptimizerError, Result};
use crate::provider::CatalogFilter;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// Canonical key for a price dimension identifier (`SKU.OFFER.RATE`)
pub const DIMENSION_KEY: &str = "\"Dimension\"";

/// Canonical key for an offer term identifier (`SKU.OFFER`)
pub const SKU_KEY: &str = "\"SKU\"";

fn dimension_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""\w{16,}\.\w{10,}\.\w{10,}""#).expect("dimension pattern is a valid regex")
    })
}

fn sku_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""\w{16,}\.\w{10,}""#).expect("sku pattern is a valid regex")
    })
}

/// Rewrite opaque identifier keys to their canonical names.
///
/// Dimensions are rewritten first: the offer pattern would otherwise match
/// the first two segments of a dimension identifier.
pub fn normalize_keys(raw: &str) -> String {
    let with_dimension = dimension_pattern().replace_all(raw, DIMENSION_KEY);
    sku_pattern().replace_all(&with_dimension, SKU_KEY).into_owned()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAttributes {
    #[serde(default)]
    pub volume_api_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub group: String,
    #[serde(default, rename = "usagetype")]
    pub usage_type: String,
    #[serde(default)]
    pub storage_media: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub product_family: String,
    #[serde(default)]
    pub attributes: ProductAttributes,
    #[serde(default)]
    pub sku: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricePerUnit {
    #[serde(rename = "USD")]
    pub usd: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDimension {
    pub price_per_unit: PricePerUnit,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub begin_range: String,
    #[serde(default)]
    pub end_range: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceDimensions {
    #[serde(rename = "Dimension")]
    pub dimension: PriceDimension,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferTerm {
    pub price_dimensions: PriceDimensions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OnDemand {
    #[serde(rename = "SKU")]
    pub sku: OfferTerm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Terms {
    #[serde(rename = "OnDemand")]
    pub on_demand: OnDemand,
}

/// One decoded catalog record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    #[serde(default)]
    pub product: Product,
    #[serde(default)]
    pub service_code: String,
    pub terms: Terms,
}

impl PriceRecord {
    /// Normalize and decode a raw catalog record.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = normalize_keys(raw);
        serde_json::from_str(&normalized)
            .map_err(|e| OptimizerError::catalog(format!("malformed price record: {}", e)))
    }

    /// API name of the volume class the record prices
    pub fn volume_api_name(&self) -> &str {
        &self.product.attributes.volume_api_name
    }

    /// Location code of the record
    pub fn location(&self) -> String {
        location_code(&self.product.attributes.location).to_string()
    }

    pub fn group(&self) -> &str {
        &self.product.attributes.group
    }

    /// On-demand USD price per unit
    pub fn usd_price(&self) -> Result<f64> {
        let raw = &self.terms.on_demand.sku.price_dimensions.dimension.price_per_unit.usd;
        raw.trim()
            .parse::<f64>()
            .map_err(|_| OptimizerError::catalog(format!("failed to convert {:?} to a price", raw)))
    }

    /// Value of a filterable field, by catalog field name
    pub fn field(&self, name: &str) -> Option<&str> {
        let attributes = &self.product.attributes;
        let value = match name {
            "ServiceCode" | "serviceCode" => &self.service_code,
            "productFamily" => &self.product.product_family,
            "volumeApiName" => &attributes.volume_api_name,
            "location" => &attributes.location,
            "group" => &attributes.group,
            "usagetype" => &attributes.usage_type,
            "storageMedia" => &attributes.storage_media,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Returns true if the record satisfies every term-match filter
    pub fn matches(&self, filters: &[CatalogFilter]) -> bool {
        filters
            .iter()
            .all(|f| self.field(&f.field).is_some_and(|v| v == f.value))
    }
}
