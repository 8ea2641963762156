//! Minimal GeoJSON shapes for the country-polygon file.
//!
//! Only `properties.name` is interpreted. Geometry is carried through as raw
//! JSON for the renderer.

use serde::{Deserialize, Serialize};

/// A GeoJSON `FeatureCollection`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// One country polygon.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Feature {
    #[serde(default)]
    pub properties: FeatureProperties,

    #[serde(default)]
    pub geometry: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FeatureProperties {
    /// Free-text country name used for reconciliation.
    #[serde(default)]
    pub name: Option<String>,

    /// Anything else the provider ships (ISO codes, population, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
