use serde::{Deserialize, Serialize};

/// Model insights from the `/insights` endpoint.
///
/// Both members are handed to the chart layer untouched, so they stay as raw JSON.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Insights {
    #[serde(default)]
    pub correlation_matrix: serde_json::Value,

    #[serde(default)]
    pub feature_importance: serde_json::Value,
}

/// Indicator values posted to `/predict`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub struct PredictionRequest {
    pub cei: f64,
    pub gci: f64,
    pub ncsi: f64,
    pub ddl: f64,
}

/// Opaque prediction response.
pub type Prediction = serde_json::Value;
