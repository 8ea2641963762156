//! Error types for the library layer.

use std::fmt;

use crate::country_alias::AliasTableError;

/// Errors produced by the library layer, wrapping upstream API errors
/// and adding serialization, configuration, and input validation failures.
///
/// None of the core operations (filter, aggregate, reconcile) return this
/// type. It only appears at the loading and input-validation edges.
#[derive(Debug)]
pub enum CyberRiskError {
    /// An error from the underlying API client.
    Api(cyberrisk_api::Error),
    /// JSON serialization or deserialization failed.
    Serialization(serde_json::Error),
    /// The country alias table could not be loaded.
    Aliases(AliasTableError),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl fmt::Display for CyberRiskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::Aliases(e) => write!(f, "Alias table error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for CyberRiskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Serialization(e) => Some(e),
            Self::Aliases(e) => Some(e),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<cyberrisk_api::Error> for CyberRiskError {
    fn from(e: cyberrisk_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<serde_json::Error> for CyberRiskError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}

impl From<AliasTableError> for CyberRiskError {
    fn from(e: AliasTableError) -> Self {
        Self::Aliases(e)
    }
}
