use cyberrisk_api::types::PredictionRequest;

use crate::error::CyberRiskError;
use crate::filter::{NumericRange, DISPLAY_MAX, DISPLAY_MIN};
use crate::record::{Dimension, RecordStore, RiskCategory};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_RANK_SIZE: usize = 50;

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a byte-length limit.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, CyberRiskError> {
    if input.len() > max_len {
        return Err(CyberRiskError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(CyberRiskError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

/// Validate a region against the loaded data, case-insensitive.
/// Returns the region as spelled in the data.
pub fn validate_region(input: &str, store: &RecordStore) -> Result<String, CyberRiskError> {
    let wanted = sanitize_text(input, MAX_NAME_LENGTH)?.to_lowercase();
    let regions = store.regions();
    match regions.iter().find(|r| r.to_lowercase() == wanted) {
        Some(r) => Ok(r.to_string()),
        None => Err(CyberRiskError::InvalidInput(format!(
            "unknown region '{}'. Valid values: {}",
            input.trim(),
            regions.join(", ")
        ))),
    }
}

/// Validate a risk category: case-insensitive, supports shorthand l/m/h.
pub fn validate_category(input: &str) -> Result<RiskCategory, CyberRiskError> {
    match input.trim().to_lowercase().as_str() {
        "l" => Ok(RiskCategory::Low),
        "m" => Ok(RiskCategory::Medium),
        "h" => Ok(RiskCategory::High),
        other => RiskCategory::from_label(other).ok_or_else(|| {
            CyberRiskError::InvalidInput(format!(
                "unknown risk category '{}'. Valid values: low (l), medium (m), high (h)",
                input
            ))
        }),
    }
}

/// Validate a country name against the loaded data, case-insensitive.
/// Returns the name as spelled in the data.
pub fn validate_country(input: &str, store: &RecordStore) -> Result<String, CyberRiskError> {
    let name = sanitize_text(input, MAX_NAME_LENGTH)?;
    store
        .find(&name)
        .map(|r| r.name.clone())
        .ok_or_else(|| CyberRiskError::InvalidInput(format!("unknown country '{}'", name)))
}

/// Validate a dimension name.
pub fn validate_dimension(input: &str) -> Result<Dimension, CyberRiskError> {
    match input.trim().to_lowercase().as_str() {
        "cei" => Ok(Dimension::Cei),
        "gci" => Ok(Dimension::Gci),
        "ncsi" => Ok(Dimension::Ncsi),
        "ddl" => Ok(Dimension::Ddl),
        "risk" | "risk_score" | "risk-score" => Ok(Dimension::RiskScore),
        _ => Err(CyberRiskError::InvalidInput(format!(
            "unknown dimension '{}'. Valid values: cei, gci, ncsi, ddl, risk",
            input
        ))),
    }
}

/// Validate range bounds on the 0-100 display scale.
///
/// Non-finite bounds are rejected. Inverted bounds are swapped and values
/// outside the scale are clamped.
pub fn validate_range(min: f64, max: f64) -> Result<NumericRange, CyberRiskError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(CyberRiskError::InvalidInput(
            "range bounds must be finite numbers".to_string(),
        ));
    }
    if min > max {
        tracing::warn!("Range {}:{} is inverted, swapping bounds", min, max);
    }
    Ok(NumericRange::new(min, max))
}

/// Parse a `MIN:MAX` range. Either side may be empty (`50:` is 50 to 100).
pub fn parse_range(input: &str) -> Result<NumericRange, CyberRiskError> {
    let (lo, hi) = input.trim().split_once(':').ok_or_else(|| {
        CyberRiskError::InvalidInput(format!(
            "invalid range '{}'. Expected MIN:MAX, e.g. 40:70",
            input
        ))
    })?;
    let min = parse_bound(lo, DISPLAY_MIN)?;
    let max = parse_bound(hi, DISPLAY_MAX)?;
    validate_range(min, max)
}

fn parse_bound(input: &str, default: f64) -> Result<f64, CyberRiskError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    trimmed.parse::<f64>().map_err(|_| {
        CyberRiskError::InvalidInput(format!("range bound '{}' is not a number", trimmed))
    })
}

/// Validate indicator values for a prediction request. Each must be finite
/// and inside its natural range (CEI 0-1, GCI and NCSI 0-100, DDL 0-10).
pub fn validate_indicators(
    cei: f64,
    gci: f64,
    ncsi: f64,
    ddl: f64,
) -> Result<PredictionRequest, CyberRiskError> {
    let indicators = [
        ("CEI", cei, 1.0),
        ("GCI", gci, 100.0),
        ("NCSI", ncsi, 100.0),
        ("DDL", ddl, 10.0),
    ];
    for (label, value, max) in indicators {
        if !value.is_finite() || !(0.0..=max).contains(&value) {
            return Err(CyberRiskError::InvalidInput(format!(
                "{} must be between 0 and {}, got {}",
                label, max, value
            )));
        }
    }
    Ok(PredictionRequest { cei, gci, ncsi, ddl })
}

/// Validate a ranking size (must be 1..=50).
pub fn validate_top_k(k: usize) -> Result<usize, CyberRiskError> {
    if !(1..=MAX_RANK_SIZE).contains(&k) {
        return Err(CyberRiskError::InvalidInput(format!(
            "ranking size must be between 1 and {}",
            MAX_RANK_SIZE
        )));
    }
    Ok(k)
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
