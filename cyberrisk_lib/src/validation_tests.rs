use super::*;
use crate::record::MetricRecord;

fn store() -> RecordStore {
    let record = |name: &str, region: &str| MetricRecord {
        name: name.to_string(),
        region: region.to_string(),
        cei: 0.5,
        gci: 80.0,
        ncsi: 60.0,
        ddl: 7.0,
        risk_score: 0.5,
        risk_category: Some(RiskCategory::Medium),
        missing: Vec::new(),
    };
    RecordStore::new(vec![
        record("Japan", "Asia"),
        record("Brazil", "South America"),
    ])
}

// -- Text sanitization --

#[test]
fn sanitize_strips_control_chars() {
    assert_eq!(sanitize_text(" Ja\u{0007}pan\n", 100).unwrap(), "Japan");
}

#[test]
fn sanitize_empty() {
    assert!(sanitize_text("   ", 100).is_err());
}

#[test]
fn sanitize_too_long() {
    assert!(sanitize_text(&"a".repeat(101), 100).is_err());
}

// -- Region validation --

#[test]
fn region_case_insensitive() {
    assert_eq!(validate_region("south america", &store()).unwrap(), "South America");
}

#[test]
fn region_unknown_lists_valid_values() {
    let err = validate_region("Antarctica", &store()).unwrap_err().to_string();
    assert!(err.contains("Asia, South America"));
}

// -- Category validation --

#[test]
fn category_full_names() {
    assert_eq!(validate_category("High").unwrap(), RiskCategory::High);
    assert_eq!(validate_category("medium risk").unwrap(), RiskCategory::Medium);
}

#[test]
fn category_shorthand() {
    assert_eq!(validate_category("l").unwrap(), RiskCategory::Low);
    assert_eq!(validate_category("M").unwrap(), RiskCategory::Medium);
    assert_eq!(validate_category("h").unwrap(), RiskCategory::High);
}

#[test]
fn category_invalid() {
    assert!(validate_category("severe").is_err());
    assert!(validate_category("").is_err());
}

// -- Country validation --

#[test]
fn country_found() {
    assert_eq!(validate_country("JAPAN", &store()).unwrap(), "Japan");
}

#[test]
fn country_unknown() {
    assert!(validate_country("Atlantis", &store()).is_err());
}

// -- Dimension validation --

#[test]
fn dimension_names() {
    assert_eq!(validate_dimension("CEI").unwrap(), Dimension::Cei);
    assert_eq!(validate_dimension("risk").unwrap(), Dimension::RiskScore);
    assert_eq!(validate_dimension("risk_score").unwrap(), Dimension::RiskScore);
    assert!(validate_dimension("gdp").is_err());
}

// -- Range validation --

#[test]
fn range_parse_basic() {
    let r = parse_range("40:70").unwrap();
    assert_eq!((r.min(), r.max()), (40.0, 70.0));
}

#[test]
fn range_parse_open_ends() {
    let r = parse_range("50:").unwrap();
    assert_eq!((r.min(), r.max()), (50.0, 100.0));
    let r = parse_range(":30").unwrap();
    assert_eq!((r.min(), r.max()), (0.0, 30.0));
}

#[test]
fn range_inverted_is_swapped() {
    let r = parse_range("70:40").unwrap();
    assert_eq!((r.min(), r.max()), (40.0, 70.0));
}

#[test]
fn range_out_of_scale_is_clamped() {
    let r = parse_range("-10:250").unwrap();
    assert!(r.is_full());
}

#[test]
fn range_rejects_garbage() {
    assert!(parse_range("40-70").is_err());
    assert!(parse_range("abc:70").is_err());
    assert!(parse_range("NaN:70").is_err());
    assert!(validate_range(f64::NAN, 10.0).is_err());
    assert!(validate_range(0.0, f64::INFINITY).is_err());
}

// -- Prediction indicators --

#[test]
fn indicators_valid() {
    let req = validate_indicators(0.6, 70.0, 55.0, 6.0).unwrap();
    assert_eq!(req.cei, 0.6);
    assert_eq!(req.ddl, 6.0);
}

#[test]
fn indicators_out_of_range() {
    assert!(validate_indicators(1.5, 70.0, 55.0, 6.0).is_err());
    assert!(validate_indicators(0.5, 70.0, 55.0, 11.0).is_err());
    assert!(validate_indicators(0.5, f64::NAN, 55.0, 6.0).is_err());
    assert!(validate_indicators(0.5, 70.0, -1.0, 6.0).is_err());
}

// -- Ranking size --

#[test]
fn top_k_bounds() {
    assert_eq!(validate_top_k(10).unwrap(), 10);
    assert!(validate_top_k(0).is_err());
    assert!(validate_top_k(MAX_RANK_SIZE + 1).is_err());
}
