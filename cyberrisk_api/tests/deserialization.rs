use cyberrisk_api::types::{CountryRecord, FeatureCollection, Insights, PredictionRequest};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn deserialize_countries_full() {
    let json = load_fixture("countries.json");
    let rows: Vec<CountryRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(rows.len(), 24);

    let japan = &rows[0];
    assert_eq!(japan.country.as_deref(), Some("Japan"));
    assert_eq!(japan.region.as_deref(), Some("Asia"));
    assert_eq!(japan.cei, Some(0.72));
    assert_eq!(japan.gci, Some(97.8));
    assert_eq!(japan.ncsi, Some(75.3));
    assert_eq!(japan.ddl, Some(7.9));
    assert_eq!(japan.risk_category.as_deref(), Some("High"));
    assert_eq!(japan.risk_score, Some(0.82));
}

#[test]
fn deserialize_countries_string_number() {
    let json = load_fixture("countries.json");
    let rows: Vec<CountryRecord> = serde_json::from_str(&json).unwrap();
    let chile = rows
        .iter()
        .find(|r| r.country.as_deref() == Some("Chile"))
        .unwrap();
    assert_eq!(chile.cei, Some(0.47));
}

#[test]
fn deserialize_country_missing_fields() {
    let json = r#"[{"Country": "Tuvalu"}]"#;
    let rows: Vec<CountryRecord> = serde_json::from_str(json).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].region, None);
    assert_eq!(rows[0].cei, None);
    assert_eq!(rows[0].risk_category, None);
}

#[test]
fn deserialize_geography() {
    let json = load_fixture("world.geojson");
    let fc: FeatureCollection = serde_json::from_str(&json).unwrap();
    assert_eq!(fc.features.len(), 27);
    assert_eq!(fc.features[3].properties.name.as_deref(), Some("United States of America"));
    assert_eq!(fc.features[3].properties.extra["iso_n3"], "103");
    assert_eq!(fc.features[3].geometry["type"], "Polygon");
    assert!(fc.features[26].properties.name.is_none());
}

#[test]
fn deserialize_insights_passthrough() {
    let json = load_fixture("insights.json");
    let insights: Insights = serde_json::from_str(&json).unwrap();
    assert_eq!(insights.correlation_matrix["CEI"]["NCSI"], -0.61);
    assert_eq!(insights.feature_importance[0]["feature"], "CEI");
}

#[test]
fn serialize_prediction_request_uses_wire_names() {
    let req = PredictionRequest {
        cei: 0.5,
        gci: 80.0,
        ncsi: 60.0,
        ddl: 7.0,
    };
    let value = serde_json::to_value(req).unwrap();
    assert_eq!(value["CEI"], 0.5);
    assert_eq!(value["DDL"], 7.0);
}

#[test]
fn deserialize_malformed_json_returns_error() {
    let bad_json = r#"[{"Country": not valid json}]"#;
    let result = serde_json::from_str::<Vec<CountryRecord>>(bad_json);
    assert!(result.is_err());
}
