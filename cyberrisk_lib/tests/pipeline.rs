use std::time::Duration;

use cyberrisk_lib::aggregate::{self, TOP_K};
use cyberrisk_lib::filter;
use cyberrisk_lib::reconcile::polygons_from_json;
use cyberrisk_lib::{
    Availability, CachedClient, ComparisonSet, DashboardView, DataSnapshot, Dimension,
    FilterState, MatchKind, PolygonStatus, Reconciler, RecordStore, ResponseCache, RetryConfig,
    RiskCategory, MAX_COMPARISON,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COUNTRIES: &str = include_str!("../../cyberrisk_api/tests/fixtures/countries.json");
const WORLD: &str = include_str!("../../cyberrisk_api/tests/fixtures/world.geojson");
const INSIGHTS: &str = include_str!("../../cyberrisk_api/tests/fixtures/insights.json");

fn snapshot() -> DataSnapshot {
    DataSnapshot::new()
        .with_records(RecordStore::from_json(COUNTRIES).unwrap())
        .with_polygons(polygons_from_json(WORLD).unwrap())
}

fn names<'a>(records: &[&'a cyberrisk_lib::MetricRecord]) -> Vec<&'a str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

// ============================================================================
// Record store over the service fixture
// ============================================================================

#[test]
fn store_loads_fixture() {
    let store = RecordStore::from_json(COUNTRIES).unwrap();
    assert_eq!(store.len(), 24);
    assert_eq!(
        store.regions(),
        vec!["Asia", "Europe", "South America", "North America", "Africa", "Oceania"]
    );
    // numeric string in the fixture is accepted
    assert!((store.find("Chile").unwrap().cei - 0.47).abs() < 1e-9);
    assert!(store.category_mismatches().is_empty());
}

// ============================================================================
// Filter properties
// ============================================================================

#[test]
fn identity_filter_returns_everything() {
    let store = RecordStore::from_json(COUNTRIES).unwrap();
    let all = store.all();
    assert_eq!(filter::apply(all.iter().copied(), &FilterState::permissive()), all);
    assert_eq!(filter::apply(all.iter().copied(), &FilterState::cleared(&store)), all);
}

#[test]
fn filter_is_conjunctive() {
    let store = RecordStore::from_json(COUNTRIES).unwrap();
    let filter = FilterState::permissive()
        .with_region("Africa")
        .with_category(RiskCategory::High)
        .with_range(Dimension::Gci, 50.0, 100.0);
    let out = filter::apply(store.records(), &filter);
    assert_eq!(names(&out), vec!["Nigeria", "Egypt"]);
}

// ============================================================================
// Aggregation properties
// ============================================================================

#[test]
fn region_aggregates() {
    let store = RecordStore::from_json(COUNTRIES).unwrap();
    let all = store.all();
    let regions = aggregate::by_region(&all);

    let keys: Vec<&str> = regions.iter().map(|a| a.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["Africa", "Asia", "South America", "North America", "Europe", "Oceania"]
    );
    assert_eq!(regions.iter().map(|a| a.count).sum::<usize>(), store.len());
    assert!((regions[0].means.risk_score - 74.0).abs() < 1e-9);
    assert_eq!(regions[1].means.rounded().risk_score, 65.8);

    assert_eq!(aggregate::by_region(&all), regions);
}

#[test]
fn top_and_bottom_ten() {
    let store = RecordStore::from_json(COUNTRIES).unwrap();
    let all = store.all();
    let top = aggregate::top_by_risk(&all, TOP_K);
    let bottom = aggregate::bottom_by_risk(&all, TOP_K);

    assert_eq!(top.len(), TOP_K);
    assert_eq!(bottom.len(), TOP_K);
    assert_eq!(top[0].name, "Democratic Republic of the Congo");
    assert_eq!(top[9].name, "United States");
    assert_eq!(bottom[0].name, "Estonia");
    assert_eq!(bottom[9].name, "Chile");
    for t in &top {
        assert!(!bottom.iter().any(|b| b.name == t.name));
    }
}

#[test]
fn comparison_cap() {
    let store = RecordStore::from_json(COUNTRIES).unwrap();
    let mut selection = ComparisonSet::new();
    for record in store.records().iter().take(MAX_COMPARISON) {
        assert!(selection.insert(&record.name));
    }
    let ninth = &store.records()[MAX_COMPARISON].name;
    assert!(!selection.insert(ninth));
    assert!(!selection.insert("Japan"));
    assert_eq!(selection.len(), MAX_COMPARISON);
}

// ============================================================================
// Reconciliation over the geography fixture
// ============================================================================

#[test]
fn reconcile_fixture_polygons() {
    let store = RecordStore::from_json(COUNTRIES).unwrap();
    let all = store.all();
    let polygons = polygons_from_json(WORLD).unwrap();
    let reconciler = Reconciler::with_default_aliases().unwrap();

    let russia = reconciler.match_name("Russian Federation", &all).unwrap();
    assert_eq!(russia.record.name, "Russia");
    assert_eq!(russia.kind, MatchKind::Alias);
    assert!(reconciler.resolve("Atlantis", &all).is_none());

    let south_africa = reconciler.match_name("Republic of South Africa", &all).unwrap();
    assert_eq!(south_africa.record.name, "South Africa");
    assert_eq!(south_africa.kind, MatchKind::Substring);

    let report = reconciler.report(&polygons, &all);
    assert_eq!(report.polygons, 27);
    assert_eq!(report.exact, 19);
    assert_eq!(report.alias, 4);
    assert_eq!(report.substring, 1);
    assert_eq!(report.nameless, 1);
    let unmatched: Vec<&str> = report.unmatched.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(unmatched, vec!["Atlantis", "Greenland"]);
    assert!(report.records_without_polygon.is_empty());
}

// ============================================================================
// Full dashboard recomputation
// ============================================================================

#[test]
fn dashboard_view_keeps_polygon_count() {
    let snapshot = snapshot();
    let reconciler = Reconciler::with_default_aliases().unwrap();
    let selection = ComparisonSet::new().with("Norway").with("Japan");

    let unfiltered = DashboardView::compute(
        &snapshot,
        &FilterState::permissive(),
        &selection,
        &reconciler,
    );
    let filter = FilterState::permissive().with_range(Dimension::RiskScore, 70.0, 100.0);
    let filtered = DashboardView::compute(&snapshot, &filter, &selection, &reconciler);

    assert_eq!(unfiltered.availability, Availability::Ready);
    assert_eq!(unfiltered.polygons.len(), filtered.polygons.len());
    assert_eq!(filtered.filtered.len(), 7);

    let norway = filtered
        .polygons
        .iter()
        .find(|p| p.polygon.name == "Norway")
        .unwrap();
    assert_eq!(norway.status, PolygonStatus::FilteredOut);

    let atlantis = filtered
        .polygons
        .iter()
        .find(|p| p.polygon.name == "Atlantis")
        .unwrap();
    assert_eq!(atlantis.status, PolygonStatus::NoData);

    // comparison ignores the filter
    assert_eq!(filtered.comparison.len(), 2);
    assert_eq!(filtered.comparison[0].key, "Norway");
}

// ============================================================================
// Loading through the cached client
// ============================================================================

fn client(server: &MockServer) -> CachedClient {
    CachedClient::with_base_url(
        &format!("{}/api", server.uri()),
        ResponseCache::new(Duration::from_secs(60)),
    )
    .with_retry_config(RetryConfig::disabled())
}

#[tokio::test]
async fn load_snapshot_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/countries"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COUNTRIES))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/insights"))
        .respond_with(ResponseTemplate::new(200).set_body_string(INSIGHTS))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/geo/world.geojson"))
        .respond_with(ResponseTemplate::new(200).set_body_string(WORLD))
        .mount(&server)
        .await;

    let geo_url = format!("{}/geo/world.geojson", server.uri());
    let snapshot = client(&server).load_snapshot(Some(&geo_url)).await;
    assert_eq!(snapshot.availability(), Availability::Ready);
    assert_eq!(snapshot.records().len(), 24);
    assert_eq!(snapshot.polygons().len(), 27);
    assert!(snapshot.insights().is_some());
}

#[tokio::test]
async fn load_snapshot_partial_when_geography_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/countries"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COUNTRIES))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/geo/world.geojson"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let geo_url = format!("{}/geo/world.geojson", server.uri());
    let snapshot = client(&server).load_snapshot(Some(&geo_url)).await;
    assert_eq!(snapshot.availability(), Availability::Partial);
    assert_eq!(snapshot.records().len(), 24);
    assert!(snapshot.polygons().is_empty());
    assert!(snapshot.insights().is_none());
}

#[tokio::test]
async fn load_snapshot_unavailable_is_not_an_error() {
    let server = MockServer::start().await;
    let snapshot = client(&server).load_snapshot(None).await;
    assert_eq!(snapshot.availability(), Availability::Unavailable);

    let view = DashboardView::compute(
        &snapshot,
        &FilterState::permissive(),
        &ComparisonSet::new(),
        &Reconciler::default(),
    );
    assert!(view.filtered.is_empty());
    assert!(view.top.is_empty());
}

#[tokio::test]
async fn countries_are_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/countries"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COUNTRIES))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let first = client.get_countries().await.unwrap();
    let second = client.get_countries().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/insights"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/insights"))
        .respond_with(ResponseTemplate::new(200).set_body_string(INSIGHTS))
        .mount(&server)
        .await;

    let client = client(&server).with_retry_config(RetryConfig {
        max_retries: 2,
        base_delay_ms: 1,
        max_delay_ms: 5,
    });
    let insights = client.get_insights().await.unwrap();
    assert!(insights.feature_importance.is_array());
}
