//! Arguments shared by every subcommand: where the data comes from and how
//! to filter it.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use cyberrisk_lib::country_alias::parse_country_aliases;
use cyberrisk_lib::reconcile::polygons_from_json;
use cyberrisk_lib::{
    validation, CachedClient, DataSnapshot, Dimension, FilterState, Reconciler, RecordStore,
    ResponseCache,
};

const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Read country records from a JSON file instead of the service
    #[arg(long, global = true)]
    pub records: Option<PathBuf>,

    /// Read country polygons from a GeoJSON file
    #[arg(long, global = true)]
    pub geo: Option<PathBuf>,

    /// Base URL of the risk service (default: $CYBERRISK_API_URL or http://localhost:8000/api)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// URL of the GeoJSON polygon file (default: $CYBERRISK_GEO_URL)
    #[arg(long, global = true)]
    pub geo_url: Option<String>,

    /// YAML file of country name aliases, replacing the built-in table
    #[arg(long, global = true)]
    pub aliases: Option<PathBuf>,
}

impl SourceArgs {
    /// Client for the risk service, honoring `--api-url` then `CYBERRISK_API_URL`.
    pub fn client(&self) -> CachedClient {
        let cache = ResponseCache::new(CACHE_TTL);
        match self
            .api_url
            .clone()
            .or_else(|| std::env::var("CYBERRISK_API_URL").ok())
        {
            Some(url) => CachedClient::with_base_url(&url, cache),
            None => CachedClient::new(cache),
        }
    }

    /// Geography URL from `--geo-url` then `CYBERRISK_GEO_URL`, unless a
    /// `--geo` file is given.
    pub fn geography_url(&self) -> Option<String> {
        match &self.geo {
            Some(_) => None,
            None => self
                .geo_url
                .clone()
                .or_else(|| std::env::var("CYBERRISK_GEO_URL").ok()),
        }
    }

    /// Loads every input. With `--records` only the geography URL (if any)
    /// is fetched; otherwise the service is queried and missing inputs are
    /// reported, not fatal.
    pub async fn load(&self) -> Result<DataSnapshot> {
        let geo_url = self.geography_url();
        let mut snapshot = match &self.records {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let snapshot = DataSnapshot::new().with_records(RecordStore::from_json(&json)?);
                match &geo_url {
                    Some(url) => {
                        let polygons = self
                            .client()
                            .load_polygons(url)
                            .await
                            .with_context(|| format!("failed to fetch geography from {}", url))?;
                        snapshot.with_polygons(polygons)
                    }
                    None => snapshot,
                }
            }
            None => self.client().load_snapshot(geo_url.as_deref()).await,
        };

        if let Some(path) = &self.geo {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            snapshot = snapshot.with_polygons(polygons_from_json(&json)?);
        }

        if !snapshot.has_records() {
            eprintln!("Country data unavailable; showing empty results.");
        }
        Ok(snapshot)
    }

    /// Reconciler built from `--aliases`, or the built-in alias table.
    pub fn reconciler(&self) -> Result<Reconciler> {
        match &self.aliases {
            Some(path) => {
                let yaml = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Ok(Reconciler::new(parse_country_aliases(&yaml)?))
            }
            None => Ok(Reconciler::with_default_aliases()?),
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only include these regions (comma-separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub region: Vec<String>,

    /// Only include these risk categories: low (l), medium (m), high (h)
    #[arg(long, value_delimiter = ',')]
    pub category: Vec<String>,

    /// CEI range on the 0-100 scale, e.g. 40:70
    #[arg(long, value_name = "MIN:MAX")]
    pub cei: Option<String>,

    /// GCI range, e.g. 80:
    #[arg(long, value_name = "MIN:MAX")]
    pub gci: Option<String>,

    /// NCSI range, e.g. :50
    #[arg(long, value_name = "MIN:MAX")]
    pub ncsi: Option<String>,

    /// DDL range on the 0-100 scale (DDL x 10)
    #[arg(long, value_name = "MIN:MAX")]
    pub ddl: Option<String>,

    /// Risk score range on the 0-100 scale
    #[arg(long, value_name = "MIN:MAX")]
    pub risk: Option<String>,
}

impl FilterArgs {
    /// Builds the filter, starting from the cleared state for `store`.
    pub fn to_filter(&self, store: &RecordStore) -> Result<FilterState> {
        let mut filter = FilterState::cleared(store);

        for region in &self.region {
            filter = filter.with_region(&validation::validate_region(region, store)?);
        }
        for category in &self.category {
            filter = filter.with_category(validation::validate_category(category)?);
        }

        let ranges = [
            (Dimension::Cei, &self.cei),
            (Dimension::Gci, &self.gci),
            (Dimension::Ncsi, &self.ncsi),
            (Dimension::Ddl, &self.ddl),
            (Dimension::RiskScore, &self.risk),
        ];
        for (dimension, input) in ranges {
            if let Some(input) = input {
                let range = validation::parse_range(input)?;
                filter = filter.with_range(dimension, range.min(), range.max());
            }
        }

        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyberrisk_lib::filter;
    use cyberrisk_lib::RiskCategory;

    fn store() -> RecordStore {
        RecordStore::from_json(include_str!("../../../cyberrisk_api/tests/fixtures/countries.json"))
            .unwrap()
    }

    #[test]
    fn test_no_flags_passes_everything() {
        let store = store();
        let filter = FilterArgs::default().to_filter(&store).unwrap();
        assert_eq!(filter::apply(store.records(), &filter).len(), store.len());
    }

    #[test]
    fn test_flags_build_filter() {
        let store = store();
        let args = FilterArgs {
            region: vec!["africa".to_string()],
            category: vec!["h".to_string()],
            gci: Some("50:".to_string()),
            ..FilterArgs::default()
        };
        let filter = args.to_filter(&store).unwrap();
        assert!(filter.regions().contains("Africa"));
        assert!(filter.categories().contains(&RiskCategory::High));
        let names: Vec<String> = filter::apply(store.records(), &filter)
            .into_iter()
            .map(|r| r.name.clone())
            .collect();
        assert_eq!(names, vec!["Nigeria", "Egypt"]);
    }

    #[test]
    fn test_bad_flags_are_rejected() {
        let store = store();
        let args = FilterArgs {
            region: vec!["Atlantis".to_string()],
            ..FilterArgs::default()
        };
        assert!(args.to_filter(&store).is_err());

        let args = FilterArgs {
            risk: Some("high".to_string()),
            ..FilterArgs::default()
        };
        assert!(args.to_filter(&store).is_err());
    }

    #[test]
    fn test_alias_file_override() {
        let dir = std::env::temp_dir().join(format!(
            "cyberrisk_cli_alias_{}_{}.yml",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::write(&dir, "aliases:\n  - from: \"Nippon\"\n    to: \"Japan\"\n").unwrap();
        let source = SourceArgs {
            aliases: Some(dir.clone()),
            ..SourceArgs::default()
        };
        let reconciler = source.reconciler().unwrap();
        assert_eq!(reconciler.aliases().canonical("nippon"), Some("Japan"));
        assert_eq!(reconciler.aliases().len(), 1);
        std::fs::remove_file(dir).ok();
    }

    #[test]
    fn test_geo_file_takes_precedence_over_url() {
        let source = SourceArgs {
            geo: Some(PathBuf::from("world.geojson")),
            geo_url: Some("http://example.invalid/world.geojson".to_string()),
            ..SourceArgs::default()
        };
        assert_eq!(source.geography_url(), None);

        let source = SourceArgs {
            geo_url: Some("http://example.invalid/world.geojson".to_string()),
            ..SourceArgs::default()
        };
        assert_eq!(
            source.geography_url().as_deref(),
            Some("http://example.invalid/world.geojson")
        );
    }

    #[tokio::test]
    async fn test_records_file_with_geo_url_fetches_polygons() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/world.geojson"))
            .respond_with(ResponseTemplate::new(200).set_body_string(include_str!(
                "../../../cyberrisk_api/tests/fixtures/world.geojson"
            )))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/countries"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let records = std::env::temp_dir().join(format!(
            "cyberrisk_cli_records_{}.json",
            std::process::id()
        ));
        std::fs::write(
            &records,
            include_str!("../../../cyberrisk_api/tests/fixtures/countries.json"),
        )
        .unwrap();

        let source = SourceArgs {
            records: Some(records.clone()),
            api_url: Some(format!("{}/api", server.uri())),
            geo_url: Some(format!("{}/world.geojson", server.uri())),
            ..SourceArgs::default()
        };
        let snapshot = source.load().await.unwrap();
        std::fs::remove_file(records).ok();

        assert_eq!(snapshot.records().len(), 24);
        assert_eq!(snapshot.polygons().len(), 27);
    }
}
