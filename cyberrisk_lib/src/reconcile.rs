//! Geo-name reconciliation: joins polygon names to metric records.
//!
//! Polygon datasets and the risk service disagree on country names
//! ("Russian Federation" vs "Russia"). Matching tiers, first hit wins:
//!
//! 1. case-insensitive exact match
//! 2. alias table lookup, then exact match on the canonical name
//! 3. case-insensitive substring containment in either direction, first
//!    record in input order
//!
//! Anything else is unmatched. The Jaro-Winkler suggestions in
//! [`ReconcileReport`] are diagnostics only and never produce a match.

use cyberrisk_api::types::{Feature, FeatureCollection};
use serde::Serialize;

use crate::country_alias::{load_country_aliases, AliasTable, AliasTableError};
use crate::error::CyberRiskError;
use crate::record::MetricRecord;

/// Minimum similarity for an unmatched-name suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.8;

/// One country shape from the geography file.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PolygonRecord {
    /// Trimmed `properties.name`; empty when the feature has none.
    pub name: String,
    pub geometry: serde_json::Value,
    /// Remaining feature properties, passed through untouched.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl PolygonRecord {
    pub fn from_feature(feature: Feature) -> Self {
        Self {
            name: feature
                .properties
                .name
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            geometry: feature.geometry,
            properties: feature.properties.extra,
        }
    }
}

/// Converts every feature, keeping file order. Nameless features are kept
/// so the polygon count matches the file.
pub fn polygons_from_geojson(collection: FeatureCollection) -> Vec<PolygonRecord> {
    collection
        .features
        .into_iter()
        .map(PolygonRecord::from_feature)
        .collect()
}

/// Parses a GeoJSON `FeatureCollection` document.
pub fn polygons_from_json(json: &str) -> Result<Vec<PolygonRecord>, CyberRiskError> {
    let collection: FeatureCollection = serde_json::from_str(json)?;
    Ok(polygons_from_geojson(collection))
}

/// Which tier produced a match.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    Exact,
    Alias,
    Substring,
}

/// A successful reconciliation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameMatch<'a> {
    pub record: &'a MetricRecord,
    pub kind: MatchKind,
}

/// An unmatched polygon name with the closest record name, if any is similar enough.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UnmatchedName {
    pub name: String,
    pub suggestion: Option<String>,
    pub similarity: Option<f64>,
}

/// Summary of one reconciliation pass.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct ReconcileReport {
    pub polygons: usize,
    pub exact: usize,
    pub alias: usize,
    pub substring: usize,
    /// Polygons with no name at all.
    pub nameless: usize,
    pub unmatched: Vec<UnmatchedName>,
    /// Records no polygon resolved to, in record order.
    pub records_without_polygon: Vec<String>,
}

impl ReconcileReport {
    pub fn matched(&self) -> usize {
        self.exact + self.alias + self.substring
    }
}

/// Name matcher configured with an alias table.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    aliases: AliasTable,
}

impl Reconciler {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    /// Reconciler using the embedded alias table.
    pub fn with_default_aliases() -> Result<Self, AliasTableError> {
        Ok(Self::new(load_country_aliases()?))
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Resolves one polygon name against `records`.
    pub fn match_name<'a>(
        &self,
        name: &str,
        records: &[&'a MetricRecord],
    ) -> Option<NameMatch<'a>> {
        let lowered = lowercase_names(records);
        self.match_lowered(name, records, &lowered)
    }

    /// Like [`Reconciler::match_name`] without the tier.
    pub fn resolve<'a>(&self, name: &str, records: &[&'a MetricRecord]) -> Option<&'a MetricRecord> {
        self.match_name(name, records).map(|m| m.record)
    }

    /// Resolves every polygon, one result per polygon in input order.
    pub fn match_all<'a>(
        &self,
        polygons: &[PolygonRecord],
        records: &[&'a MetricRecord],
    ) -> Vec<Option<NameMatch<'a>>> {
        let lowered = lowercase_names(records);
        polygons
            .iter()
            .map(|p| self.match_lowered(&p.name, records, &lowered))
            .collect()
    }

    /// Runs a full pass and summarizes it.
    pub fn report(&self, polygons: &[PolygonRecord], records: &[&MetricRecord]) -> ReconcileReport {
        let matches = self.match_all(polygons, records);
        let mut report = ReconcileReport {
            polygons: polygons.len(),
            ..ReconcileReport::default()
        };

        for (polygon, m) in polygons.iter().zip(&matches) {
            match m {
                Some(NameMatch { kind: MatchKind::Exact, .. }) => report.exact += 1,
                Some(NameMatch { kind: MatchKind::Alias, .. }) => report.alias += 1,
                Some(NameMatch { kind: MatchKind::Substring, .. }) => report.substring += 1,
                None if polygon.name.is_empty() => report.nameless += 1,
                None => report.unmatched.push(suggest(&polygon.name, records)),
            }
        }

        report.records_without_polygon = records
            .iter()
            .filter(|r| {
                !matches
                    .iter()
                    .flatten()
                    .any(|m| std::ptr::eq(m.record, **r))
            })
            .map(|r| r.name.clone())
            .collect();

        if !report.unmatched.is_empty() {
            tracing::warn!(
                "{} of {} polygons have no matching country record",
                report.unmatched.len(),
                report.polygons
            );
        }
        report
    }

    fn match_lowered<'a>(
        &self,
        name: &str,
        records: &[&'a MetricRecord],
        lowered: &[String],
    ) -> Option<NameMatch<'a>> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }

        if let Some(i) = lowered.iter().position(|n| *n == wanted) {
            return Some(NameMatch {
                record: records[i],
                kind: MatchKind::Exact,
            });
        }

        if let Some(canonical) = self.aliases.canonical(&wanted) {
            let canonical = canonical.to_lowercase();
            if let Some(i) = lowered.iter().position(|n| *n == canonical) {
                return Some(NameMatch {
                    record: records[i],
                    kind: MatchKind::Alias,
                });
            }
            tracing::debug!("Alias target '{}' for '{}' is not in the data", canonical, name);
        }

        lowered
            .iter()
            .position(|n| !n.is_empty() && (n.contains(&wanted) || wanted.contains(n.as_str())))
            .map(|i| NameMatch {
                record: records[i],
                kind: MatchKind::Substring,
            })
    }
}

fn lowercase_names(records: &[&MetricRecord]) -> Vec<String> {
    records.iter().map(|r| r.name.to_lowercase()).collect()
}

fn suggest(name: &str, records: &[&MetricRecord]) -> UnmatchedName {
    let wanted = name.to_lowercase();
    let mut best: Option<(f64, &MetricRecord)> = None;

    for &record in records {
        let score = strsim::jaro_winkler(&wanted, &record.name.to_lowercase());
        if score >= SUGGESTION_THRESHOLD && best.map_or(true, |(b, _)| score > b) {
            best = Some((score, record));
        }
    }

    UnmatchedName {
        name: name.to_string(),
        suggestion: best.map(|(_, r)| r.name.clone()),
        similarity: best.map(|(s, _)| s),
    }
}
