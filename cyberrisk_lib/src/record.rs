//! Metric record store: the normalized, immutable per-country dataset.
//!
//! All defensive coercion of upstream JSON happens in [`RecordStore::from_wire`].
//! Downstream code (filtering, aggregation, reconciliation) can assume every
//! numeric field is finite and inside its natural range.

use std::collections::HashSet;
use std::fmt;

use cyberrisk_api::types::CountryRecord;
use serde::{Deserialize, Serialize};

use crate::error::CyberRiskError;

/// Upper bound (exclusive) of the Low band on the 0-100 display scale.
pub const LOW_BAND_MAX: f64 = 40.0;
/// Upper bound (exclusive) of the Medium band on the 0-100 display scale.
pub const MEDIUM_BAND_MAX: f64 = 70.0;

/// Label used wherever a record has no recognizable server category.
pub const UNCLASSIFIED: &str = "Unclassified";

const UNKNOWN_REGION: &str = "Unknown";

/// Server-assigned risk classification.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 3] = [RiskCategory::Low, RiskCategory::Medium, RiskCategory::High];

    /// Parses a server label. Accepts any case, surrounding whitespace, and a
    /// trailing "risk" ("Medium Risk").
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        let word = lower.strip_suffix("risk").unwrap_or(&lower).trim();
        match word {
            "low" => Some(Self::Low),
            "medium" | "moderate" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// The band a score would fall into. Only used to cross-check the
    /// server's category, never to replace it.
    pub fn band_for_score(risk_score: f64) -> Self {
        let display = risk_score * 100.0;
        if display < LOW_BAND_MAX {
            Self::Low
        } else if display < MEDIUM_BAND_MAX {
            Self::Medium
        } else {
            Self::High
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RiskCategory::Low => "Low",
                RiskCategory::Medium => "Medium",
                RiskCategory::High => "High",
            }
        )
    }
}

/// The five numeric dimensions a filter can constrain.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Cei,
    Gci,
    Ncsi,
    Ddl,
    RiskScore,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Cei,
        Dimension::Gci,
        Dimension::Ncsi,
        Dimension::Ddl,
        Dimension::RiskScore,
    ];

    /// Value of this dimension on the shared 0-100 display scale.
    pub fn display_value(self, record: &MetricRecord) -> f64 {
        match self {
            Dimension::Cei => record.cei * 100.0,
            Dimension::Gci => record.gci,
            Dimension::Ncsi => record.ncsi,
            Dimension::Ddl => record.ddl * 10.0,
            Dimension::RiskScore => record.risk_score * 100.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Cei => "CEI",
            Dimension::Gci => "GCI",
            Dimension::Ncsi => "NCSI",
            Dimension::Ddl => "DDL",
            Dimension::RiskScore => "Risk Score",
        }
    }
}

/// One country's indicators and risk classification, on their natural scales.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub name: String,
    pub region: String,
    /// Cyber exposure index, 0-1.
    pub cei: f64,
    /// Global cybersecurity index, 0-100.
    pub gci: f64,
    /// National cyber security index, 0-100.
    pub ncsi: f64,
    /// Digital development level, 0-10.
    pub ddl: f64,
    /// Risk score, 0-1.
    pub risk_score: f64,
    /// `None` when the server label was missing or unrecognized.
    pub risk_category: Option<RiskCategory>,
    /// Indicators the service did not supply. Their stored value is 0 so
    /// range filters still apply, but aggregate means skip them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<Dimension>,
}

impl MetricRecord {
    pub fn category_label(&self) -> String {
        match self.risk_category {
            Some(c) => c.to_string(),
            None => UNCLASSIFIED.to_string(),
        }
    }

    pub fn is_missing(&self, dimension: Dimension) -> bool {
        self.missing.contains(&dimension)
    }

    /// True when the server category disagrees with the score band.
    pub fn category_mismatch(&self) -> bool {
        match self.risk_category {
            Some(c) => c != RiskCategory::band_for_score(self.risk_score),
            None => false,
        }
    }
}

/// The in-memory dataset for one load. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<MetricRecord>,
}

impl RecordStore {
    pub const fn empty() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn new(records: Vec<MetricRecord>) -> Self {
        Self { records }
    }

    /// Builds a store from raw service rows.
    ///
    /// Rows without a name are dropped, as are later rows repeating an
    /// earlier name (case-insensitive). Missing or non-finite numbers become
    /// 0 and are listed in `missing`. Every value is clamped to its natural range.
    pub fn from_wire(rows: Vec<CountryRecord>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut records = Vec::with_capacity(rows.len());

        for (i, row) in rows.into_iter().enumerate() {
            let name = row.country.as_deref().map(str::trim).unwrap_or_default();
            if name.is_empty() {
                tracing::warn!("Dropping country row {} with no name", i);
                continue;
            }
            if !seen.insert(name.to_lowercase()) {
                tracing::warn!("Dropping duplicate country row '{}'", name);
                continue;
            }

            let region = match row.region.as_deref().map(str::trim) {
                Some(r) if !r.is_empty() => r.to_string(),
                _ => UNKNOWN_REGION.to_string(),
            };

            let risk_category = row.risk_category.as_deref().and_then(RiskCategory::from_label);
            if risk_category.is_none() {
                tracing::warn!(
                    "Unrecognized risk category {:?} for '{}'",
                    row.risk_category,
                    name
                );
            }

            let mut missing = Vec::new();
            let mut field = |value: Option<f64>, max: f64, dimension: Dimension| {
                coerce(value, max, dimension.label(), name).unwrap_or_else(|| {
                    missing.push(dimension);
                    0.0
                })
            };
            let cei = field(row.cei, 1.0, Dimension::Cei);
            let gci = field(row.gci, 100.0, Dimension::Gci);
            let ncsi = field(row.ncsi, 100.0, Dimension::Ncsi);
            let ddl = field(row.ddl, 10.0, Dimension::Ddl);
            let risk_score = field(row.risk_score, 1.0, Dimension::RiskScore);

            let record = MetricRecord {
                name: name.to_string(),
                region,
                cei,
                gci,
                ncsi,
                ddl,
                risk_score,
                risk_category,
                missing,
            };

            if record.category_mismatch() {
                tracing::warn!(
                    "'{}' is labelled {} but its score {:.2} falls in the {} band",
                    record.name,
                    record.category_label(),
                    record.risk_score,
                    RiskCategory::band_for_score(record.risk_score)
                );
            }

            records.push(record);
        }

        tracing::debug!("Loaded {} country records", records.len());
        Self { records }
    }

    /// Parses the service's JSON array and normalizes it.
    pub fn from_json(json: &str) -> Result<Self, CyberRiskError> {
        let rows: Vec<CountryRecord> = serde_json::from_str(json)?;
        Ok(Self::from_wire(rows))
    }

    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    /// All records as a borrowed record set, in load order.
    pub fn all(&self) -> Vec<&MetricRecord> {
        self.records.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct regions in the order they first appear.
    pub fn regions(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for record in &self.records {
            if !out.contains(&record.region.as_str()) {
                out.push(&record.region);
            }
        }
        out
    }

    /// Categories present in the data, Low to High.
    pub fn categories(&self) -> Vec<RiskCategory> {
        RiskCategory::ALL
            .into_iter()
            .filter(|c| self.records.iter().any(|r| r.risk_category == Some(*c)))
            .collect()
    }

    /// Observed `(min, max)` of a dimension on the display scale.
    /// `None` for an empty store.
    pub fn observed_range(&self, dimension: Dimension) -> Option<(f64, f64)> {
        self.records
            .iter()
            .map(|r| dimension.display_value(r))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Case-insensitive lookup by country name.
    pub fn find(&self, name: &str) -> Option<&MetricRecord> {
        let wanted = name.trim().to_lowercase();
        self.records.iter().find(|r| r.name.to_lowercase() == wanted)
    }

    /// Records whose server category disagrees with their score band.
    pub fn category_mismatches(&self) -> Vec<&MetricRecord> {
        self.records.iter().filter(|r| r.category_mismatch()).collect()
    }
}

/// Clamped value, or `None` when the field is absent or not finite.
fn coerce(value: Option<f64>, max: f64, field: &str, country: &str) -> Option<f64> {
    match value {
        Some(v) if v.is_finite() => {
            if v < 0.0 || v > max {
                tracing::warn!(
                    "{} for '{}' is {} (outside 0-{}), clamping",
                    field,
                    country,
                    v,
                    max
                );
            }
            Some(v.clamp(0.0, max))
        }
        _ => {
            tracing::warn!("{} missing for '{}', treating as 0", field, country);
            None
        }
    }
}
