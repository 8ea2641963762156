//! Grouping and ranking over a record set.
//!
//! Every function here is pure: the same input slice always produces
//! bit-identical output. Groups are built in discovery order and sorts are
//! stable, so hash-map iteration order never reaches the caller.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::record::{Dimension, MetricRecord, RiskCategory, UNCLASSIFIED};

/// Size of the top and bottom risk rankings.
pub const TOP_K: usize = 10;

/// Per-indicator means of a group.
///
/// CEI and risk score are converted to 0-100 at aggregation time, GCI and
/// NCSI are already on that scale, DDL stays on its native 0-10 scale.
/// Indicators a record is missing are left out of that indicator's mean.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct IndicatorMeans {
    pub cei: f64,
    pub gci: f64,
    pub ncsi: f64,
    pub ddl: f64,
    pub risk_score: f64,
}

impl IndicatorMeans {
    pub fn of(records: &[&MetricRecord]) -> Self {
        Self {
            cei: mean(present(records, Dimension::Cei, |r| r.cei)) * 100.0,
            gci: mean(present(records, Dimension::Gci, |r| r.gci)),
            ncsi: mean(present(records, Dimension::Ncsi, |r| r.ncsi)),
            ddl: mean(present(records, Dimension::Ddl, |r| r.ddl)),
            risk_score: mean(present(records, Dimension::RiskScore, |r| r.risk_score)) * 100.0,
        }
    }

    /// One-decimal view for display. The full-precision values stay on `self`.
    pub fn rounded(&self) -> Self {
        Self {
            cei: round1(self.cei),
            gci: round1(self.gci),
            ncsi: round1(self.ncsi),
            ddl: round1(self.ddl),
            risk_score: round1(self.risk_score),
        }
    }
}

fn present<'r>(
    records: &'r [&'r MetricRecord],
    dimension: Dimension,
    value: fn(&MetricRecord) -> f64,
) -> impl Iterator<Item = f64> + 'r {
    records
        .iter()
        .filter(move |r| !r.is_missing(dimension))
        .map(move |r| value(r))
}

/// Mean over finite values. 0 when there are none.
fn mean<I: Iterator<Item = f64>>(values: I) -> f64 {
    let (sum, n) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// One partition of a record set.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Aggregate<'a> {
    pub key: String,
    #[serde(skip)]
    pub members: Vec<&'a MetricRecord>,
    pub count: usize,
    pub means: IndicatorMeans,
}

impl<'a> Aggregate<'a> {
    pub fn new(key: String, members: Vec<&'a MetricRecord>) -> Self {
        let means = IndicatorMeans::of(&members);
        Self {
            key,
            count: members.len(),
            members,
            means,
        }
    }

    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|r| r.name.as_str()).collect()
    }
}

/// Partitions `records` by `key_fn`. Groups appear in the order their key is
/// first seen; members keep input order.
pub fn aggregate<'a, F>(records: &[&'a MetricRecord], key_fn: F) -> Vec<Aggregate<'a>>
where
    F: Fn(&MetricRecord) -> String,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&'a MetricRecord>)> = Vec::new();

    for &record in records {
        let key = key_fn(record);
        match index.get(&key) {
            Some(&i) => groups[i].1.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![record]));
            }
        }
    }

    groups
        .into_iter()
        .map(|(key, members)| Aggregate::new(key, members))
        .collect()
}

fn by_mean_risk_desc(a: &Aggregate<'_>, b: &Aggregate<'_>) -> Ordering {
    b.means
        .risk_score
        .partial_cmp(&a.means.risk_score)
        .unwrap_or(Ordering::Equal)
}

/// Region aggregates, highest mean risk first. Ties keep discovery order.
pub fn by_region<'a>(records: &[&'a MetricRecord]) -> Vec<Aggregate<'a>> {
    let mut groups = aggregate(records, |r| r.region.clone());
    groups.sort_by(by_mean_risk_desc);
    tracing::debug!("Aggregated {} records into {} regions", records.len(), groups.len());
    groups
}

/// Category aggregates, highest mean risk first. Records without a category
/// are grouped under "Unclassified".
pub fn by_category<'a>(records: &[&'a MetricRecord]) -> Vec<Aggregate<'a>> {
    let mut groups = aggregate(records, MetricRecord::category_label);
    groups.sort_by(by_mean_risk_desc);
    groups
}

fn sorted_by_risk_desc<'a>(records: &[&'a MetricRecord]) -> Vec<&'a MetricRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap_or(Ordering::Equal)
    });
    sorted
}

/// The `k` riskiest records, highest first.
pub fn top_by_risk<'a>(records: &[&'a MetricRecord], k: usize) -> Vec<&'a MetricRecord> {
    let mut sorted = sorted_by_risk_desc(records);
    sorted.truncate(k);
    sorted
}

/// The `k` least risky records, lowest first.
///
/// Taken from the tail of the same descending sort used by [`top_by_risk`],
/// so the two never overlap when there are at least `2k` records. Tied
/// records keep their input order.
pub fn bottom_by_risk<'a>(records: &[&'a MetricRecord], k: usize) -> Vec<&'a MetricRecord> {
    let sorted = sorted_by_risk_desc(records);
    let start = sorted.len().saturating_sub(k);
    let mut tail = sorted[start..].to_vec();
    tail.sort_by(|a, b| {
        a.risk_score
            .partial_cmp(&b.risk_score)
            .unwrap_or(Ordering::Equal)
    });
    tail
}

/// Record count per category, Low, Medium, High, then Unclassified.
/// Categories with no records are omitted.
pub fn risk_distribution(records: &[&MetricRecord]) -> Vec<(String, usize)> {
    let mut out: Vec<(String, usize)> = RiskCategory::ALL
        .iter()
        .map(|c| {
            let n = records
                .iter()
                .filter(|r| r.risk_category == Some(*c))
                .count();
            (c.to_string(), n)
        })
        .collect();
    out.push((
        UNCLASSIFIED.to_string(),
        records.iter().filter(|r| r.risk_category.is_none()).count(),
    ));
    out.retain(|(_, n)| *n > 0);
    out
}
