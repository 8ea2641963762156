//! Map presentation values: per-polygon color and extrusion height.
//!
//! Every polygon in the geography file produces exactly one
//! [`EnrichedPolygon`], whatever the filter, so the render set never changes
//! size. Polygons without data or hidden by the filter are muted instead of
//! dropped.

use std::collections::HashSet;

use serde::Serialize;

use crate::reconcile::{MatchKind, PolygonRecord, Reconciler};
use crate::record::{MetricRecord, RiskCategory};

/// Elevation per unit of risk score (0-1).
pub const ELEVATION_SCALE: f64 = 0.3;

/// Alpha applied to filtered-out polygons.
const MUTED_ALPHA: u8 = 40;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const HIGH: Rgba = Rgba::new(220, 38, 38, 200);
    pub const MEDIUM: Rgba = Rgba::new(245, 158, 11, 200);
    pub const LOW: Rgba = Rgba::new(34, 197, 94, 200);
    pub const UNCLASSIFIED: Rgba = Rgba::new(148, 163, 184, 200);
    /// Polygons with no matching record.
    pub const NO_DATA: Rgba = Rgba::new(200, 200, 200, 25);

    /// Same hue, near-transparent.
    pub const fn muted(self) -> Self {
        Self { a: MUTED_ALPHA, ..self }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// `#rrggbbaa`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// Color for a server category.
pub fn category_color(category: Option<RiskCategory>) -> Rgba {
    match category {
        Some(RiskCategory::High) => Rgba::HIGH,
        Some(RiskCategory::Medium) => Rgba::MEDIUM,
        Some(RiskCategory::Low) => Rgba::LOW,
        None => Rgba::UNCLASSIFIED,
    }
}

pub fn risk_color(record: &MetricRecord) -> Rgba {
    category_color(record.risk_category)
}

pub fn elevation(record: &MetricRecord) -> f64 {
    record.risk_score * ELEVATION_SCALE
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonStatus {
    /// Matched and passes the current filter.
    Visible,
    /// Matched, but the record is hidden by the current filter.
    FilteredOut,
    /// No record matched the polygon name.
    NoData,
}

/// A polygon joined with at most one record, plus its render values.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EnrichedPolygon<'a> {
    pub polygon: &'a PolygonRecord,
    pub record: Option<&'a MetricRecord>,
    pub match_kind: Option<MatchKind>,
    pub status: PolygonStatus,
    pub color: Rgba,
    pub elevation: f64,
}

/// Joins every polygon to `records` and styles it against the `visible`
/// subset. Matching always runs over the full record set so a polygon keeps
/// its identity while filters change.
pub fn enrich<'a>(
    polygons: &'a [PolygonRecord],
    records: &[&'a MetricRecord],
    visible: &[&MetricRecord],
    reconciler: &Reconciler,
) -> Vec<EnrichedPolygon<'a>> {
    let visible: HashSet<&str> = visible.iter().map(|r| r.name.as_str()).collect();
    let matches = reconciler.match_all(polygons, records);

    polygons
        .iter()
        .zip(matches)
        .map(|(polygon, m)| match m {
            Some(m) if visible.contains(m.record.name.as_str()) => EnrichedPolygon {
                polygon,
                record: Some(m.record),
                match_kind: Some(m.kind),
                status: PolygonStatus::Visible,
                color: risk_color(m.record),
                elevation: elevation(m.record),
            },
            Some(m) => EnrichedPolygon {
                polygon,
                record: Some(m.record),
                match_kind: Some(m.kind),
                status: PolygonStatus::FilteredOut,
                color: risk_color(m.record).muted(),
                elevation: 0.0,
            },
            None => EnrichedPolygon {
                polygon,
                record: None,
                match_kind: None,
                status: PolygonStatus::NoData,
                color: Rgba::NO_DATA,
                elevation: 0.0,
            },
        })
        .collect()
}
