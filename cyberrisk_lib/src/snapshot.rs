//! Loaded inputs and the full set of derived dashboard outputs.
//!
//! The two external datasets arrive independently and either may be
//! missing. A [`DataSnapshot`] treats a missing input as empty, so
//! [`DashboardView::compute`] always succeeds.

use cyberrisk_api::types::Insights;
use serde::Serialize;

use crate::aggregate::{self, Aggregate, TOP_K};
use crate::comparison::{aggregate_selection, ComparisonSet};
use crate::filter::{self, FilterState};
use crate::presentation::{enrich, EnrichedPolygon};
use crate::reconcile::{PolygonRecord, ReconcileReport, Reconciler};
use crate::record::{MetricRecord, RecordStore};

/// How much of the dashboard can be shown.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Records and polygons are both loaded.
    Ready,
    /// Exactly one of them is loaded.
    Partial,
    /// Neither is loaded.
    Unavailable,
}

#[derive(Debug, Clone, Default)]
pub struct DataSnapshot {
    records: Option<RecordStore>,
    polygons: Option<Vec<PolygonRecord>>,
    insights: Option<Insights>,
}

impl DataSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, records: RecordStore) -> Self {
        self.records = Some(records);
        self
    }

    pub fn with_polygons(mut self, polygons: Vec<PolygonRecord>) -> Self {
        self.polygons = Some(polygons);
        self
    }

    pub fn with_insights(mut self, insights: Insights) -> Self {
        self.insights = Some(insights);
        self
    }

    /// The record store, or an empty one when records failed to load.
    pub fn records(&self) -> &RecordStore {
        static EMPTY: RecordStore = RecordStore::empty();
        self.records.as_ref().unwrap_or(&EMPTY)
    }

    pub fn polygons(&self) -> &[PolygonRecord] {
        self.polygons.as_deref().unwrap_or_default()
    }

    pub fn insights(&self) -> Option<&Insights> {
        self.insights.as_ref()
    }

    pub fn has_records(&self) -> bool {
        self.records.is_some()
    }

    pub fn has_polygons(&self) -> bool {
        self.polygons.is_some()
    }

    pub fn availability(&self) -> Availability {
        match (self.has_records(), self.has_polygons()) {
            (true, true) => Availability::Ready,
            (false, false) => Availability::Unavailable,
            _ => Availability::Partial,
        }
    }
}

/// Every derived output for one (snapshot, filter, selection) triple.
/// Recomputed from scratch on each change.
#[derive(Serialize, Debug, Clone)]
pub struct DashboardView<'a> {
    pub availability: Availability,
    pub filtered: Vec<&'a MetricRecord>,
    pub by_region: Vec<Aggregate<'a>>,
    pub by_category: Vec<Aggregate<'a>>,
    pub distribution: Vec<(String, usize)>,
    pub top: Vec<&'a MetricRecord>,
    pub bottom: Vec<&'a MetricRecord>,
    pub comparison: Vec<Aggregate<'a>>,
    pub polygons: Vec<EnrichedPolygon<'a>>,
    pub report: ReconcileReport,
}

impl<'a> DashboardView<'a> {
    pub fn compute(
        snapshot: &'a DataSnapshot,
        filter: &FilterState,
        selection: &ComparisonSet,
        reconciler: &Reconciler,
    ) -> Self {
        let all = snapshot.records().all();
        let filtered = filter::apply(all.iter().copied(), filter);
        let polygons = snapshot.polygons();

        let view = Self {
            availability: snapshot.availability(),
            by_region: aggregate::by_region(&filtered),
            by_category: aggregate::by_category(&filtered),
            distribution: aggregate::risk_distribution(&filtered),
            top: aggregate::top_by_risk(&filtered, TOP_K),
            bottom: aggregate::bottom_by_risk(&filtered, TOP_K),
            comparison: aggregate_selection(&all, selection),
            polygons: enrich(polygons, &all, &filtered, reconciler),
            report: reconciler.report(polygons, &all),
            filtered,
        };

        tracing::debug!(
            "Recomputed view: {} of {} records visible, {} polygons",
            view.filtered.len(),
            all.len(),
            view.polygons.len()
        );
        view
    }
}
