//! Library layer for the cyber-risk dashboard: record store, filtering,
//! aggregation, geo-name reconciliation, and a cached API client.
//!
//! The core operations ([`filter::apply`], the [`aggregate`] functions and
//! [`Reconciler`]) are synchronous and side-effect free. Only loading is async.

pub mod aggregate;
pub mod cache;
pub mod client;
pub mod comparison;
pub mod country_alias;
pub mod error;
pub mod filter;
pub mod presentation;
pub mod reconcile;
pub mod record;
pub mod snapshot;
pub mod validation;

pub use cyberrisk_api;
pub use cyberrisk_api::types;

pub use aggregate::{Aggregate, IndicatorMeans, TOP_K};
pub use cache::{CacheKey, ResponseCache};
pub use client::{CachedClient, RetryConfig};
pub use comparison::{ComparisonSet, MAX_COMPARISON};
pub use country_alias::{AliasTable, AliasTableError};
pub use error::CyberRiskError;
pub use filter::{FilterState, NumericRange, RangeSet};
pub use presentation::{EnrichedPolygon, PolygonStatus, Rgba};
pub use reconcile::{MatchKind, NameMatch, PolygonRecord, ReconcileReport, Reconciler};
pub use record::{Dimension, MetricRecord, RecordStore, RiskCategory};
pub use snapshot::{Availability, DashboardView, DataSnapshot};
