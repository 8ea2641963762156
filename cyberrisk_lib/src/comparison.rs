//! User-chosen comparison set.

use serde::Serialize;

use crate::aggregate::Aggregate;
use crate::record::MetricRecord;

/// Maximum number of countries in a comparison.
pub const MAX_COMPARISON: usize = 8;

/// Ordered, capped set of country names. Identity is the case-insensitive
/// record name; insertion order is preserved.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ComparisonSet {
    names: Vec<String>,
}

impl ComparisonSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name`. Returns `false` (and changes nothing) when the name is
    /// empty, already present, or the set is full.
    pub fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        if self.is_full() {
            tracing::debug!("Comparison set is full, ignoring '{}'", name);
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    /// Builder form of [`ComparisonSet::insert`].
    pub fn with(mut self, name: &str) -> Self {
        self.insert(name);
        self
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        let wanted = name.trim().to_lowercase();
        self.names.retain(|n| n.to_lowercase() != wanted);
        self.names.len() != before
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        self.names.iter().any(|n| n.to_lowercase() == wanted)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.names.len() >= MAX_COMPARISON
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// One single-member aggregate per selected country present in `records`,
/// in selection order. Selected names with no record are skipped.
pub fn aggregate_selection<'a>(
    records: &[&'a MetricRecord],
    selection: &ComparisonSet,
) -> Vec<Aggregate<'a>> {
    selection
        .names()
        .iter()
        .filter_map(|name| {
            let wanted = name.to_lowercase();
            records
                .iter()
                .find(|r| r.name.to_lowercase() == wanted)
                .map(|r| Aggregate::new(r.name.clone(), vec![*r]))
        })
        .collect()
}
