//! Composite filtering over the record set.
//!
//! A [`FilterState`] is a plain value: callers build a new one for every UI
//! edit and pass it to [`apply`]. A record passes when it satisfies every
//! clause (region AND category AND all five numeric ranges). An empty
//! categorical selection places no restriction on that dimension.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::record::{Dimension, MetricRecord, RecordStore, RiskCategory};

pub const DISPLAY_MIN: f64 = 0.0;
pub const DISPLAY_MAX: f64 = 100.0;

/// Tolerance for range bounds, so that e.g. 0.55 * 100 still sits inside [0, 55].
const EPSILON: f64 = 0.0001;

/// Inclusive `[min, max]` on the 0-100 display scale. Always `min <= max`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    min: f64,
    max: f64,
}

impl NumericRange {
    /// Builds a range, swapping inverted bounds and clamping both ends to the
    /// display scale. A NaN bound falls back to the matching end of the scale.
    pub fn new(min: f64, max: f64) -> Self {
        let min = if min.is_nan() { DISPLAY_MIN } else { min.clamp(DISPLAY_MIN, DISPLAY_MAX) };
        let max = if max.is_nan() { DISPLAY_MAX } else { max.clamp(DISPLAY_MIN, DISPLAY_MAX) };
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn full() -> Self {
        Self {
            min: DISPLAY_MIN,
            max: DISPLAY_MAX,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min - EPSILON && value <= self.max + EPSILON
    }

    pub fn is_full(&self) -> bool {
        self.min <= DISPLAY_MIN && self.max >= DISPLAY_MAX
    }
}

impl Default for NumericRange {
    fn default() -> Self {
        Self::full()
    }
}

/// One range per numeric dimension.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct RangeSet {
    pub cei: NumericRange,
    pub gci: NumericRange,
    pub ncsi: NumericRange,
    pub ddl: NumericRange,
    pub risk_score: NumericRange,
}

impl RangeSet {
    pub fn full() -> Self {
        Self::default()
    }

    /// Ranges spanning exactly what the store contains. Dimensions with no
    /// data (empty store) get the full scale.
    pub fn observed(store: &RecordStore) -> Self {
        let mut ranges = Self::full();
        for dimension in Dimension::ALL {
            if let Some((lo, hi)) = store.observed_range(dimension) {
                ranges.set(dimension, NumericRange::new(lo, hi));
            }
        }
        ranges
    }

    pub fn get(&self, dimension: Dimension) -> NumericRange {
        match dimension {
            Dimension::Cei => self.cei,
            Dimension::Gci => self.gci,
            Dimension::Ncsi => self.ncsi,
            Dimension::Ddl => self.ddl,
            Dimension::RiskScore => self.risk_score,
        }
    }

    pub fn set(&mut self, dimension: Dimension, range: NumericRange) {
        let slot = match dimension {
            Dimension::Cei => &mut self.cei,
            Dimension::Gci => &mut self.gci,
            Dimension::Ncsi => &mut self.ncsi,
            Dimension::Ddl => &mut self.ddl,
            Dimension::RiskScore => &mut self.risk_score,
        };
        *slot = range;
    }
}

/// Every user-controlled filter clause.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct FilterState {
    regions: BTreeSet<String>,
    categories: BTreeSet<RiskCategory>,
    ranges: RangeSet,
}

impl FilterState {
    /// No categorical restriction and full-scale ranges. Passes every record.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// The "clear filters" state: empty selections and each range reset to
    /// the observed extent of the current dataset.
    pub fn cleared(store: &RecordStore) -> Self {
        Self {
            regions: BTreeSet::new(),
            categories: BTreeSet::new(),
            ranges: RangeSet::observed(store),
        }
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.regions.insert(region.to_string());
        self
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions.extend(regions.into_iter().map(Into::into));
        self
    }

    pub fn without_region(mut self, region: &str) -> Self {
        self.regions.remove(region);
        self
    }

    pub fn with_category(mut self, category: RiskCategory) -> Self {
        self.categories.insert(category);
        self
    }

    pub fn with_categories(mut self, categories: &[RiskCategory]) -> Self {
        self.categories.extend(categories.iter().copied());
        self
    }

    pub fn without_category(mut self, category: RiskCategory) -> Self {
        self.categories.remove(&category);
        self
    }

    /// Sets a range. Bounds are normalized by [`NumericRange::new`].
    pub fn with_range(mut self, dimension: Dimension, min: f64, max: f64) -> Self {
        self.ranges.set(dimension, NumericRange::new(min, max));
        self
    }

    pub fn with_ranges(mut self, ranges: RangeSet) -> Self {
        self.ranges = ranges;
        self
    }

    pub fn regions(&self) -> &BTreeSet<String> {
        &self.regions
    }

    pub fn categories(&self) -> &BTreeSet<RiskCategory> {
        &self.categories
    }

    pub fn ranges(&self) -> &RangeSet {
        &self.ranges
    }

    pub fn range(&self, dimension: Dimension) -> NumericRange {
        self.ranges.get(dimension)
    }

    /// True when `record` satisfies every clause.
    pub fn matches(&self, record: &MetricRecord) -> bool {
        if !self.regions.is_empty() && !self.regions.contains(&record.region) {
            return false;
        }

        if !self.categories.is_empty() {
            match record.risk_category {
                Some(c) if self.categories.contains(&c) => {}
                _ => return false,
            }
        }

        Dimension::ALL
            .iter()
            .all(|d| self.ranges.get(*d).contains(d.display_value(record)))
    }
}

/// Returns the records passing `filter`, in input order.
pub fn apply<'a, I>(records: I, filter: &FilterState) -> Vec<&'a MetricRecord>
where
    I: IntoIterator<Item = &'a MetricRecord>,
{
    records.into_iter().filter(|r| filter.matches(r)).collect()
}
