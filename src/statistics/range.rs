use std::fmt::{Display, Formatter};

use crate::error::{ensure_valid, StatisticsError};
use crate::statistics::estimate::Estimate;

/// Overlap of two ranges when the length of their intersection is infinite
/// and the number of distinct values of one of them is unknown.
pub const INFINITE_TO_INFINITE_RANGE_INTERSECT_OVERLAP_HEURISTIC_FACTOR: f64 = 0.5;
/// Overlap of an infinite range with a range of finite length.
pub const INFINITE_TO_FINITE_RANGE_INTERSECT_OVERLAP_HEURISTIC_FACTOR: f64 = 0.25;

/// A closed interval `[low, high]` of values a column can take and the estimated number of
/// distinct values inside of it.
///
/// Bounds may be infinite. The range with no bounds is the empty range: it describes a column
/// without values and always has zero distinct values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticRange {
    bounds: Option<(f64, f64)>,
    distinct_values: Estimate,
}

impl StatisticRange {
    /// Creates a new range.
    ///
    /// Returns an error if one of the bounds is `NaN`, `low` is greater than `high` or
    /// the number of distinct values is negative. Use [StatisticRange::empty] to create an empty range.
    pub fn new<T>(low: f64, high: f64, distinct_values: T) -> Result<Self, StatisticsError>
    where
        T: Into<Estimate>,
    {
        let distinct_values = distinct_values.into();
        ensure_valid!(!low.is_nan() && !high.is_nan(), "range bounds must not be NaN: [{}, {}]", low, high);
        ensure_valid!(low <= high, "low must be less than or equal to high but got: [{}, {}]", low, high);
        ensure_valid!(
            distinct_values.value().map_or(true, |v| v >= 0.0),
            "distinct values must be non negative but got: {}",
            distinct_values
        );

        Ok(StatisticRange {
            bounds: Some((low, high)),
            distinct_values,
        })
    }

    /// The empty range.
    pub const fn empty() -> Self {
        StatisticRange {
            bounds: None,
            distinct_values: Estimate::zero(),
        }
    }

    /// Creates a range `(-inf, +inf)` with the given number of distinct values.
    ///
    /// Returns an error if the number of distinct values is negative.
    pub fn open<T>(distinct_values: T) -> Result<Self, StatisticsError>
    where
        T: Into<Estimate>,
    {
        StatisticRange::new(f64::NEG_INFINITY, f64::INFINITY, distinct_values)
    }

    /// A range `(-inf, +inf)` with unknown number of distinct values.
    pub const fn unknown() -> Self {
        StatisticRange {
            bounds: Some((f64::NEG_INFINITY, f64::INFINITY)),
            distinct_values: Estimate::Unknown,
        }
    }

    /// Bounds must be validated by the caller.
    pub(crate) fn from_parts(bounds: Option<(f64, f64)>, distinct_values: Estimate) -> Self {
        match bounds {
            Some(_) => StatisticRange {
                bounds,
                distinct_values,
            },
            None => StatisticRange::empty(),
        }
    }

    /// The lower bound or `None` if this range is empty.
    pub fn low(&self) -> Option<f64> {
        self.bounds.map(|(low, _)| low)
    }

    /// The upper bound or `None` if this range is empty.
    pub fn high(&self) -> Option<f64> {
        self.bounds.map(|(_, high)| high)
    }

    /// Returns both bounds or `None` if this range is empty.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.bounds
    }

    /// The estimated number of distinct values.
    pub fn distinct_values(&self) -> Estimate {
        self.distinct_values
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    /// Returns `true` if both bounds are infinite.
    pub fn is_both_infinite(&self) -> bool {
        matches!(self.bounds, Some((low, high)) if low.is_infinite() && high.is_infinite())
    }

    /// Returns `high - low`. The length of the empty range is unknown.
    pub fn length(&self) -> Estimate {
        match self.bounds {
            Some((low, high)) => Estimate::new(high - low),
            None => Estimate::Unknown,
        }
    }

    /// Returns a copy of this range with the given number of distinct values.
    /// The empty range is returned as is.
    pub fn with_distinct_values(&self, distinct_values: Estimate) -> Self {
        StatisticRange::from_parts(self.bounds, distinct_values)
    }

    /// Returns the fraction of this range that overlaps with the `other` range.
    pub fn overlap_percent_with(&self, other: &StatisticRange) -> f64 {
        let ((low, high), (other_low, other_high)) = match (self.bounds, other.bounds) {
            (Some(this), Some(other)) => (this, other),
            // zero is better than an unknown value because it is safe to multiply row counts by it.
            _ => return 0.0,
        };
        if self.distinct_values.is_exactly(0.0) || other.distinct_values.is_exactly(0.0) {
            return 0.0;
        }

        if self == other && !self.is_both_infinite() {
            return 1.0;
        }

        let length_of_intersect = high.min(other_high) - low.max(other_low);
        if length_of_intersect.is_infinite() {
            return match (self.distinct_values, other.distinct_values) {
                (Estimate::Known(this), Estimate::Known(other)) if this.is_finite() && other.is_finite() => {
                    (other / this).min(1.0)
                }
                _ => INFINITE_TO_INFINITE_RANGE_INTERSECT_OVERLAP_HEURISTIC_FACTOR,
            };
        }
        if length_of_intersect == 0.0 {
            return 1.0 / self.distinct_values.unwrap_or(1.0).max(1.0);
        }
        if length_of_intersect < 0.0 {
            return 0.0;
        }

        let length = high - low;
        if length.is_infinite() {
            return INFINITE_TO_FINITE_RANGE_INTERSECT_OVERLAP_HEURISTIC_FACTOR;
        }
        if length_of_intersect > 0.0 {
            return length_of_intersect / length;
        }

        INFINITE_TO_INFINITE_RANGE_INTERSECT_OVERLAP_HEURISTIC_FACTOR
    }

    /// Returns the intersection of this range with the `other` range.
    /// If the ranges do not overlap the result is the empty range.
    pub fn intersect(&self, other: &StatisticRange) -> StatisticRange {
        match intersect_bounds(self.bounds, other.bounds) {
            Some(bounds) => StatisticRange {
                bounds: Some(bounds),
                distinct_values: self.overlapping_distinct_values(other),
            },
            None => StatisticRange::empty(),
        }
    }

    /// Union of two ranges that assumes that their sets of values are disjoint:
    /// the number of distinct values is the sum of distinct values of both ranges.
    pub fn add_and_sum_distinct_values(&self, other: &StatisticRange) -> StatisticRange {
        let distinct_values = self.distinct_values + other.distinct_values;
        self.expand_with_distinct_values(distinct_values, other)
    }

    /// Union of two ranges that assumes that the values of one range are a subset of the values of another:
    /// the number of distinct values is the maximum number of distinct values of both ranges.
    pub fn add_and_max_distinct_values(&self, other: &StatisticRange) -> StatisticRange {
        let distinct_values = self.distinct_values.max(other.distinct_values);
        self.expand_with_distinct_values(distinct_values, other)
    }

    /// Union of two ranges where distinct values of the overlapping parts of both ranges are counted once.
    pub fn add_and_collapse_distinct_values(&self, other: &StatisticRange) -> StatisticRange {
        let overlap_percent_of_this = self.overlap_percent_with(other);
        let overlap_percent_of_other = other.overlap_percent_with(self);
        let overlap_distinct_values_this = overlap_percent_of_this * self.distinct_values;
        let overlap_distinct_values_other = overlap_percent_of_other * other.distinct_values;
        let max_overlapping_values = overlap_distinct_values_this.max(overlap_distinct_values_other);
        let distinct_values = max_overlapping_values
            + (1.0 - overlap_percent_of_this) * self.distinct_values
            + (1.0 - overlap_percent_of_other) * other.distinct_values;

        self.expand_with_distinct_values(distinct_values, other)
    }

    /// Removes the values of the given `subset` range from this range.
    ///
    /// Which values have been removed is unknown, so the bounds of this range can not be narrowed.
    /// This method always returns a copy of this range.
    pub fn subtract_subrange(&self, _subset: &StatisticRange) -> StatisticRange {
        *self
    }

    fn expand_with_distinct_values(&self, distinct_values: Estimate, other: &StatisticRange) -> StatisticRange {
        match (self.bounds, other.bounds) {
            (None, _) => *other,
            (_, None) => *self,
            (Some((low, high)), Some((other_low, other_high))) => StatisticRange {
                bounds: Some((low.min(other_low), high.max(other_high))),
                distinct_values,
            },
        }
    }

    fn overlapping_distinct_values(&self, other: &StatisticRange) -> Estimate {
        let overlap_percent_of_left = self.overlap_percent_with(other);
        let overlap_percent_of_right = other.overlap_percent_with(self);
        let overlap_distinct_values_left = overlap_percent_of_left * self.distinct_values;
        let overlap_distinct_values_right = overlap_percent_of_right * other.distinct_values;
        let min_input_distinct_values = self.distinct_values.min_known(other.distinct_values);

        if min_input_distinct_values.is_exactly(0.0) {
            Estimate::zero()
        } else {
            min_input_distinct_values.min_known(overlap_distinct_values_left.max_known(overlap_distinct_values_right))
        }
    }
}

/// Returns `[max(low), min(high)]` or `None` if one of the given bounds is empty or
/// the bounds do not overlap.
pub(crate) fn intersect_bounds(left: Option<(f64, f64)>, right: Option<(f64, f64)>) -> Option<(f64, f64)> {
    let ((low, high), (other_low, other_high)) = (left?, right?);
    let low = low.max(other_low);
    let high = high.min(other_high);
    if low <= high {
        Some((low, high))
    } else {
        None
    }
}

impl Display for StatisticRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.bounds {
            Some((low, high)) => write!(f, "[{}, {}] ndv: {}", low, high, self.distinct_values),
            None => write!(f, "empty"),
        }
    }
}
