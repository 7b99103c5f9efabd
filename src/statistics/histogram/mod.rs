//! Distribution of values of a column.

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::StatisticsError;
use crate::statistics::estimate::Estimate;
use crate::statistics::range::StatisticRange;

pub mod disjoint;
pub mod uniform;

pub use disjoint::DisjointRangeHistogram;
pub use uniform::UniformDistributionHistogram;

/// A reference to a histogram. Histograms are immutable and can be shared between statistics.
pub type HistogramRef = Arc<dyn Histogram>;

/// Describes how values of a column are distributed.
pub trait Histogram: Debug + Send + Sync {
    /// Returns the probability that a value is less than (or equal to if `inclusive` is `true`) the given value.
    fn cumulative_probability(&self, value: f64, inclusive: bool) -> Estimate;

    /// Returns the value `v` such that the [cumulative probability](Self::cumulative_probability) of `v`
    /// is equal to the given percentile.
    ///
    /// Returns an error if the percentile lies outside of `[0.0, 1.0]` bounds.
    fn inverse_cumulative_probability(&self, percentile: f64) -> Result<Estimate, StatisticsError>;

    /// Returns this histogram as [`Any`](std::any::Any) in order it can be downcast to its implementation.
    fn as_any(&self) -> &dyn Any;

    /// Returns `true` if this histogram is equal to the `other` histogram.
    fn equals(&self, other: &dyn Histogram) -> bool;
}

impl PartialEq for dyn Histogram {
    fn eq(&self, other: &dyn Histogram) -> bool {
        self.equals(other)
    }
}

/// Combines histograms of inputs of an operator that merges or bounds rows.
pub trait HistogramCombinator: Debug + Send + Sync {
    /// Widens the support of the given histogram to include the given range.
    fn add_disjunction(&self, histogram: &HistogramRef, range: &StatisticRange) -> Option<HistogramRef>;

    /// Narrows the support of the given histogram to its intersection with the given range.
    fn add_conjunction(&self, histogram: &HistogramRef, range: &StatisticRange) -> Option<HistogramRef>;

    /// Returns the histogram to use when rows are removed from a column but
    /// it is unknown which values they held.
    fn retain(&self, histogram: &HistogramRef) -> Option<HistogramRef>;
}

/// [HistogramCombinator] that restricts histograms to sets of [disjoint ranges](DisjointRangeHistogram).
#[derive(Debug)]
pub struct DisjointRangeCombinator;

impl HistogramCombinator for DisjointRangeCombinator {
    fn add_disjunction(&self, histogram: &HistogramRef, range: &StatisticRange) -> Option<HistogramRef> {
        Some(disjoint::add_disjunction(histogram, range))
    }

    fn add_conjunction(&self, histogram: &HistogramRef, range: &StatisticRange) -> Option<HistogramRef> {
        Some(disjoint::add_conjunction(histogram, range))
    }

    fn retain(&self, histogram: &HistogramRef) -> Option<HistogramRef> {
        Some(histogram.clone())
    }
}

/// [HistogramCombinator] used when histograms are disabled. Never produces a histogram.
#[derive(Debug)]
pub struct NoHistogramCombinator;

impl HistogramCombinator for NoHistogramCombinator {
    fn add_disjunction(&self, _histogram: &HistogramRef, _range: &StatisticRange) -> Option<HistogramRef> {
        None
    }

    fn add_conjunction(&self, _histogram: &HistogramRef, _range: &StatisticRange) -> Option<HistogramRef> {
        None
    }

    fn retain(&self, _histogram: &HistogramRef) -> Option<HistogramRef> {
        None
    }
}
