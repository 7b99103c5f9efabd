use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::error::{ensure_valid, StatisticsError};
use crate::statistics::estimate::Estimate;
use crate::statistics::histogram::{Histogram, HistogramRef};
use crate::statistics::range::StatisticRange;

/// A histogram whose support is restricted to a set of disjoint closed intervals.
///
/// The probability mass of the source histogram that lies outside of these intervals is ignored and
/// the remaining mass is scaled so that the total mass over the intervals is equal to `1.0`.
#[derive(Debug, Clone)]
pub struct DisjointRangeHistogram {
    source: HistogramRef,
    // lower bound -> upper bound. Intervals do not overlap and do not touch each other.
    ranges: BTreeMap<OrderedFloat<f64>, f64>,
}

impl DisjointRangeHistogram {
    /// Creates a histogram that restricts the `source` histogram to the given range.
    /// When the range is empty the resulting histogram has no support.
    pub fn new(source: HistogramRef, range: &StatisticRange) -> Self {
        let mut ranges = BTreeMap::new();
        if let Some((low, high)) = range.bounds() {
            ranges.insert(OrderedFloat(low), high);
        }
        DisjointRangeHistogram { source, ranges }
    }

    /// The histogram this histogram is derived from.
    pub fn source(&self) -> &HistogramRef {
        &self.source
    }

    /// Returns an iterator over intervals of this histogram ordered by their lower bound.
    pub fn ranges(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.ranges.iter().map(|(low, high)| (low.0, *high))
    }

    /// Returns the smallest interval that includes all intervals of this histogram.
    pub fn span(&self) -> Option<(f64, f64)> {
        let (low, _) = self.ranges.iter().next()?;
        let (_, high) = self.ranges.iter().next_back()?;
        Some((low.0, *high))
    }

    /// Returns a histogram which support is the union of the support of this histogram and the given range.
    pub fn add_disjunction(&self, range: &StatisticRange) -> Self {
        let mut ranges = self.ranges.clone();
        if let Some((low, high)) = range.bounds() {
            let overlapping = ranges
                .range(..=OrderedFloat(high))
                .filter(|(_, h)| **h >= low)
                .map(|(l, h)| (*l, *h))
                .collect_vec();

            let mut low = low;
            let mut high = high;
            for (l, h) in overlapping {
                ranges.remove(&l);
                low = low.min(l.0);
                high = high.max(h);
            }
            ranges.insert(OrderedFloat(low), high);
        }

        DisjointRangeHistogram {
            source: self.source.clone(),
            ranges,
        }
    }

    /// Returns a histogram which support is the intersection of the support of this histogram and the given range.
    pub fn add_conjunction(&self, range: &StatisticRange) -> Self {
        let ranges = match range.bounds() {
            Some((low, high)) => self
                .ranges
                .iter()
                .map(|(l, h)| (l.0.max(low), h.min(high)))
                .filter(|(l, h)| l <= h)
                .map(|(l, h)| (OrderedFloat(l), h))
                .collect(),
            None => BTreeMap::new(),
        };

        DisjointRangeHistogram {
            source: self.source.clone(),
            ranges,
        }
    }

    fn mass(&self, low: f64, high: f64) -> Estimate {
        let high = self.source.cumulative_probability(high, true);
        let low = self.source.cumulative_probability(low, false);
        high - low
    }

    fn total_mass(&self) -> Estimate {
        self.ranges().fold(Estimate::zero(), |acc, (low, high)| acc + self.mass(low, high))
    }
}

impl PartialEq for DisjointRangeHistogram {
    fn eq(&self, other: &Self) -> bool {
        self.source.equals(other.source.as_ref()) && self.ranges == other.ranges
    }
}

impl Histogram for DisjointRangeHistogram {
    fn cumulative_probability(&self, value: f64, inclusive: bool) -> Estimate {
        if value.is_nan() {
            return Estimate::Unknown;
        }
        let (low, high) = match self.span() {
            Some(span) => span,
            None => return Estimate::zero(),
        };
        if value < low || (value == low && !inclusive) {
            return Estimate::zero();
        }
        if value > high || (value == high && inclusive) {
            return Estimate::Known(1.0);
        }

        let below_value = self
            .ranges()
            .take_while(|(l, _)| *l < value || (inclusive && *l == value))
            .fold(Estimate::zero(), |acc, (l, h)| {
                let mass = if h < value {
                    self.mass(l, h)
                } else {
                    self.source.cumulative_probability(value, inclusive) - self.source.cumulative_probability(l, false)
                };
                acc + mass
            });

        (below_value / self.total_mass()).map(|p| p.min(1.0))
    }

    fn inverse_cumulative_probability(&self, percentile: f64) -> Result<Estimate, StatisticsError> {
        ensure_valid!(
            (0.0..=1.0).contains(&percentile),
            "percentile must be within [0.0, 1.0] range but got: {}",
            percentile
        );
        let (_, span_high) = match self.span() {
            Some(span) => span,
            None => return Ok(Estimate::Unknown),
        };
        let total = match self.total_mass() {
            Estimate::Known(total) if total > 0.0 => total,
            _ => return Ok(Estimate::Unknown),
        };

        let target = percentile * total;
        let mut cumulative = 0.0;
        for (low, high) in self.ranges() {
            let mass = match self.mass(low, high) {
                Estimate::Known(mass) => mass,
                Estimate::Unknown => return Ok(Estimate::Unknown),
            };
            if cumulative + mass >= target {
                let low_probability = match self.source.cumulative_probability(low, false) {
                    Estimate::Known(p) => p,
                    Estimate::Unknown => return Ok(Estimate::Unknown),
                };
                let probability = (low_probability + (target - cumulative)).clamp(0.0, 1.0);
                return self.source.inverse_cumulative_probability(probability);
            }
            cumulative += mass;
        }

        Ok(Estimate::Known(span_high))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equals(&self, other: &dyn Histogram) -> bool {
        other.as_any().downcast_ref::<Self>().map_or(false, |other| self == other)
    }
}

/// Widens the support of the given histogram to include the given range.
///
/// A histogram that is not restricted to a set of ranges already covers every value and is returned as is.
pub fn add_disjunction(histogram: &HistogramRef, range: &StatisticRange) -> HistogramRef {
    match histogram.as_any().downcast_ref::<DisjointRangeHistogram>() {
        Some(disjoint) => Arc::new(disjoint.add_disjunction(range)),
        None => histogram.clone(),
    }
}

/// Narrows the support of the given histogram to its intersection with the given range.
pub fn add_conjunction(histogram: &HistogramRef, range: &StatisticRange) -> HistogramRef {
    match histogram.as_any().downcast_ref::<DisjointRangeHistogram>() {
        Some(disjoint) => Arc::new(disjoint.add_conjunction(range)),
        None => Arc::new(DisjointRangeHistogram::new(histogram.clone(), range)),
    }
}
