use std::any::Any;

use crate::error::{ensure_valid, StatisticsError};
use crate::statistics::estimate::Estimate;
use crate::statistics::histogram::Histogram;
use crate::statistics::range::StatisticRange;

/// A histogram of values that are uniformly distributed between the bounds of a range.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDistributionHistogram {
    bounds: Option<(f64, f64)>,
}

impl UniformDistributionHistogram {
    /// Creates a histogram of values distributed over `[low, high]`.
    pub fn new(low: f64, high: f64) -> Result<Self, StatisticsError> {
        ensure_valid!(!low.is_nan() && !high.is_nan(), "histogram bounds must not be NaN: [{}, {}]", low, high);
        ensure_valid!(low <= high, "low must be less than or equal to high but got: [{}, {}]", low, high);

        Ok(UniformDistributionHistogram {
            bounds: Some((low, high)),
        })
    }

    /// Creates a histogram that spans the given range. A histogram over the empty range has no distribution.
    pub fn from_range(range: &StatisticRange) -> Self {
        UniformDistributionHistogram { bounds: range.bounds() }
    }
}

impl Histogram for UniformDistributionHistogram {
    fn cumulative_probability(&self, value: f64, inclusive: bool) -> Estimate {
        let (low, high) = match self.bounds {
            Some(bounds) if !value.is_nan() => bounds,
            _ => return Estimate::Unknown,
        };

        // all values are equal to the single point.
        if low == high && value == low {
            Estimate::Known(if inclusive { 1.0 } else { 0.0 })
        } else if value >= high {
            Estimate::Known(1.0)
        } else if value <= low {
            Estimate::Known(0.0)
        } else if low.is_infinite() || high.is_infinite() {
            Estimate::Unknown
        } else {
            Estimate::Known(((value - low) / (high - low)).clamp(0.0, 1.0))
        }
    }

    fn inverse_cumulative_probability(&self, percentile: f64) -> Result<Estimate, StatisticsError> {
        ensure_valid!(
            (0.0..=1.0).contains(&percentile),
            "percentile must be within [0.0, 1.0] range but got: {}",
            percentile
        );
        let (low, high) = match self.bounds {
            Some(bounds) => bounds,
            None => return Ok(Estimate::Unknown),
        };

        let value = if percentile == 0.0 && low.is_finite() {
            Estimate::Known(low)
        } else if percentile == 1.0 && high.is_finite() {
            Estimate::Known(high)
        } else if low.is_infinite() || high.is_infinite() {
            Estimate::Unknown
        } else {
            Estimate::Known(low + percentile * (high - low))
        };
        Ok(value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equals(&self, other: &dyn Histogram) -> bool {
        other.as_any().downcast_ref::<Self>().map_or(false, |other| self == other)
    }
}
