use std::fmt::{Display, Formatter};

use crate::error::{ensure_valid, StatisticsError};
use crate::statistics::estimate::Estimate;
use crate::statistics::histogram::HistogramRef;
use crate::statistics::range::StatisticRange;

/// Statistics of a single column produced by an operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStatistics {
    nulls_fraction: Estimate,
    average_row_size: Estimate,
    range: StatisticRange,
    histogram: Option<HistogramRef>,
}

/// Statistics of a column nothing is known about.
pub(crate) static UNKNOWN_COLUMN_STATISTICS: ColumnStatistics = ColumnStatistics::unknown();

impl ColumnStatistics {
    /// Statistics of a column nothing is known about.
    pub const fn unknown() -> Self {
        ColumnStatistics {
            nulls_fraction: Estimate::Unknown,
            average_row_size: Estimate::Unknown,
            range: StatisticRange::unknown(),
            histogram: None,
        }
    }

    /// Statistics of a column that has no rows.
    pub const fn zero() -> Self {
        ColumnStatistics {
            nulls_fraction: Estimate::Known(1.0),
            average_row_size: Estimate::zero(),
            range: StatisticRange::empty(),
            histogram: None,
        }
    }

    /// Creates a builder of column statistics. All statistics of a new builder are unknown.
    pub fn builder() -> ColumnStatisticsBuilder {
        ColumnStatisticsBuilder::new()
    }

    /// Creates a builder that is initialised with these statistics.
    pub fn to_builder(&self) -> ColumnStatisticsBuilder {
        ColumnStatisticsBuilder {
            nulls_fraction: self.nulls_fraction,
            average_row_size: self.average_row_size,
            range: self.range,
            histogram: self.histogram.clone(),
        }
    }

    /// The fraction of rows where the value of this column is `NULL`.
    pub fn nulls_fraction(&self) -> Estimate {
        self.nulls_fraction
    }

    /// The fraction of rows where the value of this column is not `NULL`.
    pub fn values_fraction(&self) -> Estimate {
        1.0 - self.nulls_fraction
    }

    /// The average size of a non-null value of this column (in bytes).
    pub fn average_row_size(&self) -> Estimate {
        self.average_row_size
    }

    /// The range of values of this column.
    pub fn range(&self) -> &StatisticRange {
        &self.range
    }

    /// The estimated number of distinct values of this column.
    pub fn distinct_values(&self) -> Estimate {
        self.range.distinct_values()
    }

    /// The smallest value of this column or `None` if this column has no values.
    pub fn low(&self) -> Option<f64> {
        self.range.low()
    }

    /// The largest value of this column or `None` if this column has no values.
    pub fn high(&self) -> Option<f64> {
        self.range.high()
    }

    pub fn histogram(&self) -> Option<&HistogramRef> {
        self.histogram.as_ref()
    }

    /// Returns `true` if all non-null values of this column are equal.
    pub fn is_single_value(&self) -> bool {
        matches!(self.range.bounds(), Some((low, high)) if low == high)
    }

    /// Returns `true` if nothing is known about this column.
    pub fn is_unknown(&self) -> bool {
        self == &UNKNOWN_COLUMN_STATISTICS
    }
}

impl Display for ColumnStatistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{nulls: {}, size: {}, range: {}",
            self.nulls_fraction, self.average_row_size, self.range
        )?;
        if self.histogram.is_some() {
            write!(f, ", histogram")?;
        }
        write!(f, "}}")
    }
}

/// A builder to create instances of [column statistics](ColumnStatistics).
#[derive(Debug, Clone)]
pub struct ColumnStatisticsBuilder {
    nulls_fraction: Estimate,
    average_row_size: Estimate,
    range: StatisticRange,
    histogram: Option<HistogramRef>,
}

impl ColumnStatisticsBuilder {
    /// Creates a builder where all statistics are unknown.
    pub fn new() -> Self {
        ColumnStatistics::unknown().to_builder()
    }

    /// Sets the fraction of `NULL` values.
    pub fn nulls_fraction<T>(mut self, nulls_fraction: T) -> Self
    where
        T: Into<Estimate>,
    {
        self.nulls_fraction = nulls_fraction.into();
        self
    }

    /// Sets the average size of a non-null value.
    pub fn average_row_size<T>(mut self, average_row_size: T) -> Self
    where
        T: Into<Estimate>,
    {
        self.average_row_size = average_row_size.into();
        self
    }

    /// Sets the range of values (bounds and the number of distinct values).
    pub fn range(mut self, range: StatisticRange) -> Self {
        self.range = range;
        self
    }

    /// Sets the number of distinct values. Has no effect if the range is empty.
    pub fn distinct_values<T>(mut self, distinct_values: T) -> Self
    where
        T: Into<Estimate>,
    {
        self.range = self.range.with_distinct_values(distinct_values.into());
        self
    }

    pub fn histogram(mut self, histogram: Option<HistogramRef>) -> Self {
        self.histogram = histogram;
        self
    }

    /// Creates an instance of [column statistics](ColumnStatistics) with previously specified properties.
    ///
    /// Returns an error if the nulls fraction lies outside of `[0.0, 1.0]` bounds or the average row size is negative.
    pub fn build(self) -> Result<ColumnStatistics, StatisticsError> {
        ensure_valid!(
            self.nulls_fraction.value().map_or(true, |v| (0.0..=1.0).contains(&v)),
            "nulls fraction must be within [0.0, 1.0] range but got: {}",
            self.nulls_fraction
        );
        ensure_valid!(
            self.average_row_size.value().map_or(true, |v| v >= 0.0),
            "average row size must be non negative but got: {}",
            self.average_row_size
        );

        Ok(self.finish())
    }

    /// Creates column statistics without checking their invariants.
    pub(crate) fn finish(self) -> ColumnStatistics {
        ColumnStatistics {
            nulls_fraction: self.nulls_fraction,
            average_row_size: self.average_row_size,
            range: self.range,
            histogram: self.histogram,
        }
    }
}

impl Default for ColumnStatisticsBuilder {
    fn default() -> Self {
        ColumnStatisticsBuilder::new()
    }
}
