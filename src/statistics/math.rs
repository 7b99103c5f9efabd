//! Arithmetic of plan statistics: derives statistics of an operator from statistics of its inputs.

use itertools::Itertools;

use crate::meta::ColumnId;
use crate::options::StatisticsOptions;
use crate::statistics::column::ColumnStatistics;
use crate::statistics::estimate::Estimate;
use crate::statistics::histogram::{DisjointRangeCombinator, HistogramCombinator, HistogramRef, NoHistogramCombinator};
use crate::statistics::plan::{PlanStatistics, PlanStatisticsBuilder};
use crate::statistics::range::{intersect_bounds, StatisticRange};

/// Combines [plan statistics](PlanStatistics) of inputs of an operator that merges, filters or bounds rows.
///
/// All methods are pure functions of their arguments: they never fail and always return new statistics.
/// When the number of rows of any input is unknown the result is [unknown](PlanStatistics::unknown).
#[derive(Debug)]
pub struct StatisticsMath {
    histograms: Box<dyn HistogramCombinator>,
}

/// How ranges of values of columns are combined when rows of two inputs are added together.
#[derive(Debug, Clone, Copy, PartialEq)]
enum RangeAddition {
    SumDistinctValues,
    MaxDistinctValues,
    CollapseDistinctValues,
    Intersect,
}

impl RangeAddition {
    fn apply(&self, left: &StatisticRange, right: &StatisticRange) -> StatisticRange {
        match self {
            RangeAddition::SumDistinctValues => left.add_and_sum_distinct_values(right),
            RangeAddition::MaxDistinctValues => left.add_and_max_distinct_values(right),
            RangeAddition::CollapseDistinctValues => left.add_and_collapse_distinct_values(right),
            RangeAddition::Intersect => left.intersect(right),
        }
    }
}

impl StatisticsMath {
    /// Creates a new instance. If `use_histograms` is `false` derived statistics never contain histograms.
    pub fn new(use_histograms: bool) -> Self {
        StatisticsMath::with_options(&StatisticsOptions::new().with_histograms(use_histograms))
    }

    /// Creates a new instance configured by the given options.
    pub fn with_options(options: &StatisticsOptions) -> Self {
        let histograms: Box<dyn HistogramCombinator> = if options.use_histograms() {
            Box::new(DisjointRangeCombinator)
        } else {
            Box::new(NoHistogramCombinator)
        };
        log::debug!("Statistics math: histograms: {:?}", histograms);

        StatisticsMath { histograms }
    }

    /// Adds rows of two inputs assuming that their sets of values do not overlap.
    pub fn add_stats_and_sum_distinct_values(&self, left: &PlanStatistics, right: &PlanStatistics) -> PlanStatistics {
        self.add_stats(left, right, RangeAddition::SumDistinctValues)
    }

    /// Adds rows of two inputs assuming that the values of one input are a subset of the values of another.
    pub fn add_stats_and_max_distinct_values(&self, left: &PlanStatistics, right: &PlanStatistics) -> PlanStatistics {
        self.add_stats(left, right, RangeAddition::MaxDistinctValues)
    }

    /// Adds rows of two inputs. Distinct values of overlapping parts of ranges of their columns are counted once.
    pub fn add_stats_and_collapse_distinct_values(
        &self,
        left: &PlanStatistics,
        right: &PlanStatistics,
    ) -> PlanStatistics {
        self.add_stats(left, right, RangeAddition::CollapseDistinctValues)
    }

    /// Adds rows of two inputs but restricts the ranges of their columns to the intersection of both ranges.
    pub fn add_stats_and_intersect(&self, left: &PlanStatistics, right: &PlanStatistics) -> PlanStatistics {
        self.add_stats(left, right, RangeAddition::Intersect)
    }

    /// Removes rows described by `subset` from rows described by `superset`.
    ///
    /// The result has the same columns as the `superset`. Bounds of ranges and histograms are kept as is because
    /// it is unknown which values have been removed.
    pub fn subtract_subset_stats(&self, superset: &PlanStatistics, subset: &PlanStatistics) -> PlanStatistics {
        let (superset_rows, subset_rows) = match known_row_counts(superset, subset) {
            Some(row_counts) => row_counts,
            None => return PlanStatistics::unknown(),
        };

        let row_count = (superset_rows - subset_rows).max(0.0);
        let total_size = (superset.total_size() - subset.total_size()).map(|size| size.max(0.0));
        let builder = PlanStatistics::builder().output_row_count(row_count).total_size(total_size);
        let columns = superset.columns_with_known_statistics().collect_vec();

        if row_count == 0.0 {
            log::trace!("Subtract subset: no rows remain");
            return zero_columns(builder, columns);
        }

        columns
            .into_iter()
            .fold(builder, |builder, column| {
                let statistics = self.subtract_column_stats(
                    superset.column_statistics(&column),
                    superset_rows,
                    subset.column_statistics(&column),
                    subset_rows,
                    row_count,
                );
                builder.add_column_statistics(column, statistics)
            })
            .finish()
    }

    /// Bounds statistics by the `cap` statistics which are known to be an upper bound of the actual values.
    ///
    /// The result has the same columns as `stats`. The average size of values of every column is preserved.
    pub fn cap_stats(&self, stats: &PlanStatistics, cap: &PlanStatistics) -> PlanStatistics {
        let (rows, cap_rows) = match known_row_counts(stats, cap) {
            Some(row_counts) => row_counts,
            None => return PlanStatistics::unknown(),
        };

        let row_count = rows.min(cap_rows);
        let total_size = stats.total_size().min(cap.total_size());
        let builder = PlanStatistics::builder().output_row_count(row_count).total_size(total_size);

        stats
            .columns_with_known_statistics()
            .fold(builder, |builder, column| {
                let statistics =
                    self.cap_column_stats(stats.column_statistics(&column), rows, cap.column_statistics(&column), row_count);
                builder.add_column_statistics(column, statistics)
            })
            .finish()
    }

    fn add_stats(&self, left: &PlanStatistics, right: &PlanStatistics, addition: RangeAddition) -> PlanStatistics {
        let (left_rows, right_rows) = match known_row_counts(left, right) {
            Some(row_counts) => row_counts,
            None => return PlanStatistics::unknown(),
        };

        let row_count = left_rows + right_rows;
        let total_size = left.total_size() + right.total_size();
        let builder = PlanStatistics::builder().output_row_count(row_count).total_size(total_size);
        let columns = left
            .columns_with_known_statistics()
            .chain(right.columns_with_known_statistics())
            .unique()
            .collect_vec();

        if row_count == 0.0 {
            log::trace!("Add statistics: both inputs have no rows");
            return zero_columns(builder, columns);
        }

        columns
            .into_iter()
            .fold(builder, |builder, column| {
                let statistics = self.add_column_stats(
                    left.column_statistics(&column),
                    left_rows,
                    right.column_statistics(&column),
                    right_rows,
                    row_count,
                    addition,
                );
                builder.add_column_statistics(column, statistics)
            })
            .finish()
    }

    fn add_column_stats(
        &self,
        left: &ColumnStatistics,
        left_rows: f64,
        right: &ColumnStatistics,
        right_rows: f64,
        row_count: f64,
        addition: RangeAddition,
    ) -> ColumnStatistics {
        let left_nulls = left_rows * left.nulls_fraction();
        let right_nulls = right_rows * right.nulls_fraction();
        let nulls_fraction = (left_nulls + right_nulls) / row_count;

        let left_non_nulls = left_rows - left_nulls;
        let right_non_nulls = right_rows - right_nulls;
        let non_nulls = row_count * (1.0 - nulls_fraction);
        let average_row_size = if non_nulls.is_exactly(0.0) {
            Estimate::zero()
        } else {
            (left_non_nulls * left.average_row_size() + right_non_nulls * right.average_row_size()) / non_nulls
        };

        let range = addition.apply(left.range(), right.range());
        let histogram = match (left.histogram(), right.histogram()) {
            (Some(histogram), Some(_)) => self.add_histograms(histogram, right.range(), addition),
            _ => None,
        };

        ColumnStatistics::builder()
            .nulls_fraction(nulls_fraction)
            .average_row_size(average_row_size)
            .range(range)
            .histogram(histogram)
            .finish()
    }

    fn add_histograms(
        &self,
        histogram: &HistogramRef,
        range: &StatisticRange,
        addition: RangeAddition,
    ) -> Option<HistogramRef> {
        match addition {
            RangeAddition::Intersect => self.histograms.add_conjunction(histogram, range),
            _ => self.histograms.add_disjunction(histogram, range),
        }
    }

    fn subtract_column_stats(
        &self,
        superset: &ColumnStatistics,
        superset_rows: f64,
        subset: &ColumnStatistics,
        subset_rows: f64,
        row_count: f64,
    ) -> ColumnStatistics {
        let superset_nulls = superset_rows * superset.nulls_fraction();
        let subset_nulls = subset_rows * subset.nulls_fraction();
        let nulls = (superset_nulls - subset_nulls).map(|nulls| nulls.max(0.0));
        let nulls_fraction = nulls.map(|nulls| nulls.min(row_count)) / row_count;

        let distinct_values = match (superset.distinct_values(), subset.distinct_values()) {
            (Estimate::Known(superset_values), Estimate::Known(_)) if superset_values == 0.0 => Estimate::zero(),
            (Estimate::Known(superset_values), Estimate::Known(subset_values)) if subset_values == 0.0 => {
                Estimate::Known(superset_values)
            }
            (Estimate::Known(superset_values), Estimate::Known(subset_values)) => {
                let superset_rows_per_value = (superset_rows - superset_nulls) / superset_values;
                let subset_rows_per_value = (subset_rows - subset_nulls) / subset_values;
                match (superset_rows_per_value, subset_rows_per_value) {
                    (Estimate::Known(superset_rows), Estimate::Known(subset_rows)) if superset_rows <= subset_rows => {
                        Estimate::Known((superset_values - subset_values).max(0.0))
                    }
                    _ => Estimate::Known(superset_values),
                }
            }
            _ => Estimate::Unknown,
        };

        let range = superset.range().subtract_subrange(subset.range()).with_distinct_values(distinct_values);
        let histogram = superset.histogram().and_then(|histogram| self.histograms.retain(histogram));

        ColumnStatistics::builder()
            .nulls_fraction(nulls_fraction)
            .average_row_size(superset.average_row_size())
            .range(range)
            .histogram(histogram)
            .finish()
    }

    fn cap_column_stats(
        &self,
        stats: &ColumnStatistics,
        rows: f64,
        cap: &ColumnStatistics,
        row_count: f64,
    ) -> ColumnStatistics {
        let distinct_values = stats.distinct_values().min(cap.distinct_values());
        let bounds = intersect_bounds(stats.range().bounds(), cap.range().bounds());
        let range = StatisticRange::from_parts(bounds, distinct_values);

        let nulls_fraction = if row_count == 0.0 {
            Estimate::Known(1.0)
        } else if cap.nulls_fraction().is_unknown() {
            Estimate::Unknown
        } else {
            (rows * stats.nulls_fraction() / row_count).map(|fraction| fraction.min(1.0))
        };
        let histogram = stats.histogram().and_then(|histogram| self.histograms.add_conjunction(histogram, cap.range()));

        ColumnStatistics::builder()
            .nulls_fraction(nulls_fraction)
            .average_row_size(stats.average_row_size())
            .range(range)
            .histogram(histogram)
            .finish()
    }
}

fn known_row_counts(left: &PlanStatistics, right: &PlanStatistics) -> Option<(f64, f64)> {
    match (left.output_row_count(), right.output_row_count()) {
        (Estimate::Known(left), Estimate::Known(right)) => Some((left, right)),
        _ => {
            log::trace!("Row count is unknown: {} {}", left.output_row_count(), right.output_row_count());
            None
        }
    }
}

fn zero_columns(builder: PlanStatisticsBuilder, columns: Vec<ColumnId>) -> PlanStatistics {
    columns
        .into_iter()
        .fold(builder, |builder, column| builder.add_column_statistics(column, ColumnStatistics::zero()))
        .finish()
}
