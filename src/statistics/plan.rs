use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::error::{ensure_valid, StatisticsError};
use crate::meta::{ColumnId, ColumnWidth};
use crate::statistics::column::{ColumnStatistics, UNKNOWN_COLUMN_STATISTICS};
use crate::statistics::estimate::Estimate;

/// Statistics of an operator (a node of a query plan): the number of rows it produces,
/// the total size of these rows and statistics of its columns.
///
/// A column that has no statistics is treated exactly as a column which statistics are
/// [unknown](ColumnStatistics::unknown).
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStatistics {
    output_row_count: Estimate,
    total_size: Estimate,
    columns: HashMap<ColumnId, ColumnStatistics>,
}

impl PlanStatistics {
    /// Statistics nothing is known about.
    pub fn unknown() -> Self {
        PlanStatistics {
            output_row_count: Estimate::Unknown,
            total_size: Estimate::Unknown,
            columns: HashMap::new(),
        }
    }

    /// Creates a builder of plan statistics. All statistics of a new builder are unknown.
    pub fn builder() -> PlanStatisticsBuilder {
        PlanStatisticsBuilder::new()
    }

    /// Creates a builder that is initialised with these statistics.
    pub fn to_builder(&self) -> PlanStatisticsBuilder {
        PlanStatisticsBuilder {
            output_row_count: self.output_row_count,
            total_size: self.total_size,
            columns: self.columns.clone(),
        }
    }

    /// The estimated number of rows returned by an operator.
    pub fn output_row_count(&self) -> Estimate {
        self.output_row_count
    }

    /// The estimated total size of rows returned by an operator (in bytes).
    pub fn total_size(&self) -> Estimate {
        self.total_size
    }

    pub fn is_output_row_count_unknown(&self) -> bool {
        self.output_row_count.is_unknown()
    }

    /// Returns `true` if nothing is known about an operator.
    pub fn is_unknown(&self) -> bool {
        self.output_row_count.is_unknown()
            && self.total_size.is_unknown()
            && self.columns.values().all(|c| c.is_unknown())
    }

    /// Returns statistics of the given column.
    /// If there are no statistics for the given column this method returns [unknown](ColumnStatistics::unknown) statistics.
    pub fn column_statistics(&self, column: &ColumnId) -> &ColumnStatistics {
        self.columns.get(column).unwrap_or(&UNKNOWN_COLUMN_STATISTICS)
    }

    /// Returns an iterator over columns that have statistics (in no particular order).
    pub fn columns_with_known_statistics(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.columns.keys().copied()
    }

    /// Returns a copy of these statistics where the output row count is replaced with
    /// the result of the given function.
    ///
    /// Returns an error if the new row count is negative.
    pub fn map_output_row_count<F>(&self, f: F) -> Result<PlanStatistics, StatisticsError>
    where
        F: FnOnce(Estimate) -> Estimate,
    {
        let output_row_count = f(self.output_row_count);
        self.to_builder().output_row_count(output_row_count).build()
    }

    /// Returns a copy of these statistics where statistics of the given column are replaced with
    /// the result of the given function.
    pub fn map_column_statistics<F>(&self, column: ColumnId, f: F) -> PlanStatistics
    where
        F: FnOnce(&ColumnStatistics) -> ColumnStatistics,
    {
        let statistics = f(self.column_statistics(&column));
        self.to_builder().add_column_statistics(column, statistics).finish()
    }

    /// Estimates the size of the output of an operator that produces the given columns (in bytes).
    ///
    /// The size of a column includes a byte per row for a null flag and
    /// an offset per row for [variable-width](ColumnWidth::Variable) columns.
    /// When the average size of values of a column is unknown the [default size](ColumnWidth::default_value_size) is used.
    pub fn output_size_in_bytes(&self, columns: &[(ColumnId, ColumnWidth)]) -> Estimate {
        columns.iter().fold(Estimate::zero(), |acc, (column, width)| {
            acc + self.output_size_of_column(self.column_statistics(column), width)
        })
    }

    fn output_size_of_column(&self, statistics: &ColumnStatistics, width: &ColumnWidth) -> Estimate {
        let row_count = self.output_row_count;
        let nulls_fraction = statistics.nulls_fraction().unwrap_or(0.0);
        let average_row_size = statistics.average_row_size().unwrap_or(width.default_value_size());
        let non_null_row_count = row_count * (1.0 - nulls_fraction);

        let mut output_size = non_null_row_count * average_row_size;
        // "is null" flags
        output_size = output_size + row_count * std::mem::size_of::<u8>() as f64;
        if let ColumnWidth::Variable = width {
            output_size = output_size + row_count * width.offset_size();
        }
        output_size
    }
}

impl Display for PlanStatistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{rows: {}, size: {}", self.output_row_count, self.total_size)?;
        if !self.columns.is_empty() {
            let columns = self
                .columns
                .iter()
                .sorted_by_key(|(id, _)| **id)
                .map(|(id, stats)| format!("{}: {}", id, stats))
                .join(", ");
            write!(f, ", columns: [{}]", columns)?;
        }
        write!(f, "}}")
    }
}

/// A builder to create instances of [plan statistics](PlanStatistics).
#[derive(Debug, Clone)]
pub struct PlanStatisticsBuilder {
    output_row_count: Estimate,
    total_size: Estimate,
    columns: HashMap<ColumnId, ColumnStatistics>,
}

impl PlanStatisticsBuilder {
    /// Creates a builder where all statistics are unknown.
    pub fn new() -> Self {
        PlanStatisticsBuilder {
            output_row_count: Estimate::Unknown,
            total_size: Estimate::Unknown,
            columns: HashMap::new(),
        }
    }

    /// Sets the number of rows returned by an operator.
    pub fn output_row_count<T>(mut self, output_row_count: T) -> Self
    where
        T: Into<Estimate>,
    {
        self.output_row_count = output_row_count.into();
        self
    }

    /// Sets the total size of rows returned by an operator.
    pub fn total_size<T>(mut self, total_size: T) -> Self
    where
        T: Into<Estimate>,
    {
        self.total_size = total_size.into();
        self
    }

    /// Adds statistics of the given column. Replaces existing statistics of that column.
    pub fn add_column_statistics(mut self, column: ColumnId, statistics: ColumnStatistics) -> Self {
        self.columns.insert(column, statistics);
        self
    }

    /// Creates an instance of [plan statistics](PlanStatistics) with previously specified properties.
    ///
    /// Returns an error if the output row count or the total size is negative.
    pub fn build(self) -> Result<PlanStatistics, StatisticsError> {
        ensure_valid!(
            self.output_row_count.value().map_or(true, |v| v >= 0.0),
            "output row count must be non negative but got: {}",
            self.output_row_count
        );
        ensure_valid!(
            self.total_size.value().map_or(true, |v| v >= 0.0),
            "total size must be non negative but got: {}",
            self.total_size
        );

        Ok(self.finish())
    }

    /// Creates plan statistics without checking their invariants.
    pub(crate) fn finish(self) -> PlanStatistics {
        PlanStatistics {
            output_row_count: self.output_row_count,
            total_size: self.total_size,
            columns: self.columns,
        }
    }
}

impl Default for PlanStatisticsBuilder {
    fn default() -> Self {
        PlanStatisticsBuilder::new()
    }
}

#[cfg(test)]
mod test {
    use itertools::Itertools;

    use crate::meta::ColumnWidth;
    use crate::statistics::column::ColumnStatistics;
    use crate::statistics::estimate::Estimate;
    use crate::statistics::plan::PlanStatistics;
    use crate::statistics::range::StatisticRange;

    fn column(nulls_fraction: f64, average_row_size: f64) -> ColumnStatistics {
        ColumnStatistics::builder()
            .nulls_fraction(nulls_fraction)
            .average_row_size(average_row_size)
            .range(StatisticRange::new(0.0, 100.0, 10.0).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn unknown_statistics() {
        let stats = PlanStatistics::unknown();

        assert!(stats.is_unknown());
        assert!(stats.is_output_row_count_unknown());
        assert_eq!(stats.total_size(), Estimate::Unknown);
        assert_eq!(stats.columns_with_known_statistics().count(), 0);
        assert_eq!(stats, PlanStatistics::builder().build().unwrap());
    }

    #[test]
    fn absent_column_is_unknown() {
        let stats = PlanStatistics::builder()
            .output_row_count(10.0)
            .add_column_statistics(1, column(0.1, 4.0))
            .build()
            .unwrap();

        assert!(stats.column_statistics(&2).is_unknown());
        assert_eq!(stats.column_statistics(&2), &ColumnStatistics::unknown());
        assert_eq!(stats.column_statistics(&1), &column(0.1, 4.0));
        assert_eq!(stats.columns_with_known_statistics().collect_vec(), vec![1]);
        assert!(!stats.is_unknown());
    }

    #[test]
    fn unknown_columns_do_not_make_statistics_known() {
        let stats = PlanStatistics::builder()
            .add_column_statistics(1, ColumnStatistics::unknown())
            .build()
            .unwrap();

        assert!(stats.is_unknown());
    }

    #[test]
    fn reject_invalid_statistics() {
        assert!(PlanStatistics::builder().output_row_count(-1.0).build().is_err(), "negative row count");
        assert!(PlanStatistics::builder().total_size(-1.0).build().is_err(), "negative total size");
        assert!(PlanStatistics::builder().output_row_count(0.0).total_size(0.0).build().is_ok());
    }

    #[test]
    fn map_output_row_count() {
        let stats = PlanStatistics::builder().output_row_count(10.0).build().unwrap();

        let doubled = stats.map_output_row_count(|rows| rows * 2.0).unwrap();
        assert_eq!(doubled.output_row_count(), Estimate::Known(20.0));

        assert!(stats.map_output_row_count(|rows| rows - 20.0).is_err());
    }

    #[test]
    fn map_column_statistics() {
        let stats = PlanStatistics::builder()
            .output_row_count(10.0)
            .add_column_statistics(1, column(0.1, 4.0))
            .build()
            .unwrap();

        let stats = stats.map_column_statistics(1, |c| c.to_builder().nulls_fraction(0.5).build().unwrap());
        assert_eq!(stats.column_statistics(&1).nulls_fraction(), Estimate::Known(0.5));

        let stats = stats.map_column_statistics(2, |c| c.to_builder().average_row_size(2.0).build().unwrap());
        assert_eq!(stats.column_statistics(&2).average_row_size(), Estimate::Known(2.0));
        assert_eq!(stats.column_statistics(&2).nulls_fraction(), Estimate::Unknown);
    }

    #[test]
    fn output_size_in_bytes() {
        let stats = PlanStatistics::builder()
            .output_row_count(100.0)
            .add_column_statistics(1, column(0.5, 4.0))
            .add_column_statistics(2, column(0.0, 10.0))
            .build()
            .unwrap();

        // 50 * 4 + 100
        assert_eq!(stats.output_size_in_bytes(&[(1, ColumnWidth::Fixed(4.0))]), Estimate::Known(300.0));
        // 100 * 10 + 100 + 400
        assert_eq!(stats.output_size_in_bytes(&[(2, ColumnWidth::Variable)]), Estimate::Known(1500.0));
        // unknown column: 100 * 8 + 100
        assert_eq!(stats.output_size_in_bytes(&[(3, ColumnWidth::Fixed(8.0))]), Estimate::Known(900.0));
        // unknown column: 100 * 50 + 100 + 400
        assert_eq!(stats.output_size_in_bytes(&[(3, ColumnWidth::Variable)]), Estimate::Known(5500.0));

        let all = [(1, ColumnWidth::Fixed(4.0)), (2, ColumnWidth::Variable)];
        assert_eq!(stats.output_size_in_bytes(&all), Estimate::Known(1800.0));
        assert_eq!(stats.output_size_in_bytes(&[]), Estimate::Known(0.0));

        let unknown = PlanStatistics::unknown();
        assert_eq!(unknown.output_size_in_bytes(&all), Estimate::Unknown);
    }

    #[test]
    fn display() {
        let stats = PlanStatistics::builder()
            .output_row_count(10.0)
            .total_size(100.0)
            .add_column_statistics(2, column(0.0, 4.0))
            .add_column_statistics(1, ColumnStatistics::zero())
            .build()
            .unwrap();

        assert_eq!(
            format!("{}", stats),
            "{rows: 10, size: 100, columns: [1: {nulls: 1, size: 0, range: empty}, 2: {nulls: 0, size: 4, range: [0, 100] ndv: 10}]}"
        );
        assert_eq!(format!("{}", PlanStatistics::unknown()), "{rows: ?, size: ?}");
    }
}
