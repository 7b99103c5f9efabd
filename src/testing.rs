use std::sync::{Arc, Once};

use serde::{Deserialize, Serialize};

use crate::meta::ColumnId;
use crate::statistics::column::ColumnStatistics;
use crate::statistics::estimate::Estimate;
use crate::statistics::histogram::disjoint::add_conjunction;
use crate::statistics::histogram::{HistogramRef, UniformDistributionHistogram};
use crate::statistics::plan::PlanStatistics;
use crate::statistics::range::StatisticRange;

static INIT_LOG: Once = Once::new();

/// The column statistics created by [statistics] are stored under.
pub const COLUMN: ColumnId = 1;

pub fn init_logging() {
    INIT_LOG.call_once(pretty_env_logger::init);
}

/// Creates a range. If one of the bounds is `NaN` returns the empty range.
pub fn range(low: f64, high: f64, distinct_values: f64) -> StatisticRange {
    if low.is_nan() || high.is_nan() {
        StatisticRange::empty()
    } else {
        StatisticRange::new(low, high, distinct_values).expect("invalid range")
    }
}

/// Creates a range `(-inf, +inf)`.
pub fn open_range(distinct_values: f64) -> StatisticRange {
    StatisticRange::open(distinct_values).expect("invalid range")
}

/// Creates plan statistics with a single column [COLUMN]. `NaN` means unknown.
///
/// The column has a histogram of values uniformly distributed over the given range.
pub fn statistics(
    row_count: f64,
    total_size: f64,
    nulls_fraction: f64,
    average_row_size: f64,
    range: StatisticRange,
) -> PlanStatistics {
    let source: HistogramRef = Arc::new(UniformDistributionHistogram::from_range(&range));
    let histogram = add_conjunction(&source, &range);
    let column = ColumnStatistics::builder()
        .nulls_fraction(nulls_fraction)
        .average_row_size(average_row_size)
        .range(range)
        .histogram(Some(histogram))
        .build()
        .expect("invalid column statistics");

    PlanStatistics::builder()
        .output_row_count(row_count)
        .total_size(total_size)
        .add_column_statistics(COLUMN, column)
        .build()
        .expect("invalid plan statistics")
}

/// An operation of [StatisticsMath](crate::statistics::math::StatisticsMath).
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MathOperation {
    SumDistinctValues,
    MaxDistinctValues,
    CollapseDistinctValues,
    Intersect,
    SubtractSubset,
    Cap,
}

/// A test case of statistics arithmetic.
#[derive(Debug)]
pub struct MathTestCase {
    pub name: String,
    pub operation: MathOperation,
    pub left: PlanStatistics,
    pub right: PlanStatistics,
    pub expected: MathExpectation,
}

/// A range of values: either `[low, high, distinct values]` or `empty`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum TestRange {
    Bounds(f64, f64, f64),
    Named(String),
}

impl TestRange {
    fn to_range(&self) -> Result<StatisticRange, String> {
        match self {
            TestRange::Bounds(low, high, distinct_values) => {
                StatisticRange::new(*low, *high, *distinct_values).map_err(|e| e.to_string())
            }
            TestRange::Named(name) if name == "empty" => Ok(StatisticRange::empty()),
            TestRange::Named(name) => Err(format!("Unexpected range: {}", name)),
        }
    }
}

/// Inputs of a test case. `.nan` means unknown. A missing range is an unknown range.
#[derive(Debug, Deserialize, Serialize)]
struct TestStatistics {
    rows: f64,
    #[serde(default = "unknown_value")]
    total_size: f64,
    #[serde(default = "unknown_value")]
    nulls: f64,
    #[serde(default = "unknown_value")]
    size: f64,
    range: Option<TestRange>,
}

impl TestStatistics {
    fn to_statistics(&self) -> Result<PlanStatistics, String> {
        let range = match &self.range {
            Some(range) => range.to_range()?,
            None => StatisticRange::unknown(),
        };
        Ok(statistics(self.rows, self.total_size, self.nulls, self.size, range))
    }
}

fn unknown_value() -> f64 {
    f64::NAN
}

/// The expected result of a test case. Only the specified properties are checked. `.nan` means unknown.
#[derive(Debug, Deserialize, Serialize)]
pub struct MathExpectation {
    rows: Option<f64>,
    total_size: Option<f64>,
    nulls: Option<f64>,
    size: Option<f64>,
    distinct_values: Option<f64>,
    range: Option<TestRange>,
    #[serde(default)]
    unknown: bool,
}

impl MathExpectation {
    /// Compares the given statistics with this expectation and returns a list of mismatches.
    pub fn check(&self, actual: &PlanStatistics) -> Vec<String> {
        let mut errors = Vec::new();
        let column = actual.column_statistics(&COLUMN);

        if self.unknown && actual != &PlanStatistics::unknown() {
            errors.push(format!("Expected unknown statistics but got: {}", actual));
        }
        check_value(&mut errors, "rows", self.rows, actual.output_row_count());
        check_value(&mut errors, "total size", self.total_size, actual.total_size());
        check_value(&mut errors, "nulls fraction", self.nulls, column.nulls_fraction());
        check_value(&mut errors, "average row size", self.size, column.average_row_size());
        check_value(&mut errors, "distinct values", self.distinct_values, column.distinct_values());

        if let Some(range) = &self.range {
            match range.to_range() {
                Ok(expected) if &expected == column.range() => {}
                Ok(expected) => errors.push(format!("range. Expected: {} Actual: {}", expected, column.range())),
                Err(err) => errors.push(err),
            }
        }
        errors
    }
}

fn check_value(errors: &mut Vec<String>, name: &str, expected: Option<f64>, actual: Estimate) {
    if let Some(expected) = expected.map(Estimate::new) {
        if expected != actual {
            errors.push(format!("{}. Expected: {} Actual: {}", name, expected, actual))
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct TestCase {
    name: String,
    operation: MathOperation,
    left: TestStatistics,
    right: TestStatistics,
    expect: MathExpectation,
}

/// Reads a YAML-document that contains multiple test cases separated by `---`.
pub fn parse_math_test_cases(str: &str) -> Result<Vec<MathTestCase>, String> {
    let mut buf = String::new();
    let mut test_cases = vec![];

    for line in str.lines().chain(std::iter::once("---")) {
        if line.trim_end() == "---" {
            if !buf.trim().is_empty() {
                test_cases.push(parse_math_test_case(&buf)?);
            }
            buf.clear();
        } else {
            buf.push_str(line);
            buf.push('\n');
        }
    }

    if test_cases.is_empty() {
        Err("No test cases".to_string())
    } else {
        Ok(test_cases)
    }
}

fn parse_math_test_case(buf: &str) -> Result<MathTestCase, String> {
    let test_case: TestCase =
        serde_yaml::from_str(buf).map_err(|e| format!("Unable to parse a test case: {}\n\nError: {}", buf, e))?;

    Ok(MathTestCase {
        left: test_case.left.to_statistics().map_err(|e| format!("{}: left: {}", test_case.name, e))?,
        right: test_case.right.to_statistics().map_err(|e| format!("{}: right: {}", test_case.name, e))?,
        name: test_case.name,
        operation: test_case.operation,
        expected: test_case.expect,
    })
}

#[cfg(test)]
mod test {
    use crate::statistics::estimate::Estimate;
    use crate::testing::{parse_math_test_cases, MathOperation, COLUMN};

    #[test]
    fn parse_test_cases() {
        let test_cases = parse_math_test_cases(
            r#"
name: first
operation: cap
left:
  rows: 10
  nulls: 0.5
  range: [0, 10, 5]
right:
  rows: .nan
  range: empty
expect:
  unknown: true
---
name: second
operation: sum_distinct_values
left: { rows: 1 }
right: { rows: 2, size: 4 }
expect: { rows: 3 }
"#,
        )
        .unwrap();

        assert_eq!(test_cases.len(), 2);

        let first = &test_cases[0];
        assert_eq!(first.name, "first");
        assert!(matches!(first.operation, MathOperation::Cap));
        assert_eq!(first.left.output_row_count(), Estimate::Known(10.0));
        assert_eq!(first.left.column_statistics(&COLUMN).nulls_fraction(), Estimate::Known(0.5));
        assert_eq!(first.left.column_statistics(&COLUMN).high(), Some(10.0));
        assert_eq!(first.right.output_row_count(), Estimate::Unknown);
        assert!(first.right.column_statistics(&COLUMN).range().is_empty());

        let second = &test_cases[1];
        assert!(matches!(second.operation, MathOperation::SumDistinctValues));
        assert_eq!(second.right.column_statistics(&COLUMN).average_row_size(), Estimate::Known(4.0));
        assert_eq!(second.left.column_statistics(&COLUMN).distinct_values(), Estimate::Unknown);
    }

    #[test]
    fn reject_invalid_test_cases() {
        assert!(parse_math_test_cases("").is_err(), "no test cases");

        let invalid_range = r#"
name: invalid
operation: cap
left: { rows: 1, range: [10, 0, 1] }
right: { rows: 1 }
expect: { rows: 1 }
"#;
        assert!(parse_math_test_cases(invalid_range).is_err(), "invalid range");
    }
}
