//! Statistics of operators of a query plan and arithmetic over them.
//!
//! Statistics are estimates: every number may be [unknown](Estimate::Unknown). Statistics of leaf operators are
//! provided by a catalog and statistics of other operators are derived from statistics of their inputs
//! via [StatisticsMath].

pub mod column;
pub mod estimate;
pub mod histogram;
pub mod math;
pub mod plan;
pub mod range;

pub use column::{ColumnStatistics, ColumnStatisticsBuilder};
pub use estimate::Estimate;
pub use histogram::{Histogram, HistogramRef};
pub use math::StatisticsMath;
pub use plan::{PlanStatistics, PlanStatisticsBuilder};
pub use range::StatisticRange;
