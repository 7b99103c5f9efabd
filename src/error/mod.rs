//! Error types.

use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// The error type used when statistics are constructed.
///
/// Combinators of [StatisticsMath](crate::statistics::math::StatisticsMath) never return errors.
/// Malformed statistics are rejected when they are built.
#[derive(Debug)]
pub enum StatisticsError {
    /// This error indicates that a statistics value violates one of its invariants
    /// (a negative row count, a fraction outside of `[0.0, 1.0]`, an inverted range, etc).
    InvalidStatistics(InvalidStatisticsError),
}

impl StatisticsError {
    /// Creates an [invalid statistics error](StatisticsError::InvalidStatistics).
    /// This method is a shorthand for `StatisticsError::InvalidStatistics(InvalidStatisticsError::new(message))`.
    pub fn invalid<T>(message: T) -> StatisticsError
    where
        T: Into<String>,
    {
        StatisticsError::InvalidStatistics(InvalidStatisticsError::new(message))
    }
}

impl Display for StatisticsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatisticsError::InvalidStatistics(err) => write!(f, "Invalid statistics: {}", err),
        }
    }
}

impl Error for StatisticsError {}

impl From<InvalidStatisticsError> for StatisticsError {
    fn from(err: InvalidStatisticsError) -> Self {
        StatisticsError::InvalidStatistics(err)
    }
}

/// Invalid statistics error. See [StatisticsError::InvalidStatistics].
pub struct InvalidStatisticsError {
    message: String,
    backtrace: Backtrace,
}

impl InvalidStatisticsError {
    /// Creates a new instance of an [InvalidStatisticsError].
    /// This method captures a backtrace.
    pub fn new<T>(message: T) -> Self
    where
        T: Into<String>,
    {
        InvalidStatisticsError {
            message: message.into(),
            backtrace: Backtrace::new(),
        }
    }

    /// Returns the message of this error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the backtrace captured when this error has been created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl Debug for InvalidStatisticsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidStatisticsError").field("message", &self.message).finish()
    }
}

impl Display for InvalidStatisticsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.message)
    }
}

/// Returns an [invalid statistics error](StatisticsError::InvalidStatistics) if the given condition does not hold.
macro_rules! ensure_valid {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::StatisticsError::invalid(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_valid;
