use std::fmt::{Display, Formatter};
use std::ops::{Add, Div, Mul, Sub};

/// A numeric statistic that is either known or unknown.
///
/// An unknown operand of any arithmetic operation makes the result unknown.
/// A `Known` estimate never holds `NaN`: operations that produce `NaN` (`0/0`, `inf - inf`, etc)
/// produce [Estimate::Unknown] instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate {
    /// The value of a statistic.
    Known(f64),
    /// No information is available.
    Unknown,
}

impl Estimate {
    /// Creates a new estimate. `NaN` is converted to [Estimate::Unknown].
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Estimate::Unknown
        } else {
            Estimate::Known(value)
        }
    }

    /// Creates an estimate from an optional value.
    pub fn from_option(value: Option<f64>) -> Self {
        value.map(Estimate::new).unwrap_or(Estimate::Unknown)
    }

    /// Zero.
    pub const fn zero() -> Self {
        Estimate::Known(0.0)
    }

    /// Returns the value of this estimate or `None` if it is unknown.
    pub fn value(&self) -> Option<f64> {
        match self {
            Estimate::Known(value) => Some(*value),
            Estimate::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Estimate::Known(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Estimate::Unknown)
    }

    /// Returns the value of this estimate or the given default if the estimate is unknown.
    pub fn unwrap_or(&self, default: f64) -> f64 {
        self.value().unwrap_or(default)
    }

    /// Returns `true` if this estimate is known and equal to the given value.
    pub fn is_exactly(&self, value: f64) -> bool {
        self.value() == Some(value)
    }

    /// Applies the given function to the value of this estimate.
    pub fn map<F>(self, f: F) -> Estimate
    where
        F: FnOnce(f64) -> f64,
    {
        match self {
            Estimate::Known(value) => Estimate::new(f(value)),
            Estimate::Unknown => Estimate::Unknown,
        }
    }

    /// Combines the values of two known estimates with the given function.
    pub fn zip_with<F>(self, other: Estimate, f: F) -> Estimate
    where
        F: FnOnce(f64, f64) -> f64,
    {
        match (self, other) {
            (Estimate::Known(l), Estimate::Known(r)) => Estimate::new(f(l, r)),
            _ => Estimate::Unknown,
        }
    }

    /// The minimum of two estimates. Unknown if either estimate is unknown.
    pub fn min(self, other: Estimate) -> Estimate {
        self.zip_with(other, f64::min)
    }

    /// The maximum of two estimates. Unknown if either estimate is unknown.
    pub fn max(self, other: Estimate) -> Estimate {
        self.zip_with(other, f64::max)
    }

    /// The minimum of known estimates. Unknown only if both estimates are unknown.
    pub fn min_known(self, other: Estimate) -> Estimate {
        match (self, other) {
            (Estimate::Unknown, other) => other,
            (this, Estimate::Unknown) => this,
            (this, other) => this.min(other),
        }
    }

    /// The maximum of known estimates. Unknown only if both estimates are unknown.
    pub fn max_known(self, other: Estimate) -> Estimate {
        match (self, other) {
            (Estimate::Unknown, other) => other,
            (this, Estimate::Unknown) => this,
            (this, other) => this.max(other),
        }
    }
}

impl Default for Estimate {
    fn default() -> Self {
        Estimate::Unknown
    }
}

impl From<f64> for Estimate {
    fn from(value: f64) -> Self {
        Estimate::new(value)
    }
}

impl Display for Estimate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Estimate::Known(value) => write!(f, "{}", value),
            Estimate::Unknown => write!(f, "?"),
        }
    }
}

macro_rules! estimate_binary_op {
    ($op_trait:ident, $op_fn:ident, $op:tt) => {
        impl $op_trait for Estimate {
            type Output = Estimate;

            fn $op_fn(self, rhs: Estimate) -> Estimate {
                self.zip_with(rhs, |l, r| l $op r)
            }
        }

        impl $op_trait<f64> for Estimate {
            type Output = Estimate;

            fn $op_fn(self, rhs: f64) -> Estimate {
                self.zip_with(Estimate::new(rhs), |l, r| l $op r)
            }
        }

        impl $op_trait<Estimate> for f64 {
            type Output = Estimate;

            fn $op_fn(self, rhs: Estimate) -> Estimate {
                Estimate::new(self).zip_with(rhs, |l, r| l $op r)
            }
        }
    };
}

estimate_binary_op!(Add, add, +);
estimate_binary_op!(Sub, sub, -);
estimate_binary_op!(Mul, mul, *);
estimate_binary_op!(Div, div, /);
