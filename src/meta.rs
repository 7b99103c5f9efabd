//! Identity and layout of columns statistics are collected for.

use std::fmt::{Display, Formatter};

/// Uniquely identifies a column within a query.
pub type ColumnId = usize;

/// The default size of a value of a variable-width column (in bytes) that is used
/// when the average size of its values is unknown.
pub const DEFAULT_DATA_SIZE_PER_COLUMN: f64 = 50.0;

/// Describes how values of a column are laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// Every value of a column occupies the given number of bytes.
    Fixed(f64),
    /// Values of a column have different sizes and are accessed via an array of offsets.
    Variable,
}

impl ColumnWidth {
    /// The size of a value (in bytes) to use when the average size of values of a column is unknown.
    pub fn default_value_size(&self) -> f64 {
        match self {
            ColumnWidth::Fixed(size) => *size,
            ColumnWidth::Variable => DEFAULT_DATA_SIZE_PER_COLUMN,
        }
    }

    /// The number of bytes per row that are used to store offsets of values of a column.
    pub fn offset_size(&self) -> f64 {
        match self {
            ColumnWidth::Fixed(_) => 0.0,
            ColumnWidth::Variable => std::mem::size_of::<i32>() as f64,
        }
    }
}

impl Display for ColumnWidth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnWidth::Fixed(size) => write!(f, "fixed({})", size),
            ColumnWidth::Variable => write!(f, "variable"),
        }
    }
}
