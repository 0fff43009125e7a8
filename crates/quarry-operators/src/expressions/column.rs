use std::fmt;

use quarry_core::array::ColumnArray;
use quarry_core::batch::RecordBatch;
use quarry_core::error::Result;

/// Reference to an input column by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnExpr {
    pub index: usize,
}

impl ColumnExpr {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    pub fn evaluate(&self, batch: &RecordBatch) -> Result<ColumnArray> {
        batch.field(self.index).cloned()
    }
}

impl fmt::Display for ColumnExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}
