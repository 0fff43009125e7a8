use std::fmt;

use quarry_core::array::{ColumnArray, LiteralArray};
use quarry_core::batch::RecordBatch;
use quarry_core::error::Result;
use quarry_core::types::Value;

/// A constant broadcast to the batch's row count.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: Value,
}

impl LiteralExpr {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn evaluate(&self, batch: &RecordBatch) -> Result<ColumnArray> {
        Ok(LiteralArray::new(self.value.clone(), batch.row_count()).into())
    }
}

impl fmt::Display for LiteralExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Utf8(s) => write!(f, "'{s}'"),
            other => write!(f, "{other}"),
        }
    }
}
