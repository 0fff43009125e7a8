use std::fmt;

use quarry_core::array::ColumnArray;
use quarry_core::batch::RecordBatch;
use quarry_core::builder::ArrayBuilder;
use quarry_core::error::{Error, Result};
use quarry_core::types::{PrimitiveType, Value};

use super::binary::truthy;
use super::PhysicalExpr;

/// Boolean negation. Integer inputs are read as booleans (1 is true).
#[derive(Debug, Clone, PartialEq)]
pub struct NotExpr {
    pub expr: Box<PhysicalExpr>,
}

impl NotExpr {
    pub fn new(expr: PhysicalExpr) -> Self {
        Self {
            expr: Box::new(expr),
        }
    }

    pub fn evaluate(&self, batch: &RecordBatch) -> Result<ColumnArray> {
        let input = self.expr.evaluate(batch)?;
        let data_type = input.get_type();
        if data_type != PrimitiveType::Bool && !data_type.is_integer() {
            return Err(Error::InvalidBooleanCoercion(data_type));
        }

        let mut builder = ArrayBuilder::with_capacity(PrimitiveType::Bool, input.size());
        for i in 0..input.size() {
            match input.get_value(i)? {
                Some(v) => builder.append_value(Value::Bool(!truthy(&v)?))?,
                None => builder.append_null(),
            }
        }
        Ok(builder.build())
    }
}

impl fmt::Display for NotExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NOT {}", self.expr)
    }
}
