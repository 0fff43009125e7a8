//! Projection: evaluate one expression per output column.

use std::fmt;

use quarry_core::batch::RecordBatch;
use quarry_core::error::{Error, Result};
use quarry_core::schema::Schema;

use crate::expressions::PhysicalExpr;
use crate::plan::PhysicalPlan;
use crate::traits::Operator;

#[derive(Debug)]
pub struct ProjectionExec {
    input: Box<PhysicalPlan>,
    schema: Schema,
    exprs: Vec<PhysicalExpr>,
}

impl ProjectionExec {
    pub fn new(input: PhysicalPlan, schema: Schema, exprs: Vec<PhysicalExpr>) -> Self {
        Self {
            input: Box::new(input),
            schema,
            exprs,
        }
    }

    pub fn exprs(&self) -> &[PhysicalExpr] {
        &self.exprs
    }
}

impl Operator for ProjectionExec {
    fn name(&self) -> &'static str {
        "projection"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next(&mut self) -> Result<bool> {
        self.input.next()
    }

    fn execute(&mut self) -> Result<RecordBatch> {
        let batch = self.input.execute()?;
        let mut columns = Vec::with_capacity(self.exprs.len());
        for (expr, field) in self.exprs.iter().zip(&self.schema.fields) {
            let column = expr.evaluate(&batch)?;
            if column.get_type() != field.data_type {
                return Err(Error::type_mismatch(field.data_type, column.get_type()));
            }
            columns.push(column);
        }
        RecordBatch::try_new(self.schema.clone(), columns)
    }

    fn children(&self) -> Vec<&PhysicalPlan> {
        vec![self.input.as_ref()]
    }
}

impl fmt::Display for ProjectionExec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProjectionExec: [")?;
        for (i, expr) in self.exprs.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{expr}")?;
        }
        f.write_str("]")
    }
}
