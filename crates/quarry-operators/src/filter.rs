//! Selection: keep rows whose predicate evaluates to true.

use std::fmt;

use quarry_core::batch::RecordBatch;
use quarry_core::builder::ArrayBuilder;
use quarry_core::error::{Error, Result};
use quarry_core::schema::Schema;
use quarry_core::types::{PrimitiveType, Value};

use crate::expressions::PhysicalExpr;
use crate::plan::PhysicalPlan;
use crate::traits::Operator;

#[derive(Debug)]
pub struct SelectionExec {
    input: Box<PhysicalPlan>,
    schema: Schema,
    expr: PhysicalExpr,
}

impl SelectionExec {
    pub fn new(input: PhysicalPlan, expr: PhysicalExpr) -> Self {
        let schema = input.schema().clone();
        Self {
            input: Box::new(input),
            schema,
            expr,
        }
    }

    pub fn expr(&self) -> &PhysicalExpr {
        &self.expr
    }
}

/// Row indices where `batch` satisfies `predicate`. A null predicate value
/// drops the row.
fn selected_rows(predicate: &PhysicalExpr, batch: &RecordBatch) -> Result<Vec<usize>> {
    let mask = predicate.evaluate(batch)?;
    if mask.get_type() != PrimitiveType::Bool {
        return Err(Error::type_mismatch(PrimitiveType::Bool, mask.get_type()));
    }
    if mask.size() != batch.row_count() {
        return Err(Error::Invariant(format!(
            "predicate produced {} values for {} rows",
            mask.size(),
            batch.row_count()
        )));
    }

    let mut rows = Vec::new();
    for i in 0..mask.size() {
        if mask.get_value(i)? == Some(Value::Bool(true)) {
            rows.push(i);
        }
    }
    Ok(rows)
}

impl Operator for SelectionExec {
    fn name(&self) -> &'static str {
        "selection"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next(&mut self) -> Result<bool> {
        self.input.next()
    }

    fn execute(&mut self) -> Result<RecordBatch> {
        let batch = self.input.execute()?;
        let rows = selected_rows(&self.expr, &batch)?;

        let mut columns = Vec::with_capacity(batch.column_count());
        for column in &batch.fields {
            let mut builder = ArrayBuilder::with_capacity(column.get_type(), rows.len());
            for &row in &rows {
                builder.append(column.get_value(row)?)?;
            }
            columns.push(builder.build());
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(input_rows = batch.row_count(), output_rows = rows.len(), "filtered batch");

        RecordBatch::try_new(batch.schema, columns)
    }

    fn children(&self) -> Vec<&PhysicalPlan> {
        vec![self.input.as_ref()]
    }
}

impl fmt::Display for SelectionExec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SelectionExec: {}", self.expr)
    }
}
