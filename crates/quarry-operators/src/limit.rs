//! Row cap over the input stream.

use std::fmt;

use quarry_core::batch::RecordBatch;
use quarry_core::error::Result;
use quarry_core::schema::Schema;

use crate::plan::PhysicalPlan;
use crate::traits::Operator;

#[derive(Debug)]
pub struct LimitExec {
    input: Box<PhysicalPlan>,
    limit: usize,
    emitted: usize,
}

impl LimitExec {
    pub fn new(input: PhysicalPlan, limit: usize) -> Self {
        Self {
            input: Box::new(input),
            limit,
            emitted: 0,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Operator for LimitExec {
    fn name(&self) -> &'static str {
        "limit"
    }

    fn schema(&self) -> &Schema {
        self.input.schema()
    }

    fn next(&mut self) -> Result<bool> {
        if self.emitted >= self.limit {
            return Ok(false);
        }
        self.input.next()
    }

    fn execute(&mut self) -> Result<RecordBatch> {
        let batch = self.input.execute()?;
        let remaining = self.limit.saturating_sub(self.emitted);
        let batch = if batch.row_count() > remaining {
            batch.slice(0, remaining)?
        } else {
            batch
        };
        self.emitted += batch.row_count();
        Ok(batch)
    }

    fn children(&self) -> Vec<&PhysicalPlan> {
        vec![self.input.as_ref()]
    }
}

impl fmt::Display for LimitExec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LimitExec: {}", self.limit)
    }
}
