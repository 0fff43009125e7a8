//! Leaf operator reading batches from a `DataSource`.

use std::fmt;

use quarry_core::batch::RecordBatch;
use quarry_core::datasource::DataSource;
use quarry_core::error::Result;
use quarry_core::schema::Schema;

use crate::plan::PhysicalPlan;
use crate::traits::Operator;

#[derive(Debug)]
pub struct ScanExec {
    source: Box<dyn DataSource>,
    schema: Schema,
    projection: Vec<String>,
}

impl ScanExec {
    /// `source` must already be opened with `projection`; the projection is
    /// kept for display only.
    pub fn new(source: Box<dyn DataSource>, projection: Vec<String>) -> Self {
        let schema = source.schema();
        Self {
            source,
            schema,
            projection,
        }
    }

    pub fn projection(&self) -> &[String] {
        &self.projection
    }
}

impl Operator for ScanExec {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next(&mut self) -> Result<bool> {
        self.source.next()
    }

    fn execute(&mut self) -> Result<RecordBatch> {
        let batch = self.source.scan()?;
        #[cfg(feature = "tracing")]
        tracing::trace!(rows = batch.row_count(), columns = batch.column_count(), "scanned batch");
        Ok(batch)
    }

    fn children(&self) -> Vec<&PhysicalPlan> {
        vec![]
    }
}

impl fmt::Display for ScanExec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScanExec: schema={}, projection=", self.schema)?;
        if self.projection.is_empty() {
            f.write_str("None")
        } else {
            write!(f, "[{}]", self.projection.join(" "))
        }
    }
}
