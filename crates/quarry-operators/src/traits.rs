//! Operator trait shared by every physical plan node.
//!
//! Execution is pull-based: a consumer calls `next()` and, when it returns
//! `true`, `execute()` to obtain the batch for that step. Inputs are pulled
//! the same way from inside `execute()`. Calling `execute()` without a
//! preceding successful `next()` is a protocol violation and fails.

use quarry_core::batch::RecordBatch;
use quarry_core::error::Result;
use quarry_core::schema::Schema;

use crate::plan::PhysicalPlan;

pub trait Operator: Send {
    /// Human-readable operator name (stable).
    fn name(&self) -> &'static str;

    /// Schema of every batch `execute()` returns.
    fn schema(&self) -> &Schema;

    /// Whether another batch is available.
    fn next(&mut self) -> Result<bool>;

    /// Produce the next batch.
    fn execute(&mut self) -> Result<RecordBatch>;

    /// Direct inputs, in order.
    fn children(&self) -> Vec<&PhysicalPlan>;
}
