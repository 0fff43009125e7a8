//! Fluent builder over `LogicalPlan`.

use quarry_core::error::Result;
use quarry_core::schema::Schema;

use crate::expr::{AggregateExpr, LogicalExpr};
use crate::plan::LogicalPlan;

#[derive(Debug, Clone)]
pub struct DataFrame {
    plan: LogicalPlan,
}

impl DataFrame {
    pub fn new(plan: LogicalPlan) -> Self {
        Self { plan }
    }

    pub fn project(self, exprs: Vec<LogicalExpr>) -> Self {
        Self::new(LogicalPlan::Projection {
            input: Box::new(self.plan),
            exprs,
        })
    }

    pub fn filter(self, expr: LogicalExpr) -> Self {
        Self::new(LogicalPlan::Selection {
            input: Box::new(self.plan),
            expr,
        })
    }

    pub fn aggregate(self, group_exprs: Vec<LogicalExpr>, agg_exprs: Vec<AggregateExpr>) -> Self {
        Self::new(LogicalPlan::Aggregate {
            input: Box::new(self.plan),
            group_exprs,
            agg_exprs,
        })
    }

    pub fn limit(self, limit: usize) -> Self {
        Self::new(LogicalPlan::Limit {
            input: Box::new(self.plan),
            limit,
        })
    }

    /// Schema of the rows this frame produces.
    pub fn schema(&self) -> Result<Schema> {
        self.plan.schema()
    }

    pub fn logical_plan(&self) -> &LogicalPlan {
        &self.plan
    }

    pub fn into_logical_plan(self) -> LogicalPlan {
        self.plan
    }
}

impl From<LogicalPlan> for DataFrame {
    fn from(plan: LogicalPlan) -> Self {
        Self::new(plan)
    }
}
