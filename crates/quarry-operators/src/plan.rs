//! `PhysicalPlan`: the closed set of executable operators.

use std::fmt;

use quarry_core::batch::RecordBatch;
use quarry_core::error::Result;
use quarry_core::schema::Schema;

use crate::aggregate::HashAggregateExec;
use crate::filter::SelectionExec;
use crate::limit::LimitExec;
use crate::project::ProjectionExec;
use crate::scan::ScanExec;
use crate::traits::Operator;

#[derive(Debug)]
pub enum PhysicalPlan {
    Scan(ScanExec),
    Projection(ProjectionExec),
    Selection(SelectionExec),
    HashAggregate(HashAggregateExec),
    Limit(LimitExec),
}

macro_rules! dispatch {
    ($plan:expr, $op:ident => $body:expr) => {
        match $plan {
            PhysicalPlan::Scan($op) => $body,
            PhysicalPlan::Projection($op) => $body,
            PhysicalPlan::Selection($op) => $body,
            PhysicalPlan::HashAggregate($op) => $body,
            PhysicalPlan::Limit($op) => $body,
        }
    };
}

impl Operator for PhysicalPlan {
    fn name(&self) -> &'static str {
        dispatch!(self, op => op.name())
    }

    fn schema(&self) -> &Schema {
        dispatch!(self, op => op.schema())
    }

    fn next(&mut self) -> Result<bool> {
        dispatch!(self, op => op.next())
    }

    fn execute(&mut self) -> Result<RecordBatch> {
        dispatch!(self, op => op.execute())
    }

    fn children(&self) -> Vec<&PhysicalPlan> {
        dispatch!(self, op => op.children())
    }
}

impl fmt::Display for PhysicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, op => write!(f, "{op}"))
    }
}

/// One line per node, children indented by one tab per level.
pub fn pretty_format(plan: &PhysicalPlan) -> String {
    let mut out = String::new();
    format_node(plan, 0, &mut out);
    out
}

fn format_node(plan: &PhysicalPlan, depth: usize, out: &mut String) {
    out.push_str(&"\t".repeat(depth));
    out.push_str(&plan.to_string());
    out.push('\n');
    for child in plan.children() {
        format_node(child, depth + 1, out);
    }
}

/// Pull every batch out of `plan`.
pub fn collect(plan: &mut PhysicalPlan) -> Result<Vec<RecordBatch>> {
    let mut batches = Vec::new();
    while plan.next()? {
        batches.push(plan.execute()?);
    }
    Ok(batches)
}

macro_rules! impl_from_exec {
    ($($exec:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$exec> for PhysicalPlan {
                fn from(exec: $exec) -> Self {
                    PhysicalPlan::$variant(exec)
                }
            }
        )*
    };
}

impl_from_exec!(
    ScanExec => Scan,
    ProjectionExec => Projection,
    SelectionExec => Selection,
    HashAggregateExec => HashAggregate,
    LimitExec => Limit,
);
