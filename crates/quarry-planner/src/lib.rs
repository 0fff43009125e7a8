#![forbid(unsafe_code)]
//! quarry-planner: logical expressions and plans, the `DataFrame` builder,
//! rule-based optimization, and lowering to `quarry-operators` physical plans.
//!
//! Design:
//! - Logical nodes are name-based and only know schemas; positional
//!   resolution happens once, in `lower`.
//! - Rules (`rules`) return rewritten trees and never mutate their input.

pub mod dataframe;
pub mod expr;
pub mod lower;
pub mod plan;
pub mod rules;

pub use dataframe::DataFrame;
pub use expr::{
    alias, avg, cast, col, col_index, count, count_distinct, lit_double, lit_float, lit_long,
    lit_str, max, min, not, sum, AggregateExpr, AggregateKind, BinaryOp, LogicalExpr,
};
pub use lower::{create_physical_expr, create_physical_plan};
pub use plan::{pretty_format, JoinType, LogicalPlan};
pub use rules::{optimize, Optimizer, OptimizerRule, ProjectionPushDown};
