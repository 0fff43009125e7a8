#![forbid(unsafe_code)]
//! quarry: a single-node, pull-based columnar query engine.
//!
//! This crate re-exports the workspace layers:
//! - `quarry_core`: columnar data model, errors, configuration, data sources
//! - `quarry_operators`: physical expressions and operators
//! - `quarry_planner`: logical plans, `DataFrame`, optimizer, lowering
//! - `quarry_exec`: the `ExecutionContext` that runs queries

pub use quarry_core;
pub use quarry_exec;
pub use quarry_operators;
pub use quarry_planner;

pub use quarry_core::prelude::*;
pub use quarry_exec::{ExecError, ExecutionContext, QueryOutput};
pub use quarry_planner::{
    alias, avg, cast, col, col_index, count, count_distinct, lit_double, lit_float, lit_long,
    lit_str, max, min, not, sum, DataFrame, LogicalExpr, LogicalPlan,
};
