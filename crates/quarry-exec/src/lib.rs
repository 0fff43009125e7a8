#![forbid(unsafe_code)]
//! quarry-exec: the execution context that ties the engine together.
//!
//! A context owns the engine configuration and a registry of named tables.
//! Queries are built as `DataFrame`s over registered tables, then optimized,
//! lowered to a physical plan and driven to completion by a pull loop.

pub mod runtime;

pub use runtime::{ExecError, ExecutionContext, QueryOutput};
