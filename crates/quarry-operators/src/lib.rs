#![forbid(unsafe_code)]
//! quarry-operators: vectorized physical expressions and the pull-based
//! operators that evaluate them (scan/projection/selection/hash aggregate/limit).
//!
//! Design intent:
//! - Operators are synchronous and single-threaded; a consumer drives the
//!   root with `next()`/`execute()` and each operator pulls from its input.
//! - Expressions reference columns by position; name resolution happens in
//!   the planner.
//! - Every batch an operator emits matches the schema it reports.

pub mod aggregate;
pub mod expressions;
pub mod filter;
pub mod limit;
pub mod plan;
pub mod project;
pub mod scan;
pub mod traits;

pub use aggregate::HashAggregateExec;
pub use filter::SelectionExec;
pub use limit::LimitExec;
pub use plan::{collect, pretty_format, PhysicalPlan};
pub use project::ProjectionExec;
pub use scan::ScanExec;
pub use traits::Operator;
