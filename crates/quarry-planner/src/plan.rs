//! Logical plan tree. Pure data plus schema inference; nothing here executes.

use std::fmt;
use std::sync::Arc;

use quarry_core::datasource::TableProvider;
use quarry_core::error::{Error, Result};
use quarry_core::schema::Schema;

use crate::expr::{AggregateExpr, LogicalExpr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinType::Inner => "inner",
            JoinType::Left => "left",
            JoinType::Right => "right",
        })
    }
}

#[derive(Debug, Clone)]
pub enum LogicalPlan {
    /// Leaf reading `source`. An empty projection reads every column.
    Scan {
        path: String,
        source: Arc<dyn TableProvider>,
        projection: Vec<String>,
    },
    Projection {
        input: Box<LogicalPlan>,
        exprs: Vec<LogicalExpr>,
    },
    Selection {
        input: Box<LogicalPlan>,
        expr: LogicalExpr,
    },
    Aggregate {
        input: Box<LogicalPlan>,
        group_exprs: Vec<LogicalExpr>,
        agg_exprs: Vec<AggregateExpr>,
    },
    Limit {
        input: Box<LogicalPlan>,
        limit: usize,
    },
    /// Representable and printable only; schema inference, optimization and
    /// physical planning reject it.
    Join {
        left: Box<LogicalPlan>,
        right: Box<LogicalPlan>,
        join_type: JoinType,
        /// Pairs of (left column, right column).
        on: Vec<(String, String)>,
    },
}

impl LogicalPlan {
    pub fn scan(
        path: impl Into<String>,
        source: Arc<dyn TableProvider>,
        projection: Vec<String>,
    ) -> Self {
        LogicalPlan::Scan {
            path: path.into(),
            source,
            projection,
        }
    }

    pub fn schema(&self) -> Result<Schema> {
        match self {
            LogicalPlan::Scan {
                source, projection, ..
            } => Ok(source.schema().select_by_name(projection).0),
            LogicalPlan::Projection { input, exprs } => {
                let fields = exprs
                    .iter()
                    .map(|e| e.to_field(input))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Schema::new(fields))
            }
            LogicalPlan::Selection { input, .. } | LogicalPlan::Limit { input, .. } => {
                input.schema()
            }
            LogicalPlan::Aggregate {
                input,
                group_exprs,
                agg_exprs,
            } => {
                let mut fields = Vec::with_capacity(group_exprs.len() + agg_exprs.len());
                for e in group_exprs {
                    fields.push(e.to_field(input)?);
                }
                for e in agg_exprs {
                    fields.push(e.to_field(input)?);
                }
                Ok(Schema::new(fields))
            }
            LogicalPlan::Join { .. } => Err(Error::UnsupportedPlan(
                "join schema inference is not implemented".into(),
            )),
        }
    }

    pub fn children(&self) -> Vec<&LogicalPlan> {
        match self {
            LogicalPlan::Scan { .. } => vec![],
            LogicalPlan::Projection { input, .. }
            | LogicalPlan::Selection { input, .. }
            | LogicalPlan::Aggregate { input, .. }
            | LogicalPlan::Limit { input, .. } => vec![input.as_ref()],
            LogicalPlan::Join { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        }
    }

    /// Short variant name for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            LogicalPlan::Scan { .. } => "Scan",
            LogicalPlan::Projection { .. } => "Projection",
            LogicalPlan::Selection { .. } => "Selection",
            LogicalPlan::Aggregate { .. } => "Aggregate",
            LogicalPlan::Limit { .. } => "Limit",
            LogicalPlan::Join { .. } => "Join",
        }
    }
}

fn write_separated<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    sep: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalPlan::Scan {
                path, projection, ..
            } => {
                if projection.is_empty() {
                    write!(f, "Scan: {path}; projection=None")
                } else {
                    write!(f, "Scan: {path}; projection=[{}]", projection.join(" "))
                }
            }
            LogicalPlan::Projection { exprs, .. } => {
                f.write_str("Projection: ")?;
                write_separated(f, exprs, ", ")
            }
            LogicalPlan::Selection { expr, .. } => write!(f, "Selection: {expr}"),
            LogicalPlan::Aggregate {
                group_exprs,
                agg_exprs,
                ..
            } => {
                f.write_str("Aggregate: groupExpr=[")?;
                write_separated(f, group_exprs, " ")?;
                f.write_str("], aggregateExpr=[")?;
                write_separated(f, agg_exprs, " ")?;
                f.write_str("]")
            }
            LogicalPlan::Limit { limit, .. } => write!(f, "Limit: {limit}"),
            LogicalPlan::Join { join_type, on, .. } => {
                write!(f, "Join: type={join_type}, on=[")?;
                for (i, (l, r)) in on.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "#{l} = #{r}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// One line per node, children indented by one tab per level.
pub fn pretty_format(plan: &LogicalPlan) -> String {
    let mut out = String::new();
    format_node(plan, 0, &mut out);
    out
}

fn format_node(plan: &LogicalPlan, depth: usize, out: &mut String) {
    out.push_str(&"\t".repeat(depth));
    out.push_str(&plan.to_string());
    out.push('\n');
    for child in plan.children() {
        format_node(child, depth + 1, out);
    }
}
