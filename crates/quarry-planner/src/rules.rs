//! Rule-based logical rewrites.
//!
//! Rules run in sequence over the whole tree; each returns a new plan and
//! leaves its input untouched.

use std::fmt;

use quarry_core::error::{Error, Result};
use quarry_core::schema::Schema;

use crate::expr::{AggregateExpr, LogicalExpr};
use crate::plan::LogicalPlan;

pub trait OptimizerRule: fmt::Debug + Send + Sync {
    /// Stable rule name, used in logs.
    fn name(&self) -> &'static str;

    fn optimize(&self, plan: &LogicalPlan) -> Result<LogicalPlan>;
}

#[derive(Debug)]
pub struct Optimizer {
    rules: Vec<Box<dyn OptimizerRule>>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(vec![Box::new(ProjectionPushDown)])
    }
}

impl Optimizer {
    pub fn new(rules: Vec<Box<dyn OptimizerRule>>) -> Self {
        Self { rules }
    }

    pub fn optimize(&self, plan: &LogicalPlan) -> Result<LogicalPlan> {
        let mut plan = plan.clone();
        for rule in &self.rules {
            plan = rule.optimize(&plan)?;
            #[cfg(feature = "tracing")]
            tracing::debug!(rule = rule.name(), root = plan.kind(), "applied optimizer rule");
        }
        Ok(plan)
    }
}

/// Run the default rule set.
pub fn optimize(plan: &LogicalPlan) -> Result<LogicalPlan> {
    Optimizer::default().optimize(plan)
}

/// Narrow every scan to the columns the operators above it reference.
///
/// Projections and aggregates define their output from their expressions, so
/// below them only the referenced columns are needed. Selections and limits
/// pass every input column through; under them the requirement of the parent
/// is kept and the filter's columns are added. A scan that is reached while
/// every column is still required keeps its projection.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectionPushDown;

#[derive(Debug, Clone)]
enum Required {
    All,
    Columns(Vec<String>),
}

impl Required {
    fn add(&mut self, names: Vec<String>) {
        if let Required::Columns(cols) = self {
            for name in names {
                if !cols.contains(&name) {
                    cols.push(name);
                }
            }
        }
    }
}

impl OptimizerRule for ProjectionPushDown {
    fn name(&self) -> &'static str {
        "projection_push_down"
    }

    fn optimize(&self, plan: &LogicalPlan) -> Result<LogicalPlan> {
        push_down(plan, Required::All)
    }
}

fn push_down(plan: &LogicalPlan, mut required: Required) -> Result<LogicalPlan> {
    match plan {
        LogicalPlan::Scan {
            path,
            source,
            projection,
        } => {
            let projection = match required {
                Required::Columns(cols) if !cols.is_empty() => cols,
                _ => projection.clone(),
            };
            Ok(LogicalPlan::Scan {
                path: path.clone(),
                source: source.clone(),
                projection,
            })
        }
        LogicalPlan::Projection { input, exprs } => {
            let schema = input.schema()?;
            let exprs = resolve_all(exprs, &schema)?;
            let mut below = Required::Columns(Vec::new());
            for expr in &exprs {
                below.add(extract_columns(expr)?);
            }
            Ok(LogicalPlan::Projection {
                input: Box::new(push_down(input, below)?),
                exprs,
            })
        }
        LogicalPlan::Selection { input, expr } => {
            let expr = resolve_indices(expr, &input.schema()?)?;
            required.add(extract_columns(&expr)?);
            Ok(LogicalPlan::Selection {
                input: Box::new(push_down(input, required)?),
                expr,
            })
        }
        LogicalPlan::Aggregate {
            input,
            group_exprs,
            agg_exprs,
        } => {
            let schema = input.schema()?;
            let group_exprs = resolve_all(group_exprs, &schema)?;
            let agg_exprs = agg_exprs
                .iter()
                .map(|agg| {
                    Ok(AggregateExpr {
                        kind: agg.kind,
                        expr: Box::new(resolve_indices(&agg.expr, &schema)?),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let mut below = Required::Columns(Vec::new());
            for expr in &group_exprs {
                below.add(extract_columns(expr)?);
            }
            for agg in &agg_exprs {
                below.add(extract_columns(&agg.expr)?);
            }
            Ok(LogicalPlan::Aggregate {
                input: Box::new(push_down(input, below)?),
                group_exprs,
                agg_exprs,
            })
        }
        LogicalPlan::Limit { input, limit } => Ok(LogicalPlan::Limit {
            input: Box::new(push_down(input, required)?),
            limit: *limit,
        }),
        LogicalPlan::Join { .. } => Err(Error::UnsupportedPlan(
            "projection push down does not handle joins".into(),
        )),
    }
}

fn resolve_all(exprs: &[LogicalExpr], input: &Schema) -> Result<Vec<LogicalExpr>> {
    exprs.iter().map(|e| resolve_indices(e, input)).collect()
}

/// Replace positional references with the names they point at in `input`.
/// Positions would no longer line up once the scan below is narrowed.
fn resolve_indices(expr: &LogicalExpr, input: &Schema) -> Result<LogicalExpr> {
    let resolve = |e: &LogicalExpr| resolve_indices(e, input).map(Box::new);
    Ok(match expr {
        LogicalExpr::ColumnIndex(idx) => {
            let field = input.field(*idx).ok_or(Error::IndexOutOfBounds {
                index: *idx,
                len: input.len(),
            })?;
            LogicalExpr::Column(field.name.clone())
        }
        LogicalExpr::Cast { expr, data_type } => LogicalExpr::Cast {
            expr: resolve(expr)?,
            data_type: *data_type,
        },
        LogicalExpr::Binary { op, left, right } => LogicalExpr::Binary {
            op: *op,
            left: resolve(left)?,
            right: resolve(right)?,
        },
        LogicalExpr::Not(expr) => LogicalExpr::Not(resolve(expr)?),
        LogicalExpr::Alias { expr, alias } => LogicalExpr::Alias {
            expr: resolve(expr)?,
            alias: alias.clone(),
        },
        LogicalExpr::Aggregate(agg) => LogicalExpr::Aggregate(AggregateExpr {
            kind: agg.kind,
            expr: resolve(&agg.expr)?,
        }),
        LogicalExpr::Column(_)
        | LogicalExpr::LiteralString(_)
        | LogicalExpr::LiteralLong(_)
        | LogicalExpr::LiteralFloat(_)
        | LogicalExpr::LiteralDouble(_) => expr.clone(),
    })
}

/// Column names `expr` reads, in first-use order. Positional references
/// must already be resolved.
fn extract_columns(expr: &LogicalExpr) -> Result<Vec<String>> {
    let mut out = Vec::new();
    collect_columns(expr, &mut out)?;
    Ok(out)
}

fn collect_columns(expr: &LogicalExpr, out: &mut Vec<String>) -> Result<()> {
    match expr {
        LogicalExpr::Column(name) => out.push(name.clone()),
        LogicalExpr::ColumnIndex(idx) => {
            return Err(Error::Invariant(format!(
                "unresolved column index #{idx} in projection push down"
            )));
        }
        LogicalExpr::LiteralString(_)
        | LogicalExpr::LiteralLong(_)
        | LogicalExpr::LiteralFloat(_)
        | LogicalExpr::LiteralDouble(_) => {}
        LogicalExpr::Binary { left, right, .. } => {
            collect_columns(left, out)?;
            collect_columns(right, out)?;
        }
        LogicalExpr::Cast { expr, .. } | LogicalExpr::Alias { expr, .. } => {
            collect_columns(expr, out)?
        }
        LogicalExpr::Not(expr) => collect_columns(expr, out)?,
        LogicalExpr::Aggregate(agg) => {
            return Err(Error::UnsupportedExpression(format!(
                "aggregate {agg} outside an Aggregate node"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{col, col_index, lit_long, lit_str, sum};
    use crate::plan::pretty_format;
    use quarry_core::datasource::MemTable;
    use quarry_core::schema::{Field, Schema};
    use quarry_core::types::PrimitiveType;
    use std::sync::Arc;

    fn scan() -> LogicalPlan {
        let schema = Schema::new(vec![
            Field::new("id", PrimitiveType::Int64),
            Field::new("name", PrimitiveType::Utf8),
            Field::new("state", PrimitiveType::Utf8),
            Field::new("salary", PrimitiveType::Int64),
        ]);
        LogicalPlan::scan("t", Arc::new(MemTable::try_new(schema, vec![]).unwrap()), vec![])
    }

    fn scan_projection(plan: &LogicalPlan) -> Vec<String> {
        match plan {
            LogicalPlan::Scan { projection, .. } => projection.clone(),
            other => scan_projection(other.children()[0]),
        }
    }

    #[test]
    fn selection_without_projection_keeps_every_column() {
        let plan = LogicalPlan::Selection {
            input: Box::new(scan()),
            expr: col("state").eq(lit_str("CO")),
        };
        let optimized = optimize(&plan).unwrap();
        assert!(scan_projection(&optimized).is_empty());
        assert_eq!(optimized.schema().unwrap().len(), 4);
    }

    #[test]
    fn column_index_resolves_through_input_schema() {
        let plan = LogicalPlan::Projection {
            input: Box::new(scan()),
            exprs: vec![col_index(3).add(lit_long(1)), col("name")],
        };
        let optimized = optimize(&plan).unwrap();
        assert_eq!(scan_projection(&optimized), vec!["salary", "name"]);
        assert_eq!(
            pretty_format(&optimized),
            "Projection: #salary + 1, #name\n\tScan: t; projection=[salary name]\n"
        );
        assert_eq!(optimized.schema().unwrap(), plan.schema().unwrap());
    }

    #[test]
    fn column_index_filter_is_renamed_before_narrowing() {
        let plan = LogicalPlan::Projection {
            input: Box::new(LogicalPlan::Selection {
                input: Box::new(scan()),
                expr: col_index(3).gt(lit_long(10)),
            }),
            exprs: vec![col_index(1), col_index(0)],
        };
        let optimized = optimize(&plan).unwrap();
        assert_eq!(
            pretty_format(&optimized),
            "Projection: #name, #id\n\
             \tSelection: #salary > 10\n\
             \t\tScan: t; projection=[name id salary]\n"
        );
    }

    #[test]
    fn column_index_out_of_range_is_reported() {
        let plan = LogicalPlan::Projection {
            input: Box::new(scan()),
            exprs: vec![col_index(7)],
        };
        assert_eq!(
            optimize(&plan).err(),
            Some(Error::IndexOutOfBounds { index: 7, len: 4 })
        );
    }

    #[test]
    fn nested_projections_only_read_what_the_inner_one_needs() {
        let inner = LogicalPlan::Projection {
            input: Box::new(scan()),
            exprs: vec![col("salary").multiply(lit_long(2)).alias("double_salary")],
        };
        let plan = LogicalPlan::Projection {
            input: Box::new(inner),
            exprs: vec![col("double_salary")],
        };
        let optimized = optimize(&plan).unwrap();
        assert_eq!(scan_projection(&optimized), vec!["salary"]);
    }

    #[test]
    fn limit_is_transparent() {
        let plan = LogicalPlan::Limit {
            input: Box::new(LogicalPlan::Projection {
                input: Box::new(scan()),
                exprs: vec![col("id")],
            }),
            limit: 2,
        };
        let optimized = optimize(&plan).unwrap();
        assert_eq!(
            pretty_format(&optimized),
            "Limit: 2\n\tProjection: #id\n\t\tScan: t; projection=[id]\n"
        );
    }

    #[test]
    fn aggregate_inside_scalar_expression_is_rejected() {
        let plan = LogicalPlan::Projection {
            input: Box::new(scan()),
            exprs: vec![sum(col("salary")).into()],
        };
        assert!(matches!(
            optimize(&plan),
            Err(Error::UnsupportedExpression(_))
        ));
    }
}
