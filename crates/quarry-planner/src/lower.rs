//! Lowering: logical plan → physical plan, logical expr → physical expr.
//!
//! Column names are resolved to positions against the schema of the logical
//! input the expression is evaluated over.

use quarry_core::error::{Error, Result};
use quarry_core::types::Value;
use quarry_operators::expressions::{
    self as phys, ArithmeticOp, BinaryExpr, BinaryOperator, BooleanOp, CastExpr, ColumnExpr,
    ComparisonOp, LiteralExpr, NotExpr, PhysicalExpr,
};
use quarry_operators::{
    HashAggregateExec, LimitExec, PhysicalPlan, ProjectionExec, ScanExec, SelectionExec,
};

use crate::expr::{AggregateExpr, AggregateKind, BinaryOp, LogicalExpr};
use crate::plan::LogicalPlan;

pub fn create_physical_plan(plan: &LogicalPlan) -> Result<PhysicalPlan> {
    Ok(match plan {
        LogicalPlan::Scan {
            source, projection, ..
        } => ScanExec::new(source.open(projection)?, projection.clone()).into(),
        LogicalPlan::Projection { input, exprs } => {
            let exprs = exprs
                .iter()
                .map(|e| create_physical_expr(e, input))
                .collect::<Result<Vec<_>>>()?;
            ProjectionExec::new(create_physical_plan(input)?, plan.schema()?, exprs).into()
        }
        LogicalPlan::Selection { input, expr } => {
            let expr = create_physical_expr(expr, input)?;
            SelectionExec::new(create_physical_plan(input)?, expr).into()
        }
        LogicalPlan::Aggregate {
            input,
            group_exprs,
            agg_exprs,
        } => {
            let group_exprs = group_exprs
                .iter()
                .map(|e| create_physical_expr(e, input))
                .collect::<Result<Vec<_>>>()?;
            let agg_exprs = agg_exprs
                .iter()
                .map(|e| create_aggregate_expr(e, input))
                .collect::<Result<Vec<_>>>()?;
            HashAggregateExec::new(
                create_physical_plan(input)?,
                group_exprs,
                agg_exprs,
                plan.schema()?,
            )
            .into()
        }
        LogicalPlan::Limit { input, limit } => {
            LimitExec::new(create_physical_plan(input)?, *limit).into()
        }
        LogicalPlan::Join { .. } => {
            return Err(Error::UnsupportedPlan("join execution is not implemented".into()));
        }
    })
}

fn create_aggregate_expr(agg: &AggregateExpr, input: &LogicalPlan) -> Result<phys::AggregateExpr> {
    let expr = create_physical_expr(&agg.expr, input)?;
    match agg.kind {
        AggregateKind::Sum => Ok(phys::AggregateExpr::Sum(expr)),
        AggregateKind::Min => Ok(phys::AggregateExpr::Min(expr)),
        AggregateKind::Max => Ok(phys::AggregateExpr::Max(expr)),
        other => Err(Error::UnsupportedAggregate(other.name().into())),
    }
}

fn physical_operator(op: BinaryOp) -> BinaryOperator {
    match op {
        BinaryOp::Eq => BinaryOperator::Comparison(ComparisonOp::Eq),
        BinaryOp::Neq => BinaryOperator::Comparison(ComparisonOp::NotEq),
        BinaryOp::Lt => BinaryOperator::Comparison(ComparisonOp::Lt),
        BinaryOp::LtEq => BinaryOperator::Comparison(ComparisonOp::LtEq),
        BinaryOp::Gt => BinaryOperator::Comparison(ComparisonOp::Gt),
        BinaryOp::GtEq => BinaryOperator::Comparison(ComparisonOp::GtEq),
        BinaryOp::And => BinaryOperator::Boolean(BooleanOp::And),
        BinaryOp::Or => BinaryOperator::Boolean(BooleanOp::Or),
        BinaryOp::Add => BinaryOperator::Arithmetic(ArithmeticOp::Add),
        BinaryOp::Subtract => BinaryOperator::Arithmetic(ArithmeticOp::Subtract),
        BinaryOp::Multiply => BinaryOperator::Arithmetic(ArithmeticOp::Multiply),
        BinaryOp::Divide => BinaryOperator::Arithmetic(ArithmeticOp::Divide),
        BinaryOp::Modulus => BinaryOperator::Arithmetic(ArithmeticOp::Modulus),
    }
}

pub fn create_physical_expr(expr: &LogicalExpr, input: &LogicalPlan) -> Result<PhysicalExpr> {
    Ok(match expr {
        LogicalExpr::Column(name) => {
            let idx = input
                .schema()?
                .find_first_index_by_name(name)
                .ok_or_else(|| Error::UnknownColumn(name.clone()))?;
            ColumnExpr::new(idx).into()
        }
        LogicalExpr::ColumnIndex(idx) => {
            let len = input.schema()?.len();
            if *idx >= len {
                return Err(Error::IndexOutOfBounds { index: *idx, len });
            }
            ColumnExpr::new(*idx).into()
        }
        LogicalExpr::LiteralString(s) => LiteralExpr::new(Value::Utf8(s.clone())).into(),
        LogicalExpr::LiteralLong(n) => LiteralExpr::new(*n).into(),
        LogicalExpr::LiteralFloat(n) => LiteralExpr::new(*n).into(),
        LogicalExpr::LiteralDouble(n) => LiteralExpr::new(*n).into(),
        LogicalExpr::Cast { expr, data_type } => {
            CastExpr::new(create_physical_expr(expr, input)?, *data_type).into()
        }
        LogicalExpr::Binary { op, left, right } => BinaryExpr::new(
            physical_operator(*op),
            create_physical_expr(left, input)?,
            create_physical_expr(right, input)?,
        )
        .into(),
        LogicalExpr::Not(expr) => NotExpr::new(create_physical_expr(expr, input)?).into(),
        LogicalExpr::Alias { expr, .. } => create_physical_expr(expr, input)?,
        LogicalExpr::Aggregate(agg) => {
            return Err(Error::UnsupportedExpression(format!(
                "aggregate {agg} can only appear in an Aggregate node"
            )));
        }
    })
}
