//! Physical expressions: column references resolved to positions, evaluated
//! against a `RecordBatch` to produce one `ColumnArray` of the batch's length.

pub mod aggregate;
pub mod binary;
pub mod cast;
pub mod column;
pub mod literal;
pub mod not;

use std::fmt;

use quarry_core::array::ColumnArray;
use quarry_core::batch::RecordBatch;
use quarry_core::error::Result;

pub use aggregate::{Accumulator, AggregateExpr, ExtremumAccumulator, SumAccumulator};
pub use binary::{ArithmeticOp, BinaryExpr, BinaryOperator, BooleanOp, ComparisonOp};
pub use cast::CastExpr;
pub use column::ColumnExpr;
pub use literal::LiteralExpr;
pub use not::NotExpr;

#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalExpr {
    Column(ColumnExpr),
    Literal(LiteralExpr),
    Cast(CastExpr),
    Binary(BinaryExpr),
    Not(NotExpr),
}

impl PhysicalExpr {
    pub fn evaluate(&self, batch: &RecordBatch) -> Result<ColumnArray> {
        match self {
            PhysicalExpr::Column(e) => e.evaluate(batch),
            PhysicalExpr::Literal(e) => e.evaluate(batch),
            PhysicalExpr::Cast(e) => e.evaluate(batch),
            PhysicalExpr::Binary(e) => e.evaluate(batch),
            PhysicalExpr::Not(e) => e.evaluate(batch),
        }
    }
}

impl fmt::Display for PhysicalExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalExpr::Column(e) => write!(f, "{e}"),
            PhysicalExpr::Literal(e) => write!(f, "{e}"),
            PhysicalExpr::Cast(e) => write!(f, "{e}"),
            PhysicalExpr::Binary(e) => write!(f, "{e}"),
            PhysicalExpr::Not(e) => write!(f, "{e}"),
        }
    }
}

impl From<ColumnExpr> for PhysicalExpr {
    fn from(e: ColumnExpr) -> Self {
        PhysicalExpr::Column(e)
    }
}

impl From<LiteralExpr> for PhysicalExpr {
    fn from(e: LiteralExpr) -> Self {
        PhysicalExpr::Literal(e)
    }
}

impl From<CastExpr> for PhysicalExpr {
    fn from(e: CastExpr) -> Self {
        PhysicalExpr::Cast(e)
    }
}

impl From<BinaryExpr> for PhysicalExpr {
    fn from(e: BinaryExpr) -> Self {
        PhysicalExpr::Binary(e)
    }
}

impl From<NotExpr> for PhysicalExpr {
    fn from(e: NotExpr) -> Self {
        PhysicalExpr::Not(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::error::Error;
    use quarry_core::schema::{Field, Schema};
    use quarry_core::types::{PrimitiveType, Value};

    fn batch() -> RecordBatch {
        RecordBatch::try_new(
            Schema::new(vec![
                Field::new("state", PrimitiveType::Utf8),
                Field::new("salary", PrimitiveType::Int64),
            ]),
            vec![
                ColumnArray::from(vec!["CO", "CA", "CO"]),
                ColumnArray::from(vec![Some(100i64), Some(200), None]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn column_and_literal() {
        let b = batch();
        let col = PhysicalExpr::from(ColumnExpr::new(1));
        assert_eq!(col.evaluate(&b).unwrap(), *b.field(1).unwrap());

        let lit = PhysicalExpr::from(LiteralExpr::new("x"));
        let out = lit.evaluate(&b).unwrap();
        assert_eq!(out.size(), 3);
        assert_eq!(out.get_value(2).unwrap(), Some(Value::from("x")));

        let missing = PhysicalExpr::from(ColumnExpr::new(5));
        assert!(matches!(
            missing.evaluate(&b),
            Err(Error::IndexOutOfBounds { index: 5, len: 2 })
        ));
    }

    #[test]
    fn nested_expression() {
        // NOT (#0 = 'CO')
        let eq = BinaryExpr::new(
            BinaryOperator::Comparison(ComparisonOp::Eq),
            ColumnExpr::new(0).into(),
            LiteralExpr::new("CO").into(),
        );
        let expr = PhysicalExpr::from(NotExpr::new(eq.into()));
        assert_eq!(expr.to_string(), "NOT #0 = 'CO'");
        assert_eq!(
            expr.evaluate(&batch()).unwrap(),
            ColumnArray::from(vec![false, true, false])
        );
    }

    #[test]
    fn cast_of_arithmetic() {
        let doubled = BinaryExpr::new(
            BinaryOperator::Arithmetic(ArithmeticOp::Multiply),
            ColumnExpr::new(1).into(),
            LiteralExpr::new(2i64).into(),
        );
        let expr = PhysicalExpr::from(CastExpr::new(doubled.into(), PrimitiveType::Utf8));
        assert_eq!(expr.to_string(), "CAST(#1 * 2 AS utf8)");
        assert_eq!(
            expr.evaluate(&batch()).unwrap(),
            ColumnArray::from(vec![Some("200"), Some("400"), None])
        );
    }

    #[test]
    fn not_rejects_text() {
        let expr = PhysicalExpr::from(NotExpr::new(ColumnExpr::new(0).into()));
        assert_eq!(
            expr.evaluate(&batch()),
            Err(Error::InvalidBooleanCoercion(PrimitiveType::Utf8))
        );
    }
}
