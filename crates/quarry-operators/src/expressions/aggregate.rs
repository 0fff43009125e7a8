//! Aggregate expressions and their per-group accumulators.
//!
//! An accumulator ignores nulls and seeds itself from the first non-null
//! value it sees; every later value must carry the seed's type.

use std::fmt;

use quarry_core::error::{Error, Result};
use quarry_core::types::{PrimitiveType, Value};

use super::binary::{arithmetic, compare_values, ArithmeticOp, ComparisonOp};
use super::PhysicalExpr;

pub trait Accumulator: fmt::Debug + Send {
    fn accumulate(&mut self, value: Option<Value>) -> Result<()>;

    /// Current result; `None` until a non-null value has been accumulated.
    fn final_value(&self) -> Option<Value>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateExpr {
    Sum(PhysicalExpr),
    Min(PhysicalExpr),
    Max(PhysicalExpr),
}

impl AggregateExpr {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateExpr::Sum(_) => "SUM",
            AggregateExpr::Min(_) => "MIN",
            AggregateExpr::Max(_) => "MAX",
        }
    }

    /// Expression evaluated per input batch to feed the accumulators.
    pub fn input_expr(&self) -> &PhysicalExpr {
        match self {
            AggregateExpr::Sum(e) | AggregateExpr::Min(e) | AggregateExpr::Max(e) => e,
        }
    }

    pub fn create_accumulator(&self) -> Box<dyn Accumulator> {
        match self {
            AggregateExpr::Sum(_) => Box::<SumAccumulator>::default(),
            AggregateExpr::Min(_) => Box::new(ExtremumAccumulator::min()),
            AggregateExpr::Max(_) => Box::new(ExtremumAccumulator::max()),
        }
    }
}

impl fmt::Display for AggregateExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.input_expr())
    }
}

/// Checks `value` against the seeded type, or that it can seed at all.
fn check_type(current: Option<&Value>, value: &Value) -> Result<()> {
    let actual = value.data_type();
    match current {
        Some(seed) if seed.data_type() != actual => {
            Err(Error::type_mismatch(seed.data_type(), actual))
        }
        Some(_) => Ok(()),
        None if actual.is_numeric() => Ok(()),
        None => Err(Error::type_mismatch("numeric", actual)),
    }
}

#[derive(Debug, Default)]
pub struct SumAccumulator {
    sum: Option<Value>,
}

impl Accumulator for SumAccumulator {
    fn accumulate(&mut self, value: Option<Value>) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        check_type(self.sum.as_ref(), &value)?;
        self.sum = Some(match self.sum.take() {
            Some(sum) => arithmetic(ArithmeticOp::Add, sum, value)?,
            None => value,
        });
        Ok(())
    }

    fn final_value(&self) -> Option<Value> {
        self.sum.clone()
    }
}

/// Keeps the smallest (MIN) or largest (MAX) value seen.
#[derive(Debug)]
pub struct ExtremumAccumulator {
    replace_when: ComparisonOp,
    current: Option<Value>,
}

impl ExtremumAccumulator {
    pub fn min() -> Self {
        Self {
            replace_when: ComparisonOp::Lt,
            current: None,
        }
    }

    pub fn max() -> Self {
        Self {
            replace_when: ComparisonOp::Gt,
            current: None,
        }
    }

    pub fn data_type(&self) -> Option<PrimitiveType> {
        self.current.as_ref().map(Value::data_type)
    }
}

impl Accumulator for ExtremumAccumulator {
    fn accumulate(&mut self, value: Option<Value>) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        check_type(self.current.as_ref(), &value)?;
        let replace = match &self.current {
            Some(current) => compare_values(self.replace_when, &value, current)?,
            None => true,
        };
        if replace {
            self.current = Some(value);
        }
        Ok(())
    }

    fn final_value(&self) -> Option<Value> {
        self.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expressions::ColumnExpr;

    fn feed(acc: &mut dyn Accumulator, values: &[i8]) {
        for v in values {
            acc.accumulate(Some(Value::Int8(*v))).unwrap();
        }
    }

    #[test]
    fn min_max_sum() {
        let col = PhysicalExpr::Column(ColumnExpr::new(0));
        let mut min = AggregateExpr::Min(col.clone()).create_accumulator();
        let mut max = AggregateExpr::Max(col.clone()).create_accumulator();
        let mut sum = AggregateExpr::Sum(col).create_accumulator();
        for acc in [&mut min, &mut max, &mut sum] {
            feed(acc.as_mut(), &[10, 3, 5]);
        }
        assert_eq!(min.final_value(), Some(Value::Int8(3)));
        assert_eq!(max.final_value(), Some(Value::Int8(10)));
        assert_eq!(sum.final_value(), Some(Value::Int8(18)));
    }

    #[test]
    fn nulls_are_skipped() {
        let mut sum = SumAccumulator::default();
        assert_eq!(sum.final_value(), None);
        sum.accumulate(None).unwrap();
        assert_eq!(sum.final_value(), None);
        sum.accumulate(Some(Value::Float64(1.5))).unwrap();
        sum.accumulate(None).unwrap();
        sum.accumulate(Some(Value::Float64(2.0))).unwrap();
        assert_eq!(sum.final_value(), Some(Value::Float64(3.5)));
    }

    #[test]
    fn seeded_type_is_enforced() {
        let mut max = ExtremumAccumulator::max();
        max.accumulate(Some(Value::Int32(1))).unwrap();
        assert_eq!(max.data_type(), Some(PrimitiveType::Int32));
        let err = max.accumulate(Some(Value::Int64(2))).unwrap_err();
        assert_eq!(err, Error::type_mismatch(PrimitiveType::Int32, PrimitiveType::Int64));
        assert_eq!(max.final_value(), Some(Value::Int32(1)));
    }

    #[test]
    fn non_numeric_input_is_rejected() {
        let mut min = ExtremumAccumulator::min();
        assert!(matches!(
            min.accumulate(Some(Value::from("CO"))),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn display() {
        let agg = AggregateExpr::Max(PhysicalExpr::Column(ColumnExpr::new(1)));
        assert_eq!(agg.to_string(), "MAX(#1)");
    }
}
