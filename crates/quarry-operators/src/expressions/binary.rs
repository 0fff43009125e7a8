//! Element-wise binary kernels: comparisons, boolean connectives and
//! arithmetic.
//!
//! Both operands must have the same length and the same primitive type. A
//! null on either side yields a null in the output slot.

use std::fmt;
use std::ops::{Add, Div, Mul, Rem, Sub};

use quarry_core::array::ColumnArray;
use quarry_core::batch::RecordBatch;
use quarry_core::builder::ArrayBuilder;
use quarry_core::error::{Error, Result};
use quarry_core::types::{PrimitiveType, Value};

use super::PhysicalExpr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Comparison(ComparisonOp),
    Boolean(BooleanOp),
    Arithmetic(ArithmeticOp),
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Comparison(op) => match op {
                ComparisonOp::Eq => "=",
                ComparisonOp::NotEq => "!=",
                ComparisonOp::Lt => "<",
                ComparisonOp::LtEq => "<=",
                ComparisonOp::Gt => ">",
                ComparisonOp::GtEq => ">=",
            },
            BinaryOperator::Boolean(BooleanOp::And) => "AND",
            BinaryOperator::Boolean(BooleanOp::Or) => "OR",
            BinaryOperator::Arithmetic(op) => match op {
                ArithmeticOp::Add => "+",
                ArithmeticOp::Subtract => "-",
                ArithmeticOp::Multiply => "*",
                ArithmeticOp::Divide => "/",
                ArithmeticOp::Modulus => "%",
            },
        }
    }

    /// Output type for operands of type `input`, or the error evaluation
    /// would raise for that type.
    pub fn result_type(self, input: PrimitiveType) -> Result<PrimitiveType> {
        match self {
            BinaryOperator::Comparison(_) => Ok(PrimitiveType::Bool),
            BinaryOperator::Boolean(_) => {
                if input == PrimitiveType::Bool || input.is_integer() {
                    Ok(PrimitiveType::Bool)
                } else {
                    Err(Error::InvalidBooleanCoercion(input))
                }
            }
            BinaryOperator::Arithmetic(_) => {
                if input.is_numeric() {
                    Ok(input)
                } else {
                    Err(Error::type_mismatch("numeric", input))
                }
            }
        }
    }

    /// Apply the operator to two non-null values of the same type.
    pub fn apply(self, left: Value, right: Value) -> Result<Value> {
        match self {
            BinaryOperator::Comparison(op) => compare_values(op, &left, &right).map(Value::Bool),
            BinaryOperator::Boolean(op) => {
                let (l, r) = (truthy(&left)?, truthy(&right)?);
                Ok(Value::Bool(match op {
                    BooleanOp::And => l && r,
                    BooleanOp::Or => l || r,
                }))
            }
            BinaryOperator::Arithmetic(op) => arithmetic(op, left, right),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOperator,
    pub left: Box<PhysicalExpr>,
    pub right: Box<PhysicalExpr>,
}

impl BinaryExpr {
    pub fn new(op: BinaryOperator, left: PhysicalExpr, right: PhysicalExpr) -> Self {
        Self {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn evaluate(&self, batch: &RecordBatch) -> Result<ColumnArray> {
        let left = self.left.evaluate(batch)?;
        let right = self.right.evaluate(batch)?;
        evaluate_arrays(self.op, &left, &right)
    }
}

impl fmt::Display for BinaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

/// Combine two evaluated operands slot by slot.
pub fn evaluate_arrays(
    op: BinaryOperator,
    left: &ColumnArray,
    right: &ColumnArray,
) -> Result<ColumnArray> {
    if left.size() != right.size() {
        return Err(Error::type_mismatch(
            format!("{} rows", left.size()),
            format!("{} rows", right.size()),
        ));
    }
    if left.get_type() != right.get_type() {
        return Err(Error::type_mismatch(left.get_type(), right.get_type()));
    }

    let out_type = op.result_type(left.get_type())?;
    let mut builder = ArrayBuilder::with_capacity(out_type, left.size());
    for i in 0..left.size() {
        match (left.get_value(i)?, right.get_value(i)?) {
            (Some(l), Some(r)) => builder.append_value(op.apply(l, r)?)?,
            _ => builder.append_null(),
        }
    }
    Ok(builder.build())
}

/// Boolean view of a value: booleans as-is, integers true iff equal to 1.
pub fn truthy(value: &Value) -> Result<bool> {
    Ok(match value {
        Value::Bool(v) => *v,
        Value::Int8(v) => *v == 1,
        Value::Int16(v) => *v == 1,
        Value::Int32(v) => *v == 1,
        Value::Int64(v) => *v == 1,
        Value::UInt8(v) => *v == 1,
        Value::UInt16(v) => *v == 1,
        Value::UInt32(v) => *v == 1,
        Value::UInt64(v) => *v == 1,
        other => return Err(Error::InvalidBooleanCoercion(other.data_type())),
    })
}

fn compare<T: PartialOrd>(op: ComparisonOp, l: T, r: T) -> bool {
    match op {
        ComparisonOp::Eq => l == r,
        ComparisonOp::NotEq => l != r,
        ComparisonOp::Lt => l < r,
        ComparisonOp::LtEq => l <= r,
        ComparisonOp::Gt => l > r,
        ComparisonOp::GtEq => l >= r,
    }
}

/// Compare two values of the same type. Strings order lexicographically by
/// bytes; floats follow IEEE semantics (any comparison with NaN is false
/// except `!=`).
pub fn compare_values(op: ComparisonOp, left: &Value, right: &Value) -> Result<bool> {
    Ok(match (left, right) {
        (Value::Bool(l), Value::Bool(r)) => compare(op, l, r),
        (Value::Int8(l), Value::Int8(r)) => compare(op, l, r),
        (Value::Int16(l), Value::Int16(r)) => compare(op, l, r),
        (Value::Int32(l), Value::Int32(r)) => compare(op, l, r),
        (Value::Int64(l), Value::Int64(r)) => compare(op, l, r),
        (Value::UInt8(l), Value::UInt8(r)) => compare(op, l, r),
        (Value::UInt16(l), Value::UInt16(r)) => compare(op, l, r),
        (Value::UInt32(l), Value::UInt32(r)) => compare(op, l, r),
        (Value::UInt64(l), Value::UInt64(r)) => compare(op, l, r),
        (Value::Float32(l), Value::Float32(r)) => compare(op, l, r),
        (Value::Float64(l), Value::Float64(r)) => compare(op, l, r),
        (Value::Utf8(l), Value::Utf8(r)) => compare(op, l, r),
        (l, r) => return Err(Error::type_mismatch(l.data_type(), r.data_type())),
    })
}

/// Wrapping integer arithmetic; division and remainder by zero are errors.
trait IntegerArithmetic: Copy {
    fn wrapping_op(self, op: ArithmeticOp, rhs: Self) -> Result<Self>;
}

macro_rules! impl_integer_arithmetic {
    ($($native:ty),*) => {
        $(
            impl IntegerArithmetic for $native {
                fn wrapping_op(self, op: ArithmeticOp, rhs: Self) -> Result<Self> {
                    Ok(match op {
                        ArithmeticOp::Add => self.wrapping_add(rhs),
                        ArithmeticOp::Subtract => self.wrapping_sub(rhs),
                        ArithmeticOp::Multiply => self.wrapping_mul(rhs),
                        ArithmeticOp::Divide => {
                            if rhs == 0 {
                                return Err(Error::DivisionByZero);
                            }
                            self.wrapping_div(rhs)
                        }
                        ArithmeticOp::Modulus => {
                            if rhs == 0 {
                                return Err(Error::DivisionByZero);
                            }
                            self.wrapping_rem(rhs)
                        }
                    })
                }
            }
        )*
    };
}

impl_integer_arithmetic!(i8, i16, i32, i64, u8, u16, u32, u64);

fn float_op<T>(op: ArithmeticOp, l: T, r: T) -> T
where
    T: Add<Output = T> + Sub<Output = T> + Mul<Output = T> + Div<Output = T> + Rem<Output = T>,
{
    match op {
        ArithmeticOp::Add => l + r,
        ArithmeticOp::Subtract => l - r,
        ArithmeticOp::Multiply => l * r,
        ArithmeticOp::Divide => l / r,
        ArithmeticOp::Modulus => l % r,
    }
}

pub fn arithmetic(op: ArithmeticOp, left: Value, right: Value) -> Result<Value> {
    Ok(match (left, right) {
        (Value::Int8(l), Value::Int8(r)) => Value::Int8(l.wrapping_op(op, r)?),
        (Value::Int16(l), Value::Int16(r)) => Value::Int16(l.wrapping_op(op, r)?),
        (Value::Int32(l), Value::Int32(r)) => Value::Int32(l.wrapping_op(op, r)?),
        (Value::Int64(l), Value::Int64(r)) => Value::Int64(l.wrapping_op(op, r)?),
        (Value::UInt8(l), Value::UInt8(r)) => Value::UInt8(l.wrapping_op(op, r)?),
        (Value::UInt16(l), Value::UInt16(r)) => Value::UInt16(l.wrapping_op(op, r)?),
        (Value::UInt32(l), Value::UInt32(r)) => Value::UInt32(l.wrapping_op(op, r)?),
        (Value::UInt64(l), Value::UInt64(r)) => Value::UInt64(l.wrapping_op(op, r)?),
        (Value::Float32(l), Value::Float32(r)) => Value::Float32(float_op(op, l, r)),
        (Value::Float64(l), Value::Float64(r)) => Value::Float64(float_op(op, l, r)),
        (l, r) if l.data_type() == r.data_type() => {
            return Err(Error::type_mismatch("numeric", l.data_type()));
        }
        (l, r) => return Err(Error::type_mismatch(l.data_type(), r.data_type())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::array::LiteralArray;

    const EQ: BinaryOperator = BinaryOperator::Comparison(ComparisonOp::Eq);
    const LT: BinaryOperator = BinaryOperator::Comparison(ComparisonOp::Lt);
    const AND: BinaryOperator = BinaryOperator::Boolean(BooleanOp::And);
    const ADD: BinaryOperator = BinaryOperator::Arithmetic(ArithmeticOp::Add);
    const DIV: BinaryOperator = BinaryOperator::Arithmetic(ArithmeticOp::Divide);
    const MOD: BinaryOperator = BinaryOperator::Arithmetic(ArithmeticOp::Modulus);

    #[test]
    fn equality_against_literal() {
        let states = ColumnArray::from(vec!["CO", "CA", "CO"]);
        let co: ColumnArray = LiteralArray::new(Value::from("CO"), 3).into();
        let out = evaluate_arrays(EQ, &states, &co).unwrap();
        assert_eq!(out, ColumnArray::from(vec![true, false, true]));
    }

    #[test]
    fn strings_order_lexicographically() {
        let l = ColumnArray::from(vec!["apple", "b", "Z"]);
        let r = ColumnArray::from(vec!["banana", "a", "a"]);
        let out = evaluate_arrays(LT, &l, &r).unwrap();
        assert_eq!(out, ColumnArray::from(vec![true, false, true]));
    }

    #[test]
    fn nulls_propagate() {
        let l = ColumnArray::from(vec![Some(1i64), None, Some(3)]);
        let r = ColumnArray::from(vec![Some(10i64), Some(20), None]);
        let out = evaluate_arrays(ADD, &l, &r).unwrap();
        assert_eq!(out, ColumnArray::from(vec![Some(11i64), None, None]));
    }

    #[test]
    fn every_operator_propagates_nulls() {
        let ops = [
            EQ,
            BinaryOperator::Comparison(ComparisonOp::NotEq),
            LT,
            BinaryOperator::Comparison(ComparisonOp::LtEq),
            BinaryOperator::Comparison(ComparisonOp::Gt),
            BinaryOperator::Comparison(ComparisonOp::GtEq),
            AND,
            BinaryOperator::Boolean(BooleanOp::Or),
            ADD,
            BinaryOperator::Arithmetic(ArithmeticOp::Subtract),
            BinaryOperator::Arithmetic(ArithmeticOp::Multiply),
            DIV,
            MOD,
        ];
        // Row 0: null dividend over a zero divisor. Row 1: null divisor.
        let l = ColumnArray::from(vec![None, Some(4i64), Some(4)]);
        let r = ColumnArray::from(vec![Some(0i64), None, Some(1)]);
        for op in ops {
            let out = evaluate_arrays(op, &l, &r).unwrap();
            assert_eq!(out.size(), 3, "{op}");
            assert_eq!(out.get_value(0).unwrap(), None, "{op}");
            assert_eq!(out.get_value(1).unwrap(), None, "{op}");
            assert!(out.get_value(2).unwrap().is_some(), "{op}");
        }
    }

    #[test]
    fn integer_arithmetic_wraps() {
        let l = ColumnArray::from(vec![i8::MAX, 7]);
        let r = ColumnArray::from(vec![1i8, 3]);
        assert_eq!(
            evaluate_arrays(ADD, &l, &r).unwrap(),
            ColumnArray::from(vec![i8::MIN, 10])
        );
        assert_eq!(
            evaluate_arrays(MOD, &l, &r).unwrap(),
            ColumnArray::from(vec![0i8, 1])
        );
    }

    #[test]
    fn integer_division_by_zero_fails() {
        let l = ColumnArray::from(vec![4u32]);
        let r = ColumnArray::from(vec![0u32]);
        assert_eq!(evaluate_arrays(DIV, &l, &r), Err(Error::DivisionByZero));
        assert_eq!(evaluate_arrays(MOD, &l, &r), Err(Error::DivisionByZero));
    }

    #[test]
    fn float_division_by_zero_is_infinite() {
        let l = ColumnArray::from(vec![1.0f64]);
        let r = ColumnArray::from(vec![0.0f64]);
        let out = evaluate_arrays(DIV, &l, &r).unwrap();
        assert_eq!(out.get_value(0).unwrap(), Some(Value::Float64(f64::INFINITY)));
    }

    #[test]
    fn operands_must_agree() {
        let ints = ColumnArray::from(vec![1i32, 2]);
        let longs = ColumnArray::from(vec![1i64, 2]);
        assert!(matches!(
            evaluate_arrays(EQ, &ints, &longs),
            Err(Error::TypeMismatch { .. })
        ));

        let short = ColumnArray::from(vec![1i32]);
        assert!(matches!(
            evaluate_arrays(EQ, &ints, &short),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn arithmetic_requires_numbers() {
        let s = ColumnArray::from(vec!["a"]);
        assert_eq!(
            evaluate_arrays(ADD, &s, &s),
            Err(Error::type_mismatch("numeric", PrimitiveType::Utf8))
        );
    }

    #[test]
    fn boolean_connectives_coerce_integers() {
        let l = ColumnArray::from(vec![1i32, 1, 2]);
        let r = ColumnArray::from(vec![1i32, 0, 1]);
        assert_eq!(
            evaluate_arrays(AND, &l, &r).unwrap(),
            ColumnArray::from(vec![true, false, false])
        );

        let f = ColumnArray::from(vec![1.0f32]);
        assert_eq!(
            evaluate_arrays(AND, &f, &f),
            Err(Error::InvalidBooleanCoercion(PrimitiveType::Float32))
        );
    }

    #[test]
    fn nan_compares_false() {
        assert!(!compare_values(ComparisonOp::Eq, &Value::Float64(f64::NAN), &Value::Float64(f64::NAN)).unwrap());
        assert!(compare_values(ComparisonOp::NotEq, &Value::Float64(f64::NAN), &Value::Float64(1.0)).unwrap());
    }
}
