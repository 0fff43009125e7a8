//! Type conversion of a child expression's output.

use std::fmt;

use quarry_core::array::{ColumnArray, LiteralArray};
use quarry_core::batch::RecordBatch;
use quarry_core::builder::ArrayBuilder;
use quarry_core::error::{Error, Result};
use quarry_core::types::{PrimitiveType, Value};

use super::PhysicalExpr;

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    pub expr: Box<PhysicalExpr>,
    pub data_type: PrimitiveType,
}

impl CastExpr {
    pub fn new(expr: PhysicalExpr, data_type: PrimitiveType) -> Self {
        Self {
            expr: Box::new(expr),
            data_type,
        }
    }

    pub fn evaluate(&self, batch: &RecordBatch) -> Result<ColumnArray> {
        let input = self.expr.evaluate(batch)?;
        cast_array(&input, self.data_type)
    }
}

impl fmt::Display for CastExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CAST({} AS {})", self.expr, self.data_type)
    }
}

/// Convert every slot of `input` to `to`. Nulls stay null; a cast to the
/// input's own type returns the input unchanged.
pub fn cast_array(input: &ColumnArray, to: PrimitiveType) -> Result<ColumnArray> {
    if input.get_type() == to {
        return Ok(input.clone());
    }

    if let ColumnArray::Literal(lit) = input {
        let value = lit.value().cloned().map(|v| cast_value(v, to)).transpose()?;
        return Ok(LiteralArray::try_new(to, value, input.size())?.into());
    }

    let mut builder = ArrayBuilder::with_capacity(to, input.size());
    for i in 0..input.size() {
        let value = input.get_value(i)?.map(|v| cast_value(v, to)).transpose()?;
        builder.append(value)?;
    }
    Ok(builder.build())
}

fn unsupported(value: &Value, to: PrimitiveType) -> Error {
    Error::CastError(format!("cannot cast {} to {to}", value.data_type()))
}

fn integer_of(value: &Value) -> Option<i128> {
    Some(match value {
        Value::Int8(v) => i128::from(*v),
        Value::Int16(v) => i128::from(*v),
        Value::Int32(v) => i128::from(*v),
        Value::Int64(v) => i128::from(*v),
        Value::UInt8(v) => i128::from(*v),
        Value::UInt16(v) => i128::from(*v),
        Value::UInt32(v) => i128::from(*v),
        Value::UInt64(v) => i128::from(*v),
        _ => return None,
    })
}

/// Integer targets accept any integer that fits, or text that parses.
macro_rules! cast_to_integer {
    ($value:expr, $to:expr, $native:ty, $variant:ident) => {
        match $value {
            Value::Utf8(s) => s.trim().parse::<$native>().map(Value::$variant).map_err(|e| {
                Error::CastError(format!("cannot parse '{s}' as {}: {e}", $to))
            }),
            other => match integer_of(&other) {
                Some(n) => <$native>::try_from(n)
                    .map(Value::$variant)
                    .map_err(|_| Error::CastError(format!("{other} is out of range for {}", $to))),
                None => Err(unsupported(&other, $to)),
            },
        }
    };
}

/// Convert a single non-null value.
pub fn cast_value(value: Value, to: PrimitiveType) -> Result<Value> {
    if value.data_type() == to {
        return Ok(value);
    }
    match to {
        PrimitiveType::Utf8 => Ok(Value::Utf8(value.to_string())),
        PrimitiveType::Bool => match value {
            Value::Utf8(s) => s
                .trim()
                .parse::<bool>()
                .map(Value::Bool)
                .map_err(|e| Error::CastError(format!("cannot parse '{s}' as bool: {e}"))),
            other => Err(unsupported(&other, to)),
        },
        PrimitiveType::Int8 => cast_to_integer!(value, to, i8, Int8),
        PrimitiveType::Int16 => cast_to_integer!(value, to, i16, Int16),
        PrimitiveType::Int32 => cast_to_integer!(value, to, i32, Int32),
        PrimitiveType::Int64 => cast_to_integer!(value, to, i64, Int64),
        PrimitiveType::UInt8 => cast_to_integer!(value, to, u8, UInt8),
        PrimitiveType::UInt16 => cast_to_integer!(value, to, u16, UInt16),
        PrimitiveType::UInt32 => cast_to_integer!(value, to, u32, UInt32),
        PrimitiveType::UInt64 => cast_to_integer!(value, to, u64, UInt64),
        PrimitiveType::Float32 => match value {
            Value::Float64(v) => Ok(Value::Float32(v as f32)),
            Value::Utf8(s) => s
                .trim()
                .parse::<f32>()
                .map(Value::Float32)
                .map_err(|e| Error::CastError(format!("cannot parse '{s}' as float32: {e}"))),
            other => Err(unsupported(&other, to)),
        },
        PrimitiveType::Float64 => match value {
            Value::Float32(v) => Ok(Value::Float64(f64::from(v))),
            Value::Utf8(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float64)
                .map_err(|e| Error::CastError(format!("cannot parse '{s}' as float64: {e}"))),
            other => Err(unsupported(&other, to)),
        },
    }
}
