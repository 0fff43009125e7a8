//! Typed column vectors.
//!
//! A `ColumnArray` is either a materialized vector backed by one of the twelve
//! primitive storages, or a literal that broadcasts one value over a logical
//! length without allocating. Materialized storage sits behind an `Arc` so
//! passing a column through an operator is a refcount bump, not a copy.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{PrimitiveType, Value};

/// Backing storage for a materialized column. Nulls are per-slot `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Bool(Vec<Option<bool>>),
    Int8(Vec<Option<i8>>),
    Int16(Vec<Option<i16>>),
    Int32(Vec<Option<i32>>),
    Int64(Vec<Option<i64>>),
    UInt8(Vec<Option<u8>>),
    UInt16(Vec<Option<u16>>),
    UInt32(Vec<Option<u32>>),
    UInt64(Vec<Option<u64>>),
    Float32(Vec<Option<f32>>),
    Float64(Vec<Option<f64>>),
    Utf8(Vec<Option<String>>),
}

/// Run `$body` against the typed vector inside any `ArrayData` variant.
macro_rules! with_storage {
    ($data:expr, $vals:ident => $body:expr) => {
        match $data {
            ArrayData::Bool($vals) => $body,
            ArrayData::Int8($vals) => $body,
            ArrayData::Int16($vals) => $body,
            ArrayData::Int32($vals) => $body,
            ArrayData::Int64($vals) => $body,
            ArrayData::UInt8($vals) => $body,
            ArrayData::UInt16($vals) => $body,
            ArrayData::UInt32($vals) => $body,
            ArrayData::UInt64($vals) => $body,
            ArrayData::Float32($vals) => $body,
            ArrayData::Float64($vals) => $body,
            ArrayData::Utf8($vals) => $body,
        }
    };
}

pub(crate) use with_storage;

impl ArrayData {
    pub fn with_capacity(data_type: PrimitiveType, capacity: usize) -> Self {
        match data_type {
            PrimitiveType::Bool => ArrayData::Bool(Vec::with_capacity(capacity)),
            PrimitiveType::Int8 => ArrayData::Int8(Vec::with_capacity(capacity)),
            PrimitiveType::Int16 => ArrayData::Int16(Vec::with_capacity(capacity)),
            PrimitiveType::Int32 => ArrayData::Int32(Vec::with_capacity(capacity)),
            PrimitiveType::Int64 => ArrayData::Int64(Vec::with_capacity(capacity)),
            PrimitiveType::UInt8 => ArrayData::UInt8(Vec::with_capacity(capacity)),
            PrimitiveType::UInt16 => ArrayData::UInt16(Vec::with_capacity(capacity)),
            PrimitiveType::UInt32 => ArrayData::UInt32(Vec::with_capacity(capacity)),
            PrimitiveType::UInt64 => ArrayData::UInt64(Vec::with_capacity(capacity)),
            PrimitiveType::Float32 => ArrayData::Float32(Vec::with_capacity(capacity)),
            PrimitiveType::Float64 => ArrayData::Float64(Vec::with_capacity(capacity)),
            PrimitiveType::Utf8 => ArrayData::Utf8(Vec::with_capacity(capacity)),
        }
    }

    pub fn data_type(&self) -> PrimitiveType {
        match self {
            ArrayData::Bool(_) => PrimitiveType::Bool,
            ArrayData::Int8(_) => PrimitiveType::Int8,
            ArrayData::Int16(_) => PrimitiveType::Int16,
            ArrayData::Int32(_) => PrimitiveType::Int32,
            ArrayData::Int64(_) => PrimitiveType::Int64,
            ArrayData::UInt8(_) => PrimitiveType::UInt8,
            ArrayData::UInt16(_) => PrimitiveType::UInt16,
            ArrayData::UInt32(_) => PrimitiveType::UInt32,
            ArrayData::UInt64(_) => PrimitiveType::UInt64,
            ArrayData::Float32(_) => PrimitiveType::Float32,
            ArrayData::Float64(_) => PrimitiveType::Float64,
            ArrayData::Utf8(_) => PrimitiveType::Utf8,
        }
    }

    pub fn len(&self) -> usize {
        with_storage!(self, vals => vals.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, i: usize) -> Option<Option<Value>> {
        with_storage!(self, vals => vals.get(i).map(|cell| cell.clone().map(Value::from)))
    }

    fn slice(&self, offset: usize, len: usize) -> ArrayData {
        with_storage!(self, vals => vals[offset..offset + len].to_vec().into())
    }
}

/// One value repeated `len` times.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralArray {
    data_type: PrimitiveType,
    value: Option<Value>,
    len: usize,
}

impl LiteralArray {
    pub fn try_new(data_type: PrimitiveType, value: Option<Value>, len: usize) -> Result<Self> {
        if let Some(v) = &value {
            if v.data_type() != data_type {
                return Err(Error::type_mismatch(data_type, v.data_type()));
            }
        }
        Ok(Self {
            data_type,
            value,
            len,
        })
    }

    /// Broadcast a non-null value; the type is taken from the value.
    pub fn new(value: Value, len: usize) -> Self {
        Self {
            data_type: value.data_type(),
            value: Some(value),
            len,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

#[derive(Debug, Clone)]
pub enum ColumnArray {
    Primitive(Arc<ArrayData>),
    Literal(LiteralArray),
}

impl ColumnArray {
    pub fn get_type(&self) -> PrimitiveType {
        match self {
            ColumnArray::Primitive(data) => data.data_type(),
            ColumnArray::Literal(lit) => lit.data_type,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            ColumnArray::Primitive(data) => data.len(),
            ColumnArray::Literal(lit) => lit.len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Value at `i`; `None` is a null slot. Indices at or past `size()` fail.
    pub fn get_value(&self, i: usize) -> Result<Option<Value>> {
        let out_of_bounds = Error::IndexOutOfBounds {
            index: i,
            len: self.size(),
        };
        match self {
            ColumnArray::Primitive(data) => data.get(i).ok_or(out_of_bounds),
            ColumnArray::Literal(lit) => {
                if i >= lit.len {
                    return Err(out_of_bounds);
                }
                Ok(lit.value.clone())
            }
        }
    }

    /// All values in order; convenient for tests and small outputs.
    pub fn to_values(&self) -> Vec<Option<Value>> {
        (0..self.size())
            .filter_map(|i| self.get_value(i).ok())
            .collect()
    }

    /// A new array over rows `offset..offset + len`.
    pub fn slice(&self, offset: usize, len: usize) -> Result<ColumnArray> {
        let end = offset.checked_add(len).unwrap_or(usize::MAX);
        if end > self.size() {
            return Err(Error::IndexOutOfBounds {
                index: end,
                len: self.size(),
            });
        }
        Ok(match self {
            ColumnArray::Primitive(data) => ColumnArray::Primitive(Arc::new(data.slice(offset, len))),
            ColumnArray::Literal(lit) => ColumnArray::Literal(LiteralArray {
                len,
                ..lit.clone()
            }),
        })
    }
}

impl PartialEq for ColumnArray {
    fn eq(&self, other: &Self) -> bool {
        self.get_type() == other.get_type() && self.to_values() == other.to_values()
    }
}

impl From<ArrayData> for ColumnArray {
    fn from(data: ArrayData) -> Self {
        ColumnArray::Primitive(Arc::new(data))
    }
}

impl From<LiteralArray> for ColumnArray {
    fn from(lit: LiteralArray) -> Self {
        ColumnArray::Literal(lit)
    }
}

macro_rules! impl_array_from_vec {
    ($($native:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<Option<$native>>> for ArrayData {
                fn from(vals: Vec<Option<$native>>) -> Self {
                    ArrayData::$variant(vals)
                }
            }

            impl From<Vec<Option<$native>>> for ColumnArray {
                fn from(vals: Vec<Option<$native>>) -> Self {
                    ArrayData::$variant(vals).into()
                }
            }

            impl From<Vec<$native>> for ColumnArray {
                fn from(vals: Vec<$native>) -> Self {
                    ArrayData::$variant(vals.into_iter().map(Some).collect()).into()
                }
            }
        )*
    };
}

impl_array_from_vec!(
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    String => Utf8,
);

impl From<Vec<&str>> for ColumnArray {
    fn from(vals: Vec<&str>) -> Self {
        ArrayData::Utf8(vals.into_iter().map(|s| Some(s.to_string())).collect()).into()
    }
}

impl From<Vec<Option<&str>>> for ColumnArray {
    fn from(vals: Vec<Option<&str>>) -> Self {
        ArrayData::Utf8(vals.into_iter().map(|s| s.map(str::to_string)).collect()).into()
    }
}
