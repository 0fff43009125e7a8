//! Append-only, type-tagged construction of immutable column arrays.

use crate::array::{with_storage, ArrayData, ColumnArray};
use crate::error::{Error, Result};
use crate::types::{PrimitiveType, Value};

#[derive(Debug)]
pub struct ArrayBuilder {
    data: ArrayData,
}

impl ArrayBuilder {
    pub fn new(data_type: PrimitiveType) -> Self {
        Self::with_capacity(data_type, 0)
    }

    pub fn with_capacity(data_type: PrimitiveType, capacity: usize) -> Self {
        Self {
            data: ArrayData::with_capacity(data_type, capacity),
        }
    }

    pub fn data_type(&self) -> PrimitiveType {
        self.data.data_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a value or a null. The value's tag must match the builder's type.
    pub fn append(&mut self, value: Option<Value>) -> Result<()> {
        match value {
            Some(v) => self.append_value(v),
            None => {
                self.append_null();
                Ok(())
            }
        }
    }

    pub fn append_value(&mut self, value: Value) -> Result<()> {
        match (&mut self.data, value) {
            (ArrayData::Bool(vals), Value::Bool(v)) => vals.push(Some(v)),
            (ArrayData::Int8(vals), Value::Int8(v)) => vals.push(Some(v)),
            (ArrayData::Int16(vals), Value::Int16(v)) => vals.push(Some(v)),
            (ArrayData::Int32(vals), Value::Int32(v)) => vals.push(Some(v)),
            (ArrayData::Int64(vals), Value::Int64(v)) => vals.push(Some(v)),
            (ArrayData::UInt8(vals), Value::UInt8(v)) => vals.push(Some(v)),
            (ArrayData::UInt16(vals), Value::UInt16(v)) => vals.push(Some(v)),
            (ArrayData::UInt32(vals), Value::UInt32(v)) => vals.push(Some(v)),
            (ArrayData::UInt64(vals), Value::UInt64(v)) => vals.push(Some(v)),
            (ArrayData::Float32(vals), Value::Float32(v)) => vals.push(Some(v)),
            (ArrayData::Float64(vals), Value::Float64(v)) => vals.push(Some(v)),
            (ArrayData::Utf8(vals), Value::Utf8(v)) => vals.push(Some(v)),
            (data, other) => {
                return Err(Error::type_mismatch(data.data_type(), other.data_type()));
            }
        }
        Ok(())
    }

    pub fn append_null(&mut self) {
        with_storage!(&mut self.data, vals => vals.push(None))
    }

    pub fn append_values<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = Option<Value>>,
    {
        for v in values {
            self.append(v)?;
        }
        Ok(())
    }

    /// Freeze the accumulated values. The builder is consumed.
    pub fn build(self) -> ColumnArray {
        self.data.into()
    }
}
