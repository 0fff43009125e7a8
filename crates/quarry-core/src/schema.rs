//! Logical schema types. Pure data; immutable once built.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::PrimitiveType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: PrimitiveType,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: PrimitiveType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.data_type)
    }
}

/// Ordered fields. Names need not be unique; name lookups use the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn find_first_index_by_name(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Select fields by name.
    ///
    /// An empty `names` is the identity projection. Otherwise, for each name in
    /// order, every field carrying that name is returned with its original
    /// index. Names with no match contribute nothing.
    pub fn select_by_name<S: AsRef<str>>(&self, names: &[S]) -> (Schema, Vec<usize>) {
        if names.is_empty() {
            return (self.clone(), (0..self.fields.len()).collect());
        }

        let mut fields = Vec::new();
        let mut indices = Vec::new();
        for name in names {
            for (idx, field) in self.fields.iter().enumerate() {
                if field.name == name.as_ref() {
                    fields.push(field.clone());
                    indices.push(idx);
                }
            }
        }
        (Schema { fields }, indices)
    }

    pub fn project_by_index(&self, indices: &[usize]) -> Result<Schema> {
        let fields = indices
            .iter()
            .map(|&idx| {
                self.fields
                    .get(idx)
                    .cloned()
                    .ok_or(Error::IndexOutOfBounds {
                        index: idx,
                        len: self.fields.len(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Schema { fields })
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}")?;
        }
        f.write_str("]")
    }
}
