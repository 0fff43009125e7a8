//! `RecordBatch`: a schema plus one equally-long column per field.
//!
//! Batches are never mutated after construction; every transform builds a
//! new batch.

use std::fmt;

use crate::array::ColumnArray;
use crate::error::{Error, Result};
use crate::schema::Schema;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch {
    pub schema: Schema,
    pub fields: Vec<ColumnArray>,
}

impl RecordBatch {
    /// Build a batch, checking one array per field and equal lengths.
    pub fn try_new(schema: Schema, fields: Vec<ColumnArray>) -> Result<Self> {
        if schema.len() != fields.len() {
            return Err(Error::Schema(format!(
                "schema has {} fields but {} columns were supplied",
                schema.len(),
                fields.len()
            )));
        }
        if let Some(first) = fields.first() {
            let rows = first.size();
            for (idx, col) in fields.iter().enumerate().skip(1) {
                if col.size() != rows {
                    return Err(Error::Schema(format!(
                        "column {idx} has {} rows, expected {rows}",
                        col.size()
                    )));
                }
            }
        }
        Ok(Self { schema, fields })
    }

    /// Rows in the batch; a batch with no columns has zero rows.
    pub fn row_count(&self) -> usize {
        self.fields.first().map(ColumnArray::size).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, i: usize) -> Result<&ColumnArray> {
        self.fields.get(i).ok_or(Error::IndexOutOfBounds {
            index: i,
            len: self.fields.len(),
        })
    }

    /// Rows `offset..offset + len` of every column.
    pub fn slice(&self, offset: usize, len: usize) -> Result<RecordBatch> {
        let fields = self
            .fields
            .iter()
            .map(|col| col.slice(offset, len))
            .collect::<Result<Vec<_>>>()?;
        Ok(RecordBatch {
            schema: self.schema.clone(),
            fields,
        })
    }

    /// Keep the columns at `indices`, in that order.
    pub fn project(&self, indices: &[usize]) -> Result<RecordBatch> {
        let schema = self.schema.project_by_index(indices)?;
        let fields = indices
            .iter()
            .map(|&i| self.field(i).cloned())
            .collect::<Result<Vec<_>>>()?;
        Ok(RecordBatch { schema, fields })
    }
}

/// One CSV line per row; nulls print as `null`.
impl fmt::Display for RecordBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.row_count() {
            for (col_idx, col) in self.fields.iter().enumerate() {
                if col_idx > 0 {
                    f.write_str(",")?;
                }
                match col.get_value(row) {
                    Ok(Some(v)) => write!(f, "{v}")?,
                    Ok(None) => f.write_str("null")?,
                    Err(_) => return Err(fmt::Error),
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
