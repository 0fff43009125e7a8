//! Data source capability consumed by scans, plus the in-memory table used by
//! tests and embedders.
//!
//! A `TableProvider` describes a table (full schema) and opens cursors over it.
//! The `DataSource` a provider opens has its projection fixed at construction
//! time and yields one batch per `next()`/`scan()` pair.

use std::fmt;
use std::sync::Arc;

use crate::batch::RecordBatch;
use crate::error::{Error, Result};
use crate::schema::Schema;

pub trait DataSource: Send + fmt::Debug {
    /// Schema of the batches this cursor yields (already projected).
    fn schema(&self) -> Schema;

    /// Advance to the next batch; `false` once exhausted.
    fn next(&mut self) -> Result<bool>;

    /// The batch at the current position.
    fn scan(&mut self) -> Result<RecordBatch>;
}

pub trait TableProvider: Send + Sync + fmt::Debug {
    /// Full, unprojected schema.
    fn schema(&self) -> Schema;

    /// Open a cursor reading only `projection` (empty = every column).
    fn open(&self, projection: &[String]) -> Result<Box<dyn DataSource>>;
}

/// Batches held in memory, shared between every cursor opened on it.
#[derive(Debug, Clone)]
pub struct MemTable {
    schema: Schema,
    batches: Arc<Vec<RecordBatch>>,
}

impl MemTable {
    pub fn try_new(schema: Schema, batches: Vec<RecordBatch>) -> Result<Self> {
        for (idx, batch) in batches.iter().enumerate() {
            if batch.column_count() != schema.len() {
                return Err(Error::Schema(format!(
                    "batch {idx} has {} columns, table schema has {}",
                    batch.column_count(),
                    schema.len()
                )));
            }
            for (field, col) in schema.fields.iter().zip(&batch.fields) {
                if field.data_type != col.get_type() {
                    return Err(Error::type_mismatch(field.data_type, col.get_type()));
                }
            }
        }
        Ok(Self {
            schema,
            batches: Arc::new(batches),
        })
    }

    /// Re-chunk the stored rows so no batch exceeds `batch_size` rows.
    pub fn with_batch_size(self, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::Config("batch size must be positive".into()));
        }
        let mut chunks = Vec::new();
        for batch in self.batches.iter() {
            let rows = batch.row_count();
            let mut offset = 0;
            while offset < rows {
                let len = batch_size.min(rows - offset);
                chunks.push(batch.slice(offset, len)?);
                offset += len;
            }
        }
        Ok(Self {
            schema: self.schema,
            batches: Arc::new(chunks),
        })
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }
}

impl TableProvider for MemTable {
    fn schema(&self) -> Schema {
        self.schema.clone()
    }

    fn open(&self, projection: &[String]) -> Result<Box<dyn DataSource>> {
        let (schema, indices) = self.schema.select_by_name(projection);
        Ok(Box::new(MemScan {
            schema,
            indices,
            batches: Arc::clone(&self.batches),
            cursor: 0,
            current: None,
        }))
    }
}

#[derive(Debug)]
pub struct MemScan {
    schema: Schema,
    indices: Vec<usize>,
    batches: Arc<Vec<RecordBatch>>,
    cursor: usize,
    current: Option<usize>,
}

impl DataSource for MemScan {
    fn schema(&self) -> Schema {
        self.schema.clone()
    }

    fn next(&mut self) -> Result<bool> {
        if self.cursor < self.batches.len() {
            self.current = Some(self.cursor);
            self.cursor += 1;
            Ok(true)
        } else {
            self.current = None;
            Ok(false)
        }
    }

    fn scan(&mut self) -> Result<RecordBatch> {
        let idx = self
            .current
            .ok_or_else(|| Error::Invariant("scan() called without a successful next()".into()))?;
        let batch = self.batches[idx].project(&self.indices)?;
        Ok(RecordBatch {
            schema: self.schema.clone(),
            fields: batch.fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ColumnArray;
    use crate::schema::Field;
    use crate::types::{PrimitiveType, Value};

    fn table() -> MemTable {
        let schema = Schema::new(vec![
            Field::new("Id", PrimitiveType::Int8),
            Field::new("Name", PrimitiveType::Utf8),
        ]);
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                ColumnArray::from(vec![1i8, 2, 3, 4]),
                ColumnArray::from(vec!["a", "b", "c", "d"]),
            ],
        )
        .unwrap();
        MemTable::try_new(schema, vec![batch]).unwrap()
    }

    #[test]
    fn scan_without_projection() {
        let mut src = table().open(&[]).unwrap();
        assert!(src.next().unwrap());
        let batch = src.scan().unwrap();
        assert_eq!(batch.column_count(), 2);
        assert_eq!(batch.field(1).unwrap().get_value(3).unwrap(), Some(Value::from("d")));
        assert!(!src.next().unwrap());
    }

    #[test]
    fn scan_with_projection() {
        let mut src = table().open(&["Name".to_string()]).unwrap();
        assert_eq!(src.schema().fields[0].name, "Name");
        assert!(src.next().unwrap());
        let batch = src.scan().unwrap();
        assert_eq!(batch.column_count(), 1);
        assert_eq!(batch.field(0).unwrap().get_value(0).unwrap(), Some(Value::from("a")));
    }

    #[test]
    fn rechunks_by_batch_size() {
        let t = table().with_batch_size(3).unwrap();
        let sizes: Vec<_> = t.batches().iter().map(RecordBatch::row_count).collect();
        assert_eq!(sizes, vec![3, 1]);

        let mut src = t.open(&[]).unwrap();
        let mut ids = Vec::new();
        while src.next().unwrap() {
            let batch = src.scan().unwrap();
            ids.extend(batch.field(0).unwrap().to_values());
        }
        assert_eq!(ids.len(), 4);
        assert_eq!(ids[3], Some(Value::Int8(4)));
    }

    #[test]
    fn scan_before_next_is_an_error() {
        let mut src = table().open(&[]).unwrap();
        assert!(matches!(src.scan(), Err(Error::Invariant(_))));
    }

    #[test]
    fn rejects_mistyped_batches() {
        let schema = Schema::new(vec![Field::new("a", PrimitiveType::Int64)]);
        let batch = RecordBatch::try_new(
            Schema::new(vec![Field::new("a", PrimitiveType::Int8)]),
            vec![ColumnArray::from(vec![1i8])],
        )
        .unwrap();
        assert!(MemTable::try_new(schema, vec![batch]).is_err());
    }
}
