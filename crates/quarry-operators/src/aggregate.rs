//! Hash aggregation.
//!
//! The operator drains its whole input on the first `execute()` and returns a
//! single batch with one row per distinct grouping key: grouping values
//! first, then one column per aggregate. Groups appear in the order their key
//! was first seen.

use std::collections::HashMap;
use std::fmt;

use quarry_core::batch::RecordBatch;
use quarry_core::builder::ArrayBuilder;
use quarry_core::error::{Error, Result};
use quarry_core::schema::Schema;
use quarry_core::types::Value;

use crate::expressions::{Accumulator, AggregateExpr, PhysicalExpr};
use crate::plan::PhysicalPlan;
use crate::traits::Operator;

/// Hashable image of one grouping value. Floats compare by bit pattern, so
/// `0.0` and `-0.0` form separate groups and equal NaNs share one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(u32),
    Float64(u64),
    Utf8(String),
}

impl From<&Option<Value>> for KeyPart {
    fn from(value: &Option<Value>) -> Self {
        match value {
            None => KeyPart::Null,
            Some(Value::Bool(v)) => KeyPart::Bool(*v),
            Some(Value::Int8(v)) => KeyPart::Int8(*v),
            Some(Value::Int16(v)) => KeyPart::Int16(*v),
            Some(Value::Int32(v)) => KeyPart::Int32(*v),
            Some(Value::Int64(v)) => KeyPart::Int64(*v),
            Some(Value::UInt8(v)) => KeyPart::UInt8(*v),
            Some(Value::UInt16(v)) => KeyPart::UInt16(*v),
            Some(Value::UInt32(v)) => KeyPart::UInt32(*v),
            Some(Value::UInt64(v)) => KeyPart::UInt64(*v),
            Some(Value::Float32(v)) => KeyPart::Float32(v.to_bits()),
            Some(Value::Float64(v)) => KeyPart::Float64(v.to_bits()),
            Some(Value::Utf8(v)) => KeyPart::Utf8(v.clone()),
        }
    }
}

type GroupKey = Vec<KeyPart>;

#[derive(Debug)]
struct GroupState {
    values: Vec<Option<Value>>,
    accumulators: Vec<Box<dyn Accumulator>>,
}

#[derive(Debug)]
pub struct HashAggregateExec {
    input: Box<PhysicalPlan>,
    group_exprs: Vec<PhysicalExpr>,
    agg_exprs: Vec<AggregateExpr>,
    schema: Schema,
    done: bool,
}

impl HashAggregateExec {
    pub fn new(
        input: PhysicalPlan,
        group_exprs: Vec<PhysicalExpr>,
        agg_exprs: Vec<AggregateExpr>,
        schema: Schema,
    ) -> Self {
        Self {
            input: Box::new(input),
            group_exprs,
            agg_exprs,
            schema,
            done: false,
        }
    }

    pub fn group_exprs(&self) -> &[PhysicalExpr] {
        &self.group_exprs
    }

    pub fn agg_exprs(&self) -> &[AggregateExpr] {
        &self.agg_exprs
    }

    fn consume(
        &self,
        batch: &RecordBatch,
        index: &mut HashMap<GroupKey, usize>,
        groups: &mut Vec<GroupState>,
    ) -> Result<()> {
        let group_columns = self
            .group_exprs
            .iter()
            .map(|e| e.evaluate(batch))
            .collect::<Result<Vec<_>>>()?;
        let agg_columns = self
            .agg_exprs
            .iter()
            .map(|e| e.input_expr().evaluate(batch))
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.row_count() {
            let values = group_columns
                .iter()
                .map(|c| c.get_value(row))
                .collect::<Result<Vec<_>>>()?;
            let key: GroupKey = values.iter().map(KeyPart::from).collect();

            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    groups.push(GroupState {
                        values,
                        accumulators: self
                            .agg_exprs
                            .iter()
                            .map(AggregateExpr::create_accumulator)
                            .collect(),
                    });
                    index.insert(key, groups.len() - 1);
                    groups.len() - 1
                }
            };

            let state = &mut groups[slot];
            for (acc, column) in state.accumulators.iter_mut().zip(&agg_columns) {
                acc.accumulate(column.get_value(row)?)?;
            }
        }
        Ok(())
    }
}

impl Operator for HashAggregateExec {
    fn name(&self) -> &'static str {
        "hash_aggregate"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next(&mut self) -> Result<bool> {
        Ok(!self.done)
    }

    fn execute(&mut self) -> Result<RecordBatch> {
        if self.done {
            return Err(Error::Invariant(
                "hash aggregate has already produced its result".into(),
            ));
        }

        // A failed drain leaves the input partly consumed; never run again.
        self.done = true;

        let mut index: HashMap<GroupKey, usize> = HashMap::new();
        let mut groups: Vec<GroupState> = Vec::new();
        let mut input_rows = 0usize;
        while self.input.next()? {
            let batch = self.input.execute()?;
            input_rows += batch.row_count();
            self.consume(&batch, &mut index, &mut groups)?;
        }

        let mut builders: Vec<ArrayBuilder> = self
            .schema
            .fields
            .iter()
            .map(|f| ArrayBuilder::with_capacity(f.data_type, groups.len()))
            .collect();
        let n_groups = self.group_exprs.len();
        for group in groups.iter() {
            for (builder, value) in builders.iter_mut().zip(&group.values) {
                builder.append(value.clone())?;
            }
            for (builder, acc) in builders.iter_mut().skip(n_groups).zip(&group.accumulators) {
                builder.append(acc.final_value())?;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(input_rows, groups = groups.len(), "hash aggregate drained input");
        #[cfg(not(feature = "tracing"))]
        let _ = input_rows;

        RecordBatch::try_new(
            self.schema.clone(),
            builders.into_iter().map(ArrayBuilder::build).collect(),
        )
    }

    fn children(&self) -> Vec<&PhysicalPlan> {
        vec![self.input.as_ref()]
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

impl fmt::Display for HashAggregateExec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashAggregateExec: groupExpr=")?;
        write_list(f, &self.group_exprs)?;
        f.write_str(", aggExpr=")?;
        write_list(f, &self.agg_exprs)
    }
}
