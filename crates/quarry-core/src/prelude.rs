//! Convenient re-exports for downstream crates.

pub use crate::array::{ArrayData, ColumnArray, LiteralArray};
pub use crate::batch::RecordBatch;
pub use crate::builder::ArrayBuilder;
pub use crate::config::EngineConfig;
pub use crate::datasource::{DataSource, MemTable, TableProvider};
pub use crate::error::{Error, Result};
pub use crate::schema::{Field, Schema};
pub use crate::types::{PrimitiveType, Value};
