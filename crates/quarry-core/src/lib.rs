#![forbid(unsafe_code)]
//! quarry-core: the columnar data model every other layer builds on.
//!
//! - `types`: `PrimitiveType` and the dynamic `Value` union
//! - `schema`: `Field` / `Schema`
//! - `array` / `builder`: typed column vectors and their builders
//! - `batch`: `RecordBatch`
//! - `datasource`: the scan capability and the in-memory table
//!
//! No planning or execution lives here.

pub mod array;
pub mod batch;
pub mod builder;
pub mod config;
pub mod datasource;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod prelude;
pub mod schema;
pub mod types;

pub use error::{Error, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
