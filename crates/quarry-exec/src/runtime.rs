//! Runtime: register tables, plan queries and drive them to completion.
//!
//! Query path:
//! - optimize the logical plan (unless disabled in `EngineConfig`),
//! - lower it to a `PhysicalPlan`, capping output with a `LimitExec` when
//!   `max_output_rows` is set,
//! - pull batches from the root until it reports no more,
//! - record a `QueryManifest` keyed by the hash of the optimized plan.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use quarry_core::batch::RecordBatch;
use quarry_core::config::EngineConfig;
use quarry_core::datasource::{MemTable, TableProvider};
use quarry_core::error::Error;
use quarry_core::hash::hash_str;
use quarry_core::manifest::QueryManifest;
use quarry_core::schema::Schema;

use quarry_operators::{LimitExec, Operator, PhysicalPlan};

use quarry_planner::{create_physical_plan, optimize, pretty_format, DataFrame, LogicalPlan};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error("no table registered as '{0}'")]
    UnknownTable(String),
}

pub type Result<T> = std::result::Result<T, ExecError>;

/// Batches produced by one query plus its manifest.
#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub batches: Vec<RecordBatch>,
    pub manifest: QueryManifest,
}

impl QueryOutput {
    pub fn row_count(&self) -> usize {
        self.batches.iter().map(RecordBatch::row_count).sum()
    }
}

/// Owns the configuration and the table registry.
#[derive(Debug)]
pub struct ExecutionContext {
    cfg: EngineConfig,
    tables: HashMap<String, Arc<dyn TableProvider>>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            cfg: EngineConfig::default(),
            tables: HashMap::new(),
        }
    }
}

impl ExecutionContext {
    pub fn new(cfg: EngineConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            tables: HashMap::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Register (or replace) a table under `name`.
    pub fn register_table(&mut self, name: impl Into<String>, table: Arc<dyn TableProvider>) {
        self.tables.insert(name.into(), table);
    }

    /// Register in-memory batches, re-chunked to the configured batch size.
    pub fn register_batches(
        &mut self,
        name: impl Into<String>,
        schema: Schema,
        batches: Vec<RecordBatch>,
    ) -> Result<()> {
        let table = MemTable::try_new(schema, batches)?.with_batch_size(self.cfg.batch_size)?;
        self.register_table(name, Arc::new(table));
        Ok(())
    }

    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// A frame scanning every column of the named table.
    pub fn table(&self, name: &str) -> Result<DataFrame> {
        let provider = self
            .tables
            .get(name)
            .ok_or_else(|| ExecError::UnknownTable(name.to_string()))?;
        Ok(DataFrame::new(LogicalPlan::scan(
            name,
            Arc::clone(provider),
            vec![],
        )))
    }

    /// The logical plan that will actually be lowered for `df`.
    pub fn optimized_plan(&self, df: &DataFrame) -> Result<LogicalPlan> {
        if self.cfg.optimize {
            Ok(optimize(df.logical_plan())?)
        } else {
            Ok(df.logical_plan().clone())
        }
    }

    pub fn create_physical_plan(&self, plan: &LogicalPlan) -> Result<PhysicalPlan> {
        let physical = create_physical_plan(plan)?;
        let physical = match self.cfg.max_output_rows {
            Some(cap) => LimitExec::new(physical, cap).into(),
            None => physical,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            root = physical.name(),
            plan = %quarry_operators::pretty_format(&physical),
            "created physical plan"
        );

        Ok(physical)
    }

    /// Run `df` and return its batches.
    pub fn collect(&self, df: &DataFrame) -> Result<Vec<RecordBatch>> {
        Ok(self.execute(df)?.batches)
    }

    /// Run `df` and return its batches with a manifest of the run.
    pub fn execute(&self, df: &DataFrame) -> Result<QueryOutput> {
        let started_ms = now_millis();
        let plan = self.optimized_plan(df)?;
        let manifest = QueryManifest::new(hash_str(&pretty_format(&plan)), started_ms);

        let mut physical = self.create_physical_plan(&plan)?;
        let mut batches = Vec::new();
        let mut rows = 0usize;
        while physical.next()? {
            let batch = physical.execute()?;
            #[cfg(feature = "tracing")]
            tracing::trace!(batch = batches.len(), rows = batch.row_count(), "pulled batch");
            rows += batch.row_count();
            batches.push(batch);
        }

        let finished_ms = now_millis();
        let manifest = manifest.finish(finished_ms, rows as u64, batches.len() as u64);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            query = %manifest.id.0,
            rows,
            batches = batches.len(),
            elapsed_ms = finished_ms.saturating_sub(started_ms),
            "query finished"
        );

        Ok(QueryOutput { batches, manifest })
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
