//! Per-query manifest: what ran, what it produced, and when.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hash::PlanHash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestId(pub Uuid);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryManifest {
    pub id: ManifestId,

    /// Hash of the (optimized) logical plan's printed form.
    pub plan_hash: PlanHash,

    /// Engine version string for provenance.
    pub engine_version: String,

    pub output_rows: u64,
    pub output_batches: u64,

    /// Milliseconds since Unix epoch (UTC).
    pub started_ms: u64,
    pub finished_ms: u64,
}

impl QueryManifest {
    pub fn new(plan_hash: PlanHash, started_ms: u64) -> Self {
        Self {
            id: ManifestId(Uuid::new_v4()),
            plan_hash,
            engine_version: crate::VERSION.to_string(),
            output_rows: 0,
            output_batches: 0,
            started_ms,
            finished_ms: started_ms,
        }
    }

    pub fn finish(mut self, finished_ms: u64, output_rows: u64, output_batches: u64) -> Self {
        self.finished_ms = finished_ms;
        self.output_rows = output_rows;
        self.output_batches = output_batches;
        self
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
