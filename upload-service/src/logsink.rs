//! Structured-log run ledger
//!
//! Emits each run log entry as one structured `tracing` event, so the
//! hosting platform's log pipeline becomes the append-only ledger. An
//! external sheet or table sink can replace this by implementing `LogSink`.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::logsink::{LogSink, RunLogEntry};
use tracing::info;

#[derive(Debug, Default)]
pub struct TracingLogSink;

impl TracingLogSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LogSink for TracingLogSink {
    async fn append(&self, entry: RunLogEntry) -> Result<()> {
        let record = serde_json::to_string(&entry)
            .map_err(|e| BridgeError::OperationFailed(format!("Log entry encoding: {}", e)))?;
        info!(target: "run_log", %record, "Run log entry");
        Ok(())
    }
}
