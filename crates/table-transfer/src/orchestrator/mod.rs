//! End-to-end table transfer.
//!
//! Runs the pipeline strictly in sequence:
//!
//! 1. Open the source, read its schema.
//! 2. Open a short-lived destination connection, provision the table, close it.
//! 3. Open a fresh destination connection, copy all pages, close it.
//! 4. Close the source.
//!
//! Every connection is closed on every exit path of the scope that opened it.

use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{TransferConfig, TransferRequest};
use crate::core::{ConfirmationGate, Connection, Connector, ProgressSink, TableSchema};
use crate::drivers::MssqlConnector;
use crate::error::{Endpoint, Result};
use crate::introspect::read_schema;
use crate::provision::{provision_destination, ProvisionOutcome};
use crate::transfer::{BatchCopier, TransferProgress};

/// How a transfer ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Completed,
    Cancelled,
}

/// Result of a transfer run.
#[derive(Debug, Clone, Serialize)]
pub struct TransferSummary {
    pub source_table: String,
    pub destination_table: String,
    pub status: TransferStatus,
    /// Whether the destination table was created by this run.
    pub table_created: bool,
    /// Rows the destination held before the copy.
    pub existing_rows: i64,
    #[serde(flatten)]
    pub progress: TransferProgress,
    pub duration_seconds: f64,
}

impl TransferSummary {
    pub fn is_cancelled(&self) -> bool {
        self.status == TransferStatus::Cancelled
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Copies one table between two endpoints.
pub struct TableTransfer<S: Connector, D: Connector> {
    source: S,
    destination: D,
    config: TransferConfig,
}

impl TableTransfer<MssqlConnector, MssqlConnector> {
    /// Build a transfer between two SQL Server connection strings.
    pub fn mssql(request: &TransferRequest, config: TransferConfig) -> Result<Self> {
        let source = MssqlConnector::new(Endpoint::Source, &request.source_target)?;
        let destination = MssqlConnector::new(Endpoint::Destination, &request.destination_target)?;
        Ok(Self::new(source, destination, config))
    }
}

impl<S: Connector, D: Connector> TableTransfer<S, D> {
    pub fn new(source: S, destination: D, config: TransferConfig) -> Self {
        Self {
            source,
            destination,
            config,
        }
    }

    /// Run the transfer described by `request`.
    ///
    /// `gate` is consulted only when the destination already holds rows.
    /// `sink` receives progress after every page.
    pub async fn run(
        &self,
        request: &TransferRequest,
        gate: &mut dyn ConfirmationGate,
        sink: &mut dyn ProgressSink,
    ) -> Result<TransferSummary> {
        request.validate()?;
        self.config.validate()?;

        let start = Instant::now();
        info!(
            "Transferring {} -> {}",
            request.source_table, request.destination_table
        );

        let mut source = self.source.open().await?;
        let result = self.run_with_source(&mut source, request, gate, sink).await;
        close_quietly(&mut source, Endpoint::Source).await;

        let (outcome, progress) = result?;
        let status = if outcome.proceeds() {
            TransferStatus::Completed
        } else {
            TransferStatus::Cancelled
        };
        let existing_rows = match outcome {
            ProvisionOutcome::Confirmed { existing_rows }
            | ProvisionOutcome::Cancelled { existing_rows } => existing_rows,
            ProvisionOutcome::Created | ProvisionOutcome::Ready => 0,
        };

        Ok(TransferSummary {
            source_table: request.source_table.clone(),
            destination_table: request.destination_table.clone(),
            status,
            table_created: outcome.created(),
            existing_rows,
            progress,
            duration_seconds: start.elapsed().as_secs_f64(),
        })
    }

    async fn run_with_source(
        &self,
        source: &mut S::Connection,
        request: &TransferRequest,
        gate: &mut dyn ConfirmationGate,
        sink: &mut dyn ProgressSink,
    ) -> Result<(ProvisionOutcome, TransferProgress)> {
        let schema = read_schema(source, &request.source_table).await?;

        let outcome = self.provision(&schema, request, gate).await?;
        if !outcome.proceeds() {
            return Ok((outcome, TransferProgress::default()));
        }

        let mut destination = self.destination.open().await?;
        let copier = BatchCopier::new(&self.config);
        let result = copier
            .copy(
                source,
                &mut destination,
                &request.source_table,
                &request.destination_table,
                sink,
            )
            .await;
        close_quietly(&mut destination, Endpoint::Destination).await;

        Ok((outcome, result?))
    }

    async fn provision(
        &self,
        schema: &TableSchema,
        request: &TransferRequest,
        gate: &mut dyn ConfirmationGate,
    ) -> Result<ProvisionOutcome> {
        let mut destination = self.destination.open().await?;
        let result =
            provision_destination(&mut destination, &request.destination_table, schema, gate).await;
        close_quietly(&mut destination, Endpoint::Destination).await;
        result
    }
}

/// Close a connection, logging rather than propagating a failure so the
/// scope's own result is preserved.
async fn close_quietly<C: Connection>(conn: &mut C, endpoint: Endpoint) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close {} connection: {}", endpoint, e);
    }
}
