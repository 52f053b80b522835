//! Destination provisioning.
//!
//! Ensures the destination table exists with a schema derived from the
//! source, or validates an existing one:
//!
//! 1. Map every source column (fails before anything touches the destination).
//! 2. Absent table: `CREATE TABLE` from the mapped columns → [`ProvisionOutcome::Created`].
//! 3. Present table: compare schemas, then count rows. Non-empty tables need
//!    the operator's confirmation.
//!
//! This is the only place that issues DDL against the destination.

use tracing::{debug, info, warn};

use crate::core::{ConfirmationGate, Connection, TableSchema};
use crate::dialect;
use crate::error::{Result, TransferError};
use crate::introspect::{first_difference, read_schema};
use crate::typemap::map_schema;

/// Terminal state of provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The table did not exist and was created.
    Created,
    /// The table existed, matched, and was empty.
    Ready,
    /// The table existed, matched, held rows, and the operator chose to append.
    Confirmed { existing_rows: i64 },
    /// The table held rows and the operator declined.
    Cancelled { existing_rows: i64 },
}

impl ProvisionOutcome {
    /// Whether the copy should run.
    pub fn proceeds(&self) -> bool {
        !matches!(self, ProvisionOutcome::Cancelled { .. })
    }

    /// Whether the table was created by this run.
    pub fn created(&self) -> bool {
        matches!(self, ProvisionOutcome::Created)
    }
}

/// Ensure `table` on `conn` can receive rows shaped like `source`.
pub async fn provision_destination<C>(
    conn: &mut C,
    table: &str,
    source: &TableSchema,
    gate: &mut dyn ConfirmationGate,
) -> Result<ProvisionOutcome>
where
    C: Connection + ?Sized,
{
    let columns = map_schema(source)?;

    let exists = conn.execute_scalar(&dialect::table_exists_sql(table)).await? > 0;

    if !exists {
        let create_sql = dialect::create_table_sql(table, &columns);
        debug!("{}", create_sql);
        conn.execute_non_query(&create_sql).await?;
        info!("Created destination table {} ({} columns)", table, columns.len());
        return Ok(ProvisionOutcome::Created);
    }

    let destination = read_schema(conn, table).await?;
    if let Some(diff) = first_difference(source, &destination) {
        return Err(TransferError::SchemaMismatch {
            table: table.to_string(),
            detail: diff.to_string(),
        });
    }
    debug!("Destination table {} matches source schema", table);

    let existing_rows = conn.execute_scalar(&dialect::row_count_sql(table)).await?;
    if existing_rows == 0 {
        return Ok(ProvisionOutcome::Ready);
    }

    warn!("Destination table {} already holds {} rows", table, existing_rows);
    if gate.confirm_non_empty(table, existing_rows)? {
        Ok(ProvisionOutcome::Confirmed { existing_rows })
    } else {
        info!("Transfer into {} cancelled by operator", table);
        Ok(ProvisionOutcome::Cancelled { existing_rows })
    }
}
