//! Seams between the transfer engine and its collaborators.
//!
//! - [`Connector`] / [`Connection`]: the database, reached through plain SQL
//!   text plus a bulk loader
//! - [`ProgressSink`]: receives cumulative progress after every page
//! - [`ConfirmationGate`]: asks the operator before appending to a
//!   non-empty destination
//!
//! The engine only ever holds one connection per endpoint at a time and
//! awaits each call before issuing the next.

use async_trait::async_trait;

use crate::error::{Endpoint, Result};
use crate::transfer::TransferProgress;

use super::schema::TableSchema;
use super::value::RowPage;

/// An open database connection.
#[async_trait]
pub trait Connection: Send {
    /// Run a query and return the first column of the first row as an integer.
    async fn execute_scalar(&mut self, sql: &str) -> Result<i64>;

    /// Run a statement that returns no rows. Returns the affected row count.
    async fn execute_non_query(&mut self, sql: &str) -> Result<u64>;

    /// Describe the columns of `sql`'s first result set without reading rows.
    async fn query_metadata(&mut self, sql: &str) -> Result<TableSchema>;

    /// Run a query and materialize all of its rows.
    async fn fetch_rows(&mut self, sql: &str) -> Result<RowPage>;

    /// Bulk-load a page into `table`, values in the table's column order.
    /// Returns the number of rows loaded.
    async fn bulk_load(&mut self, table: &str, page: &RowPage) -> Result<u64>;

    /// Close the connection. Calling it twice is a no-op.
    async fn close(&mut self) -> Result<()>;
}

/// Opens connections to one endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Connection;

    /// Which side of the transfer this connector reaches.
    fn endpoint(&self) -> Endpoint;

    /// Open a new connection.
    async fn open(&self) -> Result<Self::Connection>;
}

/// Receives progress after every copied page.
pub trait ProgressSink {
    fn report(&mut self, progress: &TransferProgress);
}

impl<F> ProgressSink for F
where
    F: FnMut(&TransferProgress),
{
    fn report(&mut self, progress: &TransferProgress) {
        self(progress)
    }
}

/// Sink that discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: &TransferProgress) {}
}

/// Decides whether to append into a destination table that already has rows.
pub trait ConfirmationGate {
    /// Return `Ok(true)` to continue, `Ok(false)` to cancel the transfer.
    fn confirm_non_empty(&mut self, table: &str, row_count: i64) -> Result<bool>;
}

impl<F> ConfirmationGate for F
where
    F: FnMut(&str, i64) -> Result<bool>,
{
    fn confirm_non_empty(&mut self, table: &str, row_count: i64) -> Result<bool> {
        self(table, row_count)
    }
}
