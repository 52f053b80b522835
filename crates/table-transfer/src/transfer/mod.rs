//! Batched table copy.
//!
//! The copier captures the source row count once, then walks the source in
//! fixed-size OFFSET/FETCH pages and bulk-loads each page into the
//! destination:
//!
//! ```text
//! COUNT_BIG(*) ─► [fetch page ─► bulk load ─► report progress]* ─► empty page ─► done
//! ```
//!
//! An empty page is the only stopping condition. Pages are not retried; a
//! failure on any page aborts the copy and leaves earlier pages committed in
//! the destination.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TransferConfig;
use crate::core::{Connection, ProgressSink, RowPage};
use crate::dialect;
use crate::error::{Result, TransferError};

/// Cumulative progress of a copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransferProgress {
    /// Rows loaded into the destination so far.
    pub rows_transferred: u64,

    /// Source row count captured before the first page. Never re-queried.
    pub total_rows: u64,
}

impl TransferProgress {
    pub fn new(total_rows: u64) -> Self {
        Self {
            rows_transferred: 0,
            total_rows,
        }
    }

    /// Whether every counted row has been transferred.
    pub fn is_complete(&self) -> bool {
        self.rows_transferred >= self.total_rows
    }

    /// Number of filled cells in a bar `width` cells wide, clamped to `width`.
    pub fn filled_cells(&self, width: usize) -> usize {
        if self.total_rows == 0 {
            return width;
        }
        let filled = self.rows_transferred.saturating_mul(width as u64) / self.total_rows;
        filled.min(width as u64) as usize
    }
}

/// Lazily fetches consecutive pages of a table.
///
/// Yields pages until the first empty one, then stays exhausted. It always
/// starts from offset zero and does not retry failed fetches.
pub struct PageCursor<'a, C: Connection + ?Sized> {
    conn: &'a mut C,
    table: &'a str,
    batch_size: usize,
    offset: u64,
    exhausted: bool,
}

impl<'a, C: Connection + ?Sized> PageCursor<'a, C> {
    pub fn new(conn: &'a mut C, table: &'a str, batch_size: usize) -> Self {
        Self {
            conn,
            table,
            batch_size,
            offset: 0,
            exhausted: false,
        }
    }

    /// Offset of the next page to fetch.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Fetch the next page, or `None` once the table is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<RowPage>> {
        if self.exhausted {
            return Ok(None);
        }

        let table = self.table;
        let sql = dialect::page_sql(table, self.offset, self.batch_size);
        let page = self
            .conn
            .fetch_rows(&sql)
            .await
            .map_err(|e| into_aborted(table, e))?;

        if page.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        debug!(
            "Fetched {} rows from {} at offset {}",
            page.len(),
            self.table,
            self.offset
        );
        self.offset += self.batch_size as u64;
        Ok(Some(page))
    }
}

/// Copies rows between two open connections in fixed-size pages.
#[derive(Debug, Clone)]
pub struct BatchCopier {
    batch_size: usize,
}

impl BatchCopier {
    pub fn new(config: &TransferConfig) -> Self {
        Self {
            batch_size: config.batch_size,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Copy every row of `source_table` into `destination_table`.
    ///
    /// Reports progress to `sink` after each loaded page and returns the
    /// final progress.
    pub async fn copy<S, D>(
        &self,
        source: &mut S,
        destination: &mut D,
        source_table: &str,
        destination_table: &str,
        sink: &mut dyn ProgressSink,
    ) -> Result<TransferProgress>
    where
        S: Connection + ?Sized,
        D: Connection + ?Sized,
    {
        let total_rows = source
            .execute_scalar(&dialect::row_count_sql(source_table))
            .await?
            .max(0) as u64;
        let mut progress = TransferProgress::new(total_rows);

        info!(
            "Copying {} rows from {} to {} (batch size {})",
            total_rows, source_table, destination_table, self.batch_size
        );

        let start = Instant::now();
        let mut cursor = PageCursor::new(source, source_table, self.batch_size);

        while let Some(page) = cursor.next_page().await? {
            let loaded = destination
                .bulk_load(destination_table, &page)
                .await
                .map_err(|e| into_aborted(destination_table, e))?;
            debug!("Loaded {} rows into {}", loaded, destination_table);

            progress.rows_transferred += page.len() as u64;
            sink.report(&progress);
        }

        let elapsed = start.elapsed().as_secs_f64();
        let rows_per_sec = if elapsed > 0.0 {
            (progress.rows_transferred as f64 / elapsed) as u64
        } else {
            progress.rows_transferred
        };
        info!(
            "Copied {} rows into {} in {:.2}s ({} rows/sec)",
            progress.rows_transferred, destination_table, elapsed, rows_per_sec
        );

        if progress.rows_transferred != progress.total_rows {
            warn!(
                "{}: transferred {} rows but counted {} before the copy; the source changed during the transfer",
                source_table, progress.rows_transferred, progress.total_rows
            );
        }

        Ok(progress)
    }
}

/// Wrap a page-level failure as [`TransferError::TransferAborted`].
fn into_aborted(table: &str, err: TransferError) -> TransferError {
    if matches!(err, TransferError::TransferAborted { .. }) {
        err
    } else {
        TransferError::aborted(table, err)
    }
}
