//! Schema introspection and compatibility checks.

mod compare;

pub use compare::{first_difference, schemas_equal, SchemaDifference};

use tracing::debug;

use crate::core::{Connection, TableSchema};
use crate::dialect;
use crate::error::Result;

/// Read a table's column list without transferring any rows.
///
/// Issues a query whose predicate never matches, so only result-set
/// metadata comes back. Column order is whatever the engine returns for
/// `SELECT *` and is never reordered.
pub async fn read_schema<C>(conn: &mut C, table: &str) -> Result<TableSchema>
where
    C: Connection + ?Sized,
{
    let schema = conn.query_metadata(&dialect::schema_probe_sql(table)).await?;
    debug!("Read {} columns for {}", schema.len(), table);
    Ok(schema)
}
