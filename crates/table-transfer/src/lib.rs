//! # table-transfer
//!
//! Copy the contents of one SQL Server table into another table, possibly on
//! a different server.
//!
//! - **Schema introspection** without reading rows
//! - **Destination provisioning**: create the table from a fixed type map, or
//!   validate an existing one for compatibility and emptiness
//! - **Batched copy** in OFFSET/FETCH pages loaded with TDS bulk insert
//! - **Progress reporting** through an injected sink
//!
//! ## Example
//!
//! ```rust,no_run
//! use table_transfer::{NoProgress, TableTransfer, TransferConfig, TransferRequest};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> table_transfer::Result<()> {
//!     let request = TransferRequest::new(
//!         "Server=tcp:src,1433;Database=sales;User Id=sa;Password=...",
//!         "Server=tcp:dst,1433;Database=archive;User Id=sa;Password=...",
//!         "dbo.Orders",
//!         None,
//!     );
//!     let transfer = TableTransfer::mssql(&request, TransferConfig::default())?;
//!     let mut decline = |_: &str, _: i64| Ok::<_, table_transfer::TransferError>(false);
//!     let summary = transfer.run(&request, &mut decline, &mut NoProgress).await?;
//!     println!("Copied {} rows", summary.progress.rows_transferred);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod dialect;
pub mod drivers;
pub mod error;
pub mod introspect;
pub mod orchestrator;
pub mod provision;
pub mod transfer;
pub mod typemap;

// Re-exports for convenient access
pub use config::{TransferConfig, TransferRequest, DEFAULT_BATCH_SIZE};
pub use crate::core::{
    ColumnDescriptor, ConfirmationGate, Connection, Connector, NoProgress, ProgressSink, RowPage,
    SemanticType, SqlNullType, SqlValue, TableSchema,
};
pub use drivers::{MssqlConnection, MssqlConnector};
pub use error::{Endpoint, Result, TransferError};
pub use introspect::{read_schema, schemas_equal, SchemaDifference};
pub use orchestrator::{TableTransfer, TransferStatus, TransferSummary};
pub use provision::{provision_destination, ProvisionOutcome};
pub use transfer::{BatchCopier, PageCursor, TransferProgress};
pub use typemap::map_column;
