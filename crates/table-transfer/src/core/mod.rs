//! Core types shared by the engine and the drivers.
//!
//! - [`schema`]: column and table metadata
//! - [`value`]: SQL values and row pages
//! - [`traits`]: connection, progress and confirmation seams

pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{ColumnDescriptor, SemanticType, TableSchema};
pub use traits::{ConfirmationGate, Connection, Connector, NoProgress, ProgressSink};
pub use value::{Row, RowPage, SqlNullType, SqlValue};
