//! Database drivers implementing [`Connector`](crate::core::Connector).

pub mod mssql;

pub use mssql::{MssqlConnection, MssqlConnector};
