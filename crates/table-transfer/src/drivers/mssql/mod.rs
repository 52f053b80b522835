//! SQL Server driver built on Tiberius.
//!
//! One TCP connection per [`MssqlConnection`]; there is no pooling because
//! the engine opens each connection for exactly one scope.

mod connection;
mod convert;

pub use connection::{MssqlConnection, MssqlConnector};
