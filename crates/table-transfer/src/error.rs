//! Error types for table transfers.

use std::fmt;

use thiserror::Error;

/// Which side of a transfer a connection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => write!(f, "source"),
            Endpoint::Destination => write!(f, "destination"),
        }
    }
}

/// Main error type for transfer operations.
#[derive(Error, Debug)]
pub enum TransferError {
    /// Either endpoint could not be reached, rejected the login, or had an
    /// unusable connection string.
    #[error("Could not connect to {endpoint} database: {message}")]
    ConnectionFailure { endpoint: Endpoint, message: String },

    /// A source column has a type outside the fixed type map.
    #[error("Data type '{type_name}' of column '{column}' is not supported.")]
    UnsupportedType { column: String, type_name: String },

    /// The destination table exists with an incompatible structure.
    #[error("The destination table schema does not match the source table schema: {detail}")]
    SchemaMismatch { table: String, detail: String },

    /// A page could not be fetched from the source or loaded into the destination.
    #[error("Transfer failed for table {table}: {message}")]
    TransferAborted { table: String, message: String },

    /// Engine error outside the copy loop (metadata, counts, DDL).
    #[error("Database error: {0}")]
    Database(#[from] tiberius::error::Error),

    /// A query completed but its result was unusable.
    #[error("Query failed: {0}")]
    Query(String),

    /// Invalid request or engine configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Console or socket I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransferError {
    /// Create a ConnectionFailure error.
    pub fn connection(endpoint: Endpoint, message: impl fmt::Display) -> Self {
        TransferError::ConnectionFailure {
            endpoint,
            message: message.to_string(),
        }
    }

    /// Create a TransferAborted error.
    pub fn aborted(table: impl Into<String>, message: impl fmt::Display) -> Self {
        TransferError::TransferAborted {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for transfer operations.
pub type Result<T> = std::result::Result<T, TransferError>;
