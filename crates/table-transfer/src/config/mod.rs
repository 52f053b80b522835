//! Transfer request and engine configuration.

mod validation;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default number of rows per page.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// What to copy and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Source connection string.
    pub source_target: String,

    /// Destination connection string.
    pub destination_target: String,

    /// Table to read from.
    pub source_table: String,

    /// Table to write into. Equals `source_table` unless the operator named one.
    pub destination_table: String,
}

impl TransferRequest {
    /// Build a request. A blank or whitespace-only destination table falls
    /// back to the source table name.
    pub fn new(
        source_target: impl Into<String>,
        destination_target: impl Into<String>,
        source_table: impl Into<String>,
        destination_table: Option<&str>,
    ) -> Self {
        let source_table = source_table.into().trim().to_string();
        let destination_table = destination_table
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| source_table.clone());

        Self {
            source_target: source_target.into(),
            destination_target: destination_target.into(),
            source_table,
            destination_table,
        }
    }

    /// Validate the request.
    pub fn validate(&self) -> Result<()> {
        validation::validate_request(self)
    }
}

/// Engine tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Rows per page.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl TransferConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
