//! Request and configuration validation.

use super::{TransferConfig, TransferRequest};
use crate::error::{Result, TransferError};

/// Validate a transfer request.
pub fn validate_request(request: &TransferRequest) -> Result<()> {
    if request.source_target.trim().is_empty() {
        return Err(TransferError::Config(
            "source connection string is required".into(),
        ));
    }
    if request.destination_target.trim().is_empty() {
        return Err(TransferError::Config(
            "destination connection string is required".into(),
        ));
    }
    if request.source_table.is_empty() {
        return Err(TransferError::Config("source table name is required".into()));
    }
    if request.destination_table.is_empty() {
        return Err(TransferError::Config(
            "destination table name is required".into(),
        ));
    }

    Ok(())
}

/// Validate engine configuration.
pub fn validate_config(config: &TransferConfig) -> Result<()> {
    if config.batch_size == 0 {
        return Err(TransferError::Config(
            "batch_size must be at least 1".into(),
        ));
    }

    Ok(())
}
