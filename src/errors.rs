//! Error types for the record source and the search controller

use thiserror::Error;

use crate::models::RecordId;

/// Failure reported by a record source operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Record '{0}' not found")]
    NotFound(RecordId),

    /// Validation failure from the source; the message is shown to the user as-is
    #[error("{0}")]
    Rejected(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl SourceError {
    /// User-facing message carried in error notifications
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<sqlx::Error> for SourceError {
    fn from(err: sqlx::Error) -> Self {
        SourceError::Database(err.to_string())
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err.to_string())
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        SourceError::Csv(err.to_string())
    }
}

impl From<tokio::task::JoinError> for SourceError {
    fn from(err: tokio::task::JoinError) -> Self {
        SourceError::Task(err.to_string())
    }
}

/// Failures absorbed by the controller, kept as state or turned into a toast
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControllerError {
    #[error("Failed to load account types: {0}")]
    CatalogLoad(#[source] SourceError),

    #[error("Failed to load accounts: {0}")]
    RecordLoad(#[source] SourceError),

    #[error("Record update failed: {0}")]
    Update(#[source] SourceError),
}

impl ControllerError {
    pub fn source_error(&self) -> &SourceError {
        match self {
            ControllerError::CatalogLoad(e)
            | ControllerError::RecordLoad(e)
            | ControllerError::Update(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message_is_verbatim() {
        let err = SourceError::Rejected("Required fields are missing: [Name]".to_string());
        assert_eq!(err.message(), "Required fields are missing: [Name]");
    }

    #[test]
    fn test_controller_error_exposes_source() {
        let err = ControllerError::Update(SourceError::NotFound(RecordId::new("001")));
        assert_eq!(err.source_error().message(), "Record '001' not found");
        assert_eq!(err.to_string(), "Record update failed: Record '001' not found");
    }
}
