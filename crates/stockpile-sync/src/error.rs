//! # Sync Error Types
//!
//! Error types for the repository and its collaborators.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Local Store         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  DatabaseError          │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │                         │ │
//! │  │  ConfigLoad/Save│  │  UnexpectedStat.│  │                         │ │
//! │  │                 │  │  Deserialize    │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Callers never see SyncError directly from fetch_all/save: the         │
//! │  repository turns it into LoadFailure / SaveFailure (listener.rs).     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised by the repository's collaborators and configuration.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Remote base URL could not be used.
    #[error("Invalid remote URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// No response was received (DNS, refused connection, reset, TLS...).
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request exceeded the transport's timeout.
    #[error("Request timed out")]
    Timeout,

    /// Response arrived with a non-success status where a body was required.
    #[error("Unexpected response status: {0}")]
    UnexpectedStatus(u16),

    /// Response body could not be decoded.
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    // =========================================================================
    // Local Store Errors
    // =========================================================================
    /// Local store operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<stockpile_db::DbError> for SyncError {
    fn from(err: stockpile_db::DbError) -> Self {
        SyncError::DatabaseError(err.to_string())
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SyncError::Timeout
        } else if err.is_decode() {
            SyncError::DeserializationFailed(err.to_string())
        } else if let Some(status) = err.status() {
            SyncError::UnexpectedStatus(status.as_u16())
        } else if err.is_builder() {
            SyncError::InvalidConfig(err.to_string())
        } else {
            SyncError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::DeserializationFailed(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// True when the remote source could not be reached or understood.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            SyncError::ConnectionFailed(_)
                | SyncError::Timeout
                | SyncError::UnexpectedStatus(_)
                | SyncError::DeserializationFailed(_)
        )
    }

    /// True when the error comes from configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }

    /// True when the local store failed.
    pub fn is_store_error(&self) -> bool {
        matches!(self, SyncError::DatabaseError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert!(SyncError::ConnectionFailed("refused".into()).is_transport_error());
        assert!(SyncError::Timeout.is_transport_error());
        assert!(SyncError::UnexpectedStatus(503).is_transport_error());
        assert!(!SyncError::DatabaseError("locked".into()).is_transport_error());

        assert!(SyncError::InvalidUrl("nope".into()).is_config_error());
        assert!(SyncError::DatabaseError("locked".into()).is_store_error());
    }

    #[test]
    fn test_db_error_conversion() {
        let err: SyncError = stockpile_db::DbError::not_found("Product", 3).into();
        assert!(err.is_store_error());
        assert_eq!(err.to_string(), "Database error: Product not found: 3");
    }

    #[test]
    fn test_url_error_conversion() {
        let err: SyncError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, SyncError::InvalidUrl(_)));
    }
}
