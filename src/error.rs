//! Error types for tabletalk
//!
//! Centralized error handling using thiserror. Component-level errors
//! (`CatalogError`, `LlmError`) live next to the code that raises them and
//! convert into this crate-wide enum at module boundaries.

use thiserror::Error;

/// All error types that can occur in tabletalk
#[derive(Debug, Error)]
pub enum TabletalkError {
    /// Catalog adapter error (not-found, retries exhausted, client error)
    #[error("catalog error: {0}")]
    Catalog(#[from] crate::catalog::CatalogError),

    /// Reasoning oracle error
    #[error("oracle error: {0}")]
    Oracle(#[from] crate::llm::LlmError),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for tabletalk operations
pub type Result<T> = std::result::Result<T, TabletalkError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;

    #[test]
    fn test_catalog_error_conversion() {
        let err: TabletalkError = CatalogError::NotFound.into();
        assert!(matches!(err, TabletalkError::Catalog(_)));
        assert_eq!(err.to_string(), "catalog error: not found");
    }

    #[test]
    fn test_config_error_display() {
        let err = TabletalkError::Config("missing base_url".to_string());
        assert_eq!(err.to_string(), "config error: missing base_url");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: TabletalkError = json_err.into();
        assert!(matches!(err, TabletalkError::Json(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<u32> {
            Ok(7)
        }

        fn returns_err() -> Result<u32> {
            Err(TabletalkError::Config("bad".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
