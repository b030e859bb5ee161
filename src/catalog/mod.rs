//! Catalog adapter layer
//!
//! Resilient, cached, read-only access to the remote metadata catalog:
//! - typed records with explicit unknown sentinels
//! - TTL response cache + table-id lookup cache
//! - transport seam with retry/backoff and outcome classification

pub mod adapter;
pub mod cache;
pub mod transport;
pub mod types;

pub use adapter::CatalogAdapter;
pub use cache::{ResponseCache, cache_key};
pub use transport::{CATALOG_TOKEN_ENV, CatalogTransport, HttpTransport, MockTransport, TransportResponse};
pub use types::{
    CertificationStatus, ColumnInfo, DataSource, Lineage, SchemaInfo, TableDetail, TableSummary,
};

use thiserror::Error;

/// Errors raised by the catalog adapter.
///
/// `NotFound` is an expected, common outcome (object missing or caller lacks
/// visibility) and is handled as a value by the dispatcher, never raised past
/// it.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// Entity does not exist or is inaccessible to the caller's credentials
    #[error("not found")]
    NotFound,

    /// Transient failure that exhausted the retry budget
    #[error("catalog unavailable after {attempts} attempts: {message}")]
    Retryable { attempts: u32, message: String },

    /// Non-retryable client error (4xx other than 403/404)
    #[error("catalog client error {status}: {message}")]
    Client { status: u16, message: String },

    /// Network-level failure for a single attempt
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body did not have the expected shape
    #[error("unexpected catalog response: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(CatalogError::NotFound.to_string(), "not found");

        let retryable = CatalogError::Retryable {
            attempts: 3,
            message: "HTTP 503".to_string(),
        };
        assert_eq!(retryable.to_string(), "catalog unavailable after 3 attempts: HTTP 503");
    }

    #[test]
    fn test_not_found_and_retryable_are_distinguishable() {
        let not_found = CatalogError::NotFound.to_string();
        let retryable = CatalogError::Retryable {
            attempts: 3,
            message: "HTTP 500".to_string(),
        }
        .to_string();
        assert_ne!(not_found, retryable);
    }
}
