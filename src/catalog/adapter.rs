//! Catalog adapter
//!
//! Normalizes the remote metadata catalog's HTTP API into six read-only
//! operations. Every operation is cache-first; misses go over the transport
//! with retry and exponential backoff. Outcomes are classified per attempt:
//! 2xx parses and caches, 403/404 is NotFound (an expected value, not a
//! fault), 5xx/429 and transport failures retry, any other 4xx is a
//! non-retryable client error.

use std::time::Duration;

use serde_json::Value;

use crate::config::CatalogConfig;

use super::cache::{ResponseCache, cache_key};
use super::transport::{CatalogTransport, TransportResponse};
use super::types::{ColumnInfo, DataSource, Lineage, SchemaInfo, TableDetail, TableSummary};
use super::CatalogError;

/// Resilient, cached, retrying access to the remote metadata catalog.
pub struct CatalogAdapter<T: CatalogTransport> {
    transport: T,
    cache: ResponseCache,
    retry_attempts: u32,
    retry_base_delay: Duration,
}

impl<T: CatalogTransport> CatalogAdapter<T> {
    pub fn new(transport: T, config: &CatalogConfig) -> Self {
        Self {
            transport,
            cache: ResponseCache::new(config.cache_ttl()),
            retry_attempts: config.retry_attempts.max(1),
            retry_base_delay: config.retry_base_delay(),
        }
    }

    /// List all data sources visible to the caller's credentials.
    pub async fn list_data_sources(&self) -> Result<Vec<DataSource>, CatalogError> {
        let body = self
            .request("list_data_sources", &[], "/integration/v1/datasource/", &[], true)
            .await?;

        let rows = as_rows(&body)?;
        Ok(rows.iter().filter_map(DataSource::from_raw).collect())
    }

    /// List schemas in a data source. Empty means none visible, not an error.
    pub async fn list_schemas(&self, data_source_id: u64) -> Result<Vec<SchemaInfo>, CatalogError> {
        let ds = data_source_id.to_string();
        let body = self
            .request(
                "list_schemas",
                &[&ds],
                "/integration/v2/schema/",
                &[("ds_id", ds.clone())],
                true,
            )
            .await?;

        let rows = as_rows(&body)?;
        Ok(rows.iter().map(|r| SchemaInfo::from_raw(r, data_source_id)).collect())
    }

    /// List tables in a schema.
    pub async fn list_tables(
        &self,
        data_source_id: u64,
        schema_name: &str,
    ) -> Result<Vec<TableSummary>, CatalogError> {
        let ds = data_source_id.to_string();
        let body = self
            .request(
                "list_tables",
                &[&ds, schema_name],
                "/integration/v2/table/",
                &[("ds_id", ds.clone()), ("schema_name", schema_name.to_string())],
                true,
            )
            .await?;

        let rows = as_rows(&body)?;
        Ok(rows.iter().map(TableSummary::from_raw).collect())
    }

    /// Detailed metadata for one table. The catalog answers a filtered list;
    /// an empty list means the table does not exist or is not visible.
    pub async fn get_table_metadata(
        &self,
        data_source_id: u64,
        schema_name: &str,
        table_name: &str,
    ) -> Result<TableDetail, CatalogError> {
        let ds = data_source_id.to_string();
        let body = self
            .request(
                "get_table_metadata",
                &[&ds, schema_name, table_name],
                "/integration/v2/table/",
                &[
                    ("ds_id", ds.clone()),
                    ("schema_name", schema_name.to_string()),
                    ("name", table_name.to_string()),
                ],
                true,
            )
            .await?;

        let rows = as_rows(&body)?;
        match rows.first() {
            Some(row) => Ok(TableDetail::from_raw(row)),
            None => Err(CatalogError::NotFound),
        }
    }

    /// Column definitions and classifications for a table.
    pub async fn get_column_metadata(
        &self,
        data_source_id: u64,
        schema_name: &str,
        table_name: &str,
    ) -> Result<Vec<ColumnInfo>, CatalogError> {
        // Resolving the id first doubles as the existence check.
        self.table_id(data_source_id, schema_name, table_name).await?;

        let ds = data_source_id.to_string();
        let qualified = format!("{}.{}", schema_name, table_name);
        let body = self
            .request(
                "get_column_metadata",
                &[&ds, schema_name, table_name],
                "/integration/v2/column/",
                &[("ds_id", ds.clone()), ("table_name", qualified)],
                true,
            )
            .await?;

        let rows = as_rows(&body)?;
        Ok(rows.iter().map(ColumnInfo::from_raw).collect())
    }

    /// Upstream/downstream lineage for a table. A table with no recorded
    /// lineage yields empty fields; a missing table is NotFound.
    pub async fn get_lineage(
        &self,
        data_source_id: u64,
        schema_name: &str,
        table_name: &str,
    ) -> Result<Lineage, CatalogError> {
        let table_id = self.table_id(data_source_id, schema_name, table_name).await?;

        let ds = data_source_id.to_string();
        let result = self
            .request(
                "get_lineage",
                &[&ds, schema_name, table_name],
                "/integration/v2/lineage/",
                &[("oid", table_id.to_string()), ("otype", "table".to_string())],
                true,
            )
            .await;

        match result {
            Ok(body) => Ok(Lineage::from_raw(&body)),
            // The table exists but has no lineage object; fields stay empty.
            Err(CatalogError::NotFound) => Ok(Lineage::default()),
            Err(e) => Err(e),
        }
    }

    /// Clear the response and table-id caches.
    pub fn flush_cache(&self) {
        self.cache.flush();
    }

    /// The underlying transport. Tests use this to inspect recorded calls.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve the numeric table id, with a dedicated cache shared by the
    /// column and lineage operations.
    async fn table_id(
        &self,
        data_source_id: u64,
        schema_name: &str,
        table_name: &str,
    ) -> Result<u64, CatalogError> {
        let key = cache_key("table_id", &[&data_source_id.to_string(), schema_name, table_name]);
        if let Some(id) = self.cache.table_id(&key) {
            log::debug!("table id cache hit: {}", key);
            return Ok(id);
        }

        let ds = data_source_id.to_string();
        let body = self
            .request(
                "table_id",
                &[&ds, schema_name, table_name],
                "/integration/v2/table/",
                &[
                    ("ds_id", ds.clone()),
                    ("schema_name", schema_name.to_string()),
                    ("name", table_name.to_string()),
                ],
                false,
            )
            .await?;

        let rows = as_rows(&body)?;
        let id = rows
            .first()
            .and_then(|row| row.get("id"))
            .and_then(Value::as_u64)
            .ok_or(CatalogError::NotFound)?;

        self.cache.put_table_id(&key, id);
        Ok(id)
    }

    /// Cache-first GET with bounded retry. Every remote attempt leaves an
    /// audit log line with operation, arguments and outcome.
    async fn request(
        &self,
        op: &str,
        args: &[&str],
        path: &str,
        query: &[(&str, String)],
        use_cache: bool,
    ) -> Result<Value, CatalogError> {
        let key = cache_key(op, args);
        if use_cache {
            if let Some(cached) = self.cache.get(&key) {
                return Ok(cached);
            }
        }

        let mut delay = self.retry_base_delay;
        let mut last_failure = String::new();

        for attempt in 1..=self.retry_attempts {
            match self.transport.get(path, query).await {
                Ok(response) if response.is_success() => {
                    log::info!("catalog {}({}): ok", op, args.join(", "));
                    if use_cache {
                        self.cache.put(&key, response.body.clone());
                    }
                    return Ok(response.body);
                }
                Ok(TransportResponse { status: 403 | 404, .. }) => {
                    log::warn!("catalog {}({}): not found or access denied", op, args.join(", "));
                    return Err(CatalogError::NotFound);
                }
                Ok(TransportResponse { status, .. }) if status == 429 || status >= 500 => {
                    last_failure = format!("HTTP {}", status);
                    log::warn!(
                        "catalog {}({}): {} (attempt {}/{})",
                        op,
                        args.join(", "),
                        last_failure,
                        attempt,
                        self.retry_attempts
                    );
                }
                Ok(TransportResponse { status, body }) => {
                    let message = error_message(&body);
                    log::error!("catalog {}({}): HTTP {} {}", op, args.join(", "), status, message);
                    return Err(CatalogError::Client { status, message });
                }
                Err(CatalogError::Transport(message)) => {
                    last_failure = message.clone();
                    log::warn!(
                        "catalog {}({}): transport failure: {} (attempt {}/{})",
                        op,
                        args.join(", "),
                        message,
                        attempt,
                        self.retry_attempts
                    );
                }
                Err(e) => return Err(e),
            }

            if attempt < self.retry_attempts {
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }

        Err(CatalogError::Retryable {
            attempts: self.retry_attempts,
            message: last_failure,
        })
    }
}

fn as_rows(body: &Value) -> Result<Vec<Value>, CatalogError> {
    body.as_array()
        .cloned()
        .ok_or_else(|| CatalogError::Decode("expected a JSON array response".to_string()))
}

fn error_message(body: &Value) -> String {
    body.get("detail")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .unwrap_or("client error")
        .to_string()
}
