//! Tool dispatcher
//!
//! Executes one tool call against the catalog adapter and renders the
//! outcome as text for the oracle. Dispatch never faults the conversation:
//! unknown tools, bad arguments and catalog errors all come back as error
//! tool-results phrased for the oracle to relay or recover from.

use std::sync::Arc;

use serde_json::Value;

use crate::catalog::{CatalogAdapter, CatalogError, CatalogTransport};
use crate::governance::{self, GovernanceFlags};
use crate::llm::ToolCall;

use super::registry::CatalogTool;

/// Outcome of one tool execution
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub content: String,
    pub is_error: bool,
    pub flags: GovernanceFlags,
}

impl ToolOutcome {
    fn success(content: String, flags: GovernanceFlags) -> Self {
        Self {
            content,
            is_error: false,
            flags,
        }
    }

    fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
            flags: GovernanceFlags::new(),
        }
    }
}

/// Routes tool calls from the oracle to the catalog adapter.
pub struct ToolDispatcher<T: CatalogTransport> {
    adapter: Arc<CatalogAdapter<T>>,
}

impl<T: CatalogTransport> ToolDispatcher<T> {
    pub fn new(adapter: Arc<CatalogAdapter<T>>) -> Self {
        Self { adapter }
    }

    /// Execute one tool call. Always returns an outcome; errors become
    /// error-flagged content for the oracle.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolOutcome {
        let Some(tool) = CatalogTool::from_name(&call.name) else {
            log::warn!("oracle requested unknown tool: {}", call.name);
            return ToolOutcome::error(format!("Error: unknown tool: {}", call.name));
        };

        log::info!("dispatching {} with {}", tool.name(), call.input);

        match self.execute(tool, &call.input).await {
            Ok(outcome) => outcome,
            Err(error) => self.render_error(tool, &call.input, error),
        }
    }

    async fn execute(&self, tool: CatalogTool, input: &Value) -> Result<ToolOutcome, DispatchError> {
        match tool {
            CatalogTool::ListDataSources => {
                let sources = self.adapter.list_data_sources().await?;
                if sources.is_empty() {
                    return Err(DispatchError::Catalog(CatalogError::NotFound));
                }
                let rendered: Vec<Value> = sources.iter().map(|s| s.to_tool_json()).collect();
                Ok(ToolOutcome::success(pretty(&rendered), GovernanceFlags::new()))
            }
            CatalogTool::ListSchemas => {
                let ds = int_arg(input, "data_source_id")?;
                let schemas = self.adapter.list_schemas(ds).await?;
                if schemas.is_empty() {
                    return Err(DispatchError::Catalog(CatalogError::NotFound));
                }
                let rendered: Vec<Value> = schemas.iter().map(|s| s.to_tool_json()).collect();
                Ok(ToolOutcome::success(pretty(&rendered), GovernanceFlags::new()))
            }
            CatalogTool::ListTables => {
                let ds = int_arg(input, "data_source_id")?;
                let schema = str_arg(input, "schema_name")?;
                let tables = self.adapter.list_tables(ds, &schema).await?;
                if tables.is_empty() {
                    return Err(DispatchError::Catalog(CatalogError::NotFound));
                }
                let rendered: Vec<Value> = tables.iter().map(|t| t.to_tool_json()).collect();
                Ok(ToolOutcome::success(pretty(&rendered), GovernanceFlags::new()))
            }
            CatalogTool::GetTableMetadata => {
                let ds = int_arg(input, "data_source_id")?;
                let schema = str_arg(input, "schema_name")?;
                let table = str_arg(input, "table_name")?;
                let detail = self.adapter.get_table_metadata(ds, &schema, &table).await?;
                let flags = governance::scan_table(&detail);
                Ok(ToolOutcome::success(pretty(&detail.to_tool_json()), flags))
            }
            CatalogTool::GetColumnMetadata => {
                let ds = int_arg(input, "data_source_id")?;
                let schema = str_arg(input, "schema_name")?;
                let table = str_arg(input, "table_name")?;
                let columns = self.adapter.get_column_metadata(ds, &schema, &table).await?;
                if columns.is_empty() {
                    return Err(DispatchError::Catalog(CatalogError::NotFound));
                }
                let flags = governance::scan_columns(&columns);
                let rendered: Vec<Value> = columns.iter().map(|c| c.to_tool_json()).collect();
                Ok(ToolOutcome::success(pretty(&rendered), flags))
            }
            CatalogTool::GetLineage => {
                let ds = int_arg(input, "data_source_id")?;
                let schema = str_arg(input, "schema_name")?;
                let table = str_arg(input, "table_name")?;
                let lineage = self.adapter.get_lineage(ds, &schema, &table).await?;
                Ok(ToolOutcome::success(pretty(&lineage.to_tool_json()), GovernanceFlags::new()))
            }
        }
    }

    /// Phrase a failure the way the oracle should relay it.
    fn render_error(&self, tool: CatalogTool, input: &Value, error: DispatchError) -> ToolOutcome {
        let message = match error {
            DispatchError::BadArgument(message) => message,
            DispatchError::Catalog(CatalogError::NotFound) => match tool {
                CatalogTool::ListDataSources => "Error: No data sources found or access denied".to_string(),
                CatalogTool::ListSchemas => format!(
                    "Error: No schemas found for data source {} or access denied",
                    input["data_source_id"]
                ),
                CatalogTool::ListTables => format!(
                    "Error: No tables found in {} or access denied",
                    display_str(input, "schema_name")
                ),
                CatalogTool::GetTableMetadata | CatalogTool::GetLineage => format!(
                    "Error: Table {}.{} not found or access denied",
                    display_str(input, "schema_name"),
                    display_str(input, "table_name")
                ),
                CatalogTool::GetColumnMetadata => format!(
                    "Error: No columns found for {}.{} or access denied",
                    display_str(input, "schema_name"),
                    display_str(input, "table_name")
                ),
            },
            DispatchError::Catalog(e) => format!("Error: catalog temporarily unavailable: {}", e),
        };
        log::warn!("{} failed: {}", tool.name(), message);
        ToolOutcome::error(message)
    }
}

enum DispatchError {
    BadArgument(String),
    Catalog(CatalogError),
}

impl From<CatalogError> for DispatchError {
    fn from(e: CatalogError) -> Self {
        DispatchError::Catalog(e)
    }
}

/// Integer argument, also accepting numeric strings since oracles sometimes
/// quote ids.
fn int_arg(input: &Value, key: &str) -> Result<u64, DispatchError> {
    match input.get(key) {
        Some(Value::Number(n)) if n.as_u64().is_some() => Ok(n.as_u64().unwrap_or_default()),
        Some(Value::String(s)) if s.trim().parse::<u64>().is_ok() => {
            Ok(s.trim().parse().unwrap_or_default())
        }
        _ => Err(DispatchError::BadArgument(format!("Error: {} must be an integer", key))),
    }
}

fn str_arg(input: &Value, key: &str) -> Result<String, DispatchError> {
    match input.get(key).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(DispatchError::BadArgument(format!(
            "Error: {} must be a non-empty string",
            key
        ))),
    }
}

fn display_str(input: &Value, key: &str) -> String {
    input
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

fn pretty<S: serde::Serialize>(value: &S) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
