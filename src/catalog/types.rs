//! Typed catalog records
//!
//! Every record is constructed fresh from a raw catalog response. Fields the
//! catalog did not supply stay `None` — the "unknown" sentinel — and are only
//! rendered as the literal string `"unknown"` at the tool-result boundary.
//! A `0` or empty string appears only when the catalog actually said so.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A data source: root of the catalog hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    pub id: u64,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub description: Option<String>,
}

impl DataSource {
    /// Map a raw catalog row. Rows without an id are dropped by the caller.
    pub fn from_raw(raw: &Value) -> Option<Self> {
        Some(Self {
            id: raw.get("id")?.as_u64()?,
            name: opt_string(raw, "title"),
            kind: opt_string(raw, "dbtype"),
            description: opt_string(raw, "description"),
        })
    }

    pub fn to_tool_json(&self) -> Value {
        json!({
            "data_source_id": self.id,
            "name": unknown_or_str(&self.name),
            "type": unknown_or_str(&self.kind),
            "description": unknown_or_str(&self.description),
        })
    }
}

/// A schema within a data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub name: Option<String>,
    pub description: Option<String>,
    pub data_source_id: u64,
}

impl SchemaInfo {
    pub fn from_raw(raw: &Value, data_source_id: u64) -> Self {
        Self {
            name: opt_string(raw, "name"),
            description: opt_string(raw, "description"),
            data_source_id,
        }
    }

    pub fn to_tool_json(&self) -> Value {
        json!({
            "schema_name": unknown_or_str(&self.name),
            "schema_description": unknown_or_str(&self.description),
        })
    }
}

/// A table as listed within a schema.
///
/// `row_count` and `popularity` are frequently unprofiled upstream; absence
/// is preserved, never defaulted to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSummary {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub row_count: Option<u64>,
    pub popularity: Option<f64>,
}

impl TableSummary {
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            name: opt_string(raw, "name"),
            kind: opt_string(raw, "table_type"),
            row_count: raw.get("number_of_rows").and_then(Value::as_u64),
            popularity: raw.get("popularity").and_then(Value::as_f64),
        }
    }

    pub fn to_tool_json(&self) -> Value {
        json!({
            "table_name": unknown_or_str(&self.name),
            "table_type": unknown_or_str(&self.kind),
            "row_count": self.row_count.map(Value::from).unwrap_or_else(unknown),
            "popularity": self.popularity.map(Value::from).unwrap_or_else(unknown),
        })
    }
}

/// Governance review state of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificationStatus {
    Certified,
    Deprecated,
    Pending,
    Unknown,
}

impl CertificationStatus {
    /// Parse the raw trust flag; anything unrecognized is Unknown.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_uppercase()) {
            Some(s) if s == "CERTIFIED" || s == "CERTIFICATION" => Self::Certified,
            Some(s) if s == "DEPRECATED" || s == "DEPRECATION" => Self::Deprecated,
            Some(s) if s == "PENDING" => Self::Pending,
            _ => Self::Unknown,
        }
    }

    fn to_tool_value(self) -> Value {
        match self {
            Self::Certified => Value::from("CERTIFIED"),
            Self::Deprecated => Value::from("DEPRECATED"),
            Self::Pending => Value::from("PENDING"),
            Self::Unknown => unknown(),
        }
    }
}

/// Detailed metadata for one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDetail {
    pub name: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub steward: Option<String>,
    pub certification: CertificationStatus,
    pub trust_status: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub sample_queries: Vec<String>,
}

impl TableDetail {
    pub fn from_raw(raw: &Value) -> Self {
        let trust = raw.get("trust_flags");
        let certification = CertificationStatus::parse(
            trust
                .and_then(|t| t.get("certification"))
                .and_then(Value::as_str),
        );
        let trust_status = trust
            .and_then(|t| t.get("endorsement"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            name: opt_string(raw, "name"),
            description: opt_string(raw, "description"),
            owner: opt_string(raw, "owner"),
            steward: opt_string(raw, "steward"),
            certification,
            trust_status,
            last_updated: opt_string(raw, "ts_updated")
                .and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            sample_queries: string_list(raw.get("sample_queries")),
        }
    }

    pub fn to_tool_json(&self) -> Value {
        json!({
            "table_name": unknown_or_str(&self.name),
            "table_description": unknown_or_str(&self.description),
            "owner": unknown_or_str(&self.owner),
            "steward": unknown_or_str(&self.steward),
            "certification": self.certification.to_tool_value(),
            "trust_status": unknown_or_str(&self.trust_status),
            "last_updated": self
                .last_updated
                .map(|dt| Value::from(dt.to_rfc3339()))
                .unwrap_or_else(unknown),
            "sample_queries": if self.sample_queries.is_empty() {
                unknown()
            } else {
                Value::from(self.sample_queries.clone())
            },
        })
    }
}

/// One column of a table, with sensitivity classifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: Option<String>,
    pub data_type: Option<String>,
    pub description: Option<String>,
    pub nullable: Option<bool>,
    pub classifications: Vec<String>,
}

impl ColumnInfo {
    pub fn from_raw(raw: &Value) -> Self {
        // Some catalog deployments report "column_type", others "data_type".
        let data_type = opt_string(raw, "column_type").or_else(|| opt_string(raw, "data_type"));

        Self {
            name: opt_string(raw, "name"),
            data_type,
            description: opt_string(raw, "description"),
            nullable: raw.get("nullable").and_then(Value::as_bool),
            classifications: string_list(raw.get("flags")),
        }
    }

    pub fn to_tool_json(&self) -> Value {
        json!({
            "column_name": unknown_or_str(&self.name),
            "data_type": unknown_or_str(&self.data_type),
            "description": unknown_or_str(&self.description),
            "nullable": self.nullable.map(Value::from).unwrap_or_else(unknown),
            "classification": if self.classifications.is_empty() {
                unknown()
            } else {
                Value::from(self.classifications.clone())
            },
        })
    }
}

/// Upstream/downstream dependency graph for a table.
///
/// Empty vectors mean the catalog has no lineage recorded; they render as
/// "unknown" in tool output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lineage {
    pub upstream: Vec<String>,
    pub downstream: Vec<String>,
    pub transformation_context: Option<String>,
}

impl Lineage {
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            upstream: table_refs(raw.get("upstream")),
            downstream: table_refs(raw.get("downstream")),
            transformation_context: opt_string(raw, "sql"),
        }
    }

    pub fn to_tool_json(&self) -> Value {
        json!({
            "upstream_tables": if self.upstream.is_empty() {
                unknown()
            } else {
                Value::from(self.upstream.clone())
            },
            "downstream_tables": if self.downstream.is_empty() {
                unknown()
            } else {
                Value::from(self.downstream.clone())
            },
            "transformation_context": unknown_or_str(&self.transformation_context),
        })
    }
}

fn opt_string(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(raw: Option<&Value>) -> Vec<String> {
    raw.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(_) => item.get("name").and_then(Value::as_str).map(str::to_string),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn table_refs(raw: Option<&Value>) -> Vec<String> {
    raw.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("key").and_then(Value::as_str).map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn unknown() -> Value {
    Value::from("unknown")
}

fn unknown_or_str(value: &Option<String>) -> Value {
    match value {
        Some(s) => Value::from(s.clone()),
        None => unknown(),
    }
}
