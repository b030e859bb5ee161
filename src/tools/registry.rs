//! Tool registry
//!
//! The closed set of catalog tools exposed to the oracle. Definitions carry
//! the JSON schemas advertised in every completion request; dispatch happens
//! by name through `CatalogTool::from_name`.

use serde_json::json;

use crate::llm::ToolDefinition;

/// The six read-only catalog tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogTool {
    ListDataSources,
    ListSchemas,
    ListTables,
    GetTableMetadata,
    GetColumnMetadata,
    GetLineage,
}

impl CatalogTool {
    pub const ALL: [CatalogTool; 6] = [
        CatalogTool::ListDataSources,
        CatalogTool::ListSchemas,
        CatalogTool::ListTables,
        CatalogTool::GetTableMetadata,
        CatalogTool::GetColumnMetadata,
        CatalogTool::GetLineage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CatalogTool::ListDataSources => "list_data_sources",
            CatalogTool::ListSchemas => "list_schemas",
            CatalogTool::ListTables => "list_tables",
            CatalogTool::GetTableMetadata => "get_table_metadata",
            CatalogTool::GetColumnMetadata => "get_column_metadata",
            CatalogTool::GetLineage => "get_lineage",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|tool| tool.name() == name)
    }

    /// Definition advertised to the oracle
    pub fn definition(&self) -> ToolDefinition {
        match self {
            CatalogTool::ListDataSources => ToolDefinition::new(
                self.name(),
                "List all data sources in the catalog with their ids, names and database types. \
                 Start here when the question does not name a data source.",
                json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            ),
            CatalogTool::ListSchemas => ToolDefinition::new(
                self.name(),
                "List the schemas in a data source with their descriptions.",
                json!({
                    "type": "object",
                    "properties": {
                        "data_source_id": {
                            "type": "integer",
                            "description": "Numeric id of the data source"
                        }
                    },
                    "required": ["data_source_id"]
                }),
            ),
            CatalogTool::ListTables => ToolDefinition::new(
                self.name(),
                "List the tables in a schema with type, row count and popularity.",
                json!({
                    "type": "object",
                    "properties": {
                        "data_source_id": {
                            "type": "integer",
                            "description": "Numeric id of the data source"
                        },
                        "schema_name": {
                            "type": "string",
                            "description": "Name of the schema, e.g. 'analytics'"
                        }
                    },
                    "required": ["data_source_id", "schema_name"]
                }),
            ),
            CatalogTool::GetTableMetadata => ToolDefinition::new(
                self.name(),
                "Get detailed metadata for one table: description, owner, steward, \
                 certification status, last update time and sample queries.",
                json!({
                    "type": "object",
                    "properties": {
                        "data_source_id": {
                            "type": "integer",
                            "description": "Numeric id of the data source"
                        },
                        "schema_name": {
                            "type": "string",
                            "description": "Name of the schema containing the table"
                        },
                        "table_name": {
                            "type": "string",
                            "description": "Name of the table, without the schema prefix"
                        }
                    },
                    "required": ["data_source_id", "schema_name", "table_name"]
                }),
            ),
            CatalogTool::GetColumnMetadata => ToolDefinition::new(
                self.name(),
                "List the columns of a table with data types, descriptions and sensitivity \
                 classifications such as PII.",
                json!({
                    "type": "object",
                    "properties": {
                        "data_source_id": {
                            "type": "integer",
                            "description": "Numeric id of the data source"
                        },
                        "schema_name": {
                            "type": "string",
                            "description": "Name of the schema containing the table"
                        },
                        "table_name": {
                            "type": "string",
                            "description": "Name of the table, without the schema prefix"
                        }
                    },
                    "required": ["data_source_id", "schema_name", "table_name"]
                }),
            ),
            CatalogTool::GetLineage => ToolDefinition::new(
                self.name(),
                "Get upstream and downstream lineage for a table, with transformation SQL \
                 where the catalog records it.",
                json!({
                    "type": "object",
                    "properties": {
                        "data_source_id": {
                            "type": "integer",
                            "description": "Numeric id of the data source"
                        },
                        "schema_name": {
                            "type": "string",
                            "description": "Name of the schema containing the table"
                        },
                        "table_name": {
                            "type": "string",
                            "description": "Name of the table, without the schema prefix"
                        }
                    },
                    "required": ["data_source_id", "schema_name", "table_name"]
                }),
            ),
        }
    }

    /// All definitions, in registry order
    pub fn definitions() -> Vec<ToolDefinition> {
        Self::ALL.iter().map(CatalogTool::definition).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for tool in CatalogTool::ALL {
            assert_eq!(CatalogTool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(CatalogTool::from_name("drop_table"), None);
    }

    #[test]
    fn test_definitions_cover_all_tools() {
        let definitions = CatalogTool::definitions();
        assert_eq!(definitions.len(), 6);

        let names: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
        assert!(names.contains(&"list_data_sources"));
        assert!(names.contains(&"get_lineage"));
    }

    #[test]
    fn test_schemas_declare_required_arguments() {
        let def = CatalogTool::GetTableMetadata.definition();
        let required = def.input_schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);

        let def = CatalogTool::ListDataSources.definition();
        assert!(def.input_schema["required"].as_array().unwrap().is_empty());
    }
}
