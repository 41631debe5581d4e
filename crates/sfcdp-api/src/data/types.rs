// Wire types for the Data Cloud metadata and query endpoints.
//
// Field names follow the API's camelCase. Anything the tables don't
// need is either ignored or captured in `extra` so `--json` output
// stays faithful to the server.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ── Metadata ────────────────────────────────────────────────────────

/// `GET /api/v1/metadata/` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataResponse {
    pub metadata: Vec<EntityMetadata>,
}

/// A data model object, data lake object, or calculated insight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    pub display_name: String,
    /// API name, e.g. `UnifiedIndividual__dlm`.
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    pub display_name: String,
    pub name: String,
    /// Data type, e.g. `STRING`, `NUMBER`, `DATE_TIME`.
    #[serde(rename = "type")]
    pub field_type: String,
}

// ── Query ───────────────────────────────────────────────────────────

/// `POST /api/v1/query` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    pub sql: String,
    pub limit: u64,
    pub offset: u64,
}

/// One page of query results.
///
/// `metadata` keeps the server's key order; rows are passed through
/// untouched (objects keyed by column, or positional arrays).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub metadata: IndexMap<String, ColumnMetadata>,
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    /// Required: without it the pagination loop has no stop condition.
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    /// Zero-based column position declared by the server.
    pub place_in_order: u32,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_code: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_without_fields_defaults_to_empty() {
        let entity: EntityMetadata = serde_json::from_value(json!({
            "displayName": "Individual",
            "name": "ssot__Individual__dlm"
        }))
        .unwrap();
        assert!(entity.fields.is_empty());
    }

    #[test]
    fn query_metadata_keeps_server_order() {
        let page: QueryResponse = serde_json::from_value(json!({
            "metadata": {
                "zeta": { "placeInOrder": 0, "type": "VARCHAR", "typeCode": 12 },
                "alpha": { "placeInOrder": 1, "type": "DECIMAL", "typeCode": 3 }
            },
            "data": [],
            "done": true
        }))
        .unwrap();
        let keys: Vec<_> = page.metadata.keys().cloned().collect();
        assert_eq!(keys, ["zeta", "alpha"]);
        assert_eq!(page.metadata["zeta"].column_type.as_deref(), Some("VARCHAR"));
        assert_eq!(page.metadata["alpha"].type_code, Some(3));
    }

    #[test]
    fn query_page_without_done_is_rejected() {
        let result = serde_json::from_value::<QueryResponse>(json!({ "data": [] }));
        assert!(result.is_err());
    }
}
