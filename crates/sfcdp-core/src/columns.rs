// ── Column ordering ──
//
// Query pages declare their columns as a map of name → `{placeInOrder}`.
// Tables need a sequence. Rows themselves are never rewritten.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use sfcdp_api::ColumnMetadata;

/// A column ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderedColumn {
    /// Field name as it appears in row objects.
    pub key: String,
    /// Header text.
    pub label: String,
    /// Server-declared ordinal.
    pub position: u32,
}

/// Columns sorted ascending by `placeInOrder`.
///
/// The sort is stable, so duplicate ordinals keep the server's key order.
pub fn ordered_columns(metadata: &IndexMap<String, ColumnMetadata>) -> Vec<OrderedColumn> {
    let mut columns: Vec<OrderedColumn> = metadata
        .iter()
        .map(|(name, meta)| OrderedColumn {
            key: name.clone(),
            label: name.clone(),
            position: meta.place_in_order,
        })
        .collect();
    columns.sort_by_key(|c| c.position);
    columns
}

/// Look up a column's value in a row.
///
/// Object rows are keyed by field name; array rows are positional and
/// indexed by the declared ordinal.
pub fn cell<'r>(row: &'r Value, column: &OrderedColumn) -> Option<&'r Value> {
    match row {
        Value::Object(map) => map.get(&column.key),
        Value::Array(items) => items.get(usize::try_from(column.position).ok()?),
        _ => None,
    }
}
