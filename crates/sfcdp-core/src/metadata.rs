// ── Metadata flattening and filtering ──
//
// The metadata endpoint returns a nested entity → fields tree. Both CLI
// views flatten it into rows; filters are applied against display and
// API names before anything is rendered.

use serde::Serialize;
use sfcdp_api::{EntityMetadata, FieldMetadata};
use strum::{Display, EnumString};

/// Which flattening of the metadata tree to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum MetadataView {
    /// One row per (entity, field) pair.
    #[default]
    Field,
    /// One row per entity.
    Entity,
}

/// Case-sensitive substring filters.
///
/// An item passes if *any* filter is a substring of its display name or
/// its API name. No filters means everything passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters(Vec<String>);

impl Filters {
    pub fn new<I, S>(filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            filters
                .into_iter()
                .map(Into::into)
                .filter(|f| !f.is_empty())
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, display_name: &str, api_name: &str) -> bool {
        self.is_empty()
            || self
                .0
                .iter()
                .any(|f| display_name.contains(f.as_str()) || api_name.contains(f.as_str()))
    }
}

/// Classification suffix of an API name: its last three characters.
///
/// `UnifiedIndividual__dlm` → `dlm`. This is a naming-convention
/// heuristic, not a server-provided type; names shorter than three
/// characters are returned whole.
pub fn entity_type(api_name: &str) -> String {
    let count = api_name.chars().count();
    api_name.chars().skip(count.saturating_sub(3)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRow {
    pub entity_name: String,
    pub entity_api_name: String,
    pub entity_type: String,
}

impl From<&EntityMetadata> for EntityRow {
    fn from(entity: &EntityMetadata) -> Self {
        Self {
            entity_name: entity.display_name.clone(),
            entity_api_name: entity.name.clone(),
            entity_type: entity_type(&entity.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRow {
    pub entity_name: String,
    pub entity_api_name: String,
    pub field_name: String,
    pub field_type: String,
    pub field_api_name: String,
}

impl FieldRow {
    fn new(entity: &EntityMetadata, field: &FieldMetadata) -> Self {
        Self {
            entity_name: entity.display_name.clone(),
            entity_api_name: entity.name.clone(),
            field_name: field.display_name.clone(),
            field_type: field.field_type.clone(),
            field_api_name: field.name.clone(),
        }
    }
}

/// Entities whose display or API name matches a filter.
pub fn entity_rows(entities: &[EntityMetadata], filters: &Filters) -> Vec<EntityRow> {
    entities
        .iter()
        .filter(|e| filters.matches(&e.display_name, &e.name))
        .map(EntityRow::from)
        .collect()
}

/// Fields of matching entities whose display or API name also matches.
///
/// Both the entity and the field must pass the same filter test.
pub fn field_rows(entities: &[EntityMetadata], filters: &Filters) -> Vec<FieldRow> {
    entities
        .iter()
        .filter(|e| filters.matches(&e.display_name, &e.name))
        .flat_map(|entity| {
            entity
                .fields
                .iter()
                .filter(|f| filters.matches(&f.display_name, &f.name))
                .map(move |f| FieldRow::new(entity, f))
        })
        .collect()
}

/// Rows for either view, serialized as a plain array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataRows {
    Fields(Vec<FieldRow>),
    Entities(Vec<EntityRow>),
}

impl MetadataRows {
    pub fn len(&self) -> usize {
        match self {
            Self::Fields(rows) => rows.len(),
            Self::Entities(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn extract(entities: &[EntityMetadata], view: MetadataView, filters: &Filters) -> MetadataRows {
    match view {
        MetadataView::Field => MetadataRows::Fields(field_rows(entities, filters)),
        MetadataView::Entity => MetadataRows::Entities(entity_rows(entities, filters)),
    }
}
