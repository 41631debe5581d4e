//! `sfcdp metadata`: list Data Cloud entities or their fields.

use serde::Serialize;
use tabled::Tabled;

use sfcdp_core::{EntityRow, FieldRow, Filters, MetadataRows, MetadataView, Session, SessionConfig};

use crate::cli::{GlobalOpts, MetadataArgs, MetadataKind, OutputFormat};
use crate::error::CliError;
use crate::messages::{Messages, fill};
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled, Serialize)]
struct EntityTableRow {
    #[tabled(rename = "Entity name")]
    #[serde(rename = "Entity name")]
    name: String,
    #[tabled(rename = "API Name")]
    #[serde(rename = "API Name")]
    api_name: String,
    #[tabled(rename = "Entity type")]
    #[serde(rename = "Entity type")]
    entity_type: String,
}

fn entity_row(r: &EntityRow) -> EntityTableRow {
    EntityTableRow {
        name: r.entity_name.clone(),
        api_name: r.entity_api_name.clone(),
        entity_type: r.entity_type.clone(),
    }
}

#[derive(Tabled, Serialize)]
struct FieldTableRow {
    #[tabled(rename = "Entity name")]
    #[serde(rename = "Entity name")]
    entity_name: String,
    #[tabled(rename = "Entity API name")]
    #[serde(rename = "Entity API name")]
    entity_api_name: String,
    #[tabled(rename = "Field name")]
    #[serde(rename = "Field name")]
    field_name: String,
    #[tabled(rename = "Datatype")]
    #[serde(rename = "Datatype")]
    field_type: String,
    #[tabled(rename = "API Name")]
    #[serde(rename = "API Name")]
    field_api_name: String,
}

fn field_row(r: &FieldRow) -> FieldTableRow {
    FieldTableRow {
        entity_name: r.entity_name.clone(),
        entity_api_name: r.entity_api_name.clone(),
        field_name: r.field_name.clone(),
        field_type: r.field_type.clone(),
        field_api_name: r.field_api_name.clone(),
    }
}

impl From<MetadataKind> for MetadataView {
    fn from(kind: MetadataKind) -> Self {
        match kind {
            MetadataKind::Field => MetadataView::Field,
            MetadataKind::Entity => MetadataView::Entity,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: &SessionConfig,
    args: MetadataArgs,
    global: &GlobalOpts,
    messages: &Messages,
) -> Result<(), CliError> {
    let session = Session::connect(config).await?;
    let entities = session.fetch_metadata().await?;

    let view = MetadataView::from(args.kind);
    let filters = Filters::new(args.filters);
    let rows = sfcdp_core::metadata::extract(&entities, view, &filters);
    tracing::debug!(%view, rows = rows.len(), "filtered metadata");

    let format = global.format();
    let out = match &rows {
        MetadataRows::Entities(rows) => output::render_list(
            &format,
            rows,
            entity_row,
            |r| r.entity_api_name.clone(),
        )?,
        MetadataRows::Fields(rows) => output::render_list(
            &format,
            rows,
            field_row,
            |r| format!("{}.{}", r.entity_api_name, r.field_api_name),
        )?,
    };

    if rows.is_empty() {
        output::print_status(&messages.metadata.empty, global.quiet);
    } else {
        tracing::info!(
            "{}",
            fill(
                &messages.metadata.summary,
                &[("count", &rows.len()), ("kind", &view)]
            )
        );
    }
    // Structured formats still print `[]` so pipelines get valid input.
    if !rows.is_empty() || format != OutputFormat::Table {
        output::print_output(&out, global.quiet);
    }
    Ok(())
}
