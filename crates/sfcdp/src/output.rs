//! Output formatting: table, JSON, YAML, CSV, plain.
//!
//! Renders data in the format selected by `--output`. Tables use `tabled`,
//! structured formats use serde, CSV uses the `csv` writer, plain emits
//! one value per line.

use std::io::{self, IsTerminal, Write};

use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled, builder::Builder, settings::Style};

use sfcdp_core::{OrderedColumn, cell};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color ────────────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serializable items in the chosen format.
///
/// `to_row` projects each item onto its table/CSV row; `id_fn` yields the
/// single value printed per line in `plain` mode.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled + Serialize,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Csv => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_csv(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serializable item in the chosen format.
///
/// Table mode uses `detail_fn`, since single-item views are not a list.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Csv => render_csv(std::slice::from_ref(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Two-column key/value table with caller-supplied headers.
pub fn render_pairs(headers: [&str; 2], pairs: &[(&str, String)]) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers.map(str::to_owned));
    for (key, value) in pairs {
        builder.push_record([(*key).to_owned(), value.clone()]);
    }
    builder.build().with(Style::rounded()).to_string()
}

// ── Query rows ───────────────────────────────────────────────────────

/// Render query rows with a dynamic column set.
///
/// `header` controls whether CSV output starts with the column names, so
/// consecutive pages concatenate into one valid document.
pub fn render_rows(
    format: &OutputFormat,
    columns: &[OrderedColumn],
    rows: &[Value],
    header: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            if columns.is_empty() {
                return Ok(String::new());
            }
            let mut builder = Builder::default();
            builder.push_record(columns.iter().map(|c| c.label.clone()));
            for row in rows {
                builder.push_record(columns.iter().map(|c| cell_text(cell(row, c))));
            }
            Ok(builder.build().with(Style::rounded()).to_string())
        }
        OutputFormat::Csv => {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(Vec::new());
            if header {
                writer
                    .write_record(columns.iter().map(|c| c.label.as_str()))
                    .map_err(CliError::render)?;
            }
            for row in rows {
                writer
                    .write_record(columns.iter().map(|c| cell_text(cell(row, c))))
                    .map_err(CliError::render)?;
            }
            finish_csv(writer)
        }
        OutputFormat::Plain => Ok(rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| cell_text(cell(row, c)))
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => render_json(rows, false),
        OutputFormat::JsonCompact => render_json(rows, true),
        OutputFormat::Yaml => render_yaml(rows),
    }
}

/// Display text for a cell: strings unquoted, null and missing empty.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Status line on stderr, suppressed by `--quiet`.
pub fn print_status(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_csv<R: Serialize>(rows: &[R]) -> Result<String, CliError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).map_err(CliError::render)?;
    }
    finish_csv(writer)
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String, CliError> {
    let bytes = writer.into_inner().map_err(CliError::render)?;
    let text = String::from_utf8(bytes).map_err(CliError::render)?;
    Ok(text.trim_end_matches('\n').to_owned())
}

pub(crate) fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    out.map_err(CliError::render)
}

pub(crate) fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(CliError::render)
}
