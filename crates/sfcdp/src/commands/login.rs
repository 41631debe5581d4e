//! `sfcdp login`: run the token pipeline and show what came back.

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;

use sfcdp_api::token_url_for;
use sfcdp_core::{CoreToken, DataCloudToken, Session, SessionConfig, redact};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::messages::{Messages, fill};
use crate::output;

/// Characters of each access token left visible.
const TOKEN_PREVIEW: usize = 20;

#[derive(Debug, Serialize)]
struct LoginSummary {
    core: CoreSummary,
    data_cloud: DataCloudSummary,
}

#[derive(Debug, Serialize)]
struct CoreSummary {
    instance_url: String,
    token_type: String,
    scope: String,
    id: String,
    access_token: String,
}

#[derive(Debug, Serialize)]
struct DataCloudSummary {
    instance_url: String,
    token_type: String,
    issued_token_type: String,
    expires_in: u64,
    access_token: String,
}

impl From<&CoreToken> for CoreSummary {
    fn from(t: &CoreToken) -> Self {
        Self {
            instance_url: t.instance_url.to_string(),
            token_type: t.token_type.clone(),
            scope: t.scope.clone(),
            id: t.id.clone(),
            access_token: redact(&t.access_token, TOKEN_PREVIEW),
        }
    }
}

impl From<&DataCloudToken> for DataCloudSummary {
    fn from(t: &DataCloudToken) -> Self {
        Self {
            instance_url: t.instance_url.clone(),
            token_type: t.token_type.clone(),
            issued_token_type: t.issued_token_type.clone(),
            expires_in: t.expires_in,
            access_token: redact(&t.access_token, TOKEN_PREVIEW),
        }
    }
}

impl CoreSummary {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("scope", self.scope.clone()),
            ("instance_url", self.instance_url.clone()),
            ("token_type", self.token_type.clone()),
            ("id", self.id.clone()),
            ("access_token", self.access_token.clone()),
        ]
    }
}

impl DataCloudSummary {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("instance_url", self.instance_url.clone()),
            ("token_type", self.token_type.clone()),
            ("issued_token_type", self.issued_token_type.clone()),
            ("expires_in", self.expires_in.to_string()),
            ("access_token", self.access_token.clone()),
        ]
    }
}

/// Flat row for CSV output.
#[derive(Debug, Clone, Tabled, Serialize)]
struct TokenField {
    token: &'static str,
    field: &'static str,
    value: String,
}

pub async fn handle(
    config: &SessionConfig,
    global: &GlobalOpts,
    messages: &Messages,
) -> Result<(), CliError> {
    let token_url =
        token_url_for(&config.credentials.login_url).map_err(sfcdp_core::CoreError::from)?;
    output::print_status(
        &fill(&messages.login.token_url, &[("url", &token_url)]),
        global.quiet,
    );

    let session = Session::connect(config).await?;
    let summary = LoginSummary {
        core: CoreSummary::from(session.core_token()),
        data_cloud: DataCloudSummary::from(session.data_cloud_token()),
    };

    let format = global.format();
    let out = match format {
        OutputFormat::Table => render_tables(&summary, global, messages),
        OutputFormat::Csv => {
            let rows: Vec<TokenField> = summary
                .core
                .pairs()
                .into_iter()
                .map(|(field, value)| TokenField {
                    token: "core",
                    field,
                    value,
                })
                .chain(
                    summary
                        .data_cloud
                        .pairs()
                        .into_iter()
                        .map(|(field, value)| TokenField {
                            token: "data_cloud",
                            field,
                            value,
                        }),
                )
                .collect();
            output::render_list(&format, &rows, TokenField::clone, |r| r.value.clone())?
        }
        _ => output::render_single(
            &format,
            &summary,
            |s| render_tables(s, global, messages),
            |s| s.data_cloud.instance_url.clone(),
        )?,
    };

    output::print_output(&out, global.quiet);
    Ok(())
}

fn render_tables(summary: &LoginSummary, global: &GlobalOpts, messages: &Messages) -> String {
    let color = output::should_color(&global.color);
    let heading = |text: &str| {
        if color {
            text.bold().green().to_string()
        } else {
            text.to_owned()
        }
    };
    let headers = [
        messages.login.field_header.as_str(),
        messages.login.value_header.as_str(),
    ];

    format!(
        "{}\n{}\n\n{}\n{}",
        heading(&messages.login.core_heading),
        output::render_pairs(headers, &summary.core.pairs()),
        heading(&messages.login.data_cloud_heading),
        output::render_pairs(headers, &summary.data_cloud.pairs()),
    )
}
