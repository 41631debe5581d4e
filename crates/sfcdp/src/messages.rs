//! User-facing message table.
//!
//! Loaded once from the embedded `messages.toml` and handed to command
//! handlers explicitly.

use serde::Deserialize;

use crate::error::CliError;

const MESSAGES_TOML: &str = include_str!("messages.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Messages {
    pub login: LoginMessages,
    pub metadata: MetadataMessages,
    pub query: QueryMessages,
    pub config: ConfigMessages,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginMessages {
    pub token_url: String,
    pub core_heading: String,
    pub data_cloud_heading: String,
    pub field_header: String,
    pub value_header: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataMessages {
    pub empty: String,
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryMessages {
    pub fetching: String,
    pub empty: String,
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigMessages {
    pub wizard_title: String,
    pub written: String,
    pub no_profiles: String,
    pub default_set: String,
    pub value_set: String,
}

impl Messages {
    pub fn load() -> Result<Self, CliError> {
        toml::from_str(MESSAGES_TOML).map_err(|e| CliError::Internal {
            message: format!("embedded messages.toml is invalid: {e}"),
        })
    }
}

/// Substitute `{name}` placeholders. Unknown placeholders are left as-is.
pub fn fill(template: &str, args: &[(&str, &dyn std::fmt::Display)]) -> String {
    args.iter().fold(template.to_owned(), |text, (name, value)| {
        text.replace(&format!("{{{name}}}"), &value.to_string())
    })
}
