//! Clap derive structures for the `sfcdp` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.
//! Also compiled by `build.rs` for man page generation, so it may only
//! depend on clap and clap_complete.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sfcdp -- Salesforce Data Cloud from the command line
#[derive(Debug, Parser)]
#[command(
    name = "sfcdp",
    version,
    about = "Explore Salesforce Data Cloud metadata and run queries",
    long_about = "Authenticates with a connected app's JWT bearer flow, exchanges the\n\
        core access token for a Data Cloud token, then lists metadata or runs\n\
        SQL queries against the Data Cloud Query API.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "SFCDP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SFCDP_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Shorthand for --output json
    #[arg(long, global = true)]
    pub json: bool,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Request timeout in seconds [default: config, else 120]
    #[arg(long, env = "SFCDP_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Additional CA certificate (PEM) to trust
    #[arg(long, env = "SFCDP_CA_CERT", global = true)]
    pub ca_cert: Option<PathBuf>,
}

impl GlobalOpts {
    /// The effective output format, honoring `--json`.
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.output.clone()
        }
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Comma-separated values with a header row
    Csv,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authenticate and show the core and Data Cloud tokens
    Login(LoginArgs),

    /// List Data Cloud entities or fields
    #[command(alias = "meta")]
    Metadata(MetadataArgs),

    /// Run a SQL query against Data Cloud
    #[command(alias = "q")]
    Query(QueryArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Connected App Credentials ────────────────────────────────────────

/// Identity flags shared by every command that talks to Salesforce.
///
/// Each falls back to its environment variable, then to the active
/// config profile.
#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Connected app consumer key
    #[arg(long = "clientid", short = 'i', env = "SFCDP_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Salesforce username to authenticate as
    #[arg(long, short = 'u', env = "SFCDP_USERNAME")]
    pub username: Option<String>,

    /// Login URL [default: https://login.salesforce.com]
    #[arg(long = "loginurl", short = 'r', env = "SFCDP_LOGIN_URL")]
    pub login_url: Option<String>,

    /// Path to the connected app's PEM private key
    #[arg(long = "privatekey", short = 'k', env = "SFCDP_PRIVATE_KEY")]
    pub private_key: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
#[command(after_help = "Examples:\n  \
    sfcdp login -i 3MVG9... -u etl@example.com -k server.key\n  \
    sfcdp login -p sandbox --json")]
pub struct LoginArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  METADATA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
#[command(after_help = "Examples:\n  \
    sfcdp metadata -i 3MVG9... -u etl@example.com -k server.key -t ENTITY\n  \
    sfcdp metadata -p prod -f Individual,Email")]
pub struct MetadataArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// List fields or entities
    #[arg(
        long = "type",
        short = 't',
        value_enum,
        default_value = "FIELD",
        ignore_case = true
    )]
    pub kind: MetadataKind,

    /// Substring filters on display or API name (comma-separated or repeated)
    #[arg(long, short = 'f', value_delimiter = ',')]
    pub filters: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetadataKind {
    /// One row per entity field
    #[value(name = "FIELD")]
    Field,
    /// One row per entity
    #[value(name = "ENTITY")]
    Entity,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  QUERY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
#[command(after_help = "Examples:\n  \
    sfcdp query -p prod -q 'SELECT ssot__Id__c FROM UnifiedIndividual__dlm'\n  \
    sfcdp query -p prod -q '...' -o csv > rows.csv")]
pub struct QueryArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// SQL statement to run
    #[arg(long, short = 'q')]
    pub query: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key: client_id, username, login_url, private_key, ca_cert
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Print the config file location
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
