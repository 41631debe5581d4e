//! Command handlers. Each authenticated command resolves its session
//! config, runs the token pipeline, then renders its own output.

pub mod config_cmd;
pub mod login;
pub mod metadata;
pub mod query;

use sfcdp_core::SessionConfig;

use crate::cli::{Command, ConnectionArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::messages::Messages;

pub async fn dispatch(
    cmd: Command,
    global: &GlobalOpts,
    messages: &Messages,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => {
            let session = session_config(&args.connection, global)?;
            login::handle(&session, global, messages).await
        }
        Command::Metadata(args) => {
            let session = session_config(&args.connection, global)?;
            metadata::handle(&session, args, global, messages).await
        }
        Command::Query(args) => {
            let session = session_config(&args.connection, global)?;
            query::handle(&session, args, global, messages).await
        }
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal {
            message: "command does not require a session".into(),
        }),
    }
}

fn session_config(conn: &ConnectionArgs, global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = config::load_config_or_default();
    config::resolve_session(conn, global, &cfg)
}
