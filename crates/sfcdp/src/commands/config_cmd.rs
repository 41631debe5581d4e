//! Config subcommand handlers.

use std::path::PathBuf;

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::messages::{Messages, fill};
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Config as TOML. Profiles are kept in name order by the config map.
fn format_config(cfg: &Config) -> Result<String, CliError> {
    let text = toml::to_string_pretty(cfg).map_err(CliError::render)?;
    Ok(text.trim_end().to_owned())
}

fn save_config(cfg: &Config) -> Result<PathBuf, CliError> {
    Ok(config::save_config(cfg)?)
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt(label: &str, default: Option<&str>) -> Result<String, CliError> {
    let mut input = Input::<String>::new().with_prompt(label);
    if let Some(default) = default {
        input = input.default(default.to_owned());
    }
    input.interact_text().map_err(prompt_err)
}

/// Apply `key = value` to a profile.
fn set_profile_value(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "client_id" | "client-id" | "clientid" => profile.client_id = value,
        "username" => profile.username = value,
        "login_url" | "login-url" | "loginurl" => {
            url::Url::parse(&value).map_err(|e| CliError::Validation {
                field: "login_url".into(),
                reason: format!("{value}: {e}"),
            })?;
            profile.login_url = Some(value);
        }
        "private_key" | "private-key" | "privatekey" => profile.private_key = value.into(),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: client_id, username, \
                     login_url, private_key, ca_cert"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts, messages: &Messages) -> Result<(), CliError> {
    let text = &messages.config;
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("{}", text.wizard_title);
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name = prompt("Profile name", Some("default"))?;
            let client_id = prompt("Connected app consumer key", None)?;
            let username = prompt("Username", None)?;
            let login_url = prompt("Login URL", Some(config::DEFAULT_LOGIN_URL))?;
            let private_key = prompt("Private key (PEM) path", None)?;

            let profile = Profile {
                client_id,
                username,
                login_url: (login_url != config::DEFAULT_LOGIN_URL).then_some(login_url),
                private_key: PathBuf::from(private_key),
                ca_cert: None,
            };
            profile.validate()?;

            // Keep any profiles that already exist.
            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            let path = save_config(&cfg)?;
            eprintln!("\n{}", fill(&text.written, &[("path", &path.display())]));
            eprintln!("{}", fill(&text.default_set, &[("name", &profile_name)]));
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = match global.format() {
                OutputFormat::Table => format_config(&cfg)?,
                format => output::render_single(&format, &cfg, |_| String::new(), |c| {
                    c.default_profile.clone().unwrap_or_default()
                })?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile {
                    client_id: String::new(),
                    username: String::new(),
                    login_url: None,
                    private_key: PathBuf::new(),
                    ca_cert: None,
                });

            set_profile_value(profile, &key, value)?;

            save_config(&cfg)?;
            eprintln!(
                "{}",
                fill(&text.value_set, &[("key", &key), ("profile", &profile_name)])
            );
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("{}", text.no_profiles);
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
                available.sort();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            eprintln!("{}", fill(&text.default_set, &[("name", &name)]));
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}
