//! Config subcommand handlers.

use std::fmt::Write as _;

use docwallet_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

const KEYRING_SERVICE: &str = "docwallet";
const KEYRING_USER: &str = "api-token";

/// Format config for display, masking the token.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "[api]");
    let _ = writeln!(out, "base_url = \"{}\"", cfg.api.base_url);
    let _ = writeln!(out, "timeout = {}", cfg.api.timeout);
    if cfg.api.token.is_some() {
        let _ = writeln!(out, "token = \"****\"");
    }
    if let Some(ref env) = cfg.api.token_env {
        let _ = writeln!(out, "token_env = \"{env}\"");
    }
    if let Some(ref ca) = cfg.api.ca_cert {
        let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
    }

    let wallet = &cfg.wallet;
    let _ = writeln!(out);
    let _ = writeln!(out, "[wallet]");
    let _ = writeln!(out, "code_ttl_secs = {}", wallet.code_ttl_secs);
    let allowed: Vec<String> = wallet
        .code_action_allowed_types
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect();
    let _ = writeln!(out, "code_action_allowed_types = [{}]", allowed.join(", "));
    let _ = writeln!(out, "record_comparison = \"{}\"", wallet.record_comparison);
    let _ = writeln!(out, "localization = \"{}\"", wallet.localization);
    let _ = writeln!(out, "event_capacity = {}", wallet.event_capacity);
    if let Some(ref url) = wallet.driver_queue_url {
        let _ = writeln!(out, "driver_queue_url = \"{url}\"");
    }
    if let Some(ref url) = wallet.service_center_url {
        let _ = writeln!(out, "service_center_url = \"{url}\"");
    }

    out
}

fn keyring_err(e: &keyring::Error) -> CliError {
    CliError::Validation {
        field: "keyring".into(),
        reason: e.to_string(),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            let path = config::save_config(&Config::default())?;
            if !global.quiet {
                eprintln!("Config written to {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            output::print_output(format_config_redacted(&cfg).trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::SetToken { token } => {
            let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
                .map_err(|e| keyring_err(&e))?;
            entry.set_password(&token).map_err(|e| keyring_err(&e))?;
            if !global.quiet {
                eprintln!("API token stored in the system keyring");
            }
            Ok(())
        }
    }
}
