mod cli;
mod commands;
mod error;
mod output;
mod store;

use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use docwallet_api::SharingClient;
use docwallet_config::Config;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't touch the documents or the API
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "docwallet", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = docwallet_config::load_config_or_default();
            let needs_token = matches!(cmd, Command::Share(_) | Command::AddTypes);
            let client = build_client(&cfg, &cli.global, needs_token)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &cfg, client, &cli.global).await
        }
    }
}

/// Build the sharing client from the config file and CLI overrides.
/// Commands that never reach the API get an unauthenticated client.
fn build_client(
    cfg: &Config,
    global: &GlobalOpts,
    needs_token: bool,
) -> Result<SharingClient, CliError> {
    let base_url = global.url.as_deref().unwrap_or(&cfg.api.base_url);
    let mut transport = cfg.to_transport_config();
    if let Some(secs) = global.timeout {
        transport.timeout = Duration::from_secs(secs);
    }

    let token = global
        .token
        .clone()
        .map(SecretString::from)
        .or_else(|| docwallet_config::resolve_token(&cfg.api).ok());

    let client = match token {
        Some(token) => SharingClient::from_token(base_url, &token, &transport)?,
        None if needs_token => return Err(CliError::NoToken),
        None => SharingClient::from_reqwest(base_url, transport.build_client()?)?,
    };
    Ok(client)
}
