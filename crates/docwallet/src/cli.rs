//! Clap derive structures for the `docwallet` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// docwallet -- browse a documents wallet and fetch verification codes
#[derive(Debug, Parser)]
#[command(
    name = "docwallet",
    version,
    about = "Browse a documents wallet and fetch verification codes",
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
    /// API base URL (overrides the config file)
    #[arg(long, env = "DOCWALLET_URL", global = true)]
    pub url: Option<String>,

    /// API token
    #[arg(long, env = "DOCWALLET_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the documents collection as the carousel presents it
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show the members of one document type's stack
    Stack(StackArgs),

    /// Flip a document to its back face and fetch its verification code
    Share(ShareArgs),

    /// List the document types that can still be added
    AddTypes,

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct DocumentsArgs {
    /// JSON documents file
    #[arg(long, short = 'd', env = "DOCWALLET_DOCUMENTS")]
    pub documents: PathBuf,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: DocumentsArgs,
}

#[derive(Debug, Args)]
pub struct StackArgs {
    #[command(flatten)]
    pub source: DocumentsArgs,

    /// Document type code
    pub doc_type: String,
}

#[derive(Debug, Args)]
pub struct ShareArgs {
    #[command(flatten)]
    pub source: DocumentsArgs,

    /// Document id
    pub id: String,

    /// Show a barcode instead of a QR link
    #[arg(long)]
    pub barcode: bool,

    /// Keep following the countdown until the code expires
    #[arg(long, short = 'w')]
    pub watch: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display the resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Store the API token in the system keyring
    SetToken {
        /// Token value
        token: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
