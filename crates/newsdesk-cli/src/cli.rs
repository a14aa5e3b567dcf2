//! CLI command definitions and argument parsing.

use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};
use newsdesk_domain::ProviderKind;
use std::path::PathBuf;

/// Newsdesk - Extract structured fields from news articles with an LLM.
#[derive(Debug, Parser)]
#[command(name = "newsdesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "NEWSDESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract fields from one or more articles
    Extract(ExtractArgs),

    /// List the recognized fields
    Fields,

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
#[command(group(ArgGroup::new("input").required(true).args(["urls", "file"])))]
pub struct ExtractArgs {
    /// Article URL (repeat for several articles)
    #[arg(short, long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Plain text (or HTML) file holding the article
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// LLM backend (defaults to the configured provider)
    #[arg(short, long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Comma-separated fields to extract (defaults to the configured list)
    #[arg(long, value_delimiter = ',', value_name = "FIELDS")]
    pub fields: Vec<String>,

    /// Date the article was received, YYYY-MM-DD (defaults to today)
    #[arg(long, value_parser = parse_received_date)]
    pub received_date: Option<NaiveDate>,

    /// Maximum articles processed at once
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

/// Arguments for config management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config management actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (API keys redacted)
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}

/// Provider argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderArg {
    /// OpenAI chat completions
    Openai,
    /// Google Gemini
    Gemini,
    /// Local Ollama server
    Ollama,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<ProviderArg> for ProviderKind {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Openai => ProviderKind::OpenAi,
            ProviderArg::Gemini => ProviderKind::Gemini,
            ProviderArg::Ollama => ProviderKind::Ollama,
        }
    }
}

fn parse_received_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD ({})", e))
}
