//! Labelgate - evaluate Kubernetes label policies against admission requests

use anyhow::{Context, Result};
use clap::{Args, Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use labelgate_core::config::SettingsSource;
use labelgate_core::policy;
use labelgate_core::request::ValidationRequest;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Output format for validation responses
#[derive(Debug, Clone, PartialEq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[clap(
    name = "labelgate",
    about = "Evaluate Kubernetes label policies against admission requests",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level (RUST_LOG takes precedence)
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,
}

/// Where the policy settings come from
#[derive(Args, Debug, Clone)]
struct SettingsArgs {
    /// Settings as an inline JSON document
    #[clap(long, conflicts_with = "settings_path")]
    settings_json: Option<String>,

    /// Settings file (YAML for .yml/.yaml, JSON otherwise)
    #[clap(long)]
    settings_path: Option<PathBuf>,

    /// Criterion name, used with --values instead of a settings document
    #[clap(long, conflicts_with_all = ["settings_json", "settings_path"])]
    criteria: Option<String>,

    /// Comma-separated label keys for --criteria
    #[clap(long, value_delimiter = ',', requires = "criteria")]
    values: Vec<String>,
}

impl SettingsArgs {
    fn into_source(self, embedded: Option<serde_json::Value>) -> SettingsSource {
        SettingsSource::resolve(
            self.settings_json,
            self.settings_path,
            self.criteria,
            self.values,
            embedded,
        )
    }
}

#[derive(Parser, Debug)]
enum Command {
    /// Evaluate an admission request and print the validation response
    Run {
        /// Policy artifact; the label policy is built in, so this is only recorded
        policy: Option<PathBuf>,

        /// Request document (AdmissionReview, envelope or bare request); "-" reads stdin
        #[clap(short = 'r', long = "request-path")]
        request_path: PathBuf,

        #[clap(flatten)]
        settings: SettingsArgs,

        /// Output format
        #[clap(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Check settings and print whether they are valid
    ValidateSettings {
        #[clap(flatten)]
        settings: SettingsArgs,
    },
}

/// Initialize tracing from --log-level, letting RUST_LOG override it.
/// Logs always go to stderr so stdout carries only the response.
fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level);

    match cli.command {
        Command::Run {
            policy,
            request_path,
            settings,
            format,
        } => {
            if let Some(policy) = &policy {
                debug!(policy = %policy.display(), "Running built-in label policy");
            }
            run_command(request_path, settings, format).await
        }
        Command::ValidateSettings { settings } => validate_settings_command(settings),
    }
}

async fn run_command(
    request_path: PathBuf,
    settings: SettingsArgs,
    format: OutputFormat,
) -> Result<()> {
    let raw = read_request(&request_path).await?;
    let request = ValidationRequest::from_json(&raw)
        .with_context(|| format!("Failed to parse request {}", request_path.display()))?;

    let source = settings.into_source(request.settings.clone());
    let settings = source.load().context("Failed to load settings")?;
    settings.validate().context("Settings rejected")?;
    debug!(criterion = %settings.criterion(), values = ?settings.values(), "Settings loaded");

    let response = policy::validate_request(&request, &settings)
        .context("Failed to validate request")?;

    match format {
        OutputFormat::Json => println!("{}", response.to_json()?),
        OutputFormat::Text => print!("{}", response.to_text()),
    }

    Ok(())
}

fn validate_settings_command(settings: SettingsArgs) -> Result<()> {
    let source = settings.into_source(None);
    let answer = policy::validate_settings(&source)
        .context("Failed to load settings")?;
    println!("{}", answer.to_json()?);
    Ok(())
}

async fn read_request(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        tokio::io::stdin()
            .read_to_string(&mut input)
            .await
            .context("Failed to read request from stdin")?;
        return Ok(input);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read request file {}", path.display()))
}
