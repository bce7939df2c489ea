mod session;

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use strum::IntoEnumIterator;
use tracing_subscriber::EnvFilter;

use otto::agent::DEFAULT_MAX_ITERATIONS;
use otto::providers::base::Provider;
use otto::providers::configs::{OllamaProviderConfig, OpenAiProviderConfig, ProviderConfig};
use otto::providers::factory::{get_provider, ProviderType};
use otto::providers::openai::{OPENAI_HOST, OPENAI_MODEL};

use session::Session;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project directory the agent works in
    directory: String,

    /// Provider backing the agent (ollama or open-ai)
    #[arg(short, long, default_value = "ollama")]
    provider: String,

    /// Model to use (defaults to the provider's default model)
    #[arg(short, long)]
    model: Option<String>,

    /// Override the provider host
    #[arg(long)]
    host: Option<String>,

    /// OpenAI API key (can also be set via OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Maximum model round trips per task
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Skip the confirmation prompt for command execution
    #[arg(short = 'y', long)]
    yes: bool,
}

fn resolve_directory(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::tilde(raw).to_string();
    let path = PathBuf::from(expanded);
    if !path.is_dir() {
        return Err(anyhow!("directory does not exist: {}", path.display()));
    }
    path.canonicalize()
        .with_context(|| format!("resolving {}", path.display()))
}

fn build_provider(cli: &Cli) -> Result<Box<dyn Provider + Send + Sync>> {
    let provider_type = ProviderType::from_str(&cli.provider).map_err(|_| {
        anyhow!(
            "unknown provider '{}' (expected one of: {})",
            cli.provider,
            ProviderType::iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;

    let config = match provider_type {
        ProviderType::Ollama => {
            let mut config = OllamaProviderConfig::from_env()?;
            if let Some(host) = &cli.host {
                config.host = host.clone();
            }
            if let Some(model) = &cli.model {
                config.model = model.clone();
            }
            ProviderConfig::Ollama(config)
        }
        ProviderType::OpenAi => {
            let mut config = if let Some(api_key) = cli.api_key.clone() {
                OpenAiProviderConfig::new(OPENAI_HOST.to_string(), api_key, OPENAI_MODEL.to_string())
            } else {
                OpenAiProviderConfig::from_env()
                    .context("OpenAI API key must be provided via --api-key or OPENAI_API_KEY")?
            };
            if let Some(host) = &cli.host {
                config.host = host.clone();
            }
            if let Some(model) = &cli.model {
                config.model = model.clone();
            }
            ProviderConfig::OpenAi(config)
        }
    };

    get_provider(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let directory = resolve_directory(&cli.directory)?;
    let provider = build_provider(&cli)?;

    let mut session = Session::new(provider, directory, cli.max_iterations, cli.yes);
    session.start().await
}
