mod comment;
mod config;
mod github;
mod handler;
mod llm;
mod pr;
mod report;
mod server;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use comment::{CommentGenerator, FallbackMessage};
use github::{GitHubAuth, GitHubClient};
use handler::Responder;
use llm::openai::OpenAiClient;

/// PR Greeter: GitHub webhook service that welcomes newly opened pull requests
/// with an LLM-drafted triage comment and warns authors about merge conflicts.
#[derive(Parser, Debug)]
#[command(name = "pr-greeter", version, about)]
struct Cli {
    /// Config file (defaults to .pr-greeter.toml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding config and PORT
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?;
    let port = cli.port.unwrap_or(config.server.port);
    let webhook_path = config.webhook_path()?.to_string();

    let fallback = Arc::new(FallbackMessage::load(&config.fallback_path)?);
    debug!(path = %config.fallback_path.display(), "loaded fallback message");

    let auth = GitHubAuth::from_credentials(&config.github_credentials()?)?;
    let api_url = config.github_api_url();
    info!(api_url = %api_url, auth = ?auth, "configured GitHub client");
    let poster = Arc::new(GitHubClient::new(api_url, auth));

    let generator = Arc::new(OpenAiClient::new(
        config.openai_api_key()?.to_string(),
        &config.openai,
    ));
    info!(model = %config.openai.model, "configured generation client");

    let state = Arc::new(server::AppState {
        webhook_secret: config.webhook_secret()?.to_string(),
        responder: Responder::new(CommentGenerator::new(generator, fallback), poster),
    });

    server::serve(state, port, &webhook_path).await?;
    Ok(())
}
