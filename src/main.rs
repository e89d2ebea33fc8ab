//! AI guard agent for Zentinel
//!
//! Classifies automated traffic, tracks per-client risk and serves human
//! challenges over a Unix socket.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zentinel_agent_ai_guard::config::{ChallengeConfig, VerificationMode};
use zentinel_agent_ai_guard::{transport, AiGuardAgent, AiGuardConfig};

#[derive(Parser, Debug)]
#[command(name = "zentinel-agent-ai-guard")]
#[command(author, version, about = "AI agent detection and human challenge agent for Zentinel")]
struct Args {
    /// Unix socket path for the JSON-lines transport
    #[arg(short, long, default_value = "/tmp/zentinel-ai-guard.sock")]
    socket: PathBuf,

    /// Path to configuration file (JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the AI agent signature catalog
    #[arg(long, default_value = "data/signatures.json")]
    signatures: PathBuf,

    /// Path to the challenge puzzle pool
    #[arg(long, default_value = "data/puzzles.json")]
    puzzles: PathBuf,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(json: bool, level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, &args.log_level);

    let config = match &args.config {
        Some(path) => AiGuardConfig::from_file(path)?,
        None => AiGuardConfig::default(),
    };

    if config.challenge.verification == VerificationMode::Sealed
        && config.challenge.token_secret == ChallengeConfig::default().token_secret
    {
        warn!("Sealed challenges are using the built-in token secret");
    }

    let agent = AiGuardAgent::new(config, &args.signatures, &args.puzzles)?;

    info!(socket = %args.socket.display(), "Starting AI guard agent");
    transport::serve(&args.socket, Arc::new(agent)).await?;

    Ok(())
}
