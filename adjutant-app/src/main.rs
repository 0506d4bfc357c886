use adjutant_agent::{ArtifactStore, CodeAgent, HttpLlmClient};
use adjutant_channels::{Router, TerminalChannel};
use adjutant_core::RuntimeConfig;
use adjutant_executor::{ActionRegistry, Dispatcher};
use adjutant_sandbox::SandboxPolicy;
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║              Adjutant Natural-Language Command Shell             ║");
    println!("║  Type /help for commands, /exit to quit                          ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let config = RuntimeConfig::load(Path::new("adjutant.toml"))
        .context("failed to load configuration")?;
    std::fs::create_dir_all(&config.artifact_dir)
        .context("failed to create artifact directory")?;
    let config = Arc::new(config);

    println!("Model: {}", config.model);
    println!("Collaborator: {}", config.llm_base_url);
    println!("Artifacts: {}", config.artifact_dir.display());
    println!();

    let registry = Arc::new(ActionRegistry::with_defaults(&config));
    tracing::info!("{} actions registered", registry.count());
    let dispatcher = Arc::new(Dispatcher::new(registry));

    let client = Arc::new(HttpLlmClient::new(
        config.llm_base_url.clone(),
        config.api_key.clone(),
    ));
    let agent = Arc::new(CodeAgent::new(
        client,
        ArtifactStore::new(config.artifact_dir.clone(), "py"),
        SandboxPolicy::from_config(&config),
        config.interpreter.clone(),
    ));

    let router = Router::new(dispatcher, agent, config);

    // Transport listeners can start at boot or later via /web and
    // /bluetooth from the interactive session.
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--web") {
        println!("{}", router.start_web_listener());
    }
    if args.iter().any(|a| a == "--serial" || a == "--bluetooth") {
        println!("{}", router.start_serial_listener());
    }

    router.serve(Box::new(TerminalChannel::default())).await;

    Ok(())
}
