use anyhow::Context;
use docqa::{
    cli::{Cli, Commands},
    utils::{logging, toml_config::DocqaConfig},
    AppState, ConfigManager, RagPipeline,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real deployments set the key in the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();

    if let Some(Commands::Config { validate }) = cli.command {
        return show_config(&cli.config, validate);
    }

    let config_exists = cli.config.exists();
    let config_manager = if config_exists {
        ConfigManager::new(&cli.config)
            .with_context(|| format!("Failed to load {}", cli.config.display()))?
    } else {
        let defaults = DocqaConfig::default();
        defaults
            .validate()
            .context("Default configuration is not usable")?;
        ConfigManager::from_config(defaults)
    };
    let config_manager = Arc::new(config_manager);
    let config = config_manager.config();

    let log_level = if cli.verbose {
        "debug"
    } else {
        config.server.log_level.as_str()
    };
    logging::init_tracing(log_level, &config.server.log_format);

    if config_exists {
        if let Err(e) = config_manager.start_watching() {
            tracing::warn!(error = %e, "Config hot reload disabled");
        }
    } else {
        tracing::warn!(
            path = %cli.config.display(),
            "Configuration file not found, using defaults"
        );
    }

    tokio::fs::create_dir_all(&config.uploads.dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", config.uploads.dir))?;

    let pipeline = Arc::new(RagPipeline::from_config(Arc::clone(&config_manager))?);
    let state = AppState::new(Arc::clone(&config_manager), pipeline);
    let app = docqa::app(state);

    let host = cli.host.unwrap_or_else(|| config.server.host.clone());
    let port = cli.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", host, port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    tracing::info!(addr = %listener.local_addr()?, "DocQA server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    config_manager.stop_watching();
    Ok(())
}

fn show_config(path: &Path, validate: bool) -> anyhow::Result<()> {
    let config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        DocqaConfig::parse(&content)?
    } else {
        eprintln!("{} not found, showing defaults", path.display());
        DocqaConfig::default()
    };

    println!("{}", toml::to_string_pretty(&config)?);

    if validate {
        config.validate()?;
        println!("Configuration is valid.");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
