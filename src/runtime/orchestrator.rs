use anyhow::{Context, Result};
use colored::Colorize;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::{
    api::create_router,
    app::{load_config, AppState, Config},
    cli::{handle_command, Cli, Commands},
    models::ProviderFactory,
    runtime::NonInteractiveRunner,
};

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let config = load_config(cli.config.as_deref())?;
        Ok(Self { cli, config })
    }

    /// Run the orchestrator
    pub async fn run(mut self) -> Result<()> {
        match self.cli.command.take() {
            None => self.serve().await,
            Some(Commands::Serve { host, port }) => {
                if let Some(host) = host {
                    self.config.server.host = host;
                }
                if let Some(port) = port {
                    self.config.server.port = port;
                }
                self.serve().await
            }
            Some(Commands::Ask {
                text,
                mode,
                output_format,
            }) => {
                let runner = NonInteractiveRunner::new(&self.config)?;
                let result = runner.execute(text, mode).await;
                println!("{}", runner.format_result(&result, output_format));

                if !result.errors.is_empty() {
                    std::process::exit(1);
                }
                Ok(())
            }
            Some(command) => handle_command(&command, &self.config).await,
        }
    }

    async fn serve(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .context("Invalid server host/port")?;

        let providers = ProviderFactory::create(&self.config)?;
        let model = self.config.groq.chat_model.clone();
        let history_window = self.config.generation.max_history_messages;
        let state = AppState::new(self.config, providers);
        let app = create_router(state);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        println!("Server listening on {}", format!("http://{}", addr).green());
        info!(%addr, %model, history_window, "server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
