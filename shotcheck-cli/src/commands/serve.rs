//! `shotcheck serve` - run the HTTP server

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use shotcheck_core::{Assess, AssessConfig, Assessor, GeminiVision, VisionBackend};
use shotcheck_server::{AppState, ServerConfig, ShotcheckServer};

use crate::config::CliConfig;

#[derive(Args)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

pub async fn run(args: ServeArgs, config: CliConfig) -> Result<()> {
    let engine = build_engine(&config.assess)?;
    let state = Arc::new(AppState::new(engine));

    let server_config = ServerConfig::new(
        args.host.unwrap_or(config.server.host),
        args.port.unwrap_or(config.server.port),
    );

    ShotcheckServer::new(server_config, state).run().await?;
    Ok(())
}

/// Build the direct in-process assessment engine
pub(crate) fn build_engine(config: &AssessConfig) -> Result<Arc<dyn Assess>> {
    let vision: Arc<dyn VisionBackend> = Arc::new(GeminiVision::new(config.vision.clone())?);
    Ok(Arc::new(Assessor::with_memory_store(
        vision,
        config.clone(),
    )))
}
