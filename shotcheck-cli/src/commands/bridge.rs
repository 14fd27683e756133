//! `shotcheck bridge` - the child-process end of the relay protocol
//!
//! Reads one JSON request per line on stdin and writes one JSON
//! response per line on stdout. Logs go to stderr only.

use anyhow::Result;
use clap::Args;
use tokio::io::BufReader;

use crate::config::CliConfig;

#[derive(Args)]
pub struct BridgeArgs {}

pub async fn run(_args: BridgeArgs, config: CliConfig) -> Result<()> {
    let engine = super::serve::build_engine(&config.assess)?;

    tracing::info!("bridge ready, reading requests from stdin");

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    shotcheck_core::bridge::serve(engine, stdin, stdout).await?;

    Ok(())
}
