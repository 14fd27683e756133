use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "shotcheck", about = "Context-aware photo assessment relay")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a single photo
    Assess(commands::assess::AssessArgs),
    /// Run the bridge child process (line-delimited JSON on stdio)
    Bridge(commands::bridge::BridgeArgs),
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Inspect or delete sessions on a running server
    Sessions(commands::sessions::SessionsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    // Logs go to stderr so bridge mode keeps stdout clean for its protocol.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Assess(args) => commands::assess::run(args, config).await,
        Commands::Bridge(args) => commands::bridge::run(args, config).await,
        Commands::Serve(args) => commands::serve::run(args, config).await,
        Commands::Sessions(args) => commands::sessions::run(args).await,
    }
}
