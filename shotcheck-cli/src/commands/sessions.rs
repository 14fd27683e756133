//! `shotcheck sessions` - inspect or delete sessions on a running server

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct SessionsArgs {
    /// Base URL of the running server
    #[arg(long, default_value = "http://127.0.0.1:7478")]
    server: String,

    #[command(subcommand)]
    command: SessionsCommand,
}

#[derive(Subcommand)]
enum SessionsCommand {
    /// Show the session for one shoot and room
    Show {
        shoot_id: String,
        room_type: String,
    },
    /// Delete every session for a shoot
    Delete { shoot_id: String },
}

pub async fn run(args: SessionsArgs) -> Result<()> {
    let client = reqwest::Client::new();

    match args.command {
        SessionsCommand::Show {
            shoot_id,
            room_type,
        } => {
            let url = format!(
                "{}/api/shoots/{}/rooms/{}",
                args.server,
                urlencoding::encode(&shoot_id),
                urlencoding::encode(&room_type)
            );
            let response = client
                .get(&url)
                .send()
                .await
                .context("failed to reach the shotcheck server")?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                println!("no session for shoot '{shoot_id}' room '{room_type}'");
                return Ok(());
            }

            let body: serde_json::Value = response.error_for_status()?.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        SessionsCommand::Delete { shoot_id } => {
            let url = format!(
                "{}/api/shoots/{}",
                args.server,
                urlencoding::encode(&shoot_id)
            );
            let body: serde_json::Value = client
                .delete(&url)
                .send()
                .await
                .context("failed to reach the shotcheck server")?
                .error_for_status()?
                .json()
                .await?;
            println!("removed {} sessions", body["removed"]);
        }
    }

    Ok(())
}
