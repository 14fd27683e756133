//! `shotcheck assess` - one-shot assessment of an image file

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use shotcheck_core::{
    Assess, AssessRequest, BridgeClient, BridgeConfig, ImagePayload, Orientation,
};

use crate::config::CliConfig;

#[derive(Args)]
pub struct AssessArgs {
    /// Image file to assess
    #[arg(long)]
    image: PathBuf,

    /// Room type label
    #[arg(long)]
    room: String,

    /// Shoot identifier
    #[arg(long)]
    shoot: String,

    /// Position within a bracketed stack
    #[arg(long)]
    stack_index: Option<u32>,

    /// Camera pitch in degrees
    #[arg(long)]
    pitch: Option<f64>,

    /// Camera yaw in degrees
    #[arg(long)]
    yaw: Option<f64>,

    /// Camera roll in degrees
    #[arg(long)]
    roll: Option<f64>,

    /// Relay through a `shotcheck bridge` child process
    #[arg(long)]
    bridge: bool,
}

pub async fn run(args: AssessArgs, config: CliConfig) -> Result<()> {
    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("failed to read image at {}", args.image.display()))?;
    let image = ImagePayload::from_bytes(&bytes, mime_for(&args.image));

    let orientation = match (args.pitch, args.yaw, args.roll) {
        (Some(pitch), Some(yaw), Some(roll)) => Some(Orientation::new(pitch, yaw, roll)),
        (None, None, None) => None,
        _ => anyhow::bail!("orientation requires all of --pitch, --yaw, and --roll"),
    };

    let request = AssessRequest {
        image,
        room_type: args.room,
        shoot_id: args.shoot,
        stack_index: args.stack_index,
        orientation,
    };

    let engine: Arc<dyn Assess> = if args.bridge {
        Arc::new(BridgeClient::spawn(&BridgeConfig::default())?)
    } else {
        super::serve::build_engine(&config.assess)?
    };

    let response = engine.assess(request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn mime_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_is_guessed_from_extension() {
        assert_eq!(mime_for(Path::new("shot.png")), "image/png");
        assert_eq!(mime_for(Path::new("shot.webp")), "image/webp");
        assert_eq!(mime_for(Path::new("shot.jpg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("shot")), "image/jpeg");
    }
}
