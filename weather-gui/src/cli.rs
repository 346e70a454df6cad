use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use std::{path::PathBuf, sync::Arc};
use weather_core::{
    AssetDir, Config, ImageCrate, background_for, current_hour, provider_from_config,
    render::compose_backdrop,
};

use crate::app::{self, Startup};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather in a window")]
pub struct Cli {
    /// Config file; defaults to ./config.toml, then the platform config dir.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory with daytime.png, night.png and the condition icons.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key in the config file.
    Configure,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure) => configure(self.config),
            None => open_window(self.config, self.assets),
        }
    }
}

fn configure(explicit: Option<PathBuf>) -> anyhow::Result<()> {
    let path = Config::resolve_path(explicit.as_deref())?;

    let key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    // Keep endpoint and asset settings from an existing file.
    let cfg = match Config::load_from(&path) {
        Ok(mut existing) => {
            existing.api_key.key = key;
            existing
        }
        Err(_) => Config::new(key),
    };

    if cfg.api_key().is_empty() {
        anyhow::bail!("The API key must not be empty");
    }
    cfg.save_to(&path)?;

    tracing::info!(path = %path.display(), "saved configuration");
    println!("Configuration saved to {}", path.display());
    Ok(())
}

fn open_window(explicit: Option<PathBuf>, assets: Option<PathBuf>) -> anyhow::Result<()> {
    let (mut cfg, path) = Config::load(explicit.as_deref())?;
    if let Some(dir) = assets {
        cfg = cfg.with_asset_dir(dir);
    }
    tracing::info!(config = %path.display(), assets = %cfg.asset_dir().display(), "starting");

    let provider = Arc::from(provider_from_config(&cfg)?);
    let assets = AssetDir::new(cfg.asset_dir());

    let background = background_for(current_hour());
    let backdrop = compose_backdrop(&ImageCrate, &assets, background)
        .context("Failed to render the startup background")?;

    app::run(Startup::new(provider, assets, backdrop))?;
    Ok(())
}
