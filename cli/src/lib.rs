//! Command-line front end for the layer engine.
//!
//! Reads images from disk, runs merge or split, and writes PNG results.
//! Settings come from the environment (optionally a `.env` file) and can be
//! overridden per run with flags.

pub mod args;
pub mod commands;
pub mod config;

use args::{Command, Invocation};
use config::AppConfig;
use layer_engine::Seed;

/// Load the environment config and apply command-line overrides on top.
pub fn init_config(overrides: &[(&'static str, String)]) -> Result<AppConfig, anyhow::Error> {
    config::load_dotenv();

    let mut config = AppConfig::from_env();
    for (key, value) in overrides {
        config.set(key, value)?;
    }
    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}

/// Run a parsed invocation to completion.
pub async fn run(invocation: Invocation) -> Result<(), anyhow::Error> {
    let config = init_config(&invocation.overrides)?;

    match invocation.command {
        Command::Help => println!("{}", args::usage()),
        Command::Merge { inputs } => {
            let report = commands::run_merge(&inputs, &config).await?;
            for path in &report.written {
                tracing::info!("Wrote {}", path.display());
            }
        }
        Command::Split { input } => {
            let seed = config.seed.unwrap_or_else(Seed::random);
            commands::run_split(&input, &config, seed).await?;
        }
        Command::Regenerate { input } => {
            if config.seed.is_some() {
                tracing::info!("Ignoring configured SEED, drawing a new one");
            }
            commands::run_split(&input, &config, Seed::random()).await?;
        }
    }
    Ok(())
}
