//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::adapters::{AppConfig, TomlConfigAdapter};
use crate::cli::args::EncoderArgs;
use crate::cli::{Cli, Commands};

/// Files searched when `--config` is not given, in order
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["reelgraph.toml", "config/reelgraph.toml"];

/// Build the configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<AppConfig> {
    // Step 1: Defaults
    let mut config = AppConfig::default();

    // Step 2: Config file
    if let Some(path) = locate_config_file(cli.config.as_deref())? {
        config = TomlConfigAdapter::new()
            .load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    }

    // Step 3: Environment variables
    apply_environment_overrides(&mut config, |key| std::env::var(key).ok())?;

    // Step 4: CLI arguments
    apply_cli_overrides(&mut config, cli);

    TomlConfigAdapter::validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Explicit path if given (it must exist), else the first default that exists
pub fn locate_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file does not exist: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }
    Ok(DEFAULT_CONFIG_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists()))
}

/// Apply `REELGRAPH_*` variables found through `lookup`
pub fn apply_environment_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let mut overrides = 0;

    if let Some(level) = lookup("REELGRAPH_LOG_LEVEL") {
        config.logging.level = level;
        overrides += 1;
    }
    if let Some(ffmpeg) = lookup("REELGRAPH_FFMPEG") {
        config.export.ffmpeg = ffmpeg;
        overrides += 1;
    }
    if let Some(codec) = lookup("REELGRAPH_VIDEO_CODEC") {
        config.export.video_codec = codec;
        overrides += 1;
    }
    if let Some(crf) = lookup("REELGRAPH_CRF") {
        config.export.crf = crf
            .trim()
            .parse()
            .with_context(|| format!("Invalid REELGRAPH_CRF value '{}'", crf))?;
        overrides += 1;
    }
    if let Some(rate) = lookup("REELGRAPH_SAMPLE_RATE") {
        config.compiler.sample_rate = rate
            .trim()
            .parse()
            .with_context(|| format!("Invalid REELGRAPH_SAMPLE_RATE value '{}'", rate))?;
        overrides += 1;
    }

    if overrides > 0 {
        debug!("Applied {} environment variable overrides", overrides);
    }
    Ok(overrides)
}

/// Apply command-line overrides
pub fn apply_cli_configuration_overrides(config: &mut AppConfig, encoder: &EncoderArgs) {
    if let Some(codec) = &encoder.codec {
        config.export.video_codec = codec.clone();
    }
    if let Some(crf) = encoder.crf {
        config.export.crf = crf;
    }
    if let Some(preset) = &encoder.x264_preset {
        config.export.preset = preset.clone();
    }
    if let Some(threads) = encoder.threads {
        config.export.threads = threads;
    }
    if let Some(ffmpeg) = &encoder.ffmpeg {
        config.export.ffmpeg = ffmpeg.clone();
    }
}

fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.log_json {
        config.logging.json = true;
    }
    match &cli.command {
        Commands::Export(args) => apply_cli_configuration_overrides(config, &args.encoder),
        Commands::Args(args) => apply_cli_configuration_overrides(config, &args.encoder),
        Commands::Compile(_) => {}
    }
}
