// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::CompilerSettings;
use crate::error::{ReelError, ReelResult};
use crate::output::ExportSettings;
use crate::ports::LogLevel;

/// Logging section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub compiler: CompilerSettings,
    pub export: ExportSettings,
    pub logging: LoggingConfig,
}

/// TOML configuration adapter
#[derive(Debug, Default, Clone)]
pub struct TomlConfigAdapter {
    config_file_path: Option<PathBuf>,
}

impl TomlConfigAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the file last loaded or saved
    pub fn config_file_path(&self) -> Option<&Path> {
        self.config_file_path.as_deref()
    }

    /// Parse configuration text; missing keys keep their defaults
    pub fn parse(content: &str) -> ReelResult<AppConfig> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn load(&mut self, path: &Path) -> ReelResult<AppConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| ReelError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        let config = Self::parse(&content)?;
        Self::validate(&config)?;

        info!("Loaded configuration from: {}", path.display());
        self.config_file_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&mut self, path: &Path, config: &AppConfig) -> ReelResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config).map_err(|e| ReelError::ConfigError {
            message: format!("Failed to serialize config: {}", e),
        })?;
        std::fs::write(path, content)?;

        debug!("Saved configuration to: {}", path.display());
        self.config_file_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(config: &AppConfig) -> ReelResult<()> {
        let invalid = |message: String| Err(ReelError::ConfigError { message });

        LogLevel::parse(&config.logging.level)?;

        if config.export.crf > 51 {
            return invalid("CRF value cannot exceed 51".to_string());
        }
        config.export.pinned_encoder()?;

        let compiler = &config.compiler;
        if compiler.sample_rate == 0 {
            return invalid("sample_rate must be positive".to_string());
        }
        if compiler.frame_rate == 0 {
            return invalid("frame_rate must be positive".to_string());
        }
        if !(compiler.duck_level > 0.0 && compiler.duck_level <= 1.0) {
            return invalid(format!(
                "duck_level {} must be in (0, 1]",
                compiler.duck_level
            ));
        }
        if !compiler.min_visible.is_finite() || compiler.min_visible < 0.0 {
            return invalid(format!(
                "min_visible {} must be a non-negative number of seconds",
                compiler.min_visible
            ));
        }
        if !(compiler.empty_duration > 0.0) {
            return invalid(format!(
                "empty_duration {} must be positive",
                compiler.empty_duration
            ));
        }

        Ok(())
    }
}
