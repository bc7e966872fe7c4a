//! Configuration loader for YAML files and environment resolution
//!
//! This module handles loading `chessbot.yaml`, applying environment
//! overrides and loading dotenv-style files into the process environment so
//! the actuator subprocess inherits them.

use crate::config::types::*;
use crate::errors::ChessBotError;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const DEFAULT_CONFIG_PATH: &str = "chessbot.yaml";
pub const COMMANDS_PATH_ENV: &str = "CHESSBOT_COMMANDS";
pub const STEP_PAUSE_ENV: &str = "CHESSBOT_STEP_PAUSE_MS";

/// Configuration loader with environment resolution
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from an explicit path, or from `chessbot.yaml` when
    /// present, falling back to defaults otherwise.
    pub async fn from_source(path: Option<&Path>) -> Result<ChessBotConfig, ChessBotError> {
        match path {
            Some(path) => Self::from_file(path).await,
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if fs::try_exists(&default_path).await.unwrap_or(false) {
                    Self::from_file(&default_path).await
                } else {
                    log::debug!(
                        "No {} found, using built-in configuration",
                        DEFAULT_CONFIG_PATH
                    );
                    let mut config = ChessBotConfig::default();
                    Self::apply_env_overrides(&mut config)?;
                    config.validate()?;
                    Ok(config)
                }
            }
        }
    }

    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<ChessBotConfig, ChessBotError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).await.map_err(|e| {
            ChessBotError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_str(&content)?;

        // Relative paths in the file are relative to the file itself.
        if let Some(base_dir) = path.parent() {
            if config.commands_path.is_relative() && !base_dir.as_os_str().is_empty() {
                config.commands_path = base_dir.join(&config.commands_path);
            }
        }

        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a YAML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<ChessBotConfig, ChessBotError> {
        let mut config: ChessBotConfig = if content.trim().is_empty() {
            ChessBotConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| {
                ChessBotError::Config(format!("Failed to parse YAML config: {}", e))
            })?
        };

        Self::apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(config: &mut ChessBotConfig) -> Result<(), ChessBotError> {
        if let Ok(path) = env::var(COMMANDS_PATH_ENV) {
            if !path.trim().is_empty() {
                log::debug!("{} overrides command file: {}", COMMANDS_PATH_ENV, path);
                config.commands_path = PathBuf::from(path);
            }
        }

        if let Ok(value) = env::var(STEP_PAUSE_ENV) {
            config.timing.step_pause_ms = value.trim().parse().map_err(|e| {
                ChessBotError::Config(format!(
                    "Invalid {} value '{}': {}",
                    STEP_PAUSE_ENV, value, e
                ))
            })?;
        }

        Ok(())
    }

    /// Load the configured env files into the process environment. Missing
    /// files are skipped; variables already set are left untouched.
    pub fn load_env_files(config: &ChessBotConfig) -> Result<usize, ChessBotError> {
        let mut loaded = 0;
        for env_file in &config.env_files {
            if env_file.exists() {
                loaded += Self::load_env_file(env_file)?;
            } else {
                log::debug!("Env file {} not found, skipping", env_file.display());
            }
        }
        Ok(loaded)
    }

    fn load_env_file<P: AsRef<Path>>(path: P) -> Result<usize, ChessBotError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ChessBotError::Config(format!(
                "Failed to read env file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let mut loaded = 0;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if env::var_os(key).is_none() {
                    env::set_var(key, value);
                    loaded += 1;
                }
            }
        }

        log::debug!(
            "Loaded {} variables from {}",
            loaded,
            path.as_ref().display()
        );
        Ok(loaded)
    }
}
