//! Configuration types for the chessbot controller
//!
//! Every field has a default so an absent `chessbot.yaml` yields a working
//! setup for the SO-101 arm driven by `mcp_robot_server.py`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ChessBotError;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChessBotConfig {
    #[serde(default)]
    pub server: McpCommand,
    #[serde(default = "default_commands_path")]
    pub commands_path: PathBuf,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub home: HomeGeometry,
    #[serde(default = "default_env_files")]
    pub env_files: Vec<PathBuf>,
}

/// Actuator server subprocess
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpCommand {
    pub run: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Settling pause after every step, in milliseconds.
    #[serde(default = "default_step_pause_ms")]
    pub step_pause_ms: u64,
}

/// Geometry of the synthesized return-home sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeGeometry {
    #[serde(default = "default_home_tool")]
    pub tool: String,
    #[serde(default = "default_raise_mm")]
    pub raise_mm: i32,
    #[serde(default = "default_tilt_angle")]
    pub tilt_angle: i32,
    #[serde(default = "default_lower_mm")]
    pub lower_mm: i32,
}

fn default_commands_path() -> PathBuf {
    PathBuf::from("command.json")
}

fn default_env_files() -> Vec<PathBuf> {
    vec![PathBuf::from(".env")]
}

fn default_step_pause_ms() -> u64 { 300 }
fn default_home_tool() -> String { "move_robot".to_string() }
fn default_raise_mm() -> i32 { 50 }
fn default_tilt_angle() -> i32 { -80 }
fn default_lower_mm() -> i32 { 75 }

impl Default for ChessBotConfig {
    fn default() -> Self {
        Self {
            server: McpCommand::default(),
            commands_path: default_commands_path(),
            timing: TimingConfig::default(),
            home: HomeGeometry::default(),
            env_files: default_env_files(),
        }
    }
}

impl Default for McpCommand {
    fn default() -> Self {
        Self {
            run: "python".to_string(),
            args: vec![
                "mcp_robot_server.py".to_string(),
                "--transport".to_string(),
                "stdio".to_string(),
            ],
            env: HashMap::new(),
            working_dir: None,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            step_pause_ms: default_step_pause_ms(),
        }
    }
}

impl TimingConfig {
    pub fn step_pause(&self) -> Duration {
        Duration::from_millis(self.step_pause_ms)
    }
}

impl Default for HomeGeometry {
    fn default() -> Self {
        Self {
            tool: default_home_tool(),
            raise_mm: default_raise_mm(),
            tilt_angle: default_tilt_angle(),
            lower_mm: default_lower_mm(),
        }
    }
}

impl ChessBotConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ChessBotError> {
        if self.server.run.trim().is_empty() {
            return Err(ChessBotError::Config(
                "Server command cannot be empty".to_string(),
            ));
        }

        if self.home.tool.trim().is_empty() {
            return Err(ChessBotError::Config(
                "Home sequence tool name cannot be empty".to_string(),
            ));
        }

        if self.commands_path.as_os_str().is_empty() {
            return Err(ChessBotError::Config(
                "Command file path cannot be empty".to_string(),
            ));
        }

        self.home.validate()
    }
}

/// Largest vertical travel, in millimetres, accepted for the home sequence.
pub const MAX_HOME_TRAVEL_MM: i32 = 500;

impl HomeGeometry {
    pub fn validate(&self) -> Result<(), ChessBotError> {
        for (name, value) in [("raise_mm", self.raise_mm), ("lower_mm", self.lower_mm)] {
            if !(0..=MAX_HOME_TRAVEL_MM).contains(&value) {
                return Err(ChessBotError::Config(format!(
                    "home.{} must be between 0 and {}, got {}",
                    name, MAX_HOME_TRAVEL_MM, value
                )));
            }
        }

        if !(-180..=180).contains(&self.tilt_angle) {
            return Err(ChessBotError::Config(format!(
                "home.tilt_angle must be between -180 and 180, got {}",
                self.tilt_angle
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ChessBotConfig::default().validate().is_ok());
    }

    #[test]
    fn test_home_geometry_bounds() {
        let mut config = ChessBotConfig::default();
        config.home.lower_mm = i32::MIN;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("home.lower_mm"));

        config.home.lower_mm = 75;
        config.home.raise_mm = MAX_HOME_TRAVEL_MM + 1;
        assert!(config.validate().is_err());

        config.home.raise_mm = 50;
        config.home.tilt_angle = 270;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("home.tilt_angle"));
    }
}
