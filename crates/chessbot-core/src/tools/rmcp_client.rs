//! MCP actuator client over a child-process stdio transport
//!
//! The arm server is spawned once per run, initialized with the MCP handshake
//! and kept for every sequence of the move. Dropping the client cancels the
//! service, which terminates the child process.

use async_trait::async_trait;
use rmcp::{
    model::{CallToolRequestParam, RawContent, ResourceContents},
    service::{DynService, RunningService, ServiceExt},
    transport::TokioChildProcess,
    RoleClient,
};
use serde_json::{Map, Value};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::mcp_client::ActuatorClient;
use crate::config::McpCommand;
use crate::errors::ChessBotError;

pub struct RmcpActuator {
    service: Option<RunningService<RoleClient, Box<dyn DynService<RoleClient>>>>,
}

impl RmcpActuator {
    /// Spawns the server and performs the MCP initialize handshake. When
    /// `stderr_log` is set, the server's stderr is appended to that file.
    pub async fn connect(
        mcp_command: &McpCommand,
        stderr_log: Option<&Path>,
    ) -> Result<Self, ChessBotError> {
        log::info!(
            "🚀 Starting actuator server with command: {} {:?}",
            mcp_command.run,
            mcp_command.args
        );

        let mut cmd = Command::new(&mcp_command.run);
        cmd.args(&mcp_command.args);

        if let Some(working_dir) = &mcp_command.working_dir {
            log::info!("📁 Setting working directory: {}", working_dir.display());
            cmd.current_dir(working_dir);
        }

        // Inherit the parent environment, then apply configured overrides
        cmd.envs(std::env::vars());
        for (key, value) in &mcp_command.env {
            log::debug!("   {}={}", key, redact(key, value));
            cmd.env(key, value);
        }

        if let Some(log_path) = stderr_log {
            let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
            let separator = format!(
                "\n=== Actuator server '{}' started at {} ===\n",
                mcp_command.run, timestamp
            );

            let mut log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)
                .map_err(|e| {
                    ChessBotError::Transport(format!(
                        "Failed to open actuator log file {}: {}",
                        log_path.display(),
                        e
                    ))
                })?;
            log_file.write_all(separator.as_bytes()).map_err(|e| {
                ChessBotError::Transport(format!("Failed to write actuator log file: {}", e))
            })?;

            cmd.stderr(Stdio::from(log_file));
            log::info!(
                "📝 Actuator server stderr will be written to {}",
                log_path.display()
            );
        }

        let transport = TokioChildProcess::new(cmd).map_err(|e| {
            ChessBotError::Transport(format!(
                "Failed to spawn actuator server '{}': {}",
                mcp_command.run, e
            ))
        })?;

        let service_handler: Box<dyn DynService<RoleClient>> = Box::new(());
        let service = service_handler.serve(transport).await.map_err(|e| {
            log::error!("💥 Actuator server initialization failed: {}", e);
            ChessBotError::Transport(format!("Failed to initialize actuator session: {}", e))
        })?;

        log::info!("✅ Connected to actuator server: {:?}", service.peer_info());

        Ok(Self {
            service: Some(service),
        })
    }

    pub async fn disconnect(&mut self) -> Result<(), ChessBotError> {
        if let Some(service) = self.service.take() {
            service.cancel().await.map_err(|e| {
                ChessBotError::Transport(format!("Failed to close actuator session: {}", e))
            })?;
            log::info!("Disconnected from actuator server");
        }
        Ok(())
    }
}

fn redact<'a>(key: &str, value: &'a str) -> &'a str {
    let key = key.to_ascii_uppercase();
    if key.contains("KEY") || key.contains("TOKEN") || key.contains("SECRET") {
        "***REDACTED***"
    } else {
        value
    }
}

fn render_content(content: &[rmcp::model::Content]) -> String {
    if content.is_empty() {
        return "Tool executed successfully (no content returned)".to_string();
    }

    let parts: Vec<String> = content
        .iter()
        .map(|c| match &c.raw {
            RawContent::Text(text_content) => text_content.text.clone(),
            RawContent::Image(image_content) => format!(
                "Image ({}, {} bytes)",
                image_content.mime_type,
                image_content.data.len()
            ),
            RawContent::Resource(resource_content) => match &resource_content.resource {
                ResourceContents::TextResourceContents { uri, .. } => {
                    format!("Resource: {}", uri)
                }
                ResourceContents::BlobResourceContents { uri, .. } => {
                    format!("Resource: {}", uri)
                }
            },
            RawContent::Audio(audio_content) => format!(
                "Audio ({}, {} bytes)",
                audio_content.mime_type,
                audio_content.data.len()
            ),
        })
        .collect();

    parts.join("\n")
}

#[async_trait]
impl ActuatorClient for RmcpActuator {
    async fn call_tool(
        &self,
        tool_name: &str,
        arguments: Map<String, Value>,
    ) -> Result<String, ChessBotError> {
        let service = self
            .service
            .as_ref()
            .ok_or_else(|| ChessBotError::Transport("Not connected".to_string()))?;

        let request = CallToolRequestParam {
            name: tool_name.to_string().into(),
            arguments: Some(arguments),
        };

        let result = service.call_tool(request).await.map_err(|e| {
            ChessBotError::Transport(format!("Failed to call tool '{}': {}", tool_name, e))
        })?;

        let text = render_content(&result.content);
        if result.is_error.unwrap_or(false) {
            return Err(ChessBotError::Transport(format!(
                "Tool '{}' reported an error: {}",
                tool_name, text
            )));
        }

        Ok(text)
    }

    async fn is_connected(&self) -> bool {
        self.service.is_some()
    }
}

impl Drop for RmcpActuator {
    fn drop(&mut self) {
        if let Some(service) = self.service.take() {
            // Can't await in Drop; cancel on the runtime if one is still running.
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    if let Err(e) = service.cancel().await {
                        log::warn!("Failed to cancel actuator session during drop: {}", e);
                    }
                });
            }
        }
    }
}
