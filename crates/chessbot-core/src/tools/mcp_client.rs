//! Actuator client abstraction and a recording mock for tests

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

use crate::errors::ChessBotError;

/// A connection able to invoke named tools on the arm.
#[async_trait]
pub trait ActuatorClient: Send + Sync {
    async fn call_tool(
        &self,
        tool_name: &str,
        arguments: Map<String, Value>,
    ) -> Result<String, ChessBotError>;
    async fn is_connected(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub tool: String,
    pub args: Map<String, Value>,
}

/// Records every call it receives; can be told to fail on a given tool or
/// after a number of successful calls.
#[derive(Clone, Default)]
pub struct RecordingActuator {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    fail_on_tool: Option<String>,
    fail_after: Option<usize>,
    connected: bool,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Default::default()
        }
    }

    pub fn failing_on_tool(tool: impl Into<String>) -> Self {
        Self {
            fail_on_tool: Some(tool.into()),
            ..Self::new()
        }
    }

    pub fn failing_after(successful_calls: usize) -> Self {
        Self {
            fail_after: Some(successful_calls),
            ..Self::new()
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ActuatorClient for RecordingActuator {
    async fn call_tool(
        &self,
        tool_name: &str,
        arguments: Map<String, Value>,
    ) -> Result<String, ChessBotError> {
        if !self.connected {
            return Err(ChessBotError::Transport("Not connected".to_string()));
        }

        let mut calls = self.calls.lock().unwrap();
        if self.fail_on_tool.as_deref() == Some(tool_name) {
            return Err(ChessBotError::Transport(format!(
                "Tool '{}' failed",
                tool_name
            )));
        }
        if self.fail_after.is_some_and(|limit| calls.len() >= limit) {
            return Err(ChessBotError::Transport(format!(
                "Actuator stopped responding after {} calls",
                calls.len()
            )));
        }

        calls.push(RecordedCall {
            tool: tool_name.to_string(),
            args: arguments.clone(),
        });

        Ok(format!(
            "Mock result from {} with arguments: {}",
            tool_name,
            Value::Object(arguments)
        ))
    }

    async fn is_connected(&self) -> bool {
        self.connected
    }
}
