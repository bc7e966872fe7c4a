//! Replays instruction sequences against the actuator
//!
//! Steps run strictly in order: a wait directive sleeps, a tool instruction is
//! dispatched and awaited. Every step is followed by the settling pause. The
//! first dispatch failure aborts the rest of the sequence; nothing is retried
//! and nothing already executed is undone.

use std::time::Duration;

use crate::commands::{wait_duration, Instruction};
use crate::errors::ChessBotError;
use crate::tools::ActuatorClient;

/// What a sequence did before it finished.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceReport {
    pub label: String,
    pub tool_calls: usize,
    pub waits: usize,
    pub waited: Duration,
}

impl SequenceReport {
    pub fn steps(&self) -> usize {
        self.tool_calls + self.waits
    }
}

pub struct SequenceExecutor<'a> {
    client: &'a dyn ActuatorClient,
    step_pause: Duration,
}

impl<'a> SequenceExecutor<'a> {
    pub fn new(client: &'a dyn ActuatorClient, step_pause: Duration) -> Self {
        Self { client, step_pause }
    }

    pub async fn run(
        &self,
        label: &str,
        sequence: &[Instruction],
    ) -> Result<SequenceReport, ChessBotError> {
        log::info!("Executing sequence '{}' ({} steps)", label, sequence.len());

        let mut report = SequenceReport {
            label: label.to_string(),
            ..Default::default()
        };

        for (index, instruction) in sequence.iter().enumerate() {
            match instruction {
                Instruction::Wait { wait } => {
                    let duration = wait_duration(*wait)?;
                    log::debug!("⏳ [{}#{}] Waiting for {:?}", label, index + 1, duration);
                    tokio::time::sleep(duration).await;
                    report.waits += 1;
                    report.waited += duration;
                }
                Instruction::Tool { tool, args } => {
                    log::debug!(
                        "🔧 [{}#{}] Executing: {} with args {}",
                        label,
                        index + 1,
                        tool,
                        serde_json::Value::Object(args.clone())
                    );
                    let result = self.client.call_tool(tool, args.clone()).await.map_err(|e| {
                        log::error!(
                            "❌ Sequence '{}' aborted at step {}: {}",
                            label,
                            index + 1,
                            e
                        );
                        e
                    })?;
                    log::debug!("✅ [{}#{}] Result: {}", label, index + 1, result);
                    report.tool_calls += 1;
                }
            }

            tokio::time::sleep(self.step_pause).await;
        }

        log::info!(
            "Sequence '{}' finished: {} tool calls, {} waits",
            label,
            report.tool_calls,
            report.waits
        );
        Ok(report)
    }
}
