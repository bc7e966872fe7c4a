//! Named instruction sequences loaded from `command.json`
//!
//! The store is a JSON object whose keys are labels (`attack`, `open`,
//! `close`, `move_for_cam` and one per square) and whose values are arrays of
//! instructions. It is loaded once per run and never mutated.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ChessBotError;

/// A single step of a sequence: either pause for `wait` seconds or call a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Instruction {
    Wait {
        wait: f64,
    },
    Tool {
        tool: String,
        #[serde(default)]
        args: Map<String, Value>,
    },
}

impl Instruction {
    pub fn tool<I, K, V>(tool: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Instruction::Tool {
            tool: tool.into(),
            args: args
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn wait(seconds: f64) -> Self {
        Instruction::Wait { wait: seconds }
    }
}

/// Length of a wait directive. Negative, non-finite and values too large for
/// a `Duration` are rejected.
pub fn wait_duration(seconds: f64) -> Result<Duration, ChessBotError> {
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| ChessBotError::Config(format!("invalid wait of {} seconds: {}", seconds, e)))
}

pub type NamedSequence = Vec<Instruction>;

#[derive(Debug, Clone, Default)]
pub struct CommandStore {
    sequences: HashMap<String, NamedSequence>,
}

impl CommandStore {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ChessBotError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChessBotError::Config(format!(
                "Failed to read command file {}: {}",
                path.display(),
                e
            ))
        })?;

        let store = Self::from_str(&content).map_err(|e| match e {
            ChessBotError::Config(msg) => {
                ChessBotError::Config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })?;

        log::info!(
            "Loaded {} command sequences from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ChessBotError> {
        let sequences: HashMap<String, NamedSequence> = serde_json::from_str(content)
            .map_err(|e| ChessBotError::Config(format!("Invalid JSON in command file: {}", e)))?;

        for (label, sequence) in &sequences {
            for (index, instruction) in sequence.iter().enumerate() {
                if let Instruction::Wait { wait } = instruction {
                    if wait_duration(*wait).is_err() {
                        return Err(ChessBotError::Config(format!(
                            "Command '{}' step {} has an invalid wait of {} seconds",
                            label,
                            index + 1,
                            wait
                        )));
                    }
                }
            }
        }

        Ok(Self { sequences })
    }

    pub fn from_sequences(sequences: HashMap<String, NamedSequence>) -> Self {
        Self { sequences }
    }

    pub fn get(&self, label: &str) -> Result<&[Instruction], ChessBotError> {
        self.sequences
            .get(label)
            .map(|s| s.as_slice())
            .ok_or_else(|| ChessBotError::not_found(label))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.sequences.contains_key(label)
    }

    /// Labels in sorted order.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.sequences.keys().map(|k| k.as_str()).collect();
        labels.sort_unstable();
        labels
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}
