//! Error types for the chess move pipeline
//!
//! Errors are grouped by the stage that produces them: coordinate validation,
//! configuration and command store loading, label lookup at dispatch time,
//! and the actuator transport. None of them are retried; the caller decides
//! how to present them.

use thiserror::Error;

use crate::orchestrator::Stage;

/// Reasons a user-supplied coordinate is rejected, in rule order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid position format '{0}'. Use format like 'd7', 'e5', etc.")]
    InvalidLength(String),
    #[error("Invalid column '{0}'. Must be a-h.")]
    InvalidColumn(char),
    #[error("Invalid row '{0}'. Must be 1-8.")]
    InvalidRow(char),
    #[error("Position '{0}' not available in position data.")]
    UnknownPosition(String),
    #[error("From and to positions cannot be the same ('{0}')")]
    SamePosition(String),
}

#[derive(Error, Debug, Clone)]
pub enum ChessBotError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Command '{label}' not found in command store")]
    NotFound { label: String },
    #[error("Actuator transport error: {0}")]
    Transport(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Failed during {stage}: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<ChessBotError>,
    },
}

impl ChessBotError {
    pub fn not_found(label: impl Into<String>) -> Self {
        ChessBotError::NotFound {
            label: label.into(),
        }
    }

    /// Attaches the stage that was running when this error occurred.
    pub fn in_stage(self, stage: Stage) -> Self {
        ChessBotError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The stage that was running when the error occurred, if any.
    pub fn stage(&self) -> Option<&Stage> {
        match self {
            ChessBotError::Stage { stage, .. } => Some(stage),
            _ => None,
        }
    }

    /// The error with any stage context stripped.
    pub fn root(&self) -> &ChessBotError {
        match self {
            ChessBotError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<std::io::Error> for ChessBotError {
    fn from(err: std::io::Error) -> Self {
        ChessBotError::Io(err.to_string())
    }
}
