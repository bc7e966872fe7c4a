//! Core library for moving chess pieces with a robotic arm.
//!
//! A move between two squares is translated into a fixed pick-and-place plan.
//! Each stage of the plan replays a named instruction sequence from the
//! command store, or a return-home sequence computed from the calibrated
//! position of the square, against an MCP actuator server.
//!
//! # Architecture Overview
//!
//! - **board**: coordinates and the validator that produces them
//! - **positions**: calibrated forward travel and rotation for each square
//! - **commands**: named instruction sequences loaded from JSON
//! - **home**: return-home sequence synthesis
//! - **executor**: step-by-step replay with settling pauses
//! - **orchestrator**: the eleven-stage move plan
//! - **tools**: actuator client trait and the MCP child-process client
//! - **config**: YAML settings, environment overrides and env files

pub mod board;
pub mod commands;
pub mod config;
pub mod errors;
pub mod executor;
pub mod home;
pub mod orchestrator;
pub mod positions;
pub mod tools;

pub use board::{normalize, validate, validate_move, Coordinate};
pub use commands::{CommandStore, Instruction, NamedSequence};
pub use config::{ChessBotConfig, ConfigLoader, HomeGeometry, McpCommand};
pub use errors::{ChessBotError, ValidationError};
pub use executor::{SequenceExecutor, SequenceReport};
pub use home::synthesize_home;
pub use orchestrator::{Leg, MoveOrchestrator, MovePlan, MoveReport, Phase, Stage, StageOutcome};
pub use positions::{Direction, PositionEntry, PositionTable};
pub use tools::{ActuatorClient, RecordingActuator, RmcpActuator};
