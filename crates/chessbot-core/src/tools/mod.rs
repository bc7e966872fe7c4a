//! Remote actuator transport
//!
//! The arm is driven through an MCP server spawned as a child process. The
//! rest of the crate only sees [`ActuatorClient`], so tests can substitute a
//! recording mock for the real connection.

pub mod mcp_client;
pub mod rmcp_client;

pub use mcp_client::{ActuatorClient, RecordedCall, RecordingActuator};
pub use rmcp_client::RmcpActuator;
