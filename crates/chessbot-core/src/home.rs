//! Return-home sequence built from a square's calibrated position

use crate::commands::Instruction;
use crate::config::HomeGeometry;
use crate::positions::PositionEntry;

/// Builds the sequence that brings the gripper back from `entry` to home:
/// raise, tilt down, lower, retreat the forward travel and, if the base was
/// rotated, rotate back. Argument values are strings, as the arm server expects.
pub fn synthesize_home(entry: &PositionEntry, geometry: &HomeGeometry) -> Vec<Instruction> {
    let tool = geometry.tool.as_str();
    let mut sequence = vec![
        Instruction::tool(
            tool,
            [("move_gripper_up_mm", geometry.raise_mm.to_string())],
        ),
        Instruction::tool(
            tool,
            [("tilt_gripper_down_angle", geometry.tilt_angle.to_string())],
        ),
        Instruction::tool(
            tool,
            [("move_gripper_up_mm", (-i64::from(geometry.lower_mm)).to_string())],
        ),
        Instruction::tool(
            tool,
            [("move_gripper_forward_mm", format!("-{}", entry.forward))],
        ),
    ];

    if entry.rotation != 0 {
        sequence.push(Instruction::tool(
            tool,
            [("rotate_robot_right_angle", (-entry.rotation).to_string())],
        ));
    }

    sequence
}
