//! Console presentation for the move command

use chessbot_core::board::{Coordinate, COLUMNS};
use chessbot_core::commands::Instruction;
use chessbot_core::orchestrator::{MovePlan, MoveReport, Stage};
use chessbot_core::positions::{Direction, PositionEntry};

const RULE: usize = 50;

pub fn rule() -> String {
    "=".repeat(RULE)
}

pub fn print_error(message: &str) {
    println!("❌ Error: {}\n", message);
}

pub fn print_usage() {
    println!("🏛️  Chess Robot Controller");
    println!("{}", rule());
    println!("📋 Usage: chessbot <from_position> <to_position>");
    println!("📋 Example: chessbot d7 d5");
    println!("\n📍 Available positions (all 64 squares):");
    print!("{}", board_layout());

    println!("\n🔄 Movement sequence executed:");
    println!("   1. attack → 2. open → 3. from_position → 4. close → 5. home");
    println!("   6. attack → 7. to_position → 8. open → 9. home → 10. close → 11. move_for_cam");

    println!("\n🎯 Robot configuration:");
    println!("   • Board: 260mm x 260mm (33mm per square)");
    println!("   • Robot: SO-101 with 6 DOF");
    println!("   • Position: 2cm from D column edge");
    println!("   • Rotation: Automatic based on target column");
}

/// Squares laid out rank 8 to rank 1, one line per rank.
pub fn board_layout() -> String {
    let squares: Vec<Coordinate> = Coordinate::all().collect();
    squares
        .chunks(COLUMNS.len())
        .map(|rank| {
            let names: Vec<String> = rank.iter().map(|c| c.to_string()).collect();
            format!("   {}: {}\n", rank[0].row_char(), names.join(" "))
        })
        .collect()
}

pub fn position_info(coordinate: &Coordinate, entry: &PositionEntry) -> String {
    let column = coordinate.column_char().to_ascii_uppercase();
    let alignment = match entry.direction() {
        Direction::Aligned => "Direct alignment (no rotation)",
        Direction::Left => "Left rotation",
        Direction::Right => "Right rotation",
    };
    format!(
        "📍 Position {} details:\n   Forward distance: {}mm\n   Rotation angle: {}°\n   Column {}: {}",
        coordinate.to_string().to_uppercase(),
        entry.forward,
        entry.rotation,
        column,
        alignment
    )
}

pub fn print_move_header(plan: &MovePlan, from: &PositionEntry, to: &PositionEntry) {
    println!("🤖 Chess Robot Controller - Move Execution");
    println!("{}", rule());
    println!("\n{}", position_info(&plan.from, from));
    println!("\n{}", position_info(&plan.to, to));
    println!(
        "\n🚀 Starting chess move: {} → {}",
        plan.from.to_string().to_uppercase(),
        plan.to.to_string().to_uppercase()
    );
    println!("{}", rule());
}

pub fn stage_banner(stage: &Stage, total: usize) -> String {
    match stage {
        Stage::Named { step, label, .. } => {
            format!("🎯 --- [{}/{}] Executing: {} ---", step, total, label.to_uppercase())
        }
        Stage::Home {
            step, coordinate, ..
        } => format!(
            "🏠 --- [{}/{}] Executing: HOME (from {}) ---",
            step,
            total,
            coordinate.to_string().to_uppercase()
        ),
    }
}

pub fn print_stage_banner(stage: &Stage, total: usize) {
    println!("\n{}", stage_banner(stage, total));
}

pub fn print_interrupted() {
    println!("\n⏹️  Move interrupted by user");
}

pub fn print_plan(plan: &MovePlan, sequences: &[(Stage, Vec<Instruction>)]) {
    println!(
        "📝 Dry run: {} → {} ({} stages, nothing sent to the arm)",
        plan.from.to_string().to_uppercase(),
        plan.to.to_string().to_uppercase(),
        plan.len()
    );
    for (stage, instructions) in sequences {
        println!("\n{}", stage);
        for instruction in instructions {
            println!("   {}", describe_instruction(instruction));
        }
    }
}

pub fn describe_instruction(instruction: &Instruction) -> String {
    match instruction {
        Instruction::Wait { wait } => format!("⏳ wait {}s", wait),
        Instruction::Tool { tool, args } => {
            format!("🔧 {} {}", tool, serde_json::Value::Object(args.clone()))
        }
    }
}

pub fn print_success(report: &MoveReport) {
    println!(
        "\n🎉 Successfully completed chess move: {} → {} ({} tool calls)",
        report.from.to_string().to_uppercase(),
        report.to.to_string().to_uppercase(),
        report.tool_calls()
    );
    println!("{}", rule());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chessbot_core::positions::PositionTable;

    #[test]
    fn test_board_layout() {
        let layout = board_layout();
        let lines: Vec<&str> = layout.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "   8: a8 b8 c8 d8 e8 f8 g8 h8");
        assert_eq!(lines[7], "   1: a1 b1 c1 d1 e1 f1 g1 h1");
    }

    #[test]
    fn test_position_info() {
        let coordinate: Coordinate = "b7".parse().unwrap();
        let entry = PositionTable::global().lookup(&coordinate).unwrap();
        let info = position_info(&coordinate, &entry);
        assert!(info.contains("Position B7"));
        assert!(info.contains("Forward distance: 98mm"));
        assert!(info.contains("Rotation angle: -45°"));
        assert!(info.contains("Column B: Left rotation"));
    }

    #[test]
    fn test_stage_banner_uses_plan_length() {
        let plan = MovePlan::new("d7".parse().unwrap(), "d5".parse().unwrap());
        assert_eq!(
            stage_banner(&plan.stages[3], plan.len()),
            "🎯 --- [4/11] Executing: CLOSE ---"
        );
        assert_eq!(
            stage_banner(&plan.stages[4], plan.len()),
            "🏠 --- [5/11] Executing: HOME (from D7) ---"
        );
    }

    #[test]
    fn test_describe_instruction() {
        assert_eq!(describe_instruction(&Instruction::wait(1.5)), "⏳ wait 1.5s");
        let tool = Instruction::tool("move_robot", [("move_gripper_up_mm", "50")]);
        assert_eq!(
            describe_instruction(&tool),
            "🔧 move_robot {\"move_gripper_up_mm\":\"50\"}"
        );
    }
}
