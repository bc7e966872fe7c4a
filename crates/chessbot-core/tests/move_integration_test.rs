use chessbot_core::board::Coordinate;
use chessbot_core::commands::{CommandStore, Instruction};
use chessbot_core::config::HomeGeometry;
use chessbot_core::errors::ChessBotError;
use chessbot_core::executor::SequenceExecutor;
use chessbot_core::orchestrator::{Leg, MoveOrchestrator, Stage};
use chessbot_core::positions::PositionTable;
use chessbot_core::tools::{RecordedCall, RecordingActuator};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

fn square(s: &str) -> Coordinate {
    s.parse().unwrap()
}

fn tool(name: &str, key: &str, value: &str) -> Instruction {
    Instruction::tool(name, [(key, value)])
}

/// A command store shaped like the arm's real `command.json`.
fn command_store() -> HashMap<String, Vec<Instruction>> {
    let mut sequences = HashMap::new();
    sequences.insert(
        "attack".to_string(),
        vec![tool("move_robot", "tilt_gripper_down_angle", "80")],
    );
    sequences.insert(
        "open".to_string(),
        vec![tool("control_gripper", "gripper_state", "open")],
    );
    sequences.insert(
        "close".to_string(),
        vec![tool("control_gripper", "gripper_state", "close")],
    );
    sequences.insert(
        "move_for_cam".to_string(),
        vec![tool("move_robot", "move_gripper_up_mm", "100")],
    );
    for coordinate in ["d7", "d5", "a8", "h1"] {
        sequences.insert(
            coordinate.to_string(),
            vec![tool("move_robot", "target_square", coordinate)],
        );
    }
    sequences
}

fn arg_values(calls: &[RecordedCall]) -> Vec<String> {
    calls
        .iter()
        .map(|call| {
            let (key, value) = call.args.iter().next().unwrap();
            format!("{}:{}={}", call.tool, key, value.as_str().unwrap())
        })
        .collect()
}

#[tokio::test]
async fn test_move_runs_eleven_stages_in_order() {
    let commands = CommandStore::from_sequences(command_store());
    let home = HomeGeometry::default();
    let client = RecordingActuator::new();
    let executor = SequenceExecutor::new(&client, Duration::ZERO);
    let orchestrator = MoveOrchestrator::new(PositionTable::global(), &commands, &home, executor);

    let mut started = Vec::new();
    let report = orchestrator
        .execute_move_with(square("d7"), square("d5"), |stage| started.push(stage.clone()))
        .await
        .unwrap();

    assert_eq!(report.stages.len(), 11);
    assert_eq!(started.len(), 11);
    let labels: Vec<String> = report.stages.iter().map(|s| s.report.label.clone()).collect();
    assert_eq!(
        labels,
        vec![
            "attack",
            "open",
            "d7",
            "close",
            "home from d7",
            "attack",
            "d5",
            "open",
            "home from d5",
            "close",
            "move_for_cam",
        ]
    );
    assert!(matches!(&started[2], Stage::Named { label, leg: Leg::Source, .. } if label == "d7"));
    assert!(matches!(&started[6], Stage::Named { label, leg: Leg::Destination, .. } if label == "d5"));

    // d7 and d5 sit on the aligned file, so each home sequence has four steps.
    assert_eq!(report.tool_calls(), 7 + 4 + 2 + 4);

    let calls = arg_values(&client.calls());
    assert_eq!(
        calls,
        vec![
            "move_robot:tilt_gripper_down_angle=80",
            "control_gripper:gripper_state=open",
            "move_robot:target_square=d7",
            "control_gripper:gripper_state=close",
            "move_robot:move_gripper_up_mm=50",
            "move_robot:tilt_gripper_down_angle=-80",
            "move_robot:move_gripper_up_mm=-75",
            "move_robot:move_gripper_forward_mm=-70",
            "move_robot:tilt_gripper_down_angle=80",
            "move_robot:target_square=d5",
            "control_gripper:gripper_state=open",
            "move_robot:move_gripper_up_mm=50",
            "move_robot:tilt_gripper_down_angle=-80",
            "move_robot:move_gripper_up_mm=-75",
            "move_robot:move_gripper_forward_mm=-150",
            "control_gripper:gripper_state=close",
            "move_robot:move_gripper_up_mm=100",
        ]
    );
}

#[tokio::test]
async fn test_rotated_squares_rotate_back_home() {
    let commands = CommandStore::from_sequences(command_store());
    let home = HomeGeometry::default();
    let client = RecordingActuator::new();
    let executor = SequenceExecutor::new(&client, Duration::ZERO);
    let orchestrator = MoveOrchestrator::new(PositionTable::global(), &commands, &home, executor);

    let report = orchestrator
        .execute_move(square("a8"), square("h1"))
        .await
        .unwrap();

    assert_eq!(report.stages[4].report.tool_calls, 5);
    assert_eq!(report.stages[8].report.tool_calls, 5);

    let rotations: Vec<_> = client
        .calls()
        .into_iter()
        .filter_map(|call| call.args.get("rotate_robot_right_angle").cloned())
        .collect();
    assert_eq!(rotations, vec![json!("90"), json!("-90")]);
}

#[tokio::test]
async fn test_missing_close_aborts_before_pick() {
    let mut sequences = command_store();
    sequences.remove("close");
    let commands = CommandStore::from_sequences(sequences);
    let home = HomeGeometry::default();
    let client = RecordingActuator::new();
    let executor = SequenceExecutor::new(&client, Duration::ZERO);
    let orchestrator = MoveOrchestrator::new(PositionTable::global(), &commands, &home, executor);

    let mut started = Vec::new();
    let err = orchestrator
        .execute_move_with(square("d7"), square("d5"), |stage| started.push(stage.step()))
        .await
        .unwrap_err();

    assert_eq!(started, vec![1, 2]);
    assert_eq!(err.stage().map(|s| s.step()), Some(4));
    assert!(matches!(err.root(), ChessBotError::NotFound { label } if label == "close"));
    assert!(err.to_string().contains("source move"));

    let calls = arg_values(&client.calls());
    assert_eq!(
        calls,
        vec![
            "move_robot:tilt_gripper_down_angle=80",
            "control_gripper:gripper_state=open",
        ]
    );
}

#[tokio::test]
async fn test_missing_square_label_fails_before_motion() {
    let commands = CommandStore::from_sequences(command_store());
    let home = HomeGeometry::default();
    let client = RecordingActuator::new();
    let executor = SequenceExecutor::new(&client, Duration::ZERO);
    let orchestrator = MoveOrchestrator::new(PositionTable::global(), &commands, &home, executor);

    let err = orchestrator
        .execute_move(square("d7"), square("e4"))
        .await
        .unwrap_err();

    assert!(matches!(err, ChessBotError::NotFound { ref label } if label == "e4"));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_same_square_rejected_before_motion() {
    let commands = CommandStore::from_sequences(command_store());
    let home = HomeGeometry::default();
    let client = RecordingActuator::new();
    let executor = SequenceExecutor::new(&client, Duration::ZERO);
    let orchestrator = MoveOrchestrator::new(PositionTable::global(), &commands, &home, executor);

    let err = orchestrator
        .execute_move(square("d7"), square("d7"))
        .await
        .unwrap_err();

    assert!(matches!(err, ChessBotError::Validation(_)));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_transport_failure_names_destination_stage() {
    let commands = CommandStore::from_sequences(command_store());
    let home = HomeGeometry::default();
    // Source leg of d7 -> d5 makes 8 calls; the next one is stage 6.
    let client = RecordingActuator::failing_after(8);
    let executor = SequenceExecutor::new(&client, Duration::ZERO);
    let orchestrator = MoveOrchestrator::new(PositionTable::global(), &commands, &home, executor);

    let err = orchestrator
        .execute_move(square("d7"), square("d5"))
        .await
        .unwrap_err();

    assert_eq!(err.stage().map(|s| s.step()), Some(6));
    assert!(matches!(err.root(), ChessBotError::Transport(_)));
    assert!(err.to_string().contains("destination move"));
    assert!(err.to_string().contains("attack"));
    assert_eq!(client.call_count(), 8);
}

#[tokio::test]
async fn test_round_trip_leaves_no_residual_state() {
    let commands = CommandStore::from_sequences(command_store());
    let labels_before: Vec<String> = commands.labels().iter().map(|l| l.to_string()).collect();
    let home = HomeGeometry::default();
    let client = RecordingActuator::new();
    let executor = SequenceExecutor::new(&client, Duration::ZERO);
    let orchestrator = MoveOrchestrator::new(PositionTable::global(), &commands, &home, executor);

    let there = orchestrator
        .execute_move(square("d7"), square("d5"))
        .await
        .unwrap();
    let back = orchestrator
        .execute_move(square("d5"), square("d7"))
        .await
        .unwrap();

    assert_eq!(there.stages.len(), back.stages.len());
    assert_eq!(there.tool_calls(), back.tool_calls());
    assert_eq!(client.call_count(), there.tool_calls() + back.tool_calls());

    let labels_after: Vec<String> = commands.labels().iter().map(|l| l.to_string()).collect();
    assert_eq!(labels_before, labels_after);
    assert_eq!(PositionTable::global().len(), 64);
}

#[tokio::test(start_paused = true)]
async fn test_waits_and_pauses_are_honored() {
    let mut sequences = command_store();
    sequences.insert(
        "attack".to_string(),
        vec![
            tool("move_robot", "tilt_gripper_down_angle", "80"),
            Instruction::wait(1.0),
        ],
    );
    let commands = CommandStore::from_sequences(sequences);
    let home = HomeGeometry::default();
    let client = RecordingActuator::new();
    let executor = SequenceExecutor::new(&client, Duration::from_millis(300));
    let orchestrator = MoveOrchestrator::new(PositionTable::global(), &commands, &home, executor);

    let start = tokio::time::Instant::now();
    let report = orchestrator
        .execute_move(square("d7"), square("d5"))
        .await
        .unwrap();
    let elapsed = start.elapsed();

    // 17 tool calls plus 2 waits, each followed by a 300ms pause, plus 2s of waits.
    let steps: usize = report.stages.iter().map(|s| s.report.steps()).sum();
    assert_eq!(steps, 19);
    let expected = Duration::from_millis(300) * 19 + Duration::from_secs(2);
    assert!(elapsed >= expected);
    assert!(elapsed < expected + Duration::from_millis(100));
}
