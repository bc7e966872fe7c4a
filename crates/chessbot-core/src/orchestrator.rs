//! Pick-and-place plan for moving one piece between two squares
//!
//! A move is always the same eleven stages, run once, in order:
//!
//! ```text
//!  1. attack          5. home (from)     9. home (to)
//!  2. open            6. attack         10. close
//!  3. <from square>   7. <to square>    11. move_for_cam
//!  4. close           8. open
//! ```
//!
//! Stages 1-5 pick the piece up (source leg), 6-11 put it down (destination
//! leg). Stages are grouped into phases; every sequence of a phase is resolved
//! before the first one is dispatched, so the arm never descends onto a square
//! unless it can also grip and return home. A failure stops the plan where it
//! is; the piece may be left in the gripper.

use std::borrow::Cow;
use std::fmt;

use crate::board::Coordinate;
use crate::commands::{CommandStore, Instruction};
use crate::config::HomeGeometry;
use crate::errors::{ChessBotError, ValidationError};
use crate::executor::{SequenceExecutor, SequenceReport};
use crate::home::synthesize_home;
use crate::positions::PositionTable;

pub const ATTACK: &str = "attack";
pub const OPEN: &str = "open";
pub const CLOSE: &str = "close";
pub const MOVE_FOR_CAM: &str = "move_for_cam";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    Source,
    Destination,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Source => write!(f, "source move"),
            Leg::Destination => write!(f, "destination move"),
        }
    }
}

/// Groups of stages whose sequences are resolved together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// attack, open
    Prepare,
    /// source square, close, home
    Pick,
    /// attack
    Approach,
    /// destination square, open, home
    Place,
    /// close, move_for_cam
    Park,
}

/// One step of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Replay a sequence from the command store.
    Named { step: usize, leg: Leg, label: String },
    /// Replay a return-home sequence synthesized for `coordinate`.
    Home {
        step: usize,
        leg: Leg,
        coordinate: Coordinate,
    },
}

impl Stage {
    fn named(step: usize, leg: Leg, label: impl Into<String>) -> Self {
        Stage::Named {
            step,
            leg,
            label: label.into(),
        }
    }

    pub fn step(&self) -> usize {
        match self {
            Stage::Named { step, .. } | Stage::Home { step, .. } => *step,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.step() {
            1..=2 => Phase::Prepare,
            3..=5 => Phase::Pick,
            6 => Phase::Approach,
            7..=9 => Phase::Place,
            _ => Phase::Park,
        }
    }

    pub fn leg(&self) -> Leg {
        match self {
            Stage::Named { leg, .. } | Stage::Home { leg, .. } => *leg,
        }
    }

    /// Label the executed sequence is reported under.
    pub fn label(&self) -> String {
        match self {
            Stage::Named { label, .. } => label.clone(),
            Stage::Home { coordinate, .. } => format!("home from {}", coordinate),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Named { step, leg, label } => write!(f, "step {} ({}, '{}')", step, leg, label),
            Stage::Home {
                step,
                leg,
                coordinate,
            } => write!(f, "step {} ({}, home from {})", step, leg, coordinate),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub from: Coordinate,
    pub to: Coordinate,
    pub stages: Vec<Stage>,
}

impl MovePlan {
    pub fn new(from: Coordinate, to: Coordinate) -> Self {
        use Leg::{Destination, Source};

        let stages = vec![
            Stage::named(1, Source, ATTACK),
            Stage::named(2, Source, OPEN),
            Stage::named(3, Source, from.label()),
            Stage::named(4, Source, CLOSE),
            Stage::Home {
                step: 5,
                leg: Source,
                coordinate: from,
            },
            Stage::named(6, Destination, ATTACK),
            Stage::named(7, Destination, to.label()),
            Stage::named(8, Destination, OPEN),
            Stage::Home {
                step: 9,
                leg: Destination,
                coordinate: to,
            },
            Stage::named(10, Destination, CLOSE),
            Stage::named(11, Destination, MOVE_FOR_CAM),
        ];

        Self { from, to, stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Consecutive runs of stages sharing a phase, in plan order.
    pub fn phases(&self) -> Vec<&[Stage]> {
        self.stages
            .chunk_by(|a, b| a.phase() == b.phase())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageOutcome {
    pub stage: Stage,
    pub report: SequenceReport,
}

/// Outcome of a completed move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReport {
    pub from: Coordinate,
    pub to: Coordinate,
    pub stages: Vec<StageOutcome>,
}

impl MoveReport {
    pub fn tool_calls(&self) -> usize {
        self.stages.iter().map(|s| s.report.tool_calls).sum()
    }
}

/// Checks everything that must hold before the arm moves: distinct squares,
/// both present in the position table and in the command store.
pub fn check_move(
    positions: &PositionTable,
    commands: &CommandStore,
    from: Coordinate,
    to: Coordinate,
) -> Result<MovePlan, ChessBotError> {
    if from == to {
        return Err(ValidationError::SamePosition(from.label()).into());
    }

    for coordinate in [from, to] {
        positions.lookup(&coordinate)?;
        if !commands.contains(&coordinate.label()) {
            return Err(ChessBotError::not_found(coordinate.label()));
        }
    }

    Ok(MovePlan::new(from, to))
}

/// Instructions a stage will replay. Named stages are looked up in the
/// command store here, so a missing label only fails once its phase is reached.
pub fn resolve_stage<'a>(
    positions: &PositionTable,
    commands: &'a CommandStore,
    home: &HomeGeometry,
    stage: &Stage,
) -> Result<Cow<'a, [Instruction]>, ChessBotError> {
    match stage {
        Stage::Named { label, .. } => commands.get(label).map(Cow::Borrowed),
        Stage::Home { coordinate, .. } => {
            let entry = positions.lookup(coordinate)?;
            Ok(Cow::Owned(synthesize_home(&entry, home)))
        }
    }
}

pub struct MoveOrchestrator<'a> {
    positions: &'a PositionTable,
    commands: &'a CommandStore,
    home: &'a HomeGeometry,
    executor: SequenceExecutor<'a>,
}

impl<'a> MoveOrchestrator<'a> {
    pub fn new(
        positions: &'a PositionTable,
        commands: &'a CommandStore,
        home: &'a HomeGeometry,
        executor: SequenceExecutor<'a>,
    ) -> Self {
        Self {
            positions,
            commands,
            home,
            executor,
        }
    }

    pub fn plan(&self, from: Coordinate, to: Coordinate) -> Result<MovePlan, ChessBotError> {
        check_move(self.positions, self.commands, from, to)
    }

    pub fn sequence_for(&self, stage: &Stage) -> Result<Cow<'a, [Instruction]>, ChessBotError> {
        resolve_stage(self.positions, self.commands, self.home, stage)
    }

    pub async fn execute_move(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<MoveReport, ChessBotError> {
        self.execute_move_with(from, to, |_| {}).await
    }

    /// Runs the full plan, calling `on_stage_start` before each stage.
    pub async fn execute_move_with<F>(
        &self,
        from: Coordinate,
        to: Coordinate,
        on_stage_start: F,
    ) -> Result<MoveReport, ChessBotError>
    where
        F: FnMut(&Stage),
    {
        let plan = self.plan(from, to)?;
        self.execute_plan(&plan, on_stage_start).await
    }

    pub async fn execute_plan<F>(
        &self,
        plan: &MovePlan,
        mut on_stage_start: F,
    ) -> Result<MoveReport, ChessBotError>
    where
        F: FnMut(&Stage),
    {
        log::info!(
            "Starting move {} -> {} ({} stages)",
            plan.from,
            plan.to,
            plan.len()
        );

        let mut stages = Vec::with_capacity(plan.len());
        for phase in plan.phases() {
            let mut resolved = Vec::with_capacity(phase.len());
            for stage in phase {
                let sequence = self
                    .sequence_for(stage)
                    .map_err(|e| e.in_stage(stage.clone()))?;
                resolved.push((stage, sequence));
            }

            for (stage, sequence) in resolved {
                on_stage_start(stage);

                let report = self
                    .executor
                    .run(&stage.label(), &sequence)
                    .await
                    .map_err(|e| e.in_stage(stage.clone()))?;

                stages.push(StageOutcome {
                    stage: stage.clone(),
                    report,
                });
            }
        }

        log::info!("Completed move {} -> {}", plan.from, plan.to);
        Ok(MoveReport {
            from: plan.from,
            to: plan.to,
            stages,
        })
    }
}
