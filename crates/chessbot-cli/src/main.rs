use anyhow::{Context, Result};
use chessbot_core::board::{normalize, validate, Coordinate};
use chessbot_core::commands::CommandStore;
use chessbot_core::config::{ChessBotConfig, ConfigLoader};
use chessbot_core::errors::ChessBotError;
use chessbot_core::executor::SequenceExecutor;
use chessbot_core::orchestrator::{check_move, resolve_stage, MoveOrchestrator, MovePlan};
use chessbot_core::positions::PositionTable;
use chessbot_core::tools::RmcpActuator;
use clap::Parser;
use log::LevelFilter;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::ExitCode;

mod output;

#[derive(Parser, Debug)]
#[clap(
    name = "chessbot",
    author,
    version,
    about = "Move a chess piece between two squares with the robot arm"
)]
struct Cli {
    /// Source and destination squares, e.g. `d7 d5`
    #[clap(value_name = "POSITION")]
    positions: Vec<String>,

    #[clap(
        long,
        short,
        help = "Settings file (defaults to chessbot.yaml when present)"
    )]
    config: Option<PathBuf>,

    #[clap(long, help = "Command sequence file, overrides the settings file")]
    commands: Option<PathBuf>,

    #[clap(long, short, default_value = "warn", value_parser = parse_log_level)]
    log_level: LevelFilter,

    #[clap(long, help = "Write logs to this file instead of stderr")]
    log_file: Option<PathBuf>,

    #[clap(long, help = "Validate and print the move plan without moving the arm")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("💥 Failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("\n❌ Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(cli.log_level);

    if let Some(path) = &cli.log_file {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }

    builder.init();
    Ok(())
}

fn parse_log_level(value: &str) -> Result<LevelFilter, String> {
    value.parse().map_err(|_| {
        format!(
            "invalid log level '{}' (expected off, error, warn, info, debug or trace)",
            value
        )
    })
}

/// Validates both squares; prints the reason and usage on failure.
fn parse_positions(positions: &[String]) -> Option<(Coordinate, Coordinate)> {
    if positions.len() != 2 {
        output::print_error("Invalid number of arguments");
        output::print_usage();
        return None;
    }

    let mut parsed = Vec::with_capacity(2);
    for (side, raw) in ["From", "To"].iter().zip(positions) {
        match validate(&normalize(raw)) {
            Ok(coordinate) => parsed.push(coordinate),
            Err(e) => {
                output::print_error(&format!("{} position - {}", side, e));
                output::print_usage();
                return None;
            }
        }
    }

    let (from, to) = (parsed[0], parsed[1]);
    if from == to {
        output::print_error("From and to positions cannot be the same");
        return None;
    }

    Some((from, to))
}

async fn load_config(cli: &Cli) -> Result<ChessBotConfig> {
    let mut config = ConfigLoader::from_source(cli.config.as_deref())
        .await
        .context("Failed to load settings")?;

    if let Some(commands) = &cli.commands {
        config.commands_path = commands.clone();
    }

    let loaded = ConfigLoader::load_env_files(&config)?;
    log::debug!("Loaded {} variables from env files", loaded);
    Ok(config)
}

fn mcp_log_path(log_file: &Path) -> PathBuf {
    let mut path = log_file.as_os_str().to_owned();
    path.push(".mcp");
    PathBuf::from(path)
}

async fn run(cli: Cli) -> Result<()> {
    let Some((from, to)) = parse_positions(&cli.positions) else {
        return Ok(());
    };

    let config = load_config(&cli).await?;
    log::info!("Using command file {}", config.commands_path.display());

    let commands = CommandStore::from_file(&config.commands_path)?;
    let positions = PositionTable::global();

    let plan = check_move(positions, &commands, from, to)?;
    let from_entry = positions.lookup(&from)?;
    let to_entry = positions.lookup(&to)?;

    if cli.dry_run {
        return print_dry_run(&plan, positions, &commands, &config);
    }

    output::print_move_header(&plan, &from_entry, &to_entry);

    // Covers both the server handshake and the move.
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let stderr_log = cli.log_file.as_deref().map(mcp_log_path);
    let connect = RmcpActuator::connect(&config.server, stderr_log.as_deref());
    let Some(connected) = interruptible(connect, shutdown.as_mut()).await else {
        output::print_interrupted();
        return Ok(());
    };
    let mut actuator = connected?;

    let outcome = {
        let executor = SequenceExecutor::new(&actuator, config.timing.step_pause());
        let orchestrator = MoveOrchestrator::new(positions, &commands, &config.home, executor);
        let total = plan.len();
        let moving =
            orchestrator.execute_plan(&plan, |stage| output::print_stage_banner(stage, total));

        interruptible(moving, shutdown.as_mut()).await
    };

    if let Err(e) = actuator.disconnect().await {
        log::warn!("Failed to disconnect from actuator server: {}", e);
    }

    match outcome {
        None => {
            output::print_interrupted();
            Ok(())
        }
        Some(Ok(report)) => {
            output::print_success(&report);
            Ok(())
        }
        Some(Err(e)) => Err(stage_context(e)),
    }
}

fn stage_context(err: ChessBotError) -> anyhow::Error {
    let context = match err.stage() {
        Some(stage) => format!("chess move aborted at {}", stage),
        None => "chess move aborted".to_string(),
    };
    anyhow::Error::new(err.root().clone()).context(context)
}

fn print_dry_run(
    plan: &MovePlan,
    positions: &PositionTable,
    commands: &CommandStore,
    config: &ChessBotConfig,
) -> Result<()> {
    let mut sequences = Vec::with_capacity(plan.len());
    for stage in &plan.stages {
        let sequence = resolve_stage(positions, commands, &config.home, stage)
            .map_err(|e| stage_context(e.in_stage(stage.clone())))?;
        sequences.push((stage.clone(), sequence.into_owned()));
    }
    output::print_plan(plan, &sequences);
    Ok(())
}

/// Runs `task` to completion unless `shutdown` completes first.
async fn interruptible<T, S>(task: impl Future<Output = T>, shutdown: Pin<&mut S>) -> Option<T>
where
    S: Future<Output = ()>,
{
    tokio::select! {
        result = task => Some(result),
        _ = shutdown => None,
    }
}

/// Completes on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C, stopping move...");
        },
        _ = terminate => {
            log::info!("Received SIGTERM, stopping move...");
        },
    }
}
