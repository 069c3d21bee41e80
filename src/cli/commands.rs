use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::blocks::{Block, BlockKind, BlockProgram, BlockType, Scalar};
use crate::conditions::{self, parse_condition};
use crate::config::{self, Config};
use crate::devices::{spawn_file_poller, DeviceCommand, DeviceSnapshot, SharedDevices};
use crate::editor::{Diagram, RejectReason, SnapOutcome};
use crate::interpreter::{self, DeviceSetRunner, ExecutionContext, Notifier, RunFlag, RunSummary};
use crate::snap::SnapType;

use super::exit_codes::{self, ExitError};
use super::output::{
    self, AddData, CheckData, EvalData, MoveData, NewData, OutputMode, TreeData,
};

#[derive(Parser)]
#[command(name = "railblocks")]
#[command(about = "Edit and run block programs for model railway devices")]
#[command(version)]
pub struct Cli {
    /// Path to config file (overrides RAILBLOCKS_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Suppress all output on success (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log at debug level (RAILBLOCKS_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a new program with an empty setup and loop
    New {
        /// Program file to create
        #[arg(default_value = "program.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Report broken tree rules and unparsable conditions
    Check {
        /// Program file
        program: PathBuf,
    },

    /// Print an indented outline of a program
    Tree {
        /// Program file
        program: PathBuf,
    },

    /// Add a block; statements are parked in a floating holder
    Add {
        /// Program file
        program: PathBuf,

        /// Block type: once, forever, loop, if, wait, sleep, log, alert, device-set
        #[arg(short, long)]
        kind: BlockType,

        #[command(flatten)]
        fields: BlockFields,
    },

    /// Move a block and the blocks after it onto another block
    Move {
        /// Program file
        program: PathBuf,

        /// Block to drag
        block: String,

        /// Block to drop onto
        #[arg(long)]
        onto: String,

        /// inner: nest as first children, append: insert right after
        #[arg(long, default_value = "append")]
        snap: SnapType,
    },

    /// Evaluate a condition against a device status file
    Eval {
        /// Condition, e.g. "AB12:speed >= 500"
        condition: String,

        /// Device status file (defaults to devices_file from config)
        #[arg(short, long)]
        devices: Option<PathBuf>,
    },

    /// Run a program until it finishes or is interrupted
    Run {
        /// Program file
        program: PathBuf,

        /// Device status file, re-read every poll interval
        #[arg(short, long)]
        devices: Option<PathBuf>,

        /// Apply device writes to the local device view instead of only printing them
        #[arg(long)]
        simulate: bool,

        /// Stop after this many forever passes
        #[arg(long)]
        passes: Option<u64>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// fields of a new block; only those its kind carries are used
#[derive(Args, Debug, Default)]
pub struct BlockFields {
    /// Value for sleep (ms), log, alert and device-set
    #[arg(long)]
    pub value: Option<String>,

    /// Iteration count for loop
    #[arg(long)]
    pub count: Option<u32>,

    /// Condition for if and wait
    #[arg(long)]
    pub condition: Option<String>,

    /// Device id for device-set
    #[arg(long)]
    pub device: Option<String>,

    /// Property for device-set
    #[arg(long)]
    pub prop: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show config file path
    Path,
    /// Set a configuration value
    Set {
        /// Dotted key, e.g. settings.tick_hz
        key: String,
        value: String,
    },
    /// Print the default configuration
    Default,
    /// Verify configuration file
    Verify,
}

/// log and alert blocks print to the terminal
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn log(&self, value: &Scalar) {
        println!("{}", value);
    }

    fn alert(&self, value: &Scalar) {
        eprintln!("ALERT: {}", value);
    }
}

fn log_active_block(id: Option<&str>) {
    debug!(block = ?id, "active block");
}

pub fn execute(cli: Cli, config: Result<Config>, output_mode: OutputMode) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::New { path, force } => {
            if path.exists() && !force {
                return Err(ExitError::new(
                    exit_codes::INVALID_ARGS,
                    format!("{} already exists (use --force to overwrite)", path.display()),
                )
                .into());
            }

            let program = BlockProgram::starter();
            program.save(&path)?;

            match output_mode {
                OutputMode::Json => output::print_json(&NewData {
                    path: path.display().to_string(),
                    blocks: program.len(),
                }),
                OutputMode::Text => println!("Created {}", path.display()),
                OutputMode::Quiet => {}
            }
            Ok(())
        }

        Commands::Check { program: path } => {
            let program = BlockProgram::load(&path)?;
            let problems = find_problems(&program);

            if !problems.is_empty() {
                return Err(ExitError::new(
                    exit_codes::PROGRAM_ERROR,
                    format!("{} problem(s) in {}", problems.len(), path.display()),
                )
                .with_problems(problems)
                .into());
            }

            match output_mode {
                OutputMode::Json => output::print_json(&CheckData {
                    program: path.display().to_string(),
                    blocks: program.ids().len(),
                    valid: true,
                }),
                OutputMode::Text => println!("✓ Program is valid: {}", path.display()),
                OutputMode::Quiet => {}
            }
            Ok(())
        }

        Commands::Tree { program: path } => {
            let program = BlockProgram::load(&path)?;
            match output_mode {
                OutputMode::Json => output::print_json(&TreeData { program: &program }),
                OutputMode::Text => print!("{}", program.outline()),
                OutputMode::Quiet => {}
            }
            Ok(())
        }

        Commands::Add {
            program: path,
            kind,
            fields,
        } => {
            let config = require_config(config)?;
            if kind == BlockType::Dummy {
                return Err(ExitError::new(
                    exit_codes::INVALID_ARGS,
                    "dummy holders are created by moves, not added",
                )
                .into());
            }

            let mut diagram = Diagram::new(BlockProgram::load(&path)?)
                .with_spawn_position(config.settings.spawn_position);
            let id = diagram.add_block(build_kind(kind, fields)?);
            let dummy = diagram
                .program()
                .find_parent_block(&id)
                .map(|parent| parent.id.clone());
            diagram.program().save(&path)?;

            match output_mode {
                OutputMode::Json => output::print_json(&AddData {
                    id,
                    block_type: kind.as_str(),
                    dummy,
                }),
                OutputMode::Text => println!("{}", id),
                OutputMode::Quiet => {}
            }
            Ok(())
        }

        Commands::Move {
            program: path,
            block,
            onto,
            snap,
        } => {
            let outcome = move_block(&path, &block, &onto, snap)?;
            match output_mode {
                OutputMode::Json => output::print_json(&MoveData {
                    block,
                    onto,
                    outcome,
                }),
                OutputMode::Text => {
                    if let SnapOutcome::Committed {
                        parent,
                        index,
                        moved,
                    } = &outcome
                    {
                        println!("Moved {} block(s) into {} at {}", moved, parent, index);
                    }
                }
                OutputMode::Quiet => {}
            }
            Ok(())
        }

        Commands::Eval { condition, devices } => {
            let path = match devices {
                Some(path) => path,
                None => require_config(config)?.devices_file.ok_or_else(|| {
                    ExitError::new(
                        exit_codes::INVALID_ARGS,
                        "no device status file: pass --devices or set devices_file in config",
                    )
                })?,
            };

            let snapshot = DeviceSnapshot::load(&path)?;
            let result = conditions::check(&condition, &snapshot)?;

            match output_mode {
                OutputMode::Json => output::print_json(&EvalData { condition, result }),
                OutputMode::Text => println!("{}", result),
                OutputMode::Quiet => {}
            }
            Ok(())
        }

        Commands::Run {
            program,
            devices,
            simulate,
            passes,
        } => {
            let config = require_config(config)?;
            let summary = run_program(&program, devices, simulate, passes, &config)?;

            match output_mode {
                OutputMode::Json => output::print_json(&summary),
                OutputMode::Text if summary.cancelled => eprintln!("Stopped"),
                _ => {}
            }
            Ok(())
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let config = require_config(config)?;
                let json =
                    serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
                println!("{}", json);
                Ok(())
            }
            ConfigCommands::Path => {
                let path = config::get_config_path_with_override(config_path)?;
                println!("{}", path.display());
                Ok(())
            }
            ConfigCommands::Set { key, value } => {
                let mut config = require_config(config)?;
                config::set_value(&mut config, &key, &value)
                    .map_err(|e| ExitError::new(exit_codes::INVALID_ARGS, format!("{:#}", e)))?;
                config::save_with_override(&config, config_path)?;
                if output_mode.is_text() {
                    println!("Set {} = {}", key, value);
                }
                Ok(())
            }
            ConfigCommands::Default => {
                let json = serde_json::to_string_pretty(&Config::default())
                    .context("Failed to serialize config")?;
                println!("{}", json);
                Ok(())
            }
            ConfigCommands::Verify => {
                let path = config::get_config_path_with_override(config_path)?;
                let errors = config::verify(&path)
                    .map_err(|e| ExitError::new(exit_codes::CONFIG_ERROR, format!("{:#}", e)))?;

                if !errors.is_empty() {
                    return Err(ExitError::new(
                        exit_codes::CONFIG_ERROR,
                        format!(
                            "Configuration has {} error(s): {}",
                            errors.len(),
                            path.display()
                        ),
                    )
                    .with_problems(errors)
                    .into());
                }

                if output_mode.is_text() {
                    println!("✓ Configuration is valid: {}", path.display());
                }
                Ok(())
            }
        },
    }
}

fn require_config(config: Result<Config>) -> Result<Config> {
    config.map_err(|e| ExitError::new(exit_codes::CONFIG_ERROR, format!("{:#}", e)).into())
}

/// tree rule violations plus every wait/if condition that does not parse
fn find_problems(program: &BlockProgram) -> Vec<String> {
    let mut problems: Vec<String> = program
        .validate()
        .iter()
        .map(ToString::to_string)
        .collect();
    collect_condition_problems(program.blocks(), &mut problems);
    problems
}

fn collect_condition_problems(blocks: &[Block], problems: &mut Vec<String>) {
    for block in blocks {
        match &block.kind {
            BlockKind::If { condition, .. } | BlockKind::Wait { condition } => {
                if let Err(e) = parse_condition(condition) {
                    problems.push(format!("{} '{}': {}", block.block_type(), block.id, e));
                }
            }
            _ => {}
        }
        if let Some(children) = block.children() {
            collect_condition_problems(children, problems);
        }
    }
}

/// command-line value: numbers stay numbers, anything else is text
fn parse_scalar(value: &str) -> Scalar {
    match serde_json::from_str::<serde_json::Number>(value.trim()) {
        Ok(n) => Scalar::Number(n),
        Err(_) => Scalar::text(value),
    }
}

fn build_kind(block_type: BlockType, fields: BlockFields) -> Result<BlockKind> {
    let mut kind = block_type.default_kind();

    match &mut kind {
        BlockKind::Loop { count, .. } => {
            if let Some(n) = fields.count {
                *count = n;
            }
        }
        BlockKind::If { condition, .. } | BlockKind::Wait { condition } => {
            if let Some(text) = fields.condition {
                if let Err(e) = parse_condition(&text) {
                    warn!(condition = %text, error = %e, "condition does not parse yet");
                }
                *condition = text;
            }
        }
        BlockKind::Sleep { value } | BlockKind::Log { value } | BlockKind::Alert { value } => {
            if let Some(text) = fields.value {
                *value = parse_scalar(&text);
            }
        }
        BlockKind::DeviceSet {
            device,
            prop,
            value,
        } => {
            *device = fields
                .device
                .ok_or_else(|| ExitError::new(exit_codes::INVALID_ARGS, "device-set needs --device"))?;
            *prop = fields
                .prop
                .ok_or_else(|| ExitError::new(exit_codes::INVALID_ARGS, "device-set needs --prop"))?;
            if let Some(text) = fields.value {
                *value = parse_scalar(&text);
            }
        }
        BlockKind::Once { .. } | BlockKind::Forever { .. } | BlockKind::Dummy { .. } => {}
    }

    Ok(kind)
}

/// split `block` out and commit it onto `onto`; the file is only written on success
fn move_block(path: &Path, block: &str, onto: &str, snap: SnapType) -> Result<SnapOutcome> {
    let mut diagram = Diagram::new(BlockProgram::load(path)?);

    if !diagram.program().contains_id(onto) {
        return Err(crate::editor::StructuralError::NotFound(onto.to_string()).into());
    }
    let position = diagram
        .program()
        .find_block(block)
        .and_then(|b| b.position)
        .unwrap_or_default();
    diagram.on_split(block, position)?;

    let outcome = diagram.commit_snap(onto, snap, block);
    match &outcome {
        SnapOutcome::Committed { .. } => {
            diagram.program().save(path)?;
            Ok(outcome)
        }
        SnapOutcome::Rejected { reason } => {
            let why = match reason {
                RejectReason::SelfSnap => "a block cannot snap to itself",
                RejectReason::InsideDragged => "the target is part of the moved blocks",
            };
            Err(ExitError::new(
                exit_codes::INVALID_ARGS,
                format!("cannot move {} onto {}: {}", block, onto, why),
            )
            .into())
        }
        SnapOutcome::Floating { .. } => Err(ExitError::new(
            exit_codes::INVALID_ARGS,
            format!("{} has no {} snap point for {}", onto, snap, block),
        )
        .into()),
        SnapOutcome::NothingToCommit => Err(anyhow!("nothing to move for {}", block)),
    }
}

fn run_program(
    path: &Path,
    devices: Option<PathBuf>,
    simulate: bool,
    passes: Option<u64>,
    config: &Config,
) -> Result<RunSummary> {
    let program = BlockProgram::load(path)?;
    for violation in program.validate() {
        warn!(%violation, "program breaks a tree rule");
    }

    let devices_file = devices.or_else(|| config.devices_file.clone());
    let initial = match &devices_file {
        Some(file) => DeviceSnapshot::load(file)?,
        None => DeviceSnapshot::new(),
    };
    let shared = SharedDevices::new(initial);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow!("failed to start async runtime: {}", e))?;

    runtime.block_on(async {
        // simulated writes would be overwritten by the next reload
        let poller = match (&devices_file, simulate) {
            (Some(file), false) => Some(spawn_file_poller(
                file.clone(),
                Duration::from_millis(config.settings.poll_interval_ms.max(1)),
                shared.clone(),
            )),
            _ => None,
        };

        let (sender, mut receiver) = mpsc::unbounded_channel::<DeviceCommand>();
        let printer = tokio::spawn(async move {
            while let Some(command) = receiver.recv().await {
                match serde_json::to_string(&command) {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!(error = %e, "failed to encode device command"),
                }
            }
        });

        let mut runner = DeviceSetRunner::new(sender);
        if simulate {
            runner = runner.simulating(shared.clone());
        }

        let running = RunFlag::new();
        let interrupt = running.clone();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, stopping after the current block");
                interrupt.stop();
            }
        });

        let mut ctx = ExecutionContext::new(Arc::new(shared.clone()))
            .with_running(running)
            .with_runners(Arc::new(runner))
            .with_observer(Arc::new(log_active_block))
            .with_notifier(Arc::new(ConsoleNotifier))
            .with_tick_hz(config.settings.tick_hz);
        if let Some(max) = passes {
            ctx = ctx.with_max_passes(max);
        }

        let result = interpreter::execute(&program, &ctx).await;

        // dropping the context closes the command channel so the printer drains and exits
        drop(ctx);
        let _ = printer.await;
        ctrl_c.abort();
        if let Some(poller) = poller {
            poller.abort();
        }

        result.map_err(anyhow::Error::from)
    })
}
