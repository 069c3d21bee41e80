//! cooperative program interpreter
//!
//! runs the first `once` container a single time, then passes over the first
//! `forever` container until the run flag is cleared, pausing one tick between
//! passes. everything happens on one logical task: the only suspension points
//! are sleep blocks, wait polling and the inter-pass tick.
//!
//! cancellation is checked before every pass, before every block in a
//! sequence and on every wait poll. a block already in flight is never cut
//! short.

mod context;
mod error;
mod runner;

use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use serde::Serialize;
use tracing::{debug, error, info};

pub use context::{
    tick_from_hz, ActiveBlockObserver, Clock, ExecutionContext, Notifier, RunFlag, TokioClock,
    TracingNotifier, DEFAULT_TICK_HZ,
};
pub use error::RunError;
pub use runner::{BlockRunnerProvider, DeviceSetRunner, RunnerError, RunnerFuture};

use crate::blocks::{Block, BlockKind, BlockProgram, BlockType, Scalar};
use crate::conditions::{evaluate, parse_condition, Condition, ConditionError};

/// what a finished run did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    /// the once container had children and its pass was started
    pub once_ran: bool,
    /// forever passes started
    pub forever_passes: u64,
    /// the run ended because the run flag was cleared
    pub cancelled: bool,
}

/// run a program to completion, cancellation or the first fatal error
///
/// the program is only read. on a fatal error the active block is cleared
/// before the error is returned.
pub async fn execute(program: &BlockProgram, ctx: &ExecutionContext) -> Result<RunSummary, RunError> {
    info!(blocks = program.len(), "program started");

    match run_program(program, ctx).await {
        Ok(summary) => {
            info!(
                once_ran = summary.once_ran,
                passes = summary.forever_passes,
                cancelled = summary.cancelled,
                "program stopped"
            );
            Ok(summary)
        }
        Err(e) => {
            ctx.notify_active(None);
            error!(block = %e.block(), error = %e, "program failed");
            Err(e)
        }
    }
}

async fn run_program(program: &BlockProgram, ctx: &ExecutionContext) -> Result<RunSummary, RunError> {
    let mut summary = RunSummary::default();

    if let Some(children) = non_empty_children(program, BlockType::Once) {
        summary.once_ran = true;
        run_blocks(children, ctx).await?;
    }

    if let Some(children) = non_empty_children(program, BlockType::Forever) {
        while ctx.is_running() {
            summary.forever_passes += 1;
            run_blocks(children, ctx).await?;

            if ctx.max_passes().is_some_and(|max| summary.forever_passes >= max) {
                debug!(passes = summary.forever_passes, "pass limit reached");
                break;
            }
            ctx.sleep(ctx.tick()).await;
        }
    }

    summary.cancelled = !ctx.is_running();
    Ok(summary)
}

fn non_empty_children(program: &BlockProgram, block_type: BlockType) -> Option<&[Block]> {
    program
        .first_of_type(block_type)
        .and_then(Block::children)
        .filter(|children| !children.is_empty())
}

/// run a sequence in order, stopping before the next block once cancelled
fn run_blocks<'a>(blocks: &'a [Block], ctx: &'a ExecutionContext) -> BoxFuture<'a, Result<(), RunError>> {
    async move {
        for block in blocks {
            if !ctx.is_running() {
                break;
            }
            ctx.notify_active(Some(&block.id));
            run_block(block, ctx).await?;
            ctx.notify_active(None);
        }
        Ok(())
    }
    .boxed()
}

async fn run_block(block: &Block, ctx: &ExecutionContext) -> Result<(), RunError> {
    if let Some(runner) = ctx.runner_for(block) {
        return runner.await.map_err(|source| RunError::Runner {
            block: block.id.clone(),
            source,
        });
    }

    match &block.kind {
        BlockKind::Sleep { value } => {
            ctx.sleep(sleep_duration(value)).await;
            Ok(())
        }
        BlockKind::Log { value } => {
            ctx.notifier().log(value);
            Ok(())
        }
        BlockKind::Alert { value } => {
            ctx.notifier().alert(value);
            Ok(())
        }
        BlockKind::Loop { count, children } => {
            if children.is_empty() {
                return Ok(());
            }
            for _ in 0..*count {
                run_blocks(children, ctx).await?;
            }
            Ok(())
        }
        BlockKind::Wait { condition } => {
            let parsed = parse(block, condition)?;
            loop {
                ctx.sleep(ctx.tick()).await;
                if check(block, &parsed, ctx)? || !ctx.is_running() {
                    return Ok(());
                }
            }
        }
        BlockKind::If {
            condition,
            children,
        } => {
            let parsed = parse(block, condition)?;
            if check(block, &parsed, ctx)? {
                run_blocks(children, ctx).await?;
            }
            Ok(())
        }
        BlockKind::Once { .. }
        | BlockKind::Forever { .. }
        | BlockKind::DeviceSet { .. }
        | BlockKind::Dummy { .. } => Err(RunError::UnknownBlockType {
            block: block.id.clone(),
            block_type: block.block_type(),
        }),
    }
}

fn parse(block: &Block, condition: &str) -> Result<Condition, RunError> {
    parse_condition(condition).map_err(|source| condition_error(block, source))
}

fn check(block: &Block, condition: &Condition, ctx: &ExecutionContext) -> Result<bool, RunError> {
    evaluate(condition, &ctx.snapshot()).map_err(|source| condition_error(block, source))
}

fn condition_error(block: &Block, source: ConditionError) -> RunError {
    RunError::Condition {
        block: block.id.clone(),
        source,
    }
}

/// sleep length in milliseconds; negative or non-numeric values do not sleep
fn sleep_duration(value: &Scalar) -> Duration {
    let ms = value.as_number();
    if ms.is_nan() || ms <= 0.0 {
        return Duration::ZERO;
    }
    // float to int casts saturate
    Duration::from_nanos((ms * 1_000_000.0).round() as u64)
}
