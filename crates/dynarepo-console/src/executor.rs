use dynarepo_core::{
    AccessPlan, KeySchema, Planner, PlannerConfig, RequestAssembler, StoreRequest,
};
use tracing::debug;

use crate::commands::Command;
use crate::error::ConsoleError;

/// Schema and configuration the console plans against.
pub struct Context {
    pub schema: KeySchema,
    pub config: PlannerConfig,
}

/// Structured result from executing a command.
#[derive(Debug)]
pub enum CommandResult {
    /// Chosen plan and the request it assembles to (PLAN, COUNT).
    Plan {
        plan: AccessPlan,
        request: StoreRequest,
    },
    /// Loaded key schema (SCHEMA).
    Schema(KeySchema),
    /// Active planner configuration (CONFIG).
    Config(PlannerConfig),
    Help,
    Exit,
}

pub fn execute(ctx: &Context, cmd: Command) -> Result<CommandResult, ConsoleError> {
    match cmd {
        Command::Plan {
            conditions,
            projection,
        } => {
            let plan = Planner::new(&ctx.schema, &ctx.config).plan(&conditions, projection)?;
            let request =
                RequestAssembler::new(&ctx.schema).assemble(&plan, &conditions, projection);
            debug!(mode = plan.mode(), "plan command");
            Ok(CommandResult::Plan { plan, request })
        }
        Command::Schema => Ok(CommandResult::Schema(ctx.schema.clone())),
        Command::Config => Ok(CommandResult::Config(ctx.config.clone())),
        Command::Help => Ok(CommandResult::Help),
        Command::Exit => Ok(CommandResult::Exit),
    }
}
