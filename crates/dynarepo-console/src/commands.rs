use dynarepo_core::{ConditionSet, Projection};

use crate::error::ConsoleError;

/// A parsed console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Plan a condition set and show the assembled store request.
    Plan {
        conditions: ConditionSet,
        projection: Projection,
    },
    /// Show the loaded key schema.
    Schema,
    /// Show the active planner configuration.
    Config,
    Help,
    Exit,
}

/// Parse one input line.
///
/// `PLAN {json}` and `COUNT {json}` take a condition set document; a line
/// starting with `{` is shorthand for `PLAN`.
pub fn parse(input: &str) -> Result<Command, ConsoleError> {
    let input = input.trim();
    if input.starts_with('{') {
        return plan(input, Projection::Items);
    }

    let (keyword, rest) = match input.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (input, ""),
    };
    match keyword.to_ascii_uppercase().as_str() {
        "PLAN" => plan(rest, Projection::Items),
        "COUNT" => plan(rest, Projection::Count),
        "SCHEMA" => Ok(Command::Schema),
        "CONFIG" => Ok(Command::Config),
        "HELP" => Ok(Command::Help),
        "EXIT" | "QUIT" => Ok(Command::Exit),
        "" => Err(ConsoleError::Parse("empty command".to_string())),
        other => Err(ConsoleError::Parse(format!("unknown command: {other}"))),
    }
}

fn plan(document: &str, projection: Projection) -> Result<Command, ConsoleError> {
    if document.is_empty() {
        return Err(ConsoleError::Parse(
            "expected a condition set document".to_string(),
        ));
    }
    let conditions: ConditionSet = serde_json::from_str(document)?;
    Ok(Command::Plan {
        conditions,
        projection,
    })
}
