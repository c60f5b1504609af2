use dynarepo_core::{
    AccessPlan, AttributeCondition, Condition, KeySchema, KeySchemaProvider, PlannerConfig,
    StoreRequest,
};
use serde_json::json;

use crate::executor::CommandResult;

/// Output mode for rendering command results.
pub enum OutputMode {
    /// Human-readable pretty-printed output.
    Pretty,
    /// Machine-parseable JSON (one JSON object per result on stdout).
    Json,
}

/// Render a command result to stdout in the given mode.
///
/// Returns `true` to continue execution, `false` to signal exit.
pub fn render(result: &CommandResult, mode: &OutputMode) -> bool {
    match result {
        CommandResult::Plan { plan, request } => match mode {
            OutputMode::Pretty => print_plan(plan, request),
            OutputMode::Json => println!("{}", json!({"plan": plan, "request": request})),
        },
        CommandResult::Schema(schema) => match mode {
            OutputMode::Pretty => print_schema(schema),
            OutputMode::Json => println!("{}", json!({"schema": schema})),
        },
        CommandResult::Config(config) => match mode {
            OutputMode::Pretty => print_config(config),
            OutputMode::Json => println!("{}", json!({"config": config})),
        },
        CommandResult::Help => match mode {
            OutputMode::Pretty => print_help(),
            OutputMode::Json => println!("{}", json!({"help": HELP_TEXT})),
        },
        CommandResult::Exit => return false,
    }
    true
}

/// Render an error in the given mode: JSON on stdout, text on stderr.
pub fn render_error(err: &dyn std::fmt::Display, mode: &OutputMode) {
    match mode {
        OutputMode::Pretty => print_error(err),
        OutputMode::Json => println!("{}", json!({"error": err.to_string()})),
    }
}

/// Print an error message to stderr.
pub fn print_error(err: &dyn std::fmt::Display) {
    eprintln!("Error: {err}");
}

pub fn print_plan(plan: &AccessPlan, request: &StoreRequest) {
    match plan {
        AccessPlan::Load {
            hash_value,
            range_value,
        } => {
            println!("Plan: LOAD");
            println!("  Hash value:  {hash_value}");
            if let Some(range) = range_value {
                println!("  Range value: {range}");
            }
        }
        AccessPlan::Query(query) => {
            println!(
                "Plan: QUERY on {}",
                query.index_name.as_deref().unwrap_or("primary key")
            );
            println!("  Hash:   {}", format_condition(&query.hash_condition));
            if let Some(range) = &query.range_condition {
                println!("  Range:  {}", format_condition(range));
            }
            for filter in &query.filter_conditions {
                println!("  Filter: {}", format_condition(filter));
            }
        }
        AccessPlan::Scan(scan) => {
            println!("Plan: SCAN");
            for filter in &scan.filter_conditions {
                println!("  Filter: {}", format_condition(filter));
            }
        }
    }

    match request {
        StoreRequest::Load(load) => {
            println!("Request: load {}", load.hash_key.attribute);
        }
        StoreRequest::Query(query) => {
            println!(
                "Request: query {}{} ({}, select {:?})",
                query.hash_key.attribute,
                query
                    .range_key
                    .as_ref()
                    .map(|r| format!(" + {}", format_attribute_condition(r)))
                    .unwrap_or_default(),
                if query.scan_index_forward { "ascending" } else { "descending" },
                query.select,
            );
        }
        StoreRequest::Scan(scan) => {
            println!(
                "Request: scan with {} filter(s) (select {:?})",
                scan.filter.len(),
                scan.select
            );
        }
    }
}

pub fn print_schema(schema: &KeySchema) {
    println!("Hash key:  {}", schema.hash_key_property());
    println!(
        "Range key: {}",
        schema.range_key_property().unwrap_or("(none)")
    );
    if schema.indexes().is_empty() {
        println!("No indexes.");
    }
    for index in schema.indexes() {
        match &index.range_key {
            Some(range) => println!("  {} ({}, {})", index.name, index.hash_key, range),
            None => println!("  {} ({})", index.name, index.hash_key),
        }
    }
    for id in schema.composite_ids() {
        println!("Composite id: {id}");
    }
}

pub fn print_config(config: &PlannerConfig) {
    println!("scan_enabled:       {}", config.scan_enabled);
    println!("scan_count_enabled: {}", config.scan_count_enabled);
    println!("index_order:        {:?}", config.index_order);
}

fn format_condition(condition: &Condition) -> String {
    format_values(condition.property(), &condition.operator().to_string(), condition.values())
}

fn format_attribute_condition(condition: &AttributeCondition) -> String {
    format_values(&condition.attribute, condition.operator.as_str(), &condition.values)
}

fn format_values(name: &str, operator: &str, values: &[serde_json::Value]) -> String {
    let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("{name} {operator} {}", values.join(", ")).trim_end().to_string()
}

const HELP_TEXT: &str = "\
DynaRepo Console - Command Reference
====================================

  PLAN {json}       Plan a condition set and show the store request
  COUNT {json}      Same, for the count-returning path
  {json}            Shorthand for PLAN
  SCHEMA            Show the loaded key schema
  CONFIG            Show the planner configuration
  HELP              Show this help
  EXIT / QUIT       Exit the console

Condition set document:
  {\"conditions\": [{\"property\": \"name\", \"operator\": \"EQ\", \"values\": [\"Alice\"]}],
   \"sort\": {\"property\": \"joinYear\", \"direction\": \"DESC\"},
   \"limit\": 10, \"consistent_read\": false}

Operators:
  EQ NE IN LE LT GE GT BETWEEN NOT_NULL NULL CONTAINS NOT_CONTAINS BEGINS_WITH";

/// Print the full command reference.
pub fn print_help() {
    println!("{HELP_TEXT}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_condition() {
        let c = Condition::new(
            "age",
            dynarepo_core::Operator::Between,
            vec![json!(1), json!(9)],
        )
        .unwrap();
        assert_eq!(format_condition(&c), "age BETWEEN 1, 9");

        let c = Condition::new("notes", dynarepo_core::Operator::Null, vec![]).unwrap();
        assert_eq!(format_condition(&c), "notes NULL");
    }

    #[test]
    fn test_render_exit_stops() {
        assert!(!render(&CommandResult::Exit, &OutputMode::Json));
        assert!(render(&CommandResult::Help, &OutputMode::Json));
    }
}
