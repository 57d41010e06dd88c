use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use contrata_core::{HiringEvent, HiringLifecycle, HiringStatus};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::commands::CommandResult;

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    start: Option<HiringStatus>,
    events: Vec<HiringEvent>,
}

/// Replay an event script against the lifecycle machine, stopping at the
/// first illegal edge.
pub fn run(path: &Path) -> CommandResult {
    let script = match read_input(path) {
        Ok(script) => script,
        Err(error) => return CommandResult::failure("simulate", "input", format!("{error:#}"), 2),
    };

    let machine = HiringLifecycle;
    let mut status = script.start.unwrap_or_else(|| machine.initial_status());
    let mut steps: Vec<Value> = Vec::new();

    for event in &script.events {
        match machine.apply(status, event) {
            Ok(outcome) => {
                steps.push(json!({
                    "from": outcome.from,
                    "event": event,
                    "to": outcome.to,
                    "actions": outcome.actions,
                }));
                status = outcome.to;
            }
            Err(error) => {
                return CommandResult::failure_with_details(
                    "simulate",
                    "invalid_transition",
                    error.to_string(),
                    json!({ "applied_steps": steps, "stopped_at": status }),
                    1,
                );
            }
        }
    }

    CommandResult::success_with_details(
        "simulate",
        format!("replayed {} event(s)", script.events.len()),
        json!({ "final_status": status, "steps": steps }),
    )
}

fn read_input(path: &Path) -> Result<Script> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read script file `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("could not parse script file `{}`", path.display()))
}
