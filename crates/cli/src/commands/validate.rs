use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use contrata_core::{PaymentModality, QuotationDraft};
use serde::Deserialize;
use serde_json::Value;

use crate::commands::CommandResult;

#[derive(Debug, Deserialize)]
struct ValidateInput {
    modality: PaymentModality,
    draft: QuotationDraft,
}

pub fn run(path: &Path, today: Option<NaiveDate>) -> CommandResult {
    let input = match read_input(path) {
        Ok(input) => input,
        Err(error) => return CommandResult::failure("validate", "input", format!("{error:#}"), 2),
    };
    let today = today.unwrap_or_else(|| chrono::Utc::now().date_naive());

    let errors = contrata_core::validate(&input.draft, &input.modality, today);
    if !errors.is_empty() {
        let count = errors.len();
        let details = serde_json::to_value(&errors).unwrap_or(Value::Null);
        return CommandResult::failure_with_details(
            "validate",
            "validation_failed",
            format!("{count} field(s) failed validation"),
            details,
            1,
        );
    }

    match contrata_core::prepare(&input.draft, &input.modality) {
        Ok(payload) => CommandResult::success_with_details(
            "validate",
            "quotation draft is valid",
            serde_json::to_value(&payload).unwrap_or(Value::Null),
        ),
        Err(error) => CommandResult::failure("validate", "normalization", error.to_string(), 1),
    }
}

fn read_input(path: &Path) -> Result<ValidateInput> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read input file `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("could not parse input file `{}`", path.display()))
}
