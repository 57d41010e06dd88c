use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use contrata_core::vigency::{self, DaysLeft, VigencyInput};
use serde::Deserialize;
use serde_json::json;

use crate::commands::CommandResult;

#[derive(Debug, Deserialize)]
struct VigencyFile {
    quoted_at: Option<NaiveDate>,
    validity_days: Option<u32>,
    #[serde(default)]
    is_business_days: bool,
    #[serde(default)]
    expired: bool,
}

pub fn run(path: &Path, today: Option<NaiveDate>) -> CommandResult {
    let record = match read_input(path) {
        Ok(record) => record,
        Err(error) => return CommandResult::failure("vigency", "input", format!("{error:#}"), 2),
    };
    let today = today.unwrap_or_else(|| chrono::Utc::now().date_naive());

    let input = VigencyInput {
        quoted_at: record.quoted_at,
        validity_days: record.validity_days,
        is_business_days: record.is_business_days,
        expired: record.expired,
    };

    let status = vigency::vigency_status(&input, today);
    let days = match vigency::days_left(&input, today) {
        DaysLeft::Days(days) => json!(days),
        DaysLeft::NotAvailable => json!(null),
    };
    let expires_on = vigency::expiration_date(&input)
        .map(|date| json!(date.format("%Y-%m-%d").to_string()))
        .unwrap_or(json!(null));

    CommandResult::success_with_details(
        "vigency",
        status.label.clone(),
        json!({
            "days_left": days,
            "expires_on": expires_on,
            "severity": status.severity,
            "label": status.label,
        }),
    )
}

fn read_input(path: &Path) -> Result<VigencyFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read input file `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("could not parse input file `{}`", path.display()))
}
