use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::quoting::ErrorMap;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Raw per-deliverable form input, as submitted alongside a quotation
/// under the deliverable-based modality.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliverableDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_delivery_date: Option<String>,
    pub price: Option<String>,
}

/// Validate one deliverable draft. Dates are compared at midnight
/// granularity: delivery estimated for `today` is valid, yesterday is not.
pub fn validate_deliverable(draft: &DeliverableDraft, today: NaiveDate) -> ErrorMap {
    let mut errors = ErrorMap::new();

    match draft.title.as_deref().map(str::trim) {
        None | Some("") => errors.insert("title", "a title is required"),
        Some(title) if title.chars().count() > TITLE_MAX_CHARS => {
            errors.insert("title", format!("title must be {TITLE_MAX_CHARS} characters or fewer"));
        }
        Some(_) => {}
    }

    match draft.description.as_deref().map(str::trim) {
        None | Some("") => errors.insert("description", "a description is required"),
        Some(description) if description.chars().count() > DESCRIPTION_MAX_CHARS => {
            errors.insert(
                "description",
                format!("description must be {DESCRIPTION_MAX_CHARS} characters or fewer"),
            );
        }
        Some(_) => {}
    }

    match draft.estimated_delivery_date.as_deref().map(str::trim) {
        None | Some("") => {
            errors.insert("estimated_delivery_date", "an estimated delivery date is required");
        }
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) if date < today => {
                errors.insert(
                    "estimated_delivery_date",
                    "the estimated delivery date must not be in the past",
                );
            }
            Ok(_) => {}
            Err(_) => {
                errors.insert(
                    "estimated_delivery_date",
                    "the estimated delivery date must use the YYYY-MM-DD format",
                );
            }
        },
    }

    match draft.price.as_deref().map(str::trim) {
        None | Some("") => errors.insert("price", "a price is required"),
        Some(raw) => match raw.parse::<Decimal>() {
            Ok(price) if price <= Decimal::ZERO => {
                errors.insert("price", "the price must be greater than zero");
            }
            Ok(_) => {}
            Err(_) => errors.insert("price", "the price must be a number"),
        },
    }

    errors
}
