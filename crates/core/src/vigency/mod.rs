use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::quotation::Quotation;

/// Days-left threshold at or below which a still-valid quotation is
/// surfaced as a warning.
pub const WARNING_THRESHOLD_DAYS: u32 = 2;

/// Vigency view over a quotation record. Presentation layers may hold
/// partial records, so both inputs to the expiry computation are optional;
/// either one missing makes the remaining validity unknowable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VigencyInput {
    pub quoted_at: Option<NaiveDate>,
    pub validity_days: Option<u32>,
    pub is_business_days: bool,
    pub expired: bool,
}

impl From<&Quotation> for VigencyInput {
    fn from(quotation: &Quotation) -> Self {
        Self {
            quoted_at: Some(quotation.quoted_at.date_naive()),
            validity_days: Some(quotation.validity_days),
            is_business_days: quotation.is_business_days,
            expired: quotation.expired,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DaysLeft {
    Days(u32),
    NotAvailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Warning,
    Expired,
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VigencyStatus {
    pub label: String,
    pub severity: Severity,
}

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Date of the nth business day strictly after `start`. The returned
/// weekday is always Monday through Friday for `n >= 1`.
pub fn add_business_days(start: NaiveDate, n: u32) -> NaiveDate {
    let mut date = start;
    let mut remaining = n;
    while remaining > 0 {
        date += Duration::days(1);
        if is_business_day(date) {
            remaining -= 1;
        }
    }
    date
}

/// Business days in the half-open interval `[start, end)`. Zero when
/// `end <= start`.
pub fn count_business_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let mut count = 0;
    let mut date = start;
    while date < end {
        if is_business_day(date) {
            count += 1;
        }
        date += Duration::days(1);
    }
    count
}

/// Expiration date of a quotation: `quoted_at` plus the validity window,
/// counted in calendar or business days. `None` when either input is
/// absent.
pub fn expiration_date(input: &VigencyInput) -> Option<NaiveDate> {
    let quoted_at = input.quoted_at?;
    let validity_days = input.validity_days?;
    Some(if input.is_business_days {
        add_business_days(quoted_at, validity_days)
    } else {
        quoted_at + Duration::days(i64::from(validity_days))
    })
}

/// Remaining validity in days, floored at zero. Inputs are whole dates
/// (midnight granularity), so partial-day drift cannot occur. The count
/// uses the same unit the validity window was expressed in: calendar-day
/// difference, or business days via [`count_business_days`].
pub fn days_left(input: &VigencyInput, today: NaiveDate) -> DaysLeft {
    let Some(expires_on) = expiration_date(input) else {
        return DaysLeft::NotAvailable;
    };

    let remaining = if input.is_business_days {
        i64::from(count_business_days(today, expires_on))
    } else {
        (expires_on - today).num_days()
    };

    DaysLeft::Days(remaining.max(0) as u32)
}

/// A quotation is expired when its record says so explicitly, or when no
/// validity days remain. Unknown vigency is not expiry.
pub fn is_expired(input: &VigencyInput, today: NaiveDate) -> bool {
    if input.expired {
        return true;
    }
    matches!(days_left(input, today), DaysLeft::Days(0))
}

pub fn vigency_status(input: &VigencyInput, today: NaiveDate) -> VigencyStatus {
    if is_expired(input, today) {
        return VigencyStatus { label: "expired".to_owned(), severity: Severity::Expired };
    }

    match days_left(input, today) {
        DaysLeft::NotAvailable => {
            VigencyStatus { label: "N/A".to_owned(), severity: Severity::Unknown }
        }
        DaysLeft::Days(days) => {
            let unit = match (input.is_business_days, days) {
                (true, 1) => "business day",
                (true, _) => "business days",
                (false, 1) => "day",
                (false, _) => "days",
            };
            let severity =
                if days <= WARNING_THRESHOLD_DAYS { Severity::Warning } else { Severity::Normal };
            VigencyStatus { label: format!("{days} {unit} left"), severity }
        }
    }
}
