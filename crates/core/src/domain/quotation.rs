use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuotationId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Hours,
    Days,
    Weeks,
    Months,
}

impl TimeUnit {
    pub fn parse_token(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hours" => Some(Self::Hours),
            "days" => Some(Self::Days),
            "weeks" => Some(Self::Weeks),
            "months" => Some(Self::Months),
            _ => None,
        }
    }
}

/// The provider's priced proposal for a hiring, under one payment modality.
///
/// `quoted_price` is populated only under the lump-sum modality; under the
/// deliverable-based modality the hiring's deliverables carry the prices
/// and `quoted_price` stays `None`. Exactly one of the two branches holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: QuotationId,
    pub quoted_price: Option<Decimal>,
    pub estimated_duration: u32,
    pub estimated_time_unit: TimeUnit,
    pub validity_days: u32,
    pub is_business_days: bool,
    pub hours_per_day: Option<u32>,
    pub work_on_business_days_only: Option<bool>,
    pub notes: Option<String>,
    pub quoted_at: DateTime<Utc>,
    pub expired: bool,
}
