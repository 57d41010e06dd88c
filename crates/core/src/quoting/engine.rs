use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::modality::PaymentModality;
use crate::domain::quotation::TimeUnit;
use crate::errors::DomainError;
use crate::quoting::deliverable::{validate_deliverable, DeliverableDraft};
use crate::quoting::ErrorMap;

pub const NOTES_MAX_CHARS: usize = 1000;

/// Raw quotation form input. Numeric fields arrive as loose strings and
/// are only parsed by [`prepare`]; which branch-specific fields matter is
/// decided by the modality, not by the draft.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotationDraft {
    pub modality_id: Option<String>,
    pub quoted_price: Option<String>,
    pub estimated_duration: Option<String>,
    pub estimated_time_unit: Option<String>,
    pub validity_days: Option<String>,
    pub is_business_days: Option<bool>,
    pub hours_per_day: Option<String>,
    pub work_on_business_days_only: Option<bool>,
    pub notes: Option<String>,
    pub deliverables: Vec<DeliverableDraft>,
}

/// Modality-independent quotation terms, normalized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationTerms {
    pub estimated_duration: u32,
    pub estimated_time_unit: TimeUnit,
    pub validity_days: u32,
    pub is_business_days: bool,
    pub hours_per_day: Option<u32>,
    pub work_on_business_days_only: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverablePayload {
    pub sequence_index: u32,
    pub title: String,
    pub description: String,
    pub estimated_delivery_date: NaiveDate,
    pub price: Decimal,
}

/// Normalized quotation submission, discriminated by modality. Exactly
/// one branch carries pricing data: a lump-sum price, or the per-item
/// prices of the deliverable sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "modality", rename_all = "snake_case")]
pub enum QuotationPayload {
    FullPayment { quoted_price: Decimal, terms: QuotationTerms },
    ByDeliverables { deliverables: Vec<DeliverablePayload>, terms: QuotationTerms },
}

impl QuotationPayload {
    pub fn terms(&self) -> &QuotationTerms {
        match self {
            Self::FullPayment { terms, .. } | Self::ByDeliverables { terms, .. } => terms,
        }
    }
}

/// Validate a quotation draft against its modality. Returns a field-keyed
/// error map; an empty map means the draft is ready for [`prepare`].
pub fn validate(
    draft: &QuotationDraft,
    modality: &PaymentModality,
    today: NaiveDate,
) -> ErrorMap {
    let mut errors = ErrorMap::new();

    if is_blank(&draft.modality_id) {
        errors.insert("payment_modality", "a payment modality must be selected");
    }

    check_positive_int(&mut errors, "estimated_duration", &draft.estimated_duration);

    match draft.estimated_time_unit.as_deref().map(str::trim) {
        None | Some("") => errors.insert("estimated_time_unit", "a time unit is required"),
        Some(raw) => {
            if TimeUnit::parse_token(raw).is_none() {
                errors.insert(
                    "estimated_time_unit",
                    "the time unit must be one of hours, days, weeks or months",
                );
            }
        }
    }

    check_positive_int(&mut errors, "validity_days", &draft.validity_days);

    if let Some(notes) = draft.notes.as_deref() {
        if notes.trim().chars().count() > NOTES_MAX_CHARS {
            errors.insert("notes", format!("notes must be {NOTES_MAX_CHARS} characters or fewer"));
        }
    }

    if let Some(raw) = draft.hours_per_day.as_deref() {
        if !raw.trim().is_empty() && parse_positive_int(raw).is_none() {
            errors.insert("hours_per_day", "hours per day must be a whole number of at least 1");
        }
    }

    match modality {
        PaymentModality::FullPayment { .. } => {
            match draft.quoted_price.as_deref().map(str::trim) {
                None | Some("") => errors.insert("quoted_price", "a quoted price is required"),
                Some(raw) => match raw.parse::<Decimal>() {
                    Ok(price) if price <= Decimal::ZERO => {
                        errors.insert("quoted_price", "the quoted price must be greater than zero");
                    }
                    Ok(_) => {}
                    Err(_) => errors.insert("quoted_price", "the quoted price must be a number"),
                },
            }
        }
        PaymentModality::ByDeliverables => {
            if draft.deliverables.is_empty() {
                errors.insert("deliverables", "at least one deliverable is required");
            }
            for (index, item) in draft.deliverables.iter().enumerate() {
                errors.merge_prefixed(
                    &format!("deliverables[{index}]"),
                    validate_deliverable(item, today),
                );
            }
        }
    }

    errors
}

/// Normalize a validated draft into its typed, branch-specific payload.
///
/// Must only be called once [`validate`] returned an empty map; this
/// performs no field validation of its own and fails only on the
/// contract violation of receiving an unvalidated draft. Fields the
/// modality makes irrelevant are dropped.
pub fn prepare(
    draft: &QuotationDraft,
    modality: &PaymentModality,
) -> Result<QuotationPayload, DomainError> {
    let terms = QuotationTerms {
        estimated_duration: require_int(&draft.estimated_duration, "estimated_duration")?,
        estimated_time_unit: draft
            .estimated_time_unit
            .as_deref()
            .and_then(TimeUnit::parse_token)
            .ok_or_else(|| unvalidated("estimated_time_unit"))?,
        validity_days: require_int(&draft.validity_days, "validity_days")?,
        is_business_days: draft.is_business_days.unwrap_or(false),
        hours_per_day: match draft.hours_per_day.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_positive_int(raw).ok_or_else(|| unvalidated("hours_per_day"))?),
        },
        work_on_business_days_only: draft.work_on_business_days_only,
        notes: draft
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(str::to_owned),
    };

    match modality {
        PaymentModality::FullPayment { .. } => {
            let quoted_price = draft
                .quoted_price
                .as_deref()
                .map(str::trim)
                .and_then(|raw| raw.parse::<Decimal>().ok())
                .filter(|price| *price > Decimal::ZERO)
                .ok_or_else(|| unvalidated("quoted_price"))?;
            Ok(QuotationPayload::FullPayment { quoted_price, terms })
        }
        PaymentModality::ByDeliverables => {
            let mut deliverables = Vec::with_capacity(draft.deliverables.len());
            for (index, item) in draft.deliverables.iter().enumerate() {
                deliverables.push(DeliverablePayload {
                    sequence_index: index as u32 + 1,
                    title: require_trimmed(&item.title, "title")?,
                    description: require_trimmed(&item.description, "description")?,
                    estimated_delivery_date: item
                        .estimated_delivery_date
                        .as_deref()
                        .map(str::trim)
                        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
                        .ok_or_else(|| unvalidated("estimated_delivery_date"))?,
                    price: item
                        .price
                        .as_deref()
                        .map(str::trim)
                        .and_then(|raw| raw.parse::<Decimal>().ok())
                        .ok_or_else(|| unvalidated("price"))?,
                });
            }
            if deliverables.is_empty() {
                return Err(unvalidated("deliverables"));
            }
            Ok(QuotationPayload::ByDeliverables { deliverables, terms })
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |raw| raw.trim().is_empty())
}

fn parse_positive_int(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|value| *value >= 1)
}

fn check_positive_int(errors: &mut ErrorMap, field: &str, value: &Option<String>) {
    match value.as_deref().map(str::trim) {
        None | Some("") => {
            errors.insert(field, format!("{} is required", field.replace('_', " ")));
        }
        Some(raw) => {
            if parse_positive_int(raw).is_none() {
                errors.insert(
                    field,
                    format!("{} must be a whole number of at least 1", field.replace('_', " ")),
                );
            }
        }
    }
}

fn require_int(value: &Option<String>, field: &str) -> Result<u32, DomainError> {
    value.as_deref().and_then(parse_positive_int).ok_or_else(|| unvalidated(field))
}

fn require_trimmed(value: &Option<String>, field: &str) -> Result<String, DomainError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| unvalidated(field))
}

fn unvalidated(field: &str) -> DomainError {
    DomainError::InvariantViolation(format!(
        "prepare called before validation passed: `{field}` is not usable"
    ))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::domain::modality::PaymentModality;
    use crate::domain::quotation::TimeUnit;
    use crate::errors::DomainError;
    use crate::quoting::deliverable::DeliverableDraft;

    use super::{prepare, validate, QuotationDraft, QuotationPayload};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).expect("valid test date")
    }

    fn lump_sum_modality() -> PaymentModality {
        PaymentModality::FullPayment {
            initial_payment_percentage: Decimal::new(50, 0),
            final_payment_percentage: Decimal::new(50, 0),
        }
    }

    fn lump_sum_draft() -> QuotationDraft {
        QuotationDraft {
            modality_id: Some("m-full".to_owned()),
            quoted_price: Some("1200.50".to_owned()),
            estimated_duration: Some("3".to_owned()),
            estimated_time_unit: Some("weeks".to_owned()),
            validity_days: Some("10".to_owned()),
            is_business_days: Some(true),
            notes: Some("  includes two review rounds  ".to_owned()),
            ..QuotationDraft::default()
        }
    }

    fn deliverable_draft() -> DeliverableDraft {
        DeliverableDraft {
            title: Some("Discovery".to_owned()),
            description: Some("Interviews and findings report".to_owned()),
            estimated_delivery_date: Some("2026-08-21".to_owned()),
            price: Some("400".to_owned()),
        }
    }

    fn by_deliverables_draft() -> QuotationDraft {
        QuotationDraft {
            modality_id: Some("m-deliv".to_owned()),
            estimated_duration: Some("6".to_owned()),
            estimated_time_unit: Some("weeks".to_owned()),
            validity_days: Some("5".to_owned()),
            deliverables: vec![
                deliverable_draft(),
                DeliverableDraft {
                    title: Some("Implementation".to_owned()),
                    description: Some("Build and hand off".to_owned()),
                    estimated_delivery_date: Some("2026-09-18".to_owned()),
                    price: Some("900".to_owned()),
                },
            ],
            ..QuotationDraft::default()
        }
    }

    #[test]
    fn accepts_a_complete_lump_sum_draft() {
        let errors = validate(&lump_sum_draft(), &lump_sum_modality(), today());
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn accepts_a_complete_deliverable_draft() {
        let errors = validate(&by_deliverables_draft(), &PaymentModality::ByDeliverables, today());
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn always_checks_the_shared_fields() {
        let draft = QuotationDraft {
            estimated_duration: Some("0".to_owned()),
            estimated_time_unit: Some("sprints".to_owned()),
            validity_days: Some("1.5".to_owned()),
            notes: Some("n".repeat(1001)),
            quoted_price: Some("100".to_owned()),
            ..QuotationDraft::default()
        };
        let errors = validate(&draft, &lump_sum_modality(), today());

        assert_eq!(
            errors.get("payment_modality"),
            Some("a payment modality must be selected")
        );
        assert_eq!(
            errors.get("estimated_duration"),
            Some("estimated duration must be a whole number of at least 1")
        );
        assert_eq!(
            errors.get("estimated_time_unit"),
            Some("the time unit must be one of hours, days, weeks or months")
        );
        assert_eq!(
            errors.get("validity_days"),
            Some("validity days must be a whole number of at least 1")
        );
        assert_eq!(errors.get("notes"), Some("notes must be 1000 characters or fewer"));
    }

    #[test]
    fn lump_sum_branch_requires_a_positive_price() {
        let draft = QuotationDraft { quoted_price: None, ..lump_sum_draft() };
        let errors = validate(&draft, &lump_sum_modality(), today());
        assert_eq!(errors.get("quoted_price"), Some("a quoted price is required"));

        let draft = QuotationDraft { quoted_price: Some("-10".to_owned()), ..lump_sum_draft() };
        let errors = validate(&draft, &lump_sum_modality(), today());
        assert_eq!(
            errors.get("quoted_price"),
            Some("the quoted price must be greater than zero")
        );

        let draft = QuotationDraft { quoted_price: Some("abc".to_owned()), ..lump_sum_draft() };
        let errors = validate(&draft, &lump_sum_modality(), today());
        assert_eq!(errors.get("quoted_price"), Some("the quoted price must be a number"));
    }

    #[test]
    fn deliverable_branch_requires_items_and_namespaces_their_errors() {
        let draft = QuotationDraft { deliverables: Vec::new(), ..by_deliverables_draft() };
        let errors = validate(&draft, &PaymentModality::ByDeliverables, today());
        assert_eq!(errors.get("deliverables"), Some("at least one deliverable is required"));

        let draft = QuotationDraft {
            deliverables: vec![
                deliverable_draft(),
                DeliverableDraft { title: None, price: Some("0".to_owned()), ..deliverable_draft() },
            ],
            ..by_deliverables_draft()
        };
        let errors = validate(&draft, &PaymentModality::ByDeliverables, today());
        assert_eq!(errors.get("deliverables[1].title"), Some("a title is required"));
        assert_eq!(
            errors.get("deliverables[1].price"),
            Some("the price must be greater than zero")
        );
        assert!(errors.get("deliverables[0].title").is_none());
    }

    #[test]
    fn deliverable_branch_ignores_the_quoted_price() {
        let draft = QuotationDraft {
            quoted_price: Some("not a number".to_owned()),
            ..by_deliverables_draft()
        };
        let errors = validate(&draft, &PaymentModality::ByDeliverables, today());
        assert!(errors.is_empty(), "quoted_price is irrelevant here: {errors:?}");
    }

    #[test]
    fn prepare_normalizes_the_lump_sum_branch() {
        let draft = QuotationDraft {
            // Stray deliverables are dropped under the lump-sum modality.
            deliverables: vec![DeliverableDraft::default()],
            ..lump_sum_draft()
        };
        let payload = prepare(&draft, &lump_sum_modality()).expect("validated draft");

        let QuotationPayload::FullPayment { quoted_price, terms } = payload else {
            panic!("expected the lump-sum branch");
        };
        assert_eq!(quoted_price, Decimal::new(120_050, 2));
        assert_eq!(terms.estimated_duration, 3);
        assert_eq!(terms.estimated_time_unit, TimeUnit::Weeks);
        assert_eq!(terms.validity_days, 10);
        assert!(terms.is_business_days);
        assert_eq!(terms.notes.as_deref(), Some("includes two review rounds"));
    }

    #[test]
    fn prepare_normalizes_the_deliverable_branch() {
        let draft = QuotationDraft {
            // A stray price is dropped under the deliverable-based modality.
            quoted_price: Some("9999".to_owned()),
            ..by_deliverables_draft()
        };
        let payload = prepare(&draft, &PaymentModality::ByDeliverables).expect("validated draft");

        let QuotationPayload::ByDeliverables { deliverables, terms } = payload else {
            panic!("expected the deliverable branch");
        };
        assert_eq!(deliverables.len(), 2);
        assert_eq!(deliverables[0].sequence_index, 1);
        assert_eq!(deliverables[1].sequence_index, 2);
        assert_eq!(deliverables[0].title, "Discovery");
        assert_eq!(deliverables[1].price, Decimal::new(900, 0));
        assert!(!terms.is_business_days);
    }

    #[test]
    fn prepare_refuses_an_unvalidated_draft() {
        let error = prepare(&QuotationDraft::default(), &lump_sum_modality())
            .expect_err("draft was never validated");
        assert!(matches!(error, DomainError::InvariantViolation(_)));
    }
}
