use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModalityId(pub String);

/// Payment structure of a hiring.
///
/// `full_payment` splits a single quoted price into an upfront and a
/// completion percentage; `by_deliverables` pays each deliverable
/// independently as it is approved and carries no percentages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentModality {
    FullPayment {
        initial_payment_percentage: Decimal,
        final_payment_percentage: Decimal,
    },
    ByDeliverables,
}

impl PaymentModality {
    pub fn kind_token(&self) -> &'static str {
        match self {
            Self::FullPayment { .. } => "full_payment",
            Self::ByDeliverables => "by_deliverables",
        }
    }
}
