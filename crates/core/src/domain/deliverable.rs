use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliverableId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableStatus {
    Locked,
    Unlocked,
    Delivered,
    RevisionRequested,
    Approved,
}

/// One independently priced unit of work under the deliverable-based
/// modality.
///
/// `sequence_index` is stored explicitly rather than inferred from array
/// position, so reordering a collection cannot silently change unlock
/// semantics. Deliverables are created atomically with the quotation and
/// never added afterward.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deliverable {
    pub id: DeliverableId,
    pub sequence_index: u32,
    pub title: String,
    pub description: String,
    pub estimated_delivery_date: NaiveDate,
    pub price: Decimal,
    pub status: DeliverableStatus,
}
