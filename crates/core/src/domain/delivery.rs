use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::deliverable::DeliverableId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOutcome {
    Approve,
    RequestRevision,
}

/// A concrete submission of work, either against the whole hiring
/// (lump-sum modality) or against one deliverable (`deliverable_id` set,
/// deliverable-based modality only). Closed by the client's review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub content: String,
    pub attachment: Option<String>,
    pub deliverable_id: Option<DeliverableId>,
    pub submitted_at: DateTime<Utc>,
    pub review_outcome: Option<ReviewOutcome>,
    pub review_notes: Option<String>,
}
