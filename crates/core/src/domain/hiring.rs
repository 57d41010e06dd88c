use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::deliverable::Deliverable;
use crate::domain::delivery::Delivery;
use crate::domain::modality::ModalityId;
use crate::domain::quotation::Quotation;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HiringId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(pub String);

/// Lifecycle status of a hiring. The serialized tokens are wire-exact and
/// shared with the external aggregate store; renaming a variant is a
/// breaking protocol change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiringStatus {
    Pending,
    Quoted,
    Requoting,
    Accepted,
    PaymentPending,
    PaymentRejected,
    Approved,
    Rejected,
    Cancelled,
    Negotiating,
    InProgress,
    InClaim,
    Delivered,
    RevisionRequested,
    Completed,
    CancelledByClaim,
    CompletedByClaim,
    CompletedWithAgreement,
    TerminatedByModeration,
    FinishedByModeration,
}

impl HiringStatus {
    /// Terminal statuses accept no further events, forced overrides included.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Rejected
                | Self::Cancelled
                | Self::Completed
                | Self::CancelledByClaim
                | Self::CompletedByClaim
                | Self::CompletedWithAgreement
                | Self::TerminatedByModeration
                | Self::FinishedByModeration
        )
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Quoted => "quoted",
            Self::Requoting => "requoting",
            Self::Accepted => "accepted",
            Self::PaymentPending => "payment_pending",
            Self::PaymentRejected => "payment_rejected",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Negotiating => "negotiating",
            Self::InProgress => "in_progress",
            Self::InClaim => "in_claim",
            Self::Delivered => "delivered",
            Self::RevisionRequested => "revision_requested",
            Self::Completed => "completed",
            Self::CancelledByClaim => "cancelled_by_claim",
            Self::CompletedByClaim => "completed_by_claim",
            Self::CompletedWithAgreement => "completed_with_agreement",
            Self::TerminatedByModeration => "terminated_by_moderation",
            Self::FinishedByModeration => "finished_by_moderation",
        }
    }
}

/// Aggregate root for one client's request to engage a provider's service.
///
/// The aggregate is never physically deleted; reaching a terminal status is
/// the only form of destruction. `claim_ref` and `moderation_flags` are
/// opaque back-references used to trigger forced transitions and are never
/// interpreted here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceHiring {
    pub id: HiringId,
    pub status: HiringStatus,
    pub service_id: ServiceId,
    pub client_id: ClientId,
    pub provider_id: ProviderId,
    pub title: String,
    pub description: String,
    pub payment_modality_id: Option<ModalityId>,
    pub quotation: Option<Quotation>,
    pub deliverables: Vec<Deliverable>,
    pub deliveries: Vec<Delivery>,
    pub claim_ref: Option<String>,
    pub moderation_flags: Vec<String>,
    pub created_at: DateTime<Utc>,
}
