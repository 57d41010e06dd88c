use serde::{Deserialize, Serialize};

use crate::domain::hiring::HiringStatus;

/// Resolution of a claim, reported by the claims collaborator. The core
/// treats the three outcomes as opaque alternatives and never infers one
/// from another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    CancelledByClaim,
    CompletedByClaim,
    CompletedWithAgreement,
}

impl ClaimOutcome {
    pub fn resolved_status(self) -> HiringStatus {
        match self {
            Self::CancelledByClaim => HiringStatus::CancelledByClaim,
            Self::CompletedByClaim => HiringStatus::CompletedByClaim,
            Self::CompletedWithAgreement => HiringStatus::CompletedWithAgreement,
        }
    }
}

/// Discrete events a hiring reacts to. Normal-path events are guarded by
/// the current status; claim and moderation events are forced overrides
/// that bypass guards from every non-terminal status.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HiringEvent {
    /// Provider submits a quotation: from `pending`, or re-entering
    /// `quoted` out of `requoting` / `negotiating`.
    QuotationSubmitted,
    /// Provider starts editing an existing quotation before acceptance.
    QuotationEditRequested,
    /// Client proposes a changed price or delivery time.
    NegotiationRequested,
    QuotationAccepted,
    QuotationRejected,
    /// Payment initiated, first attempt or retry after a decline.
    PaymentInitiated,
    PaymentDeclined,
    PaymentConfirmed,
    WorkStarted,
    DeliverySubmitted,
    RevisionRequested,
    /// Client approves the pending delivery. `further_deliverables` is
    /// true when unapproved deliverables remain after this one, which
    /// routes the hiring back to `in_progress` instead of `completed`.
    DeliveryApproved { further_deliverables: bool },
    CancellationRequested,
    ClaimOpened,
    ClaimResolved { outcome: ClaimOutcome },
    /// Moderation banned or suspended the requesting client.
    ClientBanned,
    /// Moderation banned or suspended the providing client.
    ProviderBanned,
}

impl HiringEvent {
    /// Forced-override events take precedence over normal guard checks.
    /// They are still rejected from terminal statuses.
    pub fn is_forced_override(&self) -> bool {
        matches!(
            self,
            Self::ClaimOpened
                | Self::ClaimResolved { .. }
                | Self::ClientBanned
                | Self::ProviderBanned
        )
    }
}

/// Follow-up work a transition asks its caller to perform. The machine
/// itself never touches deliverables or payments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    UnlockFirstDeliverable,
    UnlockNextDeliverable,
    SettleDeliverablePayment,
    ReleaseFinalPayment,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: HiringStatus,
    pub to: HiringStatus,
    pub event: HiringEvent,
    pub actions: Vec<LifecycleAction>,
}
