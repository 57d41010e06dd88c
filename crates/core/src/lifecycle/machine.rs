use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::hiring::HiringStatus;
use crate::lifecycle::states::{HiringEvent, LifecycleAction, TransitionOutcome};

/// Authoritative transition table for a hiring.
///
/// `transition` is pure: it decides legality and follow-up actions but
/// never mutates external state. Persisting the resulting status is the
/// caller's job, as is serializing concurrent read-modify-write on the
/// same aggregate.
#[derive(Clone, Copy, Debug, Default)]
pub struct HiringLifecycle;

impl HiringLifecycle {
    pub fn initial_status(&self) -> HiringStatus {
        HiringStatus::Pending
    }

    pub fn apply(
        &self,
        current: HiringStatus,
        event: &HiringEvent,
    ) -> Result<TransitionOutcome, TransitionError> {
        transition(current, event)
    }

    pub fn can_transition(&self, current: HiringStatus, event: &HiringEvent) -> bool {
        transition(current, event).is_ok()
    }

    pub fn next_status(
        &self,
        current: HiringStatus,
        event: &HiringEvent,
    ) -> Result<HiringStatus, TransitionError> {
        transition(current, event).map(|outcome| outcome.to)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: HiringStatus,
        event: &HiringEvent,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, TransitionError>
    where
        S: AuditSink,
    {
        let result = self.apply(current, event);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::new(
                        audit.hiring_id.clone(),
                        audit.correlation_id.clone(),
                        "lifecycle.transition_applied",
                        AuditCategory::Lifecycle,
                        audit.actor.clone(),
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", outcome.from.as_token())
                    .with_metadata("to", outcome.to.as_token())
                    .with_metadata("event", format!("{:?}", outcome.event)),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        audit.hiring_id.clone(),
                        audit.correlation_id.clone(),
                        "lifecycle.transition_rejected",
                        AuditCategory::Lifecycle,
                        audit.actor.clone(),
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid transition from `{from:?}` using event {event:?}")]
    InvalidStateTransition { from: HiringStatus, event: HiringEvent },
}

fn transition(
    current: HiringStatus,
    event: &HiringEvent,
) -> Result<TransitionOutcome, TransitionError> {
    use HiringEvent as Ev;
    use HiringStatus::{
        Accepted, Approved, Cancelled, Completed, Delivered, InClaim, InProgress, Negotiating,
        PaymentPending, PaymentRejected, Pending, Quoted, Rejected, Requoting, RevisionRequested,
    };
    use LifecycleAction::{
        ReleaseFinalPayment, SettleDeliverablePayment, UnlockFirstDeliverable,
        UnlockNextDeliverable,
    };

    // Terminal statuses have zero outgoing edges, forced overrides included.
    if current.is_terminal() {
        return Err(TransitionError::InvalidStateTransition { from: current, event: event.clone() });
    }

    let (to, actions) = match (current, event) {
        // Forced overrides, legal from every non-terminal status.
        (_, Ev::ClaimOpened) => (InClaim, Vec::new()),
        (InClaim, Ev::ClaimResolved { outcome }) => (outcome.resolved_status(), Vec::new()),
        (_, Ev::ClientBanned) => (HiringStatus::TerminatedByModeration, Vec::new()),
        (_, Ev::ProviderBanned) => (HiringStatus::FinishedByModeration, Vec::new()),

        // Quotation phase.
        (Pending | Requoting | Negotiating, Ev::QuotationSubmitted) => (Quoted, Vec::new()),
        (Quoted, Ev::QuotationEditRequested) => (Requoting, Vec::new()),
        (Quoted | Requoting, Ev::NegotiationRequested) => (Negotiating, Vec::new()),
        (Quoted, Ev::QuotationAccepted) => (Accepted, Vec::new()),
        (Quoted | Negotiating, Ev::QuotationRejected) => (Rejected, Vec::new()),

        // Payment phase.
        (Accepted | PaymentRejected, Ev::PaymentInitiated) => (PaymentPending, Vec::new()),
        (PaymentPending, Ev::PaymentDeclined) => (PaymentRejected, Vec::new()),
        (PaymentPending, Ev::PaymentConfirmed) => (Approved, Vec::new()),

        // Execution phase.
        (Approved, Ev::WorkStarted) => (InProgress, vec![UnlockFirstDeliverable]),
        (InProgress | RevisionRequested, Ev::DeliverySubmitted) => (Delivered, Vec::new()),
        (Delivered, Ev::RevisionRequested) => (RevisionRequested, Vec::new()),
        (Delivered, Ev::DeliveryApproved { further_deliverables: true }) => {
            (InProgress, vec![SettleDeliverablePayment, UnlockNextDeliverable])
        }
        (Delivered, Ev::DeliveryApproved { further_deliverables: false }) => {
            (Completed, vec![ReleaseFinalPayment])
        }

        // Client cancellation, only while no work output exists.
        (
            Pending | Quoted | Requoting | Accepted | PaymentPending | Negotiating | InProgress,
            Ev::CancellationRequested,
        ) => (Cancelled, Vec::new()),

        _ => {
            return Err(TransitionError::InvalidStateTransition {
                from: current,
                event: event.clone(),
            });
        }
    };

    Ok(TransitionOutcome { from: current, to, event: event.clone(), actions })
}
