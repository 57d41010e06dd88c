use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::audit::{AuditContext, InMemoryAuditSink};
use crate::domain::deliverable::{Deliverable, DeliverableId, DeliverableStatus};
use crate::domain::delivery::{Delivery, DeliveryId, ReviewOutcome};
use crate::domain::hiring::{
    ClientId, HiringId, HiringStatus, ProviderId, ServiceHiring, ServiceId,
};
use crate::domain::modality::{ModalityId, PaymentModality};
use crate::domain::quotation::{Quotation, QuotationId};
use crate::errors::{ApplicationError, CollaboratorFailure, DomainError};
use crate::lifecycle::{ClaimOutcome, HiringEvent, HiringLifecycle, LifecycleAction};
use crate::payments;
use crate::quoting::QuotationPayload;

pub type GatewayResult<T> = Result<T, ApplicationError>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateHiringRequest {
    pub service_id: ServiceId,
    pub client_id: ClientId,
    pub provider_id: ProviderId,
    pub title: String,
    pub description: String,
}

/// Client's decision on an outstanding quotation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum QuotationResponse {
    Accept,
    Reject,
    Cancel,
    /// Proposed changes travel as opaque notes; only the transition is
    /// modeled here.
    Negotiate { notes: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitDeliveryRequest {
    pub hiring_id: HiringId,
    pub content: String,
    pub attachment: Option<String>,
    pub deliverable_id: Option<DeliverableId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDeliveryRequest {
    pub hiring_id: HiringId,
    pub delivery_id: DeliveryId,
    pub outcome: ReviewOutcome,
    pub notes: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Initiated,
    Confirmed,
    Declined,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatusUpdate {
    pub payment_id: String,
    pub hiring_id: HiringId,
    pub status: PaymentStatus,
}

/// Claim and moderation notifications arriving from outside. Their
/// content stays opaque; the core only maps them to forced transitions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExternalEvent {
    ClaimOpened { claim_ref: String },
    ClaimResolved { outcome: ClaimOutcome },
    ClientBanned,
    ProviderBanned,
}

/// Capability interface to the external aggregate store. Transport and
/// encoding are the collaborator's concern; implementations are expected
/// to serialize read-modify-write per aggregate themselves.
#[async_trait]
pub trait HiringGateway: Send + Sync {
    async fn create_hiring(&self, request: CreateHiringRequest) -> GatewayResult<ServiceHiring>;

    /// Create or replace the quotation on a hiring. From `quoted` this is
    /// an edit and passes through `requoting`; from `negotiating` it is
    /// the provider's revised offer.
    async fn submit_quotation(
        &self,
        hiring_id: &HiringId,
        modality_id: &ModalityId,
        payload: QuotationPayload,
    ) -> GatewayResult<ServiceHiring>;

    async fn respond_to_quotation(
        &self,
        hiring_id: &HiringId,
        response: QuotationResponse,
    ) -> GatewayResult<ServiceHiring>;

    async fn start_work(&self, hiring_id: &HiringId) -> GatewayResult<ServiceHiring>;

    async fn submit_delivery(&self, request: SubmitDeliveryRequest)
        -> GatewayResult<ServiceHiring>;

    async fn review_delivery(&self, request: ReviewDeliveryRequest)
        -> GatewayResult<ServiceHiring>;

    async fn payment_callback(&self, update: PaymentStatusUpdate) -> GatewayResult<ServiceHiring>;

    async fn notify_external_event(
        &self,
        hiring_id: &HiringId,
        event: ExternalEvent,
    ) -> GatewayResult<ServiceHiring>;
}

/// Reference gateway backed by process memory. Used by tests and the
/// replay tooling; a single mutex serializes every read-modify-write so
/// the pure lifecycle machine never sees a torn aggregate.
#[derive(Clone, Default)]
pub struct InMemoryHiringGateway {
    hirings: Arc<Mutex<HashMap<String, ServiceHiring>>>,
    modalities: Arc<Mutex<HashMap<String, PaymentModality>>>,
    lifecycle: HiringLifecycle,
    audit: InMemoryAuditSink,
}

impl InMemoryHiringGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a modality descriptor, validating it first. Lump-sum
    /// splits that do not sum to 100 are rejected at the door.
    pub fn register_modality(
        &self,
        id: ModalityId,
        modality: PaymentModality,
    ) -> Result<(), ApplicationError> {
        payments::resolve(&modality).map_err(DomainError::from)?;
        lock_or_recover(&self.modalities).insert(id.0, modality);
        Ok(())
    }

    /// Snapshot of one aggregate, mainly for assertions.
    pub fn hiring(&self, id: &HiringId) -> Option<ServiceHiring> {
        lock_or_recover(&self.hirings).get(&id.0).cloned()
    }

    pub fn audit_events(&self) -> Vec<crate::audit::AuditEvent> {
        self.audit.events()
    }

    fn apply_event(
        &self,
        hiring: &mut ServiceHiring,
        event: &HiringEvent,
    ) -> Result<Vec<LifecycleAction>, ApplicationError> {
        let context =
            AuditContext::new(Some(hiring.id.clone()), Uuid::new_v4().to_string(), "gateway");
        let outcome = self
            .lifecycle
            .apply_with_audit(hiring.status, event, &self.audit, &context)
            .map_err(DomainError::from)?;
        debug!(
            hiring = %hiring.id.0,
            from = outcome.from.as_token(),
            to = outcome.to.as_token(),
            "hiring transition applied"
        );
        hiring.status = outcome.to;
        Ok(outcome.actions)
    }

    fn modality_for(&self, id: &ModalityId) -> Result<PaymentModality, ApplicationError> {
        lock_or_recover(&self.modalities).get(&id.0).cloned().ok_or_else(|| {
            ApplicationError::Collaborator(CollaboratorFailure::Unknown {
                detail: format!("payment modality `{}` is not registered", id.0),
            })
        })
    }

    fn with_hiring(
        &self,
        id: &HiringId,
        mutate: impl FnOnce(&mut ServiceHiring) -> Result<(), ApplicationError>,
    ) -> Result<ServiceHiring, ApplicationError> {
        let mut hirings = lock_or_recover(&self.hirings);
        let hiring = hirings.get_mut(&id.0).ok_or_else(|| {
            ApplicationError::Collaborator(CollaboratorFailure::Unknown {
                detail: format!("hiring `{}` not found", id.0),
            })
        })?;
        mutate(hiring)?;
        Ok(hiring.clone())
    }
}

#[async_trait]
impl HiringGateway for InMemoryHiringGateway {
    async fn create_hiring(&self, request: CreateHiringRequest) -> GatewayResult<ServiceHiring> {
        let hiring = ServiceHiring {
            id: HiringId(Uuid::new_v4().to_string()),
            status: self.lifecycle.initial_status(),
            service_id: request.service_id,
            client_id: request.client_id,
            provider_id: request.provider_id,
            title: request.title,
            description: request.description,
            payment_modality_id: None,
            quotation: None,
            deliverables: Vec::new(),
            deliveries: Vec::new(),
            claim_ref: None,
            moderation_flags: Vec::new(),
            created_at: Utc::now(),
        };
        lock_or_recover(&self.hirings).insert(hiring.id.0.clone(), hiring.clone());
        debug!(hiring = %hiring.id.0, "hiring created");
        Ok(hiring)
    }

    async fn submit_quotation(
        &self,
        hiring_id: &HiringId,
        modality_id: &ModalityId,
        payload: QuotationPayload,
    ) -> GatewayResult<ServiceHiring> {
        let modality = self.modality_for(modality_id)?;
        let branch_matches = match (&modality, &payload) {
            (PaymentModality::FullPayment { .. }, QuotationPayload::FullPayment { .. })
            | (PaymentModality::ByDeliverables, QuotationPayload::ByDeliverables { .. }) => true,
            _ => false,
        };
        if !branch_matches {
            return Err(DomainError::InvariantViolation(format!(
                "quotation payload does not match the `{}` modality",
                modality.kind_token()
            ))
            .into());
        }

        let hiring = self.with_hiring(hiring_id, |hiring| {
            if let Some(existing) = &hiring.payment_modality_id {
                if existing != modality_id {
                    return Err(DomainError::InvariantViolation(
                        "the payment modality of a hiring is immutable once set".to_owned(),
                    )
                    .into());
                }
            }

            // Editing a live quotation passes through `requoting`.
            if hiring.status == HiringStatus::Quoted {
                self.apply_event(hiring, &HiringEvent::QuotationEditRequested)?;
            }
            self.apply_event(hiring, &HiringEvent::QuotationSubmitted)?;

            let (quoted_price, deliverables, terms) = match payload {
                QuotationPayload::FullPayment { quoted_price, terms } => {
                    (Some(quoted_price), Vec::new(), terms)
                }
                QuotationPayload::ByDeliverables { deliverables, terms } => {
                    let records = deliverables
                        .into_iter()
                        .map(|item| Deliverable {
                            id: DeliverableId(Uuid::new_v4().to_string()),
                            sequence_index: item.sequence_index,
                            title: item.title,
                            description: item.description,
                            estimated_delivery_date: item.estimated_delivery_date,
                            price: item.price,
                            status: DeliverableStatus::Locked,
                        })
                        .collect();
                    (None, records, terms)
                }
            };

            // A requote replaces the prior quotation wholesale and restarts
            // its vigency window.
            hiring.payment_modality_id = Some(modality_id.clone());
            hiring.deliverables = deliverables;
            hiring.quotation = Some(Quotation {
                id: QuotationId(Uuid::new_v4().to_string()),
                quoted_price,
                estimated_duration: terms.estimated_duration,
                estimated_time_unit: terms.estimated_time_unit,
                validity_days: terms.validity_days,
                is_business_days: terms.is_business_days,
                hours_per_day: terms.hours_per_day,
                work_on_business_days_only: terms.work_on_business_days_only,
                notes: terms.notes,
                quoted_at: Utc::now(),
                expired: false,
            });
            Ok(())
        })?;
        Ok(hiring)
    }

    async fn respond_to_quotation(
        &self,
        hiring_id: &HiringId,
        response: QuotationResponse,
    ) -> GatewayResult<ServiceHiring> {
        let event = match response {
            QuotationResponse::Accept => HiringEvent::QuotationAccepted,
            QuotationResponse::Reject => HiringEvent::QuotationRejected,
            QuotationResponse::Cancel => HiringEvent::CancellationRequested,
            QuotationResponse::Negotiate { .. } => HiringEvent::NegotiationRequested,
        };
        let hiring = self.with_hiring(hiring_id, |hiring| {
            self.apply_event(hiring, &event)?;
            Ok(())
        })?;
        Ok(hiring)
    }

    async fn start_work(&self, hiring_id: &HiringId) -> GatewayResult<ServiceHiring> {
        let hiring = self.with_hiring(hiring_id, |hiring| {
            let actions = self.apply_event(hiring, &HiringEvent::WorkStarted)?;
            if actions.contains(&LifecycleAction::UnlockFirstDeliverable) {
                payments::unlock_first(&mut hiring.deliverables);
            }
            Ok(())
        })?;
        Ok(hiring)
    }

    async fn submit_delivery(
        &self,
        request: SubmitDeliveryRequest,
    ) -> GatewayResult<ServiceHiring> {
        let hiring = self.with_hiring(&request.hiring_id, |hiring| {
            let per_deliverable = !hiring.deliverables.is_empty();

            match (&request.deliverable_id, per_deliverable) {
                (Some(target), true) => {
                    payments::ensure_accepts_delivery(&hiring.deliverables, target)
                        .map_err(DomainError::from)?;
                    self.apply_event(hiring, &HiringEvent::DeliverySubmitted)?;
                    payments::mark_delivered(&mut hiring.deliverables, target)
                        .map_err(DomainError::from)?;
                }
                (None, false) => {
                    self.apply_event(hiring, &HiringEvent::DeliverySubmitted)?;
                }
                (None, true) => {
                    return Err(DomainError::InvariantViolation(
                        "a deliverable id is required under the deliverable-based modality"
                            .to_owned(),
                    )
                    .into());
                }
                (Some(_), false) => {
                    return Err(DomainError::InvariantViolation(
                        "a whole-hiring delivery cannot target a deliverable".to_owned(),
                    )
                    .into());
                }
            }

            hiring.deliveries.push(Delivery {
                id: DeliveryId(Uuid::new_v4().to_string()),
                content: request.content.clone(),
                attachment: request.attachment.clone(),
                deliverable_id: request.deliverable_id.clone(),
                submitted_at: Utc::now(),
                review_outcome: None,
                review_notes: None,
            });
            Ok(())
        })?;
        Ok(hiring)
    }

    async fn review_delivery(
        &self,
        request: ReviewDeliveryRequest,
    ) -> GatewayResult<ServiceHiring> {
        let hiring = self.with_hiring(&request.hiring_id, |hiring| {
            let delivery_index = hiring
                .deliveries
                .iter()
                .position(|delivery| delivery.id == request.delivery_id)
                .ok_or_else(|| {
                    ApplicationError::Collaborator(CollaboratorFailure::Unknown {
                        detail: format!("delivery `{}` not found", request.delivery_id.0),
                    })
                })?;
            if hiring.deliveries[delivery_index].review_outcome.is_some() {
                return Err(DomainError::InvariantViolation(
                    "this delivery was already reviewed".to_owned(),
                )
                .into());
            }
            let target = hiring.deliveries[delivery_index].deliverable_id.clone();

            match request.outcome {
                ReviewOutcome::RequestRevision => {
                    self.apply_event(hiring, &HiringEvent::RevisionRequested)?;
                    if let Some(target) = &target {
                        payments::request_revision(&mut hiring.deliverables, target)
                            .map_err(DomainError::from)?;
                    }
                }
                ReviewOutcome::Approve => {
                    let further_deliverables = match &target {
                        Some(target) => {
                            // Pre-check so the lifecycle and the sequence
                            // cannot disagree halfway through.
                            payments::ensure_reviewable_delivered(&hiring.deliverables, target)
                                .map_err(DomainError::from)?;
                            hiring
                                .deliverables
                                .iter()
                                .any(|deliverable| {
                                    deliverable.status == DeliverableStatus::Locked
                                })
                        }
                        None => false,
                    };
                    self.apply_event(
                        hiring,
                        &HiringEvent::DeliveryApproved { further_deliverables },
                    )?;
                    if let Some(target) = &target {
                        payments::approve_delivered(&mut hiring.deliverables, target)
                            .map_err(DomainError::from)?;
                    }
                }
            }

            let delivery = &mut hiring.deliveries[delivery_index];
            delivery.review_outcome = Some(request.outcome);
            delivery.review_notes = request.notes.clone();
            Ok(())
        })?;
        Ok(hiring)
    }

    async fn payment_callback(&self, update: PaymentStatusUpdate) -> GatewayResult<ServiceHiring> {
        let event = match update.status {
            PaymentStatus::Initiated => HiringEvent::PaymentInitiated,
            PaymentStatus::Confirmed => HiringEvent::PaymentConfirmed,
            PaymentStatus::Declined => HiringEvent::PaymentDeclined,
        };
        let hiring = self.with_hiring(&update.hiring_id, |hiring| {
            debug!(payment = %update.payment_id, status = ?update.status, "payment callback");
            self.apply_event(hiring, &event)?;
            Ok(())
        })?;
        Ok(hiring)
    }

    async fn notify_external_event(
        &self,
        hiring_id: &HiringId,
        event: ExternalEvent,
    ) -> GatewayResult<ServiceHiring> {
        let (lifecycle_event, claim_ref, moderation_flag) = match &event {
            ExternalEvent::ClaimOpened { claim_ref } => {
                (HiringEvent::ClaimOpened, Some(claim_ref.clone()), None)
            }
            ExternalEvent::ClaimResolved { outcome } => {
                (HiringEvent::ClaimResolved { outcome: *outcome }, None, None)
            }
            ExternalEvent::ClientBanned => {
                (HiringEvent::ClientBanned, None, Some("client_banned"))
            }
            ExternalEvent::ProviderBanned => {
                (HiringEvent::ProviderBanned, None, Some("provider_banned"))
            }
        };

        let hiring = self.with_hiring(hiring_id, |hiring| {
            self.apply_event(hiring, &lifecycle_event)?;
            if let Some(claim_ref) = claim_ref {
                hiring.claim_ref = Some(claim_ref);
            }
            if let Some(flag) = moderation_flag {
                hiring.moderation_flags.push(flag.to_owned());
            }
            Ok(())
        })?;
        Ok(hiring)
    }
}

fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::deliverable::DeliverableStatus;
    use crate::domain::delivery::ReviewOutcome;
    use crate::domain::hiring::{ClientId, HiringStatus, ProviderId, ServiceId};
    use crate::domain::modality::{ModalityId, PaymentModality};
    use crate::domain::quotation::TimeUnit;
    use crate::errors::{ApplicationError, DomainError};
    use crate::lifecycle::ClaimOutcome;
    use crate::quoting::{DeliverablePayload, QuotationPayload, QuotationTerms};

    use super::{
        CreateHiringRequest, ExternalEvent, HiringGateway, InMemoryHiringGateway, PaymentStatus,
        PaymentStatusUpdate, QuotationResponse, ReviewDeliveryRequest, SubmitDeliveryRequest,
    };

    fn terms() -> QuotationTerms {
        QuotationTerms {
            estimated_duration: 2,
            estimated_time_unit: TimeUnit::Weeks,
            validity_days: 10,
            is_business_days: false,
            hours_per_day: None,
            work_on_business_days_only: None,
            notes: None,
        }
    }

    fn lump_sum_payload() -> QuotationPayload {
        QuotationPayload::FullPayment { quoted_price: Decimal::new(50_000, 2), terms: terms() }
    }

    fn deliverable_payload(count: u32) -> QuotationPayload {
        QuotationPayload::ByDeliverables {
            deliverables: (1..=count)
                .map(|index| DeliverablePayload {
                    sequence_index: index,
                    title: format!("Milestone {index}"),
                    description: "scoped unit of work".to_owned(),
                    estimated_delivery_date: chrono::NaiveDate::from_ymd_opt(2026, 10, 1)
                        .expect("valid date"),
                    price: Decimal::new(20_000, 2),
                })
                .collect(),
            terms: terms(),
        }
    }

    fn gateway_with_modalities() -> (InMemoryHiringGateway, ModalityId, ModalityId) {
        let gateway = InMemoryHiringGateway::new();
        let full = ModalityId("m-full".to_owned());
        let per_deliverable = ModalityId("m-deliv".to_owned());
        gateway
            .register_modality(
                full.clone(),
                PaymentModality::FullPayment {
                    initial_payment_percentage: Decimal::new(50, 0),
                    final_payment_percentage: Decimal::new(50, 0),
                },
            )
            .expect("valid split");
        gateway
            .register_modality(per_deliverable.clone(), PaymentModality::ByDeliverables)
            .expect("no percentages to validate");
        (gateway, full, per_deliverable)
    }

    fn create_request() -> CreateHiringRequest {
        CreateHiringRequest {
            service_id: ServiceId("svc-1".to_owned()),
            client_id: ClientId("client-1".to_owned()),
            provider_id: ProviderId("provider-1".to_owned()),
            title: "Landing page".to_owned(),
            description: "Design and build a landing page".to_owned(),
        }
    }

    #[tokio::test]
    async fn lump_sum_hiring_runs_to_completion() {
        let (gateway, full, _) = gateway_with_modalities();
        let hiring = gateway.create_hiring(create_request()).await.expect("created");
        assert_eq!(hiring.status, HiringStatus::Pending);

        let hiring = gateway
            .submit_quotation(&hiring.id, &full, lump_sum_payload())
            .await
            .expect("quoted");
        assert_eq!(hiring.status, HiringStatus::Quoted);
        let quotation = hiring.quotation.as_ref().expect("quotation stored");
        assert_eq!(quotation.quoted_price, Some(Decimal::new(50_000, 2)));
        assert!(hiring.deliverables.is_empty());

        let hiring = gateway
            .respond_to_quotation(&hiring.id, QuotationResponse::Accept)
            .await
            .expect("accepted");
        let hiring = gateway
            .payment_callback(PaymentStatusUpdate {
                payment_id: "pay-1".to_owned(),
                hiring_id: hiring.id.clone(),
                status: PaymentStatus::Initiated,
            })
            .await
            .expect("payment pending");
        assert_eq!(hiring.status, HiringStatus::PaymentPending);

        let hiring = gateway
            .payment_callback(PaymentStatusUpdate {
                payment_id: "pay-1".to_owned(),
                hiring_id: hiring.id.clone(),
                status: PaymentStatus::Confirmed,
            })
            .await
            .expect("approved");
        let hiring = gateway.start_work(&hiring.id).await.expect("in progress");
        assert_eq!(hiring.status, HiringStatus::InProgress);

        let hiring = gateway
            .submit_delivery(SubmitDeliveryRequest {
                hiring_id: hiring.id.clone(),
                content: "final build".to_owned(),
                attachment: None,
                deliverable_id: None,
            })
            .await
            .expect("delivered");
        let delivery_id = hiring.deliveries[0].id.clone();

        let hiring = gateway
            .review_delivery(ReviewDeliveryRequest {
                hiring_id: hiring.id.clone(),
                delivery_id,
                outcome: ReviewOutcome::Approve,
                notes: None,
            })
            .await
            .expect("completed");
        assert_eq!(hiring.status, HiringStatus::Completed);
    }

    #[tokio::test]
    async fn requote_passes_through_requoting_and_replaces_the_quotation() {
        let (gateway, full, _) = gateway_with_modalities();
        let hiring = gateway.create_hiring(create_request()).await.expect("created");
        let hiring = gateway
            .submit_quotation(&hiring.id, &full, lump_sum_payload())
            .await
            .expect("quoted");
        let first_quotation_id =
            hiring.quotation.as_ref().expect("quotation stored").id.clone();

        let hiring = gateway
            .submit_quotation(
                &hiring.id,
                &full,
                QuotationPayload::FullPayment {
                    quoted_price: Decimal::new(65_000, 2),
                    terms: terms(),
                },
            )
            .await
            .expect("requoted");
        assert_eq!(hiring.status, HiringStatus::Quoted);
        let quotation = hiring.quotation.as_ref().expect("quotation replaced");
        assert_ne!(quotation.id, first_quotation_id);
        assert_eq!(quotation.quoted_price, Some(Decimal::new(65_000, 2)));
    }

    #[tokio::test]
    async fn modality_of_a_hiring_is_immutable() {
        let (gateway, full, per_deliverable) = gateway_with_modalities();
        let hiring = gateway.create_hiring(create_request()).await.expect("created");
        let hiring = gateway
            .submit_quotation(&hiring.id, &full, lump_sum_payload())
            .await
            .expect("quoted");

        let error = gateway
            .submit_quotation(&hiring.id, &per_deliverable, deliverable_payload(2))
            .await
            .expect_err("modality switch must be rejected");
        assert!(matches!(
            error,
            ApplicationError::Domain(DomainError::InvariantViolation(_))
        ));
    }

    #[tokio::test]
    async fn payload_branch_must_match_the_modality() {
        let (gateway, full, _) = gateway_with_modalities();
        let hiring = gateway.create_hiring(create_request()).await.expect("created");

        let error = gateway
            .submit_quotation(&hiring.id, &full, deliverable_payload(1))
            .await
            .expect_err("deliverables under a lump-sum modality");
        assert!(matches!(
            error,
            ApplicationError::Domain(DomainError::InvariantViolation(_))
        ));
    }

    #[tokio::test]
    async fn deliverables_unlock_in_sequence_and_gate_submissions() {
        let (gateway, _, per_deliverable) = gateway_with_modalities();
        let hiring = gateway.create_hiring(create_request()).await.expect("created");
        let hiring = gateway
            .submit_quotation(&hiring.id, &per_deliverable, deliverable_payload(2))
            .await
            .expect("quoted");
        assert!(hiring
            .deliverables
            .iter()
            .all(|deliverable| deliverable.status == DeliverableStatus::Locked));

        let hiring = gateway
            .respond_to_quotation(&hiring.id, QuotationResponse::Accept)
            .await
            .expect("accepted");
        for status in [PaymentStatus::Initiated, PaymentStatus::Confirmed] {
            gateway
                .payment_callback(PaymentStatusUpdate {
                    payment_id: "pay-1".to_owned(),
                    hiring_id: hiring.id.clone(),
                    status,
                })
                .await
                .expect("payment flow");
        }
        let hiring = gateway.start_work(&hiring.id).await.expect("in progress");
        assert_eq!(hiring.deliverables[0].status, DeliverableStatus::Unlocked);
        assert_eq!(hiring.deliverables[1].status, DeliverableStatus::Locked);

        // Submitting against the still-locked second deliverable fails.
        let second_id = hiring.deliverables[1].id.clone();
        let error = gateway
            .submit_delivery(SubmitDeliveryRequest {
                hiring_id: hiring.id.clone(),
                content: "premature".to_owned(),
                attachment: None,
                deliverable_id: Some(second_id),
            })
            .await
            .expect_err("second deliverable is locked");
        assert!(matches!(
            error,
            ApplicationError::Domain(DomainError::Sequencing(_))
        ));

        // First deliverable: deliver, approve, and the second unlocks.
        let first_id = hiring.deliverables[0].id.clone();
        let hiring = gateway
            .submit_delivery(SubmitDeliveryRequest {
                hiring_id: hiring.id.clone(),
                content: "milestone one".to_owned(),
                attachment: None,
                deliverable_id: Some(first_id),
            })
            .await
            .expect("delivered");
        assert_eq!(hiring.status, HiringStatus::Delivered);

        let delivery_id = hiring.deliveries[0].id.clone();
        let hiring = gateway
            .review_delivery(ReviewDeliveryRequest {
                hiring_id: hiring.id.clone(),
                delivery_id,
                outcome: ReviewOutcome::Approve,
                notes: None,
            })
            .await
            .expect("approved");
        assert_eq!(hiring.status, HiringStatus::InProgress);
        assert_eq!(hiring.deliverables[0].status, DeliverableStatus::Approved);
        assert_eq!(hiring.deliverables[1].status, DeliverableStatus::Unlocked);

        // Second deliverable: deliver and approve to complete the hiring.
        let second_id = hiring.deliverables[1].id.clone();
        let hiring = gateway
            .submit_delivery(SubmitDeliveryRequest {
                hiring_id: hiring.id.clone(),
                content: "milestone two".to_owned(),
                attachment: None,
                deliverable_id: Some(second_id),
            })
            .await
            .expect("delivered");
        let delivery_id = hiring.deliveries[1].id.clone();
        let hiring = gateway
            .review_delivery(ReviewDeliveryRequest {
                hiring_id: hiring.id.clone(),
                delivery_id,
                outcome: ReviewOutcome::Approve,
                notes: None,
            })
            .await
            .expect("completed");
        assert_eq!(hiring.status, HiringStatus::Completed);
    }

    #[tokio::test]
    async fn revision_requests_loop_until_approval() {
        let (gateway, full, _) = gateway_with_modalities();
        let hiring = gateway.create_hiring(create_request()).await.expect("created");
        let hiring = gateway
            .submit_quotation(&hiring.id, &full, lump_sum_payload())
            .await
            .expect("quoted");
        gateway
            .respond_to_quotation(&hiring.id, QuotationResponse::Accept)
            .await
            .expect("accepted");
        for status in [PaymentStatus::Initiated, PaymentStatus::Confirmed] {
            gateway
                .payment_callback(PaymentStatusUpdate {
                    payment_id: "pay-1".to_owned(),
                    hiring_id: hiring.id.clone(),
                    status,
                })
                .await
                .expect("payment flow");
        }
        gateway.start_work(&hiring.id).await.expect("in progress");

        let hiring = gateway
            .submit_delivery(SubmitDeliveryRequest {
                hiring_id: hiring.id.clone(),
                content: "first pass".to_owned(),
                attachment: None,
                deliverable_id: None,
            })
            .await
            .expect("delivered");
        let delivery_id = hiring.deliveries[0].id.clone();
        let hiring = gateway
            .review_delivery(ReviewDeliveryRequest {
                hiring_id: hiring.id.clone(),
                delivery_id,
                outcome: ReviewOutcome::RequestRevision,
                notes: Some("tighten the copy".to_owned()),
            })
            .await
            .expect("revision requested");
        assert_eq!(hiring.status, HiringStatus::RevisionRequested);

        let hiring = gateway
            .submit_delivery(SubmitDeliveryRequest {
                hiring_id: hiring.id.clone(),
                content: "second pass".to_owned(),
                attachment: None,
                deliverable_id: None,
            })
            .await
            .expect("redelivered");
        assert_eq!(hiring.status, HiringStatus::Delivered);
        assert_eq!(hiring.deliveries.len(), 2);
    }

    #[tokio::test]
    async fn claims_override_and_resolve_through_opaque_outcomes() {
        let (gateway, full, _) = gateway_with_modalities();
        let hiring = gateway.create_hiring(create_request()).await.expect("created");
        gateway
            .submit_quotation(&hiring.id, &full, lump_sum_payload())
            .await
            .expect("quoted");

        let updated = gateway
            .notify_external_event(
                &hiring.id,
                ExternalEvent::ClaimOpened { claim_ref: "claim-77".to_owned() },
            )
            .await
            .expect("claim opened");
        assert_eq!(updated.status, HiringStatus::InClaim);
        assert_eq!(updated.claim_ref.as_deref(), Some("claim-77"));

        let resolved = gateway
            .notify_external_event(
                &hiring.id,
                ExternalEvent::ClaimResolved {
                    outcome: ClaimOutcome::CompletedWithAgreement,
                },
            )
            .await
            .expect("claim resolved");
        assert_eq!(resolved.status, HiringStatus::CompletedWithAgreement);

        // Terminal: nothing else may touch this hiring.
        let error = gateway
            .respond_to_quotation(&hiring.id, QuotationResponse::Cancel)
            .await
            .expect_err("terminal hirings are read-only");
        assert!(matches!(
            error,
            ApplicationError::Domain(DomainError::Transition(_))
        ));
    }

    #[tokio::test]
    async fn moderation_bans_record_a_flag_and_finish_the_hiring() {
        let (gateway, full, _) = gateway_with_modalities();
        let hiring = gateway.create_hiring(create_request()).await.expect("created");
        gateway
            .submit_quotation(&hiring.id, &full, lump_sum_payload())
            .await
            .expect("quoted");

        let updated = gateway
            .notify_external_event(&hiring.id, ExternalEvent::ProviderBanned)
            .await
            .expect("provider banned");
        assert_eq!(updated.status, HiringStatus::FinishedByModeration);
        assert_eq!(updated.moderation_flags, vec!["provider_banned".to_owned()]);
    }

    #[tokio::test]
    async fn unknown_aggregates_surface_as_collaborator_failures() {
        let (gateway, _, _) = gateway_with_modalities();
        let error = gateway
            .start_work(&crate::domain::hiring::HiringId("missing".to_owned()))
            .await
            .expect_err("nothing registered under that id");
        assert!(matches!(error, ApplicationError::Collaborator(_)));
    }
}
