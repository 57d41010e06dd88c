use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::deliverable::{Deliverable, DeliverableId, DeliverableStatus};
use crate::domain::modality::PaymentModality;

/// Percentage split of a lump-sum price between the upfront and the
/// completion payment. Both parts are positive and sum to exactly 100.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSplit {
    pub initial_pct: Decimal,
    pub final_pct: Decimal,
}

/// Branch-specific contract of a payment modality after validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "branch", rename_all = "snake_case")]
pub enum ResolvedModality {
    LumpSum { split: PaymentSplit },
    PerDeliverable,
}

impl ResolvedModality {
    pub fn is_lump_sum(&self) -> bool {
        matches!(self, Self::LumpSum { .. })
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModalityError {
    #[error("payment percentages must both be positive, got {initial}% and {final_pct}%")]
    NonPositivePercentage { initial: Decimal, final_pct: Decimal },
    #[error("payment percentages must sum to 100, got {sum}%")]
    SplitMismatch { sum: Decimal },
}

/// Interpret a modality descriptor, validating the lump-sum percentage
/// split. Deliverable-based modalities carry no percentages.
pub fn resolve(modality: &PaymentModality) -> Result<ResolvedModality, ModalityError> {
    match modality {
        PaymentModality::FullPayment {
            initial_payment_percentage,
            final_payment_percentage,
        } => {
            let initial = *initial_payment_percentage;
            let final_pct = *final_payment_percentage;
            if initial <= Decimal::ZERO || final_pct <= Decimal::ZERO {
                return Err(ModalityError::NonPositivePercentage { initial, final_pct });
            }
            let sum = initial + final_pct;
            if sum != Decimal::ONE_HUNDRED {
                return Err(ModalityError::SplitMismatch { sum });
            }
            Ok(ResolvedModality::LumpSum { split: PaymentSplit { initial_pct: initial, final_pct } })
        }
        PaymentModality::ByDeliverables => Ok(ResolvedModality::PerDeliverable),
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SequencingError {
    #[error("deliverable `{id}` does not exist on this hiring")]
    UnknownDeliverable { id: String },
    #[error("deliverable {index} is still locked; its predecessor must be approved first")]
    StillLocked { index: u32 },
    #[error("deliverable {index} was already approved")]
    AlreadyApproved { index: u32 },
    #[error("deliverable {index} is awaiting review of its current delivery")]
    AwaitingReview { index: u32 },
    #[error("deliverable {index} has no delivery to review")]
    NothingToReview { index: u32 },
}

/// Result of approving a deliverable: either the successor unlocked, or
/// every deliverable is approved and the hiring can complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceAdvance {
    Unlocked { next_index: u32 },
    Complete,
}

/// Unlock the deliverable with the lowest sequence index. Called when the
/// hiring enters `in_progress`; a no-op when nothing is locked.
pub fn unlock_first(deliverables: &mut [Deliverable]) -> Option<DeliverableId> {
    let first = deliverables
        .iter_mut()
        .filter(|deliverable| deliverable.status == DeliverableStatus::Locked)
        .min_by_key(|deliverable| deliverable.sequence_index)?;
    first.status = DeliverableStatus::Unlocked;
    Some(first.id.clone())
}

/// The deliverable currently open for work or review, if any. The
/// sequencing rule keeps at most one deliverable outside `locked` /
/// `approved` at a time.
pub fn active_deliverable(deliverables: &[Deliverable]) -> Option<&Deliverable> {
    deliverables
        .iter()
        .filter(|deliverable| {
            matches!(
                deliverable.status,
                DeliverableStatus::Unlocked
                    | DeliverableStatus::Delivered
                    | DeliverableStatus::RevisionRequested
            )
        })
        .min_by_key(|deliverable| deliverable.sequence_index)
}

/// Check that a delivery may be submitted against `target`: only the
/// currently unlocked deliverable (or one sent back for revision) accepts
/// work. Deliverables unlock strictly in sequence order.
pub fn ensure_accepts_delivery(
    deliverables: &[Deliverable],
    target: &DeliverableId,
) -> Result<(), SequencingError> {
    let deliverable = find(deliverables, target)?;
    match deliverable.status {
        DeliverableStatus::Unlocked | DeliverableStatus::RevisionRequested => Ok(()),
        DeliverableStatus::Locked => {
            Err(SequencingError::StillLocked { index: deliverable.sequence_index })
        }
        DeliverableStatus::Approved => {
            Err(SequencingError::AlreadyApproved { index: deliverable.sequence_index })
        }
        DeliverableStatus::Delivered => {
            Err(SequencingError::AwaitingReview { index: deliverable.sequence_index })
        }
    }
}

/// Mark `target` as delivered. Fails under the same rules as
/// [`ensure_accepts_delivery`].
pub fn mark_delivered(
    deliverables: &mut [Deliverable],
    target: &DeliverableId,
) -> Result<(), SequencingError> {
    ensure_accepts_delivery(deliverables, target)?;
    let deliverable = find_mut(deliverables, target)?;
    deliverable.status = DeliverableStatus::Delivered;
    Ok(())
}

/// Approve the delivered `target` and unlock its successor, the
/// deliverable with the next-lowest locked sequence index.
pub fn approve_delivered(
    deliverables: &mut [Deliverable],
    target: &DeliverableId,
) -> Result<SequenceAdvance, SequencingError> {
    let deliverable = find_mut(deliverables, target)?;
    ensure_reviewable(deliverable)?;
    deliverable.status = DeliverableStatus::Approved;

    match unlock_first(deliverables) {
        Some(next_id) => {
            let next = find(deliverables, &next_id)?;
            Ok(SequenceAdvance::Unlocked { next_index: next.sequence_index })
        }
        None => Ok(SequenceAdvance::Complete),
    }
}

/// Check that `target` holds a delivery awaiting review, without
/// touching any state.
pub fn ensure_reviewable_delivered(
    deliverables: &[Deliverable],
    target: &DeliverableId,
) -> Result<(), SequencingError> {
    let deliverable = find(deliverables, target)?;
    ensure_reviewable(deliverable)
}

/// Send the delivered `target` back for another iteration.
pub fn request_revision(
    deliverables: &mut [Deliverable],
    target: &DeliverableId,
) -> Result<(), SequencingError> {
    let deliverable = find_mut(deliverables, target)?;
    ensure_reviewable(deliverable)?;
    deliverable.status = DeliverableStatus::RevisionRequested;
    Ok(())
}

fn ensure_reviewable(deliverable: &Deliverable) -> Result<(), SequencingError> {
    match deliverable.status {
        DeliverableStatus::Delivered => Ok(()),
        DeliverableStatus::Approved => {
            Err(SequencingError::AlreadyApproved { index: deliverable.sequence_index })
        }
        _ => Err(SequencingError::NothingToReview { index: deliverable.sequence_index }),
    }
}

fn find<'a>(
    deliverables: &'a [Deliverable],
    target: &DeliverableId,
) -> Result<&'a Deliverable, SequencingError> {
    deliverables
        .iter()
        .find(|deliverable| &deliverable.id == target)
        .ok_or_else(|| SequencingError::UnknownDeliverable { id: target.0.clone() })
}

fn find_mut<'a>(
    deliverables: &'a mut [Deliverable],
    target: &DeliverableId,
) -> Result<&'a mut Deliverable, SequencingError> {
    deliverables
        .iter_mut()
        .find(|deliverable| &deliverable.id == target)
        .ok_or_else(|| SequencingError::UnknownDeliverable { id: target.0.clone() })
}
