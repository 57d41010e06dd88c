use thiserror::Error;

use crate::lifecycle::TransitionError;
use crate::payments::{ModalityError, SequencingError};

/// Failure reported by the external collaborator, classified from its
/// message. The core trusts the report and only decides which transition,
/// if any, it authorizes; it never re-verifies the underlying state.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CollaboratorFailure {
    #[error("collaborator rejected the transition: {detail}")]
    InvalidStateTransition { detail: String },
    #[error("provider has no payment account configured")]
    MissingPaymentAccount,
    #[error("the counterparty was banned or suspended")]
    CounterpartyBanned,
    #[error("unclassified collaborator failure: {detail}")]
    Unknown { detail: String },
}

/// Pattern-match a collaborator error message into its failure class.
pub fn classify_collaborator_failure(report: &str) -> CollaboratorFailure {
    let normalized = report.trim().to_ascii_lowercase();

    if normalized.contains("payment account") || normalized.contains("payout") {
        return CollaboratorFailure::MissingPaymentAccount;
    }
    if normalized.contains("banned") || normalized.contains("suspended") {
        return CollaboratorFailure::CounterpartyBanned;
    }
    if normalized.contains("invalid state") || normalized.contains("invalid transition") {
        return CollaboratorFailure::InvalidStateTransition { detail: report.trim().to_owned() };
    }

    CollaboratorFailure::Unknown { detail: report.trim().to_owned() }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Sequencing(#[from] SequencingError),
    #[error(transparent)]
    Modality(#[from] ModalityError),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorFailure),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => Self::BadRequest {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Collaborator(CollaboratorFailure::Unknown { detail }) => {
                Self::ServiceUnavailable { message: detail, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Collaborator(failure) => Self::BadRequest {
                message: failure.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{
        classify_collaborator_failure, ApplicationError, CollaboratorFailure, DomainError,
        InterfaceError,
    };

    #[test]
    fn classifies_missing_payment_account_reports() {
        assert_eq!(
            classify_collaborator_failure("Provider has no payment account on file"),
            CollaboratorFailure::MissingPaymentAccount
        );
        assert_eq!(
            classify_collaborator_failure("payout destination missing"),
            CollaboratorFailure::MissingPaymentAccount
        );
    }

    #[test]
    fn classifies_banned_counterparty_reports() {
        assert_eq!(
            classify_collaborator_failure("user was BANNED by moderation"),
            CollaboratorFailure::CounterpartyBanned
        );
        assert_eq!(
            classify_collaborator_failure("account suspended pending review"),
            CollaboratorFailure::CounterpartyBanned
        );
    }

    #[test]
    fn classifies_transition_rejections_and_unknowns() {
        assert_eq!(
            classify_collaborator_failure("Invalid state transition: quoted -> completed"),
            CollaboratorFailure::InvalidStateTransition {
                detail: "Invalid state transition: quoted -> completed".to_owned(),
            }
        );
        assert_eq!(
            classify_collaborator_failure("  upstream timeout  "),
            CollaboratorFailure::Unknown { detail: "upstream timeout".to_owned() }
        );
    }

    #[test]
    fn domain_error_maps_to_bad_request_interface_error() {
        let interface = ApplicationError::from(DomainError::InvariantViolation(
            "quotation missing".to_owned(),
        ))
        .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn unknown_collaborator_failure_maps_to_service_unavailable() {
        let interface = ApplicationError::Collaborator(CollaboratorFailure::Unknown {
            detail: "upstream timeout".to_owned(),
        })
        .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface =
            ApplicationError::Configuration("invalid api token".to_owned()).into_interface("req-3");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }
}
