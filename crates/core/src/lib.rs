pub mod audit;
pub mod collab;
pub mod config;
pub mod domain;
pub mod errors;
pub mod lifecycle;
pub mod payments;
pub mod quoting;
pub mod vigency;

pub use collab::{
    CreateHiringRequest, ExternalEvent, GatewayResult, HiringGateway, InMemoryHiringGateway,
    PaymentStatus, PaymentStatusUpdate, QuotationResponse, ReviewDeliveryRequest,
    SubmitDeliveryRequest,
};
pub use domain::deliverable::{Deliverable, DeliverableId, DeliverableStatus};
pub use domain::delivery::{Delivery, DeliveryId, ReviewOutcome};
pub use domain::hiring::{
    ClientId, HiringId, HiringStatus, ProviderId, ServiceHiring, ServiceId,
};
pub use domain::modality::{ModalityId, PaymentModality};
pub use domain::quotation::{Quotation, QuotationId, TimeUnit};
pub use errors::{
    classify_collaborator_failure, ApplicationError, CollaboratorFailure, DomainError,
    InterfaceError,
};
pub use lifecycle::{
    ClaimOutcome, HiringEvent, HiringLifecycle, LifecycleAction, TransitionError,
    TransitionOutcome,
};
pub use payments::{
    ModalityError, PaymentSplit, ResolvedModality, SequenceAdvance, SequencingError,
};
pub use quoting::{
    prepare, validate, DeliverableDraft, DeliverablePayload, ErrorMap, QuotationDraft,
    QuotationPayload, QuotationTerms,
};
pub use vigency::{DaysLeft, Severity, VigencyInput, VigencyStatus};
