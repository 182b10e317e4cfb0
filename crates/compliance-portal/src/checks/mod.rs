//! Background-check intake: validation, provider call, upload staging and audit trail.

pub mod audit;
pub mod domain;
pub(crate) mod intake;
pub mod provider;
pub mod router;
pub mod service;
pub mod uploads;

#[cfg(test)]
mod tests;

pub use audit::{AuditError, AuditSink, JsonlAuditLog};
pub use domain::{
    Actor, Attachment, AuditEntry, CheckId, CheckReceipt, CheckRequest, CheckStatus,
    CheckSubmission, CheckType, ProviderResult, Subject, UploadedFile,
};
pub use intake::{IntakeViolation, CONSENT_AFFIRMATIVE};
pub use provider::{
    HttpProvider, ProviderError, ProviderQuery, StubProvider, VerificationProvider,
    STUB_PROVIDER_ID,
};
pub use router::{check_router, INTERNAL_ERROR_MESSAGE};
pub use service::{CheckService, CheckServiceError};
pub use uploads::{UploadError, UploadStore};
