use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::audit::{AuditError, AuditSink};
use super::domain::{
    Actor, Attachment, AuditEntry, CheckId, CheckReceipt, CheckRequest, CheckSubmission,
};
use super::intake::{IntakeGuard, IntakeViolation};
use super::provider::{ProviderError, ProviderQuery, VerificationProvider};
use super::uploads::{UploadError, UploadStore};

/// Service composing intake validation, the provider, upload staging and the audit trail.
pub struct CheckService<P, A> {
    guard: IntakeGuard,
    provider: Arc<P>,
    audit: Arc<A>,
    uploads: UploadStore,
    actor: Actor,
}

impl<P, A> CheckService<P, A>
where
    P: VerificationProvider + 'static,
    A: AuditSink + 'static,
{
    pub fn new(provider: Arc<P>, audit: Arc<A>, uploads: UploadStore, actor: Actor) -> Self {
        Self {
            guard: IntakeGuard,
            provider,
            audit,
            uploads,
            actor,
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Validate a submission, consult the provider and record the outcome.
    ///
    /// Nothing is staged, sent or written unless validation passes. The audit
    /// append happens before the receipt is returned; if it fails the provider
    /// call is not undone.
    pub async fn run(&self, submission: CheckSubmission) -> Result<CheckReceipt, CheckServiceError> {
        let request = self
            .guard
            .request_from_submission(submission)
            .inspect_err(|violation| match violation {
                IntakeViolation::MissingFields(fields) => {
                    warn!(?fields, "check rejected: missing fields")
                }
                other => warn!(reason = %other, "check rejected"),
            })?;

        let check_id = CheckId::generate();
        let timestamp = Utc::now();
        info!(%check_id, check_type = %request.check_type, "check accepted");

        let attachment = match &request.file {
            Some(file) => Some(self.uploads.stage(file).await?),
            None => None,
        };

        match self
            .verify_and_record(check_id, timestamp, &request, attachment.clone())
            .await
        {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                error!(%check_id, error = %err, "check failed");
                if let Some(attachment) = &attachment {
                    self.uploads.discard(attachment).await;
                }
                Err(err)
            }
        }
    }

    async fn verify_and_record(
        &self,
        check_id: CheckId,
        timestamp: DateTime<Utc>,
        request: &CheckRequest,
        attachment: Option<Attachment>,
    ) -> Result<CheckReceipt, CheckServiceError> {
        let query = ProviderQuery {
            subject: request.subject.clone(),
            check_type: request.check_type,
        };
        let result = self.provider.verify(&query).await?;

        let entry = AuditEntry {
            check_id,
            timestamp,
            actor: self.actor.clone(),
            purpose: request.purpose.clone(),
            email: request.email.clone(),
            check_type: request.check_type,
            subject: request.subject.clone(),
            attachment,
            result_status: result.status,
        };
        self.audit.append(&entry).await?;

        info!(%check_id, status = result.status.label(), "check recorded");

        Ok(CheckReceipt {
            check_id,
            timestamp,
            actor: self.actor.clone(),
            result,
        })
    }
}

/// Error raised by the check service.
#[derive(Debug, thiserror::Error)]
pub enum CheckServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}

impl CheckServiceError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Intake(_))
    }
}
