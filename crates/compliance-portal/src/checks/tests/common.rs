use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;

use crate::checks::audit::{AuditError, AuditSink};
use crate::checks::domain::{
    Actor, AuditEntry, CheckStatus, CheckSubmission, ProviderResult, UploadedFile,
};
use crate::checks::provider::{ProviderError, ProviderQuery, StubProvider, VerificationProvider};
use crate::checks::service::CheckService;
use crate::checks::uploads::UploadStore;

pub(super) const BOUNDARY: &str = "compliance-portal-boundary";

pub(super) fn actor() -> Actor {
    Actor("operator@example.com".to_string())
}

pub(super) fn valid_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Ana Silva"),
        ("cpf", "12345678900"),
        ("dob", "1990-01-01"),
        ("checkType", "criminal"),
        ("purpose", "hiring"),
        ("email", "hr@example.com"),
        ("consent", "true"),
    ]
}

pub(super) fn submission() -> CheckSubmission {
    CheckSubmission {
        name: Some("Ana Silva".to_string()),
        cpf: Some("12345678900".to_string()),
        dob: Some("1990-01-01".to_string()),
        check_type: Some("criminal".to_string()),
        purpose: Some("hiring".to_string()),
        email: Some("hr@example.com".to_string()),
        consent: Some("true".to_string()),
        file: None,
    }
}

pub(super) fn report_file() -> UploadedFile {
    UploadedFile {
        file_name: Some("relatorio.pdf".to_string()),
        content_type: Some("application/pdf".to_string()),
        bytes: b"%PDF-1.7 background report".to_vec(),
    }
}

/// Provider double that counts calls and answers with a fixed status.
pub(super) struct RecordingProvider {
    calls: AtomicUsize,
    status: CheckStatus,
}

impl Default for RecordingProvider {
    fn default() -> Self {
        Self::answering(CheckStatus::Clear)
    }
}

impl RecordingProvider {
    pub(super) fn answering(status: CheckStatus) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            status,
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VerificationProvider for RecordingProvider {
    async fn verify(&self, query: &ProviderQuery) -> Result<ProviderResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut result = StubProvider.verify(query).await?;
        result.status = self.status;
        Ok(result)
    }
}

pub(super) struct FailingProvider;

#[async_trait]
impl VerificationProvider for FailingProvider {
    async fn verify(&self, _query: &ProviderQuery) -> Result<ProviderResult, ProviderError> {
        Err(ProviderError::Status {
            status: 503,
            body: "upstream maintenance".to_string(),
        })
    }
}

#[derive(Default)]
pub(super) struct MemoryAudit {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAudit {
    pub(super) fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit mutex poisoned").clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAudit {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .expect("audit mutex poisoned")
            .push(entry.clone());
        Ok(())
    }
}

pub(super) struct FailingAudit;

#[async_trait]
impl AuditSink for FailingAudit {
    async fn append(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
        Err(AuditError::Write(std::io::Error::other(
            "no space left on device",
        )))
    }
}

pub(super) fn service_with<P, A>(
    provider: Arc<P>,
    audit: Arc<A>,
    upload_dir: &Path,
) -> CheckService<P, A>
where
    P: VerificationProvider + 'static,
    A: AuditSink + 'static,
{
    CheckService::new(provider, audit, UploadStore::new(upload_dir), actor())
}

pub(super) fn build_service(
    upload_dir: &Path,
) -> (
    CheckService<RecordingProvider, MemoryAudit>,
    Arc<RecordingProvider>,
    Arc<MemoryAudit>,
) {
    let provider = Arc::new(RecordingProvider::default());
    let audit = Arc::new(MemoryAudit::default());
    let service = service_with(provider.clone(), audit.clone(), upload_dir);
    (service, provider, audit)
}

pub(super) fn staged_files(upload_dir: &Path) -> usize {
    match std::fs::read_dir(upload_dir) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

pub(super) fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (file_name, contents) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub(super) fn run_request(fields: &[(&str, &str)], files: &[(&str, &str)]) -> Request<Body> {
    Request::post("/checks/run")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields, files)))
        .expect("request builds")
}

pub(super) fn without(field: &str) -> Vec<(&'static str, &'static str)> {
    valid_fields()
        .into_iter()
        .filter(|(name, _)| *name != field)
        .collect()
}

pub(super) fn with_value(field: &str, value: &'static str) -> Vec<(&'static str, &'static str)> {
    valid_fields()
        .into_iter()
        .map(|(name, current)| if name == field { (name, value) } else { (name, current) })
        .collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&body).expect("body is json")
}
