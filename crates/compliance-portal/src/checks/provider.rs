use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{CheckStatus, CheckType, ProviderResult, Subject};

/// Provider identifier reported by the stub and used as a fallback for HTTP payloads.
pub const STUB_PROVIDER_ID: &str = "AUTHORIZED_PROVIDER";

const STUB_NOTES: &str = "Resultado retornado pelo provedor autorizado (mock).";

/// Subject and category forwarded to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderQuery {
    pub subject: Subject,
    pub check_type: CheckType,
}

/// Outbound verification capability, injected into the check service.
#[async_trait]
pub trait VerificationProvider: Send + Sync {
    async fn verify(&self, query: &ProviderQuery) -> Result<ProviderResult, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),
    #[error("provider transport failure: {0}")]
    Transport(String),
    #[error("provider responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider returned a malformed payload: {0}")]
    Malformed(String),
}

/// Deterministic provider that reports every subject as clear.
#[derive(Debug, Clone, Default)]
pub struct StubProvider;

#[async_trait]
impl VerificationProvider for StubProvider {
    async fn verify(&self, query: &ProviderQuery) -> Result<ProviderResult, ProviderError> {
        Ok(ProviderResult {
            provider: STUB_PROVIDER_ID.to_string(),
            check_type: query.check_type,
            subject: query.subject.clone(),
            status: CheckStatus::Clear,
            notes: STUB_NOTES.to_string(),
            link: None,
        })
    }
}

/// JSON-over-HTTP adapter for an authorized verification provider.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ProviderRequestBody<'a> {
    name: &'a str,
    cpf: &'a str,
    dob: NaiveDate,
    #[serde(rename = "checkType")]
    check_type: CheckType,
}

#[derive(Debug, Deserialize)]
struct ProviderResponseBody {
    #[serde(default)]
    provider: Option<String>,
    status: CheckStatus,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    link: Option<String>,
}

impl HttpProvider {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ProviderError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl VerificationProvider for HttpProvider {
    async fn verify(&self, query: &ProviderQuery) -> Result<ProviderResult, ProviderError> {
        let body = ProviderRequestBody {
            name: &query.subject.name,
            cpf: &query.subject.cpf,
            dob: query.subject.dob,
            check_type: query.check_type,
        };

        let mut request = self.client.post(self.endpoint.as_str()).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| self.map_transport(err))?;
        let status = response.status();
        debug!(endpoint = %self.endpoint, status = status.as_u16(), "provider responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.map_transport(err))?;
        let payload: ProviderResponseBody = serde_json::from_slice(&bytes)
            .map_err(|err| ProviderError::Malformed(err.to_string()))?;

        Ok(ProviderResult {
            provider: payload
                .provider
                .unwrap_or_else(|| STUB_PROVIDER_ID.to_string()),
            check_type: query.check_type,
            subject: query.subject.clone(),
            status: payload.status,
            notes: payload.notes,
            link: payload.link,
        })
    }
}
