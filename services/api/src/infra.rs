use async_trait::async_trait;
use compliance_portal::checks::{
    CheckService, HttpProvider, JsonlAuditLog, ProviderError, ProviderQuery, ProviderResult,
    StubProvider, UploadStore, VerificationProvider,
};
use compliance_portal::config::{AppConfig, ProviderKind};
use compliance_portal::error::AppError;
use std::sync::Arc;

pub(crate) type PortalService = CheckService<ConfiguredProvider, JsonlAuditLog>;

/// Provider chosen at startup from `COMPLIANCE_PROVIDER`.
#[derive(Debug)]
pub(crate) enum ConfiguredProvider {
    Stub(StubProvider),
    Http(HttpProvider),
}

impl ConfiguredProvider {
    pub(crate) fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let provider = &config.provider;
        match (provider.kind, provider.endpoint.as_deref()) {
            (ProviderKind::Http, Some(endpoint)) => Ok(Self::Http(HttpProvider::new(
                endpoint,
                provider.api_key.clone(),
                provider.timeout,
            )?)),
            (ProviderKind::Http, None) => Err(ProviderError::Transport(
                "no provider endpoint configured".to_string(),
            )),
            (ProviderKind::Stub, _) => Ok(Self::Stub(StubProvider)),
        }
    }

    pub(crate) fn label(&self) -> &str {
        match self {
            Self::Stub(_) => "stub",
            Self::Http(provider) => provider.endpoint(),
        }
    }
}

#[async_trait]
impl VerificationProvider for ConfiguredProvider {
    async fn verify(&self, query: &ProviderQuery) -> Result<ProviderResult, ProviderError> {
        match self {
            Self::Stub(provider) => provider.verify(query).await,
            Self::Http(provider) => provider.verify(query).await,
        }
    }
}

pub(crate) async fn build_check_service(config: &AppConfig) -> Result<PortalService, AppError> {
    let provider = ConfiguredProvider::from_config(config)?;
    tracing::info!(provider = provider.label(), "verification provider configured");

    let audit = JsonlAuditLog::open(&config.intake.audit_log_path).await?;
    tracing::info!(audit_log = %audit.path().display(), "audit log opened");
    let uploads = UploadStore::new(&config.intake.upload_dir);

    Ok(CheckService::new(
        Arc::new(provider),
        Arc::new(audit),
        uploads,
        config.intake.actor.clone(),
    ))
}
