use std::sync::Arc;

use axum::{
    extract::{multipart::{MultipartError, MultipartRejection}, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use super::audit::AuditSink;
use super::domain::{CheckSubmission, UploadedFile};
use super::provider::VerificationProvider;
use super::service::CheckService;

/// Message returned with every 500 response; the diagnostic goes in `details`.
pub const INTERNAL_ERROR_MESSAGE: &str = "Erro interno";

const FILE_FIELD: &str = "file";

/// Router exposing check intake and the health check, open to any origin.
pub fn check_router<P, A>(service: Arc<CheckService<P, A>>) -> Router
where
    P: VerificationProvider + 'static,
    A: AuditSink + 'static,
{
    Router::new()
        .route("/checks/run", post(run_check_handler::<P, A>))
        .route("/health", get(health_handler))
        .with_state(service)
        .layer(CorsLayer::permissive())
}

pub(crate) async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

pub(crate) async fn run_check_handler<P, A>(
    State(service): State<Arc<CheckService<P, A>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response
where
    P: VerificationProvider + 'static,
    A: AuditSink + 'static,
{
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            let payload = json!({ "error": rejection.body_text() });
            return (rejection.status(), Json(payload)).into_response();
        }
    };

    let submission = match read_submission(multipart).await {
        Ok(submission) => submission,
        Err(FormError::Multipart(err)) => {
            let payload = json!({ "error": err.body_text() });
            return (err.status(), Json(payload)).into_response();
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match service.run(submission).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(err) if err.is_client_error() => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": INTERNAL_ERROR_MESSAGE,
                "details": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum FormError {
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    #[error("Apenas um arquivo é permitido por verificação.")]
    MultipleFiles,
    #[error("Campo duplicado: {0}.")]
    DuplicateField(String),
}

async fn read_submission(mut multipart: Multipart) -> Result<CheckSubmission, FormError> {
    let mut submission = CheckSubmission::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == FILE_FIELD || field.file_name().is_some() {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?.to_vec();

            // Browsers send an empty part when no file was chosen.
            if bytes.is_empty() && file_name.as_deref().unwrap_or_default().is_empty() {
                continue;
            }
            if submission.file.is_some() {
                return Err(FormError::MultipleFiles);
            }
            submission.file = Some(UploadedFile {
                file_name,
                content_type,
                bytes,
            });
            continue;
        }

        let value = field.text().await?;
        let slot = match name.as_str() {
            "name" => &mut submission.name,
            "cpf" => &mut submission.cpf,
            "dob" => &mut submission.dob,
            "checkType" => &mut submission.check_type,
            "purpose" => &mut submission.purpose,
            "email" => &mut submission.email,
            "consent" => &mut submission.consent,
            _ => continue,
        };
        if slot.is_some() {
            return Err(FormError::DuplicateField(name));
        }
        *slot = Some(value);
    }

    Ok(submission)
}
