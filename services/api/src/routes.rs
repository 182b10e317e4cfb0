use axum::extract::DefaultBodyLimit;
use axum::Router;
use compliance_portal::checks::{check_router, AuditSink, CheckService, VerificationProvider};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Check routes wrapped with the request-size cap and HTTP tracing.
pub(crate) fn with_check_routes<P, A>(
    service: Arc<CheckService<P, A>>,
    upload_limit_bytes: usize,
) -> Router
where
    P: VerificationProvider + 'static,
    A: AuditSink + 'static,
{
    check_router(service)
        .layer(DefaultBodyLimit::max(upload_limit_bytes))
        .layer(TraceLayer::new_for_http())
}
