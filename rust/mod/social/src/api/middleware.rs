use std::sync::Arc;

use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use chirp_core::Authenticator;

/// The caller's identity token, set by [`identify_caller`].
#[derive(Debug, Clone)]
pub struct Caller(pub String);

/// Identity middleware for the protected routes.
///
/// Rejects requests without a caller token with 401. Otherwise stores the
/// token as an extension for handlers to read via `Extension<Caller>`.
pub async fn identify_caller(
    State(auth): State<Arc<dyn Authenticator>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match auth.identify(req.headers()) {
        Ok(token) => {
            req.extensions_mut().insert(Caller(token));
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("rejected {} {}: {}", req.method(), req.uri().path(), e);
            e.into_response()
        }
    }
}
