use axum::extract::rejection::PathRejection;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use chirp_core::ServiceError;

use crate::api::AppState;
use crate::api::middleware::Caller;

/// Routes readable without a caller token.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/users/{id}", get(get_user))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(me))
        .route("/users/{id}/follow", post(follow).delete(unfollow))
}

/// GET /api/users/me: the caller, created on first use.
async fn me(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Value>, ServiceError> {
    let user = svc.resolve_or_create(&caller.0)?;
    Ok(Json(json!({"result": "true", "user": user})))
}

async fn get_user(
    State(svc): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ServiceError> {
    let Path(id) = path?;
    let user = svc.get_user(id)?;
    Ok(Json(json!({"result": "true", "user": user})))
}

/// POST /api/users/{id}/follow: caller follows user `id`.
async fn follow(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<(StatusCode, Json<Value>), ServiceError> {
    let Path(id) = path?;
    let me = svc.find_user_by_name(&caller.0)?;
    svc.follow(me.id, id)?;
    Ok((StatusCode::CREATED, Json(json!({"result": "true"}))))
}

async fn unfollow(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ServiceError> {
    let Path(id) = path?;
    let me = svc.find_user_by_name(&caller.0)?;
    svc.unfollow(me.id, id)?;
    Ok(Json(json!({"result": "true"})))
}
