use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use chirp_core::ServiceError;

use crate::api::AppState;
use crate::api::middleware::Caller;
use crate::model::CreateTweet;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tweets", get(feed).post(create_tweet))
        .route("/tweets/{id}", delete(delete_tweet))
        .route("/tweets/{id}/likes", post(add_like).delete(remove_like))
}

/// GET /api/tweets: the caller's feed.
async fn feed(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Value>, ServiceError> {
    let me = svc.find_user_by_name(&caller.0)?;
    let tweets = svc.compose_feed(me.id)?;
    Ok(Json(json!({"result": "true", "tweets": tweets})))
}

async fn create_tweet(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    input: Result<Json<CreateTweet>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ServiceError> {
    let Json(input) = input?;
    let me = svc.find_user_by_name(&caller.0)?;
    let tweet_id = svc.create_tweet(me.id, &input.tweet_data, &input.tweet_media_ids)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"result": "true", "tweet_id": tweet_id})),
    ))
}

/// DELETE /api/tweets/{id}: only the author may delete.
async fn delete_tweet(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ServiceError> {
    let Path(id) = path?;
    svc.delete_tweet(&caller.0, id)?;
    Ok(Json(json!({"result": "true"})))
}

async fn add_like(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<(StatusCode, Json<Value>), ServiceError> {
    let Path(id) = path?;
    let me = svc.find_user_by_name(&caller.0)?;
    svc.add_like(id, me.id)?;
    Ok((StatusCode::CREATED, Json(json!({"result": "true"}))))
}

async fn remove_like(
    State(svc): State<AppState>,
    Extension(caller): Extension<Caller>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ServiceError> {
    let Path(id) = path?;
    let me = svc.find_user_by_name(&caller.0)?;
    svc.remove_like(id, me.id)?;
    Ok(Json(json!({"result": "true"})))
}
