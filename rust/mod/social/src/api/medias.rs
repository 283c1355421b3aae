use axum::extract::rejection::PathRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use chirp_core::ServiceError;

use crate::api::AppState;

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/medias",
            post(upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/medias/{id}", get(fetch))
}

/// POST /api/medias: multipart upload, file in field `file`.
async fn upload(
    State(svc): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ServiceError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::Validation(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Validation("file field has no file name".into()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| ServiceError::Validation(e.body_text()))?;

        let media_id = svc.store_media(&data, &filename)?;
        return Ok((
            StatusCode::CREATED,
            Json(json!({"result": "true", "media_id": media_id})),
        ));
    }
    Err(ServiceError::Validation("missing multipart field `file`".into()))
}

/// GET /api/medias/{id}: raw bytes, or an empty 200 if there are none.
async fn fetch(
    State(svc): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, ServiceError> {
    let Path(id) = path?;
    match svc.fetch_media(id)? {
        Some(data) => Ok((
            [(header::CONTENT_TYPE, "application/octet-stream")],
            data,
        )
            .into_response()),
        None => Ok(StatusCode::OK.into_response()),
    }
}
