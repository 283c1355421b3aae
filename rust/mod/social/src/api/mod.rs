mod users;
mod tweets;
mod medias;
pub mod middleware;

use std::sync::Arc;

use axum::Router;

use chirp_core::Authenticator;

use crate::service::SocialService;

/// Shared application state.
pub type AppState = Arc<SocialService>;

/// Build the social API router.
///
/// Routes are relative; the caller nests them under `/api`. User lookup
/// by id and the media endpoints are public, everything else requires a
/// caller token.
pub fn build_router(svc: Arc<SocialService>, auth: Arc<dyn Authenticator>) -> Router {
    let protected = Router::new()
        .merge(users::routes())
        .merge(tweets::routes())
        .route_layer(axum::middleware::from_fn_with_state(
            auth,
            middleware::identify_caller,
        ));

    Router::new()
        .merge(users::public_routes())
        .merge(medias::routes())
        .merge(protected)
        .with_state(svc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use chirp_core::ApiKeyHeader;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::service::testing::test_service;

    fn app() -> (Router, tempfile::TempDir) {
        let (svc, dir) = test_service();
        let router = Router::new().nest(
            "/api",
            build_router(svc, Arc::new(ApiKeyHeader::default())),
        );
        (router, dir)
    }

    fn request(method: Method, uri: &str, caller: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(caller) = caller {
            builder = builder.header("api-key", caller);
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn upload_request(filename: &str, data: &[u8]) -> Request<Body> {
        let boundary = "chirp-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
                 Content-Type: image/jpeg\r\n\r\n",
                b = boundary,
                f = filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/api/medias")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn follow_like_and_read_feed() {
        let (app, _dir) = app();

        let (status, body) = call(&app, request(Method::GET, "/api/users/me", Some("user001"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"result": "true", "user": {"id": 1, "name": "user001", "followers": [], "following": []}})
        );

        let (status, body) = call(
            &app,
            request(
                Method::POST,
                "/api/tweets",
                Some("user001"),
                Some(json!({"tweet_data": "message", "tweet_media_ids": []})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"result": "true", "tweet_id": 1}));

        let (_, body) = call(&app, request(Method::GET, "/api/users/me", Some("kate"), None)).await;
        assert_eq!(body["user"]["id"], 2);

        let (status, body) = call(&app, request(Method::POST, "/api/users/1/follow", Some("kate"), None)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"result": "true"}));

        let (status, _) = call(&app, request(Method::POST, "/api/tweets/1/likes", Some("kate"), None)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(&app, request(Method::GET, "/api/tweets", Some("kate"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "result": "true",
                "tweets": [{
                    "id": 1,
                    "content": "message",
                    "attachments": [],
                    "author": {"id": 1, "name": "user001"},
                    "likes": [{"user_id": 2, "name": "kate"}],
                }]
            })
        );

        // Public lookup shows both sides of the edge.
        let (_, body) = call(&app, request(Method::GET, "/api/users/1", None, None)).await;
        assert_eq!(body["user"]["followers"], json!([{"id": 2, "name": "kate"}]));

        let (status, _) = call(&app, request(Method::DELETE, "/api/tweets/1/likes", Some("kate"), None)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, request(Method::DELETE, "/api/users/1/follow", Some("kate"), None)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(&app, request(Method::GET, "/api/users/2", None, None)).await;
        assert_eq!(body["user"]["following"], json!([]));
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let (app, _dir) = app();

        for (method, uri) in [
            (Method::GET, "/api/users/me"),
            (Method::GET, "/api/tweets"),
            (Method::POST, "/api/users/1/follow"),
            (Method::DELETE, "/api/tweets/1"),
        ] {
            let (status, body) = call(&app, request(method, uri, None, None)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
            assert_eq!(body["result"], "false");
            assert_eq!(body["error_type"], "Unauthenticated");
        }
    }

    #[tokio::test]
    async fn missing_entities_answer_null() {
        let (app, _dir) = app();

        let (status, body) = call(&app, request(Method::GET, "/api/users/42", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);

        call(&app, request(Method::GET, "/api/users/me", Some("kate"), None)).await;

        let (status, body) = call(&app, request(Method::POST, "/api/tweets/9/likes", Some("kate"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);

        let (status, body) = call(&app, request(Method::POST, "/api/users/9/follow", Some("kate"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn unknown_caller_is_not_created_outside_me() {
        let (app, _dir) = app();
        call(&app, request(Method::GET, "/api/users/me", Some("user001"), None)).await;

        let (status, body) = call(
            &app,
            request(
                Method::POST,
                "/api/tweets",
                Some("stranger"),
                Some(json!({"tweet_data": "hello"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);

        for (method, uri) in [
            (Method::POST, "/api/users/1/follow"),
            (Method::DELETE, "/api/users/1/follow"),
            (Method::GET, "/api/tweets"),
            (Method::POST, "/api/tweets/1/likes"),
            (Method::DELETE, "/api/tweets/1/likes"),
            (Method::DELETE, "/api/tweets/1"),
        ] {
            let (status, body) = call(&app, request(method, uri, Some("ghost"), None)).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert_eq!(body, Value::Null, "{}", uri);
        }

        // Neither caller got a user row, and no tweet was stored.
        let (_, body) = call(&app, request(Method::GET, "/api/users/2", None, None)).await;
        assert_eq!(body, Value::Null);
        let (_, body) = call(&app, request(Method::GET, "/api/users/1", None, None)).await;
        assert_eq!(body["user"]["followers"], json!([]));
        let (_, body) = call(&app, request(Method::GET, "/api/tweets", Some("user001"), None)).await;
        assert_eq!(body["tweets"], json!([]));
    }

    #[tokio::test]
    async fn malformed_requests_use_the_error_shape() {
        let (app, _dir) = app();
        call(&app, request(Method::GET, "/api/users/me", Some("user001"), None)).await;

        let (status, body) = call(&app, request(Method::GET, "/api/users/abc", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["result"], "false");
        assert_eq!(body["error_type"], "ValidationError");

        let (status, body) = call(&app, request(Method::POST, "/api/users/abc/follow", Some("user001"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_type"], "ValidationError");

        let (status, body) = call(
            &app,
            request(
                Method::POST,
                "/api/tweets",
                Some("user001"),
                Some(json!({"tweet_media_ids": []})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["result"], "false");
        assert_eq!(body["error_type"], "ValidationError");

        let (status, body) = call(&app, request(Method::GET, "/api/medias/x", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_type"], "ValidationError");
    }

    #[tokio::test]
    async fn domain_errors_are_structured_400s() {
        let (app, _dir) = app();
        call(&app, request(Method::GET, "/api/users/me", Some("author"), None)).await;
        call(
            &app,
            request(
                Method::POST,
                "/api/tweets",
                Some("author"),
                Some(json!({"tweet_data": "mine"})),
            ),
        )
        .await;
        call(&app, request(Method::GET, "/api/users/me", Some("other"), None)).await;

        let (status, body) = call(&app, request(Method::DELETE, "/api/tweets/1", Some("other"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "result": "false",
                "error_type": "TweetIndexError",
                "error_message": "user has no tweet with this id",
            })
        );

        let (status, body) = call(&app, request(Method::DELETE, "/api/users/1/follow", Some("other"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_type"], "EntryNotPresent");

        let (status, body) = call(&app, request(Method::DELETE, "/api/tweets/1/likes", Some("other"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_type"], "EntryNotPresent");

        let (status, body) = call(&app, request(Method::DELETE, "/api/tweets/1", Some("author"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"result": "true"}));
    }

    #[tokio::test]
    async fn upload_attach_fetch_and_delete_media() {
        let (app, _dir) = app();

        let (status, body) = call(&app, upload_request("image_test.jpg", b"\xff\xd8jpeg")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"result": "true", "media_id": 1}));

        let resp = app
            .clone()
            .oneshot(request(Method::GET, "/api/medias/1", None, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/octet-stream");
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"\xff\xd8jpeg");

        call(&app, request(Method::GET, "/api/users/me", Some("user001"), None)).await;
        call(
            &app,
            request(
                Method::POST,
                "/api/tweets",
                Some("user001"),
                Some(json!({"tweet_data": "pic", "tweet_media_ids": [1]})),
            ),
        )
        .await;
        let (_, body) = call(&app, request(Method::GET, "/api/tweets", Some("user001"), None)).await;
        assert_eq!(body["tweets"][0]["attachments"], json!(["/api/medias/1"]));

        call(&app, request(Method::DELETE, "/api/tweets/1", Some("user001"), None)).await;

        let resp = app
            .clone()
            .oneshot(request(Method::GET, "/api/medias/1", None, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(header::CONTENT_TYPE).is_none());
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn upload_without_file_field_is_rejected() {
        let (app, _dir) = app();
        let boundary = "b";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--{b}--\r\n",
            b = boundary
        );
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/medias")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, body) = call(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_type"], "ValidationError");
    }
}
