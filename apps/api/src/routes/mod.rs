pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::applies::handlers as applies;
use crate::posts::access::require_dashboard_access;
use crate::posts::handlers as posts;
use crate::screening::handlers as screening;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Gate runs only on matched dashboard routes, before the handler.
    let dashboard = Router::new()
        .route(
            "/dashboard/:dashboard",
            get(posts::handle_get_dashboard).delete(posts::handle_delete_dashboard),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_dashboard_access,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        // Job posts
        .route(
            "/posts",
            get(posts::handle_list_posts).post(posts::handle_create_post),
        )
        .route("/posts/:id", get(posts::handle_get_post))
        .route("/share/:share", get(posts::handle_get_shared_post))
        .merge(dashboard)
        // Applications
        .route(
            "/applies",
            get(applies::handle_list_applies).post(applies::handle_create_apply),
        )
        .route(
            "/applies/:id",
            get(applies::handle_get_apply)
                .patch(applies::handle_toggle_favorite)
                .delete(applies::handle_delete_apply),
        )
        // Interview generation
        .route("/interview/:apply_id", post(screening::handle_interview))
        .route(
            "/interview/:apply_id/:lang",
            post(screening::handle_interview_in),
        )
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use bytes::Bytes;
    use serde_json::{json, Value};
    use sqlx::SqlitePool;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::applies::store::fixtures::{count, seed_apply, seed_post};
    use crate::config::{Config, GatewayConfig, StorageBackend};
    use crate::db::test_pool;
    use crate::extraction::fixtures;
    use crate::gateway::testing::StubGateway;
    use crate::gateway::Gateway;
    use crate::storage::{LocalStorage, ResumeStorage};

    const BOUNDARY: &str = "screener-test-boundary";

    struct Harness {
        router: Router,
        pool: SqlitePool,
        storage: Arc<LocalStorage>,
        _dir: TempDir,
    }

    async fn harness(gateway: StubGateway) -> Harness {
        let pool = test_pool().await;
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().into_owned();
        let storage = Arc::new(LocalStorage::new(&root));
        let gateway: Arc<dyn Gateway> = Arc::new(gateway);

        let state = AppState {
            db: pool.clone(),
            gateway,
            storage: storage.clone() as Arc<dyn ResumeStorage>,
            config: Config {
                database_url: "sqlite::memory:".to_string(),
                gateway: GatewayConfig {
                    endpoint: "http://127.0.0.1:9".to_string(),
                    model_id: "test-model".to_string(),
                    generate_content_api: "generateContent".to_string(),
                },
                storage: StorageBackend::Local { root },
                max_upload_bytes: 1024 * 1024,
                port: 0,
                rust_log: "info".to_string(),
            },
        };

        Harness {
            router: build_router(state),
            pool,
            storage,
            _dir: dir,
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> Response {
        router.clone().oneshot(request).await.unwrap()
    }

    fn empty(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(fields: &[(&str, &str)], resume: Option<(&str, &[u8])>) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, bytes)) = resume {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/applies")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_body() -> Value {
        json!({
            "token": "AIza-recruiter",
            "title": "Platform Engineer",
            "description": "Own our Rust ingestion services.",
            "skills": ["Rust", "PostgreSQL"],
            "city": "Tangier",
            "min_experience": 3,
            "education_level": 2
        })
    }

    fn scoring_reply() -> Value {
        json!({
            "skills": ["Rust"],
            "experience": 5,
            "skills_match": 0.8,
            "ai_score": 7.5
        })
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(StubGateway::replying(json!({}))).await;
        let response = send(&h.router, empty("GET", "/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_post_returns_tokens_once() {
        let h = harness(StubGateway::replying(json!({}))).await;

        let response = send(&h.router, json_request("POST", "/posts", post_body())).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        let data = &body["data"];
        assert_eq!(data["access_token"].as_str().unwrap().len(), 60);
        assert_eq!(data["share"].as_str().unwrap().len(), 10);
        assert_eq!(data["dashboard"].as_str().unwrap().len(), 10);
        assert!(data.get("token").is_none());

        let id = data["id"].as_i64().unwrap();
        let shown = body_json(send(&h.router, empty("GET", &format!("/posts/{id}"))).await).await;
        assert_eq!(shown["title"], "Platform Engineer");
        assert!(shown.get("access_token").is_none());
        assert!(shown.get("dashboard").is_none());
        assert!(shown.get("token").is_none());
    }

    #[tokio::test]
    async fn test_create_post_with_rejected_credential_persists_nothing() {
        let h = harness(StubGateway::rejecting_credentials()).await;

        let response = send(&h.router, json_request("POST", "/posts", post_body())).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "INVALID_CREDENTIAL");
        assert_eq!(count(&h.pool, "posts").await, 0);
    }

    #[tokio::test]
    async fn test_create_post_validation_errors() {
        let h = harness(StubGateway::replying(json!({}))).await;

        let response = send(&h.router, json_request("POST", "/posts", json!({"title": "x"}))).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["errors"]["token"].is_array());
        assert!(body["errors"]["description"].is_array());
        assert!(body["errors"].get("title").is_none());
    }

    #[tokio::test]
    async fn test_unparseable_post_body_is_422() {
        let h = harness(StubGateway::replying(json!({}))).await;
        let request = Request::builder()
            .method("POST")
            .uri("/posts")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = send(&h.router, request).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_missing_post_is_404() {
        let h = harness(StubGateway::replying(json!({}))).await;
        let response = send(&h.router, empty("GET", "/posts/404")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_share_lookup_is_public() {
        let h = harness(StubGateway::replying(json!({}))).await;
        let (id, tokens) = seed_post(&h.pool).await;

        let response = send(&h.router, empty("GET", &format!("/share/{}", tokens.share))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["id"], id);

        let missing = send(&h.router, empty("GET", "/share/nothing")).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dashboard_requires_matching_access_token() {
        let h = harness(StubGateway::replying(json!({}))).await;
        let (id, mine) = seed_post(&h.pool).await;
        let (_, theirs) = seed_post(&h.pool).await;
        seed_apply(&h.pool, id).await;

        let uri = format!("/dashboard/{}", mine.dashboard);
        let missing = send(&h.router, empty("GET", &uri)).await;
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let wrong = send(
            &h.router,
            empty("GET", &format!("{uri}?access_token={}", theirs.access_token)),
        )
        .await;
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(wrong).await["code"], "UNAUTHORIZED");

        let ok = send(
            &h.router,
            empty("GET", &format!("{uri}?access_token={}", mine.access_token)),
        )
        .await;
        assert_eq!(ok.status(), StatusCode::OK);
        let body = body_json(ok).await;
        assert_eq!(body["data"]["id"], id);
        assert_eq!(body["data"]["applies"].as_array().unwrap().len(), 1);
        assert!(body["data"]["applies"][0]["detail"].is_object());
    }

    #[tokio::test]
    async fn test_wrong_token_cannot_delete_dashboard() {
        let h = harness(StubGateway::replying(json!({}))).await;
        let (_, tokens) = seed_post(&h.pool).await;

        let response = send(
            &h.router,
            empty("DELETE", &format!("/dashboard/{}?access_token=wrong", tokens.dashboard)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(count(&h.pool, "posts").await, 1);
    }

    #[tokio::test]
    async fn test_unparseable_dashboard_query_is_401_json() {
        let h = harness(StubGateway::replying(json!({}))).await;
        let (_, tokens) = seed_post(&h.pool).await;
        let uri = format!(
            "/dashboard/{}?access_token=wrong&access_token={}",
            tokens.dashboard, tokens.access_token
        );

        let read = send(&h.router, empty("GET", &uri)).await;
        assert_eq!(read.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(read).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let delete = send(&h.router, empty("DELETE", &uri)).await;
        assert_eq!(delete.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(count(&h.pool, "posts").await, 1);
    }

    #[tokio::test]
    async fn test_dashboard_delete_cascades() {
        let h = harness(StubGateway::replying(json!({}))).await;
        let (id, tokens) = seed_post(&h.pool).await;
        seed_apply(&h.pool, id).await;
        seed_apply(&h.pool, id).await;

        let response = send(
            &h.router,
            empty(
                "DELETE",
                &format!("/dashboard/{}?access_token={}", tokens.dashboard, tokens.access_token),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["message"],
            "Post and all associated data deleted successfully"
        );
        assert_eq!(count(&h.pool, "posts").await, 0);
        assert_eq!(count(&h.pool, "applies").await, 0);
        assert_eq!(count(&h.pool, "details").await, 0);
    }

    #[tokio::test]
    async fn test_multipart_apply_is_scored() {
        let h = harness(StubGateway::replying(scoring_reply())).await;
        let (post_id, _) = seed_post(&h.pool).await;
        let post_id = post_id.to_string();
        let resume = fixtures::docx(&["Rust and Tokio"]);

        let response = send(
            &h.router,
            multipart_request(
                &[
                    ("name", "Omar Idrissi"),
                    ("email", "omar@example.com"),
                    ("phone", "0622222222"),
                    ("post_id", post_id.as_str()),
                ],
                Some(("omar.docx", resume.as_slice())),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "Omar Idrissi");
        assert_eq!(body["data"]["detail"]["ai_score"], 7.5);
        assert_eq!(body["gemini_response"]["experience"], 5);

        let stored_path = body["data"]["resume_path"].as_str().unwrap();
        let stored = h.storage.get(stored_path).await.unwrap();
        assert_eq!(Bytes::from(stored), Bytes::from(resume));
    }

    #[tokio::test]
    async fn test_apply_with_unsupported_file_is_422() {
        let h = harness(StubGateway::replying(scoring_reply())).await;
        let (post_id, _) = seed_post(&h.pool).await;
        let post_id = post_id.to_string();

        let response = send(
            &h.router,
            multipart_request(
                &[
                    ("name", "Omar Idrissi"),
                    ("email", "omar@example.com"),
                    ("phone", "0622222222"),
                    ("post_id", post_id.as_str()),
                ],
                Some(("omar.txt", &b"plain text resume"[..])),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["errors"]["resume"].is_array());
        assert_eq!(count(&h.pool, "applies").await, 0);
    }

    #[tokio::test]
    async fn test_apply_to_unknown_post_is_404() {
        let h = harness(StubGateway::replying(scoring_reply())).await;
        let resume = fixtures::docx(&["Rust"]);

        let response = send(
            &h.router,
            multipart_request(
                &[
                    ("name", "Omar Idrissi"),
                    ("email", "omar@example.com"),
                    ("phone", "0622222222"),
                    ("post_id", "31337"),
                ],
                Some(("omar.docx", resume.as_slice())),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_apply_crud() {
        let h = harness(StubGateway::replying(json!({}))).await;
        let (post_id, _) = seed_post(&h.pool).await;
        let id = seed_apply(&h.pool, post_id).await.apply.id;
        let uri = format!("/applies/{id}");

        let list = body_json(send(&h.router, empty("GET", "/applies")).await).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let toggled = body_json(send(&h.router, empty("PATCH", &uri)).await).await;
        assert_eq!(toggled["is_favorite"], true);

        let deleted = send(&h.router, empty("DELETE", &uri)).await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let gone = send(&h.router, empty("GET", &uri)).await;
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
        assert_eq!(count(&h.pool, "details").await, 0);
    }

    #[tokio::test]
    async fn test_interview_unknown_language_falls_back_to_english() {
        let h = harness(StubGateway::replying(json!({
            "questions": [{"question": "Why Rust?", "answer": "Memory safety."}]
        })))
        .await;
        let (post_id, _) = seed_post(&h.pool).await;
        let seeded = seed_apply(&h.pool, post_id).await;
        h.storage
            .put(
                &seeded.apply.resume_path,
                Bytes::from(fixtures::docx(&["Rust"])),
            )
            .await
            .unwrap();

        let response = send(
            &h.router,
            empty("POST", &format!("/interview/{}/xx", seeded.apply.id)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["language"], "English");
        assert_eq!(body["data"]["candidate"]["email"], "amina@example.com");
        assert_eq!(body["data"]["interview_questions"][0]["question"], "Why Rust?");

        let french = send(
            &h.router,
            empty("POST", &format!("/interview/{}/fr", seeded.apply.id)),
        )
        .await;
        assert_eq!(body_json(french).await["data"]["language"], "French");
    }
}
