pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::chat::handlers as chat;
use crate::documents::handlers as documents;
use crate::markdown::handlers as markdown;
use crate::render::handlers as render;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Documents
        .route("/api/v1/cvs", get(documents::handle_list_cvs))
        .route("/api/v1/cvs/:filename", get(documents::handle_get_cv_file))
        .route(
            "/api/v1/cvs/:filename/content",
            get(documents::handle_get_cv_content).put(documents::handle_put_cv_content),
        )
        .route(
            "/api/v1/profile",
            get(documents::handle_get_profile).put(documents::handle_put_profile),
        )
        // PDF generation
        .route("/api/v1/regenerate-pdf", post(render::handle_regenerate_pdf))
        .route("/api/v1/profile/pdf", get(render::handle_profile_pdf))
        // Editor conversion
        .route("/api/v1/markdown/to-html", post(markdown::handle_to_html))
        .route("/api/v1/markdown/from-html", post(markdown::handle_from_html))
        // Chat sidebar
        .route("/api/v1/chat", post(chat::handle_chat))
        .route("/api/v1/chat/reset", post(chat::handle_reset))
        .route("/api/v1/agent/status", get(chat::handle_agent_status))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::agent::AgentService;
    use crate::chat::sessions::tests::FakeAgent;
    use crate::chat::SessionRegistry;
    use crate::config::Config;
    use crate::documents::DocumentStore;
    use crate::render::{PdfRenderer, ProfilePdf};

    fn test_state(dir: &Path, agent: Arc<dyn AgentService>) -> AppState {
        let config = Config {
            port: 0,
            rust_log: "debug".to_string(),
            data_dir: dir.join("data"),
            assets_dir: dir.join("assets"),
            agent_url: "http://agent.test".to_string(),
            agent_assistant_id: "cv_agent".to_string(),
            agent_timeout: None,
            pandoc_path: dir.join("no-such-pandoc").display().to_string(),
            pdf_engine: Some("weasyprint".to_string()),
            pdf_timeout: Duration::from_secs(5),
        };
        AppState {
            store: DocumentStore::new(&config.data_dir),
            renderer: PdfRenderer::from_config(&config),
            sessions: Arc::new(SessionRegistry::new()),
            profile_pdf: Arc::new(ProfilePdf::new()),
            agent,
            config,
        }
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path(), Arc::new(FakeAgent::new())));

        let (status, body) = send_json(app, "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["sessions"], 0);
    }

    #[tokio::test]
    async fn test_list_cvs() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Arc::new(FakeAgent::new()));
        std::fs::create_dir_all(state.store.output_dir()).unwrap();
        std::fs::write(state.store.output_dir().join("cv_b.pdf"), b"x").unwrap();
        std::fs::write(state.store.output_dir().join("cv_a_role.pdf"), b"x").unwrap();

        let (status, body) = send_json(build_router(state), "GET", "/api/v1/cvs", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cvs"], json!(["cv_a_role.pdf", "cv_b.pdf"]));
        assert_eq!(body["documents"][0]["title"], "A Role");
    }

    #[tokio::test]
    async fn test_missing_content_is_404_with_empty_content() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path(), Arc::new(FakeAgent::new())));

        let (status, body) =
            send_json(app, "GET", "/api/v1/cvs/cv_nope.pdf/content", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"content": ""}));
    }

    #[tokio::test]
    async fn test_put_then_get_content_applies_repair() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Arc::new(FakeAgent::new()));

        let (status, body) = send_json(
            build_router(state.clone()),
            "PUT",
            "/api/v1/cvs/cv_acme.md/content",
            Some(json!({"content": "# Jane Doe\nEmail: jane@x.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (_, body) =
            send_json(build_router(state), "GET", "/api/v1/cvs/cv_acme.pdf/content", None).await;
        assert_eq!(body["content"], "# Jane Doe  \nEmail: jane@x.com");
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path(), Arc::new(FakeAgent::new())));

        let (status, body) =
            send_json(app, "GET", "/api/v1/cvs/..%2Fuser.md/content", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_download_disposition() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Arc::new(FakeAgent::new()));
        std::fs::create_dir_all(state.store.output_dir()).unwrap();
        std::fs::write(state.store.output_dir().join("cv_a.pdf"), b"%PDF").unwrap();
        let app = build_router(state);

        let request = Request::builder()
            .uri("/api/v1/cvs/cv_a.pdf?download=true")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"cv_a.pdf\""
        );
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");

        let (status, bytes) = send(app, "GET", "/api/v1/cvs/cv_a.pdf", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"%PDF");
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path(), Arc::new(FakeAgent::new())));

        let (status, body) = send_json(app, "GET", "/api/v1/cvs/cv_x.pdf", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_profile_get_and_put() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Arc::new(FakeAgent::new()));

        let (_, body) = send_json(build_router(state.clone()), "GET", "/api/v1/profile", None).await;
        assert_eq!(body["content"], "");

        let (status, _) = send_json(
            build_router(state.clone()),
            "PUT",
            "/api/v1/profile",
            Some(json!({"content": "# Me\n_Engineer_"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send_json(build_router(state), "GET", "/api/v1/profile", None).await;
        assert_eq!(body["content"], "# Me\n_Engineer_");
    }

    #[tokio::test]
    async fn test_chat_requires_session_id() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path(), Arc::new(FakeAgent::new())));

        let (status, body) =
            send_json(app, "POST", "/api/v1/chat", Some(json!({"message": "hi"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_chat_and_reset_flow() {
        let dir = tempfile::tempdir().unwrap();
        let agent = Arc::new(FakeAgent::replying(json!([
            {"type": "ai", "content": "✅ Profile updated"}
        ])));
        let state = test_state(dir.path(), agent.clone());

        for _ in 0..2 {
            let (status, body) = send_json(
                build_router(state.clone()),
                "POST",
                "/api/v1/chat",
                Some(json!({"message": "add Rust", "context": "profile", "session_id": "sess-1"})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["response"], "✅ Profile updated");
            assert_eq!(body["profileUpdated"], true);
        }
        assert_eq!(agent.created(), 1);

        let reset = Some(json!({"session_id": "sess-1"}));
        let (_, body) =
            send_json(build_router(state.clone()), "POST", "/api/v1/chat/reset", reset.clone()).await;
        assert_eq!(body, json!({"success": true, "found": true}));

        let (_, body) = send_json(build_router(state), "POST", "/api/v1/chat/reset", reset).await;
        assert_eq!(body, json!({"success": true, "found": false}));
    }

    #[tokio::test]
    async fn test_chat_failure_is_inline_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path(), Arc::new(FakeAgent::failing())));

        let (status, body) = send_json(
            app,
            "POST",
            "/api/v1/chat",
            Some(json!({"message": "hi", "session_id": "s"})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["response"].as_str().unwrap().starts_with("❌ Error:"));
        assert_eq!(body["profileUpdated"], false);
    }

    #[tokio::test]
    async fn test_agent_status() {
        let dir = tempfile::tempdir().unwrap();

        let (_, body) = send_json(
            build_router(test_state(dir.path(), Arc::new(FakeAgent::new()))),
            "GET",
            "/api/v1/agent/status",
            None,
        )
        .await;
        assert_eq!(body["connected"], true);

        let (_, body) = send_json(
            build_router(test_state(dir.path(), Arc::new(FakeAgent::failing()))),
            "GET",
            "/api/v1/agent/status",
            None,
        )
        .await;
        assert_eq!(body["connected"], false);
    }

    #[tokio::test]
    async fn test_markdown_conversion_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Arc::new(FakeAgent::new()));

        let (_, body) = send_json(
            build_router(state.clone()),
            "POST",
            "/api/v1/markdown/to-html",
            Some(json!({"markdown": "# Hi\n_x_", "dialect": "profile"})),
        )
        .await;
        assert_eq!(body["html"], "<h1>Hi</h1><p><em>x</em></p>");

        let (_, body) = send_json(
            build_router(state),
            "POST",
            "/api/v1/markdown/from-html",
            Some(json!({"html": "<h1>Hi</h1><p><em>x</em></p>"})),
        )
        .await;
        assert_eq!(body["markdown"], "# Hi\n*x*");
    }

    #[tokio::test]
    async fn test_regenerate_missing_cv_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path(), Arc::new(FakeAgent::new())));

        let (status, _) = send_json(
            app,
            "POST",
            "/api/v1/regenerate-pdf",
            Some(json!({"filename": "cv_ghost"})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_regenerate_conversion_failure_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Arc::new(FakeAgent::new()));
        state.store.write_markdown("cv_acme", "# Jane").await.unwrap();

        let (status, body) = send_json(
            build_router(state),
            "POST",
            "/api/v1/regenerate-pdf",
            Some(json!({"filename": "cv_acme"})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "CONVERSION_FAILED");
    }

    #[tokio::test]
    async fn test_missing_body_fields_are_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Arc::new(FakeAgent::new()));

        for (method, uri) in [
            ("POST", "/api/v1/regenerate-pdf"),
            ("PUT", "/api/v1/cvs/cv_a.md/content"),
            ("PUT", "/api/v1/profile"),
            ("POST", "/api/v1/markdown/to-html"),
        ] {
            let (status, body) =
                send_json(build_router(state.clone()), method, uri, Some(json!({}))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
            assert_eq!(body["success"], false);
            assert_eq!(body["code"], "BAD_REQUEST");
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path(), Arc::new(FakeAgent::new())));

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_chat_context_is_cv_mode() {
        let dir = tempfile::tempdir().unwrap();
        let agent = Arc::new(FakeAgent::replying(json!([{"type": "ai", "content": "ok"}])));
        let state = test_state(dir.path(), agent.clone());

        for context in [json!("other"), json!(null)] {
            let (status, body) = send_json(
                build_router(state.clone()),
                "POST",
                "/api/v1/chat",
                Some(json!({"message": "hi", "context": context, "session_id": "s"})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["response"], "ok");
            assert_eq!(
                agent.last_content.lock().unwrap().as_deref(),
                Some("[CV MODE]\n\nhi")
            );
        }
    }

    #[tokio::test]
    async fn test_quote_in_download_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path(), Arc::new(FakeAgent::new())));

        let (status, body) =
            send_json(app, "GET", "/api/v1/cvs/cv_%22x.pdf?download=true", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_health_answers_while_thread_creation_hangs() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Arc::new(FakeAgent::new()));

        let sessions = state.sessions.clone();
        let pending = tokio::spawn(async move {
            let hanging = FakeAgent::hanging();
            sessions.get_or_create_thread("slow", &hanging).await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let (status, body) = tokio::time::timeout(
            Duration::from_secs(1),
            send_json(build_router(state), "GET", "/health", None),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sessions"], 0);
        pending.abort();
    }

    #[tokio::test]
    async fn test_profile_pdf_without_profile_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path(), Arc::new(FakeAgent::new())));

        let (status, _) = send_json(app, "GET", "/api/v1/profile/pdf", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
