//! Router assembly: session API, WebSocket upgrade, document shell, static
//! files, CORS and HTTP tracing.

use std::sync::Arc;

use axum::{
    handler::Handler,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::document::serve_document;
use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - session API under `/api/v1/...`
/// - the document shell at `/`
/// - static client assets from `server.static_dir`, falling back to the
///   document shell for client-side routes
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new(&state.config.server.static_dir)
        .append_index_html_on_directories(false)
        .fallback(serve_document.with_state(state.clone()));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // Document shell
        .route("/", get(serve_document))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/sessions", post(http::http_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(http::http_get_session).delete(http::http_delete_session),
        )
        .route("/api/v1/sessions/:id/game-state", get(http::http_game_state))
        .route("/api/v1/sessions/:id/category", get(http::http_get_category))
        .route("/api/v1/sessions/:id/category/first", post(http::http_load_first_category))
        .route("/api/v1/sessions/:id/category/next", post(http::http_load_next_category))
        .route("/api/v1/sessions/:id/questions", post(http::http_load_questions))
        .route("/api/v1/sessions/:id/round", post(http::http_prepare_round))
        .route("/api/v1/sessions/:id/answer", post(http::http_post_answer))
        .route("/api/v1/sessions/:id/reset", post(http::http_reset))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Client bundle + client-side routes
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::QuizConfig;
    use crate::session::tests::ScriptedGateway;

    fn app(gw: ScriptedGateway) -> Router {
        let mut cfg = QuizConfig::default();
        cfg.server.static_dir = "./does-not-exist".into();
        build_router(Arc::new(AppState::new(cfg, Arc::new(gw))))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn new_session(app: &Router) -> String {
        let (status, body) = call(app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["state"]["currentQuestion"], 1);
        body["sessionId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = call(&app(ScriptedGateway::default()), "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn plays_a_round_over_http() {
        let app = app(ScriptedGateway::default());
        let id = new_session(&app).await;

        let (status, body) = call(&app, "GET", &format!("/api/v1/sessions/{id}/category"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"]["difficulty"], 1);

        let (_, body) = call(&app, "POST", &format!("/api/v1/sessions/{id}/questions"), None).await;
        assert_eq!(body["questions"].as_array().unwrap().len(), 5);

        let (status, body) = call(&app, "POST", &format!("/api/v1/sessions/{id}/round"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["questions"][0]["prompt"], "Question 1");

        let answer = Some(serde_json::json!({ "answerId": 1 }));
        let (status, body) = call(&app, "POST", &format!("/api/v1/sessions/{id}/answer"), answer).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["kind"], "correct");
        assert_eq!(body["gameState"]["score"], 110);

        let (_, body) = call(&app, "GET", &format!("/api/v1/sessions/{id}/game-state"), None).await;
        assert_eq!(body["currentQuestion"], 2);
        assert_eq!(body["maxQuestions"], 5);

        let (_, body) = call(&app, "POST", &format!("/api/v1/sessions/{id}/reset"), None).await;
        assert_eq!(body["score"], 0);
        assert!(body["category"].is_null());
    }

    #[tokio::test]
    async fn game_over_and_unknown_sessions_map_to_errors() {
        let app = app(ScriptedGateway::with_verdicts([false]));
        let id = new_session(&app).await;
        call(&app, "POST", &format!("/api/v1/sessions/{id}/category/first"), None).await;
        call(&app, "POST", &format!("/api/v1/sessions/{id}/questions"), None).await;

        let answer = Some(serde_json::json!({ "answerId": 1 }));
        let (_, body) = call(&app, "POST", &format!("/api/v1/sessions/{id}/answer"), answer.clone()).await;
        assert_eq!(body["outcome"]["kind"], "game_over");

        let (status, body) = call(&app, "POST", &format!("/api/v1/sessions/{id}/answer"), answer).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "game_over");

        let (status, _) = call(&app, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = call(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "session_not_found");
    }

    #[tokio::test]
    async fn answering_before_questions_is_a_conflict() {
        let app = app(ScriptedGateway::default());
        let id = new_session(&app).await;

        let answer = Some(serde_json::json!({ "answerId": 1 }));
        let (status, body) = call(&app, "POST", &format!("/api/v1/sessions/{id}/answer"), answer).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "missing_question");
    }

    #[tokio::test]
    async fn answer_from_another_question_is_a_bad_request() {
        let app = app(ScriptedGateway::default());
        let id = new_session(&app).await;
        call(&app, "POST", &format!("/api/v1/sessions/{id}/round"), None).await;

        let answer = Some(serde_json::json!({ "answerId": 99 }));
        let (status, body) = call(&app, "POST", &format!("/api/v1/sessions/{id}/answer"), answer).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "unknown_answer");

        let (_, body) = call(&app, "GET", &format!("/api/v1/sessions/{id}/game-state"), None).await;
        assert_eq!(body["score"], 0);
        assert_eq!(body["currentQuestion"], 1);
    }

    #[tokio::test]
    async fn document_shell_is_served_for_root_and_client_routes() {
        let app = app(ScriptedGateway::default());
        for uri in ["/", "/play/round-1"] {
            let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let res = app.clone().oneshot(req).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK, "{uri}");
            let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
            let html = String::from_utf8(bytes.to_vec()).unwrap();
            assert!(html.contains("<title>Million</title>"), "{uri}");
        }
    }
}
