pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::assessment::handlers as assessment;
use crate::language::handlers as language;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/resume/analyze",
            post(analysis::handle_analyze_resume),
        )
        .route(
            "/api/assessment/generate",
            post(assessment::handle_generate_assessment),
        )
        .route(
            "/api/user/language",
            get(language::handle_get_language).post(language::handle_set_language),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::analysis::blueprint::RoleBlueprintStore;
    use crate::analysis::AnalysisPolicy;
    use crate::config::Config;
    use crate::llm_client::{LanguageModel, LlmError};

    const TAXONOMY: &str = r#"{
        "skills": [
            {"name": "Java", "type": "technical", "keywords": ["java"]},
            {"name": "SQL", "type": "technical", "keywords": ["sql"]},
            {"name": "Communication", "type": "soft", "keywords": ["communication"]}
        ],
        "roles": {
            "backend": {"tech": ["Java", "SQL"], "soft": ["Communication"]}
        }
    }"#;

    const BOUNDARY: &str = "skillgap-test-boundary";

    /// Replies with a canned string and records the keys it was called with.
    struct CannedModel {
        reply: String,
        keys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LanguageModel for CannedModel {
        async fn generate(&self, _prompt: &str, api_key: &str) -> Result<String, LlmError> {
            self.keys.lock().unwrap().push(api_key.to_string());
            Ok(self.reply.clone())
        }
    }

    fn app_with(reply: &str, configured_key: Option<&str>) -> (Router, Arc<CannedModel>) {
        let model = Arc::new(CannedModel {
            reply: reply.to_string(),
            keys: Mutex::new(Vec::new()),
        });
        let config = Config {
            gemini_api_key: configured_key.map(str::to_string),
            gemini_model: "test-model".to_string(),
            skills_taxonomy_path: PathBuf::from("unused.json"),
            max_upload_bytes: 64 * 1024,
            policy: AnalysisPolicy::default(),
            port: 0,
            rust_log: "info".to_string(),
        };
        let state = AppState {
            blueprints: Arc::new(RoleBlueprintStore::from_json(TAXONOMY).unwrap()),
            llm: model.clone(),
            config,
        };
        (build_router(state), model)
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn analyze_request(body: String, api_key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/resume/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(key) = api_key {
            builder = builder.header("X-Gemini-API-Key", key);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app_with("", None);
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "skillgap-api");
    }

    #[tokio::test]
    async fn test_analyze_without_key_uses_static_analysis() {
        let (app, model) = app_with("", None);
        let body = multipart_body(&[
            ("file", Some("resume.txt"), "Backend developer: Java and SQL."),
            ("roleId", None, "backend"),
        ]);

        let response = app.oneshot(analyze_request(body, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["overallScore"], 67);
        assert_eq!(body["readinessLevel"], "Mid-Level");
        assert_eq!(body["missing"][0]["name"], "Communication");
        assert_eq!(body["criticalGaps"][0]["skill"], "Communication");
        assert!(body.get("aiError").is_none());
        assert!(model.keys.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_prefers_header_key_over_configured() {
        let (app, model) = app_with("not json", Some("configured-key"));
        let body = multipart_body(&[("file", Some("resume.txt"), "Java")]);

        let response = app
            .oneshot(analyze_request(body, Some("caller-key")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["aiError"]
            .as_str()
            .unwrap()
            .starts_with("AI Engine Failed"));
        assert!(model
            .keys
            .lock()
            .unwrap()
            .iter()
            .all(|key| key == "caller-key"));
    }

    #[tokio::test]
    async fn test_analyze_without_file_is_bad_request() {
        let (app, _) = app_with("", None);
        let body = multipart_body(&[("roleId", None, "backend")]);

        let response = app.oneshot(analyze_request(body, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_analyze_corrupt_pdf_is_ingestion_error() {
        let (app, _) = app_with("", None);
        let body = multipart_body(&[("file", Some("resume.pdf"), "definitely not a pdf")]);

        let response = app.oneshot(analyze_request(body, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "INGESTION_ERROR");
    }

    #[tokio::test]
    async fn test_assessment_requires_a_key() {
        let (app, _) = app_with("{}", None);
        let request = Request::post("/api/assessment/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"skills":["Java"]}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_assessment_returns_questions() {
        let reply = r#"{"questions":[{"id":"q1","skill":"Java","type":"MCQ","question":"?",
            "options":["a","b","c","d"],"correctAnswerIndex":2}]}"#;
        let (app, _) = app_with(reply, Some("configured-key"));
        let request = Request::post("/api/assessment/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"skills":["Java"]}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["questions"][0]["correctAnswerIndex"], 2);
    }

    #[tokio::test]
    async fn test_assessment_with_undecodable_reply_is_bad_gateway() {
        let (app, _) = app_with("I am not JSON", Some("configured-key"));
        let request = Request::post("/api/assessment/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"skills":["Java"]}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "LLM_ERROR");
    }

    #[tokio::test]
    async fn test_language_defaults_to_english() {
        let (app, _) = app_with("", None);
        let response = app
            .oneshot(Request::get("/api/user/language").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["language"], "en");
    }

    #[tokio::test]
    async fn test_language_cookie_is_read() {
        let (app, _) = app_with("", None);
        let request = Request::get("/api/user/language")
            .header(header::COOKIE, "theme=dark; app_language=fr")
            .body(Body::empty())
            .unwrap();

        let body = json_body(app.oneshot(request).await.unwrap()).await;
        assert_eq!(body["language"], "fr");
    }

    #[tokio::test]
    async fn test_set_language_writes_cookie() {
        let (app, _) = app_with("", None);
        let request = Request::post("/api/user/language")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"language":"de"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("app_language=de;"));
        assert!(cookie.contains("Max-Age=31536000"));
        assert!(cookie.contains("Path=/"));
    }

    #[tokio::test]
    async fn test_set_invalid_language_is_rejected() {
        let (app, _) = app_with("", None);
        let request = Request::post("/api/user/language")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"language":"English!"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
