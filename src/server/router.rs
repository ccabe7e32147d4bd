use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{ask, emails, health};
use crate::state::AppState;

/// Builds the application router: the two pipeline endpoints, the email
/// listing endpoints, and liveness/status, behind CORS and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/status", get(health::get_status))
        .route("/api/store-email", post(emails::store_email))
        .route("/api/ask-question", post(ask::ask_question))
        .route("/api/emails", get(emails::list_emails))
        .route("/api/emails/:id", get(emails::get_email))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(state: &Arc<AppState>) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .settings
        .server
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Settings;
    use crate::core::errors::ApiError;
    use crate::llm::{ChatRequest, LlmProvider};
    use crate::mail::MailStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::{json, Value};

    /// Fixed embeddings plus a chat reply that quotes the prompt, so the
    /// tests can see what reached the model.
    struct CannedProvider;

    #[async_trait]
    impl LlmProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn chat(&self, request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
            let prompt = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(format!("canned reply to: {prompt}"))
        }

        async fn embed(
            &self,
            inputs: &[String],
            _model_id: &str,
        ) -> Result<Vec<Vec<f32>>, ApiError> {
            Ok(inputs.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    async fn spawn_app() -> String {
        let tmp = std::env::temp_dir().join(format!(
            "maildex-e2e-test-{}.db",
            uuid::Uuid::new_v4()
        ));
        let store = MailStore::with_path(tmp).await.unwrap();

        let state = Arc::new(AppState {
            settings: Settings::default(),
            store,
            llm: Arc::new(CannedProvider),
            started_at: Utc::now(),
        });

        let app = router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}")
    }

    fn email_json(subject: &str, body: &str) -> Value {
        json!({
            "subject": subject,
            "sender": "alice@example.com",
            "recipient": ["bob@example.com"],
            "body": body,
        })
    }

    #[tokio::test]
    async fn stores_an_email_and_answers_from_it() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let stored: Value = client
            .post(format!("{base}/api/store-email"))
            .json(&email_json(
                "meeting",
                "the minutes of the meeting are attached",
            ))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stored["message"], "Email stored successfully!");
        assert_eq!(stored["sections"], 1);
        assert!(stored["email_id"].as_i64().unwrap() >= 1);

        let asked: Value = client
            .post(format!("{base}/api/ask-question"))
            .json(&json!({ "question": "what is attached?" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let answer = asked["answer"].as_str().unwrap();
        assert!(answer.contains("the minutes of the meeting are attached"));
        assert!(answer.contains("what is attached?"));
    }

    #[tokio::test]
    async fn malformed_sender_is_rejected_with_field_detail() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/api/store-email"))
            .json(&json!({
                "subject": "bad",
                "sender": "not-an-address",
                "recipient": ["bob@example.com"],
                "body": "text",
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Invalid email data");
        assert!(body["details"].get("sender").is_some());
    }

    #[tokio::test]
    async fn lists_emails_and_serves_detail_or_404() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        client
            .post(format!("{base}/api/store-email"))
            .json(&email_json("inventory", "we have three boxes left"))
            .send()
            .await
            .unwrap();

        let listed: Value = client
            .get(format!("{base}/api/emails"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let emails = listed["emails"].as_array().unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0]["subject"], "inventory");

        let id = emails[0]["id"].as_i64().unwrap();
        let detail: Value = client
            .get(format!("{base}/api/emails/{id}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(detail["subject"], "inventory");
        assert_eq!(detail["sections"].as_array().unwrap().len(), 1);
        assert_eq!(detail["sections"][0]["section_order"], 1);

        let missing = client
            .get(format!("{base}/api/emails/424242"))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status().as_u16(), 404);
    }

    #[tokio::test]
    async fn health_and_status_report_the_store() {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let health: Value = client
            .get(format!("{base}/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");

        client
            .post(format!("{base}/api/store-email"))
            .json(&email_json("s", "one section body"))
            .send()
            .await
            .unwrap();

        let status: Value = client
            .get(format!("{base}/api/status"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["emails"], 1);
        assert_eq!(status["sections"], 1);
        assert_eq!(status["embedding_model"], "text-embedding-3-small");
        assert_eq!(status["chat_model"], "gpt-4o-mini");
    }
}
