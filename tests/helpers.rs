// Shared helpers for the integration tests: HTTP clients, in-memory storage
// and mock upstream responses.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eco_web_analyzer::estimate::{ByteEstimator, GreenClassifier};
use eco_web_analyzer::provider::HeuristicProvider;
use eco_web_analyzer::storage::{init_memory_pool, run_migrations, SqliteAnalysisStore};

/// HTTP client with a short request timeout.
#[allow(dead_code)] // Used by other test files
pub fn test_client(timeout: Duration) -> Arc<reqwest::Client> {
    Arc::new(
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build test client"),
    )
}

/// Byte estimator allowed to probe mock servers on 127.0.0.1.
#[allow(dead_code)]
pub fn local_estimator(client: Arc<reqwest::Client>) -> ByteEstimator {
    ByteEstimator::new(client).allow_private_targets(true)
}

/// Networked internal chain whose probe may reach 127.0.0.1.
#[allow(dead_code)]
pub fn local_provider(client: Arc<reqwest::Client>, registry_url: String) -> HeuristicProvider {
    HeuristicProvider::new(
        local_estimator(Arc::clone(&client)),
        GreenClassifier::new(client, registry_url),
    )
}

/// In-memory store with migrations applied.
#[allow(dead_code)]
pub async fn memory_store() -> Arc<SqliteAnalysisStore> {
    let pool = init_memory_pool()
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Arc::new(SqliteAnalysisStore::new(pool))
}

/// Answers `HEAD /` with a body of `bytes` bytes, so the response carries a
/// matching `Content-Length`.
#[allow(dead_code)]
pub async fn mount_page(server: &MockServer, bytes: usize) {
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; bytes]))
        .mount(server)
        .await;
}

/// Answers every green registry lookup with `{ "green": green }`.
#[allow(dead_code)]
pub async fn mount_registry(server: &MockServer, green: bool) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "green": green })))
        .mount(server)
        .await;
}

/// Chat-completion response whose first choice carries `content`.
#[allow(dead_code)]
pub fn chat_completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

/// The five fixed fallback suggestions.
#[allow(dead_code)]
pub fn template_suggestions() -> Vec<String> {
    [
        "Optimize and compress images to reduce file sizes",
        "Minify CSS and JavaScript files",
        "Consider switching to green web hosting",
        "Remove unused fonts and scripts",
        "Implement lazy loading for images",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
