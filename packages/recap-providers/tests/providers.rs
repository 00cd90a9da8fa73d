use std::future::IntoFuture;

use axum::{
	Json, Router,
	http::{HeaderMap, StatusCode},
	response::IntoResponse,
	routing,
};
use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

use recap_config::{EmbeddingProviderConfig, LlmProviderConfig};
use recap_providers::{
	Error,
	chat::{self, ChatMessage},
	embedding,
};

async fn start_server(app: Router) -> (String, Sender<()>) {
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind test server.");
	let addr = listener.local_addr().expect("Failed to read test server address.");
	let (tx, rx) = oneshot::channel();
	let server = axum::serve(listener, app).with_graceful_shutdown(async move {
		let _ = rx.await;
	});

	tokio::spawn(async move {
		let _ = server.into_future().await;
	});

	(format!("http://{addr}"), tx)
}

fn embedding_cfg(api_base: String) -> EmbeddingProviderConfig {
	EmbeddingProviderConfig {
		provider_id: "test".to_string(),
		api_base,
		api_key: Some("test-key".to_string()),
		path: "/v1/embeddings".to_string(),
		model: "text-embedding-3-small".to_string(),
		timeout_ms: 1_000,
		default_headers: Map::new(),
	}
}

fn llm_cfg(api_base: String) -> LlmProviderConfig {
	LlmProviderConfig {
		provider_id: "test".to_string(),
		api_base,
		api_key: Some("test-key".to_string()),
		path: "/v1/chat/completions".to_string(),
		model: "gpt-4o-mini".to_string(),
		temperature: 0.2,
		timeout_ms: 1_000,
		default_headers: Map::new(),
	}
}

async fn embed_handler(headers: HeaderMap, Json(payload): Json<Value>) -> impl IntoResponse {
	if headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some("Bearer test-key") {
		return StatusCode::UNAUTHORIZED.into_response();
	}
	if payload.get("model").and_then(Value::as_str) != Some("text-embedding-3-small") {
		return StatusCode::BAD_REQUEST.into_response();
	}

	let dims = payload.get("input").and_then(Value::as_str).map(str::len).unwrap_or(0);
	let embedding = vec![0.25_f32; dims];

	Json(serde_json::json!({ "data": [{ "index": 0, "embedding": embedding }] })).into_response()
}

async fn chat_handler(Json(payload): Json<Value>) -> impl IntoResponse {
	let temperature = payload.get("temperature").and_then(Value::as_f64).unwrap_or(-1.0);
	let roles: Vec<String> = payload
		.get("messages")
		.and_then(Value::as_array)
		.map(|messages| {
			messages
				.iter()
				.filter_map(|m| m.get("role").and_then(Value::as_str).map(str::to_string))
				.collect()
		})
		.unwrap_or_default();
	let content = format!("roles={} temperature={temperature:.1}", roles.join(","));

	Json(serde_json::json!({ "choices": [{ "message": { "content": content } }] }))
}

#[test]
fn builds_bearer_auth_header() {
	let headers =
		recap_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn rejects_non_string_default_header() {
	let mut defaults = Map::new();

	defaults.insert("x-org".to_string(), Value::Bool(true));

	let err = recap_providers::auth_headers("secret", &defaults).expect_err("Expected error.");

	assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[tokio::test]
async fn embeds_text_over_http() {
	let app = Router::new().route("/v1/embeddings", routing::post(embed_handler));
	let (api_base, shutdown) = start_server(app).await;
	let vector = embedding::embed(&embedding_cfg(api_base), "ship it")
		.await
		.expect("Embedding call failed.");

	assert_eq!(vector.len(), "ship it".len());
	assert!(vector.iter().all(|v| (*v - 0.25).abs() < f32::EPSILON));

	let _ = shutdown.send(());
}

#[tokio::test]
async fn embedding_error_status_is_reported() {
	let app = Router::new().route(
		"/v1/embeddings",
		routing::post(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
	);
	let (api_base, shutdown) = start_server(app).await;
	let err = embedding::embed(&embedding_cfg(api_base), "ship it")
		.await
		.expect_err("Expected status error.");

	match err {
		Error::Status { status, body } => {
			assert_eq!(status, 429);
			assert_eq!(body, "rate limited");
		},
		other => panic!("Unexpected error: {other:?}"),
	}

	let _ = shutdown.send(());
}

#[tokio::test]
async fn embedding_without_vector_is_malformed() {
	let app = Router::new().route(
		"/v1/embeddings",
		routing::post(|| async { Json(serde_json::json!({ "object": "list" })) }),
	);
	let (api_base, shutdown) = start_server(app).await;
	let err = embedding::embed(&embedding_cfg(api_base), "ship it")
		.await
		.expect_err("Expected malformed response error.");

	assert!(matches!(err, Error::InvalidResponse { .. }));

	let _ = shutdown.send(());
}

#[tokio::test]
async fn embedding_requires_api_key() {
	let mut cfg = embedding_cfg("http://127.0.0.1:1".to_string());

	cfg.api_key = None;

	let err = embedding::embed(&cfg, "ship it").await.expect_err("Expected config error.");

	assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[tokio::test]
async fn completes_chat_over_http() {
	let app = Router::new().route("/v1/chat/completions", routing::post(chat_handler));
	let (api_base, shutdown) = start_server(app).await;
	let messages = vec![ChatMessage::system("Be brief."), ChatMessage::user("What shipped?")];
	let answer =
		chat::complete(&llm_cfg(api_base), &messages).await.expect("Completion call failed.");

	assert_eq!(answer, "roles=system,user temperature=0.2");

	let _ = shutdown.send(());
}

#[tokio::test]
async fn completion_error_status_is_reported() {
	let app = Router::new().route(
		"/v1/chat/completions",
		routing::post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
	);
	let (api_base, shutdown) = start_server(app).await;
	let err = chat::complete(&llm_cfg(api_base), &[ChatMessage::user("hi")])
		.await
		.expect_err("Expected status error.");

	assert!(matches!(err, Error::Status { status: 500, .. }));

	let _ = shutdown.send(());
}
