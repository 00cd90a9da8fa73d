use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode, header},
};
use serde_json::Value;
use tower::util::ServiceExt;

use recap_api::{routes, state::AppState};
use recap_service::{Providers, RecapService};
use recap_testkit::{
	CompletionReply, EmbeddingReply, ScriptedStore, SpyCompletion, StoreReply, StubEmbedding,
	test_config, update_row,
};

fn app_with(
	embedding_key: Option<&str>,
	embedding: EmbeddingReply,
	completion: CompletionReply,
	store: ScriptedStore,
) -> Router {
	let providers = Providers::new(
		Arc::new(StubEmbedding::new(embedding)),
		Arc::new(SpyCompletion::new(completion)),
	);
	let service =
		RecapService::with_parts(test_config(embedding_key), providers, Arc::new(store));

	routes::router(AppState::from_service(service))
}

fn default_store() -> ScriptedStore {
	ScriptedStore::new(
		StoreReply::Rows(vec![
			update_row(1, "Shipped the billing export.", Some(0.91)),
			update_row(2, "Finished the onboarding redesign.", Some(0.84)),
			update_row(3, "Rolled out the search cache.", Some(0.77)),
		]),
		StoreReply::Rows(vec![update_row(7, "Drafted the Q3 roadmap.", None)]),
	)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = app.oneshot(request).await.expect("Failed to call router.");
	let status = response.status();
	let bytes =
		body::to_bytes(response.into_body(), usize::MAX).await.expect("Failed to read body.");
	let json = if bytes.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&bytes).expect("Response body must be JSON.")
	};

	(status, json)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(body.to_string()))
		.expect("Failed to build request.")
}

#[tokio::test]
async fn healthz_reports_ok() {
	let app = app_with(None, EmbeddingReply::Malformed, CompletionReply::Echo, default_store());
	let request =
		Request::builder().uri("/healthz").body(Body::empty()).expect("Failed to build request.");
	let (status, body) = send(app, request).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn chat_returns_similarity_context() {
	let app = app_with(
		Some("sk-test"),
		EmbeddingReply::Vector(vec![0.1, 0.2]),
		CompletionReply::Text("The team shipped three things.".to_string()),
		default_store(),
	);
	let (status, body) = send(
		app,
		post_json("/chat", serde_json::json!({ "query": "What did the team ship this week?", "top_k": 3 })),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["query"], "What did the team ship this week?");
	assert_eq!(body["answer"], "The team shipped three things.");
	assert_eq!(
		body["debug"],
		serde_json::json!({
			"mode": "similarity",
			"reason": "ok",
			"source": "rpc",
			"context_count": 3
		})
	);
	assert_eq!(body["context"].as_array().map(Vec::len), Some(3));
	assert_eq!(body["context"][0]["similarity"], 0.91);
}

#[tokio::test]
async fn chat_without_key_uses_recency() {
	let app = app_with(None, EmbeddingReply::Malformed, CompletionReply::Echo, default_store());
	let (status, body) =
		send(app, post_json("/chat", serde_json::json!({ "query": "Anything new?" }))).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["debug"]["mode"], "recency");
	assert_eq!(body["debug"]["reason"], "openai_key_missing");
	assert_eq!(body["debug"]["source"], "rest");
	assert_eq!(body["debug"]["context_count"], 1);
	assert!(
		body["answer"]
			.as_str()
			.map(|answer| answer.starts_with(recap_domain::context::RECENCY_ANSWER_HEADER))
			.unwrap_or(false)
	);
}

#[tokio::test]
async fn chat_rpc_failure_is_reported_in_debug() {
	let store = ScriptedStore::new(
		StoreReply::Status(500),
		StoreReply::Rows(vec![update_row(7, "Drafted the Q3 roadmap.", None)]),
	);
	let app = app_with(
		Some("sk-test"),
		EmbeddingReply::Vector(vec![0.1]),
		CompletionReply::Text("Roadmap drafted.".to_string()),
		store,
	);
	let (status, body) =
		send(app, post_json("/chat", serde_json::json!({ "query": "Anything new?" }))).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["debug"]["reason"], "rpc_failed");
	assert_eq!(body["debug"]["source"], "rest");
}

#[tokio::test]
async fn chat_validation_errors_are_bad_requests() {
	for payload in [
		serde_json::json!({ "query": "", "top_k": 5 }),
		serde_json::json!({ "query": "hi", "top_k": 0 }),
		serde_json::json!({ "query": "hi", "top_k": 21 }),
	] {
		let app = app_with(
			Some("sk-test"),
			EmbeddingReply::Vector(vec![0.1]),
			CompletionReply::Echo,
			default_store(),
		);
		let (status, body) = send(app, post_json("/chat", payload)).await;

		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error_code"], "invalid_request");
	}

	let app = app_with(
		Some("sk-test"),
		EmbeddingReply::Vector(vec![0.1]),
		CompletionReply::Echo,
		default_store(),
	);
	let (status, body) =
		send(app, post_json("/chat", serde_json::json!({ "top_k": 5 }))).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error_code"], "invalid_request");
}

#[tokio::test]
async fn embedding_failure_is_a_bad_gateway() {
	let app = app_with(
		Some("sk-test"),
		EmbeddingReply::Status(500),
		CompletionReply::Echo,
		default_store(),
	);
	let (status, body) =
		send(app, post_json("/chat", serde_json::json!({ "query": "Anything new?" }))).await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert_eq!(body["error_code"], "embedding_failure");
	assert!(body.get("debug").is_none());
}

#[tokio::test]
async fn completion_failure_is_a_bad_gateway() {
	let app = app_with(
		Some("sk-test"),
		EmbeddingReply::Vector(vec![0.1]),
		CompletionReply::Status(503),
		default_store(),
	);
	let (status, body) =
		send(app, post_json("/chat", serde_json::json!({ "query": "Anything new?" }))).await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert_eq!(body["error_code"], "completion_failure");
}

#[tokio::test]
async fn updates_are_created() {
	let store = default_store().with_insert(StoreReply::Rows(vec![update_row(5, "x", None)]));
	let app = app_with(Some("sk-test"), EmbeddingReply::Malformed, CompletionReply::Echo, store);
	let user_id = uuid::Uuid::new_v4();
	let (status, body) = send(
		app,
		post_json(
			"/updates",
			serde_json::json!({ "user_id": user_id, "content": "Closed the audit." }),
		),
	)
	.await;

	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(body["id"], 5);
	assert_eq!(body["content"], "Closed the audit.");
	assert_eq!(body["user_id"], user_id.to_string());
}

#[tokio::test]
async fn update_storage_errors_map_to_status_codes() {
	let cases = [
		(StoreReply::Unconfigured, StatusCode::SERVICE_UNAVAILABLE, "storage_unconfigured"),
		(StoreReply::Status(400), StatusCode::BAD_GATEWAY, "storage_error"),
	];

	for (insert, expected_status, expected_code) in cases {
		let store = default_store().with_insert(insert);
		let app =
			app_with(Some("sk-test"), EmbeddingReply::Malformed, CompletionReply::Echo, store);
		let (status, body) = send(
			app,
			post_json(
				"/updates",
				serde_json::json!({ "user_id": uuid::Uuid::new_v4(), "content": "Closed the audit." }),
			),
		)
		.await;

		assert_eq!(status, expected_status);
		assert_eq!(body["error_code"], expected_code);
	}
}

#[tokio::test]
async fn update_payload_must_carry_a_uuid() {
	let app = app_with(None, EmbeddingReply::Malformed, CompletionReply::Echo, default_store());
	let (status, body) = send(
		app,
		post_json("/updates", serde_json::json!({ "user_id": "nobody", "content": "hi" })),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error_code"], "invalid_request");
}

#[test]
fn cors_layer_accepts_origin_lists() {
	let _ = routes::cors_layer(&["*".to_string()]);
	let _ = routes::cors_layer(&["http://localhost:3000".to_string(), "bad\norigin".to_string()]);
}
