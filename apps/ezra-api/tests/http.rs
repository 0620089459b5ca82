use std::sync::Arc;

use axum::{
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::Map;
use tower::util::ServiceExt;

use ezra_api::{routes, state::AppState};
use ezra_config::{
	Config, EmbeddingProviderConfig, Ingest, LlmProviderConfig, Providers, Qdrant, Search,
	Security, Service, Storage,
};
use ezra_service::{Corpora, EzraService};
use ezra_testkit::{MemoryCorpus, RecordingGenerator};

fn test_config(api_auth_token: Option<&str>) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage {
			qdrant: Qdrant {
				url: "http://127.0.0.1:6334".to_string(),
				error_collection: "ezviz_error_codes_test".to_string(),
				doc_collection: "ezviz_documentation_test".to_string(),
				vector_dim: 8,
			},
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "test".to_string(),
				dimensions: 8,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			llm: LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "test".to_string(),
				temperature: 0.1,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		ingest: Ingest { batch_size: 100 },
		search: Search { default_top_k: 5, max_top_k: 20 },
		security: Security {
			bind_localhost_only: true,
			api_auth_token: api_auth_token.map(str::to_string),
		},
	}
}

fn test_state(api_auth_token: Option<&str>) -> AppState {
	let corpora = Corpora {
		error_codes: Arc::new(MemoryCorpus::new()),
		documentation: Arc::new(MemoryCorpus::new()),
	};
	let service = EzraService::with_generator(
		test_config(api_auth_token),
		corpora,
		Arc::new(RecordingGenerator::new("stub answer")),
	);

	AppState::with_service(service)
}

fn json_request(method: &str, uri: &str, payload: &serde_json::Value) -> Request<Body> {
	Request::builder()
		.method(method)
		.uri(uri)
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&bytes).expect("Failed to parse response body.")
}

#[tokio::test]
async fn health_ok() {
	let app = routes::router(test_state(None));
	let response = app
		.oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn query_returns_answer_and_sources() {
	let app = routes::router(test_state(None));
	let payload = serde_json::json!({ "query": "camera offline", "top_k": 3 });
	let response =
		app.oneshot(json_request("POST", "/v1/query", &payload)).await.expect("query failed");

	assert_eq!(response.status(), StatusCode::OK);

	let json = json_body(response).await;

	assert_eq!(json["answer"], "stub answer");
	assert_eq!(json["sources"], serde_json::json!([]));
}

#[tokio::test]
async fn ingest_then_exact_lookup_round_trips() {
	let app = routes::router(test_state(None));
	let payload = serde_json::json!([{
		"moduleCode": "",
		"detailCode": "120002",
		"description": "device offline",
		"solution": "power cycle the device",
		"updateTime": 1_700_000_000_i64,
	}]);
	let response = app
		.clone()
		.oneshot(json_request("POST", "/v1/ingest/error_codes", &payload))
		.await
		.expect("ingest failed");

	assert_eq!(response.status(), StatusCode::OK);

	let report = json_body(response).await;

	assert_eq!(report["success"], true);
	assert_eq!(report["count"], 1);

	let found = app
		.clone()
		.oneshot(
			Request::builder()
				.uri("/v1/error_codes/120002")
				.body(Body::empty())
				.expect("request"),
		)
		.await
		.expect("lookup failed");

	assert_eq!(found.status(), StatusCode::OK);

	let entity = json_body(found).await;

	assert_eq!(entity["id"], "120002");
	assert_eq!(entity["category"], "device");

	let missing = app
		.oneshot(
			Request::builder()
				.uri("/v1/error_codes/999999")
				.body(Body::empty())
				.expect("request"),
		)
		.await
		.expect("lookup failed");

	assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_ingest_payload_is_a_bad_request() {
	let app = routes::router(test_state(None));
	let payload = serde_json::json!([{ "detailCode": "120002" }]);
	let response = app
		.oneshot(json_request("POST", "/v1/ingest/error_codes", &payload))
		.await
		.expect("ingest failed");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let json = json_body(response).await;

	assert_eq!(json["error_code"], "invalid_request");
}

#[tokio::test]
async fn missing_api_key_is_unauthorized() {
	let app = routes::router(test_state(Some("secret")));
	let health = app
		.clone()
		.oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
		.await
		.expect("health failed");

	assert_eq!(health.status(), StatusCode::OK);

	let response = app
		.oneshot(Request::builder().uri("/v1/stats").body(Body::empty()).expect("request"))
		.await
		.expect("stats failed");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

	let json = json_body(response).await;

	assert_eq!(json["error_code"], "missing_api_key");
}

#[tokio::test]
async fn wrong_api_key_is_forbidden() {
	let app = routes::router(test_state(Some("secret")));
	let response = app
		.oneshot(
			Request::builder()
				.uri("/v1/stats")
				.header("x-api-key", "not-the-secret")
				.body(Body::empty())
				.expect("request"),
		)
		.await
		.expect("stats failed");

	assert_eq!(response.status(), StatusCode::FORBIDDEN);

	let json = json_body(response).await;

	assert_eq!(json["error_code"], "invalid_api_key");
}

#[tokio::test]
async fn valid_api_key_passes_the_guard() {
	let app = routes::router(test_state(Some("secret")));
	let response = app
		.oneshot(
			Request::builder()
				.uri("/v1/stats")
				.header("x-api-key", "secret")
				.body(Body::empty())
				.expect("request"),
		)
		.await
		.expect("stats failed");

	assert_eq!(response.status(), StatusCode::OK);

	let json = json_body(response).await;

	assert_eq!(json["error_codes"], 0);
	assert_eq!(json["documentation"], 0);
}
