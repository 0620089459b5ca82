use std::sync::Arc;

use serde_json::Map;

use ezra_config::{
	Config, EmbeddingProviderConfig, Ingest, LlmProviderConfig, Providers, Qdrant, Search,
	Security, Service, Storage,
};
use ezra_service::{Corpora, EzraService, VectorCorpus};
use ezra_storage::qdrant::QdrantStore;
use ezra_testkit::{
	RecordingGenerator, StubEmbedding, drop_collection, env_qdrant_url, unique_collection,
};

const VECTOR_DIM: u32 = 8;

fn test_config(url: &str, error_collection: &str, doc_collection: &str) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage {
			qdrant: Qdrant {
				url: url.to_string(),
				error_collection: error_collection.to_string(),
				doc_collection: doc_collection.to_string(),
				vector_dim: VECTOR_DIM,
			},
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "test".to_string(),
				dimensions: VECTOR_DIM,
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
		ingest: Ingest { batch_size: 2 },
		search: Search { default_top_k: 5, max_top_k: 20 },
		security: Security { bind_localhost_only: true, api_auth_token: None },
	}
}

#[tokio::test]
#[ignore = "Requires external Qdrant. Set EZRA_QDRANT_URL to run."]
async fn qdrant_round_trip_supports_hybrid_retrieval() {
	let Some(url) = env_qdrant_url() else {
		eprintln!("Skipping qdrant_round_trip_supports_hybrid_retrieval; set EZRA_QDRANT_URL.");

		return;
	};
	let error_collection = unique_collection("ezra_acceptance_errors");
	let doc_collection = unique_collection("ezra_acceptance_docs");
	let config = test_config(&url, &error_collection, &doc_collection);
	let error_store = QdrantStore::new(&config.storage.qdrant, &error_collection)
		.expect("Failed to build Qdrant store.");
	let doc_store = QdrantStore::new(&config.storage.qdrant, &doc_collection)
		.expect("Failed to build Qdrant store.");

	error_store.ensure_collection().await.expect("Failed to create error collection.");
	doc_store.ensure_collection().await.expect("Failed to create doc collection.");

	let embedding = Arc::new(StubEmbedding { vector_dim: VECTOR_DIM });
	let embedding_cfg = config.providers.embedding.clone();
	let corpora = Corpora {
		error_codes: Arc::new(VectorCorpus::with_embedding(
			error_store,
			embedding_cfg.clone(),
			embedding.clone(),
		)),
		documentation: Arc::new(VectorCorpus::with_embedding(doc_store, embedding_cfg, embedding)),
	};
	let service =
		EzraService::with_generator(config, corpora, Arc::new(RecordingGenerator::new("ok")));
	let payload = serde_json::json!([
		{
			"moduleCode": "10002",
			"detailCode": "120002",
			"description": "device offline",
			"solution": "power cycle the device",
			"updateTime": 1_700_000_000_i64,
		},
		{
			"moduleCode": "",
			"detailCode": "120006",
			"description": "network timeout",
			"solution": "check the router",
			"updateTime": 1_700_000_000_i64,
		},
		{
			"moduleCode": "",
			"detailCode": "330001",
			"description": "balance overdue",
			"solution": "recharge the plan",
			"updateTime": 1_700_000_000_i64,
		},
	]);
	let report = service.ingest_error_codes(payload).await.expect("Ingest failed.");

	assert!(report.success);
	assert_eq!(report.count, 3);

	let exact = service.retrieve("120002", 5).await.expect("Exact retrieval failed.");

	assert_eq!(exact.len(), 1);
	assert_eq!(exact[0].id, "10002_120002");

	let semantic =
		service.retrieve("connection problems", 2).await.expect("Semantic retrieval failed.");

	assert!(!semantic.is_empty());
	assert!(semantic.len() <= 2);

	let stats = service.stats().await.expect("Stats failed.");

	assert_eq!(stats.error_codes, 3);

	drop_collection(&url, &error_collection).await.expect("Failed to drop error collection.");
	drop_collection(&url, &doc_collection).await.expect("Failed to drop doc collection.");
}
