use std::sync::Arc;

use ezra_service::{Corpora, EzraService, VectorCorpus};
use ezra_storage::qdrant::QdrantStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<EzraService>,
}
impl AppState {
	pub async fn new(config: ezra_config::Config) -> color_eyre::Result<Self> {
		let qdrant = &config.storage.qdrant;
		let error_store = QdrantStore::new(qdrant, &qdrant.error_collection)?;
		let doc_store = QdrantStore::new(qdrant, &qdrant.doc_collection)?;

		error_store.ensure_collection().await?;
		doc_store.ensure_collection().await?;

		let embedding_cfg = config.providers.embedding.clone();
		let corpora = Corpora {
			error_codes: Arc::new(VectorCorpus::new(error_store, embedding_cfg.clone())),
			documentation: Arc::new(VectorCorpus::new(doc_store, embedding_cfg)),
		};
		let service = EzraService::new(config, corpora);

		Ok(Self { service: Arc::new(service) })
	}

	pub fn with_service(service: EzraService) -> Self {
		Self { service: Arc::new(service) }
	}
}
