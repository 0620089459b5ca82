use std::sync::Arc;

use color_eyre::eyre;

use crate::{BoxFuture, CorpusRecord, CorpusStore, EmbeddingProvider, ScrollPage};
use ezra_config::EmbeddingProviderConfig;
use ezra_storage::qdrant::QdrantStore;

/// Production corpus store: embeds documents and queries through the
/// configured provider, then drives Qdrant. One instance per collection.
pub struct VectorCorpus {
	store: QdrantStore,
	embedding_cfg: EmbeddingProviderConfig,
	embedding: Arc<dyn EmbeddingProvider>,
}

impl VectorCorpus {
	pub fn new(store: QdrantStore, embedding_cfg: EmbeddingProviderConfig) -> Self {
		Self::with_embedding(store, embedding_cfg, crate::default_embedding_provider())
	}

	pub fn with_embedding(
		store: QdrantStore,
		embedding_cfg: EmbeddingProviderConfig,
		embedding: Arc<dyn EmbeddingProvider>,
	) -> Self {
		Self { store, embedding_cfg, embedding }
	}

	async fn embed_checked(&self, texts: &[String]) -> color_eyre::Result<Vec<Vec<f32>>> {
		let vectors = self.embedding.embed(&self.embedding_cfg, texts).await?;

		if vectors.len() != texts.len() {
			return Err(eyre::eyre!(
				"Embedding provider returned {} vectors for {} texts.",
				vectors.len(),
				texts.len()
			));
		}
		for vector in &vectors {
			if vector.len() != self.store.vector_dim as usize {
				return Err(eyre::eyre!(
					"Embedding dimension {} does not match configured vector_dim {}.",
					vector.len(),
					self.store.vector_dim
				));
			}
		}

		Ok(vectors)
	}
}

impl CorpusStore for VectorCorpus {
	fn upsert<'a>(&'a self, records: &'a [CorpusRecord]) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			let texts = records.iter().map(|record| record.document.clone()).collect::<Vec<_>>();
			let vectors = self.embed_checked(&texts).await?;

			self.store.upsert(records, vectors).await?;

			Ok(())
		})
	}

	fn fetch<'a>(
		&'a self,
		ids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<CorpusRecord>>> {
		Box::pin(async move { Ok(self.store.fetch(ids).await?) })
	}

	fn find_by_field<'a>(
		&'a self,
		field: &'a str,
		value: &'a str,
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<CorpusRecord>>> {
		Box::pin(async move { Ok(self.store.find_by_field(field, value, limit).await?) })
	}

	fn scroll<'a>(
		&'a self,
		limit: u32,
		offset: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<ScrollPage>> {
		Box::pin(async move { Ok(self.store.scroll(limit, offset).await?) })
	}

	fn query<'a>(
		&'a self,
		text: &'a str,
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<CorpusRecord>>> {
		Box::pin(async move {
			let vectors = self.embed_checked(&[text.to_string()]).await?;
			let Some(vector) = vectors.into_iter().next() else {
				return Err(eyre::eyre!("Embedding provider returned no vectors."));
			};

			Ok(self.store.nearest(vector, u64::from(limit)).await?)
		})
	}

	fn count<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<u64>> {
		Box::pin(async move { Ok(self.store.count().await?) })
	}
}
