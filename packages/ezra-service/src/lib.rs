pub mod corpus;
pub mod docs;
pub mod ingest;
pub mod list;
pub mod query;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

pub use corpus::VectorCorpus;
pub use docs::{DocumentationIngestRequest, DocumentationSearchRequest, DocumentationSearchResponse};
pub use ingest::{IngestReport, MarkdownIngestRequest};
pub use list::{ListRequest, ListResponse, StatsResponse};
pub use query::{QueryRequest, QueryResponse};

use ezra_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
pub use ezra_domain::{docs::DocumentationChunk, error_codes::ErrorCodeEntity};
use ezra_providers::{embedding, generator};
pub use ezra_storage::models::{CorpusRecord, ScrollPage};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The corpus capability surface consumed by the engine. Constructor-injected
/// so tests can substitute an in-memory fake for the vector store.
pub trait CorpusStore
where
	Self: Send + Sync,
{
	fn upsert<'a>(&'a self, records: &'a [CorpusRecord]) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn fetch<'a>(
		&'a self,
		ids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<CorpusRecord>>>;

	fn find_by_field<'a>(
		&'a self,
		field: &'a str,
		value: &'a str,
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<CorpusRecord>>>;

	fn scroll<'a>(
		&'a self,
		limit: u32,
		offset: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<ScrollPage>>;

	fn query<'a>(
		&'a self,
		text: &'a str,
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<CorpusRecord>>>;

	fn count<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<u64>>;
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait AnswerProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidRequest { message: String },
	Storage { message: String },
	Provider { message: String },
}

#[derive(Clone)]
pub struct Corpora {
	pub error_codes: Arc<dyn CorpusStore>,
	pub documentation: Arc<dyn CorpusStore>,
}

pub struct EzraService {
	pub cfg: Config,
	pub corpora: Corpora,
	pub generator: Arc<dyn AnswerProvider>,
}

struct DefaultProviders;

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::Storage { message } => write!(f, "Storage error: {message}"),
			Self::Provider { message } => write!(f, "Provider error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl AnswerProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(generator::generate(cfg, messages))
	}
}

impl EzraService {
	pub fn new(cfg: Config, corpora: Corpora) -> Self {
		Self { cfg, corpora, generator: Arc::new(DefaultProviders) }
	}

	pub fn with_generator(cfg: Config, corpora: Corpora, generator: Arc<dyn AnswerProvider>) -> Self {
		Self { cfg, corpora, generator }
	}
}

pub fn default_embedding_provider() -> Arc<dyn EmbeddingProvider> {
	Arc::new(DefaultProviders)
}

pub(crate) fn storage_error(err: color_eyre::Report) -> ServiceError {
	ServiceError::Storage { message: err.to_string() }
}
