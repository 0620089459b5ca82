use crate::{EzraService, ServiceError, ServiceResult, query::resolve_top_k, storage_error};
use ezra_domain::docs::{DocumentationChunk, DocumentationMetadata};

#[derive(Clone, Debug, serde::Deserialize)]
pub struct DocumentationIngestRequest {
	pub chunks: Vec<DocumentationChunk>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DocumentationSearchRequest {
	pub query: String,
	pub top_k: Option<u32>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DocumentationSearchResponse {
	pub chunks: Vec<DocumentationChunk>,
}

impl EzraService {
	/// Documentation has no exact-match branch; every query is semantic.
	pub async fn search_documentation(
		&self,
		req: DocumentationSearchRequest,
	) -> ServiceResult<DocumentationSearchResponse> {
		if req.query.trim().is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "query must be non-empty.".to_string(),
			});
		}

		let top_k = resolve_top_k(&self.cfg, req.top_k)?;
		let records = self
			.corpora
			.documentation
			.query(&req.query, top_k)
			.await
			.map_err(storage_error)?;
		let chunks = records
			.into_iter()
			.map(|record| DocumentationChunk {
				id: record.id,
				text: record.document,
				metadata: DocumentationMetadata::from_map(&record.metadata),
			})
			.collect();

		Ok(DocumentationSearchResponse { chunks })
	}
}
