use crate::{EzraService, ServiceResult, storage_error};
use ezra_domain::error_codes::ErrorCodeEntity;

const DEFAULT_LIST_LIMIT: u32 = 100;
const MAX_LIST_LIMIT: u32 = 500;

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct ListRequest {
	pub limit: Option<u32>,
	pub offset: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ListResponse {
	pub errors: Vec<ErrorCodeEntity>,
	pub total: u64,
	pub next_offset: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StatsResponse {
	pub error_codes: u64,
	pub documentation: u64,
}

impl EzraService {
	pub async fn list_error_codes(&self, req: ListRequest) -> ServiceResult<ListResponse> {
		let limit = match req.limit {
			None | Some(0) => DEFAULT_LIST_LIMIT,
			Some(limit) => limit.min(MAX_LIST_LIMIT),
		};
		let corpus = self.corpora.error_codes.as_ref();
		let total = corpus.count().await.map_err(storage_error)?;
		let page = corpus.scroll(limit, req.offset.as_deref()).await.map_err(storage_error)?;
		let errors = page
			.records
			.into_iter()
			.map(|record| ErrorCodeEntity::from_metadata(record.id, &record.metadata))
			.collect();

		Ok(ListResponse { errors, total, next_offset: page.next_offset })
	}

	pub async fn stats(&self) -> ServiceResult<StatsResponse> {
		let error_codes = self.corpora.error_codes.count().await.map_err(storage_error)?;
		let documentation = self.corpora.documentation.count().await.map_err(storage_error)?;

		Ok(StatsResponse { error_codes, documentation })
	}
}
