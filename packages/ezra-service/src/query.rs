use serde_json::Value;

use crate::{EzraService, ServiceError, ServiceResult, storage_error};
use ezra_domain::{codes, error_codes::ErrorCodeEntity};

const SYSTEM_PROMPT: &str = "You are an EZVIZ technical support assistant. \
If the user asks anything that is not about error codes, camera integration \
or EZVIZ technical documentation, respond only with: 'Sorry, I can only help \
with the EZVIZ SDK.' and end the response.
Your role is to help users troubleshoot EZVIZ SDK error codes.

Given the user's query and relevant error codes from the database, provide:
1. A clear explanation of what the error means
2. Step-by-step troubleshooting instructions
3. Any relevant context about the error category

Always be helpful and concise. If the error codes don't seem relevant to the \
query, say so and suggest what the user might be looking for.

Respond in the same language as the user's query.";

const EMPTY_CONTEXT: &str = "No relevant error codes found.";

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct QueryRequest {
	pub query: String,
	pub top_k: Option<u32>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct QueryResponse {
	pub answer: String,
	pub sources: Vec<ErrorCodeEntity>,
}

impl EzraService {
	/// Hybrid retrieval: code-shaped queries try the exact lookups first and,
	/// on a hit, return that single entity without touching semantic search.
	/// Everything else, including code-shaped misses, goes nearest-neighbor.
	pub async fn retrieve(
		&self,
		query_text: &str,
		top_k: u32,
	) -> ServiceResult<Vec<ErrorCodeEntity>> {
		let trimmed = query_text.trim();

		if codes::looks_like_code(trimmed) {
			tracing::debug!(code = trimmed, "Query looks like an error code. Trying exact lookup.");

			if let Some(entity) = self.lookup_error_code(trimmed).await? {
				tracing::debug!(code = trimmed, "Exact match found. Skipping semantic search.");

				return Ok(vec![entity]);
			}

			tracing::debug!(code = trimmed, "No exact match. Falling back to semantic search.");
		}

		let records = self
			.corpora
			.error_codes
			.query(query_text, top_k)
			.await
			.map_err(storage_error)?;

		Ok(records
			.into_iter()
			.map(|record| ErrorCodeEntity::from_metadata(record.id, &record.metadata))
			.collect())
	}

	/// Exact lookup: primary id first, then the non-unique `code` metadata
	/// field (primary ids may be module-prefixed while users pass the bare
	/// code). Secondary lookup returns the first match among several.
	pub async fn lookup_error_code(&self, code: &str) -> ServiceResult<Option<ErrorCodeEntity>> {
		let corpus = self.corpora.error_codes.as_ref();
		let mut records = corpus.fetch(&[code.to_string()]).await.map_err(storage_error)?;

		if records.is_empty() {
			records = corpus.find_by_field("code", code, 1).await.map_err(storage_error)?;
		}

		Ok(records
			.into_iter()
			.next()
			.map(|record| ErrorCodeEntity::from_metadata(record.id, &record.metadata)))
	}

	/// Retrieve evidence and synthesize an answer. An empty evidence set is
	/// valid; the synthesizer still runs with the empty-context prompt.
	pub async fn answer(&self, req: QueryRequest) -> ServiceResult<QueryResponse> {
		if req.query.trim().is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "query must be non-empty.".to_string(),
			});
		}

		let top_k = resolve_top_k(&self.cfg, req.top_k)?;
		let sources = self.retrieve(&req.query, top_k).await?;
		let messages = build_messages(&req.query, &sources);
		let answer = self
			.generator
			.generate(&self.cfg.providers.llm, &messages)
			.await
			.map_err(|err| ServiceError::Provider { message: err.to_string() })?;

		Ok(QueryResponse { answer, sources })
	}
}

pub(crate) fn resolve_top_k(cfg: &ezra_config::Config, requested: Option<u32>) -> ServiceResult<u32> {
	let top_k = requested.unwrap_or(cfg.search.default_top_k);

	if top_k == 0 || top_k > cfg.search.max_top_k {
		return Err(ServiceError::InvalidRequest {
			message: format!("top_k must be in the range 1..={}.", cfg.search.max_top_k),
		});
	}

	Ok(top_k)
}

fn build_messages(query: &str, sources: &[ErrorCodeEntity]) -> Vec<Value> {
	let context = build_context(sources);

	vec![
		serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
		serde_json::json!({
			"role": "user",
			"content": format!("## Retrieved Error Codes:\n{context}\n\n## User Query:\n{query}"),
		}),
	]
}

fn build_context(sources: &[ErrorCodeEntity]) -> String {
	if sources.is_empty() {
		return EMPTY_CONTEXT.to_string();
	}

	sources
		.iter()
		.enumerate()
		.map(|(index, entity)| {
			format!(
				"[{}] Code: {}\nDescription: {}\nSolution: {}\nCategory: {}",
				index + 1,
				entity.code,
				entity.description,
				entity.solution,
				entity.category
			)
		})
		.collect::<Vec<_>>()
		.join("\n\n")
}
