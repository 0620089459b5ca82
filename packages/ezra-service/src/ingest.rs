use std::collections::HashSet;

use serde_json::Value;

use crate::{CorpusRecord, CorpusStore, EzraService, ServiceError, ServiceResult};
use ezra_domain::{
	docs::DocumentationChunk,
	error_codes::{self, ErrorCodeEntity},
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct IngestReport {
	pub success: bool,
	pub count: u32,
	pub message: String,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct MarkdownIngestRequest {
	pub source: String,
	pub breadcrumb: String,
	pub url: String,
	pub markdown: String,
}

impl EzraService {
	/// Load a raw error-code export into the corpus.
	///
	/// Validation is fail-fast: a malformed record rejects the batch before
	/// anything is written. After that, failures are partial: batches already
	/// upserted stay, and the report says how far the run got. Upserts are
	/// idempotent per id, so rerunning the same payload is safe.
	pub async fn ingest_error_codes(&self, raw: Value) -> ServiceResult<IngestReport> {
		let batch = error_codes::normalize_error_codes(raw).map_err(|err| {
			ServiceError::InvalidRequest { message: format!("Invalid error code payload: {err}.") }
		})?;

		if batch.skipped_blank_codes > 0 {
			tracing::debug!(
				count = batch.skipped_blank_codes,
				"Filtered entries with blank detail codes."
			);
		}

		let total = batch.entities.len();
		let mut seen = HashSet::new();
		let mut unique = Vec::with_capacity(total);

		for entity in batch.entities {
			// First occurrence wins; later duplicates are dropped before any write.
			if seen.insert(entity.id.clone()) {
				unique.push(entity);
			}
		}

		let duplicates = total - unique.len();

		if duplicates > 0 {
			tracing::debug!(count = duplicates, remaining = unique.len(), "Dropped duplicate ids.");
		}

		let records = unique.iter().map(error_code_record).collect::<Vec<_>>();

		self.write_batches(self.corpora.error_codes.as_ref(), &records, "error codes").await
	}

	pub async fn ingest_documentation(
		&self,
		chunks: &[DocumentationChunk],
	) -> ServiceResult<IngestReport> {
		let records = chunks.iter().map(chunk_record).collect::<Vec<_>>();

		self.write_batches(self.corpora.documentation.as_ref(), &records, "documentation chunks")
			.await
	}

	/// Chunk a markdown page server-side, then ingest the resulting chunks.
	pub async fn ingest_markdown(&self, req: MarkdownIngestRequest) -> ServiceResult<IngestReport> {
		if req.url.trim().is_empty() {
			return Err(ServiceError::InvalidRequest { message: "url must be non-empty.".to_string() });
		}
		if req.markdown.trim().is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "markdown must be non-empty.".to_string(),
			});
		}

		let chunks = ezra_chunking::build_chunks(&req.source, &req.breadcrumb, &req.url, &req.markdown);

		self.ingest_documentation(&chunks).await
	}

	/// Sequential batch writes: batch N+1 only starts after batch N settles.
	/// The first failure stops the run; nothing already written is rolled back.
	async fn write_batches(
		&self,
		corpus: &dyn CorpusStore,
		records: &[CorpusRecord],
		label: &str,
	) -> ServiceResult<IngestReport> {
		let total = records.len();
		let batch_size = self.cfg.ingest.batch_size as usize;
		let mut written = 0_usize;

		for batch in records.chunks(batch_size) {
			match corpus.upsert(batch).await {
				Ok(()) => {
					written += batch.len();

					tracing::debug!(written, total, label, "Ingested batch.");
				},
				Err(err) => {
					tracing::error!(error = %err, written, total, label, "Batch write failed. Stopping ingestion.");

					return Ok(IngestReport {
						success: written > 0,
						count: written as u32,
						message: format!("Ingested {written}/{total} {label}. Error: {err}"),
					});
				},
			}
		}

		Ok(IngestReport {
			success: true,
			count: written as u32,
			message: format!("Successfully ingested {written} {label}"),
		})
	}
}

pub(crate) fn error_code_record(entity: &ErrorCodeEntity) -> CorpusRecord {
	CorpusRecord {
		id: entity.id.clone(),
		document: entity.document_text(),
		metadata: entity.metadata(),
	}
}

pub(crate) fn chunk_record(chunk: &DocumentationChunk) -> CorpusRecord {
	CorpusRecord { id: chunk.id.clone(), document: chunk.text.clone(), metadata: chunk.metadata.as_map() }
}
