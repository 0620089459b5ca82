use std::{
	env,
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use color_eyre::eyre;
use serde_json::Value;
use uuid::Uuid;

use ezra_service::{
	AnswerProvider, BoxFuture, CorpusRecord, CorpusStore, EmbeddingProvider, ScrollPage,
};

/// Insertion-ordered in-memory corpus store. Queries rank by naive term
/// overlap with insertion order as the tie breaker, which keeps test
/// expectations deterministic.
pub struct MemoryCorpus {
	records: Mutex<Vec<CorpusRecord>>,
	upsert_calls: AtomicUsize,
	fetch_calls: AtomicUsize,
	query_calls: AtomicUsize,
	fail_upserts_from: AtomicUsize,
}

impl Default for MemoryCorpus {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryCorpus {
	pub fn new() -> Self {
		Self {
			records: Mutex::new(Vec::new()),
			upsert_calls: AtomicUsize::new(0),
			fetch_calls: AtomicUsize::new(0),
			query_calls: AtomicUsize::new(0),
			fail_upserts_from: AtomicUsize::new(usize::MAX),
		}
	}

	/// Make every upsert call from the given 1-based call number fail.
	pub fn fail_upserts_from(&self, call_number: usize) {
		self.fail_upserts_from.store(call_number, Ordering::SeqCst);
	}

	pub fn clear_failures(&self) {
		self.fail_upserts_from.store(usize::MAX, Ordering::SeqCst);
	}

	pub fn upsert_calls(&self) -> usize {
		self.upsert_calls.load(Ordering::SeqCst)
	}

	pub fn fetch_calls(&self) -> usize {
		self.fetch_calls.load(Ordering::SeqCst)
	}

	pub fn query_calls(&self) -> usize {
		self.query_calls.load(Ordering::SeqCst)
	}

	pub fn len(&self) -> usize {
		self.records.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn insert(&self, record: CorpusRecord) {
		let mut records = self.records.lock().unwrap_or_else(|err| err.into_inner());

		upsert_record(&mut records, record);
	}
}

impl CorpusStore for MemoryCorpus {
	fn upsert<'a>(&'a self, batch: &'a [CorpusRecord]) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			let call = self.upsert_calls.fetch_add(1, Ordering::SeqCst) + 1;

			if call >= self.fail_upserts_from.load(Ordering::SeqCst) {
				return Err(eyre::eyre!("Injected upsert failure on call {call}."));
			}

			let mut records = self.records.lock().unwrap_or_else(|err| err.into_inner());

			for record in batch {
				upsert_record(&mut records, record.clone());
			}

			Ok(())
		})
	}

	fn fetch<'a>(
		&'a self,
		ids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<CorpusRecord>>> {
		Box::pin(async move {
			self.fetch_calls.fetch_add(1, Ordering::SeqCst);

			let records = self.records.lock().unwrap_or_else(|err| err.into_inner());

			Ok(records.iter().filter(|record| ids.contains(&record.id)).cloned().collect())
		})
	}

	fn find_by_field<'a>(
		&'a self,
		field: &'a str,
		value: &'a str,
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<CorpusRecord>>> {
		Box::pin(async move {
			let records = self.records.lock().unwrap_or_else(|err| err.into_inner());

			Ok(records
				.iter()
				.filter(|record| {
					record.metadata.get(field).and_then(Value::as_str) == Some(value)
				})
				.take(limit as usize)
				.cloned()
				.collect())
		})
	}

	fn scroll<'a>(
		&'a self,
		limit: u32,
		offset: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<ScrollPage>> {
		Box::pin(async move {
			let records = self.records.lock().unwrap_or_else(|err| err.into_inner());
			let start = offset.and_then(|cursor| cursor.parse::<usize>().ok()).unwrap_or(0);
			let end = (start + limit as usize).min(records.len());
			let page = records.get(start..end).unwrap_or_default().to_vec();
			let next_offset = (end < records.len()).then(|| end.to_string());

			Ok(ScrollPage { records: page, next_offset })
		})
	}

	fn query<'a>(
		&'a self,
		text: &'a str,
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<CorpusRecord>>> {
		Box::pin(async move {
			self.query_calls.fetch_add(1, Ordering::SeqCst);

			let records = self.records.lock().unwrap_or_else(|err| err.into_inner());
			let needle = text.to_lowercase();
			let terms = needle.split_whitespace().collect::<Vec<_>>();
			let mut scored = records
				.iter()
				.map(|record| {
					let haystack = record.document.to_lowercase();
					let score =
						terms.iter().filter(|term| haystack.contains(**term)).count();

					(score, record.clone())
				})
				.collect::<Vec<_>>();

			scored.sort_by(|a, b| b.0.cmp(&a.0));

			Ok(scored.into_iter().take(limit as usize).map(|(_, record)| record).collect())
		})
	}

	fn count<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<u64>> {
		Box::pin(async move {
			let records = self.records.lock().unwrap_or_else(|err| err.into_inner());

			Ok(records.len() as u64)
		})
	}
}

fn upsert_record(records: &mut Vec<CorpusRecord>, record: CorpusRecord) {
	if let Some(existing) = records.iter_mut().find(|existing| existing.id == record.id) {
		*existing = record;
	} else {
		records.push(record);
	}
}

/// Deterministic embedding stub: vectors derive from the text bytes alone.
pub struct StubEmbedding {
	pub vector_dim: u32,
}

impl EmbeddingProvider for StubEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a ezra_config::EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			Ok(texts
				.iter()
				.map(|text| {
					let seed = text
						.bytes()
						.fold(0_u64, |acc, byte| acc.wrapping_mul(31).wrapping_add(u64::from(byte)));

					(0..self.vector_dim)
						.map(|index| (((seed >> (index % 17)) & 0xff) as f32) / 255.0)
						.collect()
				})
				.collect())
		})
	}
}

/// Answer provider stub that records every prompt it receives.
#[derive(Default)]
pub struct RecordingGenerator {
	pub answer: String,
	calls: AtomicUsize,
	prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
	pub fn new(answer: &str) -> Self {
		Self { answer: answer.to_string(), ..Self::default() }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn prompts(&self) -> Vec<String> {
		self.prompts.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}

impl AnswerProvider for RecordingGenerator {
	fn generate<'a>(
		&'a self,
		_cfg: &'a ezra_config::LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let user_content = messages
				.last()
				.and_then(|message| message.get("content"))
				.and_then(Value::as_str)
				.unwrap_or_default()
				.to_string();

			self.prompts.lock().unwrap_or_else(|err| err.into_inner()).push(user_content);

			Ok(self.answer.clone())
		})
	}
}

/// Answer provider stub that always fails.
pub struct FailingGenerator;

impl AnswerProvider for FailingGenerator {
	fn generate<'a>(
		&'a self,
		_cfg: &'a ezra_config::LlmProviderConfig,
		_messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(async move { Err(eyre::eyre!("Injected generation failure.")) })
	}
}

pub fn env_qdrant_url() -> Option<String> {
	env::var("EZRA_QDRANT_URL").ok()
}

pub fn unique_collection(prefix: &str) -> String {
	format!("{prefix}_{}", Uuid::new_v4().simple())
}

pub async fn drop_collection(url: &str, collection: &str) -> color_eyre::Result<()> {
	let client = qdrant_client::Qdrant::from_url(url).build()?;

	client.delete_collection(collection).await?;

	Ok(())
}
