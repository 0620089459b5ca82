use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{category, codes};

/// Ingestion wire format. Field names follow the upstream EZVIZ export.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawErrorCode {
	pub module_code: String,
	pub detail_code: String,
	pub description: String,
	pub solution: String,
	pub update_time: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorCodeEntity {
	pub id: String,
	pub code: String,
	pub module_code: String,
	pub description: String,
	pub solution: String,
	pub category: String,
}

#[derive(Clone, Debug)]
pub struct NormalizedBatch {
	pub entities: Vec<ErrorCodeEntity>,
	pub skipped_blank_codes: usize,
}

impl ErrorCodeEntity {
	pub fn from_raw(raw: &RawErrorCode) -> Self {
		Self {
			id: codes::entity_id(&raw.module_code, &raw.detail_code),
			code: raw.detail_code.clone(),
			module_code: raw.module_code.clone(),
			description: raw.description.clone(),
			solution: raw.solution.clone(),
			category: category::categorize(&raw.description, &raw.solution).to_string(),
		}
	}

	/// The text embedded by the corpus store.
	pub fn document_text(&self) -> String {
		format!("Error {}: {} {}", self.code, self.description, self.solution)
	}

	pub fn metadata(&self) -> Map<String, Value> {
		let mut map = Map::new();

		map.insert("code".to_string(), Value::String(self.code.clone()));
		map.insert("module_code".to_string(), Value::String(self.module_code.clone()));
		map.insert("description".to_string(), Value::String(self.description.clone()));
		map.insert("solution".to_string(), Value::String(self.solution.clone()));
		map.insert("category".to_string(), Value::String(self.category.clone()));

		map
	}

	pub fn from_metadata(id: String, metadata: &Map<String, Value>) -> Self {
		let field = |key: &str| {
			metadata.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
		};

		Self {
			id,
			code: field("code"),
			module_code: field("module_code"),
			description: field("description"),
			solution: field("solution"),
			category: field("category"),
		}
	}
}

/// Validate and canonicalize a raw ingestion payload.
///
/// Validation is all-or-nothing: any malformed record fails the whole batch.
/// Records whose detail code is blank after trimming are dropped per record
/// and counted, which is expected input noise rather than an error.
pub fn normalize_error_codes(raw: Value) -> Result<NormalizedBatch, serde_json::Error> {
	let records: Vec<RawErrorCode> = serde_json::from_value(raw)?;
	let total = records.len();
	let kept: Vec<RawErrorCode> =
		records.into_iter().filter(|record| !record.detail_code.trim().is_empty()).collect();
	let skipped_blank_codes = total - kept.len();
	let entities = kept.iter().map(ErrorCodeEntity::from_raw).collect();

	Ok(NormalizedBatch { entities, skipped_blank_codes })
}

#[cfg(test)]
mod tests {
	use super::*;

	fn raw(module_code: &str, detail_code: &str) -> serde_json::Value {
		serde_json::json!({
			"moduleCode": module_code,
			"detailCode": detail_code,
			"description": "network timeout",
			"solution": "retry later",
			"updateTime": 1_700_000_000_i64,
		})
	}

	#[test]
	fn normalization_is_deterministic() {
		let payload = serde_json::Value::Array(vec![raw("10002", "120002")]);
		let first = normalize_error_codes(payload.clone()).expect("normalize failed");
		let second = normalize_error_codes(payload).expect("normalize failed");

		assert_eq!(first.entities, second.entities);
		assert_eq!(first.entities[0].id, "10002_120002");
		assert_eq!(first.entities[0].category, "network");
	}

	#[test]
	fn malformed_record_fails_the_whole_batch() {
		let payload = serde_json::json!([
			{ "moduleCode": "10002", "detailCode": "120002" }
		]);

		assert!(normalize_error_codes(payload).is_err());
	}

	#[test]
	fn blank_detail_codes_are_dropped_per_record() {
		let payload = serde_json::Value::Array(vec![raw("10002", "120002"), raw("10002", "   ")]);
		let batch = normalize_error_codes(payload).expect("normalize failed");

		assert_eq!(batch.entities.len(), 1);
		assert_eq!(batch.skipped_blank_codes, 1);
	}

	#[test]
	fn metadata_round_trips() {
		let payload = serde_json::Value::Array(vec![raw("10002", "120002")]);
		let batch = normalize_error_codes(payload).expect("normalize failed");
		let entity = &batch.entities[0];
		let restored = ErrorCodeEntity::from_metadata(entity.id.clone(), &entity.metadata());

		assert_eq!(&restored, entity);
	}
}
