use std::collections::HashMap;

use qdrant_client::{
	client::Payload,
	qdrant::{
		Condition, CountPointsBuilder, CreateCollectionBuilder, Distance, Filter,
		GetPointsBuilder, PointId, PointStruct, Query, QueryPointsBuilder, RetrievedPoint,
		ScoredPoint, ScrollPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder,
		point_id::PointIdOptions, value::Kind,
	},
};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::{
	Result,
	models::{CorpusRecord, ScrollPage},
};

/// Payload keys reserved for the record envelope; everything else in the
/// payload is caller metadata.
pub const RECORD_ID_KEY: &str = "record_id";
pub const DOCUMENT_KEY: &str = "document";

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &ezra_config::Qdrant, collection: &str) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: collection.to_string(), vector_dim: cfg.vector_dim })
	}

	/// Explicit initialize step: create the collection iff it does not exist.
	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(&self.collection).await? {
			return Ok(());
		}

		self.client
			.create_collection(CreateCollectionBuilder::new(self.collection.clone()).vectors_config(
				VectorParamsBuilder::new(u64::from(self.vector_dim), Distance::Cosine),
			))
			.await?;

		Ok(())
	}

	pub async fn upsert(&self, records: &[CorpusRecord], vectors: Vec<Vec<f32>>) -> Result<()> {
		let points = records
			.iter()
			.zip(vectors)
			.map(|(record, vector)| record_point(record, vector))
			.collect::<Vec<_>>();
		let request = UpsertPointsBuilder::new(self.collection.clone(), points).wait(true);

		self.client.upsert_points(request).await?;

		Ok(())
	}

	pub async fn fetch(&self, ids: &[String]) -> Result<Vec<CorpusRecord>> {
		let point_ids = ids.iter().map(|id| point_id(id)).collect::<Vec<_>>();
		let request =
			GetPointsBuilder::new(self.collection.clone(), point_ids).with_payload(true);
		let response = self.client.get_points(request).await?;

		Ok(response.result.into_iter().filter_map(retrieved_to_record).collect())
	}

	pub async fn find_by_field(
		&self,
		field: &str,
		value: &str,
		limit: u32,
	) -> Result<Vec<CorpusRecord>> {
		let filter = Filter::must([Condition::matches(field, value.to_string())]);
		let request = ScrollPointsBuilder::new(self.collection.clone())
			.filter(filter)
			.limit(limit)
			.with_payload(true);
		let response = self.client.scroll(request).await?;

		Ok(response.result.into_iter().filter_map(retrieved_to_record).collect())
	}

	pub async fn scroll(&self, limit: u32, offset: Option<&str>) -> Result<ScrollPage> {
		let mut request =
			ScrollPointsBuilder::new(self.collection.clone()).limit(limit).with_payload(true);

		if let Some(offset) = offset {
			request = request.offset(PointId::from(offset.to_string()));
		}

		let response = self.client.scroll(request).await?;
		let next_offset = response.next_page_offset.and_then(offset_cursor);
		let records = response.result.into_iter().filter_map(retrieved_to_record).collect();

		Ok(ScrollPage { records, next_offset })
	}

	pub async fn count(&self) -> Result<u64> {
		let request = CountPointsBuilder::new(self.collection.clone()).exact(true);
		let response = self.client.count(request).await?;

		Ok(response.result.map(|result| result.count).unwrap_or_default())
	}

	pub async fn nearest(&self, vector: Vec<f32>, limit: u64) -> Result<Vec<CorpusRecord>> {
		let request = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.limit(limit)
			.with_payload(true);
		let response = self.client.query(request).await?;

		Ok(response.result.into_iter().filter_map(scored_to_record).collect())
	}
}

/// Qdrant point ids must be UUIDs; external string ids map onto stable v5
/// ids and travel in the payload.
pub fn point_id(record_id: &str) -> PointId {
	PointId::from(Uuid::new_v5(&Uuid::NAMESPACE_OID, record_id.as_bytes()).to_string())
}

fn record_point(record: &CorpusRecord, vector: Vec<f32>) -> PointStruct {
	let mut payload_map = HashMap::new();

	payload_map.insert(RECORD_ID_KEY.to_string(), Value::from(record.id.clone()));
	payload_map.insert(DOCUMENT_KEY.to_string(), Value::from(record.document.clone()));
	for (key, value) in &record.metadata {
		payload_map.insert(key.clone(), Value::from(value.clone()));
	}

	PointStruct::new(point_id(&record.id), vector, Payload::from(payload_map))
}

fn retrieved_to_record(point: RetrievedPoint) -> Option<CorpusRecord> {
	record_from_payload(point.payload)
}

fn scored_to_record(point: ScoredPoint) -> Option<CorpusRecord> {
	record_from_payload(point.payload)
}

fn record_from_payload(payload: HashMap<String, Value>) -> Option<CorpusRecord> {
	let mut id = None;
	let mut document = String::new();
	let mut metadata = Map::new();

	for (key, value) in payload {
		let json = value_to_json(value);

		match key.as_str() {
			RECORD_ID_KEY => id = json.as_str().map(|value| value.to_string()),
			DOCUMENT_KEY => document = json.as_str().unwrap_or_default().to_string(),
			_ => {
				metadata.insert(key, json);
			},
		}
	}

	Some(CorpusRecord { id: id?, document, metadata })
}

fn offset_cursor(point_id: PointId) -> Option<String> {
	match point_id.point_id_options {
		Some(PointIdOptions::Uuid(value)) => Some(value),
		Some(PointIdOptions::Num(value)) => Some(value.to_string()),
		None => None,
	}
}

fn value_to_json(value: Value) -> JsonValue {
	match value.kind {
		Some(Kind::BoolValue(value)) => JsonValue::Bool(value),
		Some(Kind::IntegerValue(value)) => JsonValue::from(value),
		Some(Kind::DoubleValue(value)) => JsonValue::from(value),
		Some(Kind::StringValue(value)) => JsonValue::String(value),
		Some(Kind::ListValue(list)) =>
			JsonValue::Array(list.values.into_iter().map(value_to_json).collect()),
		Some(Kind::StructValue(fields)) => JsonValue::Object(
			fields.fields.into_iter().map(|(key, value)| (key, value_to_json(value))).collect(),
		),
		Some(Kind::NullValue(_)) | None => JsonValue::Null,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn point_ids_are_stable_per_record_id() {
		assert_eq!(point_id("10002_120002"), point_id("10002_120002"));
		assert_ne!(point_id("10002_120002"), point_id("120002"));
	}

	#[test]
	fn payload_round_trips_record_fields() {
		let mut metadata = Map::new();

		metadata.insert("code".to_string(), JsonValue::String("120002".to_string()));

		let record = CorpusRecord {
			id: "10002_120002".to_string(),
			document: "Error 120002: device offline retry".to_string(),
			metadata,
		};
		let point = record_point(&record, vec![0.0, 1.0]);
		let restored = record_from_payload(point.payload).expect("payload missing record id");

		assert_eq!(restored, record);
	}
}
