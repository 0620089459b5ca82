use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentationChunk {
	pub id: String,
	pub text: String,
	pub metadata: DocumentationMetadata,
}

/// Chunk provenance. The corpus store rejects null metadata values, so the
/// optional fields are written as empty strings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentationMetadata {
	pub source: String,
	#[serde(default)]
	pub platform: Option<String>,
	pub title: String,
	pub url: String,
	pub section_path: String,
	#[serde(rename = "type")]
	pub doc_type: String,
	#[serde(default)]
	pub language: Option<String>,
	#[serde(default)]
	pub hash: Option<String>,
	#[serde(default)]
	pub version: Option<String>,
}

impl DocumentationMetadata {
	pub fn as_map(&self) -> Map<String, Value> {
		let optional = |value: &Option<String>| {
			Value::String(value.clone().unwrap_or_default())
		};
		let mut map = Map::new();

		map.insert("source".to_string(), Value::String(self.source.clone()));
		map.insert("platform".to_string(), optional(&self.platform));
		map.insert("title".to_string(), Value::String(self.title.clone()));
		map.insert("url".to_string(), Value::String(self.url.clone()));
		map.insert("section_path".to_string(), Value::String(self.section_path.clone()));
		map.insert("type".to_string(), Value::String(self.doc_type.clone()));
		map.insert("language".to_string(), optional(&self.language));
		map.insert("hash".to_string(), optional(&self.hash));
		map.insert("version".to_string(), optional(&self.version));

		map
	}

	pub fn from_map(map: &Map<String, Value>) -> Self {
		let field = |key: &str| map.get(key).and_then(Value::as_str).unwrap_or_default().to_string();

		Self {
			source: field("source"),
			platform: Some(field("platform")),
			title: field("title"),
			url: field("url"),
			section_path: field("section_path"),
			doc_type: field("type"),
			language: Some(field("language")),
			hash: Some(field("hash")),
			version: Some(field("version")),
		}
	}
}
