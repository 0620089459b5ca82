use serde_json::{Map, Value};

/// One stored corpus entry: external string id, the text the store embeds,
/// and flat metadata echoed back on reads.
#[derive(Clone, Debug, PartialEq)]
pub struct CorpusRecord {
	pub id: String,
	pub document: String,
	pub metadata: Map<String, Value>,
}

#[derive(Clone, Debug)]
pub struct ScrollPage {
	pub records: Vec<CorpusRecord>,
	pub next_offset: Option<String>,
}
