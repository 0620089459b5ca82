use regex::Regex;

/// Decimal (optionally negative) or 0x-prefixed hexadecimal, whole string.
/// Both alternatives are anchored: strings like "abc123" are not codes.
const CODE_SHAPE_PATTERN: &str = r"^(?:-?\d+|0x[0-9a-fA-F]+)$";

pub fn looks_like_code(query: &str) -> bool {
	Regex::new(CODE_SHAPE_PATTERN).map(|re| re.is_match(query.trim())).unwrap_or(false)
}

/// Primary key of an error code record. Module codes keep ids unique across
/// modules that reuse the same detail code; records without a module code
/// fall back to the bare detail code.
pub fn entity_id(module_code: &str, detail_code: &str) -> String {
	if module_code.is_empty() {
		detail_code.to_string()
	} else {
		format!("{module_code}_{detail_code}")
	}
}
