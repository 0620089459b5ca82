use ezra_domain::{category, codes, error_codes};

#[test]
fn category_priority_follows_table_order() {
	// Both a network and a billing term; network is earlier in the table.
	assert_eq!(category::categorize("network timeout and billing overdue", ""), "network");
	// Repeated evaluation stays deterministic.
	assert_eq!(category::categorize("network timeout and billing overdue", ""), "network");
}

#[test]
fn code_shape_matches_the_documented_classifier() {
	assert!(codes::looks_like_code("120002"));
	assert!(codes::looks_like_code("-100"));
	assert!(codes::looks_like_code("0x123"));
	assert!(!codes::looks_like_code("camera won't turn on"));
	assert!(!codes::looks_like_code("abc123"));
}

#[test]
fn normalize_is_deterministic_over_the_same_input() {
	let payload = serde_json::json!([
		{
			"moduleCode": "10002",
			"detailCode": "120002",
			"description": "设备离线",
			"solution": "重启设备",
			"updateTime": 1_700_000_000_i64,
		},
		{
			"moduleCode": "",
			"detailCode": "330001",
			"description": "unclassifiable text",
			"solution": "none",
			"updateTime": 1_700_000_000_i64,
		},
	]);
	let first = error_codes::normalize_error_codes(payload.clone()).expect("normalize failed");
	let second = error_codes::normalize_error_codes(payload).expect("normalize failed");

	assert_eq!(first.entities, second.entities);
	assert_eq!(first.entities[0].id, "10002_120002");
	assert_eq!(first.entities[0].category, "device");
	assert_eq!(first.entities[1].id, "330001");
	assert_eq!(first.entities[1].category, category::GENERAL_CATEGORY);
}
