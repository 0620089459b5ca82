pub const GENERAL_CATEGORY: &str = "general";

/// Evaluated top to bottom; the first category with a matching term wins, so
/// the order of this table is a contract, not an accident.
const CATEGORY_TERMS: &[(&str, &[&str])] = &[
	(
		"network",
		&[
			"网络",
			"network",
			"超时",
			"timeout",
			"连接",
			"connection",
			"断开",
			"disconnect",
			"dns",
			"ip",
			"socket",
		],
	),
	(
		"billing",
		&[
			"余额",
			"balance",
			"付费",
			"payment",
			"欠费",
			"overdue",
			"订阅",
			"subscription",
			"充值",
			"recharge",
			"套餐",
			"plan",
		],
	),
	(
		"device",
		&[
			"设备",
			"device",
			"离线",
			"offline",
			"重启",
			"restart",
			"固件",
			"firmware",
			"硬件",
			"hardware",
			"摄像",
			"camera",
		],
	),
	(
		"authentication",
		&[
			"登录",
			"login",
			"密码",
			"password",
			"验证",
			"verify",
			"认证",
			"auth",
			"token",
			"权限",
			"permission",
		],
	),
	(
		"streaming",
		&["流媒体", "stream", "播放", "play", "视频", "video", "直播", "live", "回放", "playback"],
	),
	(
		"storage",
		&[
			"存储",
			"storage",
			"云存储",
			"cloud",
			"录像",
			"recording",
			"sd卡",
			"sdcard",
			"空间",
			"space",
		],
	),
	("configuration", &["配置", "config", "设置", "setting", "参数", "parameter"]),
];

pub fn categorize(description: &str, solution: &str) -> &'static str {
	let text = format!("{description} {solution}").to_lowercase();

	for (category, terms) in CATEGORY_TERMS {
		if terms.iter().any(|term| text.contains(term)) {
			return category;
		}
	}

	GENERAL_CATEGORY
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_matching_category_wins() {
		assert_eq!(categorize("network timeout and billing overdue", ""), "network");
		assert_eq!(categorize("billing overdue", ""), "billing");
	}

	#[test]
	fn matches_localized_terms() {
		assert_eq!(categorize("网络异常", "请检查路由器"), "network");
		assert_eq!(categorize("设备离线", ""), "device");
	}

	#[test]
	fn solution_text_contributes() {
		assert_eq!(categorize("operation failed", "please verify the password"), "authentication");
	}

	#[test]
	fn unmatched_text_is_general() {
		assert_eq!(categorize("unknown failure", "contact support"), GENERAL_CATEGORY);
	}
}
