// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The process-wide install is one-shot, so the whole lifecycle lives in a
//! single test.

use std::sync::Arc;

use loom_stackmap::{
	install, installed, is_installed, rewrite_error, ErrorLike, StackRewriter, StackmapConfig,
	StackmapError,
};

fn rewriter() -> StackRewriter {
	let config = StackmapConfig {
		filesystem_fallback: false,
		..Default::default()
	};
	StackRewriter::from_config(
		&config,
		Arc::new(|id: &str| match id {
			"/srv/app.js" => Some("a();\n//# sourceMappingURL=app.js.map".to_string()),
			"/srv/app.js.map" => Some(
				r#"{"version":3,"sources":["app.ts"],"names":[],"mappings":"AAAA"}"#.to_string(),
			),
			_ => None,
		}),
	)
}

#[test]
fn test_install_lifecycle() {
	assert!(!is_installed());
	assert!(matches!(installed(), Err(StackmapError::NotInstalled)));

	let mut error = ErrorLike::from_stack("Error: boom\n    at run (/srv/app.js:1:1)");
	assert!(matches!(rewrite_error(&mut error), Err(StackmapError::NotInstalled)));
	assert_eq!(error.file_name, None);

	install(rewriter()).unwrap();
	assert!(is_installed());

	let rewritten = rewrite_error(&mut error).unwrap();
	assert_eq!(rewritten.file_name.as_deref(), Some("/srv/app.ts"));
	assert_eq!(rewritten.stack.as_deref(), Some("\n\tat run (/srv/app.ts:1:1)"));

	assert!(matches!(install(rewriter()), Err(StackmapError::AlreadyInstalled)));
}
