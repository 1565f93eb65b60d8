// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Finding and fetching the source map a generated file declares.

use std::sync::LazyLock;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::prelude::*;
use regex::Regex;
use tracing::{debug, warn};
use url::Url;

use crate::error::Result;
use crate::retrieve::FileLoader;

/// `//# sourceMappingURL=foo.js.map` or `/*# sourceMappingURL=foo.js.map */`
static SOURCE_MAPPING_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r#"(?m)(?://[@#][ \t]+sourceMappingURL=([^\s'"]+?)[ \t]*\r?$)|(?:/\*[@#][ \t]+sourceMappingURL=([^*]+?)[ \t]*\*/[ \t]*\r?$)"#,
	)
	.unwrap()
});

static DATA_URL_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^data:application/json[^,]+base64,").unwrap());

/// Standard alphabet that accepts payloads with or without `=` padding.
const INLINE_MAP_ENGINE: GeneralPurpose = GeneralPurpose::new(
	&alphabet::STANDARD,
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Raw source map text and the URL it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedSourceMap {
	/// `None` when the map was inlined as a data URL.
	pub url: Option<String>,
	pub map: String,
}

/// The last `sourceMappingURL` reference in `contents`.
///
/// Earlier matches are ignored: bundles can contain copies of the marker in
/// strings or comments, and the one that counts is appended last.
pub fn locate_source_map_reference(contents: &str) -> Option<&str> {
	SOURCE_MAPPING_URL_REGEX
		.captures_iter(contents)
		.last()
		.and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
		.map(|m| m.as_str())
}

/// Resolve `target` against `base` the way `url.resolve` does, for both URLs
/// and plain paths.
pub fn resolve_relative(base: &str, target: &str) -> String {
	if base.is_empty() || parse_absolute_url(target).is_some() {
		return target.to_string();
	}

	if let Some(base_url) = parse_absolute_url(base) {
		if let Ok(joined) = base_url.join(target) {
			return joined.to_string();
		}
	}

	if target.starts_with('/') {
		return normalize_path(target);
	}

	let dir = base.rfind('/').map_or("", |idx| &base[..=idx]);
	normalize_path(&format!("{dir}{target}"))
}

/// Single-letter schemes are Windows drive letters, not URLs.
fn parse_absolute_url(value: &str) -> Option<Url> {
	Url::parse(value).ok().filter(|url| url.scheme().len() > 1)
}

fn normalize_path(path: &str) -> String {
	let absolute = path.starts_with('/');
	let mut segments: Vec<&str> = Vec::new();

	for segment in path.split('/') {
		match segment {
			"" | "." => {}
			".." => {
				if segments.last().is_some_and(|last| *last != "..") {
					segments.pop();
				} else if !absolute {
					segments.push("..");
				}
			}
			other => segments.push(other),
		}
	}

	let joined = segments.join("/");
	if absolute {
		format!("/{joined}")
	} else {
		joined
	}
}

fn decode_data_url(reference: &str) -> Result<String> {
	let payload = reference.split_once(',').map_or("", |(_, data)| data);
	let bytes = INLINE_MAP_ENGINE.decode(payload.trim())?;
	Ok(String::from_utf8(bytes)?)
}

/// Fetch the source map declared by `source`.
///
/// Inline `data:application/json;base64,` maps are decoded without any
/// further retrieval; other references are resolved relative to `source`.
pub fn retrieve_source_map(loader: &FileLoader, source: &str) -> Option<RetrievedSourceMap> {
	let contents = loader.retrieve_file(source)?;
	let reference = locate_source_map_reference(&contents)?;

	if DATA_URL_REGEX.is_match(reference) {
		return match decode_data_url(reference) {
			Ok(map) if !map.is_empty() => Some(RetrievedSourceMap { url: None, map }),
			Ok(_) => None,
			Err(e) => {
				warn!(source, error = %e, "Failed to decode inline source map");
				None
			}
		};
	}

	let url = resolve_relative(source, reference);
	let Some(map) = loader.retrieve_file(&url) else {
		debug!(source, url = %url, "Source map reference could not be retrieved");
		return None;
	};

	Some(RetrievedSourceMap {
		url: Some(url),
		map: map.to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cache::InMemoryFileCache;
	use crate::retrieve::FileRetriever;
	use std::collections::HashMap;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Arc;

	fn loader_with(files: &[(&str, &str)]) -> (FileLoader, Arc<AtomicUsize>) {
		let files: HashMap<String, String> = files
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		let hits = Arc::new(AtomicUsize::new(0));
		let counter = hits.clone();
		let retriever: Arc<dyn FileRetriever> = Arc::new(move |id: &str| {
			counter.fetch_add(1, Ordering::SeqCst);
			files.get(id).cloned()
		});
		let loader = FileLoader::new(Arc::new(InMemoryFileCache::new()), retriever).with_filesystem_fallback(false);
		(loader, hits)
	}

	#[test]
	fn test_locate_line_comment() {
		let js = "var a = 1;\n//# sourceMappingURL=app.js.map\n";
		assert_eq!(locate_source_map_reference(js), Some("app.js.map"));
	}

	#[test]
	fn test_locate_legacy_at_marker() {
		let js = "var a = 1;\n//@ sourceMappingURL=app.js.map";
		assert_eq!(locate_source_map_reference(js), Some("app.js.map"));
	}

	#[test]
	fn test_locate_block_comment() {
		let css = "body{}\n/*# sourceMappingURL=site.css.map */\n";
		assert_eq!(locate_source_map_reference(css), Some("site.css.map"));
	}

	#[test]
	fn test_locate_prefers_last_reference() {
		let js = "//# sourceMappingURL=old.map\nvar s = 1;\r\n//# sourceMappingURL=new.map\r\n";
		assert_eq!(locate_source_map_reference(js), Some("new.map"));
	}

	#[test]
	fn test_locate_none() {
		assert_eq!(locate_source_map_reference("var a = 'sourceMappingURL=x';"), None);
	}

	#[test]
	fn test_resolve_relative_paths() {
		assert_eq!(resolve_relative("/srv/dist/app.js", "app.js.map"), "/srv/dist/app.js.map");
		assert_eq!(resolve_relative("/srv/dist/app.js", "../src/app.ts"), "/srv/src/app.ts");
		assert_eq!(resolve_relative("/srv/dist/app.js", "/maps/app.js.map"), "/maps/app.js.map");
		assert_eq!(resolve_relative("dist/app.js", "./app.js.map"), "dist/app.js.map");
		assert_eq!(resolve_relative("app.js", "../app.ts"), "../app.ts");
		assert_eq!(resolve_relative("", "app.ts"), "app.ts");
	}

	#[test]
	fn test_resolve_relative_urls() {
		assert_eq!(
			resolve_relative("https://cdn.example.com/js/app.js", "app.js.map"),
			"https://cdn.example.com/js/app.js.map"
		);
		assert_eq!(
			resolve_relative("file:///srv/dist/app.js", "../src/app.ts"),
			"file:///srv/src/app.ts"
		);
		assert_eq!(
			resolve_relative("/srv/dist/app.js", "webpack:///src/app.ts"),
			"webpack:///src/app.ts"
		);
	}

	#[test]
	fn test_retrieve_external_map() {
		let (loader, _) = loader_with(&[
			("/srv/app.js", "x();\n//# sourceMappingURL=app.js.map"),
			("/srv/app.js.map", "{\"version\":3}"),
		]);

		assert_eq!(
			retrieve_source_map(&loader, "/srv/app.js"),
			Some(RetrievedSourceMap {
				url: Some("/srv/app.js.map".to_string()),
				map: "{\"version\":3}".to_string(),
			})
		);
	}

	#[test]
	fn test_retrieve_inline_map_needs_no_fetch() {
		let encoded = BASE64_STANDARD.encode("{\"version\":3}");
		let js = format!("x();\n//# sourceMappingURL=data:application/json;charset=utf-8;base64,{encoded}");
		let (loader, hits) = loader_with(&[("/srv/app.js", js.as_str())]);

		let retrieved = retrieve_source_map(&loader, "/srv/app.js").unwrap();
		assert_eq!(retrieved.url, None);
		assert_eq!(retrieved.map, "{\"version\":3}");
		assert_eq!(hits.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_retrieve_unpadded_inline_map() {
		let encoded = BASE64_STANDARD_NO_PAD.encode("{\"version\":3}");
		assert!(!encoded.ends_with('='));
		let js = format!("x();\n//# sourceMappingURL=data:application/json;base64,{encoded}");
		let (loader, _) = loader_with(&[("/srv/app.js", js.as_str())]);

		let retrieved = retrieve_source_map(&loader, "/srv/app.js").unwrap();
		assert_eq!(retrieved.map, "{\"version\":3}");
	}

	#[test]
	fn test_retrieve_malformed_inline_map() {
		let js = "x();\n//# sourceMappingURL=data:application/json;base64,!!!";
		let (loader, _) = loader_with(&[("/srv/app.js", js)]);

		assert_eq!(retrieve_source_map(&loader, "/srv/app.js"), None);
	}

	#[test]
	fn test_retrieve_without_reference() {
		let (loader, _) = loader_with(&[("/srv/app.js", "x();")]);
		assert_eq!(retrieve_source_map(&loader, "/srv/app.js"), None);
	}

	#[test]
	fn test_retrieve_missing_map_file() {
		let (loader, _) = loader_with(&[("/srv/app.js", "x();\n//# sourceMappingURL=gone.map")]);
		assert_eq!(retrieve_source_map(&loader, "/srv/app.js"), None);
	}
}
