// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Caches for retrieved file contents and parsed source maps.
//!
//! Both caches remember failures: a `None` value is a negative entry and stops
//! the same lookup from being retried for the life of the cache.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::sourcemap::SourceMapConsumer;

/// Cache of file contents keyed by trimmed file id (path or URL).
pub trait FileContentCache: Send + Sync {
	/// `Some(None)` is a cached miss, `None` means never looked up.
	fn get(&self, id: &str) -> Option<Option<Arc<str>>>;

	fn set(&self, id: &str, contents: Option<Arc<str>>);

	fn has_negative(&self, id: &str) -> bool {
		matches!(self.get(id), Some(None))
	}
}

/// A source map retrieved for one generated source.
#[derive(Clone)]
pub struct CachedSourceMap {
	/// Where the map came from; `None` for inline data URLs.
	pub url: Option<String>,
	/// `None` records that no usable map exists.
	pub map: Option<Arc<dyn SourceMapConsumer>>,
}

impl CachedSourceMap {
	pub fn negative() -> Self {
		Self { url: None, map: None }
	}
}

impl fmt::Debug for CachedSourceMap {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CachedSourceMap")
			.field("url", &self.url)
			.field("map", &self.map.as_ref().map(|_| ".."))
			.finish()
	}
}

/// Cache of source maps keyed by generated source id.
///
/// Entries are never replaced: the first one stored for a key wins.
pub trait SourceMapCache: Send + Sync {
	fn get(&self, source: &str) -> Option<Arc<CachedSourceMap>>;

	/// Store `entry` unless the key is already present, returning the entry
	/// that is cached afterwards.
	fn set(&self, source: &str, entry: CachedSourceMap) -> Arc<CachedSourceMap>;

	fn has_negative(&self, source: &str) -> bool {
		self.get(source).is_some_and(|entry| entry.map.is_none())
	}
}

/// Unbounded in-memory [`FileContentCache`].
#[derive(Debug, Default)]
pub struct InMemoryFileCache {
	entries: RwLock<HashMap<String, Option<Arc<str>>>>,
}

impl InMemoryFileCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

impl FileContentCache for InMemoryFileCache {
	fn get(&self, id: &str) -> Option<Option<Arc<str>>> {
		self.entries.read().get(id).cloned()
	}

	fn set(&self, id: &str, contents: Option<Arc<str>>) {
		self.entries.write().insert(id.to_string(), contents);
	}
}

/// Unbounded in-memory [`SourceMapCache`].
#[derive(Debug, Default)]
pub struct InMemorySourceMapCache {
	entries: RwLock<HashMap<String, Arc<CachedSourceMap>>>,
}

impl InMemorySourceMapCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

impl SourceMapCache for InMemorySourceMapCache {
	fn get(&self, source: &str) -> Option<Arc<CachedSourceMap>> {
		self.entries.read().get(source).cloned()
	}

	fn set(&self, source: &str, entry: CachedSourceMap) -> Arc<CachedSourceMap> {
		self.entries
			.write()
			.entry(source.to_string())
			.or_insert_with(|| Arc::new(entry))
			.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sourcemap::ParsedSourceMap;

	#[test]
	fn test_file_cache_negative_entry() {
		let cache = InMemoryFileCache::new();

		assert_eq!(cache.get("/missing.js"), None);
		assert!(!cache.has_negative("/missing.js"));

		cache.set("/missing.js", None);
		assert_eq!(cache.get("/missing.js"), Some(None));
		assert!(cache.has_negative("/missing.js"));
	}

	#[test]
	fn test_file_cache_overwrite() {
		let cache = InMemoryFileCache::new();
		cache.set("/a.ts", None);
		cache.set("/a.ts", Some(Arc::from("let a = 1;")));

		assert_eq!(cache.get("/a.ts"), Some(Some(Arc::from("let a = 1;"))));
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn test_source_map_cache_first_write_wins() {
		let cache = InMemorySourceMapCache::new();
		let map = ParsedSourceMap::from_str(r#"{"version":3,"sources":["a.ts"],"mappings":"AAAA"}"#).unwrap();

		let stored = cache.set("/gen.js", CachedSourceMap::negative());
		assert!(stored.map.is_none());

		let stored = cache.set(
			"/gen.js",
			CachedSourceMap {
				url: Some("/gen.js.map".to_string()),
				map: Some(Arc::new(map)),
			},
		);
		assert!(stored.map.is_none());
		assert!(cache.has_negative("/gen.js"));
	}

	#[test]
	fn test_source_map_cache_miss() {
		let cache = InMemorySourceMapCache::new();
		assert!(cache.get("/gen.js").is_none());
		assert!(!cache.has_negative("/gen.js"));
		assert!(cache.is_empty());
	}
}
