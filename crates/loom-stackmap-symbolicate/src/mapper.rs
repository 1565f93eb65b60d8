// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generated-to-original position mapping.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::cache::{
	CachedSourceMap, FileContentCache, InMemoryFileCache, InMemorySourceMapCache, SourceMapCache,
};
use crate::locate::{resolve_relative, retrieve_source_map};
use crate::retrieve::{FileLoader, FileRetriever, NoopRetriever};
use crate::sourcemap::{ParsedSourceMap, SourceMapConsumer};

/// A position in a source file. Lines are 1-indexed, columns 0-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePosition {
	pub source: String,
	pub line: u32,
	pub column: u32,
}

impl SourcePosition {
	pub fn new(source: impl Into<String>, line: u32, column: u32) -> Self {
		Self {
			source: source.into(),
			line,
			column,
		}
	}
}

/// Builds a [`SourceMapConsumer`] from raw source map text.
pub type ConsumerFactory = dyn Fn(&str) -> crate::Result<Arc<dyn SourceMapConsumer>> + Send + Sync;

fn parse_consumer(raw: &str) -> crate::Result<Arc<dyn SourceMapConsumer>> {
	Ok(Arc::new(ParsedSourceMap::from_str(raw)?))
}

/// Maps generated positions to original ones using lazily retrieved,
/// cached source maps.
///
/// Mapping is best-effort: any position that cannot be resolved is returned
/// unchanged.
pub struct PositionMapper {
	loader: FileLoader,
	source_maps: Arc<dyn SourceMapCache>,
	consumer_factory: Box<ConsumerFactory>,
}

impl Default for PositionMapper {
	fn default() -> Self {
		Self::builder().build()
	}
}

impl PositionMapper {
	pub fn builder() -> PositionMapperBuilder {
		PositionMapperBuilder::new()
	}

	pub fn loader(&self) -> &FileLoader {
		&self.loader
	}

	pub fn source_maps(&self) -> &Arc<dyn SourceMapCache> {
		&self.source_maps
	}

	#[instrument(level = "debug", skip(self, position), fields(source = %position.source, line = position.line, column = position.column))]
	pub fn map_position(&self, position: SourcePosition) -> SourcePosition {
		let cached = self.source_map_for(&position.source);

		let Some(map) = &cached.map else {
			return position;
		};

		// A miss keeps the generated position: a precise location in the
		// compiled file beats a vague one in the original.
		let Some(original) = map.original_position_for(position.line, position.column) else {
			debug!("No mapping found in source map");
			return position;
		};

		let base = cached.url.as_deref().unwrap_or(&position.source);
		SourcePosition {
			source: resolve_relative(base, &original.source),
			line: original.line,
			column: original.column,
		}
	}

	/// The cached source map for `source`, retrieving and caching it (or a
	/// negative entry) on first use.
	pub fn source_map_for(&self, source: &str) -> Arc<CachedSourceMap> {
		if let Some(cached) = self.source_maps.get(source) {
			return cached;
		}

		let entry = match retrieve_source_map(&self.loader, source) {
			Some(retrieved) => match (self.consumer_factory)(&retrieved.map) {
				Ok(map) => {
					self.preload_sources_content(retrieved.url.as_deref(), map.as_ref());
					CachedSourceMap {
						url: retrieved.url,
						map: Some(map),
					}
				}
				Err(e) => {
					warn!(source, url = ?retrieved.url, error = %e, "Failed to parse source map");
					CachedSourceMap::negative()
				}
			},
			None => {
				debug!(source, "No source map found");
				CachedSourceMap::negative()
			}
		};

		self.source_maps.set(source, entry)
	}

	/// Embedded sources may not exist on disk; seed the file cache so they
	/// can still be read later.
	fn preload_sources_content(&self, map_url: Option<&str>, map: &dyn SourceMapConsumer) {
		let contents = map.sources_content();
		for (source, content) in map.sources().iter().zip(contents) {
			if let Some(content) = content.filter(|c| !c.is_empty()) {
				let id = resolve_relative(map_url.unwrap_or_default(), source);
				self.loader.cache().set(&id, Some(Arc::from(content)));
			}
		}
	}
}

/// Builder for [`PositionMapper`].
pub struct PositionMapperBuilder {
	file_cache: Option<Arc<dyn FileContentCache>>,
	source_map_cache: Option<Arc<dyn SourceMapCache>>,
	retriever: Arc<dyn FileRetriever>,
	filesystem_fallback: bool,
	consumer_factory: Box<ConsumerFactory>,
}

impl PositionMapperBuilder {
	pub fn new() -> Self {
		Self {
			file_cache: None,
			source_map_cache: None,
			retriever: Arc::new(NoopRetriever),
			filesystem_fallback: true,
			consumer_factory: Box::new(parse_consumer),
		}
	}

	pub fn file_cache(mut self, cache: Arc<dyn FileContentCache>) -> Self {
		self.file_cache = Some(cache);
		self
	}

	pub fn source_map_cache(mut self, cache: Arc<dyn SourceMapCache>) -> Self {
		self.source_map_cache = Some(cache);
		self
	}

	pub fn retriever(mut self, retriever: Arc<dyn FileRetriever>) -> Self {
		self.retriever = retriever;
		self
	}

	pub fn filesystem_fallback(mut self, enabled: bool) -> Self {
		self.filesystem_fallback = enabled;
		self
	}

	/// Replace the source map decoder.
	pub fn consumer_factory<F>(mut self, factory: F) -> Self
	where
		F: Fn(&str) -> crate::Result<Arc<dyn SourceMapConsumer>> + Send + Sync + 'static,
	{
		self.consumer_factory = Box::new(factory);
		self
	}

	pub fn build(self) -> PositionMapper {
		let file_cache = self
			.file_cache
			.unwrap_or_else(|| Arc::new(InMemoryFileCache::new()));
		PositionMapper {
			loader: FileLoader::new(file_cache, self.retriever)
				.with_filesystem_fallback(self.filesystem_fallback),
			source_maps: self
				.source_map_cache
				.unwrap_or_else(|| Arc::new(InMemorySourceMapCache::new())),
			consumer_factory: self.consumer_factory,
		}
	}
}

impl Default for PositionMapperBuilder {
	fn default() -> Self {
		Self::new()
	}
}
