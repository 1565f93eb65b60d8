// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cached file retrieval with a pluggable retriever and a filesystem fallback.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::cache::FileContentCache;
use crate::error::Result;

/// Supplies file contents for a path or URL.
///
/// Returning `None` (or an empty string) hands the lookup to the filesystem
/// fallback.
pub trait FileRetriever: Send + Sync {
	fn retrieve(&self, id: &str) -> Option<String>;
}

impl<F> FileRetriever for F
where
	F: Fn(&str) -> Option<String> + Send + Sync,
{
	fn retrieve(&self, id: &str) -> Option<String> {
		self(id)
	}
}

/// Retriever that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRetriever;

impl FileRetriever for NoopRetriever {
	fn retrieve(&self, _id: &str) -> Option<String> {
		None
	}
}

/// Reads files through a [`FileRetriever`] and remembers every outcome.
pub struct FileLoader {
	cache: Arc<dyn FileContentCache>,
	retriever: Arc<dyn FileRetriever>,
	filesystem_fallback: bool,
}

impl FileLoader {
	pub fn new(cache: Arc<dyn FileContentCache>, retriever: Arc<dyn FileRetriever>) -> Self {
		Self {
			cache,
			retriever,
			filesystem_fallback: true,
		}
	}

	pub fn with_filesystem_fallback(mut self, enabled: bool) -> Self {
		self.filesystem_fallback = enabled;
		self
	}

	pub fn cache(&self) -> &Arc<dyn FileContentCache> {
		&self.cache
	}

	/// Contents of `id`, retrieved at most once per trimmed id.
	pub fn retrieve_file(&self, id: &str) -> Option<Arc<str>> {
		let id = id.trim();
		if let Some(cached) = self.cache.get(id) {
			return cached;
		}

		let contents = self
			.retriever
			.retrieve(id)
			.filter(|contents| !contents.is_empty())
			.or_else(|| self.read_from_filesystem(id))
			.map(Arc::<str>::from);

		debug!(id, found = contents.is_some(), "Retrieved file");
		self.cache.set(id, contents.clone());
		contents
	}

	fn read_from_filesystem(&self, id: &str) -> Option<String> {
		if !self.filesystem_fallback {
			return None;
		}

		match read_path(id) {
			Ok(contents) => Some(contents),
			Err(e) => {
				debug!(id, error = %e, "Filesystem read failed");
				None
			}
		}
	}
}

fn read_path(id: &str) -> Result<String> {
	Ok(std::fs::read_to_string(local_path(id))?)
}

/// `file://` URLs are read from their path component.
fn local_path(id: &str) -> PathBuf {
	url::Url::parse(id)
		.ok()
		.filter(|url| url.scheme() == "file")
		.and_then(|url| url.to_file_path().ok())
		.unwrap_or_else(|| PathBuf::from(id))
}
