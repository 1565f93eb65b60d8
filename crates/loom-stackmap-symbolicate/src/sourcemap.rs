// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map v3 decoding and the consumer interface the mapper relies on.

use serde::Deserialize;

use crate::error::{Result, SymbolicateError};
use crate::vlq::{decode_vlq_mappings, DecodedMappings};

/// Resolves generated positions to original ones.
///
/// Lines are 1-indexed and columns 0-indexed, on both sides of the lookup.
pub trait SourceMapConsumer: Send + Sync {
	/// `None` means the map has no original position for this location.
	fn original_position_for(&self, line: u32, column: u32) -> Option<OriginalPosition>;

	/// Original source paths, with any `sourceRoot` applied.
	fn sources(&self) -> Vec<String>;

	/// Embedded contents, aligned by index with [`SourceMapConsumer::sources`].
	fn sources_content(&self) -> Vec<Option<String>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSourceMap {
	version: u32,
	#[serde(default)]
	file: Option<String>,
	#[serde(default)]
	source_root: Option<String>,
	sources: Vec<Option<String>>,
	#[serde(default)]
	sources_content: Option<Vec<Option<String>>>,
	#[serde(default)]
	names: Vec<String>,
	mappings: String,
}

/// Parsed source map ready for lookups.
#[derive(Debug, Clone)]
pub struct ParsedSourceMap {
	pub file: Option<String>,
	pub source_root: Option<String>,
	pub sources: Vec<String>,
	pub sources_content: Vec<Option<String>>,
	pub names: Vec<String>,
	mappings: DecodedMappings,
}

/// Result of a source map lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalPosition {
	pub source: String,
	/// 1-indexed.
	pub line: u32,
	/// 0-indexed.
	pub column: u32,
	pub name: Option<String>,
}

impl ParsedSourceMap {
	pub fn from_bytes(data: &[u8]) -> Result<Self> {
		// Maps served over HTTP may carry the XSSI guard prefix.
		let data = match data.strip_prefix(b")]}'") {
			Some(rest) => rest,
			None => data,
		};
		let raw: RawSourceMap = serde_json::from_slice(data)?;

		if raw.version != 3 {
			return Err(SymbolicateError::InvalidSourceMapVersion(raw.version));
		}

		let mappings = decode_vlq_mappings(&raw.mappings)?;
		let mut sources_content = raw.sources_content.unwrap_or_default();
		sources_content.resize(raw.sources.len(), None);

		Ok(Self {
			file: raw.file,
			source_root: raw.source_root,
			sources: raw.sources.into_iter().map(Option::unwrap_or_default).collect(),
			sources_content,
			names: raw.names,
			mappings,
		})
	}

	pub fn from_str(data: &str) -> Result<Self> {
		Self::from_bytes(data.as_bytes())
	}

	/// Look up the original position for a generated line (1-indexed) and
	/// column (0-indexed).
	pub fn lookup(&self, line: u32, column: u32) -> Result<Option<OriginalPosition>> {
		let Some(line_0indexed) = line.checked_sub(1) else {
			return Ok(None);
		};

		let Some(original) = self
			.mappings
			.find(line_0indexed, column)
			.and_then(|mapping| mapping.original)
		else {
			return Ok(None);
		};

		let source = self
			.sources
			.get(original.source_index as usize)
			.ok_or(SymbolicateError::InvalidSourceIndex(original.source_index))?;

		// A 0-indexed line of u32::MAX has no 1-indexed equivalent.
		let Some(line) = original.line.checked_add(1) else {
			return Ok(None);
		};

		Ok(Some(OriginalPosition {
			source: self.resolve_source_path(source),
			line,
			column: original.column,
			name: original
				.name_index
				.and_then(|idx| self.names.get(idx as usize).cloned()),
		}))
	}

	fn resolve_source_path(&self, source: &str) -> String {
		match self.source_root.as_deref().map(|root| root.trim_end_matches('/')) {
			Some(root) if !root.is_empty() => format!("{root}/{source}"),
			_ => source.to_owned(),
		}
	}

	pub fn has_sources_content(&self) -> bool {
		self.sources_content.iter().any(|c| c.is_some())
	}

	pub fn mapping_count(&self) -> usize {
		self.mappings.len()
	}
}

impl SourceMapConsumer for ParsedSourceMap {
	fn original_position_for(&self, line: u32, column: u32) -> Option<OriginalPosition> {
		match self.lookup(line, column) {
			Ok(position) => position,
			Err(e) => {
				tracing::debug!(error = %e, line, column, "Source map lookup failed");
				None
			}
		}
	}

	fn sources(&self) -> Vec<String> {
		self.sources.iter().map(|s| self.resolve_source_path(s)).collect()
	}

	fn sources_content(&self) -> Vec<Option<String>> {
		self.sources_content.clone()
	}
}
