// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack rewriter configuration.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file, then
//! environment variables. The CLI applies its flags on top.
//!
//! ```toml
//! filesystem_fallback = true
//!
//! [[column_corrections]]
//! runtime = "node-legacy"
//! loader_file = "module.js"
//! line = 1
//! column_offset = 63
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::correction::ColumnCorrection;
use crate::error::ConfigError;

/// Disables (or enables) reading files from disk when the retriever has nothing.
pub const ENV_FS_FALLBACK: &str = "LOOM_STACKMAP_FS_FALLBACK";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackmapConfig {
	pub filesystem_fallback: bool,
	pub column_corrections: Vec<ColumnCorrection>,
}

impl Default for StackmapConfig {
	fn default() -> Self {
		Self {
			filesystem_fallback: true,
			column_corrections: vec![ColumnCorrection::legacy_node_module_wrapper()],
		}
	}
}

impl StackmapConfig {
	pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(contents).map_err(|source| ConfigError::TomlParse {
			path: path.to_path_buf(),
			source,
		})?;
		config.validate()?;
		Ok(config)
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&contents, path)
	}

	/// Apply overrides from the process environment.
	pub fn apply_env(self) -> Result<Self, ConfigError> {
		self.apply_env_from(|key| std::env::var(key).ok())
	}

	pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		if let Some(value) = lookup(ENV_FS_FALLBACK) {
			self.filesystem_fallback = parse_bool(&value)
				.ok_or_else(|| ConfigError::Env(format!("{ENV_FS_FALLBACK} must be a boolean, got {value:?}")))?;
		}
		Ok(self)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		for (idx, correction) in self.column_corrections.iter().enumerate() {
			if correction.loader_file.trim().is_empty() {
				return Err(ConfigError::invalid_value(
					format!("column_corrections[{idx}].loader_file"),
					"must not be empty",
				));
			}
			if correction.line == 0 {
				return Err(ConfigError::invalid_value(
					format!("column_corrections[{idx}].line"),
					"lines are 1-based",
				));
			}
		}
		Ok(())
	}
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}
