// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the stack rewriter.
//!
//! Mapping failures never surface here; only misuse of the process-wide
//! installation and configuration problems do.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by `loom-stackmap`.
#[derive(Debug, Error)]
pub enum StackmapError {
	#[error("stack rewriter already installed")]
	AlreadyInstalled,

	#[error("stack rewriter used before install")]
	NotInstalled,

	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// I/O error reading config file
	#[error("I/O error reading {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// TOML parsing error
	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// Environment variable error
	#[error("Environment error: {0}")]
	Env(String),

	/// Invalid value
	#[error("Invalid value for {field}: {message}")]
	InvalidValue { field: String, message: String },
}

impl ConfigError {
	pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			field: field.into(),
			message: message.into(),
		}
	}
}

pub type Result<T> = std::result::Result<T, StackmapError>;
