// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for source map retrieval and decoding.
//!
//! None of these escape [`PositionMapper::map_position`](crate::PositionMapper::map_position);
//! they are logged and the generated position is kept.

use thiserror::Error;

/// Errors that can occur while retrieving or decoding a source map.
#[derive(Debug, Error)]
pub enum SymbolicateError {
	#[error("Invalid source map JSON: {0}")]
	InvalidSourceMapJson(#[from] serde_json::Error),

	#[error("Invalid source map version: expected 3, got {0}")]
	InvalidSourceMapVersion(u32),

	#[error("Invalid VLQ character: {0}")]
	InvalidVlqChar(char),

	#[error("VLQ value overflows 32 bits in segment {0:?}")]
	VlqOverflow(String),

	#[error("Invalid source index: {0}")]
	InvalidSourceIndex(u32),

	#[error("Invalid base64 data URL: {0}")]
	InvalidDataUrl(#[from] base64::DecodeError),

	#[error("Source map is not valid UTF-8")]
	InvalidUtf8(#[from] std::string::FromUtf8Error),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SymbolicateError>;
