// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for stack parsing.

use thiserror::Error;

/// Errors raised by the typed constructors of this crate.
///
/// Line parsing itself never fails; unrecognised text degrades to a minimal
/// [`CallSite`](crate::CallSite).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StackmapCoreError {
	#[error("stack text is empty")]
	EmptyStack,

	#[error("invalid error header: {0}")]
	InvalidHeader(String),
}

/// Result type for stack parsing operations.
pub type Result<T> = std::result::Result<T, StackmapCoreError>;
