// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! An error header together with its parsed frames.

use std::fmt;

use crate::call_site::CallSite;
use crate::error::{Result, StackmapCoreError};
use crate::parse::{parse_stack, split_header};

/// A parsed stack trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceError {
	/// The `Name: message` line the stack started with.
	pub header: String,
	pub call_sites: Vec<CallSite>,
}

impl TraceError {
	pub fn from_stack(stack: &str) -> Result<Self> {
		if stack.trim().is_empty() {
			return Err(StackmapCoreError::EmptyStack);
		}

		let (header, _) = split_header(stack);
		Ok(Self {
			header: header.to_string(),
			call_sites: parse_stack(stack),
		})
	}

	/// Split the header into error name and message.
	///
	/// A header without `": "` is a bare name with an empty message. A header
	/// that is itself a frame line means the stack lost its first line.
	pub fn name_and_message(&self) -> Result<(String, String)> {
		parse_header(&self.header)
	}
}

/// Split a `Name: message` header.
pub fn parse_header(header: &str) -> Result<(String, String)> {
	let trimmed = header.trim();
	if trimmed.is_empty() || trimmed.starts_with("at ") {
		return Err(StackmapCoreError::InvalidHeader(header.to_string()));
	}

	Ok(match trimmed.split_once(": ") {
		Some((name, message)) => (name.to_string(), message.to_string()),
		None => (trimmed.trim_end_matches(':').to_string(), String::new()),
	})
}

impl fmt::Display for TraceError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.header)?;
		for call_site in &self.call_sites {
			write!(f, "\n\tat {call_site}")?;
		}
		Ok(())
	}
}
