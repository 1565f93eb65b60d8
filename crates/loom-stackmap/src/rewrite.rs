// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rewrites parsed stacks to original positions and serialises them back.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use loom_stackmap_core::{parse_header, parse_stack, split_header, CallSite};
use loom_stackmap_symbolicate::{FileRetriever, PositionMapper, SourcePosition};
use tracing::{debug, instrument};

use crate::config::StackmapConfig;
use crate::correction::{correct_column, ColumnCorrection};

/// The parts of a JavaScript error the rewriter reads and updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLike {
	pub name: String,
	pub message: String,
	/// Raw stack text; after a rewrite, only the `\n\tat ...` frame lines.
	pub stack: Option<String>,
	pub file_name: Option<String>,
	pub line_number: Option<u32>,
	pub column_number: Option<u32>,
}

impl ErrorLike {
	pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			message: message.into(),
			..Default::default()
		}
	}

	pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
		self.stack = Some(stack.into());
		self
	}

	/// Build from raw stack text, taking name and message from its header.
	pub fn from_stack(stack: &str) -> Self {
		let (header, _) = split_header(stack);
		let (name, message) =
			parse_header(header).unwrap_or_else(|_| ("Error".to_string(), String::new()));
		Self::new(name, message).with_stack(stack)
	}

	fn header(&self) -> String {
		if self.message.is_empty() {
			self.name.clone()
		} else {
			format!("{}: {}", self.name, self.message)
		}
	}
}

impl fmt::Display for ErrorLike {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.header())?;
		match self.stack.as_deref() {
			Some(frames) if frames.starts_with('\n') => f.write_str(frames),
			Some(raw) => match split_header(raw) {
				(_, "") => Ok(()),
				(_, frames) => write!(f, "\n{frames}"),
			},
			None => Ok(()),
		}
	}
}

/// Maps every frame of a stack through a [`PositionMapper`].
pub struct StackRewriter {
	mapper: PositionMapper,
	corrections: Vec<ColumnCorrection>,
}

impl StackRewriter {
	/// A rewriter with no column corrections.
	pub fn new(mapper: PositionMapper) -> Self {
		Self {
			mapper,
			corrections: Vec::new(),
		}
	}

	pub fn from_config(config: &StackmapConfig, retriever: Arc<dyn FileRetriever>) -> Self {
		let mapper = PositionMapper::builder()
			.retriever(retriever)
			.filesystem_fallback(config.filesystem_fallback)
			.build();
		Self::new(mapper).with_corrections(config.column_corrections.clone())
	}

	pub fn with_corrections(mut self, corrections: Vec<ColumnCorrection>) -> Self {
		self.corrections = corrections;
		self
	}

	pub fn mapper(&self) -> &PositionMapper {
		&self.mapper
	}

	/// Rewrite each call site in place.
	pub fn map_call_sites(&self, call_sites: &mut [CallSite]) {
		let bottom_file = call_sites
			.last()
			.and_then(|cs| cs.generated_file_name())
			.map(str::to_owned);

		for call_site in call_sites.iter_mut() {
			self.map_call_site(call_site, bottom_file.as_deref());
		}
	}

	fn map_call_site(&self, call_site: &mut CallSite, bottom_file: Option<&str>) {
		let (Some(source), Some(line), Some(column)) = (
			call_site.script_name_or_source_url(),
			call_site.line(),
			call_site.column(),
		) else {
			return;
		};

		// Frame columns are 1-based, source map columns 0-based.
		let column = correct_column(&self.corrections, bottom_file, line, column - 1);
		let mapped = self
			.mapper
			.map_position(SourcePosition::new(source, line, column));

		let Some(mapped_column) = mapped.column.checked_add(1) else {
			debug!(source = %mapped.source, "Mapped column out of range, keeping generated position");
			return;
		};
		call_site.apply_position(mapped.source, mapped.line, mapped_column);
	}

	/// Rewrite `error.stack` in place.
	///
	/// Errors without a stack are returned untouched. When the stack has at
	/// least one frame, `file_name`, `line_number` and `column_number` are
	/// taken from the innermost frame and `stack` becomes the `\n\tat ...`
	/// lines alone.
	#[instrument(level = "debug", skip_all, fields(name = %error.name))]
	pub fn rewrite<'a>(&self, error: &'a mut ErrorLike) -> &'a mut ErrorLike {
		let Some(stack) = error.stack.as_deref() else {
			return error;
		};

		let mut call_sites = parse_stack(stack);
		self.map_call_sites(&mut call_sites);

		let Some(first) = call_sites.first() else {
			debug!("Stack has no frames");
			return error;
		};

		error.file_name = first.file_name().map(str::to_owned);
		error.line_number = first.line();
		error.column_number = first.column();
		error.stack = Some(render_frames(&call_sites));
		error
	}

	/// Rewrite a raw stack string, keeping its header line.
	pub fn rewrite_stack(&self, stack: &str) -> String {
		let (header, _) = split_header(stack);
		let mut call_sites = parse_stack(stack);
		self.map_call_sites(&mut call_sites);

		let mut out = header.to_string();
		out.push_str(&render_frames(&call_sites));
		out
	}

	/// Node-style report: the offending source line with a caret under the
	/// column, then the error and its stack.
	pub fn format_error(&self, error: &ErrorLike) -> String {
		let mut out = String::new();

		if let Some(file_name) = &error.file_name {
			out.push('\n');
			out.push_str(file_name);

			match error.line_number {
				Some(line_number) => {
					let _ = writeln!(out, ":{line_number}");
					if let Some(code) = self.mapper.loader().retrieve_file(file_name) {
						if let Some(source_line) = code.lines().nth(line_number.saturating_sub(1) as usize) {
							out.push_str(source_line);
							if let Some(column) = error.column_number {
								let _ = write!(out, "\n{}^", " ".repeat(column.saturating_sub(1) as usize));
							}
							out.push('\n');
						}
					}
				}
				None => out.push('\n'),
			}
		}

		let _ = write!(out, "{error}");
		out
	}
}

fn render_frames(call_sites: &[CallSite]) -> String {
	call_sites.iter().fold(String::new(), |mut out, call_site| {
		let _ = write!(out, "\n\tat {call_site}");
		out
	})
}
