// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Structured representation of one stack frame.

use std::fmt::{self, Write as _};

use serde::Serialize;

/// Field values used to build a [`CallSite`].
///
/// Every field is optional; the parser fills in what the frame text carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSiteProps {
	pub file_name: Option<String>,
	pub function_name: Option<String>,
	pub type_name: Option<String>,
	pub method_name: Option<String>,
	pub line: Option<u32>,
	pub column: Option<u32>,
	pub from_native: bool,
	pub from_constructor: bool,
	pub from_toplevel: bool,
	pub from_eval: bool,
	/// A dashed separator line; `file_name` holds the raw text.
	pub separator: bool,
	pub eval_origin: Option<CallSite>,
	pub source_url: Option<String>,
}

/// One frame of a JavaScript stack trace.
///
/// Lines and columns are 1-based. Once built, only the mapped position
/// (`source`, `line`, `column`) can change, through [`CallSite::apply_position`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSite {
	source: Option<String>,
	file_name: Option<String>,
	function_name: Option<String>,
	type_name: Option<String>,
	method_name: Option<String>,
	line: Option<u32>,
	column: Option<u32>,
	from_native: bool,
	from_constructor: bool,
	from_toplevel: bool,
	from_eval: bool,
	separator: bool,
	eval_origin: Option<Box<CallSite>>,
	source_url: Option<String>,
}

impl From<CallSiteProps> for CallSite {
	fn from(props: CallSiteProps) -> Self {
		Self {
			source: None,
			file_name: props.file_name,
			function_name: props.function_name,
			type_name: props.type_name,
			method_name: props.method_name,
			line: props.line.filter(|&n| n > 0),
			column: props.column.filter(|&n| n > 0),
			from_native: props.from_native,
			from_constructor: props.from_constructor,
			from_toplevel: props.from_toplevel,
			from_eval: props.from_eval,
			separator: props.separator,
			eval_origin: props.eval_origin.map(Box::new),
			source_url: props.source_url,
		}
	}
}

impl CallSite {
	pub fn new(props: CallSiteProps) -> Self {
		Self::from(props)
	}

	pub fn is_eval(&self) -> bool {
		self.from_eval
	}

	pub fn is_native(&self) -> bool {
		self.from_native
	}

	pub fn is_constructor(&self) -> bool {
		self.from_constructor
	}

	pub fn is_toplevel(&self) -> bool {
		self.from_toplevel
	}

	pub fn eval_origin(&self) -> Option<&CallSite> {
		self.eval_origin.as_deref()
	}

	/// The mapped source if the frame was rewritten, else the parsed file name.
	pub fn file_name(&self) -> Option<&str> {
		self.source.as_deref().or(self.file_name.as_deref())
	}

	/// The file name exactly as it appeared in the stack text.
	pub fn generated_file_name(&self) -> Option<&str> {
		self.file_name.as_deref()
	}

	pub fn source(&self) -> Option<&str> {
		self.source.as_deref()
	}

	pub fn function_name(&self) -> Option<&str> {
		self.function_name.as_deref()
	}

	pub fn method_name(&self) -> Option<&str> {
		self.method_name.as_deref()
	}

	pub fn type_name(&self) -> Option<&str> {
		self.type_name.as_deref()
	}

	pub fn line(&self) -> Option<u32> {
		self.line
	}

	pub fn column(&self) -> Option<u32> {
		self.column
	}

	/// Code passed to `eval()` ending in `//# sourceURL=...` reports its
	/// file through the override instead of the file name.
	pub fn script_name_or_source_url(&self) -> Option<&str> {
		self.source_url.as_deref().or_else(|| self.file_name())
	}

	/// A visual separator line (four or more dashes) kept verbatim.
	pub fn is_separator(&self) -> bool {
		self.separator
	}

	/// Overwrite the position with the result of source mapping.
	pub fn apply_position(&mut self, source: impl Into<String>, line: u32, column: u32) {
		self.source = Some(source.into());
		self.line = Some(line).filter(|&n| n > 0);
		self.column = Some(column).filter(|&n| n > 0);
	}

	/// `Type.<anonymous>` frames keep their toplevel flag from the parser but
	/// still render in method-call form.
	fn is_anonymous_method(&self) -> bool {
		self.function_name.as_deref() == Some("") && self.type_name.is_some() && self.method_name.is_none()
	}

	fn file_location(&self) -> String {
		if self.is_native() {
			return "native".to_string();
		}

		let mut location = String::new();
		let file_name = self.script_name_or_source_url().filter(|name| !name.is_empty());

		if file_name.is_none() && self.is_eval() {
			if let Some(origin) = self.eval_origin() {
				// Source position follows the origin.
				let _ = write!(location, "eval at {origin}, ");
			}
		}

		location.push_str(file_name.unwrap_or("<anonymous>"));

		if let Some(line) = self.line {
			let _ = write!(location, ":{line}");
			if let Some(column) = self.column {
				let _ = write!(location, ":{column}");
			}
		}

		location
	}
}

impl fmt::Display for CallSite {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_separator() {
			return f.write_str(self.file_name.as_deref().unwrap_or_default());
		}

		let location = self.file_location();
		let function_name = self.function_name().filter(|name| !name.is_empty());

		// Frames without any caller text print as their location alone.
		if self.function_name.is_none()
			&& self.type_name.is_none()
			&& self.method_name.is_none()
			&& !self.is_constructor()
		{
			return f.write_str(&location);
		}
		let is_method_call = !(self.is_toplevel() || self.is_constructor()) || self.is_anonymous_method();

		let mut label = String::new();
		if is_method_call {
			match function_name {
				Some(function_name) => {
					if let Some(type_name) = self.type_name() {
						if !function_name.starts_with(type_name) {
							label.push_str(type_name);
							label.push('.');
						}
					}
					label.push_str(function_name);
					if let Some(method_name) = self.method_name() {
						if !function_name.ends_with(&format!(".{method_name}")) {
							let _ = write!(label, " [as {method_name}]");
						}
					}
				}
				None => {
					if let Some(type_name) = self.type_name() {
						label.push_str(type_name);
						label.push('.');
					}
					label.push_str(self.method_name().unwrap_or("<anonymous>"));
				}
			}
		} else if self.is_constructor() {
			label.push_str("new ");
			label.push_str(function_name.unwrap_or("<anonymous>"));
		} else if let Some(function_name) = function_name {
			label.push_str(function_name);
		} else {
			return f.write_str(&location);
		}

		write!(f, "{label} ({location})")
	}
}
