// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lenient parser for V8 stack frame lines.
//!
//! Recognised shapes:
//!
//! ```text
//! ------                                         separator
//! at fn (eval at origin (file:1:2), <anonymous>:3:4)   eval frame
//! at new Type (file:1:2)                         constructor
//! at Type.method (file:1:2)                      method
//! at Type.<anonymous> (file:1:2)                 anonymous method
//! at fn (native)                                 native
//! at file:1:2                                    anonymous toplevel
//! ```
//!
//! Anything else produces a minimal [`CallSite`]; parsing never fails.

use std::sync::LazyLock;

use regex::Regex;

use crate::call_site::{CallSite, CallSiteProps};

static SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*-{4,}$").unwrap());

static LOCATION_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^(.*):(\d+):(\d+)$").unwrap());

static EVAL_LOCATION_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^eval at (.+), (.*):(\d+):(\d+)$").unwrap());

const ANONYMOUS: &str = "<anonymous>";

/// Parse a single stack frame line.
pub fn parse_line(line: &str) -> CallSite {
	if SEPARATOR_REGEX.is_match(line) {
		return CallSite::new(CallSiteProps {
			file_name: Some(line.to_string()),
			separator: true,
			..Default::default()
		});
	}

	match split_frame(line) {
		Some((caller, location)) => CallSite::new(frame_props(caller, location)),
		None => CallSite::default(),
	}
}

/// Parse every line of an iterator, preserving order.
pub fn parse_all<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<CallSite> {
	lines.into_iter().map(parse_line).collect()
}

/// Parse a full stack string. The first line is the error's own
/// `Name: message` header and is skipped.
///
/// Every line break starts a record, so a trailing newline yields a final
/// minimal record.
pub fn parse_stack(stack: &str) -> Vec<CallSite> {
	match stack.split_once('\n') {
		Some((_, frames)) => parse_all(frames.split('\n').map(|line| line.trim_end_matches('\r'))),
		None => Vec::new(),
	}
}

/// Split a stack into its header line and the remaining frame text.
pub fn split_header(stack: &str) -> (&str, &str) {
	match stack.split_once('\n') {
		Some((header, rest)) => (header.trim_end_matches('\r'), rest),
		None => (stack, ""),
	}
}

/// Render every call site in order.
pub fn stringify_all(call_sites: &[CallSite]) -> Vec<String> {
	call_sites.iter().map(ToString::to_string).collect()
}

/// Split `at <caller> (<location>)` / `at <location>` into its parts.
fn split_frame(line: &str) -> Option<(Option<&str>, &str)> {
	let idx = line.find("at ")?;
	if !line[..idx].trim().is_empty() {
		return None;
	}
	let rest = line[idx + 3..].trim();

	if let Some(inner_end) = rest.strip_suffix(')') {
		// Walk back to the parenthesis that opens the trailing location; eval
		// locations nest their own parentheses.
		let mut depth = 0usize;
		for (pos, ch) in inner_end.char_indices().rev() {
			match ch {
				')' => depth += 1,
				'(' if depth == 0 => {
					let caller = inner_end[..pos].trim();
					let location = &inner_end[pos + 1..];
					return Some(((!caller.is_empty()).then_some(caller), location));
				}
				'(' => depth -= 1,
				_ => {}
			}
		}
	}

	(!rest.is_empty()).then_some((None, rest))
}

fn frame_props(caller: Option<&str>, location: &str) -> CallSiteProps {
	let mut props = CallSiteProps::default();

	if let Some(caller) = caller {
		props.from_toplevel = true;
		apply_caller(&mut props, caller);
	}

	if let Some(caps) = EVAL_LOCATION_REGEX.captures(location) {
		props.from_eval = true;
		props.eval_origin = Some(parse_line(&format!("at {}", &caps[1])));
		props.file_name = Some(caps[2].to_string()).filter(|name| name != ANONYMOUS && !name.is_empty());
		props.line = caps[3].parse().ok();
		props.column = caps[4].parse().ok();
	} else if let Some(caps) = LOCATION_REGEX.captures(location) {
		props.file_name = Some(caps[1].to_string());
		props.line = caps[2].parse().ok();
		props.column = caps[3].parse().ok();
	} else if location == "native" {
		props.from_native = true;
	} else if !location.is_empty() {
		props.file_name = Some(location.to_string());
	}

	props
}

/// The caller is split on its first dot: `Object.method` becomes type
/// `Object`, method `method`, and the full text stays the function name.
fn apply_caller(props: &mut CallSiteProps, caller: &str) {
	let caller = match caller.strip_prefix("new ") {
		Some(rest) => {
			props.from_constructor = true;
			rest.trim_start()
		}
		None => caller,
	};

	props.function_name = Some(caller.to_string());
	props.type_name = Some("Object".to_string());

	if let Some((object, method)) = caller.split_once('.').filter(|(object, _)| !object.is_empty()) {
		props.type_name = Some(object.to_string());
		if method == ANONYMOUS {
			props.method_name = None;
			props.function_name = Some(String::new());
		} else if !method.is_empty() {
			props.method_name = Some(method.to_string());
		}
	}
}
