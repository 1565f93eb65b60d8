// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Column corrections for runtimes that prepend code to user modules.
//!
//! Some runtimes wrap every module in a fixed prefix on its first line, so
//! columns on line 1 are shifted by the prefix length. A correction applies
//! when the bottom frame of the stack is the runtime's module loader.

use serde::{Deserialize, Serialize};

/// Length of the function wrapper old Node releases prepend to line 1.
pub const LEGACY_NODE_WRAPPER_LEN: u32 = 63;

fn default_line() -> u32 {
	1
}

/// One entry of the correction table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCorrection {
	/// Label for the runtime/version this entry targets.
	pub runtime: String,
	/// File name of the loader frame at the bottom of the stack.
	pub loader_file: String,
	#[serde(default = "default_line")]
	pub line: u32,
	pub column_offset: u32,
}

impl ColumnCorrection {
	pub fn legacy_node_module_wrapper() -> Self {
		Self {
			runtime: "node-legacy".to_string(),
			loader_file: "module.js".to_string(),
			line: 1,
			column_offset: LEGACY_NODE_WRAPPER_LEN,
		}
	}

	pub fn applies_to(&self, bottom_file: Option<&str>, line: u32) -> bool {
		bottom_file == Some(self.loader_file.as_str()) && line == self.line
	}
}

/// Apply the first matching correction to a 0-based column.
pub fn correct_column(
	corrections: &[ColumnCorrection],
	bottom_file: Option<&str>,
	line: u32,
	column: u32,
) -> u32 {
	corrections
		.iter()
		.find(|c| c.applies_to(bottom_file, line))
		.map_or(column, |c| column.saturating_sub(c.column_offset))
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_legacy_node_correction_applies_on_first_line() {
		let table = [ColumnCorrection::legacy_node_module_wrapper()];

		assert_eq!(correct_column(&table, Some("module.js"), 1, 100), 37);
		assert_eq!(correct_column(&table, Some("module.js"), 2, 100), 100);
		assert_eq!(correct_column(&table, Some("node:internal/modules/cjs/loader"), 1, 100), 100);
		assert_eq!(correct_column(&table, None, 1, 100), 100);
	}

	#[test]
	fn test_correction_saturates() {
		let table = [ColumnCorrection::legacy_node_module_wrapper()];
		assert_eq!(correct_column(&table, Some("module.js"), 1, 10), 0);
	}

	#[test]
	fn test_empty_table_is_identity() {
		assert_eq!(correct_column(&[], Some("module.js"), 1, 100), 100);
	}

	proptest! {
		#[test]
		fn correction_never_moves_right(
			line in 1u32..10,
			column in 0u32..10_000,
			offset in 0u32..200,
		) {
			let table = [ColumnCorrection {
				runtime: "test".to_string(),
				loader_file: "loader.js".to_string(),
				line: 1,
				column_offset: offset,
			}];

			let corrected = correct_column(&table, Some("loader.js"), line, column);
			prop_assert!(corrected <= column);
			if line != 1 {
				prop_assert_eq!(corrected, column);
			}
		}
	}
}
