// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Base64 VLQ decoding of the source map `mappings` field.

use crate::error::{Result, SymbolicateError};

const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const CONTINUATION_BIT: i64 = 0b100000;
const VALUE_MASK: i64 = 0b011111;

fn decode_char(ch: u8) -> Result<i64> {
	BASE64_CHARS
		.iter()
		.position(|&c| c == ch)
		.map(|pos| pos as i64)
		.ok_or(SymbolicateError::InvalidVlqChar(ch as char))
}

/// Decode one comma-separated segment into its signed fields.
///
/// A segment carries 1 (generated column only), 4 (plus source, original
/// line, original column) or 5 (plus name) values, each relative to the
/// previous segment.
pub fn decode_vlq_segment(segment: &str) -> Result<Vec<i32>> {
	let mut values = Vec::with_capacity(5);
	let mut value = 0i64;
	let mut shift = 0u32;

	for ch in segment.bytes() {
		let digit = decode_char(ch)?;
		value += (digit & VALUE_MASK) << shift;
		shift += 5;

		if shift > 35 {
			return Err(SymbolicateError::VlqOverflow(segment.to_string()));
		}

		if digit & CONTINUATION_BIT == 0 {
			// Lowest bit is the sign.
			let magnitude = value >> 1;
			let signed = if value & 1 != 0 { -magnitude } else { magnitude };
			values.push(
				i32::try_from(signed).map_err(|_| SymbolicateError::VlqOverflow(segment.to_string()))?,
			);
			value = 0;
			shift = 0;
		}
	}

	Ok(values)
}

/// Position a generated segment points back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalLocation {
	pub source_index: u32,
	/// 0-indexed.
	pub line: u32,
	/// 0-indexed.
	pub column: u32,
	pub name_index: Option<u32>,
}

/// A single decoded segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
	/// Line in the generated file (0-indexed).
	pub generated_line: u32,
	/// Column in the generated file (0-indexed).
	pub generated_column: u32,
	/// `None` for segments that explicitly map to nothing.
	pub original: Option<OriginalLocation>,
}

/// Decoded mappings ordered by generated line, then column.
#[derive(Debug, Clone, Default)]
pub struct DecodedMappings {
	mappings: Vec<Mapping>,
}

impl DecodedMappings {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_unsorted(mut mappings: Vec<Mapping>) -> Self {
		mappings.sort_by_key(|m| (m.generated_line, m.generated_column));
		Self { mappings }
	}

	/// Closest segment at or before `column` on `line` (both 0-indexed).
	pub fn find(&self, line: u32, column: u32) -> Option<&Mapping> {
		let line_start = self.mappings.partition_point(|m| m.generated_line < line);
		let line_end = self.mappings.partition_point(|m| m.generated_line <= line);
		let on_line = &self.mappings[line_start..line_end];

		match on_line.partition_point(|m| m.generated_column <= column) {
			0 => None,
			idx => Some(&on_line[idx - 1]),
		}
	}

	pub fn len(&self) -> usize {
		self.mappings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.mappings.is_empty()
	}
}

/// Decode a full `mappings` string.
///
/// Lines are separated by `;`, segments by `,`. The generated column resets
/// on every line; all other fields carry across lines.
pub fn decode_vlq_mappings(mappings: &str) -> Result<DecodedMappings> {
	let mut decoded = Vec::new();

	let mut source = 0i64;
	let mut original_line = 0i64;
	let mut original_column = 0i64;
	let mut name = 0i64;

	for (generated_line, line) in mappings.split(';').enumerate() {
		let mut generated_column = 0i64;

		for segment in line.split(',').filter(|s| !s.is_empty()) {
			let values = decode_vlq_segment(segment)?;
			let Some(&column_delta) = values.first() else {
				continue;
			};
			generated_column += i64::from(column_delta);

			let original = if values.len() >= 4 {
				source += i64::from(values[1]);
				original_line += i64::from(values[2]);
				original_column += i64::from(values[3]);
				let name_index = match values.get(4) {
					Some(&delta) => {
						name += i64::from(delta);
						Some(to_index(name, segment)?)
					}
					None => None,
				};

				Some(OriginalLocation {
					source_index: to_index(source, segment)?,
					line: to_index(original_line, segment)?,
					column: to_index(original_column, segment)?,
					name_index,
				})
			} else {
				None
			};

			decoded.push(Mapping {
				generated_line: generated_line as u32,
				generated_column: to_index(generated_column, segment)?,
				original,
			});
		}
	}

	Ok(DecodedMappings::from_unsorted(decoded))
}

/// Accumulated fields must fit a `u32`; negative sums clamp to 0.
fn to_index(value: i64, segment: &str) -> Result<u32> {
	u32::try_from(value.max(0)).map_err(|_| SymbolicateError::VlqOverflow(segment.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_decode_vlq_segment_simple() {
		assert_eq!(decode_vlq_segment("A").unwrap(), vec![0]);
		assert_eq!(decode_vlq_segment("C").unwrap(), vec![1]);
		assert_eq!(decode_vlq_segment("D").unwrap(), vec![-1]);
	}

	#[test]
	fn test_decode_vlq_segment_multi_value() {
		assert_eq!(decode_vlq_segment("AACA").unwrap(), vec![0, 0, 1, 0]);
		assert_eq!(decode_vlq_segment("SAAS").unwrap(), vec![9, 0, 0, 9]);
	}

	#[test]
	fn test_decode_vlq_segment_continuation() {
		assert_eq!(decode_vlq_segment("gB").unwrap(), vec![16]);
	}

	#[test]
	fn test_invalid_vlq_char() {
		assert!(matches!(
			decode_vlq_segment("!"),
			Err(SymbolicateError::InvalidVlqChar('!'))
		));
	}

	#[test]
	fn test_overlong_segment_is_rejected() {
		assert!(matches!(
			decode_vlq_segment("gggggggB"),
			Err(SymbolicateError::VlqOverflow(_))
		));
	}

	#[test]
	fn test_accumulated_overflow_is_rejected() {
		// three column deltas of i32::MAX sum past u32::MAX
		let err = decode_vlq_mappings("AAA+/////D,CAA+/////D,CAA+/////D").unwrap_err();
		assert!(matches!(err, SymbolicateError::VlqOverflow(ref segment) if segment == "CAA+/////D"));

		let err = decode_vlq_mappings("+/////D,+/////D,+/////D").unwrap_err();
		assert!(matches!(err, SymbolicateError::VlqOverflow(_)));
	}

	#[test]
	fn test_accumulated_maximum_still_decodes() {
		let decoded = decode_vlq_mappings("AAA+/////D,CAA+/////D,CAAC").unwrap();
		let last = decoded.find(0, 2).unwrap();
		assert_eq!(last.original.unwrap().column, u32::MAX);
	}

	#[test]
	fn test_state_carries_across_lines() {
		let decoded = decode_vlq_mappings("AAAA;AACA").unwrap();
		assert_eq!(decoded.len(), 2);

		let second = decoded.find(1, 0).unwrap();
		assert_eq!(second.original.unwrap().line, 1);
	}

	#[test]
	fn test_unmapped_segment_shadows_previous() {
		// col 0 -> source, col 5 -> nothing
		let decoded = decode_vlq_mappings("AAAA,K").unwrap();

		assert!(decoded.find(0, 3).unwrap().original.is_some());
		assert!(decoded.find(0, 7).unwrap().original.is_none());
	}

	#[test]
	fn test_find_greatest_lower_bound() {
		// columns 0, 10, 20
		let decoded = decode_vlq_mappings("AAAA,UACK,UACK").unwrap();

		assert_eq!(decoded.find(0, 5).unwrap().generated_column, 0);
		assert_eq!(decoded.find(0, 15).unwrap().generated_column, 10);
		assert_eq!(decoded.find(0, 25).unwrap().generated_column, 20);
		assert!(decoded.find(1, 0).is_none());
	}

	#[test]
	fn test_find_before_first_column() {
		let decoded = decode_vlq_mappings("KAAA").unwrap();
		assert!(decoded.find(0, 2).is_none());
		assert!(decoded.find(0, 5).is_some());
	}

	#[test]
	fn test_out_of_order_segments_are_sorted() {
		let decoded = DecodedMappings::from_unsorted(vec![
			Mapping {
				generated_line: 0,
				generated_column: 9,
				original: None,
			},
			Mapping {
				generated_line: 0,
				generated_column: 1,
				original: None,
			},
		]);
		assert_eq!(decoded.find(0, 4).unwrap().generated_column, 1);
	}

	proptest! {
		#[test]
		fn find_returns_lower_bound_on_same_line(
			mappings in "[A-Za-z0-9+/]{0,6}(,[A-Za-z0-9+/]{1,6}){0,5}(;[A-Za-z0-9+/]{0,6}){0,3}",
			line in 0u32..4,
			column in 0u32..500,
		) {
			// Random input may be malformed; it must never panic.
			if let Ok(decoded) = decode_vlq_mappings(&mappings) {
				if let Some(mapping) = decoded.find(line, column) {
					prop_assert_eq!(mapping.generated_line, line);
					prop_assert!(mapping.generated_column <= column);
				}
			}
		}
	}
}
