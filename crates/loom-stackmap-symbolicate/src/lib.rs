// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map resolution for Loom stackmap.
//!
//! This crate provides functionality for:
//! - Locating the `sourceMappingURL` a generated file declares (external or
//!   inline base64 data URL)
//! - Decoding source map v3 files (VLQ mappings)
//! - Caching retrieved files and source maps, including negative results
//! - Mapping a generated position to its original position
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use loom_stackmap_symbolicate::{FileRetriever, PositionMapper, SourcePosition};
//!
//! let retriever: Arc<dyn FileRetriever> = Arc::new(|id: &str| match id {
//!     "/srv/app.js" => Some("run();\n//# sourceMappingURL=app.js.map".to_string()),
//!     "/srv/app.js.map" => Some(
//!         r#"{"version":3,"sources":["app.ts"],"names":[],"mappings":"AAAA"}"#.to_string(),
//!     ),
//!     _ => None,
//! });
//!
//! let mapper = PositionMapper::builder()
//!     .retriever(retriever)
//!     .filesystem_fallback(false)
//!     .build();
//!
//! let original = mapper.map_position(SourcePosition::new("/srv/app.js", 1, 0));
//! assert_eq!(original, SourcePosition::new("/srv/app.ts", 1, 0));
//! ```

pub mod cache;
pub mod error;
pub mod locate;
pub mod mapper;
pub mod retrieve;
pub mod sourcemap;
pub mod vlq;

pub use cache::{
	CachedSourceMap, FileContentCache, InMemoryFileCache, InMemorySourceMapCache, SourceMapCache,
};
pub use error::{Result, SymbolicateError};
pub use locate::{locate_source_map_reference, resolve_relative, retrieve_source_map, RetrievedSourceMap};
pub use mapper::{ConsumerFactory, PositionMapper, PositionMapperBuilder, SourcePosition};
pub use retrieve::{FileLoader, FileRetriever, NoopRetriever};
pub use sourcemap::{OriginalPosition, ParsedSourceMap, SourceMapConsumer};
pub use vlq::{decode_vlq_mappings, decode_vlq_segment, DecodedMappings, Mapping, OriginalLocation};
