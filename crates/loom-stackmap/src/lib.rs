// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rewrites JavaScript error stacks so every frame points at original
//! source positions.
//!
//! Stacks are parsed into [`CallSite`]s, each frame's generated position is
//! mapped through the source map its file declares, and the stack is
//! rendered again in V8's format. Frames that cannot be mapped keep their
//! generated position.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use loom_stackmap::{ErrorLike, FileRetriever, StackRewriter, StackmapConfig};
//!
//! let retriever: Arc<dyn FileRetriever> = Arc::new(|id: &str| match id {
//!     "/srv/app.js" => Some("run();\n//# sourceMappingURL=app.js.map".to_string()),
//!     "/srv/app.js.map" => Some(
//!         r#"{"version":3,"sources":["app.ts"],"names":[],"mappings":"AAAA"}"#.to_string(),
//!     ),
//!     _ => None,
//! });
//!
//! let config = StackmapConfig {
//!     filesystem_fallback: false,
//!     ..Default::default()
//! };
//! let rewriter = StackRewriter::from_config(&config, retriever);
//!
//! let mut error = ErrorLike::from_stack("Error: boom\n    at run (/srv/app.js:1:1)");
//! rewriter.rewrite(&mut error);
//!
//! assert_eq!(error.stack.as_deref(), Some("\n\tat run (/srv/app.ts:1:1)"));
//! assert_eq!(error.to_string(), "Error: boom\n\tat run (/srv/app.ts:1:1)");
//! ```

pub mod config;
pub mod correction;
pub mod error;
pub mod install;
pub mod rewrite;

pub use config::{StackmapConfig, ENV_FS_FALLBACK};
pub use correction::{correct_column, ColumnCorrection, LEGACY_NODE_WRAPPER_LEN};
pub use error::{ConfigError, Result, StackmapError};
pub use install::{install, installed, is_installed, rewrite_error};
pub use rewrite::{ErrorLike, StackRewriter};

pub use loom_stackmap_core::{parse_line, parse_stack, CallSite, CallSiteProps, TraceError};
pub use loom_stackmap_symbolicate::{
	FileContentCache, FileRetriever, NoopRetriever, PositionMapper, SourceMapCache, SourcePosition,
};
