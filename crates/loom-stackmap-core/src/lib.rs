// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Loom stackmap system.
//!
//! This crate turns the textual stack trace of a JavaScript error into a
//! sequence of structured [`CallSite`] records and renders them back in the
//! exact shape V8 prints them. It is used by `loom-stackmap` to rewrite
//! generated positions into original ones.
//!
//! # Overview
//!
//! - [`parse_line`] / [`parse_stack`]: lenient parser for `at ...` frame lines
//!   (native, eval, constructor, method and anonymous frames)
//! - [`CallSite`]: one frame; implements [`std::fmt::Display`] with V8's
//!   composition rules
//! - [`TraceError`]: an error header plus its parsed frames
//!
//! # Example
//!
//! ```
//! use loom_stackmap_core::parse_stack;
//!
//! let stack = "TypeError: boom\n    at Object.run (/srv/app.js:12:4)\n    at next (native)";
//! let frames = parse_stack(stack);
//!
//! assert_eq!(frames.len(), 2);
//! assert_eq!(frames[0].to_string(), "Object.run (/srv/app.js:12:4)");
//! assert_eq!(frames[1].to_string(), "next (native)");
//! ```

pub mod call_site;
pub mod error;
pub mod parse;
pub mod trace;

pub use call_site::{CallSite, CallSiteProps};
pub use error::{Result, StackmapCoreError};
pub use parse::{parse_all, parse_line, parse_stack, split_header, stringify_all};
pub use trace::{parse_header, TraceError};
