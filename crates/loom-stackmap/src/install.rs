// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Process-wide rewriter installation.

use std::sync::OnceLock;

use tracing::info;

use crate::error::{Result, StackmapError};
use crate::rewrite::{ErrorLike, StackRewriter};

static INSTALLED: OnceLock<StackRewriter> = OnceLock::new();

/// Install `rewriter` for the rest of the process. A second install fails
/// and leaves the first one in place.
pub fn install(rewriter: StackRewriter) -> Result<&'static StackRewriter> {
	INSTALLED
		.set(rewriter)
		.map_err(|_| StackmapError::AlreadyInstalled)?;
	info!("Stack rewriter installed");
	installed()
}

pub fn is_installed() -> bool {
	INSTALLED.get().is_some()
}

pub fn installed() -> Result<&'static StackRewriter> {
	INSTALLED.get().ok_or(StackmapError::NotInstalled)
}

/// Rewrite `error` with the installed rewriter.
pub fn rewrite_error(error: &mut ErrorLike) -> Result<&mut ErrorLike> {
	Ok(installed()?.rewrite(error))
}
