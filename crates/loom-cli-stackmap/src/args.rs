// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use loom_stackmap::StackmapConfig;

/// Rewrite a JavaScript error stack to original source positions
#[derive(Parser, Debug)]
#[command(name = "loom-stackmap", version)]
pub struct Args {
	/// TOML configuration file
	#[arg(long, env = "LOOM_STACKMAP_CONFIG")]
	pub config: Option<PathBuf>,

	/// Never read files from disk
	#[arg(long)]
	pub no_fs_fallback: bool,

	/// Print the mapped frames as JSON instead of a stack
	#[arg(long)]
	pub json: bool,

	/// File holding the stack (defaults to stdin)
	pub input: Option<PathBuf>,
}

impl Args {
	/// Defaults, then the config file, then the environment, then flags.
	pub fn stackmap_config(&self) -> Result<StackmapConfig> {
		let config = match &self.config {
			Some(path) => StackmapConfig::load(path)?,
			None => StackmapConfig::default(),
		};
		let mut config = config.apply_env()?;

		if self.no_fs_fallback {
			config.filesystem_fallback = false;
		}
		Ok(config)
	}

	pub fn read_input(&self) -> Result<String> {
		match &self.input {
			Some(path) => std::fs::read_to_string(path)
				.with_context(|| format!("failed to read {}", path.display())),
			None => std::io::read_to_string(std::io::stdin()).context("failed to read stdin"),
		}
	}
}
