// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod args;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use loom_stackmap::{parse_stack, NoopRetriever, StackRewriter};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use args::Args;

fn main() -> Result<()> {
	// stdout carries the rewritten stack
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(std::io::stderr)
		.init();

	let args = Args::parse();
	let config = args.stackmap_config()?;
	debug!(?config, "Loaded configuration");

	let rewriter = StackRewriter::from_config(&config, Arc::new(NoopRetriever));
	let stack = args.read_input()?;
	let stack = stack.trim_end();

	if args.json {
		let mut call_sites = parse_stack(stack);
		rewriter.map_call_sites(&mut call_sites);
		println!("{}", serde_json::to_string_pretty(&call_sites)?);
	} else {
		println!("{}", rewriter.rewrite_stack(stack));
	}

	info!(frames = stack.lines().count().saturating_sub(1), "Stack rewritten");
	Ok(())
}
