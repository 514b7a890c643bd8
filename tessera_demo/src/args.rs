// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Renders the sankey and treemap sections of a JSON option document to SVG.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON option document.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path of the SVG file to write.
    #[arg(short, long, default_value = "out.svg")]
    pub output: PathBuf,

    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
