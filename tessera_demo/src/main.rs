// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `tessera-demo` entry point.

use std::error::Error as _;
use std::process;
use std::str::FromStr;

use clap::Parser;
use log::LevelFilter;

use tessera_demo::Args;

fn main() {
    let args = Args::parse();

    let level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("invalid log level `{}`, using `warn`", args.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .init();
    log::debug!("{args:?}");

    if let Err(err) = tessera_demo::run(&args) {
        log::error!("{err}");
        let mut source = err.source();
        while let Some(cause) = source {
            log::error!("  caused by: {cause}");
            source = cause.source();
        }
        process::exit(1);
    }
}
