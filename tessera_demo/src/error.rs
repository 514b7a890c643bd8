// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::io;
use std::path::PathBuf;

use tessera_data::{GraphError, TreeError};

/// Errors reported by the demo.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// Reading the input or writing the output failed.
    #[error("cannot access `{}`", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// The option document is not valid JSON or has the wrong shape.
    #[error("invalid option document")]
    Json(#[from] serde_json::Error),
    /// The treemap data is malformed.
    #[error("invalid treemap data")]
    Tree(#[from] TreeError),
    /// The sankey data is malformed.
    #[error("invalid sankey data")]
    Graph(#[from] GraphError),
    /// The document has nothing to draw.
    #[error("option document has neither a `sankey` nor a `treemap` section")]
    NothingToDraw,
}
