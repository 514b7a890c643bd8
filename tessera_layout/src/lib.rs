// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout engines for flow and hierarchy charts.
//!
//! - [`SankeySpec`] positions the nodes and edges of a [`tessera_data::Graph`] as a sankey
//!   diagram. [`SankeyRibbon`] turns a laid-out edge into a band outline.
//! - [`Squarify`] tiles a rectangle with area-proportional, near-square rectangles.
//! - [`TreemapSpec`] applies squarify level by level over a [`tessera_data::Tree`].
//!
//! Engines are synchronous and infallible. Degenerate input (zero values, cycles, empty
//! bounds) produces a degenerate but finite layout rather than an error.

#![no_std]

extern crate alloc;

mod ribbon;
mod sankey;
mod squarify;
mod treemap;

pub use ribbon::SankeyRibbon;
pub use sankey::{NodeAlign, Orient, SankeySpec, compute_node_values};
pub use squarify::Squarify;
pub use treemap::{SortOrder, TreemapSpec};
