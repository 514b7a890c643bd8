// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data containers consumed by the tessera layout engines.
//!
//! This crate provides:
//! - a [`Tree`] built from nested option data, for treemaps,
//! - a directed [`Graph`] with per-node adjacency lists, for sankey diagrams,
//! - a [`group_by`] utility that buckets items by a key in ascending key order, and
//! - layout records ([`NodeLayout`], [`EdgeLayout`], [`TreeNodeLayout`]) with merge semantics
//!   via [`LayoutCapable`].
//!
//! Layout engines annotate these containers in place; nothing here knows about pixels.

#![no_std]

extern crate alloc;

mod attrs;
mod graph;
mod group;
mod tree;

pub use attrs::{EdgeLayout, LayoutCapable, Merge, NodeLayout, TreeNodeLayout};
pub use graph::{EdgeIndex, EdgeList, Graph, GraphEdge, GraphError, GraphNode, NodeIndex};
pub use group::{GroupKey, Groups, group_by};
pub use tree::{NodeId, TraverseOrder, Tree, TreeError, TreeItem, TreeNode, Visit};
