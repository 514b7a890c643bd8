// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Directed graph for flow diagrams.
//!
//! Nodes and edges live in two arenas and refer to each other by index, so layout passes can
//! reorder adjacency lists or rewrite layout records without fighting the borrow checker.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::attrs::{EdgeLayout, LayoutCapable, NodeLayout};

/// Identifies a node inside a [`Graph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Returns the arena slot of this node.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies an edge inside a [`Graph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIndex(pub u32);

impl EdgeIndex {
    /// Returns the arena slot of this edge.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Adjacency list of a node.
pub type EdgeList = SmallVec<[EdgeIndex; 4]>;

/// Errors returned when building a [`Graph`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// A node with the same id already exists.
    #[error("duplicate graph node id `{0}`")]
    DuplicateNode(String),
    /// An edge refers to a node that does not exist.
    #[error("no graph node with id `{0}`")]
    MissingNode(String),
    /// An edge value is not finite.
    #[error("edge `{from}` -> `{to}` has a non-finite value {value}")]
    InvalidEdgeValue {
        /// Source node id.
        from: String,
        /// Target node id.
        to: String,
        /// The rejected value.
        value: f64,
    },
}

/// A node of a [`Graph`].
#[derive(Clone, Debug)]
pub struct GraphNode {
    /// Unique id.
    pub id: String,
    /// Raw value from the source data, if any.
    pub value: Option<f64>,
    /// Explicit column index from the source data.
    ///
    /// Only finite, non-negative values are honoured by layouts.
    pub depth: Option<f64>,
    /// Incoming edges.
    pub in_edges: EdgeList,
    /// Outgoing edges.
    pub out_edges: EdgeList,
    /// Layout annotations.
    pub layout: NodeLayout,
}

impl GraphNode {
    /// Returns the explicit column index if it is usable.
    pub fn explicit_depth(&self) -> Option<f64> {
        self.depth.filter(|d| d.is_finite() && *d >= 0.0)
    }
}

impl LayoutCapable for GraphNode {
    type Layout = NodeLayout;

    fn layout(&self) -> &NodeLayout {
        &self.layout
    }

    fn layout_mut(&mut self) -> &mut NodeLayout {
        &mut self.layout
    }
}

/// A directed edge of a [`Graph`].
#[derive(Clone, Debug)]
pub struct GraphEdge {
    /// Source node.
    pub node1: NodeIndex,
    /// Target node.
    pub node2: NodeIndex,
    value: f64,
    /// Layout annotations.
    pub layout: EdgeLayout,
}

impl GraphEdge {
    /// Returns the (non-negative) edge value.
    pub fn get_value(&self) -> f64 {
        self.value
    }
}

impl LayoutCapable for GraphEdge {
    type Layout = EdgeLayout;

    fn layout(&self) -> &EdgeLayout {
        &self.layout
    }

    fn layout_mut(&mut self) -> &mut EdgeLayout {
        &mut self.layout
    }
}

/// A directed graph.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    ids: HashMap<String, NodeIndex>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with the given id.
    pub fn add_node(&mut self, id: impl Into<String>) -> Result<NodeIndex, GraphError> {
        let id = id.into();
        if self.ids.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "node counts stay below u32::MAX"
        )]
        let index = NodeIndex(self.nodes.len() as u32);
        self.ids.insert(id.clone(), index);
        self.nodes.push(GraphNode {
            id,
            value: None,
            depth: None,
            in_edges: EdgeList::new(),
            out_edges: EdgeList::new(),
            layout: NodeLayout::default(),
        });
        Ok(index)
    }

    /// Adds an edge between two nodes looked up by id.
    ///
    /// Negative values clamp to `0`.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        value: f64,
    ) -> Result<EdgeIndex, GraphError> {
        let n1 = self
            .node_by_id(source)
            .ok_or_else(|| GraphError::MissingNode(String::from(source)))?;
        let n2 = self
            .node_by_id(target)
            .ok_or_else(|| GraphError::MissingNode(String::from(target)))?;
        if !value.is_finite() {
            return Err(GraphError::InvalidEdgeValue {
                from: String::from(source),
                to: String::from(target),
                value,
            });
        }
        Ok(self.add_edge_between(n1, n2, value.max(0.0)))
    }

    /// Adds an edge between two existing nodes.
    ///
    /// # Panics
    ///
    /// Panics if either index does not belong to this graph.
    pub fn add_edge_between(&mut self, n1: NodeIndex, n2: NodeIndex, value: f64) -> EdgeIndex {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "edge counts stay below u32::MAX"
        )]
        let index = EdgeIndex(self.edges.len() as u32);
        self.edges.push(GraphEdge {
            node1: n1,
            node2: n2,
            value,
            layout: EdgeLayout::default(),
        });
        self.nodes[n1.index()].out_edges.push(index);
        self.nodes[n2.index()].in_edges.push(index);
        index
    }

    /// Looks a node up by id.
    pub fn node_by_id(&self, id: &str) -> Option<NodeIndex> {
        self.ids.get(id).copied()
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Returns a node.
    pub fn node(&self, n: NodeIndex) -> &GraphNode {
        &self.nodes[n.index()]
    }

    /// Returns a node mutably.
    pub fn node_mut(&mut self, n: NodeIndex) -> &mut GraphNode {
        &mut self.nodes[n.index()]
    }

    /// Returns an edge.
    pub fn edge(&self, e: EdgeIndex) -> &GraphEdge {
        &self.edges[e.index()]
    }

    /// Returns an edge mutably.
    pub fn edge_mut(&mut self, e: EdgeIndex) -> &mut GraphEdge {
        &mut self.edges[e.index()]
    }

    /// Incoming edges of `n`.
    pub fn in_edges(&self, n: NodeIndex) -> &[EdgeIndex] {
        &self.nodes[n.index()].in_edges
    }

    /// Outgoing edges of `n`.
    pub fn out_edges(&self, n: NodeIndex) -> &[EdgeIndex] {
        &self.nodes[n.index()].out_edges
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node indices in insertion order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + use<> {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "node counts stay below u32::MAX"
        )]
        let count = self.nodes.len() as u32;
        (0..count).map(NodeIndex)
    }

    /// Edge indices in insertion order.
    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> + use<> {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "edge counts stay below u32::MAX"
        )]
        let count = self.edges.len() as u32;
        (0..count).map(EdgeIndex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_linked_on_both_ends() {
        let mut g = Graph::new();
        let a = g.add_node("a").unwrap();
        let b = g.add_node("b").unwrap();
        let e = g.add_edge("a", "b", 3.0).unwrap();

        assert_eq!(g.out_edges(a), &[e]);
        assert_eq!(g.in_edges(b), &[e]);
        assert!(g.in_edges(a).is_empty());
        assert_eq!(g.edge(e).node1, a);
        assert_eq!(g.edge(e).node2, b);
        assert_eq!(g.edge(e).get_value(), 3.0);
    }

    #[test]
    fn rejects_bad_input() {
        let mut g = Graph::new();
        g.add_node("a").unwrap();
        assert_eq!(
            g.add_node("a"),
            Err(GraphError::DuplicateNode("a".into()))
        );
        assert_eq!(
            g.add_edge("a", "zz", 1.0),
            Err(GraphError::MissingNode("zz".into()))
        );
        g.add_node("b").unwrap();
        assert!(matches!(
            g.add_edge("a", "b", f64::NAN),
            Err(GraphError::InvalidEdgeValue { .. })
        ));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn negative_edge_values_clamp() {
        let mut g = Graph::new();
        g.add_node("a").unwrap();
        g.add_node("b").unwrap();
        let e = g.add_edge("a", "b", -2.0).unwrap();
        assert_eq!(g.edge(e).get_value(), 0.0);
    }

    #[test]
    fn explicit_depth_ignores_negative_and_nan() {
        let mut g = Graph::new();
        let a = g.add_node("a").unwrap();
        g.node_mut(a).depth = Some(-1.0);
        assert_eq!(g.node(a).explicit_depth(), None);
        g.node_mut(a).depth = Some(f64::NAN);
        assert_eq!(g.node(a).explicit_depth(), None);
        g.node_mut(a).depth = Some(2.0);
        assert_eq!(g.node(a).explicit_depth(), Some(2.0));
    }

    #[test]
    fn indices_follow_insertion_order() {
        let mut g = Graph::new();
        let a = g.add_node("a").unwrap();
        let b = g.add_node("b").unwrap();
        let c = g.add_node("c").unwrap();
        let e0 = g.add_edge("a", "b", 1.0).unwrap();
        let e1 = g.add_edge_between(b, c, 2.0);

        assert_eq!(g.node_indices().collect::<Vec<_>>(), [a, b, c]);
        assert_eq!(g.edge_indices().collect::<Vec<_>>(), [e0, e1]);
        assert_eq!(g.node(g.node_indices().last().unwrap()).id, "c");
        assert_eq!(e1, EdgeIndex(1));
    }
}
