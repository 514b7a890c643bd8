// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchical data for treemaps.
//!
//! A [`Tree`] is an arena of [`TreeNode`]s addressed by [`NodeId`]. Nodes are stored in
//! pre-order, so the root is always the first node and a node's data index is its arena slot.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::attrs::{LayoutCapable, TreeNodeLayout};

/// Identifies a node inside a [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Returns the arena slot of this node.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One item of raw nested option data.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TreeItem {
    /// Display name. Also the node id unless `id` is set.
    pub name: String,
    /// Explicit id.
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: Option<String>,
    /// Value. Required on leaves; derived from the children otherwise.
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: Option<f64>,
    /// Nested items.
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<TreeItem>,
}

impl TreeItem {
    /// Creates a leaf item.
    pub fn leaf(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            ..Self::default()
        }
    }

    /// Creates an item whose value is the sum of its children.
    pub fn branch(name: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            name: name.into(),
            children,
            ..Self::default()
        }
    }

    /// Sets an explicit id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Errors returned when building a [`Tree`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// A leaf item has no value, or a value that is not finite.
    #[error("tree item `{name}` has an invalid value {value:?}")]
    InvalidValue {
        /// Name of the offending item.
        name: String,
        /// The value found on the item.
        value: Option<f64>,
    },
    /// An explicit item id is already taken.
    #[error("duplicate tree node id `{0}`")]
    DuplicateId(String),
    /// No node has the requested id.
    #[error("no tree node with id `{0}`")]
    UnknownId(String),
}

/// A node of a [`Tree`].
#[derive(Clone, Debug)]
pub struct TreeNode {
    /// Unique id within the tree.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Value after completion (non-negative).
    pub value: f64,
    /// Distance from the root (root is `0`).
    pub depth: u32,
    /// Height of the subtree rooted here (a leaf has height `1`).
    pub height: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Children selected by the most recent treemap pass.
    pub view_children: Vec<NodeId>,
    /// Layout annotations.
    pub layout: TreeNodeLayout,
}

impl TreeNode {
    /// Returns the parent, or `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the children in data order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns `true` if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl LayoutCapable for TreeNode {
    type Layout = TreeNodeLayout;

    fn layout(&self) -> &TreeNodeLayout {
        &self.layout
    }

    fn layout_mut(&mut self) -> &mut TreeNodeLayout {
        &mut self.layout
    }
}

/// Traversal order for [`Tree::each_node`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraverseOrder {
    /// Visit a node before its children.
    #[default]
    PreOrder,
    /// Visit a node after its children.
    PostOrder,
}

/// Visitor result for [`Tree::each_node`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    /// Keep descending.
    Continue,
    /// Skip the subtree of the node just visited (pre-order only).
    SkipChildren,
}

/// An arena-backed tree.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    ids: HashMap<String, NodeId>,
    view_root: NodeId,
}

impl Tree {
    /// The root node id.
    pub const ROOT: NodeId = NodeId(0);

    /// Builds a tree from nested option data.
    ///
    /// The root is a synthetic node with id `root_id` whose children are `items`. Values are
    /// completed bottom-up: an item without a value takes the sum of its children, and
    /// negative values clamp to `0`.
    ///
    /// An item without an explicit id is keyed by its name. Repeated names get a
    /// `__ec__{n}` suffix, so `index.js` under two folders yields `index.js` and
    /// `index.js__ec__1`. Explicit ids must be unique.
    pub fn from_option_data(root_id: &str, items: &[TreeItem]) -> Result<Self, TreeError> {
        let mut tree = Self {
            nodes: Vec::new(),
            ids: HashMap::new(),
            view_root: Self::ROOT,
        };
        let root = tree.push(String::from(root_id), String::from(root_id), None)?;
        let mut name_repeats = HashMap::new();
        let mut sum = 0.0;
        for item in items {
            sum += tree.build(item, root, &mut name_repeats)?;
        }
        tree.nodes[root.index()].value = sum;
        tree.update_depth_and_height(root, 0);
        log::trace!(
            "built tree `{root_id}` with {} nodes, height {}",
            tree.nodes.len(),
            tree.nodes[root.index()].height
        );
        Ok(tree)
    }

    fn push(
        &mut self,
        id: String,
        name: String,
        parent: Option<NodeId>,
    ) -> Result<NodeId, TreeError> {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "node counts stay below u32::MAX"
        )]
        let node_id = NodeId(self.nodes.len() as u32);
        match self.ids.entry(id.clone()) {
            Entry::Occupied(_) => return Err(TreeError::DuplicateId(id)),
            Entry::Vacant(e) => {
                e.insert(node_id);
            }
        }
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(node_id);
        }
        self.nodes.push(TreeNode {
            id,
            name,
            value: 0.0,
            depth: 0,
            height: 0,
            parent,
            children: Vec::new(),
            view_children: Vec::new(),
            layout: TreeNodeLayout::default(),
        });
        Ok(node_id)
    }

    /// Returns a free id derived from `name`, counting repeats in `name_repeats`.
    fn id_from_name(&self, name: &str, name_repeats: &mut HashMap<String, u32>) -> String {
        let count = name_repeats.entry(String::from(name)).or_insert(0);
        loop {
            let id = if *count == 0 {
                String::from(name)
            } else {
                format!("{name}__ec__{count}")
            };
            *count += 1;
            if !self.ids.contains_key(&id) {
                return id;
            }
        }
    }

    /// Adds `item` under `parent`, returning its completed value.
    fn build(
        &mut self,
        item: &TreeItem,
        parent: NodeId,
        name_repeats: &mut HashMap<String, u32>,
    ) -> Result<f64, TreeError> {
        let id = match &item.id {
            Some(id) => id.clone(),
            None => self.id_from_name(&item.name, name_repeats),
        };
        let node = self.push(id, item.name.clone(), Some(parent))?;

        let mut sum = 0.0;
        for child in &item.children {
            sum += self.build(child, node, name_repeats)?;
        }

        let value = match item.value {
            Some(v) if v.is_finite() => v,
            None if !item.children.is_empty() => sum,
            other => {
                return Err(TreeError::InvalidValue {
                    name: item.name.clone(),
                    value: other,
                });
            }
        };
        let value = if value < 0.0 {
            log::debug!("clamping negative value {value} of `{}` to 0", item.name);
            0.0
        } else {
            value
        };
        self.nodes[node.index()].value = value;
        Ok(value)
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the root node id.
    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Returns the node layouts start from.
    pub fn view_root(&self) -> NodeId {
        self.view_root
    }

    /// Drills down (or back up) by moving the view root to the node with `id`.
    ///
    /// The tree itself is not rebuilt.
    pub fn set_view_root(&mut self, id: &str) -> Result<NodeId, TreeError> {
        let node = self
            .get_node_by_id(id)
            .ok_or_else(|| TreeError::UnknownId(String::from(id)))?;
        self.view_root = node;
        Ok(node)
    }

    /// Returns a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    /// Returns a node mutably.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.index()]
    }

    /// Iterates all nodes in pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "node counts stay below u32::MAX"
                )]
                let id = NodeId(i as u32);
                (id, n)
            })
    }

    /// Looks a node up by its id.
    pub fn get_node_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Visits the subtree rooted at `start` (including `start`).
    ///
    /// In pre-order, returning [`Visit::SkipChildren`] skips the subtree of the visited node.
    pub fn each_node(
        &self,
        start: NodeId,
        order: TraverseOrder,
        mut visitor: impl FnMut(NodeId, &TreeNode) -> Visit,
    ) {
        self.visit(start, order, &mut visitor);
    }

    fn visit(
        &self,
        id: NodeId,
        order: TraverseOrder,
        visitor: &mut impl FnMut(NodeId, &TreeNode) -> Visit,
    ) {
        let node = self.node(id);
        if order == TraverseOrder::PreOrder && visitor(id, node) == Visit::SkipChildren {
            return;
        }
        for &child in &node.children {
            self.visit(child, order, visitor);
        }
        if order == TraverseOrder::PostOrder {
            visitor(id, node);
        }
    }

    /// Recomputes `depth` and `height` for the subtree rooted at `id`.
    pub fn update_depth_and_height(&mut self, id: NodeId, depth: u32) {
        let mut height = 0;
        self.nodes[id.index()].depth = depth;
        for i in 0..self.nodes[id.index()].children.len() {
            let child = self.nodes[id.index()].children[i];
            self.update_depth_and_height(child, depth + 1);
            height = height.max(self.nodes[child.index()].height);
        }
        self.nodes[id.index()].height = height + 1;
    }

    /// Returns `true` if `node` is `ancestor` or lies in its subtree.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.is_ancestor_of(ancestor, node)
    }

    /// Returns the ancestors of `id`, root first.
    pub fn ancestors(&self, id: NodeId, include_self: bool) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = if include_self {
            Some(id)
        } else {
            self.node(id).parent
        };
        while let Some(n) = cur {
            out.push(n);
            cur = self.node(n).parent;
        }
        out.reverse();
        out
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = self.node(node).parent;
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.node(p).parent;
        }
        false
    }

    /// Returns `true` if `node` is a strict descendant of `ancestor`.
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        node != ancestor && self.is_ancestor_of(ancestor, node)
    }
}
