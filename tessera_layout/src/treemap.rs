// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nested treemap layout.
//!
//! [`TreemapSpec::layout`] walks a [`Tree`] from its view root. At each node it insets the
//! node rectangle by the border, picks the children to show, scales their values to the inner
//! area and tiles them with [`Squarify`]. Children are then shrunk by half the gap on every
//! side and laid out in turn.
//!
//! Rectangles are absolute: a child's rectangle lies inside its parent's.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::Rect;
use tessera_data::{LayoutCapable, NodeId, Tree, TreeNodeLayout};

use crate::squarify::Squarify;

/// Sort order for treemap children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest value first.
    Asc,
    /// Largest value first.
    Desc,
}

/// Treemap layout configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreemapSpec {
    /// Rectangle given to the view root.
    pub bounds: Rect,
    /// Child ordering, descending by default. Without one, children keep data order.
    pub sort: Option<SortOrder>,
    /// Children whose share of the parent's inner area is below this are hidden.
    ///
    /// Only applied when `sort` is set.
    pub visible_min: f64,
    /// If a node's inner area is below this, the children of its children are hidden.
    pub children_visible_min: Option<f64>,
    /// Space between sibling rectangles.
    pub gap_width: f64,
    /// Inset between a node's edge and its children.
    pub border_width: f64,
    /// Depth (relative to the view root) below which children are cut off.
    pub leaf_depth: Option<u32>,
}

impl Default for TreemapSpec {
    fn default() -> Self {
        Self {
            bounds: Rect::ZERO,
            sort: Some(SortOrder::Desc),
            visible_min: 10.0,
            children_visible_min: None,
            gap_width: 0.0,
            border_width: 0.0,
            leaf_depth: None,
        }
    }
}

impl TreemapSpec {
    /// Creates a spec that lays out into `bounds`.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Sets the child ordering.
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Keeps children in data order. This also turns off `visible_min`.
    pub fn without_sort(mut self) -> Self {
        self.sort = None;
        self
    }

    /// Sets the minimum visible area.
    pub fn with_visible_min(mut self, visible_min: f64) -> Self {
        self.visible_min = visible_min;
        self
    }

    /// Sets the area below which grandchildren are hidden.
    pub fn with_children_visible_min(mut self, children_visible_min: f64) -> Self {
        self.children_visible_min = Some(children_visible_min);
        self
    }

    /// Sets the gap between siblings.
    pub fn with_gap_width(mut self, gap_width: f64) -> Self {
        self.gap_width = gap_width;
        self
    }

    /// Sets the border inset.
    pub fn with_border_width(mut self, border_width: f64) -> Self {
        self.border_width = border_width;
        self
    }

    /// Sets the leaf depth.
    pub fn with_leaf_depth(mut self, leaf_depth: u32) -> Self {
        self.leaf_depth = Some(leaf_depth);
        self
    }

    /// Lays out `tree` from its view root.
    ///
    /// Every node's layout record and view children are reset first, so nodes outside the
    /// visible subtree end up without a rectangle.
    pub fn layout(&self, tree: &mut Tree) {
        let ids: Vec<NodeId> = tree.nodes().map(|(id, _)| id).collect();
        for id in ids {
            let node = tree.node_mut(id);
            node.set_layout(TreeNodeLayout::default(), false);
            node.view_children.clear();
        }

        let bounds = self.bounds.abs();
        let root = tree.view_root();
        tree.node_mut(root).set_layout(
            TreeNodeLayout {
                rect: Some(bounds),
                area: Some(bounds.area()),
                ..TreeNodeLayout::default()
            },
            false,
        );
        self.lay_out_node(tree, root, false, 0);
    }

    /// Tiles `bounds` with one rectangle per value, in input order.
    ///
    /// Values are scaled to the area of the bounds. Gaps, borders and sorting do not apply.
    pub fn layout_values(&self, values: &[f64]) -> Vec<Rect> {
        let bounds = self.bounds.abs();
        let sum: f64 = values
            .iter()
            .filter(|v| v.is_finite() && **v > 0.0)
            .sum();
        let areas: Vec<f64> = if sum > 0.0 {
            values.iter().map(|v| v / sum * bounds.area()).collect()
        } else {
            alloc::vec![0.0; values.len()]
        };
        Squarify::new(bounds).run(&areas)
    }

    fn lay_out_node(&self, tree: &mut Tree, id: NodeId, mut hide_children: bool, depth: u32) {
        let Some(rect) = tree.node(id).layout.rect else {
            return;
        };
        let half_gap = self.gap_width / 2.0;
        let offset = self.border_width - half_gap;
        let width = (rect.width() - 2.0 * offset).max(0.0);
        let height = (rect.height() - 2.0 * offset).max(0.0);
        let inner = Rect::new(
            rect.x0 + offset,
            rect.y0 + offset,
            rect.x0 + offset + width,
            rect.y0 + offset + height,
        );
        let total_area = width * height;

        tree.node_mut(id).set_layout(
            TreeNodeLayout {
                border_width: Some(self.border_width),
                ..TreeNodeLayout::default()
            },
            true,
        );

        let children = self.view_children(tree, id, total_area, hide_children, depth);
        if children.is_empty() {
            return;
        }

        let areas: Vec<f64> = children
            .iter()
            .map(|&c| tree.node(c).layout.area.unwrap_or(0.0))
            .collect();
        let rects = Squarify::new(inner).run(&areas);
        for (&child, r) in children.iter().zip(rects) {
            let shrunk = shrink(r, half_gap);
            tree.node_mut(child).set_layout(
                TreeNodeLayout {
                    rect: Some(shrunk),
                    ..TreeNodeLayout::default()
                },
                true,
            );
        }

        if !hide_children
            && self
                .children_visible_min
                .is_some_and(|min| total_area < min)
        {
            log::trace!("treemap: node {id:?} too small, hiding grandchildren");
            hide_children = true;
        }
        for child in children {
            self.lay_out_node(tree, child, hide_children, depth + 1);
        }
    }

    /// Selects, orders and sizes the children shown inside `id`.
    ///
    /// Writes each child's `area` and the node's `view_children`, and returns the children
    /// that should be tiled.
    fn view_children(
        &self,
        tree: &mut Tree,
        id: NodeId,
        total_area: f64,
        hide_children: bool,
        depth: u32,
    ) -> Vec<NodeId> {
        let over_leaf_depth = self.leaf_depth.is_some_and(|d| d <= depth);
        if hide_children && !over_leaf_depth {
            return Vec::new();
        }

        let mut children: Vec<NodeId> = tree.node(id).children().to_vec();
        if let Some(order) = self.sort {
            children.sort_by(|&a, &b| {
                let (va, vb) = (tree.node(a).value, tree.node(b).value);
                match order {
                    SortOrder::Asc => va.total_cmp(&vb).then(a.cmp(&b)),
                    SortOrder::Desc => vb.total_cmp(&va).then(b.cmp(&a)),
                }
            });
        }

        let mut sum: f64 = children.iter().map(|&c| tree.node(c).value).sum();
        if sum == 0.0 {
            return Vec::new();
        }
        if let Some(order) = self.sort {
            sum = self.filter_by_threshold(tree, order, total_area, sum, &mut children);
            if sum == 0.0 {
                return Vec::new();
            }
        }

        for &child in &children {
            let area = tree.node(child).value / sum * total_area;
            tree.node_mut(child).set_layout(
                TreeNodeLayout {
                    area: Some(area),
                    ..TreeNodeLayout::default()
                },
                false,
            );
        }

        if over_leaf_depth {
            tree.node_mut(id).set_layout(
                TreeNodeLayout {
                    is_leaf_root: Some(true),
                    ..TreeNodeLayout::default()
                },
                true,
            );
            return Vec::new();
        }

        tree.node_mut(id).view_children.clone_from(&children);
        children
    }

    /// Drops the smallest children whose share of `total_area` is below `visible_min`.
    ///
    /// Walks from the smallest child upwards, subtracting each dropped value from the running
    /// sum. Returns the new sum.
    fn filter_by_threshold(
        &self,
        tree: &Tree,
        order: SortOrder,
        total_area: f64,
        mut sum: f64,
        children: &mut Vec<NodeId>,
    ) -> f64 {
        let len = children.len();
        let mut keep = len;
        for i in (0..len).rev() {
            let slot = match order {
                SortOrder::Asc => len - i - 1,
                SortOrder::Desc => i,
            };
            let value = tree.node(children[slot]).value;
            if value / sum * total_area < self.visible_min {
                keep = i;
                sum -= value;
            }
        }
        if keep < len {
            log::trace!("treemap: hiding {} children below visible_min", len - keep);
        }
        match order {
            SortOrder::Asc => {
                children.drain(..len - keep);
            }
            SortOrder::Desc => children.truncate(keep),
        }
        sum
    }
}

/// Shrinks `r` by `half_gap` on every side without inverting it.
fn shrink(r: Rect, half_gap: f64) -> Rect {
    let w = (r.width() - 2.0 * half_gap).max(0.0);
    let h = (r.height() - 2.0 * half_gap).max(0.0);
    let x0 = r.x0 + half_gap.min(w / 2.0);
    let y0 = r.y0 + half_gap.min(h / 2.0);
    Rect::new(x0, y0, x0 + w, y0 + h)
}
