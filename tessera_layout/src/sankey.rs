// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sankey diagram layout.
//!
//! The layout runs four phases over a [`Graph`]:
//! 1. **Values**: a node's value is the largest of its outgoing sum, incoming sum and raw value.
//! 2. **Breadths**: Kahn's algorithm assigns each node a column along the flow direction.
//!    Cycles are broken deterministically (see [`SankeySpec::layout`]).
//! 3. **Depths**: nodes are stacked inside their columns, then relaxed towards the weighted
//!    centre of their neighbours (Gauss-Seidel), resolving collisions after every step.
//! 4. **Edge depths**: each node's edges are sorted by the position of the opposite endpoint
//!    and stacked to give ribbon offsets.
//!
//! Results are written to the graph's [`NodeLayout`] and [`EdgeLayout`] records.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Size;
use tessera_data::{EdgeLayout, Graph, LayoutCapable, NodeIndex, NodeLayout, group_by};

/// Flow direction of a sankey diagram.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orient {
    /// Columns are laid out left to right.
    #[default]
    Horizontal,
    /// Columns are laid out top to bottom.
    Vertical,
}

/// Column alignment policy for nodes that could sit in more than one column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeAlign {
    /// Keep every node in its earliest possible column.
    Left,
    /// Push every node as far towards the sinks as its outgoing paths allow.
    Right,
    /// Like `Left`, but move every sink into the last column.
    #[default]
    Justify,
}

/// Sankey layout configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SankeySpec {
    /// Node thickness along the flow direction.
    pub node_width: f64,
    /// Gap between nodes in the same column.
    pub node_gap: f64,
    /// Extent of the diagram.
    pub size: Size,
    /// Number of relaxation passes.
    pub iterations: u32,
    /// Flow direction.
    pub orient: Orient,
    /// Column alignment policy.
    pub node_align: NodeAlign,
}

impl Default for SankeySpec {
    fn default() -> Self {
        Self {
            node_width: 20.0,
            node_gap: 8.0,
            size: Size::ZERO,
            iterations: 32,
            orient: Orient::Horizontal,
            node_align: NodeAlign::Justify,
        }
    }
}

impl SankeySpec {
    /// Creates a spec with default options for the given extent.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Sets the node thickness along the flow direction.
    pub fn with_node_width(mut self, node_width: f64) -> Self {
        self.node_width = node_width;
        self
    }

    /// Sets the gap between nodes in the same column.
    pub fn with_node_gap(mut self, node_gap: f64) -> Self {
        self.node_gap = node_gap;
        self
    }

    /// Sets the number of relaxation passes.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the flow direction.
    pub fn with_orient(mut self, orient: Orient) -> Self {
        self.orient = orient;
        self
    }

    /// Sets the column alignment policy.
    pub fn with_node_align(mut self, node_align: NodeAlign) -> Self {
        self.node_align = node_align;
        self
    }

    /// Lays out `graph` in place.
    ///
    /// After the call every node has `x`, `y`, `dx`, `dy`, `value` and `depth` set, and every
    /// edge has `dy`, `sy` and `ty` set.
    ///
    /// If any node ends up with a zero value, relaxation is skipped for this call.
    ///
    /// Cycles do not fail the layout. When the Kahn frontier runs dry while nodes remain, the
    /// remaining node with the fewest unplaced predecessors (lowest index on ties) is placed in
    /// the next column. Edges pointing back to an already placed node are ignored for column
    /// alignment.
    pub fn layout(&self, graph: &mut Graph) {
        if graph.node_count() == 0 {
            return;
        }
        let iterations = if compute_node_values(graph) {
            log::debug!("sankey has zero-valued nodes, skipping relaxation");
            0
        } else {
            self.iterations
        };
        self.compute_node_breadths(graph);
        self.compute_node_depths(graph, iterations);
        compute_edge_depths(graph, self.orient);
    }

    /// Assigns columns and scales them into the flow-direction coordinate.
    fn compute_node_breadths(&self, graph: &mut Graph) {
        let breadths = Breadths::kahn(graph);
        let mut depth = breadths.depth.clone();
        let mut max_depth = breadths.max_depth;

        for n in graph.node_indices() {
            if let Some(d) = graph.node(n).explicit_depth() {
                depth[n.index()] = d;
                max_depth = max_depth.max(d);
            }
        }

        match self.node_align {
            NodeAlign::Left => {}
            NodeAlign::Right => {
                let heights = breadths.heights_from_sinks(graph);
                for n in graph.node_indices() {
                    let h = heights[n.index()];
                    graph.node_mut(n).layout.sk_node_height = Some(h);
                    if graph.node(n).explicit_depth().is_none() {
                        depth[n.index()] = (max_depth - h).max(0.0);
                    }
                }
            }
            NodeAlign::Justify => {
                for n in graph.node_indices() {
                    let node = graph.node(n);
                    if node.explicit_depth().is_none() && node.out_edges.is_empty() {
                        depth[n.index()] = max_depth;
                    }
                }
            }
        }

        let extent = match self.orient {
            Orient::Horizontal => self.size.width,
            Orient::Vertical => self.size.height,
        };
        let kx = if max_depth > 0.0 {
            (extent - self.node_width) / max_depth
        } else {
            0.0
        };

        for n in graph.node_indices() {
            let d = depth[n.index()];
            let patch = match self.orient {
                Orient::Horizontal => NodeLayout {
                    x: Some(d * kx),
                    dx: Some(self.node_width),
                    depth: Some(d),
                    ..NodeLayout::default()
                },
                Orient::Vertical => NodeLayout {
                    y: Some(d * kx),
                    dy: Some(self.node_width),
                    depth: Some(d),
                    ..NodeLayout::default()
                },
            };
            graph.node_mut(n).set_layout(patch, true);
        }
    }

    /// Positions nodes inside their columns.
    fn compute_node_depths(&self, graph: &mut Graph, iterations: u32) {
        let cross_extent = match self.orient {
            Orient::Horizontal => self.size.height,
            Orient::Vertical => self.size.width,
        };
        let mut columns = Columns::new(graph, self.orient);
        columns.initialize(graph, cross_extent, self.node_gap);
        columns.resolve_collisions(self.node_gap, cross_extent);

        let mut alpha = 1.0;
        for _ in 0..iterations {
            alpha *= 0.99;
            columns.relax_right_to_left(graph, alpha);
            columns.resolve_collisions(self.node_gap, cross_extent);
            columns.relax_left_to_right(graph, alpha);
            columns.resolve_collisions(self.node_gap, cross_extent);
        }

        columns.write_back(graph, self.orient);
    }
}

/// Sets every node's layout `value` and reports whether any value is zero.
pub fn compute_node_values(graph: &mut Graph) -> bool {
    let mut any_zero = false;
    for n in graph.node_indices() {
        let node = graph.node(n);
        let out_sum: f64 = node
            .out_edges
            .iter()
            .map(|&e| graph.edge(e).get_value())
            .sum();
        let in_sum: f64 = node
            .in_edges
            .iter()
            .map(|&e| graph.edge(e).get_value())
            .sum();
        let raw = node.value.filter(|v| v.is_finite()).unwrap_or(0.0);
        let value = out_sum.max(in_sum).max(raw);
        any_zero |= value == 0.0;
        graph.node_mut(n).layout.value = Some(value);
    }
    any_zero
}

/// Result of the Kahn pass.
#[derive(Debug)]
struct Breadths {
    /// Column index per node.
    depth: Vec<f64>,
    /// Largest column index assigned.
    max_depth: f64,
    /// Nodes in the order they were placed.
    order: Vec<NodeIndex>,
    /// Per edge: `true` if it was consumed as a forward edge.
    forward: Vec<bool>,
}

impl Breadths {
    fn kahn(graph: &Graph) -> Self {
        let n = graph.node_count();
        let mut indegree: Vec<usize> = graph.nodes().iter().map(|n| n.in_edges.len()).collect();
        let mut placed = vec![false; n];
        let mut depth = vec![0.0; n];
        let mut forward = vec![false; graph.edge_count()];
        let mut order = Vec::with_capacity(n);

        let mut frontier: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|n| indegree[n.index()] == 0)
            .collect();
        let mut next = Vec::new();
        let mut x = 0_u32;

        while order.len() < n {
            if frontier.is_empty() {
                // Stalled on a cycle: seed the frontier with the least blocked node.
                let Some(seed) = graph
                    .node_indices()
                    .filter(|n| !placed[n.index()])
                    .min_by_key(|n| indegree[n.index()])
                else {
                    break;
                };
                log::debug!(
                    "sankey cycle: placing node `{}` in column {x}",
                    graph.node(seed).id
                );
                frontier.push(seed);
            }
            for &node in &frontier {
                placed[node.index()] = true;
            }
            for &node in &frontier {
                depth[node.index()] = f64::from(x);
                order.push(node);
                for &e in graph.out_edges(node) {
                    let target = graph.edge(e).node2;
                    if placed[target.index()] {
                        continue;
                    }
                    forward[e.index()] = true;
                    indegree[target.index()] -= 1;
                    if indegree[target.index()] == 0 {
                        next.push(target);
                    }
                }
            }
            x += 1;
            frontier = core::mem::take(&mut next);
        }

        let skipped = forward.iter().filter(|f| !**f).count();
        if skipped > 0 {
            log::debug!("sankey ignores {skipped} cycle edge(s) for alignment");
        }

        Self {
            depth,
            max_depth: f64::from(x.saturating_sub(1)),
            order,
            forward,
        }
    }

    /// Longest forward path from each node to a sink, in columns.
    fn heights_from_sinks(&self, graph: &Graph) -> Vec<f64> {
        let mut height = vec![0.0_f64; graph.node_count()];
        for &node in self.order.iter().rev() {
            let mut h = 0.0_f64;
            for &e in graph.out_edges(node) {
                if self.forward[e.index()] {
                    h = h.max(height[graph.edge(e).node2.index()] + 1.0);
                }
            }
            height[node.index()] = h;
        }
        height
    }
}

/// Working state of the depth phase: nodes bucketed by column plus their cross-axis
/// position and thickness.
#[derive(Debug)]
struct Columns {
    by_breadth: Vec<Vec<NodeIndex>>,
    pos: Vec<f64>,
    size: Vec<f64>,
    edge_dy: Vec<f64>,
}

impl Columns {
    fn new(graph: &Graph, orient: Orient) -> Self {
        let groups = group_by(graph.node_indices(), |&n| {
            let layout = graph.node(n).layout;
            let breadth = match orient {
                Orient::Horizontal => layout.x,
                Orient::Vertical => layout.y,
            };
            breadth.unwrap_or(0.0)
        });
        Self {
            by_breadth: groups.into_buckets(),
            pos: vec![0.0; graph.node_count()],
            size: vec![0.0; graph.node_count()],
            edge_dy: vec![0.0; graph.edge_count()],
        }
    }

    fn center(&self, n: NodeIndex) -> f64 {
        self.pos[n.index()] + self.size[n.index()] / 2.0
    }

    /// Stacks nodes in column order using one value scale shared by all columns.
    fn initialize(&mut self, graph: &Graph, cross_extent: f64, node_gap: f64) {
        let mut min_ky = f64::INFINITY;
        for column in &self.by_breadth {
            let sum: f64 = column
                .iter()
                .map(|&n| graph.node(n).layout.value.unwrap_or(0.0))
                .sum();
            let gaps = (column.len() - 1) as f64 * node_gap;
            let ky = (cross_extent - gaps) / sum;
            if ky.is_finite() && ky < min_ky {
                min_ky = ky;
            }
        }
        let ky = if min_ky.is_finite() {
            min_ky.max(0.0)
        } else {
            0.0
        };

        for column in &self.by_breadth {
            for (i, &n) in column.iter().enumerate() {
                self.pos[n.index()] = i as f64;
                self.size[n.index()] = graph.node(n).layout.value.unwrap_or(0.0) * ky;
            }
        }
        for e in graph.edge_indices() {
            self.edge_dy[e.index()] = graph.edge(e).get_value() * ky;
        }
    }

    /// Pushes overlapping nodes apart, then pulls the column back inside the extent.
    fn resolve_collisions(&mut self, node_gap: f64, cross_extent: f64) {
        let pos = &mut self.pos;
        let size = &self.size;
        for column in &mut self.by_breadth {
            column.sort_by(|a, b| pos[a.index()].total_cmp(&pos[b.index()]));

            let mut y0 = 0.0;
            for &n in column.iter() {
                let dy = y0 - pos[n.index()];
                if dy > 0.0 {
                    pos[n.index()] += dy;
                }
                y0 = pos[n.index()] + size[n.index()] + node_gap;
            }

            let Some(&last) = column.last() else {
                continue;
            };
            let dy = y0 - node_gap - cross_extent;
            if dy > 0.0 {
                pos[last.index()] -= dy;
                let mut y0 = pos[last.index()];
                for &n in column.iter().rev().skip(1) {
                    let dy = pos[n.index()] + size[n.index()] + node_gap - y0;
                    if dy > 0.0 {
                        pos[n.index()] -= dy;
                    }
                    y0 = pos[n.index()];
                }
            }
        }
    }

    /// Moves nodes towards the weighted centre of their targets, last column first.
    fn relax_right_to_left(&mut self, graph: &Graph, alpha: f64) {
        for c in (0..self.by_breadth.len()).rev() {
            for i in 0..self.by_breadth[c].len() {
                let n = self.by_breadth[c][i];
                let edges = graph.out_edges(n);
                if edges.is_empty() {
                    continue;
                }
                let target = self.weighted_center(
                    edges
                        .iter()
                        .map(|&e| (graph.edge(e).node2, graph.edge(e).get_value())),
                );
                let shift = (target - self.center(n)) * alpha;
                self.pos[n.index()] += shift;
            }
        }
    }

    /// Moves nodes towards the weighted centre of their sources, first column first.
    fn relax_left_to_right(&mut self, graph: &Graph, alpha: f64) {
        for c in 0..self.by_breadth.len() {
            for i in 0..self.by_breadth[c].len() {
                let n = self.by_breadth[c][i];
                let edges = graph.in_edges(n);
                if edges.is_empty() {
                    continue;
                }
                let target = self.weighted_center(
                    edges
                        .iter()
                        .map(|&e| (graph.edge(e).node1, graph.edge(e).get_value())),
                );
                let shift = (target - self.center(n)) * alpha;
                self.pos[n.index()] += shift;
            }
        }
    }

    /// Value-weighted mean of the neighbours' centres.
    ///
    /// Falls back to the plain mean when every weight is zero.
    fn weighted_center(&self, neighbours: impl Iterator<Item = (NodeIndex, f64)> + Clone) -> f64 {
        let mut weighted = 0.0;
        let mut total = 0.0;
        for (n, value) in neighbours.clone() {
            weighted += self.center(n) * value;
            total += value;
        }
        if total > 0.0 {
            return weighted / total;
        }
        let mut sum = 0.0;
        let mut count = 0_u32;
        for (n, _) in neighbours {
            sum += self.center(n);
            count += 1;
        }
        if count == 0 {
            0.0
        } else {
            sum / f64::from(count)
        }
    }

    fn write_back(&self, graph: &mut Graph, orient: Orient) {
        for n in graph.node_indices() {
            let (pos, size) = (Some(self.pos[n.index()]), Some(self.size[n.index()]));
            let patch = match orient {
                Orient::Horizontal => NodeLayout {
                    y: pos,
                    dy: size,
                    ..NodeLayout::default()
                },
                Orient::Vertical => NodeLayout {
                    x: pos,
                    dx: size,
                    ..NodeLayout::default()
                },
            };
            graph.node_mut(n).set_layout(patch, true);
        }
        for e in graph.edge_indices() {
            let patch = EdgeLayout {
                dy: Some(self.edge_dy[e.index()]),
                ..EdgeLayout::default()
            };
            graph.edge_mut(e).set_layout(patch, true);
        }
    }
}

/// Cross-axis position of a node.
fn cross(graph: &Graph, n: NodeIndex, orient: Orient) -> f64 {
    let layout = graph.node(n).layout;
    let pos = match orient {
        Orient::Horizontal => layout.y,
        Orient::Vertical => layout.x,
    };
    pos.unwrap_or(0.0)
}

/// Orders each node's edges by the opposite endpoint and stacks their offsets.
fn compute_edge_depths(graph: &mut Graph, orient: Orient) {
    for n in graph.node_indices() {
        let mut out_edges = core::mem::take(&mut graph.node_mut(n).out_edges);
        out_edges.sort_by(|&a, &b| {
            let ya = cross(graph, graph.edge(a).node2, orient);
            let yb = cross(graph, graph.edge(b).node2, orient);
            ya.total_cmp(&yb)
        });
        let mut in_edges = core::mem::take(&mut graph.node_mut(n).in_edges);
        in_edges.sort_by(|&a, &b| {
            let ya = cross(graph, graph.edge(a).node1, orient);
            let yb = cross(graph, graph.edge(b).node1, orient);
            ya.total_cmp(&yb)
        });

        let mut sy = 0.0;
        for &e in &out_edges {
            let edge = graph.edge_mut(e);
            edge.layout.sy = Some(sy);
            sy += edge.layout.dy.unwrap_or(0.0);
        }
        let mut ty = 0.0;
        for &e in &in_edges {
            let edge = graph.edge_mut(e);
            edge.layout.ty = Some(ty);
            ty += edge.layout.dy.unwrap_or(0.0);
        }

        let node = graph.node_mut(n);
        node.out_edges = out_edges;
        node.in_edges = in_edges;
    }
}
