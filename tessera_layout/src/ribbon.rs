// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ribbon geometry for laid-out sankey edges.

use kurbo::{BezPath, Point};
use tessera_data::{EdgeIndex, Graph};

use crate::sankey::Orient;

/// Control geometry of one sankey ribbon.
///
/// The ribbon is a band between two parallel cubic curves `extent` apart. `p1` is where it
/// leaves the source node and `p2` where it enters the target node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SankeyRibbon {
    /// Start of the leading curve.
    pub p1: Point,
    /// First control point.
    pub c1: Point,
    /// Second control point.
    pub c2: Point,
    /// End of the leading curve.
    pub p2: Point,
    /// Band thickness (at least `1`).
    pub extent: f64,
    /// Flow direction; the trailing curve is offset across it.
    pub orient: Orient,
}

impl SankeyRibbon {
    /// Default curveness used by sankey charts.
    pub const DEFAULT_CURVENESS: f64 = 0.5;

    /// Builds the ribbon of a laid-out edge.
    ///
    /// `curveness` in `[0, 1]` moves the control points from the endpoints towards each other.
    pub fn for_edge(graph: &Graph, edge: EdgeIndex, orient: Orient, curveness: f64) -> Self {
        let e = graph.edge(edge);
        let n1 = graph.node(e.node1).layout;
        let n2 = graph.node(e.node2).layout;
        let sy = e.layout.sy.unwrap_or(0.0);
        let ty = e.layout.ty.unwrap_or(0.0);
        let extent = e.layout.dy.unwrap_or(0.0).max(1.0);
        let (x1n, y1n) = (n1.x.unwrap_or(0.0), n1.y.unwrap_or(0.0));
        let (x2n, y2n) = (n2.x.unwrap_or(0.0), n2.y.unwrap_or(0.0));
        let k = curveness;

        let (p1, c1, c2, p2) = match orient {
            Orient::Horizontal => {
                let x1 = x1n + n1.dx.unwrap_or(0.0);
                let y1 = y1n + sy;
                let x2 = x2n;
                let y2 = y2n + ty;
                (
                    Point::new(x1, y1),
                    Point::new(x1 * (1.0 - k) + x2 * k, y1),
                    Point::new(x1 * k + x2 * (1.0 - k), y2),
                    Point::new(x2, y2),
                )
            }
            Orient::Vertical => {
                let x1 = x1n + sy;
                let y1 = y1n + n1.dy.unwrap_or(0.0);
                let x2 = x2n + ty;
                let y2 = y2n;
                (
                    Point::new(x1, y1),
                    Point::new(x1, y1 * (1.0 - k) + y2 * k),
                    Point::new(x2, y1 * k + y2 * (1.0 - k)),
                    Point::new(x2, y2),
                )
            }
        };

        Self {
            p1,
            c1,
            c2,
            p2,
            extent,
            orient,
        }
    }

    /// Returns the closed band outline.
    pub fn to_path(&self) -> BezPath {
        let offset = match self.orient {
            Orient::Horizontal => kurbo::Vec2::new(0.0, self.extent),
            Orient::Vertical => kurbo::Vec2::new(self.extent, 0.0),
        };
        let mut path = BezPath::new();
        path.move_to(self.p1);
        path.curve_to(self.c1, self.c2, self.p2);
        path.line_to(self.p2 + offset);
        path.curve_to(self.c2 + offset, self.c1 + offset, self.p1 + offset);
        path.close_path();
        path
    }
}
