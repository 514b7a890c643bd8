// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout annotation records.
//!
//! Layout engines never own the nodes they place. Instead each node or edge carries a small
//! record of named, optional fields that an engine fills in. Updates come in two flavours:
//! - a **merge**, where only the fields set on the patch overwrite the record, and
//! - a **replace**, where the patch becomes the record.

use kurbo::Rect;

/// Partial-update semantics for layout records.
pub trait Merge {
    /// Overwrites every field of `self` that is set on `patch`, keeping the others.
    fn merge(&mut self, patch: &Self);
}

/// Something that carries a layout record.
///
/// Implemented uniformly by graph nodes, graph edges and tree nodes so that generic layout
/// helpers can annotate any of them.
pub trait LayoutCapable {
    /// The layout record type.
    type Layout: Merge + Default;

    /// Returns the current layout record.
    fn layout(&self) -> &Self::Layout;

    /// Returns the current layout record mutably.
    fn layout_mut(&mut self) -> &mut Self::Layout;

    /// Applies `patch`, either merging it into the record or replacing the record.
    fn set_layout(&mut self, patch: Self::Layout, merge: bool) {
        if merge {
            self.layout_mut().merge(&patch);
        } else {
            *self.layout_mut() = patch;
        }
    }
}

macro_rules! impl_merge {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl Merge for $ty {
            fn merge(&mut self, patch: &Self) {
                $(
                    if patch.$field.is_some() {
                        self.$field = patch.$field;
                    }
                )*
            }
        }
    };
}

/// Layout record of a graph node.
///
/// `x`/`y` are the top-left corner and `dx`/`dy` the extent of the node rectangle. `depth` is
/// the discrete column index along the flow direction before it is scaled into `x` (or `y`).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeLayout {
    /// Left edge.
    pub x: Option<f64>,
    /// Top edge.
    pub y: Option<f64>,
    /// Horizontal extent.
    pub dx: Option<f64>,
    /// Vertical extent.
    pub dy: Option<f64>,
    /// Node value used for sizing.
    pub value: Option<f64>,
    /// Column index along the flow direction.
    pub depth: Option<f64>,
    /// Distance (in columns) from the farthest reachable sink.
    pub sk_node_height: Option<f64>,
}

impl_merge!(NodeLayout {
    x,
    y,
    dx,
    dy,
    value,
    depth,
    sk_node_height
});

impl NodeLayout {
    /// Returns the node rectangle, treating unset fields as `0`.
    pub fn rect(&self) -> Rect {
        let x = self.x.unwrap_or(0.0);
        let y = self.y.unwrap_or(0.0);
        Rect::new(x, y, x + self.dx.unwrap_or(0.0), y + self.dy.unwrap_or(0.0))
    }
}

/// Layout record of a graph edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeLayout {
    /// Offset of the ribbon inside the source node's outgoing stack.
    pub sy: Option<f64>,
    /// Offset of the ribbon inside the target node's incoming stack.
    pub ty: Option<f64>,
    /// Ribbon thickness.
    pub dy: Option<f64>,
}

impl_merge!(EdgeLayout { sy, ty, dy });

/// Layout record of a tree node, written by the treemap driver.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TreeNodeLayout {
    /// Rectangle assigned to the node (gaps already applied).
    pub rect: Option<Rect>,
    /// Area the node was allotted before gaps were applied.
    pub area: Option<f64>,
    /// Border width used when insetting children.
    pub border_width: Option<f64>,
    /// Set on nodes whose children were cut off by a leaf depth limit.
    pub is_leaf_root: Option<bool>,
}

impl_merge!(TreeNodeLayout {
    rect,
    area,
    border_width,
    is_leaf_root
});

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        layout: NodeLayout,
    }

    impl LayoutCapable for Probe {
        type Layout = NodeLayout;

        fn layout(&self) -> &NodeLayout {
            &self.layout
        }

        fn layout_mut(&mut self) -> &mut NodeLayout {
            &mut self.layout
        }
    }

    #[test]
    fn merge_keeps_fields_missing_from_patch() {
        let mut p = Probe::default();
        p.set_layout(
            NodeLayout {
                x: Some(1.0),
                dy: Some(4.0),
                ..NodeLayout::default()
            },
            true,
        );
        p.set_layout(
            NodeLayout {
                y: Some(2.0),
                ..NodeLayout::default()
            },
            true,
        );
        assert_eq!(p.layout().x, Some(1.0));
        assert_eq!(p.layout().y, Some(2.0));
        assert_eq!(p.layout().dy, Some(4.0));
    }

    #[test]
    fn replace_drops_previous_fields() {
        let mut p = Probe::default();
        p.set_layout(
            NodeLayout {
                x: Some(1.0),
                ..NodeLayout::default()
            },
            true,
        );
        p.set_layout(
            NodeLayout {
                y: Some(2.0),
                ..NodeLayout::default()
            },
            false,
        );
        assert_eq!(p.layout().x, None);
        assert_eq!(p.layout().y, Some(2.0));
    }

    #[test]
    fn rect_treats_unset_fields_as_zero() {
        let l = NodeLayout {
            x: Some(3.0),
            dx: Some(2.0),
            ..NodeLayout::default()
        };
        assert_eq!(l.rect(), Rect::new(3.0, 0.0, 5.0, 0.0));
    }
}
