// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The JSON option document.
//!
//! Field names follow the camel-case option style of the charting library the layouts come
//! from, e.g. `nodeWidth`, `layoutIterations`, `visibleMin`.

use kurbo::{Rect, Size};
use serde::Deserialize;
use tessera_data::{Graph, GraphError, Tree, TreeError, TreeItem};
use tessera_layout::{NodeAlign, Orient, SankeySpec, SortOrder, TreemapSpec};

/// Top-level option document.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Document {
    /// Width of each chart.
    #[serde(default = "default_width")]
    pub width: f64,
    /// Height of each chart.
    #[serde(default = "default_height")]
    pub height: f64,
    /// Sankey chart, drawn first.
    #[serde(default)]
    pub sankey: Option<SankeyOption>,
    /// Treemap chart, drawn below the sankey chart.
    #[serde(default)]
    pub treemap: Option<TreemapOption>,
}

fn default_width() -> f64 {
    800.0
}

fn default_height() -> f64 {
    500.0
}

/// A sankey node.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SankeyNodeOption {
    /// Node id.
    pub name: String,
    /// Raw value; the layout keeps the larger of this and the edge sums.
    #[serde(default)]
    pub value: Option<f64>,
    /// Explicit column.
    #[serde(default)]
    pub depth: Option<f64>,
}

/// A sankey link.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SankeyLinkOption {
    /// Source node name.
    pub source: String,
    /// Target node name.
    pub target: String,
    /// Flow value.
    pub value: f64,
}

/// Flow direction.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrientOption {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
}

/// Column alignment.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeAlignOption {
    /// Earliest column.
    Left,
    /// Latest column.
    Right,
    /// Earliest column, sinks last.
    #[default]
    Justify,
}

/// Sankey section.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SankeyOption {
    /// Nodes, in data order.
    pub nodes: Vec<SankeyNodeOption>,
    /// Links, in data order.
    #[serde(default, alias = "edges")]
    pub links: Vec<SankeyLinkOption>,
    /// Node thickness along the flow.
    #[serde(default)]
    pub node_width: Option<f64>,
    /// Gap between nodes in a column.
    #[serde(default)]
    pub node_gap: Option<f64>,
    /// Relaxation passes.
    #[serde(default)]
    pub layout_iterations: Option<u32>,
    /// Flow direction.
    #[serde(default)]
    pub orient: OrientOption,
    /// Column alignment.
    #[serde(default)]
    pub node_align: NodeAlignOption,
}

impl SankeyOption {
    /// Builds the graph described by this section.
    pub fn build_graph(&self) -> Result<Graph, GraphError> {
        let mut graph = Graph::new();
        for node in &self.nodes {
            let n = graph.add_node(node.name.as_str())?;
            let n = graph.node_mut(n);
            n.value = node.value;
            n.depth = node.depth;
        }
        for link in &self.links {
            graph.add_edge(&link.source, &link.target, link.value)?;
        }
        Ok(graph)
    }

    /// Returns the layout configuration for a chart of the given size.
    pub fn spec(&self, size: Size) -> SankeySpec {
        let mut spec = SankeySpec::new(size)
            .with_orient(match self.orient {
                OrientOption::Horizontal => Orient::Horizontal,
                OrientOption::Vertical => Orient::Vertical,
            })
            .with_node_align(match self.node_align {
                NodeAlignOption::Left => NodeAlign::Left,
                NodeAlignOption::Right => NodeAlign::Right,
                NodeAlignOption::Justify => NodeAlign::Justify,
            });
        if let Some(w) = self.node_width {
            spec = spec.with_node_width(w);
        }
        if let Some(g) = self.node_gap {
            spec = spec.with_node_gap(g);
        }
        if let Some(i) = self.layout_iterations {
            spec = spec.with_iterations(i);
        }
        spec
    }
}

/// Treemap child ordering: `"asc"`, `"desc"`, `true` (descending) or `false` (data order).
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(untagged)]
pub enum SortOption {
    /// `true` sorts descending, `false` keeps data order.
    Enabled(bool),
    /// An explicit direction.
    Direction(SortDirection),
}

/// Named treemap sort direction.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortOption {
    /// Returns the layout ordering, or `None` to keep data order.
    pub fn order(self) -> Option<SortOrder> {
        match self {
            Self::Enabled(true) | Self::Direction(SortDirection::Desc) => Some(SortOrder::Desc),
            Self::Direction(SortDirection::Asc) => Some(SortOrder::Asc),
            Self::Enabled(false) => None,
        }
    }
}

/// Treemap section.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TreemapOption {
    /// Id of the synthetic root.
    #[serde(default = "default_root")]
    pub name: String,
    /// Top-level items.
    pub data: Vec<TreeItem>,
    /// Child ordering. Descending when absent.
    #[serde(default)]
    pub sort: Option<SortOption>,
    /// Minimum visible area.
    #[serde(default)]
    pub visible_min: Option<f64>,
    /// Area below which grandchildren are hidden.
    #[serde(default)]
    pub children_visible_min: Option<f64>,
    /// Gap between siblings.
    #[serde(default)]
    pub gap_width: Option<f64>,
    /// Border inset.
    #[serde(default)]
    pub border_width: Option<f64>,
    /// Depth below which children are cut off.
    #[serde(default)]
    pub leaf_depth: Option<u32>,
    /// Id of the node to drill down into.
    #[serde(default)]
    pub view_root: Option<String>,
}

fn default_root() -> String {
    "root".into()
}

impl TreemapOption {
    /// Builds the tree described by this section and applies the drill-down target.
    pub fn build_tree(&self) -> Result<Tree, TreeError> {
        let mut tree = Tree::from_option_data(&self.name, &self.data)?;
        if let Some(id) = &self.view_root {
            tree.set_view_root(id)?;
        }
        Ok(tree)
    }

    /// Returns the layout configuration for the given bounds.
    pub fn spec(&self, bounds: Rect) -> TreemapSpec {
        let mut spec = TreemapSpec::new(bounds);
        if let Some(sort) = self.sort {
            spec = match sort.order() {
                Some(order) => spec.with_sort(order),
                None => spec.without_sort(),
            };
        }
        if let Some(v) = self.visible_min {
            spec = spec.with_visible_min(v);
        }
        if let Some(v) = self.children_visible_min {
            spec = spec.with_children_visible_min(v);
        }
        if let Some(v) = self.gap_width {
            spec = spec.with_gap_width(v);
        }
        if let Some(v) = self.border_width {
            spec = spec.with_border_width(v);
        }
        if let Some(v) = self.leaf_depth {
            spec = spec.with_leaf_depth(v);
        }
        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sankey_section_builds_a_graph() {
        let doc: Document = serde_json::from_str(
            r#"{
                "sankey": {
                    "nodes": [{"name": "a"}, {"name": "b", "depth": 2}],
                    "links": [{"source": "a", "target": "b", "value": 4}],
                    "nodeWidth": 12,
                    "orient": "vertical",
                    "nodeAlign": "left"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(doc.width, 800.0);
        let sankey = doc.sankey.unwrap();
        let graph = sankey.build_graph().unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node(graph.node_by_id("b").unwrap()).depth, Some(2.0));

        let spec = sankey.spec(Size::new(100.0, 100.0));
        assert_eq!(spec.node_width, 12.0);
        assert_eq!(spec.node_gap, 8.0);
        assert_eq!(spec.orient, Orient::Vertical);
        assert_eq!(spec.node_align, NodeAlign::Left);
    }

    #[test]
    fn dangling_links_are_rejected() {
        let doc: Document = serde_json::from_str(
            r#"{"sankey": {"nodes": [{"name": "a"}],
                "links": [{"source": "a", "target": "nope", "value": 1}]}}"#,
        )
        .unwrap();
        assert!(matches!(
            doc.sankey.unwrap().build_graph(),
            Err(GraphError::MissingNode(id)) if id == "nope"
        ));
    }

    #[test]
    fn treemap_section_builds_a_tree() {
        let doc: Document = serde_json::from_str(
            r#"{"treemap": {
                "data": [
                    {"name": "x", "children": [{"name": "x1", "value": 3}]},
                    {"name": "y", "value": 1}
                ],
                "sort": "desc",
                "leafDepth": 1,
                "viewRoot": "x"
            }}"#,
        )
        .unwrap();
        let treemap = doc.treemap.unwrap();
        let tree = treemap.build_tree().unwrap();
        assert_eq!(tree.node(tree.view_root()).name, "x");
        assert_eq!(tree.node(Tree::ROOT).value, 4.0);

        let spec = treemap.spec(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(spec.sort, Some(SortOrder::Desc));
        assert_eq!(spec.leaf_depth, Some(1));
        assert_eq!(spec.visible_min, 10.0);
    }

    #[test]
    fn sort_accepts_flags_and_directions() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        let spec_for = |json: &str| {
            let option: TreemapOption = serde_json::from_str(json).unwrap();
            option.spec(bounds)
        };
        assert_eq!(spec_for(r#"{"data": []}"#).sort, Some(SortOrder::Desc));
        assert_eq!(spec_for(r#"{"data": [], "sort": true}"#).sort, Some(SortOrder::Desc));
        assert_eq!(spec_for(r#"{"data": [], "sort": false}"#).sort, None);
        assert_eq!(spec_for(r#"{"data": [], "sort": "asc"}"#).sort, Some(SortOrder::Asc));
    }

    #[test]
    fn misspelled_fields_are_rejected() {
        for json in [
            r#"{"sankey": {"nodes": [], "nodeWidht": 12}}"#,
            r#"{"sankey": {"nodes": [{"name": "a", "vlaue": 1}]}}"#,
            r#"{"sankey": {"nodes": [], "links": [{"source": "a", "target": "b", "value": 1, "weight": 2}]}}"#,
            r#"{"treemap": {"data": [], "visibleMinimum": 4}}"#,
        ] {
            let err = serde_json::from_str::<Document>(json).unwrap_err();
            assert!(err.to_string().contains("unknown field"), "{json}: {err}");
        }
    }
}
