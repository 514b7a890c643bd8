// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renders the tessera layouts to SVG.
//!
//! The input is a JSON [`Document`] with an optional `sankey` section (nodes and links) and an
//! optional `treemap` section (nested items). Each section is laid out into a `width` x
//! `height` chart; the treemap is drawn below the sankey diagram.

mod args;
mod error;
mod options;
mod svg;

use std::fs;
use std::path::Path;

use kurbo::{Affine, Point, Rect, Size, Vec2};
use peniko::Color;
use peniko::color::palette::css;
use tessera_data::{Graph, NodeId, TraverseOrder, Tree, Visit};
use tessera_layout::{Orient, SankeyRibbon};

pub use args::Args;
pub use error::DemoError;
pub use options::{
    Document, NodeAlignOption, OrientOption, SankeyLinkOption, SankeyNodeOption, SankeyOption,
    SortDirection, SortOption, TreemapOption,
};

use svg::SvgScene;

/// Vertical space between stacked charts.
const CHART_GAP: f64 = 40.0;

const LABEL_SIZE: f64 = 12.0;

const PALETTE: [Color; 9] = [
    css::STEEL_BLUE,
    css::MEDIUM_SEA_GREEN,
    css::GOLDENROD,
    css::TOMATO,
    css::SKY_BLUE,
    css::SEA_GREEN,
    css::CORAL,
    css::MEDIUM_ORCHID,
    css::HOT_PINK,
];

fn palette(i: usize) -> Color {
    PALETTE[i % PALETTE.len()]
}

/// Reads `args.input`, renders it and writes the SVG to `args.output`.
///
/// # Errors
///
/// Returns [`DemoError`] if either file cannot be accessed, the document is malformed, or it
/// has nothing to draw.
pub fn run(args: &Args) -> Result<(), DemoError> {
    log::info!("reading {}", args.input.display());
    let source = read(&args.input)?;
    let doc: Document = serde_json::from_str(&source)?;
    let svg = render(&doc)?;
    fs::write(&args.output, svg).map_err(|source| DemoError::Io {
        path: args.output.clone(),
        source,
    })?;
    log::info!("wrote {}", args.output.display());
    Ok(())
}

fn read(path: &Path) -> Result<String, DemoError> {
    fs::read_to_string(path).map_err(|source| DemoError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Lays out every section of `doc` and returns the SVG text.
///
/// # Errors
///
/// Returns [`DemoError`] if the sankey or treemap data is malformed, or if the document has
/// neither section.
pub fn render(doc: &Document) -> Result<String, DemoError> {
    if doc.sankey.is_none() && doc.treemap.is_none() {
        return Err(DemoError::NothingToDraw);
    }
    let size = Size::new(doc.width, doc.height);
    let mut scene = SvgScene::default();
    let mut top = 0.0;

    if let Some(sankey) = &doc.sankey {
        let mut graph = sankey.build_graph()?;
        let spec = sankey.spec(size);
        spec.layout(&mut graph);
        log::debug!(
            "sankey: {} nodes, {} links",
            graph.node_count(),
            graph.edge_count()
        );
        draw_sankey(&mut scene, &graph, spec.orient, Vec2::new(0.0, top));
        top += doc.height + CHART_GAP;
    }

    if let Some(treemap) = &doc.treemap {
        let mut tree = treemap.build_tree()?;
        let bounds = Rect::from_origin_size(Point::new(0.0, top), size);
        treemap.spec(bounds).layout(&mut tree);
        log::debug!("treemap: {} nodes", tree.len());
        draw_treemap(&mut scene, &tree);
    }

    log::debug!("svg: {} shapes", scene.len());
    Ok(scene.to_svg_string())
}

fn draw_sankey(scene: &mut SvgScene, graph: &Graph, orient: Orient, offset: Vec2) {
    for edge in graph.edge_indices() {
        let ribbon =
            SankeyRibbon::for_edge(graph, edge, orient, SankeyRibbon::DEFAULT_CURVENESS);
        let mut path = ribbon.to_path();
        path.apply_affine(Affine::translate(offset));
        let source = graph.edge(edge).node1;
        scene.push_path(path, palette(source.index()).with_alpha(0.3));
    }
    for n in graph.node_indices() {
        let node = graph.node(n);
        let rect = node.layout.rect() + offset;
        scene.push_rect(rect, palette(n.index()), None);
        let label = match orient {
            Orient::Horizontal => Point::new(rect.x1 + 4.0, rect.center().y),
            Orient::Vertical => Point::new(rect.x0, rect.y1 + LABEL_SIZE),
        };
        scene.push_text(label, LABEL_SIZE, &node.id, css::BLACK);
    }
}

fn draw_treemap(scene: &mut SvgScene, tree: &Tree) {
    let view_root = tree.view_root();
    tree.each_node(view_root, TraverseOrder::PreOrder, |id, node| {
        let Some(rect) = node.layout.rect else {
            return Visit::SkipChildren;
        };
        if id == view_root {
            return Visit::Continue;
        }
        scene.push_rect(rect, palette(branch_of(tree, view_root, id)), Some(css::WHITE));
        if node.view_children.is_empty()
            && rect.width() > 3.0 * LABEL_SIZE
            && rect.height() > 2.0 * LABEL_SIZE
        {
            scene.push_text(
                Point::new(rect.x0 + 4.0, rect.y0 + LABEL_SIZE),
                LABEL_SIZE,
                &node.name,
                css::WHITE,
            );
        }
        Visit::Continue
    });
}

/// Returns the arena slot of the child of `view_root` that `id` descends from.
fn branch_of(tree: &Tree, view_root: NodeId, id: NodeId) -> usize {
    tree.ancestors(id, true)
        .into_iter()
        .skip_while(|&a| a != view_root)
        .nth(1)
        .unwrap_or(id)
        .index()
}
