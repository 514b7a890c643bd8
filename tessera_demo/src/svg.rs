// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG writer for laid-out charts.

use std::fmt::Write as _;

use kurbo::{BezPath, Point, Rect};
use peniko::Color;

#[derive(Debug)]
enum Item {
    Rect {
        rect: Rect,
        fill: Color,
        stroke: Option<Color>,
    },
    Path {
        path: BezPath,
        fill: Color,
    },
    Text {
        pos: Point,
        font_size: f64,
        text: String,
        fill: Color,
    },
}

/// Shapes in paint order, plus the area they cover.
#[derive(Debug, Default)]
pub(crate) struct SvgScene {
    items: Vec<Item>,
    view_box: Option<Rect>,
}

impl SvgScene {
    pub(crate) fn push_rect(&mut self, rect: Rect, fill: Color, stroke: Option<Color>) {
        self.grow(rect);
        self.items.push(Item::Rect { rect, fill, stroke });
    }

    pub(crate) fn push_path(&mut self, path: BezPath, fill: Color) {
        self.grow(kurbo::Shape::bounding_box(&path));
        self.items.push(Item::Path { path, fill });
    }

    pub(crate) fn push_text(&mut self, pos: Point, font_size: f64, text: &str, fill: Color) {
        self.items.push(Item::Text {
            pos,
            font_size,
            text: text.to_owned(),
            fill,
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    fn grow(&mut self, r: Rect) {
        self.view_box = Some(match self.view_box {
            None => r,
            Some(v) => v.union(r),
        });
    }

    pub(crate) fn to_svg_string(&self) -> String {
        let view_box = self
            .view_box
            .map(|r| r.inflate(10.0, 10.0))
            .unwrap_or_else(|| Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut out = String::new();

        out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" "#);
        let _ = writeln!(
            out,
            r#"viewBox="{} {} {} {}" width="{}" height="{}">"#,
            view_box.x0,
            view_box.y0,
            view_box.width(),
            view_box.height(),
            view_box.width(),
            view_box.height()
        );

        for item in &self.items {
            match item {
                Item::Rect { rect, fill, stroke } => {
                    let _ = write!(
                        out,
                        r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                        rect.x0,
                        rect.y0,
                        rect.width(),
                        rect.height(),
                    );
                    write_paint_attr(&mut out, "fill", *fill);
                    if let Some(stroke) = stroke {
                        write_paint_attr(&mut out, "stroke", *stroke);
                    }
                    out.push_str("/>\n");
                }
                Item::Path { path, fill } => {
                    let _ = write!(out, r#"<path d="{}""#, path.to_svg());
                    write_paint_attr(&mut out, "fill", *fill);
                    out.push_str("/>\n");
                }
                Item::Text {
                    pos,
                    font_size,
                    text,
                    fill,
                } => {
                    let _ = write!(
                        out,
                        r#"<text x="{}" y="{}" font-size="{}" dominant-baseline="middle""#,
                        pos.x, pos.y, font_size
                    );
                    write_paint_attr(&mut out, "fill", *fill);
                    out.push('>');
                    out.push_str(&escape_xml(text));
                    out.push_str("</text>\n");
                }
            }
        }

        out.push_str("</svg>\n");
        out
    }
}

fn write_paint_attr(out: &mut String, name: &str, color: Color) {
    let rgba = color.to_rgba8();
    let _ = write!(
        out,
        r##" {name}="#{:02x}{:02x}{:02x}""##,
        rgba.r, rgba.g, rgba.b
    );
    if rgba.a != 255 {
        let _ = write!(out, r#" {name}-opacity="{}""#, f64::from(rgba.a) / 255.0);
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use peniko::color::palette::css;

    use super::*;

    #[test]
    fn writes_shapes_in_order() {
        let mut scene = SvgScene::default();
        scene.push_rect(Rect::new(0.0, 0.0, 10.0, 5.0), css::TOMATO, None);
        scene.push_text(Point::new(1.0, 2.0), 12.0, "a<b", css::BLACK);
        let svg = scene.to_svg_string();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="-10 -10 30 25""#));
        assert!(svg.contains(r##"fill="#ff6347""##));
        assert!(svg.contains("a&lt;b"));
        assert!(svg.find("<rect").unwrap() < svg.find("<text").unwrap());
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn translucent_fills_get_an_opacity() {
        let mut scene = SvgScene::default();
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((4.0, 0.0));
        path.line_to((4.0, 4.0));
        path.close_path();
        scene.push_path(path, css::BLACK.with_alpha(0.5));
        let svg = scene.to_svg_string();
        assert!(svg.contains("<path d=\"M"));
        assert!(svg.contains("fill-opacity="));
    }
}
