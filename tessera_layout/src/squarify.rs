// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Squarified rectangle packing.
//!
//! [`Squarify`] tiles a bounding rectangle with one sub-rectangle per input area. Areas are
//! consumed in order: each step lays a strip along the shorter side of the remaining region and
//! grows it one item at a time for as long as that makes its first rectangle more square.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::Rect;

/// Squarified treemap engine bound to a fixed rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Squarify {
    bounds: Rect,
}

impl Squarify {
    /// Creates an engine that tiles `bounds`.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds: bounds.abs(),
        }
    }

    /// Returns the rectangle being tiled.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Tiles the bounds with one rectangle per area, in input order.
    ///
    /// `areas` should already sum to the area of the bounds; they are not re-normalized.
    /// Negative and non-finite areas count as `0`. When every remaining area is `0` the
    /// remaining region is split into equal slices along its longer side.
    pub fn run(&self, areas: &[f64]) -> Vec<Rect> {
        let areas: Vec<f64> = areas
            .iter()
            .map(|&a| if a.is_finite() && a > 0.0 { a } else { 0.0 })
            .collect();
        let mut out = Vec::with_capacity(areas.len());
        let mut row = self.bounds;
        let mut rest = &areas[..];

        while !rest.is_empty() {
            if row.area() <= 0.0 || rest.iter().all(|&a| a == 0.0) {
                log::trace!("squarify: splitting {} empty areas equally", rest.len());
                split_equally(row, rest.len(), &mut out);
                break;
            }

            // Lay the strip along the shorter side.
            let transposed = row.width() < row.height();
            let (width, height) = if transposed {
                (row.height(), row.width())
            } else {
                (row.width(), row.height())
            };

            let (count, thickness) = strip(rest, width, height);
            let placed = &rest[..count];
            let thickness = if count == rest.len() {
                width
            } else {
                thickness.min(width)
            };
            let sum: f64 = placed.iter().sum();

            let mut offset = 0.0;
            for (i, &a) in placed.iter().enumerate() {
                let length = if sum > 0.0 {
                    height * a / sum
                } else {
                    height / count as f64
                };
                let end = if i + 1 == count {
                    height
                } else {
                    offset + length
                };
                out.push(if transposed {
                    Rect::new(
                        row.x0 + offset,
                        row.y0,
                        row.x0 + end,
                        row.y0 + thickness,
                    )
                } else {
                    Rect::new(
                        row.x0,
                        row.y0 + offset,
                        row.x0 + thickness,
                        row.y0 + end,
                    )
                });
                offset = end;
            }

            row = if transposed {
                Rect::new(row.x0, row.y0 + thickness, row.x1, row.y1)
            } else {
                Rect::new(row.x0 + thickness, row.y0, row.x1, row.y1)
            };
            rest = &rest[count..];
        }

        out
    }
}

/// Chooses how many leading areas go into the next strip, and the strip thickness.
///
/// `width` is the extent the strip eats into, `height` the extent it spans.
fn strip(areas: &[f64], width: f64, height: f64) -> (usize, f64) {
    if areas.len() == 1 {
        return (1, width);
    }
    let first = areas[0];
    let mut sum = first;
    for count in 1..areas.len() {
        let next = sum + areas[count];
        let current = skew(sum / height, height * first / sum);
        let grown = skew(next / height, height * first / next);
        if current <= grown {
            return (count, sum / height);
        }
        sum = next;
    }
    (areas.len(), sum / height)
}

/// Distance of a rectangle's aspect ratio from `1`, in `[0, 1]`.
///
/// Degenerate rectangles are maximally skewed.
fn skew(width: f64, height: f64) -> f64 {
    if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
        return 1.0;
    }
    let ratio = height / width;
    let ratio = if ratio > 1.0 { 1.0 / ratio } else { ratio };
    1.0 - ratio
}

fn split_equally(row: Rect, n: usize, out: &mut Vec<Rect>) {
    let horizontal = row.width() >= row.height();
    for i in 0..n {
        let t0 = i as f64 / n as f64;
        let t1 = (i + 1) as f64 / n as f64;
        out.push(if horizontal {
            let x0 = row.x0 + row.width() * t0;
            let x1 = if i + 1 == n {
                row.x1
            } else {
                row.x0 + row.width() * t1
            };
            Rect::new(x0, row.y0, x1, row.y1)
        } else {
            let y0 = row.y0 + row.height() * t0;
            let y1 = if i + 1 == n {
                row.y1
            } else {
                row.y0 + row.height() * t1
            };
            Rect::new(row.x0, y0, row.x1, y1)
        });
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;
    use alloc::vec::Vec;

    use proptest::prelude::*;

    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_rect(r: Rect, x0: f64, y0: f64, x1: f64, y1: f64) {
        assert!(
            (r.x0 - x0).abs() < EPS
                && (r.y0 - y0).abs() < EPS
                && (r.x1 - x1).abs() < EPS
                && (r.y1 - y1).abs() < EPS,
            "{r:?} != ({x0}, {y0}, {x1}, {y1})"
        );
    }

    #[test]
    fn two_halves() {
        let out = Squarify::new(Rect::new(0.0, 0.0, 10.0, 10.0)).run(&[50.0, 50.0]);
        assert_eq!(out.len(), 2);
        assert_rect(out[0], 0.0, 0.0, 5.0, 10.0);
        assert_rect(out[1], 5.0, 0.0, 10.0, 10.0);
    }

    #[test]
    fn uneven_pair_stays_in_order() {
        let out = Squarify::new(Rect::new(0.0, 0.0, 10.0, 10.0)).run(&[30.0, 70.0]);
        assert_rect(out[0], 0.0, 0.0, 3.0, 10.0);
        assert_rect(out[1], 3.0, 0.0, 10.0, 10.0);
    }

    #[test]
    fn single_area_fills_bounds() {
        let bounds = Rect::new(2.0, 3.0, 9.0, 4.0);
        let out = Squarify::new(bounds).run(&[7.0]);
        assert_eq!(out, vec![bounds]);
    }

    #[test]
    fn empty_input() {
        assert!(
            Squarify::new(Rect::new(0.0, 0.0, 1.0, 1.0))
                .run(&[])
                .is_empty()
        );
    }

    #[test]
    fn classic_sequence_builds_square_strips() {
        // 6x4 region with areas summing to 24.
        let out = Squarify::new(Rect::new(0.0, 0.0, 6.0, 4.0))
            .run(&[6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0]);
        assert_eq!(out.len(), 7);
        assert_rect(out[0], 0.0, 0.0, 3.0, 2.0);
        assert_rect(out[1], 0.0, 2.0, 3.0, 4.0);
        // The remaining 3x4 region is taller than wide, so the next strip runs across x.
        assert!((out[2].y1 - 7.0 / 3.0).abs() < EPS);
        assert!((out[3].y1 - 7.0 / 3.0).abs() < EPS);
        assert!((out[2].x0 - 3.0).abs() < EPS);
        assert!((out[3].x1 - 6.0).abs() < EPS);
    }

    #[test]
    fn all_zero_areas_split_equally() {
        let out = Squarify::new(Rect::new(0.0, 0.0, 9.0, 2.0)).run(&[0.0, 0.0, 0.0]);
        assert_rect(out[0], 0.0, 0.0, 3.0, 2.0);
        assert_rect(out[1], 3.0, 0.0, 6.0, 2.0);
        assert_rect(out[2], 6.0, 0.0, 9.0, 2.0);
    }

    #[test]
    fn bad_areas_count_as_zero() {
        let out =
            Squarify::new(Rect::new(0.0, 0.0, 10.0, 10.0)).run(&[f64::NAN, 100.0, -4.0]);
        assert_eq!(out.len(), 3);
        assert!(out[0].area().abs() < EPS);
        assert!((out[1].area() - 100.0).abs() < 1e-6);
        assert!(out[2].area().abs() < EPS);
    }

    #[test]
    fn runs_are_deterministic() {
        let engine = Squarify::new(Rect::new(0.0, 0.0, 30.0, 20.0));
        let areas = [120.0, 80.0, 200.0, 100.0, 50.0, 50.0];
        assert_eq!(engine.run(&areas), engine.run(&areas));
    }

    fn overlap(a: Rect, b: Rect) -> f64 {
        let i = a.intersect(b);
        if i.width() > 0.0 && i.height() > 0.0 {
            i.area()
        } else {
            0.0
        }
    }

    proptest! {
        #[test]
        fn tiles_preserve_area(
            raw in proptest::collection::vec(0.0_f64..100.0, 1..24),
            w in 1.0_f64..500.0,
            h in 1.0_f64..500.0,
        ) {
            let total: f64 = raw.iter().sum();
            prop_assume!(total > 1e-6);
            let bounds = Rect::new(0.0, 0.0, w, h);
            let areas: Vec<f64> = raw.iter().map(|a| a / total * bounds.area()).collect();
            let out = Squarify::new(bounds).run(&areas);

            prop_assert_eq!(out.len(), areas.len());
            let tol = 1e-6 * bounds.area();
            let mut covered = 0.0;
            for (r, a) in out.iter().zip(&areas) {
                prop_assert!(r.x0 >= -tol && r.y0 >= -tol);
                prop_assert!(r.x1 <= w + tol && r.y1 <= h + tol);
                prop_assert!((r.area() - a).abs() <= tol.max(1e-9));
                covered += r.area();
            }
            prop_assert!((covered - bounds.area()).abs() <= tol);
            for i in 0..out.len() {
                for j in i + 1..out.len() {
                    prop_assert!(overlap(out[i], out[j]) <= tol);
                }
            }
        }
    }
}
