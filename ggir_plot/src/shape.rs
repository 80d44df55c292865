// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point shape codes.
//!
//! The producer encodes point shapes as R's numeric plotting codes. Only the
//! commonly used subset is mapped; everything else falls back to a circle.
//! Codes 15-19 are the filled variants, everything below is stroke only.

extern crate alloc;

use kurbo::{BezPath, Circle, Point, Shape as _};

/// Geometry of a point symbol, independent of fill/stroke treatment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// An axis-aligned square.
    Square,
    /// A circle.
    Circle,
    /// An upward triangle.
    Triangle,
    /// A plus sign.
    Plus,
    /// A diagonal cross.
    Cross,
    /// A square rotated 45 degrees.
    Diamond,
}

impl Shape {
    /// Map an R plotting code to a shape, defaulting to a circle.
    pub fn from_code(code: f64) -> Self {
        match code as i64 {
            0 | 15 => Self::Square,
            2 | 17 => Self::Triangle,
            3 => Self::Plus,
            4 => Self::Cross,
            5 | 18 => Self::Diamond,
            _ => Self::Circle,
        }
    }

    /// Path for this symbol centered at `center`; `size` is the diameter or
    /// side length.
    pub fn path(self, center: Point, size: f64) -> BezPath {
        let (cx, cy) = (center.x, center.y);
        let h = size * 0.5;
        match self {
            Self::Square => polygon(&[
                (cx - h, cy - h),
                (cx + h, cy - h),
                (cx + h, cy + h),
                (cx - h, cy + h),
            ]),
            Self::Circle => {
                // Tolerance is fine for on-screen symbol sizes.
                Circle::new(center, h).path_elements(0.05).collect()
            }
            Self::Triangle => polygon(&[(cx, cy - h), (cx + h, cy + h), (cx - h, cy + h)]),
            Self::Plus => {
                let mut p = BezPath::new();
                p.move_to((cx - h, cy));
                p.line_to((cx + h, cy));
                p.move_to((cx, cy - h));
                p.line_to((cx, cy + h));
                p
            }
            Self::Cross => {
                let d = h * core::f64::consts::FRAC_1_SQRT_2;
                let mut p = BezPath::new();
                p.move_to((cx - d, cy - d));
                p.line_to((cx + d, cy + d));
                p.move_to((cx - d, cy + d));
                p.line_to((cx + d, cy - d));
                p
            }
            Self::Diamond => polygon(&[(cx, cy - h), (cx + h, cy), (cx, cy + h), (cx - h, cy)]),
        }
    }
}

/// Whether an R plotting code denotes a filled symbol.
pub fn is_filled_code(code: f64) -> bool {
    (15.0..=19.0).contains(&code)
}

fn polygon(pts: &[(f64, f64)]) -> BezPath {
    let mut p = BezPath::new();
    let mut iter = pts.iter();
    if let Some(&first) = iter.next() {
        p.move_to(first);
        for &pt in iter {
            p.line_to(pt);
        }
        p.close_path();
    }
    p
}

#[cfg(test)]
mod tests {
    extern crate std;

    use kurbo::Shape as _;

    use super::*;

    #[test]
    fn unknown_codes_fall_back_to_circle() {
        assert_eq!(Shape::from_code(23.0), Shape::Circle);
        assert_eq!(Shape::from_code(-1.0), Shape::Circle);
    }

    #[test]
    fn filled_range_is_fifteen_through_nineteen() {
        assert!(!is_filled_code(1.0));
        assert!(is_filled_code(15.0));
        assert!(is_filled_code(19.0));
        assert!(!is_filled_code(20.0));
    }

    #[test]
    fn square_path_spans_its_size() {
        let b = Shape::Square
            .path(Point::new(10.0, 10.0), 8.0)
            .bounding_box();
        assert_eq!((b.x0, b.y0, b.x1, b.y1), (6.0, 6.0, 14.0, 14.0));
    }
}
