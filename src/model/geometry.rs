//! Mask shapes and their rasterization onto the spectrum grid.
//!
//! All coordinates are spectrum matrix indices: `x` is the column, `y` the
//! row, both 0-based. Shapes may reach outside the matrix; the parts that do
//! are dropped.

use ndarray::{Array2, s};

/// The kind of shape a mask is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskKind {
    /// Axis-aligned rectangle
    Rectangle,
    /// Filled circle
    Circle,
    /// Individually painted cells
    FreeDraw,
}

impl MaskKind {
    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            MaskKind::Rectangle => "Rectangle",
            MaskKind::Circle => "Circle",
            MaskKind::FreeDraw => "Free Draw",
        }
    }

    /// Get all mask kinds.
    pub fn all() -> &'static [MaskKind] {
        &[MaskKind::Rectangle, MaskKind::Circle, MaskKind::FreeDraw]
    }
}

/// Shape of a mask in spectrum coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Geometry {
    /// Half-open rectangle `[y1, y2) x [x1, x2)`, with `x1 <= x2` and `y1 <= y2`.
    Rectangle { x1: i64, y1: i64, x2: i64, y2: i64 },
    /// Circle with inclusive boundary.
    Circle { cx: i64, cy: i64, radius: i64 },
    /// Ordered `(row, col)` cells.
    FreeformPoints { points: Vec<(i64, i64)> },
}

impl Geometry {
    /// Create a rectangle from two corners in any order.
    pub fn rectangle(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Geometry::Rectangle {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Create a circle centred on column `cx`, row `cy`.
    pub fn circle(cx: i64, cy: i64, radius: i64) -> Self {
        Geometry::Circle {
            cx,
            cy,
            radius: radius.saturating_abs(),
        }
    }

    /// Create a free-drawn shape from `(row, col)` cells.
    pub fn freeform(points: impl IntoIterator<Item = (i64, i64)>) -> Self {
        Geometry::FreeformPoints {
            points: points.into_iter().collect(),
        }
    }

    /// The kind of shape this is.
    pub fn kind(&self) -> MaskKind {
        match self {
            Geometry::Rectangle { .. } => MaskKind::Rectangle,
            Geometry::Circle { .. } => MaskKind::Circle,
            Geometry::FreeformPoints { .. } => MaskKind::FreeDraw,
        }
    }

    /// Return a copy with rectangle corners ordered.
    ///
    /// Geometry built through the enum variants directly may carry swapped corners.
    pub fn normalized(&self) -> Self {
        match *self {
            Geometry::Rectangle { x1, y1, x2, y2 } => Geometry::rectangle(x1, y1, x2, y2),
            Geometry::Circle { cx, cy, radius } => Geometry::circle(cx, cy, radius),
            Geometry::FreeformPoints { .. } => self.clone(),
        }
    }
}

/// Stamp `geometry` onto an `(rows, cols)` matrix and make it point-symmetric.
///
/// Cells covered by the shape get `fill_value`, every other cell
/// `background_value`. The result always satisfies
/// `m[r, c] == m[2*cy - r, 2*cx - c]` where both indices are in bounds, with
/// `(cy, cx) = (rows / 2, cols / 2)`.
pub fn rasterize(
    geometry: &Geometry,
    shape: (usize, usize),
    fill_value: f64,
    background_value: f64,
) -> Array2<f64> {
    let mut matrix = Array2::from_elem(shape, background_value);
    stamp(&mut matrix, geometry, fill_value);
    enforce_symmetry(&mut matrix, background_value);
    matrix
}

/// Write `fill_value` into every cell covered by `geometry`.
fn stamp(matrix: &mut Array2<f64>, geometry: &Geometry, fill_value: f64) {
    let (h, w) = matrix.dim();
    match geometry.normalized() {
        Geometry::Rectangle { x1, y1, x2, y2 } => {
            let rows = clamp_index(y1, h)..clamp_index(y2, h);
            let cols = clamp_index(x1, w)..clamp_index(x2, w);
            if rows.is_empty() || cols.is_empty() {
                return;
            }
            matrix.slice_mut(s![rows, cols]).fill(fill_value);
        }
        Geometry::Circle { cx, cy, radius } => {
            // i128 keeps squared distances exact for any i64 centre and radius
            let (cx, cy, r) = (i128::from(cx), i128::from(cy), i128::from(radius).abs());
            let (Some(rows), Some(cols)) = (window(cy, r, h), window(cx, r, w)) else {
                return;
            };
            let r2 = r * r;
            for row in rows {
                for col in cols.clone() {
                    let dx = col as i128 - cx;
                    let dy = row as i128 - cy;
                    if dx * dx + dy * dy <= r2 {
                        matrix[(row, col)] = fill_value;
                    }
                }
            }
        }
        Geometry::FreeformPoints { points } => {
            for (row, col) in points {
                if let (Some(r), Some(c)) = (in_bounds(row, h), in_bounds(col, w)) {
                    matrix[(r, c)] = fill_value;
                }
            }
        }
    }
}

/// Mirror every non-background cell through the matrix centre.
///
/// The mirrored cell is overwritten, not blended, so an asymmetric shape ends
/// up as the union of itself and its reflection.
pub fn enforce_symmetry(matrix: &mut Array2<f64>, background_value: f64) {
    let (h, w) = matrix.dim();
    let (cy, cx) = (h / 2, w / 2);

    for row in 0..h {
        for col in 0..w {
            let value = matrix[(row, col)];
            if value == background_value {
                continue;
            }
            let (Some(mr), Some(mc)) = ((2 * cy).checked_sub(row), (2 * cx).checked_sub(col))
            else {
                continue;
            };
            if mr < h && mc < w {
                matrix[(mr, mc)] = value;
            }
        }
    }
}

/// Point reflection of `(row, col)` through the centre, if it lands inside.
pub fn mirror_of(shape: (usize, usize), row: usize, col: usize) -> Option<(usize, usize)> {
    let (h, w) = shape;
    let mr = (2 * (h / 2)).checked_sub(row)?;
    let mc = (2 * (w / 2)).checked_sub(col)?;
    (mr < h && mc < w).then_some((mr, mc))
}

/// Indices of `[center - r, center + r]` inside `[0, len)`, if any.
fn window(center: i128, r: i128, len: usize) -> Option<std::ops::RangeInclusive<usize>> {
    let lo = (center - r).max(0);
    let hi = (center + r).min(len as i128 - 1);
    (lo <= hi).then(|| lo as usize..=hi as usize)
}

fn clamp_index(value: i64, len: usize) -> usize {
    value.clamp(0, len as i64) as usize
}

fn in_bounds(value: i64, len: usize) -> Option<usize> {
    usize::try_from(value).ok().filter(|&v| v < len)
}
