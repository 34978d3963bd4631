//! Points, rectangles, and 2D affine transforms.
//!
//! # Coordinate Spaces
//!
//! Three spaces appear in the editing pipeline, all y-down with the origin
//! at the top-left:
//!
//! - **View space**: where gestures are tracked and the transform's
//!   translation lives.
//! - **Mask space**: the local frame of a mask region's bounds.
//! - **Raster space**: integer pixel coordinates used by the samplers.
//!
//! Some host rasterizers hand back bottom-up (y-up) output. The only place
//! that mismatch may be reconciled is [`AffineTransform::flipped_vertically`];
//! no other code path negates a y component. Keeping the flip in one
//! documented function is what prevents silent sign errors.

use serde::{Deserialize, Serialize};

/// Determinants smaller than this are treated as singular.
const SINGULAR_EPSILON: f32 = 1e-6;

/// A position in one of the editing coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset this point by a vector.
    pub fn offset(self, v: Vector) -> Self {
        Self::new(self.x + v.dx, self.y + v.dy)
    }
}

/// A translation delta, as delivered by a pan gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub dx: f32,
    pub dy: f32,
}

impl Vector {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Component-wise sum of two deltas.
    pub fn plus(self, other: Vector) -> Self {
        Self::new(self.dx + other.dx, self.dy + other.dy)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Geometric center of the rectangle.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A 2D affine transform with components (a, b, c, d, tx, ty).
///
/// Maps a point as:
///
/// ```text
/// x' = a*x + c*y + tx
/// y' = b*x + d*y + ty
/// ```
///
/// Composes associatively; invertible whenever the determinant `a*d - b*c`
/// is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// A pure translation.
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self {
            tx,
            ty,
            ..Self::identity()
        }
    }

    /// A uniform scale about the origin.
    pub fn uniform_scale(s: f32) -> Self {
        Self {
            a: s,
            d: s,
            ..Self::identity()
        }
    }

    /// A rotation about the origin, angle in radians (positive = clockwise
    /// in y-down space).
    pub fn rotation(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Compose: apply `self` first, then `next`.
    pub fn then(&self, next: &AffineTransform) -> Self {
        Self {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
            tx: self.tx * next.a + self.ty * next.c + next.tx,
            ty: self.tx * next.b + self.ty * next.d + next.ty,
        }
    }

    /// The determinant of the linear part.
    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// The inverse transform, or `None` when singular.
    pub fn inverse(&self) -> Option<AffineTransform> {
        let det = self.determinant();
        if det.abs() < SINGULAR_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let a = self.d * inv_det;
        let b = -self.b * inv_det;
        let c = -self.c * inv_det;
        let d = self.a * inv_det;
        Some(AffineTransform {
            a,
            b,
            c,
            d,
            tx: -(self.tx * a + self.ty * c),
            ty: -(self.tx * b + self.ty * d),
        })
    }

    /// Apply the transform to a point.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Reconcile a y-up space with our y-down convention.
    ///
    /// Composes a vertical flip over a canvas of the given height onto this
    /// transform. This is the single sanctioned y-axis conversion; see the
    /// module docs.
    pub fn flipped_vertically(&self, height: f32) -> Self {
        let flip = AffineTransform {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: -1.0,
            tx: 0.0,
            ty: height,
        };
        self.then(&flip)
    }

    /// The uniform scale magnitude of the linear part.
    ///
    /// For the transforms this crate builds (translation + uniform scale)
    /// this is exactly the scale factor; for a general transform it is the
    /// average axis length.
    pub fn scale_magnitude(&self) -> f32 {
        let sx = (self.a * self.a + self.b * self.b).sqrt();
        let sy = (self.c * self.c + self.d * self.d).sqrt();
        (sx + sy) / 2.0
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
