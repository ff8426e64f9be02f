//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. Spatial queries run in `f64` ([`DVec2`],
//! [`Matrix`]) so screen↔world round-trips through inverted matrices stay
//! well below float tolerance; geometry is downcast to `f32` only at the
//! GPU boundary.

pub use glam::{DVec2, Mat4, Vec2, dvec2};

/// A 2×3 affine transform: `[[a, c, tx], [b, d, ty], [0, 0, 1]]`.
///
/// Maps a point as `x' = a·x + c·y + tx`, `y' = b·x + d·y + ty`.
/// Composition follows the matrix-on-the-left convention:
/// `A.multiply(&B)` applies `B` first, then `A`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Matrix {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub const fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// Overwrite all six scalars in place.
    pub fn set_to(&mut self, a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.tx = tx;
        self.ty = ty;
    }

    /// Build a local transform from node components in one step, without
    /// intermediate multiplies.
    ///
    /// Equivalent to the product
    /// `T(origin) · T(position) · R(rotation) · S(scale) · T(−origin) · T(−pivot)`:
    /// scale and rotate around `pivot`, re-anchor by `origin` after scaling,
    /// then translate to `position`.
    pub fn from_components(
        position: DVec2,
        scale: DVec2,
        rotation: f64,
        origin: DVec2,
        pivot: DVec2,
    ) -> Self {
        let (sin, cos) = rotation.sin_cos();
        let a = cos * scale.x;
        let b = sin * scale.x;
        let c = -sin * scale.y;
        let d = cos * scale.y;
        // The combined anchor is subtracted before scale/rotate…
        let ax = origin.x + pivot.x;
        let ay = origin.y + pivot.y;
        // …and only the origin half is restored afterwards.
        Self {
            a,
            b,
            c,
            d,
            tx: position.x + origin.x - (a * ax + c * ay),
            ty: position.y + origin.y - (b * ax + d * ay),
        }
    }

    /// Compose two transforms: the result applies `other` first, then `self`.
    #[must_use]
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    /// In-place variant of [`multiply`](Self::multiply) from the other side:
    /// `self ← other × self`. Used when concatenating up an ancestor chain.
    pub fn pre_multiply(&mut self, other: &Matrix) {
        *self = other.multiply(self);
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Invert the transform, or `None` when the determinant is zero or
    /// non-finite (degenerate geometry, e.g. a zero scale axis).
    pub fn inverse(&self) -> Option<Matrix> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(Matrix {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            tx: (self.c * self.ty - self.d * self.tx) / det,
            ty: (self.b * self.tx - self.a * self.ty) / det,
        })
    }

    pub fn transform_point(&self, p: DVec2) -> DVec2 {
        DVec2 {
            x: self.a * p.x + self.c * p.y + self.tx,
            y: self.b * p.x + self.d * p.y + self.ty,
        }
    }

    /// Mutate `p` instead of returning a fresh point. Hot paths (per-frame
    /// input mapping, tile corner streams) use this to avoid churn.
    pub fn transform_point_in_place(&self, p: &mut DVec2) {
        let x = self.a * p.x + self.c * p.y + self.tx;
        p.y = self.b * p.x + self.d * p.y + self.ty;
        p.x = x;
    }

    pub fn is_finite(&self) -> bool {
        self.a.is_finite()
            && self.b.is_finite()
            && self.c.is_finite()
            && self.d.is_finite()
            && self.tx.is_finite()
            && self.ty.is_finite()
    }

    /// Component-wise comparison within `eps`.
    pub fn approx_eq(&self, other: &Matrix, eps: f64) -> bool {
        (self.a - other.a).abs() <= eps
            && (self.b - other.b).abs() <= eps
            && (self.c - other.c).abs() <= eps
            && (self.d - other.d).abs() <= eps
            && (self.tx - other.tx).abs() <= eps
            && (self.ty - other.ty).abs() <= eps
    }

    /// Embed into a 4×4 `f32` matrix for the GPU camera uniform.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols_array(&[
            self.a as f32,
            self.b as f32,
            0.0,
            0.0,
            self.c as f32,
            self.d as f32,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
            0.0,
            self.tx as f32,
            self.ty as f32,
            0.0,
            1.0,
        ])
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}
