/// 4x4 homogeneous transformation matrices
use bytemuck::{Pod, Zeroable};
use std::f32::consts::PI;
use std::fmt;
use std::ops::{Mul, MulAssign};

use crate::fmt::general;
use crate::vector::Vector3;

/// Determinants smaller than this are treated as singular by [`Matrix4::inverse`].
pub const SINGULAR_EPSILON: f32 = 0.000001;

/// A 4x4 matrix stored column-major: column `c`, row `r` lives at `data[c * 4 + r]`.
///
/// Every builder (`translate`, `rotate`, `frustum`, `perspective`,
/// `orthographic`) post-multiplies onto the current matrix, so chained calls
/// compose in call order: `m.translate(..).rotate(..)` is `m * T * R`.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Matrix4 {
    pub data: [f32; 16],
}

impl Matrix4 {
    /// Create an identity matrix
    pub fn new() -> Self {
        Self::identity()
    }

    pub fn identity() -> Self {
        let mut data = [0.0; 16];
        for (i, value) in data.iter_mut().enumerate() {
            if i % 5 == 0 {
                *value = 1.0;
            }
        }
        Self { data }
    }

    pub fn from_columns(data: [f32; 16]) -> Self {
        Self { data }
    }

    pub fn load_identity(&mut self) -> &mut Self {
        *self = Self::identity();
        self
    }

    /// Compose a perspective projection given the clipping box at the near plane
    pub fn frustum(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        znear: f32,
        zfar: f32,
    ) -> &mut Self {
        let mut m = Matrix4::identity();
        m.data[0] = (2.0 * znear) / (right - left);
        m.data[5] = (2.0 * znear) / (top - bottom);
        m.data[8] = (right + left) / (right - left);
        m.data[9] = (top + bottom) / (top - bottom);
        m.data[10] = -((zfar + znear) / (zfar - znear));
        m.data[11] = -1.0;
        m.data[14] = -((2.0 * zfar * znear) / (zfar - znear));
        m.data[15] = 0.0;
        *self *= m;
        self
    }

    /// Compose a symmetric perspective projection; `fovy` is in degrees
    pub fn perspective(&mut self, fovy: f32, aspect: f32, znear: f32, zfar: f32) -> &mut Self {
        let f = 1.0 / ((fovy * (PI / 180.0)) / 2.0).tan();
        let mut m = Matrix4::identity();
        m.data[0] = f / aspect;
        m.data[5] = f;
        m.data[10] = (zfar + znear) / (znear - zfar);
        m.data[11] = -1.0;
        m.data[14] = (2.0 * zfar * znear) / (znear - zfar);
        m.data[15] = 0.0;
        *self *= m;
        self
    }

    pub fn orthographic(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        znear: f32,
        zfar: f32,
    ) -> &mut Self {
        let mut m = Matrix4::identity();
        m.data[0] = 2.0 / (right - left);
        m.data[5] = 2.0 / (top - bottom);
        m.data[10] = -2.0 / (zfar - znear);
        m.data[12] = -((right + left) / (right - left));
        m.data[13] = -((top + bottom) / (top - bottom));
        m.data[14] = -((zfar + znear) / (zfar - znear));
        *self *= m;
        self
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        let mut m = Matrix4::identity();
        m.data[12] = x;
        m.data[13] = y;
        m.data[14] = z;
        *self *= m;
        self
    }

    pub fn translate_by(&mut self, v: Vector3) -> &mut Self {
        self.translate(v.x, v.y, v.z)
    }

    /// Compose a rotation of `degrees` counter-clockwise about `axis`.
    ///
    /// A zero-length axis leaves the matrix unchanged.
    pub fn rotate(&mut self, degrees: f32, axis: Vector3) -> &mut Self {
        if axis.length() == 0.0 {
            return self;
        }
        let Vector3 { x, y, z, .. } = axis.normalize();
        let (s, c) = (degrees * (PI / 180.0)).sin_cos();
        let t = 1.0 - c;

        let mut m = Matrix4::identity();
        m.data[0] = x * x * t + c;
        m.data[1] = y * x * t + z * s;
        m.data[2] = x * z * t - y * s;
        m.data[4] = x * y * t - z * s;
        m.data[5] = y * y * t + c;
        m.data[6] = y * z * t + x * s;
        m.data[8] = x * z * t + y * s;
        m.data[9] = y * z * t - x * s;
        m.data[10] = z * z * t + c;
        *self *= m;
        self
    }

    /// Copy with the translation column cleared; the projective row is kept
    pub fn untranslate(&self) -> Matrix4 {
        let mut m = *self;
        m.data[12] = 0.0;
        m.data[13] = 0.0;
        m.data[14] = 0.0;
        m
    }

    pub fn transpose(&self) -> Matrix4 {
        let mut m = Matrix4::identity();
        for c in 0..4 {
            for r in 0..4 {
                m.data[r * 4 + c] = self.data[c * 4 + r];
            }
        }
        m
    }

    /// Inverse via the adjugate; returns identity when the determinant is
    /// below [`SINGULAR_EPSILON`] in magnitude.
    pub fn inverse(&self) -> Matrix4 {
        let mut m = Matrix4::identity();
        let det = self.determinant();
        if det.abs() < SINGULAR_EPSILON {
            return m;
        }
        for c in 0..4 {
            for r in 0..4 {
                m.data[c * 4 + r] = self.cofactor(c, r) / det;
            }
        }
        m.transpose()
    }

    /// Signed determinant of the 3x3 minor left after removing `column` and `row`.
    ///
    /// The minor is evaluated with the diagonal rule: for each of the three
    /// remaining columns, the product walking forward through the remaining
    /// columns (wrapping, skipping `column`) minus the product walking
    /// backward. Indices outside `0..4` yield 0.
    pub fn cofactor(&self, column: usize, row: usize) -> f32 {
        if column > 3 || row > 3 {
            return 0.0;
        }
        let (column, row) = (column as i32, row as i32);

        let mut cofactor = 0.0;
        for c in 0..4 {
            if c == column {
                continue;
            }
            let (mut pfactor, mut nfactor) = (1.0, 1.0);
            let (mut pcc, mut ncc) = (c, c);
            for r in 0..4 {
                if r == row {
                    continue;
                }
                if pcc == column {
                    pcc += 1;
                }
                if pcc > 3 {
                    pcc = if column == 0 { 1 } else { 0 };
                }
                if ncc == column {
                    ncc -= 1;
                }
                if ncc < 0 {
                    ncc = if column == 3 { 2 } else { 3 };
                }
                pfactor *= self.data[(pcc * 4 + r) as usize];
                nfactor *= self.data[(ncc * 4 + r) as usize];
                pcc += 1;
                ncc -= 1;
            }
            cofactor += pfactor - nfactor;
        }

        if (row + column) % 2 == 0 {
            cofactor
        } else {
            -cofactor
        }
    }

    /// Cofactor expansion along the fourth row
    pub fn determinant(&self) -> f32 {
        self.data[3] * self.cofactor(0, 3)
            + self.data[7] * self.cofactor(1, 3)
            + self.data[11] * self.cofactor(2, 3)
            + self.data[15] * self.cofactor(3, 3)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        let mut m = Matrix4::identity();
        for c in 0..4 {
            for r in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.data[k * 4 + r] * rhs.data[c * 4 + k];
                }
                m.data[c * 4 + r] = sum;
            }
        }
        m
    }
}

impl MulAssign for Matrix4 {
    fn mul_assign(&mut self, rhs: Matrix4) {
        *self = *self * rhs;
    }
}

/// Full homogeneous product, including the projective `w`
impl Mul<Vector3> for Matrix4 {
    type Output = Vector3;

    fn mul(self, v: Vector3) -> Vector3 {
        let m = &self.data;
        Vector3::with_w(
            m[0] * v.x + m[4] * v.y + m[8] * v.z + m[12] * v.w,
            m[1] * v.x + m[5] * v.y + m[9] * v.z + m[13] * v.w,
            m[2] * v.x + m[6] * v.y + m[10] * v.z + m[14] * v.w,
            m[3] * v.x + m[7] * v.y + m[11] * v.z + m[15] * v.w,
        )
    }
}

impl fmt::Display for Matrix4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            if r > 0 {
                writeln!(f)?;
            }
            write!(f, "| ")?;
            for c in 0..4 {
                write!(f, "{:<10}", general(self.data[c * 4 + r]))?;
            }
            write!(f, " |")?;
        }
        Ok(())
    }
}

impl From<Matrix4> for nalgebra::Matrix4<f32> {
    fn from(m: Matrix4) -> Self {
        nalgebra::Matrix4::from_column_slice(&m.data)
    }
}

impl From<nalgebra::Matrix4<f32>> for Matrix4 {
    fn from(m: nalgebra::Matrix4<f32>) -> Self {
        let mut data = [0.0; 16];
        data.copy_from_slice(m.as_slice());
        Matrix4 { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_matrix_eq(a: &Matrix4, b: &Matrix4, epsilon: f32) {
        for i in 0..16 {
            assert!(
                (a.data[i] - b.data[i]).abs() < epsilon,
                "element {i} differs: {} vs {}\n{a}\n{b}",
                a.data[i],
                b.data[i]
            );
        }
    }

    fn sample_matrices() -> Vec<Matrix4> {
        vec![
            Matrix4::from_columns([
                2.0, 0.0, 0.0, 0.0, //
                0.0, 4.0, 0.0, 0.0, //
                0.0, 0.0, 8.0, 0.0, //
                1.0, 2.0, 3.0, 1.0,
            ]),
            Matrix4::from_columns([
                1.0, 2.0, 0.5, -1.0, //
                0.0, 3.0, 1.0, 2.0, //
                4.0, -2.0, 1.0, 0.0, //
                1.0, 1.0, 1.0, 3.0,
            ]),
            *Matrix4::identity()
                .translate(3.0, -2.0, 5.0)
                .rotate(30.0, Vector3::new(1.0, 1.0, 0.0)),
            *Matrix4::identity().perspective(60.0, 1.5, 1.0, 100.0),
        ]
    }

    #[test]
    fn test_identity_layout() {
        let m = Matrix4::new();
        for i in 0..16 {
            let expected = if [0, 5, 10, 15].contains(&i) { 1.0 } else { 0.0 };
            assert_eq!(m.data[i], expected);
        }
        assert_eq!(Matrix4::default(), m);

        let mut n = Matrix4::from_columns([3.0; 16]);
        n.load_identity();
        assert_eq!(n, m);
    }

    #[test]
    fn test_translate() {
        let mut m = Matrix4::identity();
        m.translate(1.0, 2.0, 3.0);
        assert_eq!(&m.data[12..15], &[1.0, 2.0, 3.0]);

        let p = m * Vector3::new(1.0, 1.0, 1.0);
        assert_eq!(p, Vector3::new(2.0, 3.0, 4.0));
        assert_eq!(p.w, 1.0);

        // Directions (w = 0) are not translated
        let d = m * Vector3::with_w(1.0, 1.0, 1.0, 0.0);
        assert_eq!(d, Vector3::new(1.0, 1.0, 1.0));

        let mut n = Matrix4::identity();
        n.translate_by(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(m, n);
    }

    #[test]
    fn test_builders_post_multiply() {
        let mut t = Matrix4::identity();
        t.translate(1.0, 2.0, 3.0);
        let mut p = Matrix4::identity();
        p.perspective(45.0, 1.0, 0.5, 50.0);

        let mut chained = Matrix4::identity();
        chained.translate(1.0, 2.0, 3.0).perspective(45.0, 1.0, 0.5, 50.0);
        assert_matrix_eq(&chained, &(t * p), 1e-6);

        let mut reversed = Matrix4::identity();
        reversed.perspective(45.0, 1.0, 0.5, 50.0).translate(1.0, 2.0, 3.0);
        assert_matrix_eq(&reversed, &(p * t), 1e-6);
    }

    #[test]
    fn test_perspective() {
        let mut m = Matrix4::identity();
        m.perspective(90.0, 2.0, 1.0, 3.0);
        assert_relative_eq!(m.data[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(m.data[5], 1.0, epsilon = 1e-6);
        assert_eq!(m.data[10], -2.0);
        assert_eq!(m.data[11], -1.0);
        assert_eq!(m.data[14], -3.0);
        assert_eq!(m.data[15], 0.0);
    }

    #[test]
    fn test_frustum() {
        let mut m = Matrix4::identity();
        m.frustum(-1.0, 1.0, -1.0, 1.0, 1.0, 3.0);
        assert_eq!(m.data[0], 1.0);
        assert_eq!(m.data[5], 1.0);
        assert_eq!(m.data[8], 0.0);
        assert_eq!(m.data[9], 0.0);
        assert_eq!(m.data[10], -2.0);
        assert_eq!(m.data[11], -1.0);
        assert_eq!(m.data[14], -3.0);
        assert_eq!(m.data[15], 0.0);

        // Symmetric frustum matches the equivalent perspective
        let mut p = Matrix4::identity();
        p.perspective(90.0, 1.0, 1.0, 3.0);
        assert_matrix_eq(&m, &p, 1e-6);
    }

    #[test]
    fn test_orthographic() {
        let mut m = Matrix4::identity();
        m.orthographic(0.0, 4.0, 0.0, 2.0, 1.0, 5.0);
        assert_eq!(m.data[0], 0.5);
        assert_eq!(m.data[5], 1.0);
        assert_eq!(m.data[10], -0.5);
        assert_eq!(m.data[12], -1.0);
        assert_eq!(m.data[13], -1.0);
        assert_eq!(m.data[14], -1.5);
        assert_eq!(m.data[15], 1.0);
    }

    #[test]
    fn test_rotate() {
        let mut m = Matrix4::identity();
        m.rotate(90.0, Vector3::new(0.0, 0.0, 1.0));
        let v = m * Vector3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(v.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(v.z, 0.0, epsilon = 1e-6);

        let mut unchanged = Matrix4::identity();
        unchanged.rotate(45.0, Vector3::default());
        assert_eq!(unchanged, Matrix4::identity());
    }

    #[test]
    fn test_untranslate() {
        let mut m = Matrix4::identity();
        m.translate(4.0, 5.0, 6.0);
        m.data[15] = 2.0;
        let u = m.untranslate();
        assert_eq!(&u.data[12..16], &[0.0, 0.0, 0.0, 2.0]);
        assert_eq!(m.data[12], 4.0);
    }

    #[test]
    fn test_transpose() {
        let data: [f32; 16] = std::array::from_fn(|i| i as f32);
        let m = Matrix4::from_columns(data);
        let t = m.transpose();
        assert_eq!(t.data[1], 4.0);
        assert_eq!(t.data[4], 1.0);
        assert_eq!(t.data[12], 3.0);

        for m in sample_matrices() {
            assert_eq!(m.transpose().transpose(), m);
        }
    }

    #[test]
    fn test_determinant() {
        let samples = sample_matrices();
        assert_eq!(samples[0].determinant(), 64.0);

        for m in samples {
            let reference = nalgebra::Matrix4::from(m).determinant();
            assert_relative_eq!(m.determinant(), reference, epsilon = 1e-3, max_relative = 1e-4);
        }

        let singular = Matrix4::from_columns(std::array::from_fn(|i| (i + 1) as f32));
        assert_eq!(singular.determinant(), 0.0);
    }

    #[test]
    fn test_cofactor_out_of_range() {
        let m = sample_matrices()[1];
        assert_eq!(m.cofactor(4, 0), 0.0);
        assert_eq!(m.cofactor(0, 4), 0.0);
        assert_eq!(Matrix4::identity().cofactor(2, 2), 1.0);
    }

    #[test]
    fn test_inverse() {
        for m in sample_matrices() {
            assert!(m.determinant().abs() >= SINGULAR_EPSILON);
            let inv = m.inverse();
            assert_matrix_eq(&(m * inv), &Matrix4::identity(), 1e-4);
            assert_matrix_eq(&(inv * m), &Matrix4::identity(), 1e-4);

            let reference: Matrix4 = nalgebra::Matrix4::from(m)
                .try_inverse()
                .map(Matrix4::from)
                .unwrap();
            assert_matrix_eq(&inv, &reference, 1e-4);
        }
    }

    #[test]
    fn test_inverse_of_singular_is_identity() {
        let singular = Matrix4::from_columns(std::array::from_fn(|i| (i + 1) as f32));
        assert_eq!(singular.inverse(), Matrix4::identity());

        let tiny = Matrix4::from_columns([
            0.01, 0.0, 0.0, 0.0, //
            0.0, 0.01, 0.0, 0.0, //
            0.0, 0.0, 0.001, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ]);
        assert!(tiny.determinant().abs() < SINGULAR_EPSILON);
        assert_eq!(tiny.inverse(), Matrix4::identity());
    }

    #[test]
    fn test_product_associative() {
        let s = sample_matrices();
        let (a, b, c) = (s[1], s[2], s[3]);
        assert_matrix_eq(&((a * b) * c), &(a * (b * c)), 1e-3);
    }

    #[test]
    fn test_product_matches_nalgebra() {
        let s = sample_matrices();
        let ours = s[1] * s[2];
        let theirs = Matrix4::from(nalgebra::Matrix4::from(s[1]) * nalgebra::Matrix4::from(s[2]));
        assert_matrix_eq(&ours, &theirs, 1e-5);

        let v = Vector3::with_w(1.0, -2.0, 0.5, 1.0);
        let ours = s[1] * v;
        let theirs = Vector3::from(nalgebra::Matrix4::from(s[1]) * nalgebra::Vector4::from(v));
        assert_relative_eq!(ours.x, theirs.x, epsilon = 1e-5);
        assert_relative_eq!(ours.y, theirs.y, epsilon = 1e-5);
        assert_relative_eq!(ours.z, theirs.z, epsilon = 1e-5);
        assert_relative_eq!(ours.w, theirs.w, epsilon = 1e-5);
    }

    #[test]
    fn test_identity_fixed_point() {
        let id = *Matrix4::new().load_identity();
        for v in [
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::with_w(-4.5, 0.0, 9.0, 0.0),
        ] {
            let out = id * v;
            assert_eq!(out, v);
            assert_eq!(out.w, v.w);
        }
    }

    #[test]
    fn test_display() {
        let mut m = Matrix4::identity();
        m.translate(0.5, -2.0, 10.0);
        let expected = "| 1         0         0         0.5        |\n\
                        | 0         1         0         -2         |\n\
                        | 0         0         1         10         |\n\
                        | 0         0         0         1          |";
        assert_eq!(m.to_string(), expected);
    }
}
