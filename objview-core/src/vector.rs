/// Homogeneous 3D vector used for positions, normals and texture coordinates
use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::fmt::general;

/// A point or direction in homogeneous coordinates.
///
/// Arithmetic only touches `x`, `y` and `z`; every operator that produces a
/// new vector yields `w = 1`. Equality ignores `w` and compares exactly.
/// The layout is four packed `f32`s so slices can be handed straight to a
/// vertex buffer.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    pub fn with_w(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Euclidean norm of `(x, y, z)`
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Divide by the length. A zero vector yields NaN components.
    pub fn normalize(&self) -> Vector3 {
        let k = self.length();
        Vector3::new(self.x / k, self.y / k, self.z / k)
    }

    pub fn distance(&self, v: &Vector3) -> f32 {
        (*self - *v).length()
    }

    /// Angle between two vectors in radians; NaN if either is zero-length.
    pub fn angle(&self, v: &Vector3) -> f32 {
        (self.dot(v) / (self.length() * v.length())).acos()
    }

    pub fn dot(&self, v: &Vector3) -> f32 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    pub fn cross_product(&self, v: &Vector3) -> Vector3 {
        Vector3::new(
            self.y * v.z - self.z * v.y,
            self.z * v.x - self.x * v.z,
            self.x * v.y - self.y * v.x,
        )
    }
}

impl Default for Vector3 {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl PartialEq for Vector3 {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, v: Vector3) -> Vector3 {
        Vector3::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, v: Vector3) -> Vector3 {
        Vector3::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

/// Dot product
impl Mul for Vector3 {
    type Output = f32;

    fn mul(self, v: Vector3) -> f32 {
        self.dot(&v)
    }
}

impl Mul<f32> for Vector3 {
    type Output = Vector3;

    fn mul(self, k: f32) -> Vector3 {
        Vector3::new(self.x * k, self.y * k, self.z * k)
    }
}

impl Div<f32> for Vector3 {
    type Output = Vector3;

    fn div(self, k: f32) -> Vector3 {
        Vector3::new(self.x / k, self.y / k, self.z / k)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, v: Vector3) {
        self.x += v.x;
        self.y += v.y;
        self.z += v.z;
    }
}

impl SubAssign for Vector3 {
    fn sub_assign(&mut self, v: Vector3) {
        self.x -= v.x;
        self.y -= v.y;
        self.z -= v.z;
    }
}

impl MulAssign<f32> for Vector3 {
    fn mul_assign(&mut self, k: f32) {
        self.x *= k;
        self.y *= k;
        self.z *= k;
    }
}

impl DivAssign<f32> for Vector3 {
    fn div_assign(&mut self, k: f32) {
        self.x /= k;
        self.y /= k;
        self.z /= k;
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:<10}, {:<10}, {:<10}, {:<10}]",
            general(self.x),
            general(self.y),
            general(self.z),
            general(self.w)
        )
    }
}

impl From<Vector3> for nalgebra::Vector4<f32> {
    fn from(v: Vector3) -> Self {
        nalgebra::Vector4::new(v.x, v.y, v.z, v.w)
    }
}

impl From<nalgebra::Vector4<f32>> for Vector3 {
    fn from(v: nalgebra::Vector4<f32>) -> Self {
        Vector3::with_w(v.x, v.y, v.z, v.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constructors() {
        let zero = Vector3::default();
        assert_eq!((zero.x, zero.y, zero.z, zero.w), (0.0, 0.0, 0.0, 1.0));

        let v = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(v.w, 1.0);

        let h = Vector3::with_w(1.0, 2.0, 3.0, 0.0);
        assert_eq!(h.w, 0.0);
    }

    #[test]
    fn test_equality_ignores_w() {
        let a = Vector3::with_w(1.0, 2.0, 3.0, 0.0);
        let b = Vector3::with_w(1.0, 2.0, 3.0, 7.0);
        assert_eq!(a, b);
        assert_ne!(a, Vector3::new(1.0, 2.0, 3.0001));
    }

    #[test]
    fn test_operators_reset_w() {
        let a = Vector3::with_w(1.0, 2.0, 3.0, 0.0);
        let b = Vector3::with_w(4.0, 5.0, 6.0, 0.0);

        let sum = a + b;
        assert_eq!(sum, Vector3::new(5.0, 7.0, 9.0));
        assert_eq!(sum.w, 1.0);
        assert_eq!((a - b).w, 1.0);
        assert_eq!((-a).w, 1.0);
        assert_eq!((a * 2.0).w, 1.0);
        assert_eq!((a / 2.0).w, 1.0);
        assert_eq!(a * b, 32.0);
    }

    #[test]
    fn test_compound_operators_keep_w() {
        let mut v = Vector3::with_w(2.0, 4.0, 6.0, 0.0);
        v += Vector3::new(1.0, 1.0, 1.0);
        assert_eq!(v, Vector3::new(3.0, 5.0, 7.0));
        v -= Vector3::new(1.0, 1.0, 1.0);
        v *= 3.0;
        assert_eq!(v, Vector3::new(6.0, 12.0, 18.0));
        v /= 6.0;
        assert_eq!(v, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(v.w, 0.0);
    }

    #[test]
    fn test_length_and_distance() {
        let v = Vector3::with_w(3.0, 4.0, 0.0, 100.0);
        assert_eq!(v.length(), 5.0);
        assert_eq!(Vector3::new(1.0, 1.0, 1.0).distance(&Vector3::new(1.0, 1.0, 3.0)), 2.0);
    }

    #[test]
    fn test_normalize() {
        let samples = [
            Vector3::new(3.0, 4.0, 0.0),
            Vector3::new(-1.0, 2.5, 7.0),
            Vector3::new(0.001, 0.0, -0.002),
        ];
        for v in samples {
            assert_relative_eq!(v.normalize().length(), 1.0, epsilon = 1e-6);
        }

        let zero = Vector3::default().normalize();
        assert!(zero.x.is_nan() && zero.y.is_nan() && zero.z.is_nan());
    }

    #[test]
    fn test_angle() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 2.0, 0.0);
        assert_relative_eq!(x.angle(&y), std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
        assert_relative_eq!(x.angle(&x), 0.0, epsilon = 1e-3);
        assert!(x.angle(&Vector3::default()).is_nan());
    }

    #[test]
    fn test_cross_product_anticommutative() {
        let pairs = [
            (Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0)),
            (Vector3::new(1.5, -2.0, 3.25), Vector3::new(-4.0, 0.5, 2.0)),
            (Vector3::new(0.1, 0.2, 0.3), Vector3::new(0.3, 0.2, 0.1)),
        ];
        for (a, b) in pairs {
            let ab = a.cross_product(&b);
            let ba = -b.cross_product(&a);
            assert_relative_eq!(ab.x, ba.x, epsilon = 1e-6);
            assert_relative_eq!(ab.y, ba.y, epsilon = 1e-6);
            assert_relative_eq!(ab.z, ba.z, epsilon = 1e-6);
        }

        let z = Vector3::new(1.0, 0.0, 0.0).cross_product(&Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(z, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_display() {
        let v = Vector3::new(1.5, -2.0, 0.0);
        assert_eq!(
            v.to_string(),
            "[1.5       , -2        , 0         , 1         ]"
        );
    }
}
