//! Cartesian 2-D vector type shared by the world model and the dynamics
//! integrator.
//!
//! Mirrors a generic 2D vector used throughout the reference model for both
//! world-frame and vehicle-frame quantities: positions, velocities,
//! accelerations, and forces are all plain `Vector2d` values, with the frame
//! tracked by the caller rather than the type.

use std::ops::{Add, Mul, Sub};

/// A 2-D vector in a Cartesian coordinate system.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2d {
    pub x: f64,
    pub y: f64,
}

impl Vector2d {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const ZERO: Vector2d = Vector2d { x: 0.0, y: 0.0 };

    /// Rotate this vector by `angle` radians (mathematically positive, i.e.
    /// counter-clockwise in a right-handed x-right/y-up frame).
    #[inline]
    pub fn rotate(&mut self, angle: f64) {
        let (sin, cos) = angle.sin_cos();
        let x = self.x * cos - self.y * sin;
        let y = self.x * sin + self.y * cos;
        self.x = x;
        self.y = y;
    }

    /// Return a rotated copy without mutating `self`.
    #[inline]
    pub fn rotated(self, angle: f64) -> Vector2d {
        let mut v = self;
        v.rotate(angle);
        v
    }

    #[inline]
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    #[inline]
    pub fn scale(&mut self, factor: f64) {
        self.x *= factor;
        self.y *= factor;
    }

    #[inline]
    pub fn dot(self, rhs: Vector2d) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Z-component of the 3D cross product of the two vectors extended with z=0.
    #[inline]
    pub fn cross(self, rhs: Vector2d) -> f64 {
        self.x * rhs.y - self.y * rhs.x
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Angle of the vector from the positive x-axis, in `(-pi, pi]`.
    #[inline]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Normalize in place. Returns `false` (leaving the vector untouched) if
    /// its length is zero.
    pub fn normalize(&mut self) -> bool {
        let len = self.length();
        if len == 0.0 {
            return false;
        }
        self.x /= len;
        self.y /= len;
        true
    }
}

impl Add for Vector2d {
    type Output = Vector2d;
    #[inline]
    fn add(self, rhs: Vector2d) -> Vector2d {
        Vector2d::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2d {
    type Output = Vector2d;
    #[inline]
    fn sub(self, rhs: Vector2d) -> Vector2d {
        Vector2d::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2d {
    type Output = Vector2d;
    #[inline]
    fn mul(self, rhs: f64) -> Vector2d {
        Vector2d::new(self.x * rhs, self.y * rhs)
    }
}

/// Normalize an angle into `(-pi, pi]`.
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::PI;
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// Clamp `value` into `[lo, hi]`. Named to match the reference model's
/// `Saturate` helper used throughout the dynamics and tire code.
#[inline]
pub fn saturate(value: f64, lo: f64, hi: f64) -> f64 {
    value.clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_quarter_turn() {
        let v = Vector2d::new(1.0, 0.0).rotated(std::f64::consts::FRAC_PI_2);
        assert!((v.x).abs() < 1e-9);
        assert!((v.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * std::f64::consts::PI) - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn normalize_zero_vector_fails() {
        let mut v = Vector2d::ZERO;
        assert!(!v.normalize());
    }
}
