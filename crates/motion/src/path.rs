//! Geometric paths sampled by the interpolator.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A point in pointer space, in counts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn from_counts(x: i32, y: i32) -> Self {
        Self {
            x: f64::from(x),
            y: f64::from(y),
        }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, k: f64) -> Point {
        Point::new(self.x * k, self.y * k)
    }
}

/// Path from the origin to `target`.
///
/// The start point P0 is implicit and always the origin, since every
/// coordinate is relative to where the pointer was when the move began.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionPath {
    /// Straight line: B(t) = t * target.
    Linear { target: Point },

    /// Cubic Bezier with control points C1, C2 and end point P3 = target.
    CubicBezier {
        control1: Point,
        control2: Point,
        target: Point,
    },
}

impl MotionPath {
    pub fn linear(target: Point) -> Self {
        MotionPath::Linear { target }
    }

    pub fn cubic_bezier(control1: Point, control2: Point, target: Point) -> Self {
        MotionPath::CubicBezier {
            control1,
            control2,
            target,
        }
    }

    pub fn target(&self) -> Point {
        match self {
            MotionPath::Linear { target } | MotionPath::CubicBezier { target, .. } => *target,
        }
    }

    /// Evaluate the path at parameter `t`, clamped to `[0, 1]`.
    ///
    /// Bezier uses B(t) = (1-t)³P₀ + 3(1-t)²tC₁ + 3(1-t)t²C₂ + t³P₃ with P₀ at
    /// the origin, so the first term drops out.
    #[inline]
    pub fn evaluate(&self, t: f64) -> Point {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match *self {
            MotionPath::Linear { target } => target * t,
            MotionPath::CubicBezier {
                control1,
                control2,
                target,
            } => {
                let t2 = t * t;
                let t3 = t2 * t;
                let mt = 1.0 - t;
                let mt2 = mt * mt;

                control1 * (3.0 * mt2 * t) + control2 * (3.0 * mt * t2) + target * t3
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bezier_endpoints() {
        let path = MotionPath::cubic_bezier(
            Point::new(30.0, 50.0),
            Point::new(70.0, -50.0),
            Point::new(100.0, 0.0),
        );
        assert_eq!(path.evaluate(0.0), Point::ORIGIN);
        let end = path.evaluate(1.0);
        assert_relative_eq!(end.x, 100.0);
        assert_relative_eq!(end.y, 0.0);
    }

    #[test]
    fn test_bezier_known_sample() {
        let path = MotionPath::cubic_bezier(
            Point::new(30.0, 50.0),
            Point::new(70.0, -50.0),
            Point::new(100.0, 0.0),
        );
        let p = path.evaluate(0.2);
        // 3*0.64*0.2*30 + 3*0.8*0.04*70 + 0.008*100
        assert_relative_eq!(p.x, 19.04, epsilon = 1e-9);
        // 3*0.64*0.2*50 - 3*0.8*0.04*50
        assert_relative_eq!(p.y, 14.4, epsilon = 1e-9);
    }

    #[test]
    fn test_linear_midpoint() {
        let path = MotionPath::linear(Point::new(-80.0, 20.0));
        let mid = path.evaluate(0.5);
        assert_relative_eq!(mid.x, -40.0);
        assert_relative_eq!(mid.y, 10.0);
    }

    #[test]
    fn test_evaluate_clamps_parameter() {
        let path = MotionPath::linear(Point::new(10.0, 10.0));
        assert_eq!(path.evaluate(-1.0), Point::ORIGIN);
        assert_eq!(path.evaluate(f64::NAN), Point::ORIGIN);
        let past = path.evaluate(3.0);
        assert_relative_eq!(past.x, 10.0);
        assert_relative_eq!(past.y, 10.0);
    }

    #[test]
    fn test_path_serde_tagged() -> Result<(), serde_json::Error> {
        let path = MotionPath::linear(Point::new(1.0, 2.0));
        let json = serde_json::to_string(&path)?;
        assert_eq!(json, r#"{"kind":"linear","target":{"x":1.0,"y":2.0}}"#);
        let back: MotionPath = serde_json::from_str(&json)?;
        assert_eq!(back, path);
        Ok(())
    }
}
