//! Basic geometry primitives used by the triangulation and measurement code.

use std::ops::{Add, Mul, Neg, Sub};

pub mod site;

pub use site::{Site, Triangle, TriangulationEdge, VoronoiEdge};

/// Representation of a 2D point.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` when both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Representation of a 2D line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    /// Creates a new line segment.
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Returns the length of the line segment.
    pub fn length(&self) -> f64 {
        distance(self.start, self.end)
    }

    /// Returns the midpoint of the line segment.
    pub fn midpoint(&self) -> Point {
        self.point_at(0.5)
    }

    /// Returns the point at parameter `t`, where `0` is the start and `1` the end.
    pub fn point_at(&self, t: f64) -> Point {
        Point::new(
            self.start.x + (self.end.x - self.start.x) * t,
            self.start.y + (self.end.y - self.start.y) * t,
        )
    }
}

/// Calculates the Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Twice the signed area of the triangle `a`, `b`, `c`.
///
/// Positive for counter-clockwise order, negative for clockwise and zero for
/// collinear points.
pub fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Calculates the area of a simple polygon using the shoelace formula.
pub fn polygon_area(vertices: &[Point]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..vertices.len() {
        let j = (i + 1) % vertices.len();
        sum += vertices[i].x * vertices[j].y - vertices[j].x * vertices[i].y;
    }
    sum.abs() * 0.5
}

/// Returns `true` if point `p` is inside the polygon defined by `poly` using
/// the ray casting algorithm.
pub fn point_in_polygon(p: Point, poly: &[Point]) -> bool {
    point_in_polygon_tol(p, poly, 0.0)
}

/// Ray casting test that also counts a crossing when `p` lies within `tol`
/// (horizontally) of an edge.
///
/// Points sitting on the boundary then classify consistently instead of
/// flipping with rounding noise.
pub fn point_in_polygon_tol(p: Point, poly: &[Point], tol: f64) -> bool {
    let mut inside = false;
    if poly.is_empty() {
        return inside;
    }
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let pi = poly[i];
        let pj = poly[j];
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x_cross || (p.x - x_cross).abs() < tol {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Intersection of segments `a`-`b` and `c`-`d`.
///
/// Returns the parameter along `a`-`b` and the intersection point when both
/// segment parameters lie strictly inside `(margin, 1 - margin)`. Parallel
/// segments never intersect.
pub fn segment_intersection(a: Point, b: Point, c: Point, d: Point, margin: f64) -> Option<(f64, Point)> {
    let rx = b.x - a.x;
    let ry = b.y - a.y;
    let sx = d.x - c.x;
    let sy = d.y - c.y;
    let den = rx * sy - ry * sx;
    if den == 0.0 {
        return None;
    }
    let qx = c.x - a.x;
    let qy = c.y - a.y;
    let t = (qx * sy - qy * sx) / den;
    let u = (qx * ry - qy * rx) / den;
    let inside = |v: f64| v > margin && v < 1.0 - margin;
    if inside(t) && inside(u) {
        Some((t, Point::new(a.x + t * rx, a.y + t * ry)))
    } else {
        None
    }
}

/// Representation of a 3D point or vector.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn dot(self, other: Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Point3) -> Point3 {
        Point3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction. A zero vector yields non-finite
    /// components, which callers check with [`Point3::is_finite`].
    pub fn normalize(self) -> Point3 {
        self * (1.0 / self.length())
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Point3 {
    type Output = Point3;

    fn add(self, rhs: Point3) -> Point3 {
        Point3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Point3;

    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3 {
    type Output = Point3;

    fn mul(self, rhs: f64) -> Point3 {
        Point3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Point3 {
    type Output = Point3;

    fn neg(self) -> Point3 {
        Point3::new(-self.x, -self.y, -self.z)
    }
}

/// Calculates the Euclidean distance between two 3D points.
pub fn distance3(a: Point3, b: Point3) -> f64 {
    (b - a).length()
}

/// Area of the 3D triangle `a`, `b`, `c`.
pub fn triangle_area3(a: Point3, b: Point3, c: Point3) -> f64 {
    (b - a).cross(c - a).length() * 0.5
}
