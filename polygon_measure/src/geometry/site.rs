//! Sites and the edge and triangle aggregates built from them.

use super::{orient, Point};

/// A planar input point tagged with its position in the boundary ring.
///
/// Sites inserted during recovery or refinement carry the index they were
/// appended at.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Site {
    pub x: f64,
    pub y: f64,
    pub addr: usize,
}

impl Site {
    pub fn new(x: f64, y: f64, addr: usize) -> Self {
        Self { x, y, addr }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A finished segment of a Voronoi cell boundary.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VoronoiEdge {
    pub start: Point,
    pub end: Point,
}

/// One Delaunay edge, dual to a Voronoi edge.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TriangulationEdge {
    pub a: Site,
    pub b: Site,
}

impl TriangulationEdge {
    pub fn new(a: Site, b: Site) -> Self {
        Self { a, b }
    }

    /// Unordered address pair identifying this edge.
    pub fn key(&self) -> (usize, usize) {
        edge_key(self.a.addr, self.b.addr)
    }
}

/// Normalizes an address pair so `(a, b)` and `(b, a)` compare equal.
pub fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// An ordered triple of sites.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Triangle {
    pub sites: [Site; 3],
}

impl Triangle {
    pub fn new(a: Site, b: Site, c: Site) -> Self {
        Self { sites: [a, b, c] }
    }

    pub fn centroid(&self) -> Point {
        let [a, b, c] = self.sites;
        Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
    }

    /// Unsigned area in the plane of the sites.
    pub fn planar_area(&self) -> f64 {
        let [a, b, c] = self.sites;
        orient(a.point(), b.point(), c.point()).abs() * 0.5
    }

    /// The three edges as `(from, to, opposite)` triples.
    pub fn edges(&self) -> [(Site, Site, Site); 3] {
        let [a, b, c] = self.sites;
        [(a, b, c), (a, c, b), (b, c, a)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_keys_ignore_direction() {
        let a = Site::new(0.0, 0.0, 4);
        let b = Site::new(1.0, 0.0, 2);
        assert_eq!(TriangulationEdge::new(a, b).key(), (2, 4));
        assert_eq!(TriangulationEdge::new(b, a).key(), (2, 4));
    }

    #[test]
    fn triangle_centroid_and_area() {
        let t = Triangle::new(
            Site::new(0.0, 0.0, 0),
            Site::new(3.0, 0.0, 1),
            Site::new(0.0, 3.0, 2),
        );
        assert_eq!(t.centroid(), Point::new(1.0, 1.0));
        assert!((t.planar_area() - 4.5).abs() < 1e-12);
    }
}
