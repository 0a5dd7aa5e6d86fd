//! Terrain height sources queried by refinement and integration.

use crate::geometry::{Point, Point3};
use crate::local_grid::{to_lng_lat, LngLat, TangentFrame};
use crate::voronoi::Diagram;

/// Height above the reference sphere at a surface position.
pub trait HeightField {
    fn height(&self, at: LngLat) -> f64;
}

/// Terrain without relief.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatTerrain;

impl HeightField for FlatTerrain {
    fn height(&self, _at: LngLat) -> f64 {
        0.0
    }
}

/// Terrain lifted to the same height everywhere.
#[derive(Debug, Clone, Copy)]
pub struct ConstantTerrain(pub f64);

impl HeightField for ConstantTerrain {
    fn height(&self, _at: LngLat) -> f64 {
        self.0
    }
}

impl<F> HeightField for F
where
    F: Fn(LngLat) -> f64,
{
    fn height(&self, at: LngLat) -> f64 {
        self(at)
    }
}

/// Terrain seen through a tangent frame: plane coordinates in, heights and
/// surface points out.
#[derive(Clone, Copy)]
pub struct Sampler<'a> {
    pub frame: &'a TangentFrame,
    pub terrain: &'a dyn HeightField,
}

impl<'a> Sampler<'a> {
    pub fn new(frame: &'a TangentFrame, terrain: &'a dyn HeightField) -> Self {
        Self { frame, terrain }
    }

    /// Terrain height below the plane point `q`.
    pub fn height_at(&self, q: Point) -> f64 {
        self.terrain.height(self.frame.lng_lat(q))
    }

    /// Terrain height in the unit direction `dir` from the sphere centre.
    pub fn height_along(&self, dir: Point3) -> f64 {
        self.terrain.height(to_lng_lat(dir))
    }

    /// Point on the terrain surface below the plane point `q`.
    pub fn surface_point(&self, q: Point) -> Point3 {
        let dir = self.frame.direction(q);
        dir * (self.frame.radius + self.height_along(dir))
    }
}

fn barycentric(p: Point, a: Point3, b: Point3, c: Point3) -> Option<(f64, f64, f64)> {
    let det = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
    if det.abs() < f64::EPSILON {
        return None;
    }
    let u = ((b.y - c.y) * (p.x - c.x) + (c.x - b.x) * (p.y - c.y)) / det;
    let v = ((c.y - a.y) * (p.x - c.x) + (a.x - c.x) * (p.y - c.y)) / det;
    let w = 1.0 - u - v;
    Some((u, v, w))
}

/// Triangulated irregular network of height samples.
///
/// Vertices store longitude and latitude in radians as `x` and `y` and the
/// height as `z`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TinTerrain {
    /// Vertices of the TIN.
    pub vertices: Vec<Point3>,
    /// Indices into `vertices` forming triangles.
    pub triangles: Vec<[usize; 3]>,
}

impl TinTerrain {
    /// Triangulates the samples on the longitude/latitude plane.
    pub fn from_samples(samples: Vec<Point3>) -> Self {
        let planar: Vec<Point> = samples.iter().map(|p| Point::new(p.x, p.y)).collect();
        let diagram = Diagram::from_points(&planar);
        let triangles = diagram
            .triangles
            .iter()
            .map(|t| [t.sites[0].addr, t.sites[1].addr, t.sites[2].addr])
            .collect();
        Self {
            vertices: samples,
            triangles,
        }
    }

    /// Interpolated height at (lng, lat) if the position lies within the TIN.
    pub fn elevation_at(&self, lng: f64, lat: f64) -> Option<f64> {
        let p = Point::new(lng, lat);
        for tri in &self.triangles {
            let a = self.vertices[tri[0]];
            let b = self.vertices[tri[1]];
            let c = self.vertices[tri[2]];
            if let Some((u, v, w)) = barycentric(p, a, b, c) {
                if u >= -1e-12 && v >= -1e-12 && w >= -1e-12 {
                    return Some(u * a.z + v * b.z + w * c.z);
                }
            }
        }
        None
    }

    fn nearest_height(&self, lng: f64, lat: f64) -> Option<f64> {
        self.vertices
            .iter()
            .map(|v| ((v.x - lng).powi(2) + (v.y - lat).powi(2), v.z))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, z)| z)
    }
}

impl HeightField for TinTerrain {
    /// Falls back to the nearest sample outside the triangulated area.
    fn height(&self, at: LngLat) -> f64 {
        self.elevation_at(at.lng, at.lat)
            .or_else(|| self.nearest_height(at.lng, at.lat))
            .unwrap_or(0.0)
    }
}
