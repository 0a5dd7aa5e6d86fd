//! Area and cut/fill volume of a polygon on a sphere.

use geo_types::Rect;
use log::{info, warn};

use crate::config::MeasureConfig;
use crate::geometry::{Point, Point3, Triangle};
use crate::local_grid::{to_cartesian, LngLat, TangentFrame};
use crate::mesh::{recover_edges, refine};
use crate::plane::{fit_plane, Plane};
use crate::terrain::{HeightField, Sampler};

/// Why a ring could not be measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DegenerateReason {
    /// Fewer than three distinct vertices.
    TooFewPoints,
    /// The vertices spread further than one radius from their average.
    SpansHemisphere,
    /// Projection produced NaN or infinite coordinates.
    NonFinite,
}

/// Quality of a [`Measurement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MeasureStatus {
    Complete,
    /// Boundary recovery gave up; the mesh may cross the boundary.
    Approximate { missing_edges: usize },
    /// Nothing was measured and all totals are zero.
    Degenerate(DegenerateReason),
}

/// Result of [`measure`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Measurement {
    /// Terrain surface area inside the ring.
    pub area: f64,
    /// Volume of terrain above the reference plane.
    pub positive_volume: f64,
    /// Volume of terrain below the reference plane, as a negative number.
    pub negative_volume: f64,
    /// Longitude/latitude extent of the ring in radians.
    pub bounding_box: Option<Rect<f64>>,
    /// Final triangles in the frame's plane coordinates.
    pub triangles: Vec<Triangle>,
    /// Final mesh edges lifted onto the terrain.
    pub surface_edges: Vec<(Point3, Point3)>,
    /// Reference plane of the volumes.
    pub plane: Option<Plane>,
    /// Frame mapping plane coordinates back onto the sphere.
    pub frame: Option<TangentFrame>,
    pub point_count: usize,
    /// Refinement passes run.
    pub attempts: usize,
    pub status: MeasureStatus,
}

impl Measurement {
    fn degenerate(reason: DegenerateReason, bounding_box: Option<Rect<f64>>) -> Self {
        warn!("cannot measure ring: {:?}", reason);
        Self {
            area: 0.0,
            positive_volume: 0.0,
            negative_volume: 0.0,
            bounding_box,
            triangles: Vec::new(),
            surface_edges: Vec::new(),
            plane: None,
            frame: None,
            point_count: 0,
            attempts: 0,
            status: MeasureStatus::Degenerate(reason),
        }
    }

    /// Dip and strike of the reference plane in degrees, see
    /// [`Plane::dip_and_strike`].
    pub fn dip_and_strike(&self) -> Option<(f64, f64)> {
        Some(self.plane?.dip_and_strike(self.frame.as_ref()?))
    }
}

/// Longitude/latitude extent of `ring`.
pub fn bounding_box(ring: &[LngLat]) -> Option<Rect<f64>> {
    let first = ring.first()?;
    let (mut min, mut max) = (*first, *first);
    for at in ring {
        min.lng = min.lng.min(at.lng);
        min.lat = min.lat.min(at.lat);
        max.lng = max.lng.max(at.lng);
        max.lat = max.lat.max(at.lat);
    }
    Some(Rect::new((min.lng, min.lat), (max.lng, max.lat)))
}

/// Drops consecutive repeats, including a closing vertex equal to the first.
fn distinct_ring(ring: &[LngLat]) -> Vec<LngLat> {
    let mut out: Vec<LngLat> = Vec::with_capacity(ring.len());
    for at in ring {
        if out.last() != Some(at) {
            out.push(*at);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Measures the terrain inside `ring` on a sphere of `radius`.
///
/// The ring is projected onto a plane tangent to the sphere below its
/// centre, triangulated with its boundary edges recovered, and refined
/// where the terrain needs it. Area is taken on the terrain surface and
/// volumes against the least-squares plane through the ring's surface
/// points. Degenerate rings yield zero totals and a
/// [`MeasureStatus::Degenerate`] status instead of an error.
pub fn measure(
    ring: &[LngLat],
    radius: f64,
    terrain: &dyn HeightField,
    config: &MeasureConfig,
) -> Measurement {
    let bbox = bounding_box(ring);
    let ring = distinct_ring(ring);
    if ring.len() < 3 {
        return Measurement::degenerate(DegenerateReason::TooFewPoints, bbox);
    }
    if !radius.is_finite() || radius <= 0.0 {
        return Measurement::degenerate(DegenerateReason::NonFinite, bbox);
    }

    let surface: Vec<Point3> = ring
        .iter()
        .map(|at| to_cartesian(*at, radius, terrain.height(*at)))
        .collect();
    let frame = match TangentFrame::for_ring(&surface, radius) {
        Ok(frame) => frame,
        Err(reason) => return Measurement::degenerate(reason, bbox),
    };
    let local: Vec<Point> = surface.iter().map(|p| frame.to_local(*p)).collect();
    if !local.iter().all(Point::is_finite) {
        return Measurement::degenerate(DegenerateReason::NonFinite, bbox);
    }

    let plane = fit_plane(&surface).unwrap_or_else(|| {
        warn!("no unique best-fit plane; measuring against the tangent plane");
        let mut centroid = Point3::zero();
        for p in &surface {
            centroid = centroid + *p * (1.0 / surface.len() as f64);
        }
        Plane::new(frame.normal, centroid)
    });

    let recovery = recover_edges(&local, config);
    let boundary: Vec<Point> = recovery.ring.iter().map(|s| s.point()).collect();
    let sampler = Sampler::new(&frame, terrain);
    let refinement = refine(&recovery.diagram.triangles, &boundary, &sampler, &plane, config);
    let totals = refinement.totals.sanitized();

    let status = if recovery.is_conforming() {
        MeasureStatus::Complete
    } else {
        MeasureStatus::Approximate {
            missing_edges: recovery.missing.len(),
        }
    };
    info!(
        "area {:.3}, volume +{:.3} / {:.3}, {} points after {} pass(es)",
        totals.area,
        totals.positive,
        totals.negative,
        refinement.point_count(),
        refinement.attempts
    );

    Measurement {
        area: totals.area,
        positive_volume: totals.positive,
        negative_volume: totals.negative,
        bounding_box: bbox,
        point_count: refinement.point_count(),
        attempts: refinement.attempts,
        triangles: refinement.triangles,
        surface_edges: refinement.surface_edges,
        plane: Some(plane),
        frame: Some(frame),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::FlatTerrain;

    #[test]
    fn repeated_vertices_are_dropped() {
        let a = LngLat::new(0.0, 0.0);
        let b = LngLat::new(0.1, 0.0);
        let c = LngLat::new(0.1, 0.1);
        assert_eq!(distinct_ring(&[a, a, b, c, c, a]), vec![a, b, c]);
        assert_eq!(distinct_ring(&[a, a]), vec![a]);
    }

    #[test]
    fn bounding_box_spans_the_ring() {
        let ring = [
            LngLat::new(0.2, -0.1),
            LngLat::new(-0.3, 0.4),
            LngLat::new(0.1, 0.0),
        ];
        let bbox = bounding_box(&ring).unwrap();
        assert_eq!(bbox.min().x, -0.3);
        assert_eq!(bbox.min().y, -0.1);
        assert_eq!(bbox.max().x, 0.2);
        assert_eq!(bbox.max().y, 0.4);
        assert!(bounding_box(&[]).is_none());
    }

    #[test]
    fn two_points_are_degenerate() {
        let ring = [LngLat::new(0.0, 0.0), LngLat::new(0.01, 0.0)];
        let m = measure(&ring, 1000.0, &FlatTerrain, &MeasureConfig::default());
        assert_eq!(m.status, MeasureStatus::Degenerate(DegenerateReason::TooFewPoints));
        assert_eq!(m.area, 0.0);
        assert!(m.bounding_box.is_some());
    }

    #[test]
    fn non_finite_vertices_are_degenerate() {
        let ring = [
            LngLat::new(0.0, 0.0),
            LngLat::new(f64::NAN, 0.0),
            LngLat::new(0.01, 0.01),
        ];
        let m = measure(&ring, 1000.0, &FlatTerrain, &MeasureConfig::default());
        assert_eq!(m.status, MeasureStatus::Degenerate(DegenerateReason::NonFinite));
        assert_eq!(m.positive_volume, 0.0);
        assert_eq!(m.negative_volume, 0.0);
    }
}
