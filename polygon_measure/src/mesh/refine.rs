//! Adaptive refinement of the triangles inside a polygon.
//!
//! Each coarse triangle owns a point set that starts with its three corners.
//! Every pass retriangulates the sets, splits edges facing sleek angles and
//! adds terrain samples where the surface bends away from an edge. The pass
//! also integrates the current meshes, so the result of the last pass is
//! always a complete measurement.

use std::collections::HashSet;

use log::debug;

use crate::config::MeasureConfig;
use crate::geometry::site::edge_key;
use crate::geometry::{distance, point_in_polygon_tol, Line, Point, Point3, Site, Triangle};
use crate::plane::Plane;
use crate::terrain::Sampler;
use crate::voronoi::Diagram;
use crate::volume::{integrate, Accumulator};

/// Splits triangle edges that are too long for the triangle's other two
/// edges by adding their midpoints to `points`.
///
/// An edge `e` with neighbours `o1` and `o2` fails when either neighbour
/// scaled by `1 / sin(min_angle)` is shorter than `e`, or when
/// `o1 + o2 < e / cos(min_angle)`. Each edge is split at most once per
/// call. Returns `true` when the added points outnumber the existing ones by
/// more than 1.5, which marks the set as churning; callers then skip terrain
/// sampling for it in this pass.
pub fn check_sleekness(points: &mut Vec<Site>, min_angle: f64) -> bool {
    let diagram = Diagram::generate(points);
    let theta = min_angle.to_radians();
    let (by_ratio, by_sum) = (1.0 / theta.sin(), 1.0 / theta.cos());
    let mut split = HashSet::new();
    let mut added = 0usize;
    for tri in &diagram.triangles {
        for (a, b, opposite) in tri.edges() {
            let e = distance(a.point(), b.point());
            let o1 = distance(a.point(), opposite.point());
            let o2 = distance(b.point(), opposite.point());
            let too_long = o1 * by_ratio < e || o2 * by_ratio < e || o1 + o2 < e * by_sum;
            if too_long && split.insert(edge_key(a.addr, b.addr)) {
                let mid = Line::new(a.point(), b.point()).midpoint();
                points.push(Site::new(mid.x, mid.y, points.len()));
                added += 1;
            }
        }
    }
    let existing = points.len() - added;
    added as f64 > 1.5 * existing as f64
}

fn deviates(sampled: f64, expected: f64, threshold: f64) -> bool {
    sampled / expected > threshold || expected / sampled > threshold
}

/// Adds terrain samples along the edge from `a` to `b` where the terrain
/// departs from the linear profile between the end heights `h1` and `h2`.
///
/// The midpoint is tested first. If it passes, the edge is probed at 3, 4
/// and 5 equal subdivisions in turn, stopping at the first subdivision that
/// adds any point. A sample is added when the ratio of sampled to expected
/// height, either way round, exceeds `threshold`. Returns `true` if any
/// point was added.
pub fn check_terrain<H>(
    a: Point,
    b: Point,
    h1: f64,
    h2: f64,
    height: H,
    threshold: f64,
    points: &mut Vec<Site>,
) -> bool
where
    H: Fn(Point) -> f64,
{
    let edge = Line::new(a, b);
    let mid = edge.midpoint();
    if deviates(height(mid), (h1 + h2) / 2.0, threshold) {
        points.push(Site::new(mid.x, mid.y, points.len()));
        return true;
    }
    for parts in 3..=5 {
        let mut added = false;
        for k in 1..parts {
            let t = k as f64 / parts as f64;
            let p = edge.point_at(t);
            if deviates(height(p), h1 + (h2 - h1) * t, threshold) {
                points.push(Site::new(p.x, p.y, points.len()));
                added = true;
            }
        }
        if added {
            return true;
        }
    }
    false
}

/// Result of the refinement loop.
#[derive(Debug, Clone, Default)]
pub struct Refinement {
    /// Triangles of the last pass in plane coordinates.
    pub triangles: Vec<Triangle>,
    /// Terrain-lifted edges of the last pass.
    pub surface_edges: Vec<(Point3, Point3)>,
    /// Area and volume totals of the last pass.
    pub totals: Accumulator,
    /// Number of passes run.
    pub attempts: usize,
    /// Point count at the end of every pass.
    pub history: Vec<usize>,
    /// `true` when the last pass added no terrain samples.
    pub settled: bool,
}

impl Refinement {
    /// Total number of points in the final meshes.
    pub fn point_count(&self) -> usize {
        self.history.last().copied().unwrap_or(0)
    }
}

/// Refines the triangles of `coarse` whose centroid lies inside `boundary`
/// and integrates them against `plane`.
///
/// Passes continue until one adds no terrain sample, `config.max_attempts`
/// passes ran or the meshes hold `config.max_points` points. At least one
/// pass always runs.
pub fn refine(
    coarse: &[Triangle],
    boundary: &[Point],
    sampler: &Sampler,
    plane: &Plane,
    config: &MeasureConfig,
) -> Refinement {
    let mut sets: Vec<Vec<Site>> = coarse
        .iter()
        .filter(|t| point_in_polygon_tol(t.centroid(), boundary, 0.001))
        .map(|t| {
            t.sites
                .iter()
                .enumerate()
                .map(|(i, s)| Site::new(s.x, s.y, i))
                .collect()
        })
        .collect();
    debug!("{} of {} coarse triangles inside the boundary", sets.len(), coarse.len());

    let mut out = Refinement::default();
    let mut point_count = sets.iter().map(Vec::len).sum::<usize>();
    while out.attempts == 0
        || (!out.settled && out.attempts < config.max_attempts && point_count < config.max_points)
    {
        out.attempts += 1;
        out.settled = true;
        out.triangles.clear();
        out.surface_edges.clear();
        out.totals = Accumulator::default();
        point_count = 0;

        for set in sets.iter_mut() {
            let churning = check_sleekness(set, config.min_angle);
            let diagram = Diagram::generate(set);
            for edge in &diagram.edges {
                let (a, b) = (edge.a.point(), edge.b.point());
                let (h1, h2) = (sampler.height_at(a), sampler.height_at(b));
                out.surface_edges
                    .push((sampler.surface_point(a), sampler.surface_point(b)));
                if churning
                    || point_count >= config.max_points
                    || out.attempts >= config.max_attempts
                    || distance(a, b) == 0.0
                {
                    continue;
                }
                if check_terrain(a, b, h1, h2, |p| sampler.height_at(p), config.height_diff, set) {
                    out.settled = false;
                }
            }
            out.totals.add(integrate(&diagram.triangles, sampler, plane));
            out.triangles.extend_from_slice(&diagram.triangles);
            point_count += set.len();
        }
        out.history.push(point_count);
        debug!(
            "refinement pass {}: {} points, {} triangles",
            out.attempts,
            point_count,
            out.triangles.len()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites(coords: &[(f64, f64)]) -> Vec<Site> {
        coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Site::new(x, y, i))
            .collect()
    }

    #[test]
    fn equilateral_triangle_is_not_sleek() {
        let mut pts = sites(&[(0.0, 0.0), (1.0, 0.0), (0.5, 0.866)]);
        assert!(!check_sleekness(&mut pts, 15.0));
        assert_eq!(pts.len(), 3);
    }

    #[test]
    fn needle_triangle_gets_its_long_edges_split() {
        let mut pts = sites(&[(0.0, 0.0), (10.0, 0.0), (10.0, 1.0)]);
        let churning = check_sleekness(&mut pts, 15.0);
        assert!(!churning);
        assert_eq!(pts.len(), 5);
        let added: Vec<(f64, f64)> = pts[3..].iter().map(|s| (s.x, s.y)).collect();
        assert!(added.contains(&(5.0, 0.0)));
        assert!(added.contains(&(5.0, 0.5)));
        assert_eq!(pts[3].addr, 3);
        assert_eq!(pts[4].addr, 4);
    }

    #[test]
    fn flat_cap_gets_its_base_split() {
        // the apex angle is close to 180 degrees but both short edges are
        // of similar length
        let mut pts = sites(&[(0.0, 0.0), (10.0, 0.0), (5.0, 0.5)]);
        check_sleekness(&mut pts, 15.0);
        let added: Vec<(f64, f64)> = pts[3..].iter().map(|s| (s.x, s.y)).collect();
        assert!(added.contains(&(5.0, 0.0)));
    }

    #[test]
    fn splitting_every_edge_reports_churn() {
        // close to 90 degrees every edge of the grid fails the sum test
        let grid: Vec<(f64, f64)> = (0..3)
            .flat_map(|x| (0..3).map(move |y| (x as f64, y as f64)))
            .collect();
        let mut pts = sites(&grid);
        assert!(check_sleekness(&mut pts, 89.0));
        assert_eq!(pts.len(), 9 + 16);

        let mut few = sites(&[(0.0, 0.0), (1.0, 0.0)]);
        assert!(!check_sleekness(&mut few, 15.0));
        assert_eq!(few.len(), 2);
    }

    #[test]
    fn flat_profile_adds_nothing() {
        let mut pts = Vec::new();
        let added = check_terrain(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            10.0,
            20.0,
            |p| 10.0 + 10.0 * p.x,
            1.002,
            &mut pts,
        );
        assert!(!added);
        assert!(pts.is_empty());
    }

    #[test]
    fn bump_at_midpoint_adds_the_midpoint() {
        let mut pts = Vec::new();
        let added = check_terrain(
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            10.0,
            10.0,
            |p| if (p.x - 1.0).abs() < 1e-9 { 11.0 } else { 10.0 },
            1.002,
            &mut pts,
        );
        assert!(added);
        assert_eq!(pts, vec![Site::new(1.0, 0.0, 0)]);
    }

    #[test]
    fn probing_stops_at_first_subdivision_with_hits() {
        // bumps near one third are missed by the midpoint but caught by the
        // three-way split; the four- and five-way splits are not reached
        let mut pts = sites(&[(0.0, 0.0), (3.0, 0.0)]);
        let added = check_terrain(
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            10.0,
            10.0,
            |p| if p.x > 0.5 && p.x < 1.4 { 12.0 } else { 10.0 },
            1.002,
            &mut pts,
        );
        assert!(added);
        assert_eq!(pts.len(), 3);
        assert_eq!(pts[2], Site::new(1.0, 0.0, 2));
    }
}
