//! Surface area and cut/fill volume of a triangle mesh over a reference plane.

use crate::geometry::{triangle_area3, Point3, Triangle};
use crate::plane::Plane;
use crate::terrain::Sampler;

/// Number of steps used to locate where an edge crosses the reference plane.
pub const CROSSING_RESOLUTION: usize = 32;

/// Running totals of one integration.
///
/// `negative` holds the volume below the plane as a negative number.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Accumulator {
    pub area: f64,
    pub positive: f64,
    pub negative: f64,
}

impl Accumulator {
    pub fn add(&mut self, other: Accumulator) {
        self.area += other.area;
        self.positive += other.positive;
        self.negative += other.negative;
    }

    /// Replaces any NaN total with zero.
    pub fn sanitized(self) -> Self {
        let clean = |v: f64| if v.is_nan() { 0.0 } else { v };
        Self {
            area: clean(self.area),
            positive: clean(self.positive),
            negative: clean(self.negative),
        }
    }

    fn add_volume(&mut self, volume: f64) {
        if volume > 0.0 {
            self.positive += volume;
        } else {
            self.negative += volume;
        }
    }
}

/// Volume between a triangular patch and the reference plane.
///
/// `base` holds the corners projected onto the plane and `heights` their
/// signed heights above it. When the corners do not share a sign,
/// `walk(i, j, t)` must return the projected point and signed height at
/// fraction `t` along the edge from corner `i` to corner `j`; each such edge
/// is walked in [`CROSSING_RESOLUTION`] steps to find where the surface meets
/// the plane. With exactly one corner on its own side the patch is split
/// into a triangle around that corner and a quadrilateral, both with zero
/// height along the crossing line. Any other outcome uses the unsplit
/// average-height prism.
pub fn prism_volume<F>(base: [Point3; 3], heights: [f64; 3], mut walk: F) -> Accumulator
where
    F: FnMut(usize, usize, f64) -> (Point3, f64),
{
    let mut acc = Accumulator::default();
    let above = heights.map(|h| h > 0.0);
    let whole = |acc: &mut Accumulator| {
        let area = triangle_area3(base[0], base[1], base[2]);
        acc.add_volume(area * (heights[0] + heights[1] + heights[2]) / 3.0);
    };

    if heights.iter().all(|&h| h > 0.0) || heights.iter().all(|&h| h < 0.0) {
        whole(&mut acc);
        return acc;
    }

    let mut crossing = |i: usize, j: usize| -> Option<Point3> {
        if above[i] == above[j] {
            return None;
        }
        let (mut prev, mut prev_h) = (base[i], heights[i]);
        for step in 1..=CROSSING_RESOLUTION {
            let (p, h) = walk(i, j, step as f64 / CROSSING_RESOLUTION as f64);
            if (h > 0.0) != above[i] {
                return Some(prev - (p - prev) * (prev_h / (h - prev_h)));
            }
            prev = p;
            prev_h = h;
        }
        None
    };
    let c01 = crossing(0, 1);
    let c02 = crossing(0, 2);
    let c12 = crossing(1, 2);

    // isolated corner k, other corners i and j, crossings on k-i and k-j
    let split = match (c01, c02, c12) {
        (Some(a), Some(b), None) => Some((0, 1, 2, a, b)),
        (Some(a), None, Some(b)) => Some((1, 0, 2, a, b)),
        (None, Some(a), Some(b)) => Some((2, 0, 1, a, b)),
        _ => None,
    };
    match split {
        Some((k, i, j, ci, cj)) => {
            let small = triangle_area3(base[k], ci, cj);
            let quad = triangle_area3(ci, base[i], base[j]) + triangle_area3(ci, base[j], cj);
            let tip = small * heights[k] / 3.0;
            let rest = quad * (heights[i] + heights[j]) / 4.0;
            if above[k] {
                acc.positive += tip;
                acc.negative += rest;
            } else {
                acc.negative += tip;
                acc.positive += rest;
            }
        }
        None => whole(&mut acc),
    }
    acc
}

/// Integrates area and cut/fill volume over `triangles` in plane coordinates.
///
/// Corners are lifted onto the terrain for the area. Volume heights are
/// measured along the ray from the sphere centre between the reference plane
/// and the terrain surface.
pub fn integrate(triangles: &[Triangle], sampler: &Sampler, plane: &Plane) -> Accumulator {
    let radius = sampler.frame.radius;
    let sample = |dir: Point3| -> (Point3, f64, Point3) {
        let h = sampler.height_along(dir);
        let t = plane.distance_along_ray(dir);
        (dir * (radius + h), radius + h - t, dir * t)
    };

    let mut total = Accumulator::default();
    for tri in triangles {
        let dirs = tri.sites.map(|s| sampler.frame.direction(s.point()));
        let samples = dirs.map(sample);
        let surface = samples.map(|s| s.0);
        let heights = samples.map(|s| s.1);
        let base = samples.map(|s| s.2);

        let mut acc = prism_volume(base, heights, |i, j, t| {
            let dir = (dirs[i] * (1.0 - t) + dirs[j] * t).normalize();
            let (_, h, b) = sample(dir);
            (b, h)
        });
        acc.area = triangle_area3(surface[0], surface[1], surface[2]);
        total.add(acc);
    }
    total
}
