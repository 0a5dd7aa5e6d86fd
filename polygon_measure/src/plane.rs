//! Least-squares reference plane for cut/fill volumes.

use nalgebra::{Matrix3, Vector3, SVD};

use crate::geometry::Point3;
use crate::local_grid::TangentFrame;

/// Plane given by an outward unit normal and a point on it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Plane {
    pub normal: Point3,
    pub point: Point3,
    /// `normal · point`
    pub offset: f64,
}

impl Plane {
    pub fn new(normal: Point3, point: Point3) -> Self {
        Self {
            normal,
            point,
            offset: normal.dot(point),
        }
    }

    /// Plane through `at` perpendicular to the direction from the origin.
    pub fn tangent(at: Point3) -> Self {
        Self::new(at.normalize(), at)
    }

    /// Signed distance of `p` from the plane, positive on the normal side.
    pub fn signed_distance(&self, p: Point3) -> f64 {
        self.normal.dot(p) - self.offset
    }

    /// Distance from the origin along the unit direction `dir` to the plane.
    ///
    /// Non-finite when the ray runs parallel to the plane.
    pub fn distance_along_ray(&self, dir: Point3) -> f64 {
        self.offset / self.normal.dot(dir)
    }

    /// Point where the ray from the origin along `dir` meets the plane.
    pub fn project_along_ray(&self, dir: Point3) -> Point3 {
        dir * self.distance_along_ray(dir)
    }

    /// Dip and strike of the plane in degrees, measured against the up,
    /// north and east axes of `frame`.
    ///
    /// The strike runs along `normal × up` and is measured clockwise from
    /// north, so strikes pointing west lie between 180 and 360 degrees. A
    /// horizontal plane has dip and strike zero.
    pub fn dip_and_strike(&self, frame: &TangentFrame) -> (f64, f64) {
        let up = frame.normal;
        let strike = self.normal.cross(up);
        if strike.length() < 1e-12 {
            return (0.0, 0.0);
        }
        let strike = strike.normalize();
        let dip_direction = up.cross(strike).normalize();
        let down_dip = self.normal.cross(strike).normalize();
        let dip = down_dip.dot(dip_direction).clamp(-1.0, 1.0).acos().to_degrees();
        let mut azimuth = frame.north.dot(strike).clamp(-1.0, 1.0).acos().to_degrees();
        if frame.east.dot(strike) < 0.0 {
            azimuth = 360.0 - azimuth;
        }
        (dip, azimuth)
    }
}

/// Unit-scale tangent frame through the centroid of `points`, or `None` when
/// the points are empty or their centroid has no direction.
pub fn centroid_frame(points: &[Point3]) -> Option<TangentFrame> {
    if points.is_empty() {
        return None;
    }
    let mut centroid = Point3::zero();
    for p in points {
        centroid = centroid + *p;
    }
    centroid = centroid * (1.0 / points.len() as f64);
    let frame = TangentFrame::new(centroid, centroid.length(), 1.0);
    if frame.normal.is_finite() && frame.east.is_finite() && frame.north.is_finite() {
        Some(frame)
    } else {
        None
    }
}

/// Fits a plane through `points` by least squares.
///
/// Heights are measured along the radial direction of the centroid, so the
/// fit models `up = a * east + b * north + c` in the tangent frame there.
/// Horizontal offsets are divided by the largest of them before the 3x3
/// normal equations are accumulated, and the system is solved by SVD.
/// Returns `None` for fewer than three points or a numerically singular
/// system, for example when all points are collinear.
pub fn fit_plane(points: &[Point3]) -> Option<Plane> {
    if points.len() < 3 {
        return None;
    }
    let frame = centroid_frame(points)?;
    let up = frame.normal;
    let centroid = frame.middle;

    let extent = points
        .iter()
        .map(|p| {
            let d = *p - centroid;
            frame.east.dot(d).abs().max(frame.north.dot(d).abs())
        })
        .fold(0.0, f64::max);
    if !(extent.is_finite() && extent > 0.0) {
        return None;
    }

    let mut m = Matrix3::<f64>::zeros();
    let mut rhs = Vector3::<f64>::zeros();
    for p in points {
        let d = *p - centroid;
        let u = frame.east.dot(d) / extent;
        let v = frame.north.dot(d) / extent;
        let w = up.dot(d);
        m[(0, 0)] += u * u;
        m[(0, 1)] += u * v;
        m[(0, 2)] += u;
        m[(1, 1)] += v * v;
        m[(1, 2)] += v;
        m[(2, 2)] += 1.0;
        rhs[0] += u * w;
        rhs[1] += v * w;
        rhs[2] += w;
    }
    m[(1, 0)] = m[(0, 1)];
    m[(2, 0)] = m[(0, 2)];
    m[(2, 1)] = m[(1, 2)];

    let svd = SVD::new(m, true, true);
    if !(svd.singular_values.min() > 1e-10 * svd.singular_values.max()) {
        return None;
    }
    let solution = svd.solve(&rhs, 0.0).ok()?;
    let (a, b, c) = (solution[0] / extent, solution[1] / extent, solution[2]);

    let mut normal = (up - frame.east * a - frame.north * b).normalize();
    if normal.dot(up) < 0.0 {
        normal = -normal;
    }
    Some(Plane::new(normal, centroid + up * c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_an_inclined_plane() {
        // z = 1000 + 0.1 x around the +z axis
        let mut pts = Vec::new();
        for &(x, y) in &[(-2.0, -1.0), (2.0, -1.0), (2.0, 1.0), (-2.0, 1.0), (0.0, 0.0)] {
            pts.push(Point3::new(x, y, 1000.0 + 0.1 * x));
        }
        let plane = fit_plane(&pts).unwrap();
        let expected = Point3::new(-0.1, 0.0, 1.0).normalize();
        assert!((plane.normal - expected).length() < 1e-9);
        for p in &pts {
            assert!(plane.signed_distance(*p).abs() < 1e-9);
        }
    }

    #[test]
    fn residuals_balance_around_the_plane() {
        let pts = vec![
            Point3::new(-1.0, -1.0, 500.5),
            Point3::new(1.0, -1.0, 499.5),
            Point3::new(1.0, 1.0, 500.5),
            Point3::new(-1.0, 1.0, 499.5),
        ];
        let plane = fit_plane(&pts).unwrap();
        assert!((plane.normal - Point3::new(0.0, 0.0, 1.0)).length() < 1e-9);
        assert!((plane.offset - 500.0).abs() < 1e-9);
        let sum: f64 = pts.iter().map(|p| plane.signed_distance(*p)).sum();
        assert!(sum.abs() < 1e-9);
    }

    #[test]
    fn normal_points_outward() {
        let pts = vec![
            Point3::new(0.0, -300.0, 0.0),
            Point3::new(1.0, -300.0, 0.0),
            Point3::new(0.0, -300.0, 1.0),
        ];
        let plane = fit_plane(&pts).unwrap();
        assert!(plane.normal.y < 0.0);
        let dir = Point3::new(0.0, -1.0, 0.0);
        assert!((plane.distance_along_ray(dir) - 300.0).abs() < 1e-9);
        assert!((plane.project_along_ray(dir) - Point3::new(0.0, -300.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn wide_rings_still_have_a_plane() {
        use crate::local_grid::{to_cartesian, LngLat};
        const EARTH: f64 = 6_371_000.0;
        for &half in &[1.0, 5.0, 8.0, 15.0] {
            let pts: Vec<Point3> = [(-half, -half), (half, -half), (half, half), (-half, half)]
                .iter()
                .map(|&(dlng, dlat)| {
                    let at = LngLat::from_degrees(10.0 + dlng, 45.0 + dlat);
                    to_cartesian(at, EARTH, 2000.0 * (dlng + dlat))
                })
                .collect();
            let plane = fit_plane(&pts);
            assert!(plane.is_some(), "{} deg", half);
        }

        // an exact plane tilted by 0.1 towards west, 1000 km across
        let frame = TangentFrame::new(Point3::new(1.0, 2.0, 3.0), EARTH, 1.0);
        let at = |u: f64, v: f64| frame.middle + frame.east * u + frame.north * v + frame.normal * (0.1 * u);
        let pts = vec![
            at(-5e5, -5e5),
            at(5e5, -5e5),
            at(5e5, 5e5),
            at(-5e5, 5e5),
            at(0.0, 0.0),
        ];
        let plane = fit_plane(&pts).unwrap();
        let expected = (frame.normal - frame.east * 0.1).normalize();
        assert!((plane.normal - expected).length() < 1e-9);
        for p in &pts {
            assert!(plane.signed_distance(*p).abs() < 1e-6);
        }
    }

    #[test]
    fn dip_and_strike_of_inclined_planes() {
        let frame = TangentFrame::new(Point3::new(0.0, 0.0, 1000.0), 1000.0, 1.0);

        // rising to the east: strike due north
        let east = Plane::new(Point3::new(-0.1, 0.0, 1.0).normalize(), frame.middle);
        let (dip, strike) = east.dip_and_strike(&frame);
        assert!((dip - 0.1f64.atan().to_degrees()).abs() < 1e-9);
        assert!(strike.abs() < 1e-6);

        // rising to the north: strike points west
        let north = Plane::new(Point3::new(0.0, -0.2, 1.0).normalize(), frame.middle);
        let (dip, strike) = north.dip_and_strike(&frame);
        assert!((dip - 0.2f64.atan().to_degrees()).abs() < 1e-9);
        assert!((strike - 270.0).abs() < 1e-9);

        let level = Plane::tangent(frame.middle);
        assert_eq!(level.dip_and_strike(&frame), (0.0, 0.0));
    }

    #[test]
    fn collinear_points_have_no_plane() {
        let pts = vec![
            Point3::new(0.0, 0.0, 100.0),
            Point3::new(1.0, 0.0, 100.0),
            Point3::new(2.0, 0.0, 100.0),
        ];
        assert!(fit_plane(&pts).is_none());
        assert!(fit_plane(&pts[..2]).is_none());
    }
}
