//! Local tangent-plane grid around the centre of a polygon on a sphere.

use crate::geometry::{Point, Point3};
use crate::measure::DegenerateReason;

/// Longitude and latitude in radians.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn from_degrees(lng: f64, lat: f64) -> Self {
        Self::new(lng.to_radians(), lat.to_radians())
    }

    /// Returns `(lng, lat)` in degrees.
    pub fn to_degrees(&self) -> (f64, f64) {
        (self.lng.to_degrees(), self.lat.to_degrees())
    }
}

/// Cartesian position of `at` at `height` above a sphere of `radius`.
///
/// The y axis points to the north pole and longitude zero lies on +z.
pub fn to_cartesian(at: LngLat, radius: f64, height: f64) -> Point3 {
    let r = radius + height;
    Point3::new(
        at.lat.cos() * at.lng.sin() * r,
        at.lat.sin() * r,
        at.lat.cos() * at.lng.cos() * r,
    )
}

/// Inverse of [`to_cartesian`], ignoring the distance from the centre.
pub fn to_lng_lat(p: Point3) -> LngLat {
    let len = p.length();
    LngLat::new(p.x.atan2(p.z), (p.y / len).clamp(-1.0, 1.0).asin())
}

/// Tangent plane touching the sphere below the average of a set of points.
///
/// Local coordinates are measured along `east` and `north` from the touching
/// point and divided by `scale`, so a polygon fitted with
/// [`TangentFrame::for_ring`] lands inside the unit square.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TangentFrame {
    /// Outward unit normal of the plane.
    pub normal: Point3,
    /// Touching point of the plane on the sphere.
    pub middle: Point3,
    pub east: Point3,
    pub north: Point3,
    pub radius: f64,
    pub scale: f64,
}

impl TangentFrame {
    /// Creates a frame touching the sphere in the direction of `average`.
    pub fn new(average: Point3, radius: f64, scale: f64) -> Self {
        let normal = average.normalize();
        let horizontal = normal.x * normal.x + normal.z * normal.z;
        let north = if horizontal < 1e-24 {
            // at a pole every horizontal direction is north
            Point3::new(0.0, 0.0, -1.0)
        } else if normal.y != 0.0 {
            let y_north = horizontal / normal.y;
            let north = Point3::new(-normal.x, y_north, -normal.z).normalize();
            if y_north < 0.0 {
                -north
            } else {
                north
            }
        } else {
            Point3::new(0.0, 1.0, 0.0)
        };
        let east = -normal.cross(north);
        Self {
            normal,
            middle: normal * radius,
            east,
            north,
            radius,
            scale,
        }
    }

    /// Fits a frame to surface points.
    ///
    /// The scale is derived from the longest chord `d` between the average
    /// position and any point, widened by 20% and corrected for the
    /// curvature of the sphere. Points spreading further than one radius
    /// from their average cannot be projected.
    pub fn for_ring(points: &[Point3], radius: f64) -> Result<Self, DegenerateReason> {
        if points.len() < 3 {
            return Err(DegenerateReason::TooFewPoints);
        }
        let mut average = Point3::zero();
        for p in points {
            average = average + *p * (1.0 / points.len() as f64);
        }
        let max_dist = points
            .iter()
            .map(|p| (average - *p).length())
            .fold(0.0, f64::max);
        if !max_dist.is_finite() || !average.is_finite() {
            return Err(DegenerateReason::NonFinite);
        }
        if max_dist > radius {
            return Err(DegenerateReason::SpansHemisphere);
        }
        if max_dist == 0.0 {
            return Err(DegenerateReason::TooFewPoints);
        }
        let scale = 1.2 * max_dist * radius / (radius * radius - max_dist * max_dist).sqrt();
        let frame = Self::new(average, radius, scale);
        if !(scale.is_finite() && frame.normal.is_finite()) {
            return Err(DegenerateReason::NonFinite);
        }
        Ok(frame)
    }

    /// Projects `p` along its ray from the sphere centre onto the plane and
    /// returns its scaled plane coordinates.
    pub fn to_local(&self, p: Point3) -> Point {
        let k = self.normal.dot(self.middle) / self.normal.dot(p);
        let d = p * k - self.middle;
        Point::new(self.east.dot(d) / self.scale, self.north.dot(d) / self.scale)
    }

    /// Unit direction from the sphere centre through the plane point `q`.
    pub fn direction(&self, q: Point) -> Point3 {
        (self.middle + self.east * (self.scale * q.x) + self.north * (self.scale * q.y)).normalize()
    }

    /// Point on the sphere below the plane point `q`.
    pub fn from_local(&self, q: Point) -> Point3 {
        self.direction(q) * self.radius
    }

    /// Longitude and latitude below the plane point `q`.
    pub fn lng_lat(&self, q: Point) -> LngLat {
        to_lng_lat(self.direction(q))
    }
}
