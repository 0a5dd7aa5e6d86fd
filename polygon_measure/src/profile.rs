//! Elevation profile along a path of longitude/latitude vertices.

use crate::geometry::distance3;
use crate::local_grid::{to_cartesian, to_lng_lat, LngLat};
use crate::terrain::HeightField;

/// Samples per path segment used by the command line tool.
pub const DEFAULT_PROFILE_SAMPLES: usize = 256;

/// One sample of an elevation profile.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProfileSample {
    pub at: LngLat,
    /// Distance along the terrain surface from the first vertex.
    pub distance: f64,
    pub height: f64,
}

/// Samples the terrain along `path`.
///
/// Every segment is cut into `samples_per_segment` equal steps of the straight
/// line between its two surface points; each step is pushed back onto the
/// terrain before it is measured. Distances add up the chords between
/// consecutive surface samples. The last vertex of the path closes the
/// profile.
pub fn elevation_profile(
    path: &[LngLat],
    radius: f64,
    terrain: &dyn HeightField,
    samples_per_segment: usize,
) -> Vec<ProfileSample> {
    let steps = samples_per_segment.max(1);
    let mut out = Vec::with_capacity(path.len().saturating_sub(1) * steps + 1);
    let mut last = None;
    let mut distance = 0.0;
    let mut push = |at: LngLat, out: &mut Vec<ProfileSample>| {
        let height = terrain.height(at);
        let pos = to_cartesian(at, radius, height);
        if let Some(prev) = last {
            distance += distance3(prev, pos);
        }
        last = Some(pos);
        out.push(ProfileSample {
            at,
            distance,
            height,
        });
    };

    for pair in path.windows(2) {
        let p0 = to_cartesian(pair[0], radius, terrain.height(pair[0]));
        let p1 = to_cartesian(pair[1], radius, terrain.height(pair[1]));
        for i in 0..steps {
            let t = i as f64 / steps as f64;
            push(to_lng_lat(p0 + (p1 - p0) * t), &mut out);
        }
    }
    if let Some(end) = path.last() {
        push(*end, &mut out);
    }
    out
}
