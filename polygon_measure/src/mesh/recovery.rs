//! Forces boundary edges into an unconstrained Delaunay triangulation.
//!
//! Every boundary edge missing from the triangulation is cut where it
//! crosses existing Delaunay edges; the cut points become new boundary
//! vertices and the triangulation is rebuilt. Short boundary pieces tend to
//! appear in the Delaunay graph, so a few rounds usually suffice, but the
//! heuristic gives no guarantee.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, warn};

use crate::config::MeasureConfig;
use crate::geometry::site::edge_key;
use crate::geometry::{segment_intersection, Point, Site};
use crate::voronoi::Diagram;

/// Closed boundary ring with stable insertion between its vertices.
///
/// Vertex addresses always equal their position in the ring.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    points: Vec<Point>,
}

impl Ring {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Vertices addressed by position.
    pub fn sites(&self) -> Vec<Site> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| Site::new(p.x, p.y, i))
            .collect()
    }

    /// Boundary edge starting at vertex `i`.
    pub fn edge(&self, i: usize) -> (Point, Point) {
        (self.points[i], self.points[(i + 1) % self.points.len()])
    }

    /// Returns a new ring with `inserts[i]` placed, in order, between
    /// vertex `i` and its successor.
    pub fn with_insertions(&self, inserts: &BTreeMap<usize, Vec<Point>>) -> Ring {
        let extra: usize = inserts.values().map(Vec::len).sum();
        let mut points = Vec::with_capacity(self.points.len() + extra);
        for (i, p) in self.points.iter().enumerate() {
            points.push(*p);
            if let Some(more) = inserts.get(&i) {
                points.extend_from_slice(more);
            }
        }
        Ring { points }
    }

    /// Start indices of boundary edges absent from `edges`.
    ///
    /// Repeated positions are matched through their first occurrence, the
    /// one the generator keeps.
    pub fn missing_edges(&self, edges: &BTreeSet<(usize, usize)>) -> Vec<usize> {
        let n = self.points.len();
        if n < 3 {
            return Vec::new();
        }
        let mut first_seen: HashMap<(u64, u64), usize> = HashMap::new();
        let canonical: Vec<usize> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                *first_seen
                    .entry(((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits()))
                    .or_insert(i)
            })
            .collect();
        (0..n)
            .filter(|&i| {
                let (a, b) = (canonical[i], canonical[(i + 1) % n]);
                a != b && !edges.contains(&edge_key(a, b))
            })
            .collect()
    }
}

/// Result of edge recovery.
#[derive(Debug, Clone)]
pub struct Recovery {
    /// Boundary including inserted vertices, addressed by position.
    pub ring: Vec<Site>,
    /// Triangulation of the final ring.
    pub diagram: Diagram,
    /// Number of triangulations computed.
    pub attempts: usize,
    /// Boundary edges still absent from `diagram`, as address pairs.
    pub missing: Vec<(usize, usize)>,
}

impl Recovery {
    /// Returns `true` when every boundary edge is part of the triangulation.
    pub fn is_conforming(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Triangulates `ring` and inserts boundary vertices until every boundary
/// edge appears in the triangulation or `config.recovery_attempts`
/// triangulations were spent.
///
/// The last triangulation is returned either way; `missing` tells whether it
/// conforms to the boundary.
pub fn recover_edges(ring: &[Point], config: &MeasureConfig) -> Recovery {
    let max_attempts = config.recovery_attempts.max(1);
    let mut ring = Ring::new(ring.to_vec());
    let mut attempts = 0;
    loop {
        attempts += 1;
        let sites = ring.sites();
        let diagram = Diagram::generate(&sites);
        let missing = ring.missing_edges(&diagram.edge_keys());
        if missing.is_empty() {
            debug!("boundary recovered after {} triangulation(s)", attempts);
            return Recovery {
                ring: sites,
                diagram,
                attempts,
                missing: Vec::new(),
            };
        }
        debug!(
            "attempt {}: {} of {} boundary edges missing",
            attempts,
            missing.len(),
            ring.len()
        );

        let mut inserts = BTreeMap::new();
        if attempts < max_attempts {
            for &i in &missing {
                let (a, b) = ring.edge(i);
                let mut hits: Vec<(f64, Point)> = diagram
                    .edges
                    .iter()
                    .filter_map(|e| {
                        segment_intersection(a, b, e.a.point(), e.b.point(), config.recovery_safety)
                    })
                    .collect();
                if hits.is_empty() {
                    continue;
                }
                hits.sort_by(|x, y| x.0.total_cmp(&y.0));
                inserts.insert(i, hits.into_iter().map(|(_, p)| p).collect::<Vec<_>>());
            }
        }

        if inserts.is_empty() {
            let n = ring.len();
            warn!(
                "{} boundary edge(s) still missing after {} triangulation(s); using approximate mesh",
                missing.len(),
                attempts
            );
            return Recovery {
                ring: sites,
                diagram,
                attempts,
                missing: missing.into_iter().map(|i| (i, (i + 1) % n)).collect(),
            };
        }
        ring = ring.with_insertions(&inserts);
    }
}
