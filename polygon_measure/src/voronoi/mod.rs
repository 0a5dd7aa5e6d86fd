//! Voronoi diagram and Delaunay triangulation via Fortune's sweep.
//!
//! The sweep line moves from the highest site downwards. Every run builds
//! its own beachline and event queue and drops them when it returns.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use log::debug;

use crate::geometry::{orient, Point, Site, Triangle, TriangulationEdge, VoronoiEdge};

mod beachline;
mod events;

use beachline::{parabola_y, Beachline};
use events::{EventKind, EventQueue};

/// Relative tolerance for accepting circle events that lie marginally above
/// the sweep line.
const SWEEP_EPSILON: f64 = 1e-9;

/// Output of one generator run.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    /// Distinct input sites in input order.
    pub sites: Vec<Site>,
    /// Finished Voronoi edges.
    pub voronoi_edges: Vec<VoronoiEdge>,
    /// Delaunay edges, one per unordered address pair.
    pub edges: Vec<TriangulationEdge>,
    /// Delaunay triangles.
    pub triangles: Vec<Triangle>,
    /// Delaunay neighbours of every site, keyed by address.
    pub neighbors: BTreeMap<usize, Vec<Site>>,
}

impl Diagram {
    /// Runs the sweep over `sites`.
    ///
    /// Duplicate positions and non-finite sites are skipped. Fewer than two
    /// distinct sites give an empty diagram.
    pub fn generate(sites: &[Site]) -> Self {
        Generator::new(sites).run()
    }

    /// Triangulates plain points, addressing them by their index.
    pub fn from_points(points: &[Point]) -> Self {
        let sites: Vec<Site> = points
            .iter()
            .enumerate()
            .map(|(i, p)| Site::new(p.x, p.y, i))
            .collect();
        Self::generate(&sites)
    }

    /// Returns `true` when an edge joins the two addresses.
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        let key = crate::geometry::site::edge_key(a, b);
        self.edges.iter().any(|e| e.key() == key)
    }

    /// The set of unordered address pairs of all edges.
    pub fn edge_keys(&self) -> BTreeSet<(usize, usize)> {
        self.edges.iter().map(|e| e.key()).collect()
    }
}

struct Generator {
    sites: Vec<Site>,
    line: Beachline,
    queue: EventQueue,
    sweep: f64,
    max_y: f64,
    min_y: f64,
    voronoi_edges: Vec<VoronoiEdge>,
    edges: Vec<TriangulationEdge>,
    edge_keys: HashSet<(usize, usize)>,
    triangles: Vec<Triangle>,
}

impl Generator {
    fn new(input: &[Site]) -> Self {
        let mut seen = HashSet::new();
        let mut sites = Vec::with_capacity(input.len());
        for s in input {
            if !(s.x.is_finite() && s.y.is_finite()) {
                debug!("skipping non-finite site {}", s.addr);
                continue;
            }
            // `+ 0.0` folds negative zero onto zero
            if seen.insert(((s.x + 0.0).to_bits(), (s.y + 0.0).to_bits())) {
                sites.push(*s);
            }
        }
        let (mut min_x, mut max_x) = (0.0f64, 0.0f64);
        let (mut min_y, mut max_y) = (0.0f64, 0.0f64);
        if let Some(first) = sites.first() {
            (min_x, max_x, min_y, max_y) = (first.x, first.x, first.y, first.y);
            for s in &sites {
                min_x = min_x.min(s.x);
                max_x = max_x.max(s.x);
                min_y = min_y.min(s.y);
                max_y = max_y.max(s.y);
            }
        }
        let extent = (max_x - min_x) + (max_y - min_y) + 1.0;
        Self {
            sites,
            line: Beachline::new(extent),
            queue: EventQueue::new(),
            sweep: f64::INFINITY,
            max_y,
            min_y,
            voronoi_edges: Vec::new(),
            edges: Vec::new(),
            edge_keys: HashSet::new(),
            triangles: Vec::new(),
        }
    }

    fn run(mut self) -> Diagram {
        if self.sites.len() < 2 {
            return Diagram {
                sites: self.sites,
                ..Diagram::default()
            };
        }
        for (i, s) in self.sites.iter().enumerate() {
            self.queue.push_site(i, s.point());
        }
        while let Some((y, kind)) = self.queue.pop() {
            self.sweep = self.sweep.min(y);
            match kind {
                EventKind::Site(i) => self.site_event(self.sites[i]),
                EventKind::Circle(h) => self.circle_event(h),
            }
        }
        self.finish()
    }

    fn add_edge(&mut self, a: Site, b: Site) {
        let edge = TriangulationEdge::new(a, b);
        if self.edge_keys.insert(edge.key()) {
            self.edges.push(edge);
        }
    }

    fn invalidate(&mut self, arc: usize) {
        if let Some(handle) = self.line.arcs[arc].event.take() {
            self.queue.invalidate(handle);
        }
    }

    /// Schedules the disappearance of `arc` if its neighbours converge.
    fn check_circle(&mut self, arc: usize) {
        let (left_bp, right_bp) = match (self.line.arcs[arc].left, self.line.arcs[arc].right) {
            (Some(l), Some(r)) => (l, r),
            _ => return,
        };
        let a = self.line.arcs[self.line.breakpoints[left_bp].left_arc].site;
        let b = self.line.arcs[arc].site;
        let c = self.line.arcs[self.line.breakpoints[right_bp].right_arc].site;
        // only clockwise triples converge for a downward sweep
        if orient(a.point(), b.point(), c.point()) >= 0.0 {
            return;
        }
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d.abs() <= f64::MIN_POSITIVE {
            return;
        }
        let a2 = a.x * a.x + a.y * a.y;
        let b2 = b.x * b.x + b.y * b.y;
        let c2 = c.x * c.x + c.y * c.y;
        let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
        let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
        let r = (a.x - ux).hypot(a.y - uy);
        let bottom = uy - r;
        if bottom > self.sweep + SWEEP_EPSILON * (1.0 + self.sweep.abs()) {
            return;
        }
        let handle = self.queue.push_circle(arc, Point::new(ux, uy), bottom);
        self.line.arcs[arc].event = Some(handle);
    }

    fn site_event(&mut self, site: Site) {
        if self.line.is_empty() {
            self.line.push_arc(site);
            return;
        }
        let found = match self.line.arc_at(site.x, self.sweep) {
            Some(found) => found,
            None => return,
        };
        let new = self.line.push_arc(site);
        self.invalidate(found);
        let found_site = self.line.arcs[found].site;
        self.add_edge(found_site, site);

        if site.y == found_site.y {
            self.insert_level(found, new, found_site, site);
            return;
        }

        // split the found arc into found | new | right
        let right = self.line.push_arc(found_site);
        let start = Point::new(site.x, parabola_y(found_site, site.x, self.sweep));
        let bl = self.line.push_breakpoint(found, new, start);
        let br = self.line.push_breakpoint(new, right, start);
        let found_right = self.line.arcs[found].right;
        self.line.arcs[right].right = found_right;
        if let Some(fr) = found_right {
            self.line.breakpoints[fr].left_arc = right;
        }
        self.line.arcs[right].left = Some(br);
        self.line.arcs[new].left = Some(bl);
        self.line.arcs[new].right = Some(br);
        self.line.arcs[found].right = Some(bl);
        match (self.line.arcs[found].left, found_right) {
            (Some(fl), _) => self.line.attach_right_of(Some(fl), bl),
            (None, Some(fr)) => self.line.attach_left_of(fr, bl),
            (None, None) => self.line.attach_right_of(None, bl),
        }
        self.line.attach_right_of(Some(bl), br);
        self.check_circle(found);
        self.check_circle(right);
    }

    /// Inserts `new` beside `found` when both sites lie on the sweep line.
    fn insert_level(&mut self, found: usize, new: usize, found_site: Site, site: Site) {
        let start = Point::new(
            (site.x + found_site.x) / 2.0,
            self.max_y + self.line.extent(),
        );
        let found_left = self.line.arcs[found].left;
        let found_right = self.line.arcs[found].right;
        if site.x < found_site.x {
            let b = self.line.push_breakpoint(new, found, start);
            self.line.arcs[new].left = found_left;
            self.line.arcs[new].right = Some(b);
            if let Some(fl) = found_left {
                self.line.breakpoints[fl].right_arc = new;
            }
            self.line.arcs[found].left = Some(b);
            match (found_left, found_right) {
                (Some(fl), _) => self.line.attach_right_of(Some(fl), b),
                (None, Some(fr)) => self.line.attach_left_of(fr, b),
                (None, None) => self.line.attach_right_of(None, b),
            }
        } else {
            let b = self.line.push_breakpoint(found, new, start);
            self.line.arcs[new].right = found_right;
            self.line.arcs[new].left = Some(b);
            if let Some(fr) = found_right {
                self.line.breakpoints[fr].left_arc = new;
            }
            self.line.arcs[found].right = Some(b);
            match (found_left, found_right) {
                (Some(fl), _) => self.line.attach_right_of(Some(fl), b),
                (None, Some(fr)) => self.line.attach_left_of(fr, b),
                (None, None) => self.line.attach_right_of(None, b),
            }
        }
        self.check_circle(found);
        self.check_circle(new);
    }

    fn circle_event(&mut self, handle: usize) {
        let (arc, center) = match self.queue.circle(handle) {
            Some(e) if e.valid => (e.arc, e.center),
            _ => return,
        };
        let (lb, rb) = match (self.line.arcs[arc].left, self.line.arcs[arc].right) {
            (Some(l), Some(r)) => (l, r),
            _ => return,
        };
        let la = self.line.breakpoints[lb].left_arc;
        let ra = self.line.breakpoints[rb].right_arc;
        self.invalidate(arc);
        self.invalidate(la);
        self.invalidate(ra);

        let left_site = self.line.arcs[la].site;
        let right_site = self.line.arcs[ra].site;
        self.triangles
            .push(Triangle::new(left_site, self.line.arcs[arc].site, right_site));
        self.voronoi_edges.push(VoronoiEdge {
            start: self.line.breakpoints[lb].start,
            end: center,
        });
        self.voronoi_edges.push(VoronoiEdge {
            start: self.line.breakpoints[rb].start,
            end: center,
        });

        let merged = self.line.push_breakpoint(la, ra, center);
        self.add_edge(left_site, right_site);
        self.line.arcs[la].right = Some(merged);
        self.line.arcs[ra].left = Some(merged);
        self.line.attach_right_of(Some(lb), merged);
        self.line.remove(lb);
        self.line.remove(rb);
        self.line.arcs[arc].left = None;
        self.line.arcs[arc].right = None;

        self.check_circle(la);
        self.check_circle(ra);
    }

    fn finish(mut self) -> Diagram {
        let far = self.min_y - self.line.extent();
        for bp in self.line.live_breakpoints() {
            let end = self.line.position(bp, far);
            self.voronoi_edges.push(VoronoiEdge {
                start: self.line.breakpoints[bp].start,
                end,
            });
        }

        let mut neighbors: BTreeMap<usize, Vec<Site>> = BTreeMap::new();
        for e in &self.edges {
            neighbors.entry(e.a.addr).or_default().push(e.b);
            neighbors.entry(e.b.addr).or_default().push(e.a);
        }
        debug!(
            "swept {} sites into {} edges and {} triangles",
            self.sites.len(),
            self.edges.len(),
            self.triangles.len()
        );
        Diagram {
            sites: self.sites,
            voronoi_edges: self.voronoi_edges,
            edges: self.edges,
            triangles: self.triangles,
            neighbors,
        }
    }
}
