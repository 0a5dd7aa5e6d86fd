//! Arena-backed beachline: arcs, breakpoints and the breakpoint search tree.
//!
//! Arcs and breakpoints live in vectors and refer to each other by index.
//! Breakpoints additionally form an unbalanced binary search tree ordered by
//! their current x position, which is recomputed from the two neighbouring
//! sites and the sweep position on every lookup.
//!
//! The tree is never rebalanced, so sites arriving in sweep order degrade
//! lookups to linear depth.

use crate::geometry::{Point, Site};

/// Parabolic arc traced by one site.
#[derive(Debug, Clone)]
pub(crate) struct Arc {
    pub site: Site,
    pub left: Option<usize>,
    pub right: Option<usize>,
    /// Pending circle event handle.
    pub event: Option<usize>,
}

/// Boundary between two neighbouring arcs.
#[derive(Debug, Clone)]
pub(crate) struct Breakpoint {
    pub left_arc: usize,
    pub right_arc: usize,
    /// Where the traced Voronoi edge began.
    pub start: Point,
    parent: Option<usize>,
    lower: Option<usize>,
    upper: Option<usize>,
}

#[derive(Debug)]
pub(crate) struct Beachline {
    pub arcs: Vec<Arc>,
    pub breakpoints: Vec<Breakpoint>,
    root: Option<usize>,
    first: Option<usize>,
    /// Distance used to place breakpoints whose sites both sit on the sweep.
    extent: f64,
}

/// Height of the parabola with focus `s` and directrix `y = l` at `x`.
pub(crate) fn parabola_y(s: Site, x: f64, l: f64) -> f64 {
    ((x - s.x).powi(2) + s.y * s.y - l * l) / (2.0 * (s.y - l))
}

/// Position of the breakpoint between the arc of `p` (left) and `r` (right)
/// for a sweep line at `l`.
pub(crate) fn breakpoint_position(p: Site, r: Site, l: f64, extent: f64) -> Point {
    let p_on = p.y == l;
    let r_on = r.y == l;
    if p_on && r_on {
        return Point::new((p.x + r.x) / 2.0, l + extent);
    }
    if p_on {
        return Point::new(p.x, parabola_y(r, p.x, l));
    }
    if r_on {
        return Point::new(r.x, parabola_y(p, r.x, l));
    }
    let dp = 2.0 * (p.y - l);
    let dr = 2.0 * (r.y - l);
    // dr - dp, taken from the site difference directly to avoid cancellation
    let a = 2.0 * (r.y - p.y);
    let b = -2.0 * dr * p.x + 2.0 * dp * r.x;
    let c = dr * (p.x * p.x + p.y * p.y - l * l) - dp * (r.x * r.x + r.y * r.y - l * l);
    let x = if a == 0.0 {
        -c / b
    } else {
        let disc = (b * b - 4.0 * a * c).max(0.0);
        let q = -0.5 * (b + disc.sqrt().copysign(b));
        let x1 = q / a;
        let x2 = if q != 0.0 { c / q } else { x1 };
        // left arc minus right arc must increase through the breakpoint
        let slope = |x: f64| (x - p.x) / (p.y - l) - (x - r.x) / (r.y - l);
        if slope(x1) > slope(x2) {
            x1
        } else {
            x2
        }
    };
    Point::new(x, parabola_y(p, x, l))
}

impl Beachline {
    pub fn new(extent: f64) -> Self {
        Self {
            arcs: Vec::new(),
            breakpoints: Vec::new(),
            root: None,
            first: None,
            extent,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    pub fn extent(&self) -> f64 {
        self.extent
    }

    pub fn push_arc(&mut self, site: Site) -> usize {
        let id = self.arcs.len();
        self.arcs.push(Arc {
            site,
            left: None,
            right: None,
            event: None,
        });
        if self.first.is_none() {
            self.first = Some(id);
        }
        id
    }

    pub fn push_breakpoint(&mut self, left_arc: usize, right_arc: usize, start: Point) -> usize {
        self.breakpoints.push(Breakpoint {
            left_arc,
            right_arc,
            start,
            parent: None,
            lower: None,
            upper: None,
        });
        self.breakpoints.len() - 1
    }

    pub fn position(&self, bp: usize, sweep: f64) -> Point {
        let b = &self.breakpoints[bp];
        breakpoint_position(
            self.arcs[b.left_arc].site,
            self.arcs[b.right_arc].site,
            sweep,
            self.extent,
        )
    }

    /// Arc directly above `x` for the given sweep position.
    pub fn arc_at(&self, x: f64, sweep: f64) -> Option<usize> {
        let mut node = match self.root {
            Some(root) => root,
            None => return self.first,
        };
        loop {
            let bx = self.position(node, sweep).x;
            let b = &self.breakpoints[node];
            if x < bx {
                match b.lower {
                    Some(next) => node = next,
                    None => return Some(b.left_arc),
                }
            } else {
                match b.upper {
                    Some(next) => node = next,
                    None => return Some(b.right_arc),
                }
            }
        }
    }

    /// Places `new` immediately after `at` in tree order, or makes it the root
    /// when `at` is `None`.
    pub fn attach_right_of(&mut self, at: Option<usize>, new: usize) {
        let at = match at {
            Some(at) => at,
            None => {
                self.root = Some(new);
                self.breakpoints[new].parent = None;
                return;
            }
        };
        match self.breakpoints[at].upper {
            None => {
                self.breakpoints[at].upper = Some(new);
                self.breakpoints[new].parent = Some(at);
            }
            Some(mut node) => {
                while let Some(next) = self.breakpoints[node].lower {
                    node = next;
                }
                self.breakpoints[node].lower = Some(new);
                self.breakpoints[new].parent = Some(node);
            }
        }
    }

    /// Places `new` immediately before `at` in tree order.
    pub fn attach_left_of(&mut self, at: usize, new: usize) {
        match self.breakpoints[at].lower {
            None => {
                self.breakpoints[at].lower = Some(new);
                self.breakpoints[new].parent = Some(at);
            }
            Some(mut node) => {
                while let Some(next) = self.breakpoints[node].upper {
                    node = next;
                }
                self.breakpoints[node].upper = Some(new);
                self.breakpoints[new].parent = Some(node);
            }
        }
    }

    fn replace_child(&mut self, parent: Option<usize>, old: usize, new: Option<usize>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                if self.breakpoints[p].lower == Some(old) {
                    self.breakpoints[p].lower = new;
                } else {
                    self.breakpoints[p].upper = new;
                }
            }
        }
        if let Some(n) = new {
            self.breakpoints[n].parent = parent;
        }
    }

    /// Unlinks `bp` from the search tree.
    pub fn remove(&mut self, bp: usize) {
        let parent = self.breakpoints[bp].parent;
        let lower = self.breakpoints[bp].lower;
        let upper = self.breakpoints[bp].upper;
        match (lower, upper) {
            (None, _) => self.replace_child(parent, bp, upper),
            (Some(_), None) => self.replace_child(parent, bp, lower),
            (Some(lower), Some(upper)) => {
                let mut succ = upper;
                while let Some(next) = self.breakpoints[succ].lower {
                    succ = next;
                }
                if succ != upper {
                    let succ_parent = self.breakpoints[succ].parent;
                    let succ_upper = self.breakpoints[succ].upper;
                    self.replace_child(succ_parent, succ, succ_upper);
                    self.breakpoints[succ].upper = Some(upper);
                    self.breakpoints[upper].parent = Some(succ);
                }
                self.replace_child(parent, bp, Some(succ));
                self.breakpoints[succ].lower = Some(lower);
                self.breakpoints[lower].parent = Some(succ);
            }
        }
        let b = &mut self.breakpoints[bp];
        b.parent = None;
        b.lower = None;
        b.upper = None;
    }

    /// Breakpoints still in the tree, left to right.
    pub fn live_breakpoints(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        let mut node = self.root;
        while node.is_some() || !stack.is_empty() {
            while let Some(n) = node {
                stack.push(n);
                node = self.breakpoints[n].lower;
            }
            if let Some(n) = stack.pop() {
                out.push(n);
                node = self.breakpoints[n].upper;
            }
        }
        out
    }
}
