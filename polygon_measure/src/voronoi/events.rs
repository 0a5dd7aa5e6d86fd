//! Priority queue of site and circle events ordered by sweep position.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::geometry::Point;

/// A predicted disappearance of an arc.
///
/// `valid` is cleared as soon as any of the three arcs involved changes its
/// neighbours; the entry then stays in the queue as a tombstone.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CircleEvent {
    pub valid: bool,
    pub arc: usize,
    pub center: Point,
}

/// What a popped queue entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventKind {
    /// Index into the generator's site list.
    Site(usize),
    /// Handle into [`EventQueue::circle`].
    Circle(usize),
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    y: f64,
    x: f64,
    kind: EventKind,
}

impl Entry {
    fn rank(&self) -> (u8, usize) {
        match self.kind {
            EventKind::Circle(h) => (1, h),
            EventKind::Site(i) => (0, i),
        }
    }
}

// `BinaryHeap` pops the greatest entry: highest y, then lowest x, circle
// events before site events at the same position, then insertion order.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        let (kind_a, id_a) = self.rank();
        let (kind_b, id_b) = other.rank();
        self.y
            .total_cmp(&other.y)
            .then_with(|| other.x.total_cmp(&self.x))
            .then_with(|| kind_a.cmp(&kind_b))
            .then_with(|| id_b.cmp(&id_a))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

/// Site and circle events for one sweep.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    heap: BinaryHeap<Entry>,
    circles: Vec<CircleEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_site(&mut self, index: usize, at: Point) {
        self.heap.push(Entry {
            y: at.y,
            x: at.x,
            kind: EventKind::Site(index),
        });
    }

    /// Queues a circle event firing when the sweep reaches `bottom`, the
    /// lowest point of the circle. Returns its handle.
    pub fn push_circle(&mut self, arc: usize, center: Point, bottom: f64) -> usize {
        let handle = self.circles.len();
        self.circles.push(CircleEvent {
            valid: true,
            arc,
            center,
        });
        self.heap.push(Entry {
            y: bottom,
            x: center.x,
            kind: EventKind::Circle(handle),
        });
        handle
    }

    /// Pops the next event together with its sweep position. Tombstoned
    /// circle events are returned too; callers check [`EventQueue::circle`].
    pub fn pop(&mut self) -> Option<(f64, EventKind)> {
        self.heap.pop().map(|e| (e.y, e.kind))
    }

    pub fn circle(&self, handle: usize) -> Option<&CircleEvent> {
        self.circles.get(handle)
    }

    pub fn invalidate(&mut self, handle: usize) {
        if let Some(event) = self.circles.get_mut(handle) {
            event.valid = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_top_down_with_circles_first_on_ties() {
        let mut q = EventQueue::new();
        q.push_site(0, Point::new(0.0, 0.0));
        q.push_site(1, Point::new(5.0, 3.0));
        q.push_site(2, Point::new(-1.0, 3.0));
        let c = q.push_circle(7, Point::new(0.0, 1.0), 0.0);
        assert_eq!(q.pop(), Some((3.0, EventKind::Site(2))));
        assert_eq!(q.pop(), Some((3.0, EventKind::Site(1))));
        assert_eq!(q.pop(), Some((0.0, EventKind::Circle(c))));
        assert_eq!(q.pop(), Some((0.0, EventKind::Site(0))));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn invalidated_events_stay_queued_as_tombstones() {
        let mut q = EventQueue::new();
        let c = q.push_circle(3, Point::new(0.0, 0.0), -1.0);
        q.invalidate(c);
        assert_eq!(q.pop(), Some((-1.0, EventKind::Circle(c))));
        assert!(!q.circle(c).map_or(true, |e| e.valid));
        assert_eq!(q.circle(c).map(|e| e.arc), Some(3));
    }
}
