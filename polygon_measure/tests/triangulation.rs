use polygon_measure::geometry::{orient, polygon_area, Point};
use polygon_measure::Diagram;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn hull(points: &[Point]) -> Vec<Point> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }
    let mut lower: Vec<Point> = Vec::new();
    for p in &pts {
        while lower.len() >= 2 && orient(lower[lower.len() - 2], lower[lower.len() - 1], *p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }
    let mut upper: Vec<Point> = Vec::new();
    for p in pts.iter().rev() {
        while upper.len() >= 2 && orient(upper[upper.len() - 2], upper[upper.len() - 1], *p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn in_circle(a: Point, b: Point, c: Point, p: Point) -> f64 {
    let (ax, ay) = (a.x - p.x, a.y - p.y);
    let (bx, by) = (b.x - p.x, b.y - p.y);
    let (cx, cy) = (c.x - p.x, c.y - p.y);
    let det = (ax * ax + ay * ay) * (bx * cy - cx * by) - (bx * bx + by * by) * (ax * cy - cx * ay)
        + (cx * cx + cy * cy) * (ax * by - bx * ay);
    if orient(a, b, c) < 0.0 {
        -det
    } else {
        det
    }
}

/// Checks edges and coverage, and the empty circumcircle when `strict`.
fn assert_delaunay(points: &[Point], strict: bool) {
    let diagram = Diagram::from_points(points);
    let keys = diagram.edge_keys();
    let mut covered = 0.0;
    for tri in &diagram.triangles {
        for (a, b, _) in tri.edges() {
            let key = if a.addr < b.addr { (a.addr, b.addr) } else { (b.addr, a.addr) };
            assert!(keys.contains(&key), "edge {:?} of a triangle is missing", key);
        }
        covered += tri.planar_area();
        if strict {
            let [a, b, c] = tri.sites;
            for (i, p) in points.iter().enumerate() {
                if i == a.addr || i == b.addr || i == c.addr {
                    continue;
                }
                assert!(
                    in_circle(a.point(), b.point(), c.point(), *p) <= 1e-9,
                    "{:?} lies inside the circumcircle of {:?}",
                    p,
                    tri
                );
            }
        }
    }
    let expected = polygon_area(&hull(points));
    assert!(
        (covered - expected).abs() <= 1e-7 * expected.max(1.0),
        "triangles cover {} of hull area {}",
        covered,
        expected
    );
}

#[test]
fn random_points_are_delaunay() {
    for seed in 0..40 {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = rng.random_range(3..60);
        let points: Vec<Point> = (0..n)
            .map(|_| Point::new(rng.random_range(0.0..1.0), rng.random_range(0.0..1.0)))
            .collect();
        assert_delaunay(&points, true);
    }
}

#[test]
fn tiny_clusters_are_delaunay() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..20 {
        let n = rng.random_range(3..120);
        let points: Vec<Point> = (0..n)
            .map(|_| {
                Point::new(
                    0.3 + 1e-4 * rng.random_range(0.0..1.0),
                    -0.7 + 1e-4 * rng.random_range(0.0..1.0),
                )
            })
            .collect();
        assert_delaunay(&points, true);
    }
}

#[test]
fn grids_are_covered() {
    let grid: Vec<Point> = (0..6)
        .flat_map(|x| (0..5).map(move |y| Point::new(x as f64, y as f64)))
        .collect();
    assert_delaunay(&grid, true);
    let diagram = Diagram::from_points(&grid);
    assert_eq!(diagram.triangles.len(), 40);

    let stretched: Vec<Point> = (0..7)
        .flat_map(|x| (0..7).map(move |y| Point::new(x as f64 * 0.1, y as f64 * 0.3)))
        .collect();
    assert_delaunay(&stretched, true);
}

#[test]
fn regular_polygons_and_stars_are_covered() {
    for n in 3..20 {
        for &inner in &[None, Some(0.35), Some(0.5)] {
            let mut points = Vec::new();
            for i in 0..n {
                let a = 0.1 + std::f64::consts::TAU * i as f64 / n as f64;
                points.push(Point::new(a.cos(), a.sin()));
                if let Some(r) = inner {
                    let b = a + std::f64::consts::PI / n as f64;
                    points.push(Point::new(r * b.cos(), r * b.sin()));
                }
            }
            assert_delaunay(&points, false);
        }
    }
}

#[test]
fn square_has_two_triangles() {
    let square = [
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ];
    let diagram = Diagram::from_points(&square);
    assert_eq!(diagram.triangles.len(), 2);
    assert_eq!(diagram.edges.len(), 5);
}

#[test]
fn collinear_points_have_edges_but_no_triangles() {
    let line = [Point::new(0.0, 0.0), Point::new(0.0, 1.0), Point::new(0.0, 2.0)];
    let diagram = Diagram::from_points(&line);
    assert!(diagram.triangles.is_empty());
    assert!(diagram.has_edge(0, 1));
    assert!(diagram.has_edge(1, 2));
    assert!(!diagram.has_edge(0, 2));
}
