use polygon_measure::geometry::Point;
use polygon_measure::mesh::recover_edges;
use polygon_measure::MeasureConfig;

fn ring(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

fn assert_boundary_present(points: &[Point]) {
    let rec = recover_edges(points, &MeasureConfig::default());
    assert!(rec.is_conforming(), "missing {:?}", rec.missing);
    let n = rec.ring.len();
    for i in 0..n {
        assert!(rec.diagram.has_edge(i, (i + 1) % n), "edge {} missing", i);
    }
}

#[test]
fn l_shape_keeps_all_six_edges() {
    let l = ring(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 2.0), (0.0, 2.0)]);
    let rec = recover_edges(&l, &MeasureConfig::default());
    assert!(rec.is_conforming());
    assert_eq!(rec.ring.len(), 6);
    for i in 0..6 {
        assert!(rec.diagram.has_edge(i, (i + 1) % 6));
    }
}

#[test]
fn comb_and_star_keep_their_edges() {
    assert_boundary_present(&ring(&[
        (0.0, 0.0),
        (5.0, 0.0),
        (5.0, 3.0),
        (4.0, 3.0),
        (4.0, 0.5),
        (3.0, 0.5),
        (3.0, 3.0),
        (2.0, 3.0),
        (2.0, 0.5),
        (1.0, 0.5),
        (1.0, 3.0),
        (0.0, 3.0),
    ]));

    let star: Vec<Point> = (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { 1.0 } else { 0.35 };
            let a = std::f64::consts::FRAC_PI_2 + i as f64 * std::f64::consts::PI / 5.0;
            Point::new(r * a.cos(), r * a.sin())
        })
        .collect();
    assert_boundary_present(&star);
}

#[test]
fn recovery_is_idempotent() {
    let slit = ring(&[
        (0.0, 0.0),
        (10.0, 0.0),
        (10.0, 5.0),
        (5.2, 0.2),
        (0.0, 5.0),
        (-1.0, -3.0),
        (4.7, -0.2),
    ]);
    let first = recover_edges(&slit, &MeasureConfig::default());
    assert!(first.is_conforming());
    let points: Vec<Point> = first.ring.iter().map(|s| s.point()).collect();
    let second = recover_edges(&points, &MeasureConfig::default());
    assert_eq!(second.attempts, 1);
    assert_eq!(second.ring, first.ring);
    assert_eq!(second.diagram.edge_keys(), first.diagram.edge_keys());
}

#[test]
fn convex_rings_succeed_on_the_first_attempt() {
    for n in 3..16 {
        let polygon: Vec<Point> = (0..n)
            .map(|i| {
                let a = 0.3 + std::f64::consts::TAU * i as f64 / n as f64;
                Point::new(2.0 * a.cos(), a.sin())
            })
            .collect();
        let rec = recover_edges(&polygon, &MeasureConfig::default());
        assert_eq!(rec.attempts, 1, "{}-gon", n);
        assert!(rec.is_conforming());
    }
}
