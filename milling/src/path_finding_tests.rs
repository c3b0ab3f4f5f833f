use crate::geom::{point, BoundingBox, MultiPolygon, Point, Polygon};
use crate::path_finding::PathFindingSurface;

fn boxed(min: Point, max: Point) -> MultiPolygon {
    vec![BoundingBox { min, max }.to_polygon()]
}

#[test]
fn simple() {
    let keep_in = boxed(point(-100.0, -100.0), point(100.0, 100.0));
    let surface = PathFindingSurface::new(Some(&keep_in), &Vec::new(), 0.1);
    let ret = surface.find_path(point(0.0, 0.0), point(1.0, 1.0), f64::INFINITY, None);
    assert_eq!(ret, Some(vec![point(0.0, 0.0), point(1.0, 1.0)]));
}

#[test]
fn inside_hole_of_keep_out() {
    let mut keep_out = boxed(point(-10.0, -10.0), point(10.0, 10.0));
    keep_out[0].inners.push({
        let mut hole = BoundingBox { min: point(-5.0, -5.0), max: point(5.0, 5.0) }.to_ring();
        hole.reverse();
        hole
    });
    let surface = PathFindingSurface::new(None, &keep_out, 0.1);
    let ret = surface.find_path(point(0.0, 0.0), point(1.0, 1.0), f64::INFINITY, None);
    assert_eq!(ret, Some(vec![point(0.0, 0.0), point(1.0, 1.0)]));
}

#[test]
fn hole_is_unreachable_from_outside() {
    let mut keep_out = boxed(point(-10.0, -10.0), point(10.0, 10.0));
    keep_out[0].inners.push({
        let mut hole = BoundingBox { min: point(-5.0, -5.0), max: point(5.0, 5.0) }.to_ring();
        hole.reverse();
        hole
    });
    let surface = PathFindingSurface::new(None, &keep_out, 0.1);
    let ret = surface.find_path(point(0.0, 0.0), point(50.0, 50.0), f64::INFINITY, None);
    assert_eq!(ret, None);
}

fn obstacle() -> MultiPolygon {
    vec![Polygon::new(vec![
        point(3.0, 3.0),
        point(3.0, 7.0),
        point(7.0, 7.0),
        point(8.0, 3.0),
        point(3.0, 3.0),
    ])]
}

#[test]
fn around_a_box() {
    let keep_in = boxed(point(-100.0, -100.0), point(100.0, 100.0));
    let surface = PathFindingSurface::new(Some(&keep_in), &obstacle(), 0.1);
    let ret = surface.find_path(point(0.0, 0.0), point(10.0, 10.0), f64::INFINITY, None);
    assert_eq!(
        ret,
        Some(vec![point(0.0, 0.0), point(3.0, 7.0), point(10.0, 10.0)])
    );
}

#[test]
fn around_a_box_no_keep_in() {
    let surface = PathFindingSurface::new(None, &obstacle(), 0.1);
    let ret = surface.find_path(point(0.0, 0.0), point(10.0, 10.0), f64::INFINITY, None);
    assert_eq!(
        ret,
        Some(vec![point(0.0, 0.0), point(3.0, 7.0), point(10.0, 10.0)])
    );
}

#[test]
fn inside_the_box_is_unreachable() {
    let keep_in = boxed(point(-100.0, -100.0), point(100.0, 100.0));
    let surface = PathFindingSurface::new(Some(&keep_in), &obstacle(), 0.1);
    let ret = surface.find_path(point(0.0, 0.0), point(5.0, 5.0), f64::INFINITY, None);
    assert_eq!(ret, None);
}

#[test]
fn reuse_surface() {
    let keep_in = boxed(point(-100.0, -100.0), point(100.0, 100.0));
    let surface = PathFindingSurface::new(Some(&keep_in), &obstacle(), 0.1);
    assert_eq!(
        surface.find_path(point(0.0, 0.0), point(5.0, 5.0), f64::INFINITY, None),
        None
    );
    assert_eq!(
        surface.find_path(point(0.0, 0.0), point(10.0, 10.0), f64::INFINITY, None),
        Some(vec![point(0.0, 0.0), point(3.0, 7.0), point(10.0, 10.0)])
    );
}

#[test]
fn u_shape() {
    let keep_in = vec![Polygon::new(vec![
        point(0.0, 10.0),
        point(3.0, 10.0),
        point(3.0, 3.0),
        point(7.0, 3.0),
        point(7.0, 10.0),
        point(10.0, 10.0),
        point(10.0, 0.0),
        point(0.0, 0.0),
        point(0.0, 10.0),
    ])];
    let surface = PathFindingSurface::new(Some(&keep_in), &Vec::new(), 0.1);
    let ret = surface.find_path(point(1.0, 9.0), point(9.0, 9.0), f64::INFINITY, None);
    assert_eq!(
        ret,
        Some(vec![
            point(1.0, 9.0),
            point(3.0, 3.0),
            point(7.0, 3.0),
            point(9.0, 9.0),
        ])
    );
}

#[test]
fn max_path_length_bounds_the_answer() {
    let keep_in = boxed(point(-100.0, -100.0), point(100.0, 100.0));
    let surface = PathFindingSurface::new(Some(&keep_in), &obstacle(), 0.1);
    // The shortest detour is about 15.2 long; an 8-unit budget rules
    // everything out.
    let ret = surface.find_path(point(0.0, 0.0), point(10.0, 10.0), 8.0, None);
    assert_eq!(ret, None);
}

#[test]
fn tries_budget_gives_up() {
    let keep_in = boxed(point(-100.0, -100.0), point(100.0, 100.0));
    let surface = PathFindingSurface::new(Some(&keep_in), &obstacle(), 0.1);
    let ret = surface.find_path(point(0.0, 0.0), point(10.0, 10.0), f64::INFINITY, Some(2));
    assert_eq!(ret, None);
    // And an untouched budget still finds the way.
    let ret = surface.find_path(point(0.0, 0.0), point(10.0, 10.0), f64::INFINITY, None);
    assert!(ret.is_some());
}

#[test]
fn path_properties_hold() {
    let keep_in = boxed(point(-100.0, -100.0), point(100.0, 100.0));
    let surface = PathFindingSurface::new(Some(&keep_in), &obstacle(), 0.1);
    let start = point(-20.0, 5.0);
    let goal = point(20.0, 5.0);
    let path = surface
        .find_path(start, goal, 100.0, None)
        .expect("a path exists");
    assert_eq!(*path.first().expect("non-empty"), start);
    assert_eq!(*path.last().expect("non-empty"), goal);
    let mut length = 0.0;
    for w in path.windows(2) {
        assert!(surface.in_surface(w[0], w[1]));
        length += w[0].distance(w[1]);
    }
    assert!(length <= 100.0);
}
