use crate::geom::{point, Point, ToolPath};
use crate::trim_paths::trim_paths;

fn path(points: &[(f64, f64)], reversible: bool) -> ToolPath {
    ToolPath::new(
        points.iter().map(|&(x, y)| point(x, y)).collect(),
        reversible,
    )
}

fn lines(paths: &[ToolPath]) -> Vec<Vec<Point>> {
    paths.iter().map(|p| p.line.clone()).collect()
}

#[test]
fn empty() {
    let mut paths: Vec<ToolPath> = Vec::new();
    trim_paths(&mut paths, &[]);
    assert!(paths.is_empty());
}

#[test]
fn empty_path_without_backtracks_is_untouched() {
    let mut paths = vec![ToolPath::new(Vec::new(), true)];
    trim_paths(&mut paths, &[]);
    assert_eq!(paths.len(), 1);
}

#[test]
fn trim_start() {
    let mut paths = vec![path(&[(1.0, 2.0), (3.0, 4.0), (5.0, 6.0), (7.0, 8.0)], true)];
    let backtracks = vec![path(&[(1.0, 2.0), (3.0, 4.0)], true)];
    trim_paths(&mut paths, &backtracks);
    assert_eq!(
        lines(&paths),
        vec![vec![point(3.0, 4.0), point(5.0, 6.0), point(7.0, 8.0)]]
    );
}

#[test]
fn trim_end() {
    let mut paths = vec![path(&[(1.0, 2.0), (3.0, 4.0), (5.0, 6.0), (7.0, 8.0)], true)];
    let backtracks = vec![
        path(&[(3.0, 4.0), (5.0, 6.0)], true),
        path(&[(5.0, 6.0), (7.0, 8.0)], true),
    ];
    trim_paths(&mut paths, &backtracks);
    assert_eq!(lines(&paths), vec![vec![point(1.0, 2.0), point(3.0, 4.0)]]);
}

#[test]
fn trim_both() {
    let mut paths = vec![path(&[(1.0, 2.0), (3.0, 4.0), (5.0, 6.0), (7.0, 8.0)], true)];
    let backtracks = vec![
        path(&[(1.0, 2.0), (3.0, 4.0)], true),
        path(&[(5.0, 6.0), (7.0, 8.0)], true),
    ];
    trim_paths(&mut paths, &backtracks);
    assert_eq!(lines(&paths), vec![vec![point(3.0, 4.0), point(5.0, 6.0)]]);
}

#[test]
fn trim_repeated() {
    let mut paths = vec![path(
        &[(1.0, 2.0), (3.0, 4.0), (1.0, 2.0), (3.0, 4.0), (5.0, 6.0), (7.0, 8.0)],
        true,
    )];
    let backtracks = vec![
        path(&[(1.0, 2.0), (3.0, 4.0)], true),
        path(&[(1.0, 2.0), (3.0, 4.0)], true),
        path(&[(1.0, 2.0), (3.0, 4.0)], true),
    ];
    trim_paths(&mut paths, &backtracks);
    assert_eq!(
        lines(&paths),
        vec![vec![point(3.0, 4.0), point(5.0, 6.0), point(7.0, 8.0)]]
    );
}

#[test]
fn do_not_trim_non_repeated() {
    let mut paths = vec![path(
        &[(1.0, 2.0), (3.0, 4.0), (1.0, 2.0), (3.0, 4.0), (5.0, 6.0), (7.0, 8.0)],
        true,
    )];
    let backtracks = vec![
        path(&[(1.0, 2.0), (3.0, 4.0)], true),
        path(&[(1.0, 2.0), (3.0, 4.0)], true),
    ];
    trim_paths(&mut paths, &backtracks);
    assert_eq!(
        lines(&paths),
        vec![vec![point(1.0, 2.0), point(3.0, 4.0), point(5.0, 6.0), point(7.0, 8.0)]]
    );
}

#[test]
fn trim_prefer_directed() {
    let mut paths = vec![path(
        &[(1.0, 2.0), (3.0, 4.0), (1.0, 2.0), (3.0, 4.0), (5.0, 6.0), (7.0, 8.0)],
        true,
    )];
    let backtracks = vec![
        path(&[(1.0, 2.0), (3.0, 4.0)], false),
        path(&[(1.0, 2.0), (3.0, 4.0)], true),
    ];
    trim_paths(&mut paths, &backtracks);
    assert_eq!(
        lines(&paths),
        vec![vec![point(1.0, 2.0), point(3.0, 4.0), point(5.0, 6.0), point(7.0, 8.0)]]
    );
}

#[test]
fn trim_loop() {
    let mut paths = vec![path(
        &[
            (1.0, 2.0),
            (3.0, 4.0),
            (1.0, 2.0),
            (3.0, 4.0),
            (5.0, 6.0),
            (7.0, 8.0),
            (1.0, 2.0),
        ],
        true,
    )];
    let backtracks = vec![
        path(&[(1.0, 2.0), (3.0, 4.0)], true),
        path(&[(3.0, 4.0), (5.0, 6.0)], true),
    ];
    trim_paths(&mut paths, &backtracks);
    assert_eq!(
        lines(&paths),
        vec![vec![
            point(5.0, 6.0),
            point(7.0, 8.0),
            point(1.0, 2.0),
            point(3.0, 4.0),
            point(1.0, 2.0),
        ]]
    );
}

#[test]
fn trim_two_paths() {
    let mut paths = vec![
        path(
            &[(1.0, 2.0), (3.0, 4.0), (1.0, 2.0), (3.0, 4.0), (5.0, 6.0), (7.0, 8.0)],
            true,
        ),
        path(
            &[(1.0, 2.0), (3.0, 4.0), (1.0, 2.0), (3.0, 4.0), (5.0, 6.0), (7.0, 8.0)],
            true,
        ),
    ];
    let backtracks = vec![path(&[(1.0, 2.0), (3.0, 4.0)], true)];
    trim_paths(&mut paths, &backtracks);
    assert_eq!(
        lines(&paths),
        vec![
            vec![
                point(3.0, 4.0),
                point(1.0, 2.0),
                point(3.0, 4.0),
                point(5.0, 6.0),
                point(7.0, 8.0)
            ],
            vec![
                point(1.0, 2.0),
                point(3.0, 4.0),
                point(1.0, 2.0),
                point(3.0, 4.0),
                point(5.0, 6.0),
                point(7.0, 8.0)
            ],
        ]
    );
}

#[test]
fn directed_square_and_diagonal() {
    let mut paths = vec![
        path(&[(0.0, 0.0), (0.0, 5.0)], false),
        path(&[(0.0, 5.0), (5.0, 5.0)], false),
        path(&[(5.0, 5.0), (5.0, 0.0)], false),
        path(&[(5.0, 0.0), (0.0, 0.0)], false),
        path(&[(5.0, 5.0), (0.0, 0.0)], false),
        path(&[(0.0, 0.0), (0.0, 5.0)], false),
        path(&[(0.0, 5.0), (5.0, 5.0)], false),
    ];
    let backtracks = vec![
        path(&[(0.0, 0.0), (0.0, 5.0)], false),
        path(&[(0.0, 5.0), (5.0, 5.0)], false),
    ];
    trim_paths(&mut paths, &backtracks);
    assert_eq!(
        lines(&paths),
        vec![
            vec![point(5.0, 5.0), point(5.0, 0.0)],
            vec![point(5.0, 0.0), point(0.0, 0.0)],
            vec![point(5.0, 5.0), point(0.0, 0.0)],
            vec![point(0.0, 0.0), point(0.0, 5.0)],
            vec![point(0.0, 5.0), point(5.0, 5.0)],
        ]
    );
}
