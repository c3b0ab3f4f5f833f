//! Plans the tabs that keep a cut-out board attached to its stock.
//!
//! A bridge is a short stretch of the outline where the tool lifts to a
//! configured height instead of cutting through. The planner picks the
//! longest straight segments of the outline and splits each of them at
//! two points symmetric about the segment midpoint, one bridge width
//! apart; the emitter raises the tool between those vertices.

use log::warn;
use thiserror::Error;

use crate::geom::{Point, Ring};

/// The outline has no segment long enough to host a single bridge.
#[derive(Debug, Error)]
#[error("no outline segment is longer than the requested bridge width")]
pub struct NoBridgesError;

fn intermediate_point(p0: Point, p1: Point, position: f64) -> Point {
    Point {
        x: p0.x + (p1.x - p0.x) * position,
        y: p0.y + (p1.y - p0.y) * position,
    }
}

// The `number` longest segments of the path, as (start index, length),
// skipping segments shorter than `length`.
fn find_longest_segments(
    path: &[Point],
    number: usize,
    length: f64,
) -> Result<Vec<(usize, f64)>, NoBridgesError> {
    let mut distances: Vec<(usize, f64)> = path
        .windows(2)
        .enumerate()
        .map(|(i, w)| (i, w[0].distance(w[1])))
        .collect();
    let mut output = Vec::new();
    for _ in 0..number {
        let best = match distances
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)))
        {
            Some((i, _)) => i,
            None => break,
        };
        if distances[best].1 < length {
            if output.is_empty() {
                return Err(NoBridgesError);
            }
            break; // Use the bridges that fit.
        }
        output.push(distances.remove(best));
    }
    if output.len() < number {
        warn!(
            "only {} of {} bridges fit on the outline",
            output.len(),
            number
        );
    }
    Ok(output)
}

// Splits the chosen segments and returns the index of each bridge's
// first inserted vertex.
fn insert_bridges(path: &mut Ring, mut chosen: Vec<(usize, f64)>, length: f64) -> Vec<usize> {
    let mut output = Vec::new();
    path.reserve(chosen.len() * 2);
    chosen.sort_by(|a, b| a.0.cmp(&b.0));
    for (i, (index, segment_length)) in chosen.into_iter().enumerate() {
        // Every insertion shifts the following indices by two.
        let index = index + 2 * i;
        let half = (length / segment_length) / 2.0;
        let a = intermediate_point(path[index], path[index + 1], 0.5 - half);
        let b = intermediate_point(path[index], path[index + 1], 0.5 + half);
        path.splice(index + 1..index + 1, vec![a, b]);
        output.push(index + 1);
    }
    output
}

/// Inserts up to `number` bridges of width `length` into the outline.
///
/// Returns the indices of the vertices where each bridge starts. When
/// fewer than `number` segments are long enough, the ones that fit are
/// used and a warning is logged; when none fit at all, that's an error.
pub fn make_bridges(
    path: &mut Ring,
    number: usize,
    length: f64,
) -> Result<Vec<usize>, NoBridgesError> {
    let chosen = find_longest_segments(path, number, length)?;
    Ok(insert_bridges(path, chosen, length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;

    #[test]
    fn four_bridges_on_a_square() {
        let mut path = vec![
            point(0.0, 0.0),
            point(0.0, 10.0),
            point(10.0, 10.0),
            point(10.0, 0.0),
            point(0.0, 0.0),
        ];
        let ret = make_bridges(&mut path, 4, 2.0).unwrap();
        assert_eq!(ret, vec![1, 4, 7, 10]);
        assert_eq!(
            path,
            vec![
                point(0.0, 0.0),
                point(0.0, 4.0),
                point(0.0, 6.0),
                point(0.0, 10.0),
                point(4.0, 10.0),
                point(6.0, 10.0),
                point(10.0, 10.0),
                point(10.0, 6.0),
                point(10.0, 4.0),
                point(10.0, 0.0),
                point(6.0, 0.0),
                point(4.0, 0.0),
                point(0.0, 0.0),
            ]
        );
    }

    #[test]
    fn two_bridges_only_fit_the_long_sides() {
        let mut path = vec![
            point(0.0, 0.0),
            point(0.0, 1.0),
            point(10.0, 1.0),
            point(10.0, 0.0),
            point(0.0, 0.0),
        ];
        let ret = make_bridges(&mut path, 2, 2.0).unwrap();
        assert_eq!(ret, vec![2, 6]);
        assert_eq!(
            path,
            vec![
                point(0.0, 0.0),
                point(0.0, 1.0),
                point(4.0, 1.0),
                point(6.0, 1.0),
                point(10.0, 1.0),
                point(10.0, 0.0),
                point(6.0, 0.0),
                point(4.0, 0.0),
                point(0.0, 0.0),
            ]
        );
    }

    #[test]
    fn short_outline_gets_fewer_bridges() {
        let mut path = vec![
            point(0.0, 0.0),
            point(0.0, 1.0),
            point(10.0, 1.0),
            point(10.0, 0.0),
            point(0.0, 0.0),
        ];
        // Only the two 10-unit sides can host a 3-unit bridge.
        let ret = make_bridges(&mut path, 4, 3.0).unwrap();
        assert_eq!(ret.len(), 2);
    }

    #[test]
    fn hopeless_outline_is_an_error() {
        let mut path = vec![
            point(0.0, 0.0),
            point(0.0, 1.0),
            point(1.0, 1.0),
            point(1.0, 0.0),
            point(0.0, 0.0),
        ];
        assert!(make_bridges(&mut path, 2, 5.0).is_err());
    }
}
