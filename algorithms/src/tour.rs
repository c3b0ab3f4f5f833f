//! Orders tool paths to minimise rapid travel.
//!
//! Rapid moves cost Chebyshev distance, `max(|dx|, |dy|)`, because the
//! machine's axes travel independently at the same top speed. Both
//! optimisers preserve the multiset of paths; they only reorder paths
//! and reverse the reversible ones.

use crate::geom::{Point, ToolPath};

/// Anything with two endpoints that a tour can visit.
pub trait Tourable {
    fn front(&self) -> Point;
    fn back(&self) -> Point;
    /// May the tour enter at the back and leave at the front?
    fn reversible(&self) -> bool {
        true
    }
    fn reverse(&mut self);
}

impl Tourable for Point {
    fn front(&self) -> Point {
        *self
    }
    fn back(&self) -> Point {
        *self
    }
    fn reverse(&mut self) {}
}

impl Tourable for ToolPath {
    fn front(&self) -> Point {
        ToolPath::front(self)
    }
    fn back(&self) -> Point {
        ToolPath::back(self)
    }
    fn reversible(&self) -> bool {
        self.reversible
    }
    fn reverse(&mut self) {
        ToolPath::reverse(self);
    }
}

fn rapid(a: Point, b: Point) -> f64 {
    a.chebyshev_distance(b)
}

fn tour_length<T: Tourable>(path: &[T], starting_point: Point) -> f64 {
    let mut total = 0.0;
    let mut current = starting_point;
    for item in path {
        total += rapid(current, item.front());
        current = item.back();
    }
    total
}

/// Greedy nearest-neighbour ordering from `starting_point`.
///
/// At each step the closest remaining endpoint is chosen, the back one
/// only for reversible items (which are then flipped). The new order is
/// kept only when it is strictly shorter than the input order.
pub fn nearest_neighbour<T: Tourable + Clone>(path: &mut Vec<T>, starting_point: Point) {
    if path.is_empty() {
        return;
    }
    let original_length = tour_length(path, starting_point);

    let mut remaining: Vec<T> = path.clone();
    let mut new_path: Vec<T> = Vec::with_capacity(path.len());
    let mut new_length = 0.0;
    let mut current = starting_point;
    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_distance = rapid(current, remaining[0].front());
        let mut best_flipped = false;
        for (i, item) in remaining.iter().enumerate() {
            let d = rapid(current, item.front());
            if d < best_distance {
                best_distance = d;
                best = i;
                best_flipped = false;
            }
            if item.reversible() {
                let d = rapid(current, item.back());
                if d < best_distance {
                    best_distance = d;
                    best = i;
                    best_flipped = true;
                }
            }
        }
        let mut chosen = remaining.remove(best);
        if best_flipped {
            chosen.reverse();
        }
        new_length += best_distance;
        current = chosen.back();
        new_path.push(chosen);
    }

    if new_length < original_length {
        *path = new_path;
    }
}

/// Nearest-neighbour followed by 2-opt improvement sweeps.
///
/// A swap reverses the slice between two slots (flipping each member),
/// so it is only tried when every path inside the slice is reversible.
/// Sweeps repeat until one full pass finds no improvement.
pub fn tsp_2opt<T: Tourable + Clone>(path: &mut Vec<T>, starting_point: Point) {
    nearest_neighbour(path, starting_point);
    let n = path.len();
    if n < 3 {
        return;
    }
    let mut found_one = true;
    while found_one {
        found_one = false;
        for a in 0..n - 2 {
            let b = a + 1;
            for c in b + 1..n - 1 {
                let d = c + 1;
                if path[b..=c].iter().any(|p| !p.reversible()) {
                    continue;
                }
                let current = rapid(path[a].back(), path[b].front())
                    + rapid(path[c].back(), path[d].front());
                let swapped = rapid(path[a].back(), path[c].back())
                    + rapid(path[b].front(), path[d].front());
                if current > swapped {
                    path[b..=c].reverse();
                    for item in path[b..=c].iter_mut() {
                        item.reverse();
                    }
                    found_one = true;
                }
            }
        }
    }
}

/// Orders tool paths for minimal rapid travel from `start`.
pub fn optimise_order(paths: &[ToolPath], start: Point, use_2opt: bool) -> Vec<ToolPath> {
    let mut ordered = paths.to_vec();
    if use_2opt {
        tsp_2opt(&mut ordered, start);
    } else {
        nearest_neighbour(&mut ordered, start);
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;

    fn segment(x0: f64, y0: f64, x1: f64, y1: f64, reversible: bool) -> ToolPath {
        ToolPath::new(vec![point(x0, y0), point(x1, y1)], reversible)
    }

    fn multiset_of_endpoints(paths: &[ToolPath]) -> Vec<(Point, Point)> {
        let mut endpoints: Vec<(Point, Point)> = paths
            .iter()
            .map(|p| {
                let (a, b) = (p.front(), p.back());
                if a <= b {
                    (a, b)
                } else {
                    (b, a)
                }
            })
            .collect();
        endpoints.sort();
        endpoints
    }

    #[test]
    fn nearest_neighbour_improves_shuffled_row() {
        let mut paths = vec![
            segment(8.0, 0.0, 9.0, 0.0, true),
            segment(0.0, 0.0, 1.0, 0.0, true),
            segment(4.0, 0.0, 5.0, 0.0, true),
        ];
        let before = multiset_of_endpoints(&paths);
        let before_length = tour_length(&paths, point(0.0, 0.0));
        nearest_neighbour(&mut paths, point(0.0, 0.0));
        assert_eq!(multiset_of_endpoints(&paths), before);
        assert!(tour_length(&paths, point(0.0, 0.0)) < before_length);
        assert_eq!(paths[0].front(), point(0.0, 0.0));
    }

    #[test]
    fn nearest_neighbour_reverses_to_reach_closer_end() {
        let mut paths = vec![segment(5.0, 0.0, 1.0, 0.0, true)];
        nearest_neighbour(&mut paths, point(0.0, 0.0));
        assert_eq!(paths[0].front(), point(1.0, 0.0));
    }

    #[test]
    fn nearest_neighbour_keeps_direction_of_directed_paths() {
        let mut paths = vec![
            segment(5.0, 0.0, 1.0, 0.0, false),
            segment(1.0, 0.0, 2.0, 0.0, false),
        ];
        nearest_neighbour(&mut paths, point(0.0, 0.0));
        // The directed path may move earlier or later but never flip.
        assert_eq!(paths[0].line, vec![point(1.0, 0.0), point(2.0, 0.0)]);
        assert_eq!(paths[1].line, vec![point(5.0, 0.0), point(1.0, 0.0)]);
    }

    #[test]
    fn two_opt_untangles_a_crossing() {
        let mut paths = vec![
            segment(0.0, 0.0, 1.0, 0.0, true),
            segment(10.0, 0.0, 11.0, 0.0, true),
            segment(2.0, 0.0, 3.0, 0.0, true),
            segment(12.0, 0.0, 13.0, 0.0, true),
        ];
        let before = multiset_of_endpoints(&paths);
        let before_length = tour_length(&paths, point(0.0, 0.0));
        tsp_2opt(&mut paths, point(0.0, 0.0));
        assert_eq!(multiset_of_endpoints(&paths), before);
        assert!(tour_length(&paths, point(0.0, 0.0)) <= before_length);
    }

    #[test]
    fn two_opt_never_worsens() {
        let mut paths = vec![
            segment(0.0, 0.0, 1.0, 1.0, true),
            segment(1.0, 1.0, 2.0, 0.0, true),
            segment(2.0, 0.0, 3.0, 1.0, true),
        ];
        let before_length = tour_length(&paths, point(0.0, 0.0));
        tsp_2opt(&mut paths, point(0.0, 0.0));
        assert!(tour_length(&paths, point(0.0, 0.0)) <= before_length);
    }

    #[test]
    fn ordering_points_visits_near_ones_first() {
        let mut holes = vec![point(9.0, 9.0), point(1.0, 1.0), point(5.0, 5.0)];
        nearest_neighbour(&mut holes, point(0.0, 0.0));
        assert_eq!(holes, vec![point(1.0, 1.0), point(5.0, 5.0), point(9.0, 9.0)]);
    }
}
