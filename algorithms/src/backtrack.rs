//! Plans which segments to mill twice.
//!
//! A vertex of odd degree forces a trail to start or end there, and
//! every extra trail costs a tool lift, a rapid move and a plunge.
//! Doubling a run of existing cuts joins two such vertices and removes
//! one rapid move at the price of milling that run again. The planner
//! inserts those doubled runs whenever the milling time lost is smaller
//! than the rapid time saved, scaled by the user's exchange rate.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use crate::eulerian::VertexDegree;
use crate::geom::{Point, ToolPath};

/// Speeds and overheads used to price a backtrack against a rapid move.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct MillingTimes {
    /// Cutting feed, board units per second.
    pub g1_speed: f64,
    /// Rapid feed, board units per second.
    pub g0_speed: f64,
    /// Time to lift the tool, seconds.
    pub up_time: f64,
    /// Time to plunge the tool, seconds.
    pub down_time: f64,
    /// Board units of unnecessary milling the user accepts per second of
    /// rapid time saved. Zero disables backtracking.
    pub in_per_sec: f64,
}

// f64 ordered totally so it can key the priority queue.
#[derive(Copy, Clone, PartialEq)]
struct Dist(f64);

impl Eq for Dist {}

impl PartialOrd for Dist {
    fn partial_cmp(&self, other: &Dist) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dist {
    fn cmp(&self, other: &Dist) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

struct Reached {
    distance: f64,
    // Edge taken to get here; None only on the start vertex.
    via: Option<ToolPath>,
}

// Dijkstra from `start` through existing edges to the nearest vertex
// that can absorb one more incoming edge. Candidates further away than
// the rapid move they would replace are pruned. Returns the length and
// the edges of the path in traversal order and orientation, or None.
fn find_nearest_vertex(
    graph: &BTreeMap<Point, Vec<ToolPath>>,
    start: Point,
    vertex_degrees: &BTreeMap<Point, VertexDegree>,
    times: &MillingTimes,
) -> Option<(f64, Vec<ToolPath>)> {
    if !vertex_degrees[&start].can_start() {
        // Starting from here isn't useful.
        return None;
    }
    let mut reached: BTreeMap<Point, Reached> = BTreeMap::new();
    reached.insert(start, Reached { distance: 0.0, via: None });
    let mut to_search: BinaryHeap<Reverse<(Dist, Point)>> = BinaryHeap::new();
    to_search.push(Reverse((Dist(0.0), start)));
    let mut done: BTreeSet<Point> = BTreeSet::new();

    while let Some(Reverse((_, current_vertex))) = to_search.pop() {
        if current_vertex != start
            && vertex_degrees
                .get(&current_vertex)
                .map(|d| d.can_end())
                .unwrap_or(false)
        {
            // Found the nearest useful end. Rebuild the edges in the
            // right order with the right orientation.
            let total = reached[&current_vertex].distance;
            let mut reverse_path: Vec<ToolPath> = Vec::new();
            let mut v = current_vertex;
            while v != start {
                let mut edge = reached[&v]
                    .via
                    .clone()
                    .expect("every non-start vertex was reached via an edge");
                if edge.reversible && v == edge.front() {
                    // Bidi edge walked against its stored direction.
                    edge.reverse();
                }
                v = edge.front();
                reverse_path.push(edge);
            }
            reverse_path.reverse();
            return Some((total, reverse_path));
        }
        if done.contains(&current_vertex) {
            continue;
        }
        for edge in &graph[&current_vertex] {
            let mut new_vertex = edge.back();
            if edge.reversible && current_vertex == new_vertex {
                // Reversible and this was the far end.
                new_vertex = edge.front();
            }
            if done.contains(&new_vertex) {
                continue;
            }
            let new_distance = reached[&current_vertex].distance + edge.length();
            let rapid = start.chebyshev_distance(new_vertex);
            let time_with_backtrack = new_distance / times.g1_speed;
            let time_without_backtrack = times.up_time + rapid / times.g0_speed + times.down_time;
            let time_saved = time_without_backtrack - time_with_backtrack;
            if time_saved < 0.0 || new_distance / time_saved > times.in_per_sec {
                continue; // Already too far away to be useful.
            }
            let better = reached
                .get(&new_vertex)
                .map(|r| r.distance > new_distance)
                .unwrap_or(true);
            if better {
                reached.insert(
                    new_vertex,
                    Reached { distance: new_distance, via: Some(edge.clone()) },
                );
            }
            to_search.push(Reverse((Dist(reached[&new_vertex].distance), new_vertex)));
        }
        done.insert(current_vertex);
    }
    None
}

/// Finds runs of existing paths that, if doubled so they can be milled
/// twice, decrease the total machining time. The output is just the
/// paths to add.
pub fn backtrack(paths: &[ToolPath], times: &MillingTimes) -> Vec<ToolPath> {
    if times.in_per_sec == 0.0 {
        return Vec::new();
    }
    // Vertex to the edges that meet there, and the in/out/bidi degrees.
    // The degrees are tracked separately because they change as
    // backtracks are applied.
    let mut graph: BTreeMap<Point, Vec<ToolPath>> = BTreeMap::new();
    let mut vertex_degrees: BTreeMap<Point, VertexDegree> = BTreeMap::new();
    for path in paths {
        if path.line.len() < 2 {
            continue;
        }
        graph.entry(path.front()).or_insert_with(Vec::new).push(path.clone());
        graph.entry(path.back()).or_insert_with(Vec::new);
        let front = vertex_degrees.entry(path.front()).or_insert_with(Default::default);
        if path.reversible {
            front.bidi += 1;
            vertex_degrees.entry(path.back()).or_insert_with(Default::default).bidi += 1;
            graph.get_mut(&path.back()).expect("just inserted").push(path.clone());
        } else {
            front.outgoing += 1;
            vertex_degrees.entry(path.back()).or_insert_with(Default::default).incoming += 1;
        }
    }

    let mut backtracks: Vec<ToolPath> = Vec::new();
    loop {
        // For each vertex that wants another outgoing edge, price the
        // cheapest doubled run to a vertex that wants an incoming one.
        let mut best_backtracks: Vec<(f64, Vec<ToolPath>)> = Vec::new();
        for &v in vertex_degrees.keys().collect::<Vec<_>>() {
            if let Some(found) = find_nearest_vertex(&graph, v, &vertex_degrees, times) {
                if found.0 > 0.0 {
                    best_backtracks.push(found);
                }
            }
        }
        // Shortest first; ties broken by the endpoints so the order is
        // stable across runs.
        best_backtracks.sort_by(|a, b| {
            Dist(a.0)
                .cmp(&Dist(b.0))
                .then_with(|| a.1[0].front().cmp(&b.1[0].front()))
                .then_with(|| {
                    a.1.last()
                        .expect("non-empty path")
                        .back()
                        .cmp(&b.1.last().expect("non-empty path").back())
                })
        });
        // Apply candidates best-first. The moment one is stale because
        // its endpoints' degrees have changed, restart the search.
        let mut applied_all = true;
        for (_, candidate) in &best_backtracks {
            let first = candidate.first().expect("non-empty path");
            let last = candidate.last().expect("non-empty path");
            if vertex_degrees[&first.front()].can_start()
                && vertex_degrees[&last.back()].can_end()
            {
                backtracks.extend(candidate.iter().cloned());
                if first.reversible {
                    vertex_degrees.get_mut(&first.front()).expect("known vertex").bidi += 1;
                } else {
                    vertex_degrees.get_mut(&first.front()).expect("known vertex").outgoing += 1;
                }
                if last.reversible {
                    vertex_degrees.get_mut(&last.back()).expect("known vertex").bidi += 1;
                } else {
                    vertex_degrees.get_mut(&last.back()).expect("known vertex").incoming += 1;
                }
            } else {
                applied_all = false;
                break;
            }
        }
        if applied_all {
            return backtracks;
        }
    }
}
