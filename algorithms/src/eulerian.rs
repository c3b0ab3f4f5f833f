//! Minimal trail covers of mixed graphs.
//!
//! Finds a minimal number of trails that cover every input edge exactly
//! once. Edges are whole paths: an input line string is traversed in one
//! piece, its interior vertices carried along. Directed paths are
//! traversed in their stored direction, reversible ones in whichever
//! direction the walk needs.
//!
//! For a mixed graph the number of trails equals the number of vertices
//! that have an excess of mandatory starts (or ends), divided by two,
//! but never less than one per connected component with edges.

use std::collections::BTreeMap;
use std::hash::Hash;

use crate::disjoint_set::DisjointSet;
use crate::geom::ToolPath;
use crate::segmentize::segmentize_paths;

/// Must a vertex with these edge counts start a trail?
///
/// The argument order is (outgoing, incoming, bidirectional).
pub fn must_start_helper(out_edges: usize, in_edges: usize, bidi_edges: usize) -> bool {
    if out_edges > in_edges + bidi_edges {
        // Even if every bidi edge comes in, there are out edges to spare,
        // so some trail must start here.
        return true;
    }
    if in_edges > out_edges + bidi_edges {
        return false;
    }
    // By this point |out - in| <= bidi, so the bidi edges can balance the
    // directed ones; a start is only forced when the total degree is odd.
    (out_edges + in_edges + bidi_edges) % 2 == 1
}

/// Edge counts at one vertex of a mixed graph.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexDegree {
    pub incoming: usize,
    pub outgoing: usize,
    pub bidi: usize,
}

impl VertexDegree {
    /// True if an edge pointing into here would decrease the number of
    /// trails needed.
    pub fn can_end(&self) -> bool {
        if self.outgoing > self.incoming + self.bidi {
            // More out trails than all the possible in trails, so this
            // must be a start of some trail.
            return true;
        }
        if self.incoming > self.outgoing + self.bidi {
            // Already too many trails inward. More would be worse.
            return false;
        }
        (self.bidi + self.outgoing + self.incoming) % 2 == 1
    }

    /// True if an edge pointing out of here would decrease the number of
    /// trails needed.
    pub fn can_start(&self) -> bool {
        if self.outgoing > self.incoming + self.bidi {
            return false;
        }
        if self.incoming > self.outgoing + self.bidi {
            // Too many inward trails; another outward one helps.
            return true;
        }
        (self.bidi + self.outgoing + self.incoming) % 2 == 1
    }

    /// Must a trail start at a vertex with these counts?
    pub fn must_start(&self) -> bool {
        must_start_helper(self.outgoing, self.incoming, self.bidi)
    }
}

struct Edge<V> {
    vertices: Vec<V>,
    bidi: bool,
}

struct TrailBuilder<V: Copy + Eq + Ord + Hash> {
    edges: Vec<Edge<V>>,
    // Edge indices usable from a vertex: directed edges at their front,
    // reversible edges at both ends.
    edges_at: BTreeMap<V, Vec<usize>>,
    degrees: BTreeMap<V, VertexDegree>,
    visited: Vec<bool>,
}

impl<V: Copy + Eq + Ord + Hash> TrailBuilder<V> {
    fn new(paths: &[(Vec<V>, bool)]) -> TrailBuilder<V> {
        let edges: Vec<Edge<V>> = paths
            .iter()
            .filter(|(p, _)| p.len() >= 2)
            .map(|(p, bidi)| Edge { vertices: p.clone(), bidi: *bidi })
            .collect();
        let mut edges_at: BTreeMap<V, Vec<usize>> = BTreeMap::new();
        let mut degrees: BTreeMap<V, VertexDegree> = BTreeMap::new();
        for (i, e) in edges.iter().enumerate() {
            let front = e.vertices[0];
            let back = *e.vertices.last().expect("non-empty edge");
            edges_at.entry(front).or_insert_with(Vec::new).push(i);
            edges_at.entry(back).or_insert_with(Vec::new);
            let _ = degrees.entry(front).or_insert_with(Default::default);
            let _ = degrees.entry(back).or_insert_with(Default::default);
            if e.bidi {
                edges_at.get_mut(&back).expect("just inserted").push(i);
                degrees.get_mut(&front).expect("just inserted").bidi += 1;
                degrees.get_mut(&back).expect("just inserted").bidi += 1;
            } else {
                degrees.get_mut(&front).expect("just inserted").outgoing += 1;
                degrees.get_mut(&back).expect("just inserted").incoming += 1;
            }
        }
        let visited = vec![false; edges.len()];
        TrailBuilder { edges, edges_at, degrees, visited }
    }

    fn next_unused_edge(&self, v: V) -> Option<usize> {
        self.edges_at
            .get(&v)?
            .iter()
            .copied()
            .find(|&i| !self.visited[i])
    }

    // Consumes edge `i` leaving from `from` and returns its vertex run
    // oriented accordingly.
    fn take_edge(&mut self, i: usize, from: V) -> Vec<V> {
        self.visited[i] = true;
        let front = self.edges[i].vertices[0];
        let back = *self.edges[i].vertices.last().expect("non-empty edge");
        if self.edges[i].bidi {
            self.degrees.get_mut(&front).expect("known vertex").bidi -= 1;
            self.degrees.get_mut(&back).expect("known vertex").bidi -= 1;
            if from == front {
                self.edges[i].vertices.clone()
            } else {
                let mut reversed = self.edges[i].vertices.clone();
                reversed.reverse();
                reversed
            }
        } else {
            self.degrees.get_mut(&front).expect("known vertex").outgoing -= 1;
            self.degrees.get_mut(&back).expect("known vertex").incoming -= 1;
            self.edges[i].vertices.clone()
        }
    }

    // Walks greedily from `start` until no unused edge leaves the
    // current vertex. The trail is reversible iff every consumed edge
    // was.
    fn walk(&mut self, start: V) -> (Vec<V>, bool) {
        let mut trail = vec![start];
        let mut reversible = true;
        let mut current = start;
        while let Some(i) = self.next_unused_edge(current) {
            reversible &= self.edges[i].bidi;
            let run = self.take_edge(i, current);
            trail.extend(run[1..].iter().copied());
            current = *trail.last().expect("non-empty trail");
        }
        (trail, reversible)
    }
}

/// Covers every input path with a minimal number of trails.
///
/// Input paths with fewer than two vertices are discarded. Each returned
/// trail is reversible iff all the paths it consumed were.
pub fn get_eulerian_paths<V>(paths: &[(Vec<V>, bool)]) -> Vec<(Vec<V>, bool)>
where
    V: Copy + Eq + Ord + Hash,
{
    let mut builder = TrailBuilder::new(paths);
    let vertices: Vec<V> = builder.degrees.keys().copied().collect();

    // Connected components of the input, used to scope loop splicing.
    let mut components: DisjointSet<V> = DisjointSet::new();
    for e in &builder.edges {
        components.join(&e.vertices[0], e.vertices.last().expect("non-empty edge"));
    }

    // Phase 1: trails from vertices that must start one. Walking changes
    // the degrees, so re-test after every trail.
    let mut trails: Vec<(Vec<V>, bool)> = Vec::new();
    for &v in &vertices {
        while builder.degrees[&v].must_start() {
            if builder.next_unused_edge(v).is_none() {
                break;
            }
            trails.push(builder.walk(v));
        }
    }

    // Phase 2: what remains is balanced, so walks close into loops.
    let mut loops: Vec<(Vec<V>, bool)> = Vec::new();
    for &v in &vertices {
        while builder.next_unused_edge(v).is_some() {
            loops.push(builder.walk(v));
        }
    }

    // Splice each loop into a trail that passes through one of its
    // vertices. A loop that fits nowhere becomes its own trail, which
    // may in turn absorb later loops.
    'remaining: while !loops.is_empty() {
        for li in 0..loops.len() {
            if loops[li].0.first() != loops[li].0.last() {
                // A directed imbalance stranded this walk; keep it as is.
                let lp = loops.remove(li);
                trails.push(lp);
                continue 'remaining;
            }
            let mut target = None;
            for (ti, trail) in trails.iter().enumerate() {
                if !components.same_set(&trail.0[0], &loops[li].0[0]) {
                    continue;
                }
                if let Some(positions) = find_shared_vertex(&trail.0, &loops[li].0) {
                    target = Some((ti, positions));
                    break;
                }
            }
            if let Some((ti, (tpos, lpos))) = target {
                let (lp, lp_reversible) = loops.remove(li);
                let (trail, trail_reversible) = &mut trails[ti];
                let mut rotated: Vec<V> = Vec::with_capacity(lp.len());
                rotated.extend(lp[lpos..lp.len() - 1].iter().copied());
                rotated.extend(lp[..=lpos].iter().copied());
                let tail: Vec<V> = trail.drain(tpos + 1..).collect();
                trail.extend(rotated[1..].iter().copied());
                trail.extend(tail);
                *trail_reversible = *trail_reversible && lp_reversible;
                continue 'remaining;
            }
        }
        // No loop touches any trail; promote the first one.
        let lp = loops.remove(0);
        trails.push(lp);
    }

    trails
}

fn find_shared_vertex<V: Copy + Eq + Ord>(trail: &[V], lp: &[V]) -> Option<(usize, usize)> {
    use std::collections::BTreeMap;
    let mut loop_positions: BTreeMap<V, usize> = BTreeMap::new();
    for (i, v) in lp.iter().enumerate().take(lp.len() - 1) {
        loop_positions.entry(*v).or_insert(i);
    }
    for (tpos, v) in trail.iter().enumerate() {
        if let Some(&lpos) = loop_positions.get(v) {
            return Some((tpos, lpos));
        }
    }
    None
}

/// Returns a minimal number of tool paths that include all the milling
/// in the original tool paths, each segment traversed exactly once.
///
/// Near points are merged and the paths split at every crossing first,
/// so trails can turn wherever cuts touch.
pub fn make_eulerian_paths(toolpaths: &[ToolPath]) -> Vec<ToolPath> {
    let segments = segmentize_paths(toolpaths);
    let as_graph: Vec<(Vec<crate::geom::Point>, bool)> = segments
        .into_iter()
        .map(|p| (p.line, p.reversible))
        .collect();
    get_eulerian_paths(&as_graph)
        .into_iter()
        .map(|(line, reversible)| ToolPath::new(line, reversible))
        .collect()
}
