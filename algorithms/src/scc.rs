//! Strongly-connected components of a directed graph (Tarjan).

use std::collections::BTreeMap;

struct Tarjan<'l, V: Ord + Copy> {
    graph: &'l BTreeMap<V, Vec<V>>,
    index: usize,
    stack: Vec<V>,
    indices: BTreeMap<V, usize>,
    low_link: BTreeMap<V, usize>,
    on_stack: BTreeMap<V, bool>,
    result: Vec<Vec<V>>,
}

impl<'l, V: Ord + Copy> Tarjan<'l, V> {
    fn strong_connect(&mut self, v: V) {
        self.indices.insert(v, self.index);
        self.low_link.insert(v, self.index);
        self.index += 1;
        self.stack.push(v);
        self.on_stack.insert(v, true);

        if let Some(successors) = self.graph.get(&v) {
            for &w in successors {
                if !self.indices.contains_key(&w) {
                    self.strong_connect(w);
                    let low_w = self.low_link[&w];
                    let low_v = self.low_link[&v];
                    self.low_link.insert(v, low_v.min(low_w));
                } else if self.on_stack.get(&w).copied().unwrap_or(false) {
                    // w is on the stack and hence in the current
                    // component. Using w's index rather than its low
                    // link is deliberate, per the original paper.
                    let idx_w = self.indices[&w];
                    let low_v = self.low_link[&v];
                    self.low_link.insert(v, low_v.min(idx_w));
                }
            }
        }

        if self.low_link[&v] == self.indices[&v] {
            // v roots a component; pop the stack down to it.
            let mut component = Vec::new();
            loop {
                let w = self.stack.pop().expect("root still on stack");
                self.on_stack.insert(w, false);
                component.push(w);
                if w == v {
                    break;
                }
            }
            self.result.push(component);
        }
    }
}

/// All strongly-connected components of `graph`, in deterministic order.
///
/// Vertices appearing only as edge targets are visited too. Each
/// component lists its vertices in reverse discovery order, the root
/// last.
pub fn strongly_connected_components<V: Ord + Copy>(graph: &BTreeMap<V, Vec<V>>) -> Vec<Vec<V>> {
    let mut vertices: Vec<V> = graph.keys().copied().collect();
    for targets in graph.values() {
        vertices.extend(targets.iter().copied());
    }
    vertices.sort();
    vertices.dedup();

    let mut tarjan = Tarjan {
        graph,
        index: 0,
        stack: Vec::new(),
        indices: BTreeMap::new(),
        low_link: BTreeMap::new(),
        on_stack: BTreeMap::new(),
        result: Vec::new(),
    };
    for v in vertices {
        if !tarjan.indices.contains_key(&v) {
            tarjan.strong_connect(v);
        }
    }
    tarjan.result
}
