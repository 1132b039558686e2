//! Finding every occurrence of a user-supplied pattern in a host graph.
//!
//! The pattern's vertices are visited breadth-first from vertex 0; each
//! pattern edge becomes one growth step that extends every partial embedding
//! by a label- and orientation-compatible host edge. Survivors are verified
//! against the pattern with the inexact matcher, which discards embeddings
//! whose shape drifted within the threshold.

use std::collections::VecDeque;
use std::rc::Rc;

use fixedbitset::FixedBitSet;
use log::warn;

use crate::graph::{EdgeId, Graph, VertexId};
use crate::instance::{Instance, VertexMap};
use crate::label::LabelTable;
use crate::matcher;

/// One growth step: pattern edge `edge` from the already-embedded local
/// `known` to local `other`, which is embedded by this step iff `fresh`.
#[derive(Debug, Clone, Copy)]
struct Step {
    edge: EdgeId,
    known: usize,
    other: usize,
    fresh: bool,
}

/// Partial embedding: per-local host vertex, plus the host edges used.
#[derive(Debug, Clone)]
struct Partial {
    assigned: Vec<Option<VertexId>>,
    edges: Vec<EdgeId>,
}

/// All occurrences of `pattern` in `host` within the relative `threshold`.
/// With `unique` the result is reduced to a mutually non-overlapping subset,
/// greedily in discovery order.
pub fn find_instances(
    pattern: &Graph,
    host: &Graph,
    labels: &LabelTable,
    threshold: f64,
    unique: bool,
) -> Vec<Rc<Instance>> {
    let n = pattern.vertex_count();
    if n == 0 {
        return Vec::new();
    }

    // Breadth-first growth plan over the pattern's edges.
    let mut visited = FixedBitSet::with_capacity(n);
    let mut taken = FixedBitSet::with_capacity(pattern.edge_count());
    let mut plan = Vec::with_capacity(pattern.edge_count());
    let mut queue = VecDeque::from([0usize]);
    visited.insert(0);
    while let Some(u) = queue.pop_front() {
        for &e in &pattern.vertices[u].edges {
            if taken.contains(e) {
                continue;
            }
            taken.insert(e);
            let w = pattern.edges[e].other_endpoint(u);
            let fresh = !visited.contains(w);
            plan.push(Step {
                edge: e,
                known: u,
                other: w,
                fresh,
            });
            if fresh {
                visited.insert(w);
                queue.push_back(w);
            }
        }
    }
    if visited.count_ones(..) < n {
        warn!("predefined pattern is disconnected; no instances collected");
        return Vec::new();
    }

    // Seed embeddings at every host vertex carrying the seed label.
    let seed_label = pattern.vertices[0].label;
    let mut partials: Vec<Partial> = host
        .vertices
        .iter()
        .enumerate()
        .filter(|(_, vertex)| vertex.label == seed_label)
        .map(|(v, _)| {
            let mut assigned = vec![None; n];
            assigned[0] = Some(v);
            Partial {
                assigned,
                edges: Vec::new(),
            }
        })
        .collect();

    for step in &plan {
        let pedge = &pattern.edges[step.edge];
        let mut next = Vec::new();
        for partial in &partials {
            let hv = partial.assigned[step.known].expect("known local embedded");
            for &he in &host.vertices[hv].edges {
                let hedge = &host.edges[he];
                if hedge.label != pedge.label || hedge.directed != pedge.directed {
                    continue;
                }
                if partial.edges.binary_search(&he).is_ok() {
                    continue;
                }
                if hedge.directed && !pedge.is_loop() {
                    let pattern_forward = pedge.source == step.known;
                    let host_forward = hedge.source == hv;
                    if pattern_forward != host_forward {
                        continue;
                    }
                }
                let hw = hedge.other_endpoint(hv);
                if step.fresh {
                    if host.vertices[hw].label != pattern.vertices[step.other].label {
                        continue;
                    }
                    if partial.assigned.iter().any(|&a| a == Some(hw)) {
                        continue;
                    }
                    let mut grown = partial.clone();
                    grown.assigned[step.other] = Some(hw);
                    insert_sorted(&mut grown.edges, he);
                    next.push(grown);
                } else {
                    if partial.assigned[step.other] != Some(hw) {
                        continue;
                    }
                    let mut grown = partial.clone();
                    insert_sorted(&mut grown.edges, he);
                    next.push(grown);
                }
            }
        }
        partials = next;
    }

    // Materialise, dedupe automorphic repeats, verify with the matcher.
    let mut out: Vec<Rc<Instance>> = Vec::new();
    for partial in partials {
        let mapping: Vec<VertexMap> = partial
            .assigned
            .iter()
            .enumerate()
            .map(|(local, a)| VertexMap {
                sub_vertex: local,
                host_vertex: a.expect("complete embedding"),
            })
            .collect();
        let mut vertices: Vec<VertexId> = mapping.iter().map(|m| m.host_vertex).collect();
        vertices.sort_unstable();
        let inst = Instance {
            vertices,
            edges: partial.edges,
            mapping,
            ..Instance::single_vertex(0)
        };
        if out.iter().any(|seen| seen.same_structure(&inst)) {
            continue;
        }
        let embedded = inst.to_graph(host);
        let bound = matcher::match_bound(threshold, pattern, &embedded);
        if !matcher::inexact_match(pattern, &embedded, labels, bound, false).matched {
            continue;
        }
        out.push(Rc::new(inst));
    }

    if unique {
        crate::compress::nonoverlapping(&out)
    } else {
        out
    }
}

fn insert_sorted(list: &mut Vec<EdgeId>, e: EdgeId) {
    if let Err(pos) = list.binary_search(&e) {
        list.insert(pos, e);
    }
}
