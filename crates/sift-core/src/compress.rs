//! Graph compression: replace every instance of a substructure with a single
//! placeholder vertex.
//!
//! The compressed graph starts with one `SUB` vertex per instance, in
//! instance-list order, followed by the host vertices not covered by any
//! instance. Edges not fully inside an instance are copied with their
//! endpoints rewritten. When instances share host vertices, an undirected
//! `OVERLAP` edge joins each overlapping pair of placeholders once, external
//! edges touching a shared vertex are duplicated toward every extra
//! containing instance, and edges lying inside one instance but touching a
//! shared vertex give rise to placeholder-to-placeholder edges and self-loops.

use std::rc::Rc;

use crate::graph::{EdgeId, Graph, VertexId};
use crate::instance::Instance;
use crate::label::LabelId;

/// Greedy non-overlap filter: keep each instance unless it shares a vertex
/// with an already-kept one. List order decides, so the result is
/// deterministic.
pub fn nonoverlapping(instances: &[Rc<Instance>]) -> Vec<Rc<Instance>> {
    let mut kept: Vec<Rc<Instance>> = Vec::with_capacity(instances.len());
    for inst in instances {
        if !kept.iter().any(|k| k.overlaps(inst)) {
            kept.push(Rc::clone(inst));
        }
    }
    kept
}

/// Number of external-edge attachment points across `instances`: one per
/// (instance vertex, incident edge outside the instance) pair. Compression
/// erases which internal vertex an external edge attached to; the evaluator
/// charges `lg |V(S)|` bits for each of these.
pub fn external_attachments(host: &Graph, instances: &[Rc<Instance>]) -> usize {
    let mut count = 0;
    for inst in instances {
        for &v in &inst.vertices {
            for &e in &host.vertices[v].edges {
                if inst.edges.binary_search(&e).is_err() {
                    count += 1;
                }
            }
        }
    }
    count
}

/// Size of the graph that compression would produce, without building it
/// when the instances are disjoint: `|V| + |E| − Σ unique covered V,E +
/// |instances|`. With overlapping instances the overlap and duplicate edges
/// are counted by running the rewrite.
pub fn compressed_size(host: &Graph, instances: &[Rc<Instance>], allow_overlap: bool) -> usize {
    let insts = if allow_overlap {
        instances.to_vec()
    } else {
        nonoverlapping(instances)
    };
    let any_overlap = insts
        .iter()
        .enumerate()
        .any(|(i, a)| insts[i + 1..].iter().any(|b| a.overlaps(b)));
    if !any_overlap {
        let covered_v: usize = insts.iter().map(|i| i.vertices.len()).sum();
        let covered_e: usize = insts.iter().map(|i| i.edges.len()).sum();
        return host.size() - covered_v - covered_e + insts.len();
    }
    let (graph, _) = compress_graph(host, &insts, 0, 0, true);
    graph.size()
}

/// Rewrite `host` by collapsing each instance to a placeholder vertex
/// labelled `sub_label`. Returns the new graph and whether any `OVERLAP`
/// edge (labelled `overlap_label`) was emitted.
///
/// Without `allow_overlap` the instance list is first reduced to a
/// non-overlapping subset, which keeps the rewrite a plain substitution.
/// Compressing by zero instances returns a copy of the host.
pub fn compress_graph(
    host: &Graph,
    instances: &[Rc<Instance>],
    sub_label: LabelId,
    overlap_label: LabelId,
    allow_overlap: bool,
) -> (Graph, bool) {
    let insts = if allow_overlap {
        instances.to_vec()
    } else {
        nonoverlapping(instances)
    };
    let k = insts.len();

    // Which instances contain each vertex / own each edge, ascending.
    let mut member: Vec<Vec<usize>> = vec![Vec::new(); host.vertex_count()];
    let mut owner: Vec<Vec<usize>> = vec![Vec::new(); host.edge_count()];
    for (i, inst) in insts.iter().enumerate() {
        for &v in &inst.vertices {
            member[v].push(i);
        }
        for &e in &inst.edges {
            owner[e].push(i);
        }
    }

    let mut g = Graph::with_capacity(host.vertex_count(), host.edge_count());
    for _ in 0..k {
        g.add_vertex(sub_label);
    }

    // The "map" slot: new index of every surviving host vertex.
    let mut map: Vec<Option<VertexId>> = vec![None; host.vertex_count()];
    for (v, vertex) in host.vertices.iter().enumerate() {
        if member[v].is_empty() {
            map[v] = Some(g.add_vertex(vertex.label));
        }
    }

    let mut used_overlap = false;
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for members in &member {
        for (x, &i) in members.iter().enumerate() {
            for &j in &members[x + 1..] {
                pairs.push((i, j));
            }
        }
    }
    pairs.sort_unstable();
    pairs.dedup();
    for (i, j) in pairs {
        g.add_edge(i, j, false, overlap_label);
        used_overlap = true;
    }

    for eid in 0..host.edge_count() {
        if owner[eid].is_empty() {
            emit_external_edge(&mut g, host, eid, &member, &map);
        } else {
            for &i in &owner[eid] {
                emit_covered_edge(&mut g, host, eid, i, &member, &owner[eid]);
            }
        }
    }

    (g, used_overlap)
}

/// Copy an edge not covered by any instance, rewriting each endpoint to its
/// surviving vertex or to the placeholder(s) of its containing instance(s).
/// Extra containing instances on either side receive a duplicate edge.
fn emit_external_edge(
    g: &mut Graph,
    host: &Graph,
    eid: EdgeId,
    member: &[Vec<usize>],
    map: &[Option<VertexId>],
) {
    let edge = &host.edges[eid];
    let source_targets = rewrite_endpoint(edge.source, member, map);
    let target_targets = rewrite_endpoint(edge.target, member, map);

    g.add_edge(source_targets[0], target_targets[0], edge.directed, edge.label);
    for &s in &source_targets[1..] {
        g.add_edge(s, target_targets[0], edge.directed, edge.label);
    }
    for &t in &target_targets[1..] {
        g.add_edge(source_targets[0], t, edge.directed, edge.label);
    }
}

fn rewrite_endpoint(v: VertexId, member: &[Vec<usize>], map: &[Option<VertexId>]) -> Vec<VertexId> {
    if member[v].is_empty() {
        vec![map[v].expect("uncovered vertex was copied")]
    } else {
        // placeholder vertices occupy indices 0..k in instance order
        member[v].clone()
    }
}

/// An edge inside instance `i` normally vanishes with the instance; when one
/// of its endpoints is shared with another instance `j`, the shared vertex
/// also "exists" inside `j`'s placeholder and the connection is preserved:
///
/// - self-loop at a shared vertex: a self-loop at `j`'s placeholder, plus a
///   placeholder-to-placeholder back-edge when directed;
/// - ordinary edge with a shared endpoint: an edge between the two
///   placeholders, oriented as the original; when the opposite endpoint is
///   shared with the same `j` as well, additionally a self-loop at `j`'s
///   placeholder once the second endpoint is reached.
fn emit_covered_edge(
    g: &mut Graph,
    host: &Graph,
    eid: EdgeId,
    i: usize,
    member: &[Vec<usize>],
    owners: &[usize],
) {
    let edge = &host.edges[eid];

    if edge.is_loop() {
        for &j in &member[edge.source] {
            if j == i || owners.contains(&j) {
                continue;
            }
            g.add_edge(j, j, edge.directed, edge.label);
            if edge.directed {
                g.add_edge(j, i, true, edge.label);
            }
        }
        return;
    }

    for (v, other, v_is_source) in [
        (edge.source, edge.target, true),
        (edge.target, edge.source, false),
    ] {
        for &j in &member[v] {
            if j == i || owners.contains(&j) {
                continue;
            }
            let (s, t) = if v_is_source { (j, i) } else { (i, j) };
            g.add_edge(s, t, edge.directed, edge.label);
            if !v_is_source && member[other].contains(&j) {
                g.add_edge(j, j, edge.directed, edge.label);
            }
        }
    }
}
