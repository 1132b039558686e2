//! Beam-search discovery of repeated substructures.
//!
//! Discovery seeds one-vertex substructures from every vertex label occurring
//! at least twice, then repeatedly extends the best candidates by one edge,
//! collects all instances of each extended definition, evaluates, and keeps a
//! bounded beam. Retired candidates accumulate on the discovered list, which
//! holds definitions that are pairwise non-isomorphic.

use std::rc::Rc;

use fixedbitset::FixedBitSet;
use log::{debug, trace};

use crate::evaluate::{evaluate_sub, EvalContext, EvalMethod};
use crate::graph::{Corpus, EdgeId, Graph, VertexId};
use crate::instance::{self, Instance};
use crate::label::{LabelId, LabelTable};
use crate::matcher;
use crate::params::SearchParams;

/// A candidate pattern together with its occurrences.
#[derive(Debug, Clone)]
pub struct Substructure {
    /// The pattern graph.
    pub definition: Graph,

    /// Occurrences in the positive graph.
    pub instances: Vec<Rc<Instance>>,

    /// Occurrences in the negative graph.
    pub neg_instances: Vec<Rc<Instance>>,

    /// Score under the run's evaluation method; negative until evaluated.
    pub value: f64,

    /// Whether this substructure stands for a chain of occurrences joined by
    /// `recursive_edge_label`.
    pub recursive: bool,
    pub recursive_edge_label: Option<LabelId>,
}

impl Substructure {
    pub fn new(definition: Graph) -> Self {
        Substructure {
            definition,
            instances: Vec::new(),
            neg_instances: Vec::new(),
            value: -1.0,
            recursive: false,
            recursive_edge_label: None,
        }
    }

    /// Definition graph read off an instance through its mapping: local
    /// vertex `k` takes the label of the host vertex mapped to `k`, and each
    /// instance edge connects the locals of its endpoints.
    pub fn from_instance(inst: &Instance, host: &Graph) -> Self {
        let n = inst.mapping.len();
        let mut label_of = vec![None; n];
        for m in &inst.mapping {
            label_of[m.sub_vertex] = Some(host.vertices[m.host_vertex].label);
        }
        let mut def = Graph::with_capacity(n, inst.edges.len());
        for label in label_of {
            def.add_vertex(label.expect("instance mapping covers locals densely"));
        }
        for &e in &inst.edges {
            let edge = &host.edges[e];
            let s = inst.local_of(edge.source).expect("edge source mapped");
            let t = inst.local_of(edge.target).expect("edge target mapped");
            def.add_edge(s, t, edge.directed, edge.label);
        }
        Substructure::new(def)
    }
}

/// A list of substructures in decreasing value order, bounded either by
/// length or, in value-based mode, by the number of distinct values.
#[derive(Debug, Default)]
pub struct SubList {
    subs: Vec<Substructure>,
    cap: Option<usize>,
    value_based: bool,
}

impl SubList {
    pub fn new(cap: Option<usize>, value_based: bool) -> Self {
        SubList {
            subs: Vec::new(),
            cap,
            value_based,
        }
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Substructure> {
        self.subs.iter()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Substructure> + '_ {
        self.subs.drain(..)
    }

    pub fn into_vec(self) -> Vec<Substructure> {
        self.subs
    }

    /// Insert keeping decreasing value order; equal values keep insertion
    /// order. Entries beyond the bound are dropped.
    pub fn insert(&mut self, sub: Substructure) {
        let pos = self
            .subs
            .iter()
            .position(|s| s.value < sub.value)
            .unwrap_or(self.subs.len());
        self.subs.insert(pos, sub);
        self.enforce_cap();
    }

    /// Insert unless an isomorphic definition is already present; of two
    /// isomorphic candidates the higher-valued one survives.
    pub fn insert_unique(&mut self, sub: Substructure, labels: &LabelTable) {
        if let Some(pos) = self
            .subs
            .iter()
            .position(|s| matcher::graphs_match(&s.definition, &sub.definition, labels, 0.0))
        {
            if self.subs[pos].value >= sub.value {
                return;
            }
            self.subs.remove(pos);
        }
        self.insert(sub);
    }

    fn enforce_cap(&mut self) {
        let Some(cap) = self.cap else { return };
        if !self.value_based {
            self.subs.truncate(cap);
            return;
        }
        let mut distinct = 0;
        let mut prev: Option<f64> = None;
        let mut cut = self.subs.len();
        for (i, sub) in self.subs.iter().enumerate() {
            if prev != Some(sub.value) {
                distinct += 1;
                prev = Some(sub.value);
            }
            if distinct > cap {
                cut = i;
                break;
            }
        }
        self.subs.truncate(cut);
    }
}

/// Seed substructures: one per vertex label with at least two occurrences in
/// the positive graph, carrying every positive and negative occurrence of
/// that label as a one-vertex instance.
pub fn initial_substructures(corpus: &Corpus) -> Vec<Substructure> {
    let mut by_label: Vec<Vec<VertexId>> = vec![Vec::new(); corpus.labels.len()];
    for (v, vertex) in corpus.positive.vertices.iter().enumerate() {
        by_label[vertex.label].push(v);
    }
    let mut neg_by_label: Vec<Vec<VertexId>> = vec![Vec::new(); corpus.labels.len()];
    if let Some(neg) = &corpus.negative {
        for (v, vertex) in neg.vertices.iter().enumerate() {
            neg_by_label[vertex.label].push(v);
        }
    }

    let mut seeds = Vec::new();
    for (label, occurrences) in by_label.iter().enumerate() {
        if occurrences.len() < 2 {
            continue;
        }
        let mut def = Graph::with_capacity(1, 0);
        def.add_vertex(label);
        let mut sub = Substructure::new(def);
        sub.instances = occurrences
            .iter()
            .map(|&v| Rc::new(Instance::single_vertex(v)))
            .collect();
        sub.neg_instances = neg_by_label[label]
            .iter()
            .map(|&v| Rc::new(Instance::single_vertex(v)))
            .collect();
        seeds.push(sub);
    }
    seeds
}

/// One extension round: the unique one-edge extensions of `parent`'s
/// instances, each unique definition made into a candidate substructure
/// carrying every matching positive and negative instance.
///
/// Duplicate suppression: an instance that has already been exactly matched
/// (recorded minimum match cost zero) never spawns its own candidate; with
/// exact matching, collection for the candidate spawned at list position `i`
/// only scans positions after `i`; and each instance is claimed by at most
/// one candidate per round via its `used` flag, which is cleared again
/// before this function returns.
pub fn extend_sub(parent: &Substructure, corpus: &Corpus, params: &SearchParams) -> Vec<Substructure> {
    let host = &corpus.positive;

    let mut scratch = FixedBitSet::with_capacity(host.edge_count());
    let mut new_instances: Vec<Rc<Instance>> = Vec::new();
    for inst in &parent.instances {
        for ext in instance::extensions(inst, host, &mut scratch) {
            if !new_instances.iter().any(|x| x.same_structure(&ext)) {
                new_instances.push(Rc::new(ext));
            }
        }
    }

    let mut neg_new: Vec<Rc<Instance>> = Vec::new();
    if let Some(neg) = &corpus.negative {
        let mut neg_scratch = FixedBitSet::with_capacity(neg.edge_count());
        for inst in &parent.neg_instances {
            for ext in instance::extensions(inst, neg, &mut neg_scratch) {
                if !neg_new.iter().any(|x| x.same_structure(&ext)) {
                    neg_new.push(Rc::new(ext));
                }
            }
        }
    }
    trace!(
        "extension round: {} positive, {} negative new instances",
        new_instances.len(),
        neg_new.len()
    );

    let mut candidates = Vec::new();
    for i in 0..new_instances.len() {
        let seed = &new_instances[i];
        if seed.min_match_cost.get() == 0.0 {
            continue;
        }
        let mut sub = Substructure::from_instance(seed, host);
        seed.used.set(true);
        seed.min_match_cost.set(0.0);
        sub.instances.push(Rc::clone(seed));

        let start = if params.exact() { i + 1 } else { 0 };
        for (j, cand) in new_instances.iter().enumerate().skip(start) {
            if j == i || cand.used.get() {
                continue;
            }
            if let Some(adopted) = try_adopt(&sub, seed, host, cand, host, corpus, params) {
                cand.used.set(true);
                sub.instances.push(adopted);
            }
        }
        if let Some(neg) = &corpus.negative {
            for cand in &neg_new {
                if cand.used.get() {
                    continue;
                }
                if let Some(adopted) = try_adopt(&sub, seed, host, cand, neg, corpus, params) {
                    cand.used.set(true);
                    sub.neg_instances.push(adopted);
                }
            }
        }
        candidates.push(sub);
    }

    for inst in new_instances.iter().chain(neg_new.iter()) {
        inst.used.set(false);
    }
    candidates
}

/// Does `cand` belong to `sub`? Fast path first under exact matching, then
/// the full matcher; returns the instance to adopt, remapped when the full
/// matcher found the alignment under a different permutation.
fn try_adopt(
    sub: &Substructure,
    seed: &Rc<Instance>,
    seed_host: &Graph,
    cand: &Rc<Instance>,
    cand_host: &Graph,
    corpus: &Corpus,
    params: &SearchParams,
) -> Option<Rc<Instance>> {
    if params.exact() && matcher::new_edge_match(seed, seed_host, cand, cand_host) {
        cand.min_match_cost.set(0.0);
        return Some(Rc::clone(cand));
    }

    let cand_graph = cand.to_graph(cand_host);
    let bound = matcher::match_bound(params.threshold, &sub.definition, &cand_graph);
    let outcome = matcher::inexact_match(&sub.definition, &cand_graph, &corpus.labels, bound, true);
    if outcome.cost < cand.min_match_cost.get() {
        cand.min_match_cost.set(outcome.cost);
    }
    if !outcome.matched {
        return None;
    }
    match outcome
        .mapping
        .as_deref()
        .and_then(|m| matcher::mapping_from_assignment(cand, m))
    {
        Some(mapping) => Some(Rc::new(cand.with_mapping(mapping))),
        None => Some(Rc::clone(cand)),
    }
}

/// Full beam search. `banned_labels` are the placeholder labels of earlier
/// compression iterations: a one-vertex substructure carrying one of them
/// would merely rename a pattern that has already been extracted, so it is
/// never retired.
pub fn discover(
    corpus: &Corpus,
    params: &SearchParams,
    ctx: &EvalContext,
    banned_labels: &[LabelId],
) -> Vec<Substructure> {
    let mut parent = SubList::new(Some(params.beam_width), params.value_based);
    for mut seed in initial_substructures(corpus) {
        evaluate_sub(&mut seed, corpus, ctx, params);
        parent.insert(seed);
    }
    debug!("seeded beam with {} one-vertex substructures", parent.len());

    let mut discovered = SubList::new(Some(params.num_best_subs), false);
    let mut limit = params.resolved_limit(corpus);
    let max_vertices = params.resolved_max_vertices(corpus);
    let mut recursive_labels: Vec<LabelId> = Vec::new();

    while !parent.is_empty() {
        let mut child = SubList::new(Some(params.beam_width), params.value_based);
        for p in parent.drain().collect::<Vec<_>>() {
            let expandable = p.instances.len() > 1
                || (params.eval == EvalMethod::SetCover && !p.neg_instances.is_empty());
            if expandable && limit > 0 {
                limit -= 1;
                debug!(
                    "expanding {}v/{}e sub (value {:.4}, {} instances), limit now {}",
                    p.definition.vertex_count(),
                    p.definition.edge_count(),
                    p.value,
                    p.instances.len(),
                    limit
                );
                for mut c in extend_sub(&p, corpus, params) {
                    if c.definition.vertex_count() > max_vertices {
                        continue;
                    }
                    evaluate_sub(&mut c, corpus, ctx, params);
                    if params.prune && c.value < p.value {
                        continue;
                    }
                    child.insert_unique(c, &corpus.labels);
                }
            }
            retire(
                p,
                corpus,
                params,
                ctx,
                banned_labels,
                &mut recursive_labels,
                &mut discovered,
            );
        }
        parent = child;
    }
    discovered.into_vec()
}

fn retire(
    p: Substructure,
    corpus: &Corpus,
    params: &SearchParams,
    ctx: &EvalContext,
    banned_labels: &[LabelId],
    recursive_labels: &mut Vec<LabelId>,
    discovered: &mut SubList,
) {
    if p.definition.vertex_count() < params.min_vertices {
        return;
    }
    if p.definition.vertex_count() == 1
        && banned_labels.contains(&p.definition.vertices[0].label)
    {
        return;
    }
    if params.recursion {
        if let Some(r) = recursive_substructure(&p, corpus, ctx, params, recursive_labels) {
            discovered.insert_unique(r, &corpus.labels);
        }
    }
    discovered.insert_unique(p, &corpus.labels);
}

/// Try to fold `p`'s instances into chains connected by a uniformly labelled
/// edge. The first edge label joining two distinct instances and not yet
/// claimed by an earlier recursive substructure is chosen; connected groups
/// of instances are fused into single instances spanning the whole chain.
fn recursive_substructure(
    p: &Substructure,
    corpus: &Corpus,
    ctx: &EvalContext,
    params: &SearchParams,
    recursive_labels: &mut Vec<LabelId>,
) -> Option<Substructure> {
    let host = &corpus.positive;
    if p.instances.len() < 2 {
        return None;
    }

    let mut member: Vec<Option<usize>> = vec![None; host.vertex_count()];
    for (i, inst) in p.instances.iter().enumerate() {
        for &v in &inst.vertices {
            if member[v].is_none() {
                member[v] = Some(i);
            }
        }
    }

    let label = host.edges.iter().find_map(|edge| {
        if recursive_labels.contains(&edge.label) {
            return None;
        }
        match (member[edge.source], member[edge.target]) {
            (Some(i), Some(j)) if i != j => Some(edge.label),
            _ => None,
        }
    })?;
    recursive_labels.push(label);

    // Union-find over instance ordinals; the smaller ordinal always wins the
    // root, so components come out in first-instance order.
    let n = p.instances.len();
    let mut root: Vec<usize> = (0..n).collect();
    fn find(root: &mut Vec<usize>, mut x: usize) -> usize {
        while root[x] != x {
            root[x] = root[root[x]];
            x = root[x];
        }
        x
    }
    let mut links: Vec<(usize, EdgeId)> = Vec::new();
    for (eid, edge) in host.edges.iter().enumerate() {
        if edge.label != label {
            continue;
        }
        if let (Some(i), Some(j)) = (member[edge.source], member[edge.target]) {
            if i != j {
                let (ri, rj) = (find(&mut root, i), find(&mut root, j));
                let (lo, hi) = (ri.min(rj), ri.max(rj));
                root[hi] = lo;
                links.push((lo, eid));
            }
        }
    }

    let mut grouped: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        let r = find(&mut root, i);
        grouped[r].push(i);
    }
    let mut connecting: Vec<Vec<EdgeId>> = vec![Vec::new(); n];
    for (r, eid) in links {
        connecting[find(&mut root, r)].push(eid);
    }

    let mut fused = Vec::new();
    for (r, group) in grouped.iter().enumerate() {
        match group.as_slice() {
            [] => {}
            [single] => fused.push(Rc::clone(&p.instances[*single])),
            [first, rest @ ..] => {
                let mut acc = Instance::union(&p.instances[*first], &p.instances[rest[0]], &[]);
                for &m in &rest[1..] {
                    acc = Instance::union(&acc, &p.instances[m], &[]);
                }
                for &eid in &connecting[r] {
                    if let Err(pos) = acc.edges.binary_search(&eid) {
                        acc.edges.insert(pos, eid);
                    }
                }
                fused.push(Rc::new(acc));
            }
        }
    }

    let mut sub = Substructure {
        definition: p.definition.clone(),
        instances: fused,
        neg_instances: p.neg_instances.clone(),
        value: -1.0,
        recursive: true,
        recursive_edge_label: Some(label),
    };
    evaluate_sub(&mut sub, corpus, ctx, params);
    debug!(
        "recursive fold over label {} gives {} chains (value {:.4})",
        label,
        sub.instances.len(),
        sub.value
    );
    Some(sub)
}
