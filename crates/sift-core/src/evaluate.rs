//! Substructure scoring: minimum-description-length compression ratio,
//! plain size ratio, or set cover.

use serde::{Deserialize, Serialize};

use crate::compress::{compress_graph, compressed_size, external_attachments, nonoverlapping};
use crate::discover::Substructure;
use crate::graph::{Corpus, Graph};
use crate::params::SearchParams;

/// Scoring function, selectable per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalMethod {
    /// Description-length compression ratio (the default).
    Mdl,

    /// Vertex+edge count compression ratio; cheaper than MDL.
    Size,

    /// Count of positive examples covered, discounted by covered negatives.
    SetCover,
}

/// Per-iteration scoring baselines, computed once and shared by every
/// candidate evaluation of that iteration.
#[derive(Debug, Clone)]
pub struct EvalContext {
    pub pos_dl: f64,
    pub neg_dl: f64,
    pub pos_size: usize,
    pub neg_size: usize,
    pub num_labels: usize,
}

impl EvalContext {
    pub fn new(corpus: &Corpus, eval: EvalMethod) -> Self {
        let num_labels = corpus.labels.len();
        let (pos_dl, neg_dl) = if eval == EvalMethod::Mdl {
            (
                description_length(&corpus.positive, num_labels),
                corpus
                    .negative
                    .as_ref()
                    .map(|g| description_length(g, num_labels))
                    .unwrap_or(0.0),
            )
        } else {
            (0.0, 0.0)
        };
        EvalContext {
            pos_dl,
            neg_dl,
            pos_size: corpus.positive.size(),
            neg_size: corpus.negative.as_ref().map(Graph::size).unwrap_or(0),
            num_labels,
        }
    }
}

fn log2(x: f64) -> f64 {
    x.log2()
}

/// `lg(n!)` as a sum of logarithms; exact enough for the small counts seen
/// here and monotone, which is all the ranking needs.
fn log2_factorial(n: usize) -> f64 {
    (2..=n).map(|i| log2(i as f64)).sum()
}

fn log2_binomial(n: usize, k: usize) -> f64 {
    debug_assert!(k <= n);
    log2_factorial(n) - log2_factorial(k) - log2_factorial(n - k)
}

/// Description length of `graph` in bits, given an alphabet of `num_labels`
/// labels.
///
/// Three parts: the vertex block (count plus one label per vertex), the
/// adjacency rows (a row-degree header plus `lg C(v, kᵢ)` per vertex, where
/// `kᵢ` counts the distinct endpoint partners of vertex `i`), and the edge
/// block (a multiplicity header over connected pairs plus label and
/// direction bits per edge).
pub fn description_length(graph: &Graph, num_labels: usize) -> f64 {
    let v = graph.vertex_count();
    let e = graph.edge_count();
    let l = num_labels.max(1) as f64;

    let vertex_bits = log2(v as f64 + 1.0) + v as f64 * log2(l);

    // Pair multiplicities; undirected pairs are canonicalised.
    let mut pairs: Vec<(usize, usize)> = graph
        .edges
        .iter()
        .map(|edge| {
            if edge.directed {
                (edge.source, edge.target)
            } else {
                (
                    edge.source.min(edge.target),
                    edge.source.max(edge.target),
                )
            }
        })
        .collect();
    pairs.sort_unstable();

    let mut row_degree = vec![0usize; v];
    let mut distinct_pairs = 0usize;
    let mut max_multiplicity = 0usize;
    let mut idx = 0;
    while idx < pairs.len() {
        let mut end = idx + 1;
        while end < pairs.len() && pairs[end] == pairs[idx] {
            end += 1;
        }
        row_degree[pairs[idx].0] += 1;
        distinct_pairs += 1;
        max_multiplicity = max_multiplicity.max(end - idx);
        idx = end;
    }

    let b = row_degree.iter().copied().max().unwrap_or(0);
    let row_bits = (v as f64 + 1.0) * log2(b as f64 + 1.0)
        + row_degree
            .iter()
            .map(|&k| log2_binomial(v, k))
            .sum::<f64>();

    let edge_bits = (distinct_pairs as f64 + 1.0) * log2(max_multiplicity as f64 + 1.0)
        + e as f64 * (1.0 + log2(l));

    vertex_bits + row_bits + edge_bits
}

/// Score `sub` in place with the method selected by `params`.
pub fn evaluate_sub(
    sub: &mut Substructure,
    corpus: &Corpus,
    ctx: &EvalContext,
    params: &SearchParams,
) {
    sub.value = match params.eval {
        EvalMethod::Mdl => mdl_value(sub, corpus, ctx, params),
        EvalMethod::Size => size_value(sub, corpus, ctx, params),
        EvalMethod::SetCover => set_cover_value(sub, corpus, params),
    };
}

fn mdl_value(
    sub: &Substructure,
    corpus: &Corpus,
    ctx: &EvalContext,
    params: &SearchParams,
) -> f64 {
    // Placeholder labels get the next free ids; they only exist inside the
    // hypothetical compressed graph, so the table itself stays untouched.
    let sub_label = ctx.num_labels;
    let overlap_label = ctx.num_labels + 1;

    let (pos_comp, pos_overlap) = compress_graph(
        &corpus.positive,
        &sub.instances,
        sub_label,
        overlap_label,
        params.allow_overlap,
    );
    let neg_comp = corpus.negative.as_ref().map(|neg| {
        compress_graph(
            neg,
            &sub.neg_instances,
            sub_label,
            overlap_label,
            params.allow_overlap,
        )
    });

    let used_overlap = pos_overlap || neg_comp.as_ref().map(|(_, o)| *o).unwrap_or(false);
    let alphabet = ctx.num_labels + 1 + usize::from(used_overlap);
    let sub_dl = description_length(&sub.definition, alphabet);
    let attach_bits = log2(sub.definition.vertex_count().max(1) as f64);

    let pos_attached = if params.allow_overlap {
        sub.instances.clone()
    } else {
        nonoverlapping(&sub.instances)
    };
    let pos_comp_dl = description_length(&pos_comp, alphabet)
        + external_attachments(&corpus.positive, &pos_attached) as f64 * attach_bits;

    match (&corpus.negative, neg_comp) {
        (Some(neg), Some((neg_graph, _))) => {
            let neg_attached = if params.allow_overlap {
                sub.neg_instances.clone()
            } else {
                nonoverlapping(&sub.neg_instances)
            };
            let neg_comp_dl = description_length(&neg_graph, alphabet)
                + external_attachments(neg, &neg_attached) as f64 * attach_bits;
            let denom = sub_dl + pos_comp_dl + ctx.neg_dl - neg_comp_dl;
            (ctx.pos_dl + ctx.neg_dl) / denom.max(f64::EPSILON)
        }
        _ => ctx.pos_dl / (sub_dl + pos_comp_dl).max(f64::EPSILON),
    }
}

fn size_value(
    sub: &Substructure,
    corpus: &Corpus,
    ctx: &EvalContext,
    params: &SearchParams,
) -> f64 {
    let def = sub.definition.size() as f64;
    let pos_csize = compressed_size(&corpus.positive, &sub.instances, params.allow_overlap) as f64;
    match &corpus.negative {
        Some(neg) => {
            let neg_csize = compressed_size(neg, &sub.neg_instances, params.allow_overlap) as f64;
            let denom = def + pos_csize + ctx.neg_size as f64 - neg_csize;
            (ctx.pos_size as f64 + ctx.neg_size as f64) / denom.max(f64::EPSILON)
        }
        None => ctx.pos_size as f64 / (def + pos_csize).max(f64::EPSILON),
    }
}

fn set_cover_value(sub: &Substructure, corpus: &Corpus, params: &SearchParams) -> f64 {
    let mut covered = vec![false; corpus.positive_example_count()];
    for inst in &sub.instances {
        covered[Corpus::example_of(&corpus.positive_starts, inst.vertices[0])] = true;
    }
    let pos_covered = covered.iter().filter(|&&c| c).count();

    let mut neg_covered = 0usize;
    if corpus.negative.is_some() {
        let mut covered = vec![false; corpus.negative_example_count()];
        for inst in &sub.neg_instances {
            covered[Corpus::example_of(&corpus.negative_starts, inst.vertices[0])] = true;
        }
        neg_covered = covered.iter().filter(|&&c| c).count();
    }

    pos_covered as f64 - params.neg_weight * neg_covered as f64
}
