//! The outer driver: predefined-pattern compression, then iterated
//! discover-and-compress rounds.

use log::info;

use crate::compress::compress_graph;
use crate::discover::{discover, Substructure};
use crate::evaluate::EvalContext;
use crate::graph::{Corpus, Graph};
use crate::label::{Label, LabelId};
use crate::params::SearchParams;
use crate::predefined;

/// What happened to one user-supplied pattern.
#[derive(Debug, Clone)]
pub struct PredefinedOutcome {
    /// 1-based ordinal of the pattern in the patterns file.
    pub ordinal: usize,

    /// Placeholder label introduced for it, e.g. `PS_2`; `None` when no
    /// instance was found and nothing was compressed.
    pub label: Option<String>,

    pub positive_instances: usize,
    pub negative_instances: usize,
}

/// The best substructures of one discovery iteration, best first.
#[derive(Debug, Clone)]
pub struct IterationOutcome {
    pub iteration: usize,
    pub subs: Vec<Substructure>,
}

/// Outcome of a whole run. The compressed graphs live in the corpus the run
/// mutated; an empty `iterations` list means no substructure was found at
/// all.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    pub predefined: Vec<PredefinedOutcome>,
    pub iterations: Vec<IterationOutcome>,
}

/// Compact the label table against the corpus graphs, rewriting their label
/// ids in place, and return the id remapping.
fn compact_labels(corpus: &mut Corpus) -> Vec<Option<LabelId>> {
    let Corpus {
        labels,
        positive,
        negative,
        ..
    } = corpus;
    let mut graphs: Vec<&mut Graph> = vec![positive];
    if let Some(neg) = negative.as_mut() {
        graphs.push(neg);
    }
    labels.compact(&mut graphs)
}

/// Run discovery over `corpus`, compressing by each of `patterns` first.
///
/// Each predefined pattern with at least one instance is compressed out under
/// a `PS_<k>` placeholder; the label table is compacted only once afterwards
/// so pattern `k+1` still sees the labels pattern `k` was expressed in. Then
/// up to `params.iterations` rounds of discovery run, compressing the corpus
/// under `SUB_<iteration>` between rounds until no substructure of value
/// above 1 remains.
///
/// Compression merges example boundaries: placeholder vertices lead the
/// compressed graph, so per-example offsets stop being meaningful and later
/// iterations treat the graph as one example.
pub fn run(corpus: &mut Corpus, patterns: &[Graph], params: &SearchParams) -> RunResult {
    let mut result = RunResult::default();
    let mut banned: Vec<LabelId> = Vec::new();

    if !patterns.is_empty() {
        for (k, pattern) in patterns.iter().enumerate() {
            result
                .predefined
                .push(compress_predefined(corpus, pattern, k + 1, params, &mut banned));
        }
        let remap = compact_labels(corpus);
        banned = banned.iter().filter_map(|&b| remap[b]).collect();
    }

    for iteration in 1..=params.iterations.max(1) {
        if corpus.positive.vertex_count() == 0 {
            break;
        }
        let ctx = EvalContext::new(corpus, params.eval);
        let subs = discover(corpus, params, &ctx, &banned);
        let Some(best) = subs.first() else {
            info!("iteration {}: no substructures found", iteration);
            break;
        };
        info!(
            "iteration {}: best substructure {}v/{}e, value {:.4}, {} instances",
            iteration,
            best.definition.vertex_count(),
            best.definition.edge_count(),
            best.value,
            best.instances.len()
        );
        let last_round = iteration == params.iterations.max(1);
        result.iterations.push(IterationOutcome { iteration, subs });

        if last_round {
            break;
        }
        let best = &result.iterations.last().expect("just pushed").subs[0];
        if best.value <= 1.0 {
            info!("best substructure no longer compresses; stopping");
            break;
        }

        let sub_label = corpus.labels.insert(Label::Text(format!("SUB_{}", iteration)));
        let overlap_label = corpus
            .labels
            .insert(Label::Text(format!("OVERLAP_{}", iteration)));
        let (compressed, _) = compress_graph(
            &corpus.positive,
            &best.instances,
            sub_label,
            overlap_label,
            params.allow_overlap,
        );
        corpus.positive = compressed;
        corpus.positive_starts = vec![0];
        if let Some(neg) = &corpus.negative {
            let (neg_compressed, _) = compress_graph(
                neg,
                &best.neg_instances,
                sub_label,
                overlap_label,
                params.allow_overlap,
            );
            corpus.negative = Some(neg_compressed);
            corpus.negative_starts = vec![0];
        }
        banned.push(sub_label);
        let remap = compact_labels(corpus);
        banned = banned.iter().filter_map(|&b| remap[b]).collect();
    }

    result
}

fn compress_predefined(
    corpus: &mut Corpus,
    pattern: &Graph,
    ordinal: usize,
    params: &SearchParams,
    banned: &mut Vec<LabelId>,
) -> PredefinedOutcome {
    let unique = !params.allow_overlap;
    let instances = predefined::find_instances(
        pattern,
        &corpus.positive,
        &corpus.labels,
        params.threshold,
        unique,
    );
    let neg_instances = corpus
        .negative
        .as_ref()
        .map(|neg| predefined::find_instances(pattern, neg, &corpus.labels, params.threshold, unique))
        .unwrap_or_default();

    if instances.is_empty() && neg_instances.is_empty() {
        info!("predefined pattern {}: no instances", ordinal);
        return PredefinedOutcome {
            ordinal,
            label: None,
            positive_instances: 0,
            negative_instances: 0,
        };
    }

    let label_text = format!("PS_{}", ordinal);
    let sub_label = corpus.labels.insert(Label::Text(label_text.clone()));
    let overlap_label = corpus
        .labels
        .insert(Label::Text(format!("OVERLAP_PS_{}", ordinal)));

    if !instances.is_empty() {
        let (compressed, _) = compress_graph(
            &corpus.positive,
            &instances,
            sub_label,
            overlap_label,
            params.allow_overlap,
        );
        corpus.positive = compressed;
        corpus.positive_starts = vec![0];
    }
    if let (Some(neg), false) = (&corpus.negative, neg_instances.is_empty()) {
        let (neg_compressed, _) = compress_graph(
            neg,
            &neg_instances,
            sub_label,
            overlap_label,
            params.allow_overlap,
        );
        corpus.negative = Some(neg_compressed);
        corpus.negative_starts = vec![0];
    }
    banned.push(sub_label);
    info!(
        "predefined pattern {}: {} positive / {} negative instances compressed as {}",
        ordinal,
        instances.len(),
        neg_instances.len(),
        label_text
    );
    PredefinedOutcome {
        ordinal,
        label: Some(label_text),
        positive_instances: instances.len(),
        negative_instances: neg_instances.len(),
    }
}
