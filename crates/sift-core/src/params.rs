//! Run configuration for the discovery engine.

use serde::{Deserialize, Serialize};

use crate::evaluate::EvalMethod;
use crate::graph::Corpus;

/// Parameters of one discovery run.
///
/// Defaults follow the classical driver: beam width 4, three best
/// substructures, expansion limit of half the positive edge count, exact
/// matching, a single iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Width of the parent/child beams.
    pub beam_width: usize,

    /// Cap on the number of substructure expansions; `None` resolves to
    /// half the positive edge count (at least 1).
    pub limit: Option<usize>,

    /// Largest definition, in vertices, a candidate may reach; `None`
    /// resolves to the positive vertex count.
    pub max_vertices: Option<usize>,

    /// Smallest definition, in vertices, worth reporting.
    pub min_vertices: usize,

    /// How many best substructures to keep per iteration.
    pub num_best_subs: usize,

    /// Relative match threshold in `[0, 1]`; 0 is exact matching.
    pub threshold: f64,

    /// Number of discover-compress iterations.
    pub iterations: usize,

    /// Drop children scoring below their parent.
    pub prune: bool,

    /// Bound beams by distinct values instead of by length.
    pub value_based: bool,

    /// Evaluate and compress with overlapping instances.
    pub allow_overlap: bool,

    /// Attempt recursive-substructure synthesis when retiring a parent.
    pub recursion: bool,

    /// Scoring function.
    pub eval: EvalMethod,

    /// Set-cover only: weight of each covered negative example.
    pub neg_weight: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            beam_width: 4,
            limit: None,
            max_vertices: None,
            min_vertices: 1,
            num_best_subs: 3,
            threshold: 0.0,
            iterations: 1,
            prune: false,
            value_based: false,
            allow_overlap: false,
            recursion: false,
            eval: EvalMethod::Mdl,
            neg_weight: 1.0,
        }
    }
}

impl SearchParams {
    pub fn resolved_limit(&self, corpus: &Corpus) -> usize {
        self.limit
            .unwrap_or_else(|| (corpus.positive.edge_count() / 2).max(1))
    }

    pub fn resolved_max_vertices(&self, corpus: &Corpus) -> usize {
        self.max_vertices
            .unwrap_or_else(|| corpus.positive.vertex_count())
    }

    /// Exact matching is the zero-threshold case; it enables the new-edge
    /// fast path and the positional duplicate-suppression rule.
    pub fn exact(&self) -> bool {
        self.threshold == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Label;

    #[test]
    fn test_default_limit_is_half_the_edges() {
        let mut corpus = Corpus::default();
        let a = corpus.labels.insert(Label::Text("a".into()));
        for _ in 0..4 {
            corpus.positive.add_vertex(a);
        }
        for i in 0..4 {
            corpus.positive.add_edge(i, (i + 1) % 4, false, a);
        }
        let params = SearchParams::default();
        assert_eq!(params.resolved_limit(&corpus), 2);
        assert_eq!(params.resolved_max_vertices(&corpus), 4);

        let explicit = SearchParams {
            limit: Some(10),
            ..SearchParams::default()
        };
        assert_eq!(explicit.resolved_limit(&corpus), 10);
    }
}
