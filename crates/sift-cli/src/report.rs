//! Rendering run results: human-readable text, the substructures file, and
//! the JSON summary.

use serde::Serialize;

use glf_codec::{write_graph, write_substructure};
use sift_core::graph::Corpus;
use sift_core::run::RunResult;
use sift_core::Substructure;

/// JSON shape of one reported substructure.
#[derive(Debug, Serialize)]
pub struct SubSummary {
    pub value: f64,
    pub instances: usize,
    pub neg_instances: usize,
    pub vertices: usize,
    pub edges: usize,
    pub recursive: bool,
    /// The definition in graph list format.
    pub definition: String,
}

#[derive(Debug, Serialize)]
pub struct IterationSummary {
    pub iteration: usize,
    pub subs: Vec<SubSummary>,
}

#[derive(Debug, Serialize)]
pub struct PredefinedSummary {
    pub ordinal: usize,
    pub label: Option<String>,
    pub positive_instances: usize,
    pub negative_instances: usize,
}

/// JSON shape of a whole run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub predefined: Vec<PredefinedSummary>,
    pub iterations: Vec<IterationSummary>,
    /// The positive graph as left behind by the run, in graph list format.
    pub compressed_positive: String,
    pub compressed_negative: Option<String>,
}

fn summarize_sub(sub: &Substructure, corpus: &Corpus) -> SubSummary {
    SubSummary {
        value: sub.value,
        instances: sub.instances.len(),
        neg_instances: sub.neg_instances.len(),
        vertices: sub.definition.vertex_count(),
        edges: sub.definition.edge_count(),
        recursive: sub.recursive,
        definition: write_graph(&sub.definition, &corpus.labels),
    }
}

/// Build the JSON summary of a finished run.
pub fn summarize(result: &RunResult, corpus: &Corpus) -> RunSummary {
    RunSummary {
        predefined: result
            .predefined
            .iter()
            .map(|p| PredefinedSummary {
                ordinal: p.ordinal,
                label: p.label.clone(),
                positive_instances: p.positive_instances,
                negative_instances: p.negative_instances,
            })
            .collect(),
        iterations: result
            .iterations
            .iter()
            .map(|iter| IterationSummary {
                iteration: iter.iteration,
                subs: iter.subs.iter().map(|s| summarize_sub(s, corpus)).collect(),
            })
            .collect(),
        compressed_positive: write_graph(&corpus.positive, &corpus.labels),
        compressed_negative: corpus
            .negative
            .as_ref()
            .map(|neg| write_graph(neg, &corpus.labels)),
    }
}

/// Human-readable report printed to stdout.
pub fn render_text(result: &RunResult, corpus: &Corpus) -> String {
    let mut out = String::new();

    for p in &result.predefined {
        match &p.label {
            Some(label) => out.push_str(&format!(
                "Predefined pattern {}: {} positive / {} negative instance(s) compressed as {}\n",
                p.ordinal, p.positive_instances, p.negative_instances, label
            )),
            None => out.push_str(&format!(
                "Predefined pattern {}: no instances\n",
                p.ordinal
            )),
        }
    }
    if !result.predefined.is_empty() {
        out.push('\n');
    }

    if result.iterations.is_empty() {
        out.push_str("No substructures found.\n");
        return out;
    }

    for iteration in &result.iterations {
        out.push_str(&format!(
            "Iteration {}: best {} substructure(s)\n\n",
            iteration.iteration,
            iteration.subs.len()
        ));
        for (rank, sub) in iteration.subs.iter().enumerate() {
            out.push_str(&format!(
                "({}) value = {:.6}, {} instance(s)",
                rank + 1,
                sub.value,
                sub.instances.len()
            ));
            if !sub.neg_instances.is_empty() {
                out.push_str(&format!(", {} negative", sub.neg_instances.len()));
            }
            if sub.recursive {
                out.push_str(" [recursive]");
            }
            out.push('\n');
            for line in write_graph(&sub.definition, &corpus.labels).lines() {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
    }
    out
}

/// The substructures output file: every reported definition as an `S` block,
/// in iteration order.
pub fn render_substructures(result: &RunResult, corpus: &Corpus) -> String {
    let blocks: Vec<String> = result
        .iterations
        .iter()
        .flat_map(|iter| iter.subs.iter())
        .map(|sub| write_substructure(sub, &corpus.labels))
        .collect();
    blocks.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::label::Label;
    use sift_core::run::IterationOutcome;
    use sift_core::Graph;

    fn sample() -> (RunResult, Corpus) {
        let mut corpus = Corpus::default();
        let a = corpus.labels.insert(Label::Text("a".into()));
        let x = corpus.labels.insert(Label::Text("x".into()));
        let mut def = Graph::new();
        def.add_vertex(a);
        def.add_vertex(a);
        def.add_edge(0, 1, true, x);
        let mut sub = Substructure::new(def);
        sub.value = 1.25;
        corpus.positive.add_vertex(a);
        corpus.positive_starts = vec![0];

        let result = RunResult {
            predefined: vec![],
            iterations: vec![IterationOutcome {
                iteration: 1,
                subs: vec![sub],
            }],
        };
        (result, corpus)
    }

    #[test]
    fn test_render_text_lists_ranked_subs() {
        let (result, corpus) = sample();
        let text = render_text(&result, &corpus);
        assert!(text.contains("Iteration 1"));
        assert!(text.contains("(1) value = 1.250000, 0 instance(s)"));
        assert!(text.contains("  v 1 a"));
        assert!(text.contains("  d 1 2 x"));
    }

    #[test]
    fn test_render_text_empty_run() {
        let (_, corpus) = sample();
        let empty = RunResult::default();
        assert_eq!(render_text(&empty, &corpus), "No substructures found.\n");
    }

    #[test]
    fn test_render_substructures_emits_s_blocks() {
        let (result, corpus) = sample();
        let text = render_substructures(&result, &corpus);
        assert_eq!(text, "S\nv 1 a\nv 2 a\nd 1 2 x\n");
    }

    #[test]
    fn test_summary_serializes() {
        let (result, corpus) = sample();
        let summary = summarize(&result, &corpus);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"value\":1.25"));
        assert!(json.contains("\"compressed_positive\":\"v 1 a\\n\""));
    }
}
