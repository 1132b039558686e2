//! End-to-end discovery scenarios driven through the text codec, exactly as
//! the command-line driver wires them up.

use glf_codec::{parse_corpus, write_graph};
use sift_cli::report::render_text;
use sift_core::compress::compress_graph;
use sift_core::discover::{extend_sub, initial_substructures};
use sift_core::label::Label;
use sift_core::{run, SearchParams, Substructure};

const TRIANGLES: &str = "\
v 1 a
v 2 a
v 3 a
v 4 a
v 5 a
v 6 a
d 1 2 x
d 2 3 x
d 3 1 x
d 4 5 x
d 5 6 x
d 6 4 x
";

#[test]
fn triangle_discovery() {
    let mut corpus = parse_corpus(TRIANGLES, true).unwrap();
    let result = run(&mut corpus, &[], &SearchParams::default());

    let best = &result.iterations[0].subs[0];
    assert_eq!(best.definition.vertex_count(), 3);
    assert_eq!(best.definition.edge_count(), 3);
    assert_eq!(best.instances.len(), 2);
    assert!(best.definition.edges.iter().all(|e| e.directed));
    assert!(best.value > 1.0);
}

const CHAIN: &str = "\
v 1 a
v 2 b
v 3 a
v 4 b
u 1 2 e
u 2 3 e
u 3 4 e
";

#[test]
fn linear_chain_pair_pattern() {
    let mut corpus = parse_corpus(CHAIN, true).unwrap();
    let params = SearchParams {
        limit: Some(10),
        num_best_subs: 6,
        ..SearchParams::default()
    };
    let result = run(&mut corpus, &[], &params);
    let subs = &result.iterations[0].subs;

    // the best substructure of size 2 is a-b with all three occurrences
    let pair = subs
        .iter()
        .find(|s| s.definition.vertex_count() == 2)
        .expect("pair substructure reported");
    assert_eq!(pair.instances.len(), 3);
    assert_eq!(pair.definition.edge_count(), 1);

    // growing to four vertices leaves a single occurrence, so no 4-vertex
    // candidate can beat it
    for sub in subs.iter().filter(|s| s.definition.vertex_count() == 4) {
        assert!(sub.instances.len() <= 1);
        assert!(sub.value < pair.value);
    }
}

const SQUARE: &str = "\
v 1 a
v 2 b
v 3 a
v 4 b
u 1 2 e
u 2 3 e
u 3 4 e
u 4 1 e
";

#[test]
fn overlapping_instances_reported_and_compressed() {
    let mut corpus = parse_corpus(SQUARE, true).unwrap();
    let params = SearchParams {
        limit: Some(4),
        num_best_subs: 8,
        allow_overlap: true,
        ..SearchParams::default()
    };
    let result = run(&mut corpus, &[], &params);
    let subs = &result.iterations[0].subs;

    // the a-b-a path occurs twice, sharing both `a` vertices
    let a = corpus.labels.find(&Label::Text("a".into())).unwrap();
    let path: &Substructure = subs
        .iter()
        .find(|s| {
            s.definition.vertex_count() == 3
                && s.definition
                    .vertices
                    .iter()
                    .filter(|v| v.label == a)
                    .count()
                    == 2
        })
        .expect("a-b-a substructure reported");
    assert_eq!(path.instances.len(), 2);
    assert!(path.instances[0].overlaps(&path.instances[1]));

    // compressing by both instances emits exactly one OVERLAP edge
    let sub_label = corpus.labels.insert(Label::Text("SUB_1".into()));
    let overlap_label = corpus.labels.insert(Label::Text("OVERLAP_1".into()));
    let (compressed, used_overlap) = compress_graph(
        &corpus.positive,
        &path.instances,
        sub_label,
        overlap_label,
        true,
    );
    assert!(used_overlap);
    let overlap_edges = compressed
        .edges
        .iter()
        .filter(|e| e.label == overlap_label)
        .count();
    assert_eq!(overlap_edges, 1);
}

const POS_NEG: &str = "\
XP
v 1 a
v 2 a
v 3 a
d 1 2 x
d 2 3 x
d 3 1 x
XP
v 1 a
v 2 a
v 3 a
d 1 2 x
d 2 3 x
d 3 1 x
XN
v 1 a
v 2 a
v 3 a
d 1 2 y
d 2 3 y
d 3 1 y
XN
v 1 a
v 2 a
v 3 a
d 1 2 y
d 2 3 y
d 3 1 y
";

#[test]
fn negative_examples_exclude_their_pattern() {
    let mut corpus = parse_corpus(POS_NEG, true).unwrap();
    let result = run(&mut corpus, &[], &SearchParams::default());

    let x = corpus.labels.find(&Label::Text("x".into())).unwrap();
    let best = &result.iterations[0].subs[0];
    assert_eq!(best.definition.edge_count(), 3);
    assert!(best.definition.edges.iter().all(|e| e.label == x));
    assert_eq!(best.instances.len(), 2);
    assert!(best.neg_instances.is_empty());

    // the y-triangle lives only in the negative graph and is never extracted
    let y = corpus.labels.find(&Label::Text("y".into())).unwrap();
    for iteration in &result.iterations {
        for sub in &iteration.subs {
            assert!(sub.definition.edges.iter().all(|e| e.label != y));
        }
    }
}

#[test]
fn extension_round_leaves_flags_clear() {
    let corpus = parse_corpus(CHAIN, true).unwrap();
    let params = SearchParams::default();
    for seed in initial_substructures(&corpus) {
        for sub in extend_sub(&seed, &corpus, &params) {
            for inst in sub.instances.iter().chain(sub.neg_instances.iter()) {
                assert!(!inst.used.get());
            }
        }
    }
}

const THREE_TRIANGLES: &str = "\
v 1 a
v 2 a
v 3 a
v 4 a
v 5 a
v 6 a
v 7 a
v 8 a
v 9 a
d 1 2 x
d 2 3 x
d 3 1 x
d 4 5 x
d 5 6 x
d 6 4 x
d 7 8 x
d 8 9 x
d 9 7 x
";

#[test]
fn iterative_compression_stops_at_placeholders() {
    let mut corpus = parse_corpus(THREE_TRIANGLES, true).unwrap();
    let params = SearchParams {
        iterations: 2,
        ..SearchParams::default()
    };
    let result = run(&mut corpus, &[], &params);

    // iteration 1 extracts the triangle; iteration 2 finds nothing further
    assert_eq!(result.iterations.len(), 1);
    assert_eq!(result.iterations[0].subs[0].instances.len(), 3);
    assert_eq!(
        write_graph(&corpus.positive, &corpus.labels),
        "v 1 SUB_1\nv 2 SUB_1\nv 3 SUB_1\n"
    );
}

#[test]
fn identical_runs_render_identically() {
    let render = || {
        let mut corpus = parse_corpus(TRIANGLES, true).unwrap();
        let result = run(&mut corpus, &[], &SearchParams::default());
        render_text(&result, &corpus)
    };
    assert_eq!(render(), render());
}
