//! Assemble graphs from a parsed directive stream.
//!
//! All examples of one polarity concatenate into a single graph; vertex ids
//! are 1-based and example-local in the text, so every edge endpoint resolves
//! against the example currently being read. Vertex numbering and endpoint
//! resolution failures report the offending line.

use sift_core::graph::{Corpus, Graph};
use sift_core::label::{Label, LabelTable};

use crate::error::{BuildError, Location};
use crate::parser::{directives, Directive, EdgeKind, RawLabel, Spanned};

fn intern(labels: &mut LabelTable, raw: &RawLabel) -> usize {
    match raw {
        RawLabel::Text(s) => labels.insert(Label::Text(s.clone())),
        RawLabel::Number(n) => labels.insert(Label::Number(*n)),
    }
}

fn resolve_directed(kind: EdgeKind, directed_default: bool) -> bool {
    match kind {
        EdgeKind::Directed => true,
        EdgeKind::Undirected => false,
        EdgeKind::Default => directed_default,
    }
}

/// Which graph the current example belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Positive,
    Negative,
}

/// Parse and assemble a graph file into a [`Corpus`].
///
/// `directed_default` decides `e` edges (false under the undirected switch).
/// A file whose first content directive is a vertex or edge opens an implicit
/// positive example.
pub fn build_corpus(input: &str, directed_default: bool) -> Result<Corpus, crate::GlfError> {
    let stream = directives(input)?;

    let mut corpus = Corpus::default();
    let mut negative = Graph::default();
    let mut saw_negative = false;

    let mut polarity = Polarity::Positive;
    let mut example_open = false;
    let mut base = 0usize;
    let mut local_count = 0u64;

    for Spanned { directive, offset } in stream {
        let location = || Location::from_offset(input, offset);
        match directive {
            Directive::BeginPositive | Directive::BeginNegative => {
                polarity = if directive == Directive::BeginPositive {
                    Polarity::Positive
                } else {
                    saw_negative = true;
                    Polarity::Negative
                };
                let graph = match polarity {
                    Polarity::Positive => &corpus.positive,
                    Polarity::Negative => &negative,
                };
                base = graph.vertex_count();
                local_count = 0;
                example_open = true;
                match polarity {
                    Polarity::Positive => corpus.positive_starts.push(base),
                    Polarity::Negative => corpus.negative_starts.push(base),
                }
            }
            Directive::BeginSub => {
                return Err(BuildError::MisplacedDirective {
                    location: location(),
                    directive: "S",
                }
                .into());
            }
            Directive::Vertex { id, label } => {
                if !example_open {
                    // implicit positive example at the top of the file
                    example_open = true;
                    corpus.positive_starts.push(0);
                }
                if id != local_count + 1 {
                    return Err(BuildError::VertexNumbering {
                        location: location(),
                        expected: local_count + 1,
                        found: id,
                    }
                    .into());
                }
                let label = intern(&mut corpus.labels, &label);
                match polarity {
                    Polarity::Positive => corpus.positive.add_vertex(label),
                    Polarity::Negative => negative.add_vertex(label),
                };
                local_count += 1;
            }
            Directive::Edge {
                kind,
                source,
                target,
                label,
            } => {
                if !example_open {
                    example_open = true;
                    corpus.positive_starts.push(0);
                }
                for id in [source, target] {
                    if id == 0 || id > local_count {
                        return Err(BuildError::UndefinedVertex {
                            location: location(),
                            id,
                        }
                        .into());
                    }
                }
                let label = intern(&mut corpus.labels, &label);
                let directed = resolve_directed(kind, directed_default);
                let (s, t) = (base + source as usize - 1, base + target as usize - 1);
                match polarity {
                    Polarity::Positive => corpus.positive.add_edge(s, t, directed, label),
                    Polarity::Negative => negative.add_edge(s, t, directed, label),
                };
            }
        }
    }

    if saw_negative {
        corpus.negative = Some(negative);
    } else {
        corpus.negative_starts.clear();
    }
    Ok(corpus)
}

/// Parse a predefined-substructures file: each pattern opens with `S` and is
/// built against the run's existing label table.
pub fn build_patterns(
    input: &str,
    labels: &mut LabelTable,
    directed_default: bool,
) -> Result<Vec<Graph>, crate::GlfError> {
    let stream = directives(input)?;

    let mut patterns: Vec<Graph> = Vec::new();
    let mut local_count = 0u64;

    for Spanned { directive, offset } in stream {
        let location = || Location::from_offset(input, offset);
        match directive {
            Directive::BeginSub => {
                patterns.push(Graph::default());
                local_count = 0;
            }
            Directive::BeginPositive | Directive::BeginNegative => {
                return Err(BuildError::MisplacedDirective {
                    location: location(),
                    directive: "XP/XN",
                }
                .into());
            }
            Directive::Vertex { id, label } => {
                let Some(pattern) = patterns.last_mut() else {
                    return Err(BuildError::MisplacedDirective {
                        location: location(),
                        directive: "v",
                    }
                    .into());
                };
                if id != local_count + 1 {
                    return Err(BuildError::VertexNumbering {
                        location: location(),
                        expected: local_count + 1,
                        found: id,
                    }
                    .into());
                }
                let label = intern(labels, &label);
                pattern.add_vertex(label);
                local_count += 1;
            }
            Directive::Edge {
                kind,
                source,
                target,
                label,
            } => {
                let Some(pattern) = patterns.last_mut() else {
                    return Err(BuildError::MisplacedDirective {
                        location: location(),
                        directive: "e",
                    }
                    .into());
                };
                for id in [source, target] {
                    if id == 0 || id > local_count {
                        return Err(BuildError::UndefinedVertex {
                            location: location(),
                            id,
                        }
                        .into());
                    }
                }
                let label = intern(labels, &label);
                let directed = resolve_directed(kind, directed_default);
                pattern.add_edge(
                    source as usize - 1,
                    target as usize - 1,
                    directed,
                    label,
                );
            }
        }
    }
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_positive_example() {
        let corpus = build_corpus("v 1 a\nv 2 b\nu 1 2 e\n", true).unwrap();
        assert_eq!(corpus.positive.vertex_count(), 2);
        assert_eq!(corpus.positive.edge_count(), 1);
        assert_eq!(corpus.positive_starts, vec![0]);
        assert!(corpus.negative.is_none());
        assert!(!corpus.positive.edges[0].directed);
    }

    #[test]
    fn test_examples_concatenate_with_local_ids() {
        let input = "XP\nv 1 a\nv 2 b\nd 1 2 x\nXP\nv 1 a\nv 2 b\nd 2 1 x\n";
        let corpus = build_corpus(input, true).unwrap();
        assert_eq!(corpus.positive.vertex_count(), 4);
        assert_eq!(corpus.positive_starts, vec![0, 2]);
        // second example's edge resolves against its own base
        assert_eq!(corpus.positive.edges[1].source, 3);
        assert_eq!(corpus.positive.edges[1].target, 2);
    }

    #[test]
    fn test_negative_examples_build_second_graph() {
        let input = "XP\nv 1 a\nv 2 a\nd 1 2 x\nXN\nv 1 a\nv 2 a\nd 1 2 y\n";
        let corpus = build_corpus(input, true).unwrap();
        assert_eq!(corpus.positive.vertex_count(), 2);
        let negative = corpus.negative.as_ref().unwrap();
        assert_eq!(negative.vertex_count(), 2);
        assert_eq!(corpus.negative_starts, vec![0]);
        // labels shared across both graphs through the one table
        assert_eq!(
            corpus.positive.vertices[0].label,
            negative.vertices[0].label
        );
    }

    #[test]
    fn test_default_edges_follow_switch() {
        let directed = build_corpus("v 1 a\nv 2 a\ne 1 2 x\n", true).unwrap();
        assert!(directed.positive.edges[0].directed);
        let undirected = build_corpus("v 1 a\nv 2 a\ne 1 2 x\n", false).unwrap();
        assert!(!undirected.positive.edges[0].directed);
    }

    #[test]
    fn test_vertex_numbering_must_be_consecutive() {
        let err = build_corpus("v 1 a\nv 3 b\n", true).unwrap_err();
        match err {
            crate::GlfError::Build(BuildError::VertexNumbering {
                location,
                expected,
                found,
            }) => {
                assert_eq!(location.line, 2);
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_numbering_restarts_per_example() {
        let input = "XP\nv 1 a\nXP\nv 1 a\n";
        assert!(build_corpus(input, true).is_ok());
    }

    #[test]
    fn test_undefined_edge_endpoint() {
        let err = build_corpus("v 1 a\nd 1 2 x\n", true).unwrap_err();
        match err {
            crate::GlfError::Build(BuildError::UndefinedVertex { location, id }) => {
                assert_eq!(location.line, 2);
                assert_eq!(id, 2);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_sub_token_rejected_in_graph_file() {
        assert!(build_corpus("S\nv 1 a\n", true).is_err());
    }

    #[test]
    fn test_patterns_file() {
        let mut labels = LabelTable::new();
        let input = "S\nv 1 a\nv 2 b\nu 1 2 e\nS\nv 1 c\n";
        let patterns = build_patterns(input, &mut labels, true).unwrap();
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].vertex_count(), 2);
        assert_eq!(patterns[0].edge_count(), 1);
        assert_eq!(patterns[1].vertex_count(), 1);
        assert_eq!(labels.len(), 4);
    }

    #[test]
    fn test_pattern_vertices_require_sub_header() {
        let mut labels = LabelTable::new();
        assert!(build_patterns("v 1 a\n", &mut labels, true).is_err());
    }
}
