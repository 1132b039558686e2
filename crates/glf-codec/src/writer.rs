//! Write graphs and substructures back out in the graph list format.
//!
//! Output is deterministic: vertices and edges appear in index order, ids are
//! 1-based, and labels are quoted exactly when reading them back bare would
//! change their meaning.

use sift_core::discover::Substructure;
use sift_core::graph::Graph;
use sift_core::label::{Label, LabelTable};

/// Tokens that open a directive; a bare label equal to one of these would be
/// misread on the way back in.
const KEYWORDS: [&str; 7] = ["v", "d", "u", "e", "S", "XP", "XN"];

fn needs_quoting(text: &str) -> bool {
    text.is_empty()
        || KEYWORDS.contains(&text)
        || text
            .chars()
            .any(|c| c.is_whitespace() || c == '#' || c == '"')
        || text.parse::<f64>().map(|n| n.is_finite()).unwrap_or(false)
}

/// Render a label as a single token.
pub fn format_label(label: &Label) -> String {
    match label {
        Label::Number(_) => label.to_string(),
        Label::Text(text) => {
            if needs_quoting(text) {
                format!("\"{}\"", text)
            } else {
                text.clone()
            }
        }
    }
}

/// Render a graph as `v`/`d`/`u` lines with 1-based ids.
pub fn write_graph(graph: &Graph, labels: &LabelTable) -> String {
    let mut out = String::new();
    for (i, vertex) in graph.vertices.iter().enumerate() {
        out.push_str(&format!(
            "v {} {}\n",
            i + 1,
            format_label(labels.get(vertex.label))
        ));
    }
    for edge in &graph.edges {
        out.push_str(&format!(
            "{} {} {} {}\n",
            if edge.directed { 'd' } else { 'u' },
            edge.source + 1,
            edge.target + 1,
            format_label(labels.get(edge.label))
        ));
    }
    out
}

/// Render one substructure as an `S` block.
pub fn write_substructure(sub: &Substructure, labels: &LabelTable) -> String {
    let mut out = String::from("S\n");
    out.push_str(&write_graph(&sub.definition, labels));
    out
}

/// Render a best-substructures file: one `S` block per substructure,
/// separated by blank lines.
pub fn write_substructures(subs: &[Substructure], labels: &LabelTable) -> String {
    subs.iter()
        .map(|sub| write_substructure(sub, labels))
        .collect::<Vec<_>>()
        .join("\n")
}
