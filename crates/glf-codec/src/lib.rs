//! # GLF Codec
//!
//! Bidirectional codec between the line-oriented graph list format and the
//! sift graph structures.
//!
//! This crate provides:
//! - **Parsing**: graph files (with `XP`/`XN` example markers) into a
//!   [`Corpus`], and predefined-substructure files (`S` blocks) into pattern
//!   graphs.
//! - **Writing**: graphs and discovered substructures back out in the same
//!   grammar, deterministically.
//!
//! The format is a whitespace-separated token stream: `#` comments run to
//! end of line, labels are bare tokens or double-quoted strings, bare tokens
//! that read as finite numbers become numeric labels. Vertices are declared
//! with consecutive 1-based ids inside their example; edges come in three
//! flavours (`d` directed, `u` undirected, `e` decided by a run-time switch).
//!
//! ## Example
//!
//! ```rust
//! let corpus = glf_codec::parse_corpus("v 1 a\nv 2 b\nu 1 2 e\n", true)?;
//! assert_eq!(corpus.positive.vertex_count(), 2);
//!
//! let text = glf_codec::write_graph(&corpus.positive, &corpus.labels);
//! assert_eq!(text, "v 1 a\nv 2 b\nu 1 2 e\n");
//! # Ok::<(), glf_codec::GlfError>(())
//! ```

mod build;
mod error;
mod parser;
mod writer;

pub use error::{BuildError, GlfError, Location, ParseError};
pub use parser::{Directive, EdgeKind, RawLabel};
pub use writer::{format_label, write_graph, write_substructure, write_substructures};

use sift_core::graph::{Corpus, Graph};
use sift_core::label::LabelTable;

/// Parse a graph file into a [`Corpus`].
///
/// # Arguments
///
/// * `input` - Graph file text
/// * `directed_default` - Directedness of `e` edges (false under the
///   undirected switch)
///
/// # Returns
///
/// * `Ok(Corpus)` - Parsed positive/negative graphs and label table
/// * `Err(GlfError)` - Syntax or semantic error with a source location
pub fn parse_corpus(input: &str, directed_default: bool) -> Result<Corpus, GlfError> {
    build::build_corpus(input, directed_default)
}

/// Parse a predefined-substructures file against an existing label table.
///
/// Each pattern is introduced by an `S` token and uses the same vertex and
/// edge grammar as graph files.
pub fn parse_patterns(
    input: &str,
    labels: &mut LabelTable,
    directed_default: bool,
) -> Result<Vec<Graph>, GlfError> {
    build::build_patterns(input, labels, directed_default)
}

/// Validate a graph file without keeping the result.
pub fn validate(input: &str, directed_default: bool) -> Result<(), GlfError> {
    parse_corpus(input, directed_default).map(|_| ())
}
