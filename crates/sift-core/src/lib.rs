//! sift-core - substructure discovery in labeled graphs
//!
//! This crate finds connected subgraph patterns whose occurrences repeat
//! across one or more positive example graphs and, optionally, stay out of
//! negative counter-example graphs. Discovered patterns can compress the
//! graph by collapsing each occurrence to a placeholder vertex, and the
//! discover-compress cycle can iterate to build a hierarchy of patterns.
//!
//! # Overview
//!
//! - [`graph`]: flat vertex/edge stores and the [`Corpus`](graph::Corpus)
//!   holding the run's graphs and label table.
//! - [`instance`]: occurrences of a pattern: sorted index lists, one-edge
//!   extension, overlap and union operations.
//! - [`matcher`]: exact and edit-cost-bounded inexact graph matching.
//! - [`evaluate`]: MDL, size, and set-cover scoring.
//! - [`discover`]: the beam search over candidate substructures.
//! - [`compress`]: rewriting a graph by a substructure's instances.
//! - [`predefined`]: locating instances of user-supplied patterns.
//! - [`run`]: the outer driver tying the above into iterations.
//!
//! # Quick start
//!
//! ```rust
//! use sift_core::graph::Corpus;
//! use sift_core::label::Label;
//! use sift_core::params::SearchParams;
//!
//! // two disjoint directed triangles
//! let mut corpus = Corpus::default();
//! let a = corpus.labels.insert(Label::Text("a".to_string()));
//! let x = corpus.labels.insert(Label::Text("x".to_string()));
//! for base in [0, 3] {
//!     for _ in 0..3 {
//!         corpus.positive.add_vertex(a);
//!     }
//!     corpus.positive.add_edge(base, base + 1, true, x);
//!     corpus.positive.add_edge(base + 1, base + 2, true, x);
//!     corpus.positive.add_edge(base + 2, base, true, x);
//! }
//! corpus.positive_starts = vec![0];
//!
//! let result = sift_core::run::run(&mut corpus, &[], &SearchParams::default());
//! let best = &result.iterations[0].subs[0];
//! assert_eq!(best.definition.vertex_count(), 3);
//! assert_eq!(best.instances.len(), 2);
//! ```
//!
//! The engine is single-threaded and deterministic: identical inputs and
//! parameters produce identical discovered lists.

pub mod compress;
pub mod discover;
pub mod evaluate;
pub mod graph;
pub mod instance;
pub mod label;
pub mod matcher;
pub mod params;
pub mod predefined;
pub mod run;

pub use discover::{discover, Substructure};
pub use evaluate::EvalMethod;
pub use graph::{Corpus, Graph};
pub use label::{Label, LabelId, LabelTable};
pub use params::SearchParams;
pub use run::{run, RunResult};
