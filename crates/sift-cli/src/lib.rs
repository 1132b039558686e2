//! sift-cli - command-line driver for substructure discovery.
//!
//! The binary is a thin wrapper: argument parsing and validation live in
//! [`args`], result rendering in [`report`], and [`execute`] ties file IO,
//! the codec, and the engine together.

pub mod args;
pub mod report;

use std::fs;

use anyhow::{Context, Result};
use log::info;

use crate::args::Cli;

/// Run one discovery invocation end to end.
pub fn execute(cli: Cli) -> Result<()> {
    let params = cli.to_params()?;
    let directed_default = !cli.undirected;

    let text = fs::read_to_string(&cli.graph_file)
        .with_context(|| format!("reading {}", cli.graph_file.display()))?;
    let mut corpus = glf_codec::parse_corpus(&text, directed_default)
        .with_context(|| format!("parsing {}", cli.graph_file.display()))?;
    info!(
        "positive graph: {} vertices, {} edges, {} example(s); negative: {}",
        corpus.positive.vertex_count(),
        corpus.positive.edge_count(),
        corpus.positive_example_count(),
        corpus
            .negative
            .as_ref()
            .map(|g| format!("{} vertices, {} edges", g.vertex_count(), g.edge_count()))
            .unwrap_or_else(|| "none".to_string()),
    );

    let patterns = match &cli.ps {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            glf_codec::parse_patterns(&text, &mut corpus.labels, directed_default)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => Vec::new(),
    };

    let result = sift_core::run(&mut corpus, &patterns, &params);

    print!("{}", report::render_text(&result, &corpus));

    if let Some(path) = &cli.out {
        fs::write(path, report::render_substructures(&result, &corpus))
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &cli.compressed {
        fs::write(path, glf_codec::write_graph(&corpus.positive, &corpus.labels))
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &cli.json {
        let summary = report::summarize(&result, &corpus);
        fs::write(path, serde_json::to_string_pretty(&summary)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
