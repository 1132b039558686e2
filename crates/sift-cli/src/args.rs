//! Command-line arguments and their mapping onto [`SearchParams`].

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use sift_core::{EvalMethod, SearchParams};

#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(about = "Discover repeated substructures in labeled graphs")]
#[command(version)]
pub struct Cli {
    /// Graph file with positive (XP) and optional negative (XN) examples
    pub graph_file: PathBuf,

    /// Cap on substructure expansions (default: half the positive edge count)
    #[arg(long)]
    pub limit: Option<usize>,

    /// How many best substructures to report per iteration
    #[arg(long, default_value_t = 3)]
    pub num_best_subs: usize,

    /// Beam width of the search
    #[arg(long, default_value_t = 4)]
    pub beam: usize,

    /// Largest pattern to grow, in vertices (default: all of the graph)
    #[arg(long)]
    pub max_vertices: Option<usize>,

    /// Smallest pattern worth reporting, in vertices
    #[arg(long, default_value_t = 1)]
    pub min_vertices: usize,

    /// Number of discover-compress iterations
    #[arg(long, default_value_t = 1)]
    pub iterations: usize,

    /// Match threshold in [0, 1]; 0 means exact matching
    #[arg(long, default_value_t = 0.0)]
    pub threshold: f64,

    /// Evaluate and compress with overlapping instances
    #[arg(long)]
    pub overlap: bool,

    /// Treat `e` edges as undirected
    #[arg(long)]
    pub undirected: bool,

    /// Scoring function
    #[arg(long, value_enum, default_value_t = EvalArg::Mdl)]
    pub eval: EvalArg,

    /// Drop extensions scoring below their parent
    #[arg(long)]
    pub prune: bool,

    /// Attempt recursive substructures when retiring a candidate
    #[arg(long)]
    pub recursion: bool,

    /// Bound the beam by distinct values instead of by length
    #[arg(long)]
    pub value_based: bool,

    /// Predefined-substructures file, compressed out before discovery
    #[arg(long)]
    pub ps: Option<PathBuf>,

    /// Write the best substructures to this file
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Write the final compressed graph to this file
    #[arg(long)]
    pub compressed: Option<PathBuf>,

    /// Write the run summary as JSON to this file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Verbosity from 1 (errors only) to 5 (trace)
    #[arg(long, default_value_t = 2)]
    pub output_level: u8,
}

/// CLI spelling of the evaluation method.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalArg {
    Mdl,
    Size,
    Setcover,
}

impl std::fmt::Display for EvalArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EvalArg::Mdl => "mdl",
            EvalArg::Size => "size",
            EvalArg::Setcover => "setcover",
        };
        write!(f, "{}", name)
    }
}

impl From<EvalArg> for EvalMethod {
    fn from(arg: EvalArg) -> Self {
        match arg {
            EvalArg::Mdl => EvalMethod::Mdl,
            EvalArg::Size => EvalMethod::Size,
            EvalArg::Setcover => EvalMethod::SetCover,
        }
    }
}

/// Configuration conflicts caught before any work starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("threshold must lie in [0, 1], got {0}")]
    ThresholdRange(f64),

    #[error("output level must lie in 1..=5, got {0}")]
    OutputLevel(u8),

    #[error("min-vertices {0} exceeds max-vertices {1}")]
    VertexRange(usize, usize),

    #[error("beam width must be at least 1")]
    EmptyBeam,
}

impl Cli {
    /// Validate the numeric arguments and build the engine parameters.
    pub fn to_params(&self) -> Result<SearchParams, ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::ThresholdRange(self.threshold));
        }
        if !(1..=5).contains(&self.output_level) {
            return Err(ConfigError::OutputLevel(self.output_level));
        }
        if let Some(max) = self.max_vertices {
            if self.min_vertices > max {
                return Err(ConfigError::VertexRange(self.min_vertices, max));
            }
        }
        if self.beam == 0 {
            return Err(ConfigError::EmptyBeam);
        }
        Ok(SearchParams {
            beam_width: self.beam,
            limit: self.limit,
            max_vertices: self.max_vertices,
            min_vertices: self.min_vertices,
            num_best_subs: self.num_best_subs,
            threshold: self.threshold,
            iterations: self.iterations,
            prune: self.prune,
            value_based: self.value_based,
            allow_overlap: self.overlap,
            recursion: self.recursion,
            eval: self.eval.into(),
            neg_weight: 1.0,
        })
    }
}

/// Map the 1-5 verbosity switch onto a log filter, clamping out-of-range
/// values so logging can start before validation reports them.
pub fn log_level(output_level: u8) -> log::LevelFilter {
    match output_level {
        0 | 1 => log::LevelFilter::Error,
        2 => log::LevelFilter::Warn,
        3 => log::LevelFilter::Info,
        4 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}
