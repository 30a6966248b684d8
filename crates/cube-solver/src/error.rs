//! Error taxonomy for resolving, solving and verifying a cube.
//!
//! Every fatal kind passes through the failure reporter before it reaches
//! the caller. `NotSolving` with samples is the one engine error the
//! orchestrator turns into a successful calibration outcome.

use std::path::PathBuf;

use thiserror::Error;

use crate::stats::HeuristicStats;

/// Malformed input detected before any engine is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("facelet string of length {0} is not 6*N*N for any integer N")]
    InvalidLength(usize),

    #[error("unsupported puzzle size {0}, need at least 2 layers")]
    UnsupportedSize(usize),

    #[error("face order {0:?} is not a permutation of URFDLB")]
    InvalidOrder(String),

    #[error("invalid color map {0:?}")]
    InvalidColorMap(String),

    #[error("unknown color {color:?} at facelet {index}")]
    UnknownColor { color: char, index: usize },

    #[error("no performance mode selected")]
    NoPerformanceMode,

    #[error("invalid move {0:?}")]
    InvalidMove(String),
}

/// Anything that can stop a solve run.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid cube state: {0}")]
    Validation(String),

    /// The engine ran out of search budget. `stats` holds whatever
    /// heuristic samples were gathered on the way.
    #[error("engine could not find a solution within bounds ({} sampled metrics)", stats.len())]
    NotSolving { stats: HeuristicStats },

    #[error("no steps found during {phase}")]
    SearchExhausted { phase: String },

    #[error("lookup table {} is missing", path.display())]
    MissingTable { path: PathBuf },

    #[error("lookup table {table}: invalid entry {key:?}")]
    InvalidLookupKey { table: String, key: String },

    #[error("cube should be solved but is not: {encoding}")]
    Correctness { encoding: String },

    #[error("engine has already produced a solution")]
    AlreadySolved,

    #[error("illegal state transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SolveError {
    /// Short machine-readable name used in the CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            SolveError::Config(_) => "config",
            SolveError::Validation(_) => "validation",
            SolveError::NotSolving { .. } => "not_solving",
            SolveError::SearchExhausted { .. } => "search_exhausted",
            SolveError::MissingTable { .. } => "missing_table",
            SolveError::InvalidLookupKey { .. } => "invalid_lookup_key",
            SolveError::Correctness { .. } => "correctness",
            SolveError::AlreadySolved => "already_solved",
            SolveError::IllegalTransition { .. } => "illegal_transition",
            SolveError::Io { .. } => "io",
        }
    }
}
