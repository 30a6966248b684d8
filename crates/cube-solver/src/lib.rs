//! Solve orchestrator for NxN twisty cubes.
//!
//! Raw facelet input is resolved into a validated cube and an engine
//! choice, the engine produces a solution, and every claimed solution is
//! replayed on the original cube before it is accepted.

pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod oracle;
pub mod orchestrator;
pub mod pruning;
pub mod puzzle;
pub mod report;
pub mod solver;
pub mod stats;
pub mod tables;

// Re-export main types
pub use config::{resolve, PerformanceFlags, PerformanceMode, ResolvedConfig, SolveRequest};
pub use engine::{build_engine, CubeEngine, Engine, EngineConfig, EngineVariant};
pub use error::{ConfigError, SolveError};
pub use executor::PuzzleState;
pub use oracle::verify;
pub use orchestrator::{
    CalibrationReport, Orchestrator, OrchestratorState, Outcome, RunOptions, SolveReport,
};
pub use puzzle::{invert_sequence, parse_moves, Face, Move, MoveSpan, Solution};
pub use report::{report_failure, DiagnosticSink, MemorySink, TracingSink};
pub use stats::HeuristicStats;
