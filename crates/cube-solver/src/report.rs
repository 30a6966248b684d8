//! Diagnostic output and the failure reporter.
//!
//! Library code never prints. Rendered cubes and solutions go to an
//! injected [`DiagnosticSink`]: the binary uses [`TracingSink`], tests use
//! [`MemorySink`] and inspect what was emitted.

use tracing::{error, info};

use crate::engine::Engine;
use crate::error::SolveError;
use crate::puzzle::Solution;

pub const LABEL_LAYOUT: &str = "layout";
pub const LABEL_STATE: &str = "state";
pub const LABEL_SOLUTION: &str = "solution";
pub const LABEL_ENCODING: &str = "canonical encoding";

pub trait DiagnosticSink {
    /// Whether routine cube renderings should be emitted
    fn is_verbose(&self) -> bool;

    fn set_verbose(&mut self, verbose: bool);

    fn emit(&mut self, label: &str, text: &str);
}

/// Sends every diagnostic to the `tracing` subscriber
#[derive(Debug, Default)]
pub struct TracingSink {
    verbose: bool,
}

impl TracingSink {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl DiagnosticSink for TracingSink {
    fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    fn emit(&mut self, label: &str, text: &str) {
        info!(target: "cube_solver::diagnostics", "{}:\n{}\n", label, text);
    }
}

/// Keeps diagnostics in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    verbose: bool,
    records: Vec<(String, String)>,
}

impl MemorySink {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[(String, String)] {
        &self.records
    }

    pub fn labels(&self) -> Vec<&str> {
        self.records.iter().map(|(label, _)| label.as_str()).collect()
    }

    /// Text of the last record with `label`
    pub fn last(&self, label: &str) -> Option<&str> {
        self.records
            .iter()
            .rev()
            .find(|(l, _)| l == label)
            .map(|(_, text)| text.as_str())
    }
}

impl DiagnosticSink for MemorySink {
    fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    fn emit(&mut self, label: &str, text: &str) {
        self.records.push((label.to_string(), text.to_string()));
    }
}

/// Dump everything needed to diagnose `err`, then hand it back for
/// propagation. `claimed` overrides the engine's own solution, which is
/// gone once a replay has reset the engine.
pub fn report_failure(
    engine: &dyn Engine,
    sink: &mut dyn DiagnosticSink,
    err: SolveError,
    claimed: Option<&Solution>,
) -> SolveError {
    sink.set_verbose(true);
    error!(kind = err.kind(), engine = %engine.name(), "{}", err);

    sink.emit(LABEL_LAYOUT, &engine.render_layout());
    sink.emit(LABEL_STATE, &engine.render_state());
    let solution = match claimed {
        Some(solution) => solution.export(false),
        None => engine.render_solution(false),
    };
    sink.emit(LABEL_SOLUTION, &solution);
    sink.emit(LABEL_ENCODING, &engine.canonical_encoding(true));
    err
}
