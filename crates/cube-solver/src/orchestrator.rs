//! Solve orchestrator: drives one engine through one solve.
//!
//! ```text
//! Init -> SanityChecked -> Solving -> Solved -> Verified
//!                                  \-> Calibrating
//! any non-terminal state -> Failed
//! ```
//!
//! A solution reported by the engine is never trusted on its own: the
//! `Solved` state always goes through the replay oracle before the run
//! counts as a success. Every transition is checked against the table
//! above and recorded.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::engine::Engine;
use crate::error::SolveError;
use crate::oracle::verify;
use crate::puzzle::{Move, Solution};
use crate::report::{report_failure, DiagnosticSink, LABEL_SOLUTION, LABEL_STATE};
use crate::stats::HeuristicStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    Init,
    SanityChecked,
    Solving,
    /// Engine claims a solution, replay pending
    Solved,
    /// Replay confirmed the solution - terminal
    Verified,
    /// Search bound hit with heuristic samples - terminal
    Calibrating,
    Failed,
}

impl OrchestratorState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Calibrating | Self::Failed)
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "Init",
            Self::SanityChecked => "SanityChecked",
            Self::Solving => "Solving",
            Self::Solved => "Solved",
            Self::Verified => "Verified",
            Self::Calibrating => "Calibrating",
            Self::Failed => "Failed",
        };
        write!(f, "{}", name)
    }
}

fn is_legal_transition(from: OrchestratorState, to: OrchestratorState) -> bool {
    use OrchestratorState::*;

    if to == Failed && !from.is_terminal() {
        return true;
    }

    matches!(
        (from, to),
        (Init, SanityChecked)
            | (SanityChecked, Solving)
            | (Solving, Solved)
            | (Solving, Calibrating)
            | (Solved, Verified)
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionRecord {
    pub from: OrchestratorState,
    pub to: OrchestratorState,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Current state plus the log of how it got there
#[derive(Debug)]
pub struct StateMachine {
    current: OrchestratorState,
    created_at: Instant,
    transitions: Vec<TransitionRecord>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: OrchestratorState::Init,
            created_at: Instant::now(),
            transitions: Vec::new(),
        }
    }

    pub fn current(&self) -> OrchestratorState {
        self.current
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    pub fn advance(
        &mut self,
        to: OrchestratorState,
        reason: Option<&str>,
    ) -> Result<(), SolveError> {
        if !is_legal_transition(self.current, to) {
            return Err(SolveError::IllegalTransition {
                from: self.current.to_string(),
                to: to.to_string(),
            });
        }
        debug!(from = %self.current, to = %to, "state transition");
        self.transitions.push(TransitionRecord {
            from: self.current,
            to,
            elapsed_ms: self.created_at.elapsed().as_millis() as u64,
            reason: reason.map(String::from),
        });
        self.current = to;
        Ok(())
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Emit every replay step
    pub trace_steps: bool,
    /// Annotate the emitted solution with stage names
    pub comments: bool,
}

#[derive(Debug, Clone)]
pub struct SolveReport {
    pub solution: Solution,
    /// Encoding of the cube the solve started from
    pub initial_encoding: String,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct CalibrationReport {
    /// One integer median per metric
    pub medians: BTreeMap<String, i64>,
    pub raw: HeuristicStats,
}

/// Successful ends of a run; failures come back as `Err`
#[derive(Debug, Clone)]
pub enum Outcome {
    Solved(SolveReport),
    Calibrated(CalibrationReport),
}

pub struct Orchestrator<S: DiagnosticSink> {
    engine: Box<dyn Engine>,
    sink: S,
    options: RunOptions,
    machine: StateMachine,
}

impl<S: DiagnosticSink> Orchestrator<S> {
    pub fn new(engine: Box<dyn Engine>, sink: S, options: RunOptions) -> Self {
        Self {
            engine,
            sink,
            options,
            machine: StateMachine::new(),
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.machine.current()
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        self.machine.transitions()
    }

    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run the whole pipeline. `seed` is in application order. Only the
    /// first call can succeed; later calls fail with `IllegalTransition`.
    pub fn run(&mut self, seed: &[Move]) -> Result<Outcome, SolveError> {
        let started = Instant::now();
        info!(engine = %self.engine.name(), seed = seed.len(), "solve starting");

        if let Err(err) = self.engine.sanity_check() {
            return Err(self.fail(err));
        }
        self.advance(OrchestratorState::SanityChecked, None)?;
        if self.sink.is_verbose() {
            self.sink.emit(LABEL_STATE, &self.engine.render_state());
        }
        let initial_encoding = self.engine.canonical_encoding(false);

        self.advance(OrchestratorState::Solving, None)?;
        match self.engine.solve(seed) {
            Ok(()) => {}
            Err(SolveError::NotSolving { stats }) if !stats.is_empty() => {
                return self.calibrate(stats);
            }
            Err(err) => return Err(self.fail(err)),
        }

        self.advance(OrchestratorState::Solved, None)?;
        let solution = self.engine.solution().clone();
        info!(moves = solution.len(), "engine reported a solution");
        if self.sink.is_verbose() {
            self.sink.emit(LABEL_STATE, &self.engine.render_state());
        }
        self.sink.emit(
            LABEL_SOLUTION,
            &self.engine.render_solution(self.options.comments),
        );

        let trace: Option<&mut dyn DiagnosticSink> = if self.options.trace_steps {
            Some(&mut self.sink)
        } else {
            None
        };
        if let Err(err) = verify(self.engine.as_mut(), &solution, trace) {
            // the replay reset the engine, so the claimed moves are dumped from here
            return Err(self.fail_with(err, Some(&solution)));
        }
        self.advance(OrchestratorState::Verified, Some("replay solved the cube"))?;

        let elapsed = started.elapsed();
        info!(
            moves = solution.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "solution verified"
        );
        Ok(Outcome::Solved(SolveReport {
            solution,
            initial_encoding,
            elapsed,
        }))
    }

    // TODO: decide whether calibration runs should also dump the cube
    // through the failure reporter's diagnostics.
    /// Not a failure: the heuristic samples are the product of the run.
    fn calibrate(&mut self, stats: HeuristicStats) -> Result<Outcome, SolveError> {
        self.advance(
            OrchestratorState::Calibrating,
            Some("search bound exhausted with heuristic samples"),
        )?;
        info!(engine = %self.engine.name(), "heuristic stats raw: {:?}", stats);

        let medians = stats.clone().into_medians();
        for (metric, median) in &medians {
            info!(metric = %metric, median, "heuristic stats median");
        }
        Ok(Outcome::Calibrated(CalibrationReport {
            medians,
            raw: stats,
        }))
    }

    /// Transition, reporting an illegal one like any other failure
    fn advance(&mut self, to: OrchestratorState, reason: Option<&str>) -> Result<(), SolveError> {
        match self.machine.advance(to, reason) {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail(err)),
        }
    }

    fn fail(&mut self, err: SolveError) -> SolveError {
        self.fail_with(err, None)
    }

    fn fail_with(&mut self, err: SolveError, claimed: Option<&Solution>) -> SolveError {
        if let Err(illegal) = self.machine.advance(OrchestratorState::Failed, Some(err.kind())) {
            warn!("{}", illegal);
        }
        report_failure(self.engine.as_ref(), &mut self.sink, err, claimed)
    }
}
