//! End-to-end runs through the public API, from raw facelet strings to
//! verified outcomes.

use cube_solver::config::DEFAULT_ORDER;
use cube_solver::report::{LABEL_ENCODING, LABEL_SOLUTION};
use cube_solver::{
    build_engine, invert_sequence, parse_moves, resolve, ConfigError, CubeEngine, DiagnosticSink, Engine,
    EngineConfig, EngineVariant, MemorySink, Move, Orchestrator, OrchestratorState, Outcome,
    PerformanceFlags, PuzzleState, RunOptions, Solution, SolveError, SolveRequest,
};

fn request_for(size: usize, scramble: &str) -> SolveRequest {
    let mut state = PuzzleState::solved(size);
    state.apply_all(&parse_moves(scramble).unwrap()).unwrap();
    SolveRequest {
        state: state.encoding(false),
        ..Default::default()
    }
}

fn run(
    request: &SolveRequest,
    seed: &[Move],
) -> (Result<Outcome, SolveError>, Orchestrator<MemorySink>) {
    let resolved = resolve(request).unwrap();
    let engine = build_engine(resolved.variant, resolved.state, resolved.engine).unwrap();
    let mut orchestrator = Orchestrator::new(engine, MemorySink::new(false), RunOptions::default());
    let result = orchestrator.run(seed);
    (result, orchestrator)
}

/// Wraps a real engine but claims a different solution than it found
struct MisreportingEngine {
    inner: CubeEngine,
    claimed: Solution,
}

impl Engine for MisreportingEngine {
    fn size(&self) -> usize {
        self.inner.size()
    }
    fn name(&self) -> String {
        "misreporting".to_string()
    }
    fn rotate(&mut self, mv: &Move) -> Result<(), SolveError> {
        self.inner.rotate(mv)
    }
    fn sanity_check(&self) -> Result<(), SolveError> {
        self.inner.sanity_check()
    }
    fn solve(&mut self, seed: &[Move]) -> Result<(), SolveError> {
        self.inner.solve(seed)?;
        let mut moves = self.inner.solution().moves().to_vec();
        moves.push(Move::outer(cube_solver::Face::U));
        self.claimed = Solution::from_moves(moves);
        Ok(())
    }
    fn solution(&self) -> &Solution {
        &self.claimed
    }
    fn solved(&self) -> bool {
        self.inner.solved()
    }
    fn re_init(&mut self) {
        self.inner.re_init();
    }
    fn canonical_encoding(&self, normalize: bool) -> String {
        self.inner.canonical_encoding(normalize)
    }
    fn render_state(&self) -> String {
        self.inner.render_state()
    }
    fn render_layout(&self) -> String {
        self.inner.render_layout()
    }
    fn phase(&self) -> String {
        self.inner.phase()
    }
}

/// Records the seed handed to `solve`
struct RecordingEngine {
    inner: CubeEngine,
    seen: Option<Vec<Move>>,
}

impl Engine for RecordingEngine {
    fn size(&self) -> usize {
        self.inner.size()
    }
    fn name(&self) -> String {
        self.inner.name()
    }
    fn rotate(&mut self, mv: &Move) -> Result<(), SolveError> {
        self.inner.rotate(mv)
    }
    fn sanity_check(&self) -> Result<(), SolveError> {
        self.inner.sanity_check()
    }
    fn solve(&mut self, seed: &[Move]) -> Result<(), SolveError> {
        self.seen = Some(seed.to_vec());
        self.inner.solve(seed)
    }
    fn solution(&self) -> &Solution {
        self.inner.solution()
    }
    fn solved(&self) -> bool {
        self.inner.solved()
    }
    fn re_init(&mut self) {
        self.inner.re_init();
    }
    fn canonical_encoding(&self, normalize: bool) -> String {
        self.inner.canonical_encoding(normalize)
    }
    fn render_state(&self) -> String {
        self.inner.render_state()
    }
    fn render_layout(&self) -> String {
        self.inner.render_layout()
    }
    fn phase(&self) -> String {
        self.inner.phase()
    }
}

#[test]
fn test_already_solved_cube() {
    let (result, orchestrator) = run(&request_for(3, ""), &[]);
    let Outcome::Solved(report) = result.unwrap() else {
        panic!("expected a solve");
    };
    assert!(report.solution.is_empty());
    assert!(orchestrator.engine().solved());
    assert_eq!(orchestrator.state(), OrchestratorState::Verified);
}

#[test]
fn test_quarter_turn_scramble() {
    let request = request_for(3, "R'");
    let resolved = resolve(&request).unwrap();
    let max_depth = resolved.variant.depth_limit(resolved.mode);

    let (result, orchestrator) = run(&request, &[]);
    let Outcome::Solved(report) = result.unwrap() else {
        panic!("expected a solve");
    };
    assert_eq!(report.solution.to_notation(), "R");
    assert!(report.solution.len() <= max_depth);
    assert!(orchestrator.engine().solved());
}

#[test]
fn test_seed_reaches_engine_in_forward_order() {
    let mut state = PuzzleState::solved(4);
    state.apply_all(&parse_moves("R U F").unwrap()).unwrap();
    let inner = CubeEngine::new(EngineVariant::Cube444, state, EngineConfig::default()).unwrap();
    let engine = RecordingEngine { inner, seen: None };

    // undo list as supplied on the command line
    let seed = invert_sequence(&parse_moves("U F").unwrap());
    let mut orchestrator =
        Orchestrator::new(Box::new(engine), MemorySink::new(false), RunOptions::default());
    let Outcome::Solved(report) = orchestrator.run(&seed).unwrap() else {
        panic!("expected a solve");
    };

    assert_eq!(seed, parse_moves("F' U'").unwrap());
    assert_eq!(report.solution.to_notation(), "F' U' R'");
    assert_eq!(report.solution.phases()[0].label, "seed");
}

#[test]
fn test_recording_engine_sees_exact_seed() {
    let mut state = PuzzleState::solved(4);
    state.apply_all(&parse_moves("Rw U").unwrap()).unwrap();
    let inner = CubeEngine::new(EngineVariant::Cube444, state, EngineConfig::default()).unwrap();
    let mut engine = RecordingEngine { inner, seen: None };

    let seed = invert_sequence(&parse_moves("U").unwrap());
    engine.solve(&seed).unwrap();
    assert_eq!(engine.seen, Some(parse_moves("U'").unwrap()));
    assert_eq!(engine.solution().moves()[0], seed[0]);
}

#[test]
fn test_bad_length_fails_before_engine() {
    let request = SolveRequest {
        state: "U".repeat(53),
        ..Default::default()
    };
    assert_eq!(
        resolve(&request).map(|r| r.size),
        Err(ConfigError::InvalidLength(53))
    );
}

#[test]
fn test_misreported_solution_is_caught() {
    let mut state = PuzzleState::solved(3);
    state.apply(&"F".parse().unwrap()).unwrap();
    let inner = CubeEngine::new(EngineVariant::Cube333, state, EngineConfig::default()).unwrap();
    let engine = MisreportingEngine {
        inner,
        claimed: Solution::new(),
    };
    let mut orchestrator =
        Orchestrator::new(Box::new(engine), MemorySink::new(false), RunOptions::default());

    match orchestrator.run(&[]) {
        Err(SolveError::Correctness { encoding }) => assert_eq!(encoding.len(), 54),
        other => panic!("expected a correctness error, got {:?}", other),
    }
    assert_eq!(orchestrator.state(), OrchestratorState::Failed);
    assert!(orchestrator.sink().last(LABEL_ENCODING).is_some());
    assert!(orchestrator.sink().is_verbose());
}

#[test]
fn test_calibration_outcome() {
    let mut request = request_for(6, "R U F L");
    request.collect_heuristic_stats = true;

    let (result, orchestrator) = run(&request, &[]);
    let Outcome::Calibrated(report) = result.unwrap() else {
        panic!("expected calibration");
    };
    assert_eq!(report.medians.len(), report.raw.len());
    assert!(!report.medians.is_empty());
    assert_eq!(orchestrator.state(), OrchestratorState::Calibrating);
    assert!(orchestrator.sink().last(LABEL_SOLUTION).is_none());
}

#[test]
fn test_exhaustion_without_samples_is_fatal() {
    let (result, orchestrator) = run(&request_for(6, "R U F L"), &[]);
    assert!(matches!(result, Err(SolveError::NotSolving { .. })));
    assert_eq!(orchestrator.state(), OrchestratorState::Failed);
}

#[test]
fn test_alternate_palette_and_openwith() {
    // solved cube in the white/green palette, scrambled by the opener
    let raw = ["W", "R", "G", "Y", "O", "B"]
        .iter()
        .map(|c| c.repeat(9))
        .collect::<String>();
    let request = SolveRequest {
        state: raw,
        order: DEFAULT_ORDER.to_string(),
        flags: PerformanceFlags {
            fast: false,
            normal: true,
            slow: false,
        },
        openwith: parse_moves("U R").unwrap(),
        ..Default::default()
    };

    let (result, _) = run(&request, &[]);
    let Outcome::Solved(report) = result.unwrap() else {
        panic!("expected a solve");
    };
    assert_eq!(report.solution.to_notation(), "R' U'");
}
