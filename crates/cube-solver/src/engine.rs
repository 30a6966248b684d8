//! Engine capability contract and the engine family behind it.
//!
//! The orchestrator only ever talks to `dyn Engine`. Which implementation
//! it gets is a pure function of puzzle size and performance mode
//! ([`EngineVariant::select`]), the one place to extend when a new size
//! gets a dedicated engine.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::PerformanceMode;
use crate::error::{ConfigError, SolveError};
use crate::executor::PuzzleState;
use crate::puzzle::{Face, Move, MoveSpan, Solution};
use crate::solver::{search, MoveSet, SearchConfig, SearchResult};
use crate::tables::LookupTable;

/// What every solving engine must provide, whatever the puzzle size.
pub trait Engine {
    fn size(&self) -> usize;

    /// Human readable engine name, e.g. `3x3x3`
    fn name(&self) -> String;

    /// Turn the working cube. Not idempotent, never resets anything.
    fn rotate(&mut self, mv: &Move) -> Result<(), SolveError>;

    fn sanity_check(&self) -> Result<(), SolveError>;

    /// Produce a solution, extending `seed` (already in application order).
    /// May only be called once per engine.
    fn solve(&mut self, seed: &[Move]) -> Result<(), SolveError>;

    /// Moves produced so far; partial if `solve` failed
    fn solution(&self) -> &Solution;

    fn solved(&self) -> bool;

    /// Restore the original cube and drop any solution
    fn re_init(&mut self);

    fn canonical_encoding(&self, normalize: bool) -> String;

    fn render_state(&self) -> String;

    fn render_layout(&self) -> String;

    fn render_solution(&self, with_comments: bool) -> String {
        self.solution().export(with_comments)
    }

    /// Name of the current stage, for progress output only
    fn phase(&self) -> String;
}

/// Engine implementations, one per supported size plus two generic ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineVariant {
    Cube222,
    Cube333,
    Cube444,
    Cube555,
    /// Lighter 5x5x5 engine used in fast mode
    Cube555ForNnn,
    Cube666,
    Cube777,
    NnnEven(usize),
    NnnOdd(usize),
}

impl EngineVariant {
    pub fn select(size: usize, mode: PerformanceMode) -> Result<Self, ConfigError> {
        let variant = match size {
            0 | 1 => return Err(ConfigError::UnsupportedSize(size)),
            2 => EngineVariant::Cube222,
            3 => EngineVariant::Cube333,
            4 => EngineVariant::Cube444,
            5 if mode == PerformanceMode::Fast => EngineVariant::Cube555ForNnn,
            5 => EngineVariant::Cube555,
            6 => EngineVariant::Cube666,
            7 => EngineVariant::Cube777,
            n if n % 2 == 0 => EngineVariant::NnnEven(n),
            n => EngineVariant::NnnOdd(n),
        };
        Ok(variant)
    }

    pub fn size(self) -> usize {
        match self {
            EngineVariant::Cube222 => 2,
            EngineVariant::Cube333 => 3,
            EngineVariant::Cube444 => 4,
            EngineVariant::Cube555 | EngineVariant::Cube555ForNnn => 5,
            EngineVariant::Cube666 => 6,
            EngineVariant::Cube777 => 7,
            EngineVariant::NnnEven(n) | EngineVariant::NnnOdd(n) => n,
        }
    }

    pub fn name(self) -> String {
        let n = self.size();
        match self {
            EngineVariant::Cube555ForNnn => "5x5x5-for-NNN".to_string(),
            EngineVariant::NnnEven(_) => format!("{n}x{n}x{n}-even"),
            EngineVariant::NnnOdd(_) => format!("{n}x{n}x{n}-odd"),
            _ => format!("{n}x{n}x{n}"),
        }
    }

    /// Lookup table file consulted when a tables directory is configured
    pub fn table_file(self) -> String {
        let n = self.size();
        format!("lookup-table-{n}x{n}x{n}.txt")
    }

    /// Deepest search iteration for `mode`
    pub fn depth_limit(self, mode: PerformanceMode) -> usize {
        let (fast, normal, slow) = match self {
            EngineVariant::Cube222 => (6, 7, 8),
            EngineVariant::Cube333 => (5, 6, 7),
            EngineVariant::Cube555ForNnn => (3, 3, 3),
            _ => (3, 4, 5),
        };
        match mode {
            PerformanceMode::Fast => fast,
            PerformanceMode::Normal => normal,
            PerformanceMode::Slow => slow,
        }
    }

    /// Faces and layer spans searched over, each in all three turn amounts
    fn spans(self) -> Vec<(Face, MoveSpan)> {
        let outer = Face::ALL.iter().map(|&f| (f, MoveSpan::Outer));
        let wide = |faces: &[Face]| -> Vec<(Face, MoveSpan)> {
            faces.iter().map(|&f| (f, MoveSpan::Wide(2))).collect()
        };
        match self {
            // DBL corner stays put, every state is reachable with U R F
            EngineVariant::Cube222 => vec![
                (Face::U, MoveSpan::Outer),
                (Face::R, MoveSpan::Outer),
                (Face::F, MoveSpan::Outer),
            ],
            EngineVariant::Cube333 => outer.collect(),
            EngineVariant::Cube555ForNnn => outer
                .chain(wide(&[Face::U, Face::R, Face::F]))
                .collect(),
            _ => outer.chain(wide(&Face::ALL)).collect(),
        }
    }

    fn move_set(self) -> Result<MoveSet, ConfigError> {
        let moves = self
            .spans()
            .into_iter()
            .flat_map(|(face, span)| (1..=3).map(move |turns| Move::new(face, span, turns)))
            .collect();
        MoveSet::new(self.size(), moves)
    }
}

/// Construction-time engine settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub mode: PerformanceMode,
    pub tables_dir: Option<PathBuf>,
    /// Record heuristic samples when the search bound is exhausted
    pub collect_heuristic_stats: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: PerformanceMode::Fast,
            tables_dir: None,
            collect_heuristic_stats: false,
        }
    }
}

/// Build the engine for `variant` around `state`
pub fn build_engine(
    variant: EngineVariant,
    state: PuzzleState,
    config: EngineConfig,
) -> Result<Box<dyn Engine>, SolveError> {
    Ok(Box::new(CubeEngine::new(variant, state, config)?))
}

/// Bounded engine: seed, then lookup table, then depth-limited search.
#[derive(Debug)]
pub struct CubeEngine {
    variant: EngineVariant,
    config: EngineConfig,
    initial: PuzzleState,
    state: PuzzleState,
    solution: Solution,
    attempted: bool,
    moves: MoveSet,
    table: Option<LookupTable>,
}

impl CubeEngine {
    pub fn new(
        variant: EngineVariant,
        state: PuzzleState,
        config: EngineConfig,
    ) -> Result<Self, SolveError> {
        if state.size() != variant.size() {
            return Err(SolveError::Validation(format!(
                "{} engine cannot hold a cube of size {}",
                variant.name(),
                state.size()
            )));
        }
        let moves = variant.move_set()?;
        let table = config
            .tables_dir
            .as_ref()
            .map(|dir| LookupTable::new(dir.join(variant.table_file()), variant.size()));
        debug!(engine = %variant.name(), moves = moves.len(), "engine constructed");

        Ok(Self {
            variant,
            config,
            initial: state.clone(),
            state,
            solution: Solution::new(),
            attempted: false,
            moves,
            table,
        })
    }

    fn apply_recorded(&mut self, moves: &[Move]) -> Result<(), SolveError> {
        for mv in moves {
            self.state.apply(mv)?;
            self.solution.push(*mv);
        }
        Ok(())
    }

    /// Steps stored for the current cube, if a table is configured
    fn lookup(&self) -> Result<Option<Vec<Move>>, SolveError> {
        let Some(table) = &self.table else {
            return Ok(None);
        };
        if !table.is_loaded() {
            debug!(table = table.name(), path = %table.path().display(), "loading lookup table");
        }
        let key = self.state.encoding(true);
        Ok(table.steps(&key)?.map(|steps| steps.to_vec()))
    }
}

impl Engine for CubeEngine {
    fn size(&self) -> usize {
        self.variant.size()
    }

    fn name(&self) -> String {
        self.variant.name()
    }

    fn rotate(&mut self, mv: &Move) -> Result<(), SolveError> {
        self.state.apply(mv)?;
        Ok(())
    }

    fn sanity_check(&self) -> Result<(), SolveError> {
        self.state.sanity_check()
    }

    fn solve(&mut self, seed: &[Move]) -> Result<(), SolveError> {
        if self.attempted {
            return Err(SolveError::AlreadySolved);
        }
        self.attempted = true;

        if !seed.is_empty() {
            info!(moves = seed.len(), "extending seed solution");
            self.solution.begin_phase("seed");
            self.apply_recorded(seed)?;
        }
        if self.state.is_solved() {
            return Ok(());
        }

        if let Some(steps) = self.lookup()? {
            if steps.is_empty() {
                return Err(SolveError::SearchExhausted {
                    phase: self.phase(),
                });
            }
            info!(moves = steps.len(), "lookup table hit");
            self.solution.begin_phase("lookup table");
            self.apply_recorded(&steps)?;
            if self.state.is_solved() {
                return Ok(());
            }
        }

        let phase = self.phase();
        let config = SearchConfig {
            max_depth: self.variant.depth_limit(self.config.mode),
            collect_stats: self.config.collect_heuristic_stats,
        };
        info!(
            phase = %phase,
            max_depth = config.max_depth,
            mode = %self.config.mode,
            unsolved = self.state.unsolved_facelets(),
            "searching"
        );

        match search(self.size(), self.state.facelets(), &self.moves, &config) {
            SearchResult::Found(found) => {
                self.solution.begin_phase(&format!("{} search", phase));
                self.apply_recorded(&found)?;
                Ok(())
            }
            SearchResult::Exhausted(stats) => Err(SolveError::NotSolving { stats }),
        }
    }

    fn solution(&self) -> &Solution {
        &self.solution
    }

    fn solved(&self) -> bool {
        self.state.is_solved()
    }

    fn re_init(&mut self) {
        self.state = self.initial.clone();
        self.solution.clear();
    }

    fn canonical_encoding(&self, normalize: bool) -> String {
        self.state.encoding(normalize)
    }

    fn render_state(&self) -> String {
        self.state.render()
    }

    fn render_layout(&self) -> String {
        self.state.render_layout()
    }

    fn phase(&self) -> String {
        let phase = if self.state.is_solved() {
            "solved"
        } else if self.size() <= 3 {
            "solve"
        } else if !self.state.centers_solved() {
            "centers"
        } else if !self.state.edges_paired() {
            "edges"
        } else {
            "3x3x3"
        };
        phase.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::parse_moves;
    use std::io::Write;

    fn engine_for(size: usize, scramble: &str, config: EngineConfig) -> CubeEngine {
        let mut state = PuzzleState::solved(size);
        state.apply_all(&parse_moves(scramble).unwrap()).unwrap();
        let variant = EngineVariant::select(size, config.mode).unwrap();
        CubeEngine::new(variant, state, config).unwrap()
    }

    #[test]
    fn test_variant_selection() {
        use PerformanceMode::*;
        assert_eq!(EngineVariant::select(2, Fast), Ok(EngineVariant::Cube222));
        assert_eq!(EngineVariant::select(3, Slow), Ok(EngineVariant::Cube333));
        assert_eq!(EngineVariant::select(4, Normal), Ok(EngineVariant::Cube444));
        assert_eq!(EngineVariant::select(5, Fast), Ok(EngineVariant::Cube555ForNnn));
        assert_eq!(EngineVariant::select(5, Normal), Ok(EngineVariant::Cube555));
        assert_eq!(EngineVariant::select(5, Slow), Ok(EngineVariant::Cube555));
        assert_eq!(EngineVariant::select(6, Fast), Ok(EngineVariant::Cube666));
        assert_eq!(EngineVariant::select(7, Fast), Ok(EngineVariant::Cube777));
        assert_eq!(EngineVariant::select(8, Fast), Ok(EngineVariant::NnnEven(8)));
        assert_eq!(EngineVariant::select(9, Slow), Ok(EngineVariant::NnnOdd(9)));
        assert_eq!(
            EngineVariant::select(1, Fast),
            Err(ConfigError::UnsupportedSize(1))
        );
    }

    #[test]
    fn test_every_variant_builds_a_move_set() {
        for size in 2..=9 {
            for mode in [PerformanceMode::Fast, PerformanceMode::Slow] {
                let variant = EngineVariant::select(size, mode).unwrap();
                assert_eq!(variant.size(), size);
                assert!(!variant.move_set().unwrap().is_empty());
            }
        }
    }

    #[test]
    fn test_solves_quarter_turn() {
        let mut engine = engine_for(3, "F", EngineConfig::default());
        engine.solve(&[]).unwrap();
        assert!(engine.solved());
        assert_eq!(engine.solution().to_notation(), "F'");
    }

    #[test]
    fn test_seed_is_extended() {
        let mut engine = engine_for(4, "R U", EngineConfig::default());
        let seed = parse_moves("U'").unwrap();
        engine.solve(&seed).unwrap();
        assert!(engine.solved());
        assert_eq!(engine.solution().moves()[0], seed[0]);
        assert_eq!(engine.solution().to_notation(), "U' R'");
        assert_eq!(engine.solution().phases()[0].label, "seed");
    }

    #[test]
    fn test_solve_only_once() {
        let mut engine = engine_for(2, "R", EngineConfig::default());
        engine.solve(&[]).unwrap();
        assert!(matches!(engine.solve(&[]), Err(SolveError::AlreadySolved)));
    }

    #[test]
    fn test_re_init_restores_original() {
        let mut engine = engine_for(3, "R U", EngineConfig::default());
        let before = engine.canonical_encoding(false);
        engine.solve(&[]).unwrap();
        assert!(engine.solved());
        engine.re_init();
        assert_eq!(engine.canonical_encoding(false), before);
        assert!(engine.solution().is_empty());
    }

    #[test]
    fn test_exhausted_search_reports_stats_when_requested() {
        let config = EngineConfig {
            collect_heuristic_stats: true,
            ..Default::default()
        };
        let mut engine = engine_for(5, "R U F L", config);
        match engine.solve(&[]) {
            Err(SolveError::NotSolving { stats }) => assert!(!stats.is_empty()),
            other => panic!("expected NotSolving, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_missing_table_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            tables_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let mut engine = engine_for(2, "R", config);
        assert!(matches!(
            engine.solve(&[]),
            Err(SolveError::MissingTable { .. })
        ));
    }

    #[test]
    fn test_lookup_table_steps_used() {
        let dir = tempfile::tempdir().unwrap();
        let mut scrambled = PuzzleState::solved(2);
        scrambled.apply_all(&parse_moves("R U").unwrap()).unwrap();
        let mut file =
            std::fs::File::create(dir.path().join(EngineVariant::Cube222.table_file())).unwrap();
        writeln!(file, "{}:U' R'", scrambled.encoding(true)).unwrap();

        let config = EngineConfig {
            tables_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let mut engine = engine_for(2, "R U", config);
        engine.solve(&[]).unwrap();
        assert_eq!(engine.solution().export(true), "U' R' // lookup table");
    }

    #[test]
    fn test_lookup_entry_without_steps() {
        let dir = tempfile::tempdir().unwrap();
        let mut scrambled = PuzzleState::solved(2);
        scrambled.apply(&"F".parse().unwrap()).unwrap();
        let mut file =
            std::fs::File::create(dir.path().join(EngineVariant::Cube222.table_file())).unwrap();
        writeln!(file, "{}:", scrambled.encoding(true)).unwrap();

        let config = EngineConfig {
            tables_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let mut engine = engine_for(2, "F", config);
        assert!(matches!(
            engine.solve(&[]),
            Err(SolveError::SearchExhausted { .. })
        ));
    }

    #[test]
    fn test_phase_progression_on_big_cube() {
        assert_eq!(engine_for(4, "", EngineConfig::default()).phase(), "solved");
        assert_eq!(engine_for(4, "Rw", EngineConfig::default()).phase(), "centers");
        assert_eq!(engine_for(4, "R", EngineConfig::default()).phase(), "3x3x3");
        assert_eq!(engine_for(3, "R", EngineConfig::default()).phase(), "solve");
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let err = CubeEngine::new(
            EngineVariant::Cube333,
            PuzzleState::solved(4),
            EngineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SolveError::Validation(_)));
    }
}
