//! Bounded iterative-deepening search over a fixed move set.
//!
//! Each engine variant hands this module its own move set and a depth
//! bound picked by the performance mode. The search either returns the
//! first (shortest) sequence that solves the cube or gives up once the
//! bound is exhausted, optionally with per-depth heuristic samples.

use smallvec::SmallVec;
use tracing::debug;

use crate::error::ConfigError;
use crate::executor::{apply_permutation, is_solved_facelets, move_permutation, unsolved_facelets};
use crate::pruning::{should_reject_sequence, valid_followers};
use crate::puzzle::{Face, Move};
use crate::stats::HeuristicStats;

/// Metric names recorded on exhaustion
pub const METRIC_NODES: &str = "nodes";
pub const METRIC_UNSOLVED: &str = "best-unsolved-facelets";

/// Configuration for one search run
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Deepest iteration tried
    pub max_depth: usize,
    /// Gather heuristic samples for calibration
    pub collect_stats: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            collect_stats: false,
        }
    }
}

/// Result of the search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult {
    Found(Vec<Move>),
    /// Bound exhausted; stats are empty unless collection was requested
    Exhausted(HeuristicStats),
}

/// Moves together with their precomputed sticker permutations
#[derive(Debug, Clone)]
pub struct MoveSet {
    moves: Vec<Move>,
    perms: Vec<Vec<usize>>,
}

impl MoveSet {
    pub fn new(size: usize, moves: Vec<Move>) -> Result<Self, ConfigError> {
        let perms = moves
            .iter()
            .map(|mv| {
                move_permutation(size, mv).ok_or_else(|| ConfigError::InvalidMove(mv.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { moves, perms })
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

struct Search<'a> {
    size: usize,
    moves: &'a MoveSet,
    /// One scratch state per depth
    buffers: Vec<Vec<Face>>,
    path: SmallVec<[usize; 16]>,
    nodes: u64,
    best_unsolved: usize,
    collect_stats: bool,
}

impl<'a> Search<'a> {
    fn dfs(&mut self, depth: usize, remaining: usize) -> bool {
        if is_solved_facelets(self.size, &self.buffers[depth]) {
            return true;
        }
        if remaining == 0 {
            if self.collect_stats {
                let unsolved = unsolved_facelets(self.size, &self.buffers[depth]);
                self.best_unsolved = self.best_unsolved.min(unsolved);
            }
            return false;
        }

        let moves = self.moves;
        let last = self.path.last().map(|&i| &moves.moves()[i]);
        let candidates: SmallVec<[usize; 64]> = valid_followers(last, moves.moves()).collect();

        for i in candidates {
            {
                let (head, tail) = self.buffers.split_at_mut(depth + 1);
                apply_permutation(&head[depth], &mut tail[0], &moves.perms[i]);
            }
            self.nodes += 1;
            self.path.push(i);
            if self.dfs(depth + 1, remaining - 1) {
                return true;
            }
            self.path.pop();
        }
        false
    }
}

/// Find the shortest sequence (within `config.max_depth`) that solves
/// `start`.
pub fn search(size: usize, start: &[Face], moves: &MoveSet, config: &SearchConfig) -> SearchResult {
    let mut search = Search {
        size,
        moves,
        buffers: vec![start.to_vec(); config.max_depth + 1],
        path: SmallVec::new(),
        nodes: 0,
        best_unsolved: usize::MAX,
        collect_stats: config.collect_stats,
    };
    let mut stats = HeuristicStats::new();

    for limit in 0..=config.max_depth {
        search.nodes = 0;
        search.best_unsolved = usize::MAX;
        search.path.clear();

        if search.dfs(0, limit) {
            let found: Vec<Move> = search.path.iter().map(|&i| moves.moves()[i]).collect();
            debug_assert!(!should_reject_sequence(&found));
            debug!(depth = limit, nodes = search.nodes, "search found solution");
            return SearchResult::Found(found);
        }

        debug!(depth = limit, nodes = search.nodes, "search depth exhausted");
        if config.collect_stats && limit > 0 {
            stats.record(METRIC_NODES, search.nodes as i64);
            stats.record(METRIC_UNSOLVED, search.best_unsolved as i64);
        }
    }

    SearchResult::Exhausted(stats)
}
