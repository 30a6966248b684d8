//! Move-sequence pruning rules for the bounded search.
//!
//! Turns about the same axis always commute, so any run of them can be
//! rewritten with at most one move per (face, span) in a fixed order.
//! Banning every other ordering removes duplicate and cancelling sequences
//! without losing any reachable state.

use crate::puzzle::{Move, MoveSpan};

fn canonical_key(mv: &Move) -> (usize, MoveSpan) {
    (mv.face.index(), mv.span)
}

/// Check if `b` may never directly follow `a`
pub fn is_banned_pair(a: &Move, b: &Move) -> bool {
    // Rule 1: same face and span merges into a single move (or cancels)
    // Rule 2: same-axis moves commute, only the ascending order is kept
    a.face.axis() == b.face.axis() && canonical_key(a) >= canonical_key(b)
}

/// Check if a sequence contains a banned adjacent pair
pub fn should_reject_sequence(moves: &[Move]) -> bool {
    moves.windows(2).any(|w| is_banned_pair(&w[0], &w[1]))
}

/// Indices into `moves` that may follow `last`
pub fn valid_followers<'a>(
    last: Option<&'a Move>,
    moves: &'a [Move],
) -> impl Iterator<Item = usize> + 'a {
    moves
        .iter()
        .enumerate()
        .filter(move |(_, mv)| !last.map_or(false, |prev| is_banned_pair(prev, mv)))
        .map(|(i, _)| i)
}
