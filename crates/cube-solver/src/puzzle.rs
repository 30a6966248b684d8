//! Core puzzle vocabulary: faces, moves and solutions.
//!
//! Move notation follows the usual big-cube conventions so that move lists
//! can be pasted between tools:
//!
//! | token  | layers turned                      |
//! |--------|------------------------------------|
//! | `U`    | outer layer                        |
//! | `Uw`   | two outer layers                   |
//! | `3Uw`  | three outer layers                 |
//! | `3U`   | third layer only                   |
//! | `x y z`| whole puzzle about the R, U, F axis |
//!
//! A trailing `'` turns counter-clockwise, `2` turns twice.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A side of the cube, in canonical (URFDLB) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Face {
    U,
    R,
    F,
    D,
    L,
    B,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

    /// Position of this face in the canonical facelet string
    pub fn index(self) -> usize {
        match self {
            Face::U => 0,
            Face::R => 1,
            Face::F => 2,
            Face::D => 3,
            Face::L => 4,
            Face::B => 5,
        }
    }

    pub fn from_char(c: char) -> Option<Face> {
        match c {
            'U' => Some(Face::U),
            'R' => Some(Face::R),
            'F' => Some(Face::F),
            'D' => Some(Face::D),
            'L' => Some(Face::L),
            'B' => Some(Face::B),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Face::U => 'U',
            Face::R => 'R',
            Face::F => 'F',
            Face::D => 'D',
            Face::L => 'L',
            Face::B => 'B',
        }
    }

    /// Outward normal with x toward R, y toward U, z toward F
    pub fn normal(self) -> [i32; 3] {
        match self {
            Face::U => [0, 1, 0],
            Face::D => [0, -1, 0],
            Face::R => [1, 0, 0],
            Face::L => [-1, 0, 0],
            Face::F => [0, 0, 1],
            Face::B => [0, 0, -1],
        }
    }

    /// 0 for the R/L axis, 1 for U/D, 2 for F/B
    pub fn axis(self) -> usize {
        match self {
            Face::R | Face::L => 0,
            Face::U | Face::D => 1,
            Face::F | Face::B => 2,
        }
    }

    pub fn from_normal(normal: [i32; 3]) -> Option<Face> {
        Face::ALL.into_iter().find(|f| f.normal() == normal)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Which layers of a face a move turns, counted from that face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoveSpan {
    /// The outermost layer
    Outer,
    /// The `n` outermost layers
    Wide(u8),
    /// Only layer `n` (1-based)
    Slice(u8),
    /// Every layer
    Whole,
}

/// A single turn of one face or block of layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Move {
    pub face: Face,
    pub span: MoveSpan,
    /// Clockwise quarter turns, 1..=3
    pub turns: u8,
}

impl Move {
    pub fn new(face: Face, span: MoveSpan, turns: u8) -> Self {
        Self {
            face,
            span,
            turns: turns % 4,
        }
    }

    /// Single clockwise quarter turn of the outer layer
    pub fn outer(face: Face) -> Self {
        Self::new(face, MoveSpan::Outer, 1)
    }

    /// The move that undoes this one
    pub fn inverse(self) -> Self {
        Self {
            turns: (4 - self.turns) % 4,
            ..self
        }
    }

    /// Layer indices turned on a puzzle with `size` layers, counted from
    /// `self.face`. `None` if the move does not fit the puzzle.
    pub fn layers(&self, size: usize) -> Option<RangeInclusive<usize>> {
        match self.span {
            MoveSpan::Outer => Some(0..=0),
            MoveSpan::Wide(n) if (2..=size).contains(&(n as usize)) => Some(0..=n as usize - 1),
            MoveSpan::Slice(n) if (2..=size).contains(&(n as usize)) => {
                Some(n as usize - 1..=n as usize - 1)
            }
            MoveSpan::Whole => Some(0..=size - 1),
            _ => None,
        }
    }

    fn suffix(&self) -> &'static str {
        match self.turns {
            2 => "2",
            3 => "'",
            _ => "",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            MoveSpan::Outer => write!(f, "{}{}", self.face, self.suffix()),
            MoveSpan::Wide(2) => write!(f, "{}w{}", self.face, self.suffix()),
            MoveSpan::Wide(n) => write!(f, "{}{}w{}", n, self.face, self.suffix()),
            MoveSpan::Slice(n) => write!(f, "{}{}{}", n, self.face, self.suffix()),
            MoveSpan::Whole => {
                // rotations about the opposite face run the other way
                let (axis, turns) = match self.face {
                    Face::R => ('x', self.turns),
                    Face::L => ('x', (4 - self.turns) % 4),
                    Face::U => ('y', self.turns),
                    Face::D => ('y', (4 - self.turns) % 4),
                    Face::F => ('z', self.turns),
                    Face::B => ('z', (4 - self.turns) % 4),
                };
                let suffix = Move::new(self.face, self.span, turns).suffix();
                write!(f, "{}{}", axis, suffix)
            }
        }
    }
}

impl FromStr for Move {
    type Err = ConfigError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidMove(token.to_string());

        let digits_end = token
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (prefix, rest) = token.split_at(digits_end);
        let layers: Option<u8> = if prefix.is_empty() {
            None
        } else {
            Some(prefix.parse().map_err(|_| invalid())?)
        };

        let mut chars = rest.chars();
        let head = chars.next().ok_or_else(invalid)?;
        let rest = chars.as_str();
        let (wide, suffix) = match rest.strip_prefix('w') {
            Some(after) => (true, after),
            None => (false, rest),
        };
        let turns = match suffix {
            "" => 1,
            "'" => 3,
            "2" | "2'" => 2,
            _ => return Err(invalid()),
        };

        let (face, span) = match head {
            'x' | 'y' | 'z' => {
                if layers.is_some() || wide {
                    return Err(invalid());
                }
                let face = match head {
                    'x' => Face::R,
                    'y' => Face::U,
                    _ => Face::F,
                };
                (face, MoveSpan::Whole)
            }
            c => {
                let face = Face::from_char(c).ok_or_else(invalid)?;
                let span = match (layers, wide) {
                    (None, false) | (Some(1), _) => MoveSpan::Outer,
                    (None, true) => MoveSpan::Wide(2),
                    (Some(n), true) if n >= 2 => MoveSpan::Wide(n),
                    (Some(n), false) if n >= 2 => MoveSpan::Slice(n),
                    _ => return Err(invalid()),
                };
                (face, span)
            }
        };

        Ok(Move::new(face, span, turns))
    }
}

impl TryFrom<String> for Move {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Move> for String {
    fn from(mv: Move) -> Self {
        mv.to_string()
    }
}

/// Parse a whitespace separated move list
pub fn parse_moves(text: &str) -> Result<Vec<Move>, ConfigError> {
    text.split_whitespace().map(str::parse).collect()
}

/// Undo a move list: reverse its order and invert every move.
///
/// Seed solutions from external tools arrive as the sequence that *creates*
/// the state; this turns them into the sequence that solves it.
pub fn invert_sequence(moves: &[Move]) -> Vec<Move> {
    moves.iter().rev().map(|m| m.inverse()).collect()
}

/// Start of a named stage inside a solution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMark {
    pub start: usize,
    pub label: String,
}

/// Ordered moves produced by an engine, with stage annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    moves: Vec<Move>,
    phases: Vec<PhaseMark>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_moves(moves: Vec<Move>) -> Self {
        Self {
            moves,
            phases: Vec::new(),
        }
    }

    /// Mark the start of a stage; following moves belong to it
    pub fn begin_phase(&mut self, label: &str) {
        self.phases.push(PhaseMark {
            start: self.moves.len(),
            label: label.to_string(),
        });
    }

    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    pub fn extend<I: IntoIterator<Item = Move>>(&mut self, moves: I) {
        self.moves.extend(moves);
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn phases(&self) -> &[PhaseMark] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
        self.phases.clear();
    }

    /// Plain space separated moves
    pub fn to_notation(&self) -> String {
        join_moves(&self.moves)
    }

    /// Exported move list. With comments every stage goes on its own line
    /// followed by `// <stage>`; without, all moves go on one line.
    pub fn export(&self, with_comments: bool) -> String {
        if !with_comments || self.phases.is_empty() {
            return self.to_notation();
        }

        let mut lines = Vec::new();
        let first = self.phases[0].start;
        if first > 0 {
            lines.push(join_moves(&self.moves[..first]));
        }
        for (i, mark) in self.phases.iter().enumerate() {
            let end = self
                .phases
                .get(i + 1)
                .map(|next| next.start)
                .unwrap_or(self.moves.len());
            if end <= mark.start {
                continue;
            }
            lines.push(format!(
                "{} // {}",
                join_moves(&self.moves[mark.start..end]),
                mark.label
            ));
        }
        lines.join("\n")
    }
}

fn join_moves(moves: &[Move]) -> String {
    moves
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
