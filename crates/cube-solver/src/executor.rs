//! Facelet state and move execution.
//!
//! Stickers are stored face by face in canonical URFDLB order, each face
//! row-major as it appears in the standard unfolded net:
//!
//! ```text
//!           U
//!       L   F   R   B
//!           D
//! ```
//!
//! Moves are executed by mapping every sticker to a position and outward
//! normal in 3-D, rotating those vectors about the turned face's axis and
//! mapping back. This gives exact semantics for any number of layers
//! without hand-written cycle tables.

use std::collections::HashMap;

use crate::error::{ConfigError, SolveError};
use crate::puzzle::{Face, Move};

/// The coloring of every sticker of an NxNxN cube.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleState {
    size: usize,
    facelets: Vec<Face>,
}

impl PuzzleState {
    /// A solved cube with each face colored after its own side
    pub fn solved(size: usize) -> Self {
        let n2 = size * size;
        let facelets = Face::ALL
            .iter()
            .flat_map(|&f| std::iter::repeat(f).take(n2))
            .collect();
        Self { size, facelets }
    }

    pub fn from_facelets(size: usize, facelets: Vec<Face>) -> Result<Self, ConfigError> {
        if facelets.len() != 6 * size * size {
            return Err(ConfigError::InvalidLength(facelets.len()));
        }
        if size < 2 {
            return Err(ConfigError::UnsupportedSize(size));
        }
        Ok(Self { size, facelets })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn facelets(&self) -> &[Face] {
        &self.facelets
    }

    pub fn facelet(&self, face: Face, row: usize, col: usize) -> Face {
        self.facelets[face.index() * self.size * self.size + row * self.size + col]
    }

    /// Turn the cube. Fails without touching the state if the move is
    /// wider than the cube.
    pub fn apply(&mut self, mv: &Move) -> Result<(), ConfigError> {
        let perm = move_permutation(self.size, mv)
            .ok_or_else(|| ConfigError::InvalidMove(mv.to_string()))?;
        let mut next = self.facelets.clone();
        apply_permutation(&self.facelets, &mut next, &perm);
        self.facelets = next;
        Ok(())
    }

    pub fn apply_all(&mut self, moves: &[Move]) -> Result<(), ConfigError> {
        for mv in moves {
            self.apply(mv)?;
        }
        Ok(())
    }

    pub fn is_solved(&self) -> bool {
        is_solved_facelets(self.size, &self.facelets)
    }

    /// Stickers that differ from the color their face is heading for
    pub fn unsolved_facelets(&self) -> usize {
        unsolved_facelets(self.size, &self.facelets)
    }

    /// Every face's inner stickers share one color
    pub fn centers_solved(&self) -> bool {
        let n = self.size;
        Face::ALL.iter().all(|&face| {
            let mut inner = (1..n - 1).flat_map(|r| (1..n - 1).map(move |c| (r, c)));
            match inner.next() {
                Some((r0, c0)) => {
                    let color = self.facelet(face, r0, c0);
                    inner.all(|(r, c)| self.facelet(face, r, c) == color)
                }
                None => true,
            }
        })
    }

    /// Every run of edge stickers between two corners shares one color
    pub fn edges_paired(&self) -> bool {
        let n = self.size;
        let last = n - 1;
        Face::ALL.iter().all(|&face| {
            let runs: [Vec<Face>; 4] = [
                (1..last).map(|i| self.facelet(face, 0, i)).collect(),
                (1..last).map(|i| self.facelet(face, last, i)).collect(),
                (1..last).map(|i| self.facelet(face, i, 0)).collect(),
                (1..last).map(|i| self.facelet(face, i, last)).collect(),
            ];
            runs.iter().all(|run| run.windows(2).all(|w| w[0] == w[1]))
        })
    }

    /// Structural checks that any reachable cube passes.
    pub fn sanity_check(&self) -> Result<(), SolveError> {
        let n2 = self.size * self.size;
        let mut counts: HashMap<Face, usize> = HashMap::new();
        for &f in &self.facelets {
            *counts.entry(f).or_default() += 1;
        }
        for face in Face::ALL {
            let count = counts.get(&face).copied().unwrap_or(0);
            if count != n2 {
                return Err(SolveError::Validation(format!(
                    "color {} appears {} times, expected {}",
                    face, count, n2
                )));
            }
        }

        if self.size % 2 == 1 {
            let mid = self.size / 2;
            let mut centers: Vec<Face> = Face::ALL
                .iter()
                .map(|&f| self.facelet(f, mid, mid))
                .collect();
            centers.sort();
            centers.dedup();
            if centers.len() != 6 {
                return Err(SolveError::Validation(
                    "center stickers do not have six distinct colors".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Cross-tool facelet string in URFDLB order.
    ///
    /// With `normalize` on an odd cube every color is relabelled after the
    /// face whose center carries it, so the string is valid input for
    /// tools that expect centers in place. Even cubes have no fixed
    /// centers and are always emitted as stored.
    pub fn encoding(&self, normalize: bool) -> String {
        if !normalize || self.size % 2 == 0 {
            return self.facelets.iter().map(|f| f.as_char()).collect();
        }
        let mid = self.size / 2;
        let relabel: HashMap<Face, Face> = Face::ALL
            .iter()
            .map(|&f| (self.facelet(f, mid, mid), f))
            .collect();
        self.facelets
            .iter()
            .map(|c| relabel.get(c).copied().unwrap_or(*c).as_char())
            .collect()
    }

    /// Unfolded net with one character per sticker
    pub fn render(&self) -> String {
        self.render_net(|face, row, col| self.facelet(face, row, col).to_string())
    }

    /// Unfolded net of sticker numbers (1-based, canonical order)
    pub fn render_layout(&self) -> String {
        let n = self.size;
        self.render_net(|face, row, col| (face.index() * n * n + row * n + col + 1).to_string())
    }

    fn render_net<F>(&self, cell: F) -> String
    where
        F: Fn(Face, usize, usize) -> String,
    {
        let n = self.size;
        let width = (6 * n * n).to_string().len();
        let row_text = |face: Face, row: usize| -> String {
            (0..n)
                .map(|col| format!("{:>width$}", cell(face, row, col), width = width))
                .collect::<Vec<_>>()
                .join(" ")
        };
        let pad = " ".repeat(n * (width + 1) + 1);

        let mut lines = Vec::with_capacity(3 * n + 2);
        for row in 0..n {
            lines.push(format!("{}{}", pad, row_text(Face::U, row)));
        }
        lines.push(String::new());
        for row in 0..n {
            let band: Vec<String> = [Face::L, Face::F, Face::R, Face::B]
                .iter()
                .map(|&f| row_text(f, row))
                .collect();
            lines.push(band.join("  "));
        }
        lines.push(String::new());
        for row in 0..n {
            lines.push(format!("{}{}", pad, row_text(Face::D, row)));
        }
        lines.join("\n")
    }
}

/// Destination of every sticker after `mv`, or `None` if the move does not
/// fit a cube of `size` layers.
pub fn move_permutation(size: usize, mv: &Move) -> Option<Vec<usize>> {
    let layers = mv.layers(size)?;
    let axis = mv.face.normal();
    let edge = size as i32 - 1;
    let count = 6 * size * size;

    let quarter: Vec<usize> = (0..count)
        .map(|i| {
            let (pos, normal) = sticker_position(size, i);
            let depth = ((edge - dot(axis, pos)) / 2) as usize;
            if layers.contains(&depth) {
                sticker_index(size, rotate(axis, pos), rotate(axis, normal))
            } else {
                i
            }
        })
        .collect();

    let mut perm: Vec<usize> = (0..count).collect();
    for _ in 0..mv.turns {
        perm = perm.iter().map(|&p| quarter[p]).collect();
    }
    Some(perm)
}

/// `dst[perm[i]] = src[i]`
pub fn apply_permutation(src: &[Face], dst: &mut [Face], perm: &[usize]) {
    for (i, &to) in perm.iter().enumerate() {
        dst[to] = src[i];
    }
}

pub fn is_solved_facelets(size: usize, facelets: &[Face]) -> bool {
    facelets
        .chunks(size * size)
        .all(|face| face.iter().all(|&c| c == face[0]))
}

pub fn unsolved_facelets(size: usize, facelets: &[Face]) -> usize {
    let n2 = size * size;
    let mid = size / 2;
    facelets
        .chunks(n2)
        .map(|face| {
            let target = if size % 2 == 1 {
                face[mid * size + mid]
            } else {
                majority(face)
            };
            face.iter().filter(|&&c| c != target).count()
        })
        .sum()
}

fn majority(face: &[Face]) -> Face {
    let mut counts = [0usize; 6];
    for &c in face {
        counts[c.index()] += 1;
    }
    Face::ALL
        .into_iter()
        .max_by_key(|f| (counts[f.index()], std::cmp::Reverse(f.index())))
        .unwrap_or(Face::U)
}

/// Doubled coordinate of layer `i`: runs -(n-1), -(n-3), ..., n-1
fn coord(size: usize, i: usize) -> i32 {
    2 * i as i32 - (size as i32 - 1)
}

fn layer(size: usize, k: i32) -> usize {
    ((k + size as i32 - 1) / 2) as usize
}

fn sticker_position(size: usize, index: usize) -> ([i32; 3], [i32; 3]) {
    let n2 = size * size;
    let face = Face::ALL[index / n2];
    let row = (index % n2) / size;
    let col = index % size;
    let e = size as i32 - 1;
    let r = coord(size, row);
    let c = coord(size, col);
    let pos = match face {
        Face::U => [c, e, r],
        Face::D => [c, -e, -r],
        Face::F => [c, -r, e],
        Face::B => [-c, -r, -e],
        Face::R => [e, -r, -c],
        Face::L => [-e, -r, c],
    };
    (pos, face.normal())
}

fn sticker_index(size: usize, pos: [i32; 3], normal: [i32; 3]) -> usize {
    let [x, y, z] = pos;
    let face = Face::from_normal(normal).unwrap_or(Face::U);
    let (row, col) = match face {
        Face::U => (z, x),
        Face::D => (-z, x),
        Face::F => (-y, x),
        Face::B => (-y, -x),
        Face::R => (-y, -z),
        Face::L => (-y, z),
    };
    face.index() * size * size + layer(size, row) * size + layer(size, col)
}

fn dot(a: [i32; 3], b: [i32; 3]) -> i32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [i32; 3], b: [i32; 3]) -> [i32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Quarter turn clockwise as seen looking at the face with normal `axis`
fn rotate(axis: [i32; 3], v: [i32; 3]) -> [i32; 3] {
    let c = cross(axis, v);
    let d = dot(axis, v);
    [
        -c[0] + axis[0] * d,
        -c[1] + axis[1] * d,
        -c[2] + axis[2] * d,
    ]
}
