//! Resolves raw solve input into a validated cube and an engine choice.
//!
//! The steps run in a fixed order: palette remap, size derivation,
//! performance mode, engine variant, and only then facelet parsing.
//! Nothing here constructs an engine, so every `ConfigError` surfaces
//! before any solving machinery exists.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::{EngineConfig, EngineVariant};
use crate::error::ConfigError;
use crate::executor::PuzzleState;
use crate::puzzle::{Face, Move};

/// Face order used by most facelet tools
pub const DEFAULT_ORDER: &str = "URFDLB";

/// Alternate color palette and the canonical side each color stands for.
/// Red and blue are shared by both palettes.
const PALETTE_REMAP: [(char, char); 4] = [('G', 'F'), ('Y', 'D'), ('O', 'L'), ('W', 'U')];

/// Search effort, traded against solution length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceMode {
    Fast,
    Normal,
    Slow,
}

impl fmt::Display for PerformanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceMode::Fast => write!(f, "fast"),
            PerformanceMode::Normal => write!(f, "normal"),
            PerformanceMode::Slow => write!(f, "slow"),
        }
    }
}

/// Performance flags as given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceFlags {
    pub fast: bool,
    pub normal: bool,
    pub slow: bool,
}

impl Default for PerformanceFlags {
    fn default() -> Self {
        Self {
            fast: true,
            normal: false,
            slow: false,
        }
    }
}

impl PerformanceFlags {
    /// Highest precedence flag wins: slow > normal > fast
    pub fn resolve(&self) -> Result<PerformanceMode, ConfigError> {
        if self.slow {
            Ok(PerformanceMode::Slow)
        } else if self.normal {
            Ok(PerformanceMode::Normal)
        } else if self.fast {
            Ok(PerformanceMode::Fast)
        } else {
            Err(ConfigError::NoPerformanceMode)
        }
    }
}

/// Everything a caller may specify for one solve
#[derive(Debug, Clone)]
pub struct SolveRequest {
    /// Facelet colors, face by face in `order`
    pub state: String,
    pub order: String,
    /// `side:color` pairs, e.g. `U:W,R:R,F:G,D:Y,L:O,B:B`
    pub colormap: Option<String>,
    pub flags: PerformanceFlags,
    /// Moves applied to the parsed cube before solving
    pub openwith: Vec<Move>,
    pub tables_dir: Option<PathBuf>,
    pub collect_heuristic_stats: bool,
}

impl Default for SolveRequest {
    fn default() -> Self {
        Self {
            state: String::new(),
            order: DEFAULT_ORDER.to_string(),
            colormap: None,
            flags: PerformanceFlags::default(),
            openwith: Vec::new(),
            tables_dir: None,
            collect_heuristic_stats: false,
        }
    }
}

/// Output of the resolver
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub size: usize,
    pub mode: PerformanceMode,
    pub variant: EngineVariant,
    pub state: PuzzleState,
    pub engine: EngineConfig,
}

pub fn resolve(request: &SolveRequest) -> Result<ResolvedConfig, ConfigError> {
    let (raw, remapped) = remap_palette(&request.state);
    if remapped {
        debug!("alternate color palette detected, remapped to URFDLB");
    }

    let size = derive_size(raw.chars().count())?;
    let mode = request.flags.resolve()?;
    let variant = EngineVariant::select(size, mode)?;
    info!(size, %mode, engine = %variant.name(), "resolved solve configuration");

    let colormap = request
        .colormap
        .as_deref()
        .map(|text| parse_color_map(text, remapped))
        .transpose()?;
    let mut state = parse_state(&raw, size, &request.order, colormap.as_ref())?;
    state.apply_all(&request.openwith)?;

    Ok(ResolvedConfig {
        size,
        mode,
        variant,
        state,
        engine: EngineConfig {
            mode,
            tables_dir: request.tables_dir.clone(),
            collect_heuristic_stats: request.collect_heuristic_stats,
        },
    })
}

/// Replace the alternate palette with canonical side letters. Only applied
/// when the string contains `G`, which never occurs in canonical input.
pub fn remap_palette(raw: &str) -> (String, bool) {
    if !raw.contains('G') {
        return (raw.to_string(), false);
    }
    let remapped = raw
        .chars()
        .map(|c| {
            PALETTE_REMAP
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .collect();
    (remapped, true)
}

/// N such that `len == 6 * N * N`
pub fn derive_size(len: usize) -> Result<usize, ConfigError> {
    if len % 6 != 0 {
        return Err(ConfigError::InvalidLength(len));
    }
    let squares = len / 6;
    let size = (squares as f64).sqrt().round() as usize;
    if size * size != squares {
        return Err(ConfigError::InvalidLength(len));
    }
    if size < 2 {
        return Err(ConfigError::UnsupportedSize(size));
    }
    Ok(size)
}

/// Parse `U:W,R:R,...` into color -> side
pub fn parse_color_map(text: &str, remap: bool) -> Result<HashMap<char, Face>, ConfigError> {
    let invalid = || ConfigError::InvalidColorMap(text.to_string());
    let mut map = HashMap::new();
    let mut sides = Vec::new();

    for entry in text.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (side, color) = entry.split_once(':').ok_or_else(invalid)?;
        let mut side_chars = side.trim().chars();
        let mut color_chars = color.trim().chars();
        let (Some(side), None, Some(color), None) = (
            side_chars.next(),
            side_chars.next(),
            color_chars.next(),
            color_chars.next(),
        ) else {
            return Err(invalid());
        };
        let side = Face::from_char(side).ok_or_else(invalid)?;
        let color = if remap {
            remap_palette(&color.to_string()).0.chars().next().unwrap_or(color)
        } else {
            color
        };
        if map.insert(color, side).is_some() || sides.contains(&side) {
            return Err(invalid());
        }
        sides.push(side);
    }

    if sides.len() != 6 {
        return Err(invalid());
    }
    Ok(map)
}

/// Build a cube from facelets listed face by face in `order`.
pub fn parse_state(
    raw: &str,
    size: usize,
    order: &str,
    colormap: Option<&HashMap<char, Face>>,
) -> Result<PuzzleState, ConfigError> {
    let order_faces: Vec<Face> = order.chars().filter_map(Face::from_char).collect();
    let mut sorted = order_faces.clone();
    sorted.sort();
    sorted.dedup();
    if order.chars().count() != 6 || order_faces.len() != 6 || sorted.len() != 6 {
        return Err(ConfigError::InvalidOrder(order.to_string()));
    }

    let chars: Vec<char> = raw.chars().collect();
    if chars.len() != 6 * size * size {
        return Err(ConfigError::InvalidLength(chars.len()));
    }
    let n2 = size * size;
    let mut facelets = Vec::with_capacity(chars.len());

    for face in Face::ALL {
        let slot = order_faces
            .iter()
            .position(|&f| f == face)
            .ok_or_else(|| ConfigError::InvalidOrder(order.to_string()))?;
        for index in slot * n2..(slot + 1) * n2 {
            let color = chars[index];
            let side = match colormap {
                Some(map) => map.get(&color).copied(),
                None => Face::from_char(color),
            };
            facelets.push(side.ok_or(ConfigError::UnknownColor { color, index })?);
        }
    }

    PuzzleState::from_facelets(size, facelets)
}
