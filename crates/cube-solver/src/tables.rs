//! Precomputed lookup tables of known solutions.
//!
//! A table is a text file with one `<canonical encoding>:<moves>` entry per
//! line; blank lines and lines starting with `#` are ignored. Tables are
//! read on first use and kept for the rest of the process.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::SolveError;
use crate::puzzle::{parse_moves, Face, Move};

#[derive(Debug)]
pub struct LookupTable {
    name: String,
    path: PathBuf,
    size: usize,
    entries: OnceCell<HashMap<String, Vec<Move>>>,
}

impl LookupTable {
    pub fn new(path: impl Into<PathBuf>, size: usize) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            path,
            size,
            entries: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.entries.get().is_some()
    }

    /// Steps stored for `key`, loading the table on first call.
    pub fn steps(&self, key: &str) -> Result<Option<&[Move]>, SolveError> {
        Ok(self.load()?.get(key).map(|steps| steps.as_slice()))
    }

    fn load(&self) -> Result<&HashMap<String, Vec<Move>>, SolveError> {
        if let Some(entries) = self.entries.get() {
            return Ok(entries);
        }
        let text = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                SolveError::MissingTable {
                    path: self.path.clone(),
                }
            } else {
                SolveError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        let entries = self.parse(&text)?;
        info!(table = %self.name, entries = entries.len(), "loaded lookup table");
        Ok(self.entries.get_or_init(|| entries))
    }

    fn parse(&self, text: &str) -> Result<HashMap<String, Vec<Move>>, SolveError> {
        let expected_len = 6 * self.size * self.size;
        let mut entries = HashMap::new();

        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let invalid = || SolveError::InvalidLookupKey {
                table: self.name.clone(),
                key: line.to_string(),
            };
            let (key, steps) = line.split_once(':').ok_or_else(invalid)?;
            let key_ok = key.len() == expected_len && key.chars().all(|c| Face::from_char(c).is_some());
            if !key_ok {
                return Err(invalid());
            }
            let steps = parse_moves(steps).map_err(|_| invalid())?;
            entries.insert(key.to_string(), steps);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::PuzzleState;
    use std::io::Write;

    fn table_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn r_scrambled() -> String {
        let mut state = PuzzleState::solved(2);
        state.apply(&"R".parse().unwrap()).unwrap();
        state.encoding(false)
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let file = table_file(&format!("# 2x2x2\n\n{}:R'\n", r_scrambled()));
        let table = LookupTable::new(file.path(), 2);
        assert!(!table.is_loaded());

        let steps = table.steps(&r_scrambled()).unwrap().unwrap();
        assert_eq!(steps, &["R'".parse::<Move>().unwrap()]);
        assert!(table.is_loaded());

        let solved = PuzzleState::solved(2).encoding(false);
        assert!(table.steps(&solved).unwrap().is_none());
    }

    #[test]
    fn test_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let table = LookupTable::new(dir.path().join("absent.txt"), 2);
        assert!(matches!(
            table.steps("anything"),
            Err(SolveError::MissingTable { .. })
        ));
    }

    #[test]
    fn test_malformed_entries() {
        let bad_steps = format!("{}:Q9", r_scrambled());
        for contents in ["no separator here", "UUU:R", bad_steps.as_str()] {
            let file = table_file(contents);
            let table = LookupTable::new(file.path(), 2);
            assert!(
                matches!(table.steps("x"), Err(SolveError::InvalidLookupKey { .. })),
                "accepted {:?}",
                contents
            );
        }
    }

    #[test]
    fn test_empty_steps_are_kept() {
        let file = table_file(&format!("{}:\n", r_scrambled()));
        let table = LookupTable::new(file.path(), 2);
        assert_eq!(table.steps(&r_scrambled()).unwrap(), Some(&[][..]));
    }
}
