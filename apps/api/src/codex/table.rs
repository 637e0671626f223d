//! The static codex table — 22 symbolic entries loaded once at startup.
//!
//! The table is immutable after load and shared across handlers behind an
//! `Arc`. Lookups are string-normalized so numeric and string identifiers
//! with the same text form resolve to the same entry.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Number of entries in the canonical codex dataset.
pub const CODEX_SIZE: usize = 22;

/// One row of the codex: an identifier plus its interpretive texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodexEntry {
    pub id: String,
    pub name: String,
    pub message: String,
    pub symbolism: String,
}

/// Normalizes an identifier for comparison: both `3` and `"3"` map to `"3"`.
pub fn normalize_id(id: &str) -> String {
    id.trim().to_string()
}

/// The loaded reference table. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct CodexTable {
    entries: Vec<CodexEntry>,
    index: HashMap<String, usize>,
}

impl CodexTable {
    /// Builds a table from a list of entries, indexing by normalized id.
    /// Fails on duplicate ids; a non-canonical entry count is tolerated
    /// but logged.
    pub fn from_entries(entries: Vec<CodexEntry>) -> Result<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let key = normalize_id(&entry.id);
            if index.insert(key, i).is_some() {
                bail!("Duplicate codex entry id '{}'", entry.id);
            }
        }

        if entries.len() != CODEX_SIZE {
            warn!(
                "Codex table has {} entries (canonical dataset has {})",
                entries.len(),
                CODEX_SIZE
            );
        }

        Ok(Self { entries, index })
    }

    /// Loads the table from a JSON file (an array of entries).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read codex data from {}", path.display()))?;
        let entries: Vec<CodexEntry> = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed codex data in {}", path.display()))?;
        let table = Self::from_entries(entries)?;
        info!("Codex table loaded from {} ({} entries)", path.display(), table.len());
        Ok(table)
    }

    /// Looks up an entry by identifier under string-normalized equality.
    pub fn get(&self, id: &str) -> Option<&CodexEntry> {
        self.index.get(&normalize_id(id)).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[CodexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
