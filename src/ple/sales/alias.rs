use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::ple::sales::error::{Result, SalesError};

/// Region aliases used by the PLE export when no alias file is supplied.
pub const DEFAULT_REGION_ALIASES: [(&str, &str); 6] = [
    ("SA", "South America"),
    ("Eur", "Europe"),
    ("Europe", "Europe"),
    ("Pacific", "Pacific"),
    ("China", "China"),
    ("World", "World"),
];

/// Maps raw region labels to canonical region names.
///
/// Lookups ignore case, surrounding whitespace, and repeated inner
/// whitespace. Every canonical name resolves to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
}

/// Outcome of resolving a single raw label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The label matched an alias entry.
    Canonical(String),
    /// The label is unknown and is kept as written, minus outer whitespace.
    Unmapped(String),
}

impl Resolved {
    pub fn name(&self) -> &str {
        match self {
            Resolved::Canonical(name) | Resolved::Unmapped(name) => name,
        }
    }

    pub fn into_name(self) -> String {
        match self {
            Resolved::Canonical(name) | Resolved::Unmapped(name) => name,
        }
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        for (raw, canonical) in DEFAULT_REGION_ALIASES {
            entries.insert(normalize_key(raw), canonical.to_string());
            entries
                .entry(normalize_key(canonical))
                .or_insert_with(|| canonical.to_string());
        }
        Self { entries }
    }
}

impl AliasTable {
    /// A table with no aliases; every label is reported as unmapped.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Builds a table from `(raw, canonical)` pairs.
    ///
    /// Fails when a raw label is mapped to two different canonical names, or
    /// when a canonical name is itself an alias for another canonical name.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries: BTreeMap<String, String> = BTreeMap::new();
        let mut canonicals = Vec::new();

        for (raw, canonical) in pairs {
            let canonical = canonical.as_ref().trim().to_string();
            if canonical.is_empty() {
                return Err(SalesError::InvalidAliasTable(format!(
                    "alias '{}' maps to an empty region name",
                    raw.as_ref()
                )));
            }
            let key = normalize_key(raw.as_ref());
            if let Some(existing) = entries.get(&key) {
                if existing != &canonical {
                    return Err(SalesError::InvalidAliasTable(format!(
                        "alias '{}' maps to both '{existing}' and '{canonical}'",
                        raw.as_ref()
                    )));
                }
            }
            entries.insert(key, canonical.clone());
            canonicals.push(canonical);
        }

        for canonical in canonicals {
            let key = normalize_key(&canonical);
            match entries.get(&key) {
                Some(existing) if existing != &canonical => {
                    return Err(SalesError::InvalidAliasTable(format!(
                        "canonical region '{canonical}' is aliased to '{existing}'"
                    )));
                }
                Some(_) => {}
                None => {
                    entries.insert(key, canonical);
                }
            }
        }

        Ok(Self { entries })
    }

    /// Reads a JSON object of `"raw": "canonical"` entries.
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        let pairs: BTreeMap<String, String> = serde_json::from_str(&source)?;
        Self::from_pairs(pairs)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the canonical name for a known label.
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        self.entries.get(&normalize_key(raw)).map(String::as_str)
    }

    /// Resolves a raw label, passing unknown labels through.
    pub fn resolve(&self, raw: &str) -> Resolved {
        match self.lookup(raw) {
            Some(canonical) => Resolved::Canonical(canonical.to_string()),
            None => Resolved::Unmapped(raw.trim().to_string()),
        }
    }

    /// Canonical name for `raw`, or the trimmed label when it is unknown.
    pub fn normalize(&self, raw: &str) -> String {
        self.resolve(raw).into_name()
    }
}

fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
