//! Enum code → per-locale display label
//!
//! The store cannot translate at query time, so enum fields are indexed by
//! the label a user sees in their own UI language. Labels are looked up
//! synchronously while building keyword sets.
//!
//! Changing a label does not touch existing records; previously derived
//! keyword sets keep the old label until the scope is reindexed.
//!
//! # File format
//!
//! ```toml
//! [labels.ski_alpine]
//! en = "Alpine ski"
//! de = "Alpinski"
//! ```

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use recdex_core::{Locale, RecdexError, RecdexResult};

/// Source of enum labels
pub trait Translations: Send + Sync {
    /// Display label of `code` in `locale`, if one is defined
    fn lookup(&self, code: &str, locale: Locale) -> Option<&str>;
}

#[derive(Debug, Deserialize)]
struct TranslationFile {
    #[serde(default)]
    labels: BTreeMap<String, BTreeMap<String, String>>,
}

/// In-memory translation table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    labels: BTreeMap<String, BTreeMap<Locale, String>>,
}

impl TranslationTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add one label
    pub fn with_label(mut self, code: &str, locale: Locale, label: &str) -> Self {
        self.insert(code, locale, label);
        self
    }

    /// Set the label of `code` in `locale`, returning the previous one
    pub fn insert(&mut self, code: &str, locale: Locale, label: &str) -> Option<String> {
        self.labels
            .entry(code.to_string())
            .or_default()
            .insert(locale, label.to_string())
    }

    /// Number of enum codes with at least one label
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the table has no labels
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Codes whose label differs between `self` and `newer` in any locale.
    ///
    /// Records using these codes carry stale keywords until reindexed.
    pub fn changed_codes(&self, newer: &TranslationTable) -> BTreeSet<String> {
        self.labels
            .keys()
            .chain(newer.labels.keys())
            .filter(|code| self.labels.get(*code) != newer.labels.get(*code))
            .cloned()
            .collect()
    }

    /// Parse a table from TOML text
    pub fn from_toml_str(content: &str) -> RecdexResult<Self> {
        let file: TranslationFile = toml::from_str(content)
            .map_err(|e| RecdexError::config(format!("invalid translation table: {}", e)))?;
        let mut table = TranslationTable::new();
        for (code, by_locale) in file.labels {
            for (locale, label) in by_locale {
                let locale: Locale = locale.parse().map_err(|_| {
                    RecdexError::config(format!(
                        "translation for '{}' uses unsupported locale '{}'",
                        code, locale
                    ))
                })?;
                table.insert(&code, locale, &label);
            }
        }
        Ok(table)
    }

    /// Read and parse a table from a TOML file
    pub fn from_file(path: &Path) -> RecdexResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecdexError::config(format!(
                "Failed to read translation file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }
}

impl Translations for TranslationTable {
    fn lookup(&self, code: &str, locale: Locale) -> Option<&str> {
        self.labels
            .get(code)
            .and_then(|by_locale| by_locale.get(&locale))
            .map(String::as_str)
    }
}
