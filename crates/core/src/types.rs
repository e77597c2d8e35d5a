//! Identifier and locale types
//!
//! - RecordId: unique id of a record inside its scope
//! - ScopeId: owner/tenant scope (team, account) that partitions records
//! - Locale: UI language a keyword set is derived for

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::RecdexError;

/// Prefix shared by every derived keyword field (`keywords_en`, `keywords_de`).
///
/// Raw record fields must not use it.
pub const KEYWORD_FIELD_PREFIX: &str = "keywords_";

/// Unique identifier of a record within its scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an existing id
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    /// Generate a fresh random id (UUID v4)
    pub fn generate() -> Self {
        RecordId(Uuid::new_v4().to_string())
    }

    /// Borrow the id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::new(s)
    }
}

/// Owner scope of a record
///
/// Every query and every reindex run is confined to exactly one scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(String);

impl ScopeId {
    /// Wrap an existing scope id
    pub fn new(id: impl Into<String>) -> Self {
        ScopeId(id.into())
    }

    /// Borrow the scope id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScopeId {
    fn from(s: &str) -> Self {
        ScopeId::new(s)
    }
}

/// Supported UI locales
///
/// The translation table is fixed to these two languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English
    En,
    /// German
    De,
}

impl Locale {
    /// All supported locales, in stable order
    pub const ALL: [Locale; 2] = [Locale::En, Locale::De];

    /// Short language code
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::De => "de",
        }
    }

    /// Name of the derived keyword field for this locale
    pub fn keyword_field(&self) -> &'static str {
        match self {
            Locale::En => "keywords_en",
            Locale::De => "keywords_de",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = RecdexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "de" => Ok(Locale::De),
            other => Err(RecdexError::invalid_input(format!(
                "unsupported locale '{}', expected \"en\" or \"de\"",
                other
            ))),
        }
    }
}
