//! Index schema: which fields of a record type are searchable
//!
//! One schema per record type replaces per-feature tokenization rules.
//! Each schema lists:
//! - text fields, indexed verbatim
//! - enum fields, translated to the locale's label before indexing
//! - child collections (arrays of nested objects) with their own schema,
//!   whose tokens are merged into the parent's keyword set
//!
//! Field paths may be dotted (`owner.name`).

use recdex_core::{RecdexError, RecdexResult, KEYWORD_FIELD_PREFIX};

/// How a field's values are turned into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, numbers rendered as decimal text
    Text,
    /// Enum code, resolved through the translation table
    Enum,
}

/// One searchable field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Dotted field path
    pub path: String,
    /// Field kind
    pub kind: FieldKind,
}

/// Nested child records contributing to the parent's keywords
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildSpec {
    /// Path of the array holding the child objects
    pub path: String,
    /// Schema applied to every child object
    pub schema: IndexSchema,
}

/// Searchable fields of one record type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSchema {
    fields: Vec<FieldSpec>,
    children: Vec<ChildSpec>,
}

impl IndexSchema {
    /// Schema with no searchable fields
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a free-text field
    pub fn text(mut self, path: impl Into<String>) -> Self {
        self.fields.push(FieldSpec {
            path: path.into(),
            kind: FieldKind::Text,
        });
        self
    }

    /// Builder: add an enum field
    pub fn enumeration(mut self, path: impl Into<String>) -> Self {
        self.fields.push(FieldSpec {
            path: path.into(),
            kind: FieldKind::Enum,
        });
        self
    }

    /// Builder: add a child collection
    pub fn child(mut self, path: impl Into<String>, schema: IndexSchema) -> Self {
        self.children.push(ChildSpec {
            path: path.into(),
            schema,
        });
        self
    }

    /// Declared fields
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Declared child collections
    pub fn children(&self) -> &[ChildSpec] {
        &self.children
    }

    /// Reject schemas that would index nonsense.
    ///
    /// - empty paths or empty path segments
    /// - paths inside the reserved keyword namespace
    /// - a path declared twice (e.g. both text and enum)
    /// - the same checks, recursively, for children
    pub fn validate(&self) -> RecdexResult<()> {
        let mut seen = std::collections::HashSet::new();
        let paths = self
            .fields
            .iter()
            .map(|f| f.path.as_str())
            .chain(self.children.iter().map(|c| c.path.as_str()));
        for path in paths {
            if path.is_empty() || path.split('.').any(str::is_empty) {
                return Err(RecdexError::invalid_input(format!(
                    "invalid field path '{}'",
                    path
                )));
            }
            if path.starts_with(KEYWORD_FIELD_PREFIX) {
                return Err(RecdexError::invalid_input(format!(
                    "field '{}' collides with the reserved '{}' prefix",
                    path, KEYWORD_FIELD_PREFIX
                )));
            }
            if !seen.insert(path) {
                return Err(RecdexError::invalid_input(format!(
                    "field '{}' is declared more than once",
                    path
                )));
            }
        }
        for child in &self.children {
            child.schema.validate()?;
        }
        Ok(())
    }
}
