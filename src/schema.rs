//! Schema resolution for flat records.
//!
//! This module provides:
//! - `FieldDef`: a field's name, declared type and raw tags
//! - `FieldDescriptor`: the resolved decode instructions for one field
//! - `RecordSchema`: the ordered descriptors for a record type

use crate::error::{DecodeError, Result};
use crate::tags::{self, TagSet};
use crate::types::{DeclaredType, FieldKind};
use std::fmt;
use tracing::warn;

/// A field as declared on a structure, before resolution.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub declared: DeclaredType,
    pub tags: TagSet,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, declared: DeclaredType, tags: TagSet) -> Self {
        Self {
            name: name.into(),
            declared,
            tags,
        }
    }
}

/// Resolved decode instructions for a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    /// Fixed read size, or an upper bound when combined with a separator
    pub length: Option<usize>,
    pub separator: Option<char>,
    /// Accepted and kept for compatibility; never stripped from decoded text
    pub padding: Option<char>,
    /// Explicit element count for list fields
    pub count: Option<usize>,
    /// Name of the nested record for `FieldKind::Nested`
    pub record: Option<String>,
}

impl FieldDescriptor {
    /// Returns true if chunk reads stop at a separator.
    pub fn is_separated(&self) -> bool {
        self.separator.is_some()
    }

    /// The length bound as used by chunk extraction (absent = 0).
    pub fn cap(&self) -> usize {
        self.length.unwrap_or(0)
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.kind)?;
        if let Some(record) = &self.record {
            write!(f, " ({})", record)?;
        }
        if let Some(len) = self.length {
            write!(f, " len={}", len)?;
        }
        if let Some(sep) = self.separator {
            write!(f, " sep=U+{:04X}", sep as u32)?;
        }
        if let Some(count) = self.count {
            write!(f, " count={}", count)?;
        }
        if let Some(padding) = self.padding {
            write!(f, " padding={:?}", padding)?;
        }
        Ok(())
    }
}

/// A resolved record schema: descriptors in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl RecordSchema {
    /// Resolve a record's field definitions into decode descriptors.
    pub fn resolve(name: &str, defs: &[FieldDef]) -> Result<Self> {
        let fields = defs
            .iter()
            .map(|def| Self::resolve_field(name, def))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            fields,
        })
    }

    fn resolve_field(record: &str, def: &FieldDef) -> Result<FieldDescriptor> {
        let err = |reason: String| DecodeError::schema(record, &def.name, reason);

        let kind = Self::resolve_kind(def).map_err(err)?;

        let length = match def.tags.get(tags::LEN) {
            Some(text) => Some(
                text.parse::<usize>()
                    .map_err(|_| err(format!("Invalid len tag: {:?}", text)))?,
            ),
            None => None,
        };

        let separator = def
            .tags
            .get(tags::SEP)
            .and_then(|text| match single_char(text) {
                Some('\0') => None,
                Some(c) => Some(c),
                None => {
                    warn!(
                        record,
                        field = %def.name,
                        sep = ?text,
                        "sep tag is not a single code point, reading by length only"
                    );
                    None
                }
            });

        let padding = def.tags.get(tags::PADDING).and_then(|text| {
            let c = single_char(text);
            if c.is_none() {
                warn!(record, field = %def.name, padding = ?text, "ignoring padding tag");
            }
            c
        });

        let count = match def.tags.get(tags::COUNT) {
            Some(text) => {
                if !kind.is_list() {
                    return Err(err(format!("count tag on non-list field of kind {}", kind)));
                }
                Some(
                    text.parse::<usize>()
                        .map_err(|_| err(format!("Invalid count tag: {:?}", text)))?,
                )
            }
            None => None,
        };

        if kind.reads_chunks() && length.is_none() && separator.is_none() {
            return Err(err(
                "Field needs a len or sep tag to be decoded".to_string(),
            ));
        }

        let nested = match &def.declared {
            DeclaredType::Record(name) => Some(name.clone()),
            _ => None,
        };

        Ok(FieldDescriptor {
            name: def.name.clone(),
            kind,
            length,
            separator,
            padding,
            count,
            record: nested,
        })
    }

    /// Infer the kind from the declared type, applying the legacy `type` override.
    fn resolve_kind(def: &FieldDef) -> std::result::Result<FieldKind, String> {
        let inferred = def.declared.inferred_kind().ok_or_else(|| {
            format!("Lists of records are not supported: {}", def.declared)
        })?;

        match def.tags.get(tags::TYPE) {
            None | Some("") => Ok(inferred),
            Some("int") if inferred == FieldKind::Integer => Ok(inferred),
            Some("string") if inferred == FieldKind::Text => Ok(inferred),
            Some(other) => Err(format!(
                "type tag {:?} does not match declared type {}",
                other, def.declared
            )),
        }
    }

    /// Gets a field descriptor by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Gets the number of fields.
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
