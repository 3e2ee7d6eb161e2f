//! Type system for flat record fields.
//!
//! This module provides:
//! - `DeclaredType`: the static type a field is declared with
//! - `FieldKind`: the decode strategy a resolved field uses
//! - Mapping from definition-language type names to `DeclaredType`

use std::fmt;

/// The static type of a field, as declared on the structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    Integer,
    Text,
    IntegerList,
    TextList,
    /// Reference to another record by name
    Record(String),
    /// A repeated record; declarable but not decodable
    RecordList(String),
}

impl DeclaredType {
    /// Maps a definition-language type name to a `DeclaredType`.
    /// Any name that isn't a builtin is treated as a record reference.
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "int" => DeclaredType::Integer,
            "string" => DeclaredType::Text,
            "[]int" => DeclaredType::IntegerList,
            "[]string" => DeclaredType::TextList,
            _ => match type_name.strip_prefix("[]") {
                Some(elem) => DeclaredType::RecordList(elem.to_string()),
                None => DeclaredType::Record(type_name.to_string()),
            },
        }
    }

    /// The decode kind inferred from the declared type alone.
    pub fn inferred_kind(&self) -> Option<FieldKind> {
        match self {
            DeclaredType::Integer => Some(FieldKind::Integer),
            DeclaredType::Text => Some(FieldKind::Text),
            DeclaredType::IntegerList => Some(FieldKind::ListOfInteger),
            DeclaredType::TextList => Some(FieldKind::ListOfText),
            DeclaredType::Record(_) => Some(FieldKind::Nested),
            DeclaredType::RecordList(_) => None,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Integer => f.write_str("int"),
            DeclaredType::Text => f.write_str("string"),
            DeclaredType::IntegerList => f.write_str("[]int"),
            DeclaredType::TextList => f.write_str("[]string"),
            DeclaredType::Record(name) => f.write_str(name),
            DeclaredType::RecordList(name) => write!(f, "[]{}", name),
        }
    }
}

/// How a resolved field is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    Nested,
    ListOfInteger,
    ListOfText,
}

impl FieldKind {
    /// Returns true for the repeated-element kinds.
    pub fn is_list(self) -> bool {
        matches!(self, FieldKind::ListOfInteger | FieldKind::ListOfText)
    }

    /// Returns true for kinds read from a single chunk or a run of chunks,
    /// i.e. everything except nested records.
    pub fn reads_chunks(self) -> bool {
        self != FieldKind::Nested
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Integer => "integer",
            FieldKind::Text => "text",
            FieldKind::Nested => "nested",
            FieldKind::ListOfInteger => "list<integer>",
            FieldKind::ListOfText => "list<text>",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_mapping() {
        assert_eq!(DeclaredType::from_type_name("int"), DeclaredType::Integer);
        assert_eq!(DeclaredType::from_type_name("string"), DeclaredType::Text);
        assert_eq!(
            DeclaredType::from_type_name("[]int"),
            DeclaredType::IntegerList
        );
        assert_eq!(
            DeclaredType::from_type_name("[]string"),
            DeclaredType::TextList
        );
        assert_eq!(
            DeclaredType::from_type_name("Header"),
            DeclaredType::Record("Header".to_string())
        );
        assert_eq!(
            DeclaredType::from_type_name("[]Header"),
            DeclaredType::RecordList("Header".to_string())
        );
    }

    #[test]
    fn test_inferred_kind() {
        assert_eq!(
            DeclaredType::Record("X".to_string()).inferred_kind(),
            Some(FieldKind::Nested)
        );
        assert_eq!(DeclaredType::RecordList("X".to_string()).inferred_kind(), None);
        assert!(FieldKind::ListOfText.is_list());
        assert!(!FieldKind::Nested.reads_chunks());
    }

    #[test]
    fn test_display_round_trips_type_names() {
        for name in ["int", "string", "[]int", "[]string", "Pose", "[]Pose"] {
            assert_eq!(DeclaredType::from_type_name(name).to_string(), name);
        }
    }
}
