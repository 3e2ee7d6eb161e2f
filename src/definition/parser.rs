//! Parser for text record definitions.

use crate::error::{DecodeError, Result};
use crate::schema::FieldDef;
use crate::tags::TagSet;
use crate::types::DeclaredType;

/// Parser for record definitions.
pub struct DefinitionParser;

impl DefinitionParser {
    /// Parse the body of one record definition.
    /// Example: ``int count `len:"2"`; string name `sep:"\x1c"` ``
    pub fn parse(record: &str, text: &str) -> Result<Vec<FieldDef>> {
        let mut fields = Vec::new();

        for decl in split_declarations(text) {
            let trimmed = decl.trim();
            if trimmed.is_empty() {
                continue; // Skip empty declarations
            }

            let field = Self::parse_declaration(record, trimmed)?;
            if fields.iter().any(|f: &FieldDef| f.name == field.name) {
                return Err(DecodeError::schema(record, &field.name, "duplicate field name"));
            }
            fields.push(field);
        }

        Ok(fields)
    }

    /// Parse a single declaration: ``type name [`tags`]``.
    fn parse_declaration(record: &str, decl: &str) -> Result<FieldDef> {
        let (head, tag_text) = match decl.find('`') {
            Some(open) => {
                let rest = &decl[open + 1..];
                let close = rest.find('`').ok_or_else(|| {
                    DecodeError::schema(record, decl, "Unterminated tag string")
                })?;
                if !rest[close + 1..].trim().is_empty() {
                    return Err(DecodeError::schema(
                        record,
                        decl,
                        "Unexpected text after tag string",
                    ));
                }
                (&decl[..open], &rest[..close])
            }
            None => (decl, ""),
        };

        // Split into tokens
        let tokens: Vec<&str> = head.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(DecodeError::schema(
                record,
                decl,
                format!("Invalid declaration: {}", decl),
            ));
        }

        let type_str = tokens[0];
        let name = tokens[1];
        if !is_identifier(name) {
            return Err(DecodeError::schema(
                record,
                name,
                format!("Invalid field name: {}", name),
            ));
        }

        let declared = DeclaredType::from_type_name(type_str);
        if let DeclaredType::Record(target) | DeclaredType::RecordList(target) = &declared {
            if !is_identifier(target) {
                return Err(DecodeError::schema(
                    record,
                    name,
                    format!("Invalid type: {}", type_str),
                ));
            }
        }

        let tags =
            TagSet::parse(tag_text).map_err(|reason| DecodeError::schema(record, name, reason))?;

        Ok(FieldDef::new(name, declared, tags))
    }

    /// Parse a definition file: one `Name = declarations` per line.
    /// Blank lines and lines starting with `#` are skipped.
    pub fn parse_file(text: &str) -> Result<Vec<(String, String)>> {
        let mut records = Vec::new();

        for (lineno, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let (name, body) = trimmed.split_once('=').ok_or_else(|| {
                DecodeError::schema(
                    "<file>",
                    format!("line {}", lineno + 1),
                    "Expected `Name = declarations`",
                )
            })?;

            let name = name.trim();
            if !is_identifier(name) {
                return Err(DecodeError::schema(
                    "<file>",
                    format!("line {}", lineno + 1),
                    format!("Invalid record name: {}", name),
                ));
            }

            records.push((name.to_string(), body.trim().to_string()));
        }

        Ok(records)
    }
}

/// Split on `;` outside backquoted tag strings.
fn split_declarations(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_tags = false;
    let mut start = 0;

    for (pos, c) in text.char_indices() {
        match c {
            '`' => in_tags = !in_tags,
            ';' if !in_tags => {
                parts.push(&text[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_definition() {
        let fields =
            DefinitionParser::parse("Header", r#"int count `len:"2"`; string name `len:"5"`"#)
                .unwrap();
        assert_eq!(fields.len(), 2);

        assert_eq!(fields[0].name, "count");
        assert_eq!(fields[0].declared, DeclaredType::Integer);
        assert_eq!(fields[0].tags.get("len"), Some("2"));

        assert_eq!(fields[1].name, "name");
        assert_eq!(fields[1].declared, DeclaredType::Text);
    }

    #[test]
    fn test_parse_lists_and_records() {
        let fields = DefinitionParser::parse(
            "Msg",
            r#"Header header; []int values `sep:"\x1c" len:"2"`; []string names `sep:","`"#,
        )
        .unwrap();

        assert_eq!(fields[0].declared, DeclaredType::Record("Header".to_string()));
        assert!(fields[0].tags.is_empty());
        assert_eq!(fields[1].declared, DeclaredType::IntegerList);
        assert_eq!(fields[1].tags.get("sep"), Some("\u{1c}"));
        assert_eq!(fields[2].declared, DeclaredType::TextList);
    }

    #[test]
    fn test_semicolon_inside_tags() {
        let fields =
            DefinitionParser::parse("Semi", r#"[]string parts `sep:";"`; int tail `len:"1"`"#)
                .unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].tags.get("sep"), Some(";"));
    }

    #[test]
    fn test_empty_declarations() {
        let fields =
            DefinitionParser::parse("E", r#"int a `len:"1"`;; ; int b `len:"1"`;"#).unwrap();
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_invalid_declarations() {
        assert!(DefinitionParser::parse("Bad", "int").is_err());
        assert!(DefinitionParser::parse("Bad", "int a b").is_err());
        assert!(DefinitionParser::parse("Bad", r#"int a `len:"1""#).is_err());
        assert!(DefinitionParser::parse("Bad", r#"int a `len:"1"` extra"#).is_err());
        assert!(DefinitionParser::parse("Bad", r#"int 1a `len:"1"`"#).is_err());
        assert!(DefinitionParser::parse("Bad", r#"int a `len`"#).is_err());
    }

    #[test]
    fn test_duplicate_field() {
        let result = DefinitionParser::parse("Dup", r#"int a `len:"1"`; string a `len:"1"`"#);
        assert!(matches!(result, Err(DecodeError::Schema { .. })));
    }

    #[test]
    fn test_parse_file() {
        let text = r#"
# header first
Header = int count `len:"2"`
Msg = Header header; string body `sep:"|"`
"#;
        let records = DefinitionParser::parse_file(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, "Header");
        assert_eq!(records[1].0, "Msg");
        assert_eq!(records[1].1, r#"Header header; string body `sep:"|"`"#);
    }

    #[test]
    fn test_parse_file_errors() {
        assert!(DefinitionParser::parse_file("Header int a").is_err());
        assert!(DefinitionParser::parse_file("1Header = int a `len:\"1\"`").is_err());
    }
}
