//! The decode engine.
//!
//! Walks a target's resolved schema in declaration order, pulls one chunk
//! per scalar field (or a run of chunks per list field) from the shared
//! [`Cursor`], coerces it to the field's kind and writes it into the target.
//! Nested records recurse on the same cursor.

use crate::cursor::Cursor;
use crate::error::{DecodeError, Result};
use crate::schema::{FieldDescriptor, RecordSchema};
use crate::target::{DecodeTarget, Slot};
use crate::types::FieldKind;
use std::borrow::Cow;
use tracing::debug;

/// Decoder over a single input buffer.
///
/// Several records can be decoded back-to-back; each continues where the
/// previous one stopped.
pub struct Decoder<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Decoder<'a> {
    /// Create a new decoder positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Current read offset into the buffer.
    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// Returns true once the whole buffer has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_exhausted()
    }

    /// Decode one record into `target`.
    ///
    /// Errors are wrapped with the path of the failing field, starting at the
    /// record name. On error the target may be partially populated.
    pub fn decode(&mut self, target: &mut dyn DecodeTarget) -> Result<()> {
        let schema = target.schema()?;
        let start = self.cursor.offset();
        self.decode_record(&schema, target)
            .map_err(|e| e.at(&schema.name))?;
        debug!(
            record = %schema.name,
            start,
            end = self.cursor.offset(),
            "decoded record"
        );
        Ok(())
    }

    fn decode_record(&mut self, schema: &RecordSchema, target: &mut dyn DecodeTarget) -> Result<()> {
        for (index, field) in schema.fields.iter().enumerate() {
            let slot = target.slot(index).ok_or_else(|| {
                DecodeError::schema(&schema.name, &field.name, "target has no slot for field")
            })?;
            self.decode_field(&schema.name, field, slot)
                .map_err(|e| e.at(&field.name))?;
        }
        Ok(())
    }

    /// Decode a single field into its slot.
    fn decode_field(
        &mut self,
        record: &str,
        field: &FieldDescriptor,
        slot: Slot<'_>,
    ) -> Result<()> {
        match (field.kind, slot) {
            (FieldKind::Integer, Slot::Integer(out)) => {
                let chunk = self.cursor.next_chunk(field)?;
                let text = chunk_text(chunk);
                out.set_parsed(&text)
                    .map_err(|source| integer_error(&text, source))
            }
            (FieldKind::Text, Slot::Text(out)) => {
                // Padding is never stripped
                let chunk = self.cursor.next_chunk(field)?;
                *out = chunk_text(chunk).into_owned();
                Ok(())
            }
            (FieldKind::Nested, Slot::Nested(inner)) => {
                let schema = inner.schema()?;
                self.decode_record(&schema, inner)
            }
            (FieldKind::ListOfInteger, Slot::IntegerList(out)) => {
                out.clear();
                self.decode_list(field, |text| {
                    out.push_parsed(text)
                        .map_err(|source| integer_error(text, source))
                })
            }
            (FieldKind::ListOfText, Slot::TextList(out)) => {
                out.clear();
                self.decode_list(field, |text| {
                    out.push(text.to_string());
                    Ok(())
                })
            }
            (kind, slot) => Err(DecodeError::schema(
                record,
                &field.name,
                format!("{} field backed by a {} slot", kind, slot.shape()),
            )),
        }
    }

    /// Read list elements until the terminating condition.
    ///
    /// Without a `count` the list ends at the first empty chunk (not stored)
    /// or when the buffer is exhausted. With a `count` exactly that many
    /// elements are read and empty elements are kept.
    fn decode_list<F>(&mut self, field: &FieldDescriptor, mut push: F) -> Result<()>
    where
        F: FnMut(&str) -> Result<()>,
    {
        match field.count {
            Some(count) => {
                for index in 0..count {
                    // Every counted element must be present in the input
                    if self.cursor.is_exhausted() {
                        return Err(DecodeError::BufferUnderrun {
                            offset: self.cursor.offset(),
                            needed: count - index,
                            remaining: 0,
                        }
                        .at(&format!("[{}]", index)));
                    }
                    let chunk = self
                        .cursor
                        .next_chunk(field)
                        .map_err(|e| e.at(&format!("[{}]", index)))?;
                    push(chunk_text(chunk).as_ref()).map_err(|e| e.at(&format!("[{}]", index)))?;
                }
            }
            None => {
                let mut index = 0;
                while !self.cursor.is_exhausted() {
                    let chunk = self
                        .cursor
                        .next_chunk(field)
                        .map_err(|e| e.at(&format!("[{}]", index)))?;
                    if chunk.is_empty() {
                        break;
                    }
                    push(chunk_text(chunk).as_ref()).map_err(|e| e.at(&format!("[{}]", index)))?;
                    index += 1;
                }
            }
        }
        Ok(())
    }
}

/// Chunk bytes as text, falling back to lossy UTF-8 for non-UTF-8 data.
fn chunk_text(chunk: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(chunk)
}

fn integer_error(text: &str, source: std::num::ParseIntError) -> DecodeError {
    DecodeError::IntegerParse {
        chunk: text.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;
    use crate::tags::TagSet;
    use crate::types::DeclaredType;
    use crate::value::{RecordValue, Value};
    use std::sync::Arc;

    fn record(fields: &[(&str, DeclaredType, &str)]) -> RecordValue {
        let defs: Vec<FieldDef> = fields
            .iter()
            .map(|(n, t, tags)| FieldDef::new(*n, t.clone(), TagSet::parse(tags).unwrap()))
            .collect();
        let schema = Arc::new(RecordSchema::resolve("Test", &defs).unwrap());
        let lookup = |name: &str| -> Result<Arc<RecordSchema>> {
            Err(DecodeError::UnknownRecord(name.to_string()))
        };
        RecordValue::new(schema, &lookup).unwrap()
    }

    #[test]
    fn test_decode_fixed_integer() {
        let mut target = record(&[("value", DeclaredType::Integer, r#"type:"int" len:"3" padding:"0""#)]);
        Decoder::new(b"001").decode(&mut target).unwrap();
        assert_eq!(target.get("value"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_text_keeps_padding() {
        let mut target = record(&[("name", DeclaredType::Text, r#"len:"6" padding:" ""#)]);
        Decoder::new(b"ab    ").decode(&mut target).unwrap();
        assert_eq!(target.get("name").and_then(Value::as_text), Some("ab    "));
    }

    #[test]
    fn test_text_lossy_utf8() {
        let mut target = record(&[("name", DeclaredType::Text, r#"len:"3""#)]);
        Decoder::new(b"a\xffb").decode(&mut target).unwrap();
        assert_eq!(target.get("name").and_then(Value::as_text), Some("a\u{fffd}b"));
    }

    #[test]
    fn test_integer_parse_error_carries_chunk_and_path() {
        let mut target = record(&[
            ("a", DeclaredType::Integer, r#"len:"1""#),
            ("b", DeclaredType::Integer, r#"len:"2""#),
        ]);
        let err = Decoder::new(b"1x2").decode(&mut target).unwrap_err();

        assert_eq!(err.path(), Some("Test.b"));
        match err.root() {
            DecodeError::IntegerParse { chunk, .. } => assert_eq!(chunk, "x2"),
            other => panic!("Expected IntegerParse, got {:?}", other),
        }
    }

    #[test]
    fn test_signed_integers() {
        let mut target = record(&[
            ("a", DeclaredType::Integer, r#"len:"3""#),
            ("b", DeclaredType::Integer, r#"len:"3""#),
        ]);
        Decoder::new(b"-42+07").decode(&mut target).unwrap();
        assert_eq!(target.get("a"), Some(&Value::Int(-42)));
        assert_eq!(target.get("b"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_list_path_includes_index() {
        let mut target = record(&[("values", DeclaredType::IntegerList, r#"sep:",""#)]);
        let err = Decoder::new(b"1,2,x").decode(&mut target).unwrap_err();
        assert_eq!(err.path(), Some("Test.values[2]"));
    }

    #[test]
    fn test_list_ends_at_empty_chunk() {
        let mut target = record(&[
            ("values", DeclaredType::TextList, r#"sep:",""#),
            ("tail", DeclaredType::Text, r#"len:"2""#),
        ]);
        Decoder::new(b"a,b,,zz").decode(&mut target).unwrap();
        assert_eq!(
            target.get("values"),
            Some(&Value::TextList(vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(target.get("tail").and_then(Value::as_text), Some("zz"));
    }

    #[test]
    fn test_fixed_length_list_ends_at_buffer_end() {
        let mut target = record(&[("values", DeclaredType::IntegerList, r#"len:"2""#)]);
        Decoder::new(b"010203").decode(&mut target).unwrap();
        assert_eq!(target.get("values"), Some(&Value::IntList(vec![1, 2, 3])));
    }

    #[test]
    fn test_counted_list_keeps_empty_elements() {
        let mut target = record(&[
            ("values", DeclaredType::TextList, r#"sep:"," count:"3""#),
            ("tail", DeclaredType::Text, r#"len:"1""#),
        ]);
        Decoder::new(b"a,,c,z").decode(&mut target).unwrap();
        assert_eq!(
            target.get("values"),
            Some(&Value::TextList(vec![
                "a".to_string(),
                String::new(),
                "c".to_string()
            ]))
        );
        assert_eq!(target.get("tail").and_then(Value::as_text), Some("z"));
    }

    #[test]
    fn test_counted_list_past_end_is_underrun() {
        let mut target = record(&[("values", DeclaredType::TextList, r#"sep:"," count:"5""#)]);
        let err = Decoder::new(b"a,b").decode(&mut target).unwrap_err();

        assert_eq!(err.path(), Some("Test.values[2]"));
        match err.root() {
            DecodeError::BufferUnderrun {
                offset,
                needed,
                remaining,
            } => {
                assert_eq!(*offset, 3);
                assert_eq!(*needed, 3);
                assert_eq!(*remaining, 0);
            }
            other => panic!("Expected BufferUnderrun, got {:?}", other),
        }
    }

    #[test]
    fn test_large_count_fails_fast_on_short_input() {
        let mut target = record(&[("values", DeclaredType::TextList, r#"sep:"," count:"20000000""#)]);
        let err = Decoder::new(b"x").decode(&mut target).unwrap_err();

        assert_eq!(err.path(), Some("Test.values[1]"));
        assert!(matches!(err.root(), DecodeError::BufferUnderrun { needed: 19_999_999, .. }));
    }

    #[test]
    fn test_back_to_back_records() {
        let mut target = record(&[("value", DeclaredType::Integer, r#"len:"2""#)]);
        let mut decoder = Decoder::new(b"0102");

        decoder.decode(&mut target).unwrap();
        assert_eq!(target.get("value"), Some(&Value::Int(1)));
        assert_eq!(decoder.offset(), 2);

        decoder.decode(&mut target).unwrap();
        assert_eq!(target.get("value"), Some(&Value::Int(2)));
        assert!(decoder.is_exhausted());
        assert_eq!(decoder.remaining(), 0);
    }
}
