//! Dynamic record values.
//!
//! `RecordValue` is an output structure built at runtime from a resolved
//! schema, for records that have no Rust struct (e.g. definitions loaded by
//! the CLI). It is a decode target like any typed record.

use crate::error::{DecodeError, Result};
use crate::schema::RecordSchema;
use crate::target::{DecodeTarget, Slot};
use crate::types::FieldKind;
use std::fmt;
use std::sync::Arc;

/// A decoded value (scalar, list, or nested record).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Text(String),
    Record(RecordValue),
    IntList(Vec<i64>),
    TextList(Vec<String>),
}

impl Value {
    /// Name of the value's shape, for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Text(_) => "text",
            Value::Record(_) => "record",
            Value::IntList(_) => "integer list",
            Value::TextList(_) => "text list",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Value::Record(v) => Some(v),
            _ => None,
        }
    }

    fn slot(&mut self) -> Slot<'_> {
        match self {
            Value::Int(v) => Slot::Integer(v),
            Value::Text(v) => Slot::Text(v),
            Value::Record(v) => Slot::Nested(v),
            Value::IntList(v) => Slot::IntegerList(v),
            Value::TextList(v) => Slot::TextList(v),
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{:?}", v),
            Value::IntList(v) => write!(f, "{:?}", v),
            Value::TextList(v) => write!(f, "{:?}", v),
            Value::Record(record) => record.write_indented(f, depth),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// A dynamic record: one value per schema field, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
    schema: Arc<RecordSchema>,
    values: Vec<Value>,
}

impl RecordValue {
    /// Creates a record with every field set to its kind's zero value.
    ///
    /// `nested` is called for each nested field with the referenced record
    /// name and must return that record's schema.
    pub fn new<F>(schema: Arc<RecordSchema>, nested: &F) -> Result<Self>
    where
        F: Fn(&str) -> Result<Arc<RecordSchema>>,
    {
        let values = schema
            .fields
            .iter()
            .map(|field| {
                Ok(match field.kind {
                    FieldKind::Integer => Value::Int(0),
                    FieldKind::Text => Value::Text(String::new()),
                    FieldKind::ListOfInteger => Value::IntList(Vec::new()),
                    FieldKind::ListOfText => Value::TextList(Vec::new()),
                    FieldKind::Nested => {
                        let name = field.record.as_deref().ok_or_else(|| {
                            DecodeError::schema(
                                &schema.name,
                                &field.name,
                                "nested field has no record type",
                            )
                        })?;
                        Value::Record(RecordValue::new(nested(name)?, nested)?)
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { schema, values })
    }

    /// The record's schema name.
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    /// Gets a field value by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.schema
            .fields
            .iter()
            .position(|f| f.name == field)
            .and_then(|idx| self.values.get(idx))
    }

    /// Iterates over `(field name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{} {{", self.schema.name)?;
        for (name, value) in self.iter() {
            write!(f, "{:indent$}{}: ", "", name, indent = (depth + 1) * 2)?;
            value.write_indented(f, depth + 1)?;
            writeln!(f)?;
        }
        write!(f, "{:indent$}}}", "", indent = depth * 2)
    }
}

impl DecodeTarget for RecordValue {
    fn schema(&self) -> Result<Arc<RecordSchema>> {
        Ok(Arc::clone(&self.schema))
    }

    fn slot(&mut self, index: usize) -> Option<Slot<'_>> {
        self.values.get_mut(index).map(Value::slot)
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
