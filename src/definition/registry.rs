use super::parser::DefinitionParser;
use crate::decoder::Decoder;
use crate::error::{DecodeError, Result};
use crate::record::Record;
use crate::schema::RecordSchema;
use crate::types::FieldKind;
use crate::value::{RecordValue, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Registry of named record schemas.
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<RecordSchema>>,
    /// Registration order, for listing
    order: Vec<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a definition file (see [`DefinitionParser::parse_file`]).
    pub fn from_definitions(text: &str) -> Result<Self> {
        let mut registry = Self::new();
        for (name, body) in DefinitionParser::parse_file(text)? {
            registry.register(name, &body)?;
        }
        Ok(registry)
    }

    /// Register a record from its text definition.
    ///
    /// Nested record types must already be registered.
    #[instrument(level = "debug", skip(self, definition), err)]
    pub fn register(&mut self, name: String, definition: &str) -> Result<()> {
        let fields = DefinitionParser::parse(&name, definition)?;
        let schema = RecordSchema::resolve(&name, &fields)?;
        self.insert(schema)
    }

    /// Register the schema of a typed record so definitions can nest it.
    pub fn register_type<R: Record>(&mut self) -> Result<()> {
        let schema = R::record_schema()?;
        self.insert((*schema).clone())
    }

    fn insert(&mut self, schema: RecordSchema) -> Result<()> {
        for field in &schema.fields {
            if field.kind != FieldKind::Nested {
                continue;
            }
            let nested = field.record.as_deref().unwrap_or_default();
            if !self.schemas.contains_key(nested) {
                return Err(DecodeError::schema(
                    &schema.name,
                    &field.name,
                    format!("Nested record '{}' not found in registry", nested),
                ));
            }
        }

        if self.schemas.contains_key(&schema.name) {
            return Err(DecodeError::schema(
                &schema.name,
                "",
                "record is already registered",
            ));
        }

        debug!(record = %schema.name, fields = schema.num_fields(), "registered record");
        self.order.push(schema.name.clone());
        self.schemas.insert(schema.name.clone(), Arc::new(schema));
        Ok(())
    }

    /// Get a registered schema by name.
    pub fn get(&self, name: &str) -> Option<&Arc<RecordSchema>> {
        self.schemas.get(name)
    }

    fn lookup(&self, name: &str) -> Result<Arc<RecordSchema>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| DecodeError::UnknownRecord(name.to_string()))
    }

    /// Registered schemas in registration order.
    pub fn schemas(&self) -> impl Iterator<Item = &Arc<RecordSchema>> {
        self.order.iter().filter_map(|name| self.schemas.get(name))
    }

    /// Create an empty record value for `name`, ready to decode into.
    pub fn instantiate(&self, name: &str) -> Result<Value> {
        let lookup = |n: &str| self.lookup(n);
        Ok(Value::Record(RecordValue::new(self.lookup(name)?, &lookup)?))
    }

    /// Decode a single `name` record from the start of `data`.
    pub fn decode(&self, name: &str, data: &[u8]) -> Result<Value> {
        let mut value = self.instantiate(name)?;
        crate::unmarshal_value(data, Some(&mut value))?;
        Ok(value)
    }

    /// Decode `name` records back-to-back until `data` is exhausted.
    pub fn decode_all(&self, name: &str, data: &[u8]) -> Result<Vec<Value>> {
        let template = self.instantiate(name)?;
        let mut decoder = Decoder::new(data);
        let mut values = Vec::new();

        while !decoder.is_exhausted() {
            let mut value = template.clone();
            if let Value::Record(record) = &mut value {
                let before = decoder.offset();
                decoder
                    .decode(record)
                    .map_err(|e| e.at(&format!("[{}]", values.len())))?;
                if decoder.offset() == before {
                    // A record that consumes nothing would repeat forever
                    break;
                }
            }
            values.push(value);
        }

        Ok(values)
    }
}
