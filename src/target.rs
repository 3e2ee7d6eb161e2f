//! Decode targets: the output structures the decoder writes into.
//!
//! A target exposes its resolved schema and a mutable [`Slot`] per field.
//! Typed records get their implementation from the `record!` macro; the
//! dynamic [`RecordValue`](crate::value::RecordValue) implements it by hand.

use crate::error::Result;
use crate::schema::RecordSchema;
use crate::types::DeclaredType;
use std::num::ParseIntError;
use std::sync::Arc;

/// A structure the decoder can populate field by field.
pub trait DecodeTarget {
    /// The resolved schema describing this target's fields.
    fn schema(&self) -> Result<Arc<RecordSchema>>;

    /// Mutable access to the field at `index` (declaration order).
    fn slot(&mut self, index: usize) -> Option<Slot<'_>>;
}

/// Mutable access to one field of a decode target.
pub enum Slot<'a> {
    Integer(&'a mut dyn IntegerField),
    Text(&'a mut String),
    Nested(&'a mut dyn DecodeTarget),
    IntegerList(&'a mut dyn IntegerListField),
    TextList(&'a mut Vec<String>),
}

impl Slot<'_> {
    /// Name of the slot's shape, for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Slot::Integer(_) => "integer",
            Slot::Text(_) => "text",
            Slot::Nested(_) => "record",
            Slot::IntegerList(_) => "integer list",
            Slot::TextList(_) => "text list",
        }
    }
}

/// An integer field of any width, assigned from base-10 text.
pub trait IntegerField {
    fn set_parsed(&mut self, text: &str) -> std::result::Result<(), ParseIntError>;
}

/// A growable list of integers of any width.
pub trait IntegerListField {
    fn clear(&mut self);
    fn push_parsed(&mut self, text: &str) -> std::result::Result<(), ParseIntError>;
}

macro_rules! impl_integer_field {
    ($($ty:ty),*) => {
        $(
            impl IntegerField for $ty {
                fn set_parsed(&mut self, text: &str) -> std::result::Result<(), ParseIntError> {
                    *self = text.parse()?;
                    Ok(())
                }
            }

            impl IntegerListField for Vec<$ty> {
                fn clear(&mut self) {
                    Vec::clear(self);
                }

                fn push_parsed(&mut self, text: &str) -> std::result::Result<(), ParseIntError> {
                    self.push(text.parse()?);
                    Ok(())
                }
            }

            impl FieldType for $ty {
                fn declared_type() -> DeclaredType {
                    DeclaredType::Integer
                }

                fn field_slot(&mut self) -> Slot<'_> {
                    Slot::Integer(self)
                }
            }

            impl FieldType for Vec<$ty> {
                fn declared_type() -> DeclaredType {
                    DeclaredType::IntegerList
                }

                fn field_slot(&mut self) -> Slot<'_> {
                    Slot::IntegerList(self)
                }
            }
        )*
    };
}

impl_integer_field!(i8, i16, i32, i64, isize);

/// A Rust type usable as a field of a `record!` struct.
pub trait FieldType {
    /// The declared type the schema resolver infers the kind from.
    fn declared_type() -> DeclaredType;

    /// Mutable access for the decoder.
    fn field_slot(&mut self) -> Slot<'_>;
}

impl FieldType for String {
    fn declared_type() -> DeclaredType {
        DeclaredType::Text
    }

    fn field_slot(&mut self) -> Slot<'_> {
        Slot::Text(self)
    }
}

impl FieldType for Vec<String> {
    fn declared_type() -> DeclaredType {
        DeclaredType::TextList
    }

    fn field_slot(&mut self) -> Slot<'_> {
        Slot::TextList(self)
    }
}
