//! Typed records.
//!
//! The [`record!`](crate::record!) macro declares a struct together with the
//! tags of each field and implements [`Record`], [`DecodeTarget`] and
//! [`FieldType`](crate::FieldType) for it. Schemas are resolved on first use
//! and cached per type.

use crate::error::{DecodeError, Result};
use crate::schema::{FieldDef, RecordSchema};
use crate::tags::TagSet;
use crate::target::{DecodeTarget, FieldType};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::debug;

/// A Rust struct with a declared flat-record layout.
pub trait Record: DecodeTarget + 'static {
    /// The record's name, used in schemas and error paths.
    const NAME: &'static str;

    /// The struct's fields in declaration order, with their parsed tags.
    fn field_defs() -> Result<Vec<FieldDef>>;

    /// The resolved schema for this type, cached after the first call.
    fn record_schema() -> Result<Arc<RecordSchema>>
    where
        Self: Sized,
    {
        cached_schema::<Self>()
    }
}

type SchemaCache = RwLock<HashMap<TypeId, Arc<RecordSchema>>>;

fn schema_cache() -> &'static SchemaCache {
    static CACHE: OnceLock<SchemaCache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Resolve `R`'s schema once and reuse it across calls.
///
/// Only successfully resolved schemas are cached; a failing schema fails
/// again on every call.
pub fn cached_schema<R: Record>() -> Result<Arc<RecordSchema>> {
    let key = TypeId::of::<R>();
    if let Some(schema) = schema_cache()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Ok(Arc::clone(schema));
    }

    let schema = Arc::new(RecordSchema::resolve(R::NAME, &R::field_defs()?)?);
    debug!(record = R::NAME, fields = schema.num_fields(), "resolved record schema");

    let mut cache = schema_cache()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(cache.entry(key).or_insert(schema)))
}

/// Builds the definition of field `field` of `record` from its Rust type and tag string.
#[doc(hidden)]
pub fn field_def<T: FieldType>(record: &str, field: &str, tags: &str) -> Result<FieldDef> {
    let tags =
        TagSet::parse(tags).map_err(|reason| DecodeError::schema(record, field, reason))?;
    Ok(FieldDef::new(field, T::declared_type(), tags))
}

#[doc(hidden)]
#[macro_export]
macro_rules! __tag_str {
    () => {
        ""
    };
    ($tags:literal) => {
        $tags
    };
}

/// Declares a struct whose fields are decoded from a flat record.
///
/// Each field may carry a tag string after its type, in the same
/// `key:"value"` syntax Go struct tags use:
///
/// ```
/// flatrec::record! {
///     #[derive(Debug, Default)]
///     pub struct Header {
///         pub count: i64 = r#"len:"2""#,
///         pub name: String = r#"sep:"\x1c""#,
///     }
/// }
///
/// let mut header = Header::default();
/// flatrec::unmarshal(b"03hello", &mut header)?;
/// assert_eq!(header.count, 3);
/// assert_eq!(header.name, "hello");
/// # Ok::<(), flatrec::DecodeError>(())
/// ```
///
/// Supported field types are `i8`..`i64`, `isize`, `String`, `Vec` of those,
/// and other `record!` structs (nested, no tag needed).
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $(= $tags:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            const NAME: &'static str = stringify!($name);

            fn field_defs() -> $crate::Result<::std::vec::Vec<$crate::FieldDef>> {
                ::std::result::Result::Ok(::std::vec![
                    $(
                        $crate::record::field_def::<$ty>(
                            stringify!($name),
                            stringify!($field),
                            $crate::__tag_str!($($tags)?),
                        )?,
                    )*
                ])
            }
        }

        impl $crate::DecodeTarget for $name {
            fn schema(&self) -> $crate::Result<::std::sync::Arc<$crate::RecordSchema>> {
                $crate::record::cached_schema::<Self>()
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn slot(&mut self, index: usize) -> ::std::option::Option<$crate::Slot<'_>> {
                let mut position = 0usize;
                $(
                    if index == position {
                        return ::std::option::Option::Some($crate::FieldType::field_slot(&mut self.$field));
                    }
                    position += 1;
                )*
                ::std::option::Option::None
            }
        }

        impl $crate::FieldType for $name {
            fn declared_type() -> $crate::DeclaredType {
                $crate::DeclaredType::Record(::std::string::String::from(stringify!($name)))
            }

            fn field_slot(&mut self) -> $crate::Slot<'_> {
                $crate::Slot::Nested(self)
            }
        }
    };
}
