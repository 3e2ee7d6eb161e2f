//! Declarative decoding of flat positional records.
//!
//! This library decodes a flat byte buffer into a structure whose layout is
//! attached to its fields as tags, rather than written as parsing code. It
//! targets fixed-width and separator-delimited record formats such as legacy
//! wire records and flat-file interchange formats.
//!
//! # Example
//!
//! ```
//! flatrec::record! {
//!     #[derive(Debug, Default)]
//!     pub struct Quote {
//!         pub id: i64 = r#"len:"2""#,
//!         pub symbol: String = r#"sep:"\x1c""#,
//!         pub prices: Vec<i64> = r#"sep:"\x1c" len:"5""#,
//!     }
//! }
//!
//! let mut quote = Quote::default();
//! flatrec::unmarshal(b"07ACME\x1c1200\x1c-5", &mut quote)?;
//!
//! assert_eq!(quote.id, 7);
//! assert_eq!(quote.symbol, "ACME");
//! assert_eq!(quote.prices, vec![1200, -5]);
//! # Ok::<(), flatrec::DecodeError>(())
//! ```
//!
//! # Tags
//!
//! | Tag | Meaning | Default |
//! |-----|---------|---------|
//! | `len` | Fixed read size, or the scan cap when combined with `sep` | no length bound |
//! | `sep` | Single separator character | no separator |
//! | `type` | Legacy explicit kind (`int`, `string`) | inferred from the field type |
//! | `padding` | Padding character; accepted but never stripped | none |
//! | `count` | Exact number of list elements | list ends at the first empty element |
//!
//! Scalar and list fields need at least one of `len` or `sep`.
//!
//! # Reading Rules
//!
//! - `len` only: exactly `len` bytes, or a buffer underrun error.
//! - `sep`, optionally capped by `len`: bytes up to the separator (which is
//!   consumed), or `len` bytes if no separator occurs within them, or the
//!   rest of the buffer.
//! - Lists repeat the read until an empty element or the end of the buffer.
//!
//! # Runtime Definitions
//!
//! Records can also be defined as text and decoded into a dynamic [`Value`]:
//!
//! ```
//! use flatrec::SchemaRegistry;
//!
//! let registry = SchemaRegistry::from_definitions(r#"
//! Header = int count `len:"2"`; string name `len:"5"`
//! "#)?;
//! let value = registry.decode("Header", b"03hello")?;
//! println!("{}", value);
//! # Ok::<(), flatrec::DecodeError>(())
//! ```

pub mod cursor;
pub mod decoder;
pub mod definition;
pub mod error;
pub mod record;
pub mod schema;
pub mod tags;
pub mod target;
pub mod types;
pub mod value;

pub use decoder::Decoder;
pub use definition::{DefinitionParser, SchemaRegistry};
pub use error::{DecodeError, Result};
pub use record::Record;
pub use schema::{FieldDef, FieldDescriptor, RecordSchema};
pub use tags::TagSet;
pub use target::{DecodeTarget, FieldType, Slot};
pub use types::{DeclaredType, FieldKind};
pub use value::{RecordValue, Value};

use std::fs::File;
use std::path::Path;

/// Decodes `data` into a typed record.
///
/// Fields are populated in declaration order. On error `target` may be
/// partially populated and should be discarded.
pub fn unmarshal<R: Record>(data: &[u8], target: &mut R) -> Result<()> {
    Decoder::new(data).decode(target)
}

/// Decodes `data` into a dynamic record value.
///
/// `target` must be present and must be a [`Value::Record`]; both are checked
/// before any input is read.
pub fn unmarshal_value(data: &[u8], target: Option<&mut Value>) -> Result<()> {
    let target = target.ok_or(DecodeError::InvalidTarget)?;
    match target {
        Value::Record(record) => Decoder::new(data).decode(record),
        other => Err(DecodeError::InvalidTargetShape {
            found: other.shape(),
        }),
    }
}

/// Decodes a record from a file using memory mapping.
///
/// # Example
///
/// ```no_run
/// flatrec::record! {
///     #[derive(Default)]
///     pub struct Line {
///         pub text: String = r#"sep:"\n""#,
///     }
/// }
///
/// let mut line = Line::default();
/// flatrec::unmarshal_file("records.dat", &mut line)?;
/// # Ok::<(), flatrec::DecodeError>(())
/// ```
pub fn unmarshal_file<R: Record, P: AsRef<Path>>(path: P, target: &mut R) -> Result<()> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return unmarshal(&[], target);
    }
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    unmarshal(&mmap, target)
}
