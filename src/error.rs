//! Error types for the flat record decoder.

use std::num::ParseIntError;
use thiserror::Error;

/// Result type alias for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors that can occur when resolving schemas or decoding records.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// No decode target was supplied
    #[error("Invalid target: decode target is missing")]
    InvalidTarget,

    /// The decode target is not a record
    #[error("Invalid target: expected a record, found {found}")]
    InvalidTargetShape { found: &'static str },

    /// Field metadata or a record definition could not be resolved
    #[error("Schema error in {record}.{field}: {reason}")]
    Schema {
        record: String,
        field: String,
        reason: String,
    },

    /// A fixed-length read asked for more bytes than remain in the buffer
    #[error("Buffer underrun at offset {offset}: need {needed} bytes, {remaining} remaining")]
    BufferUnderrun {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// A chunk could not be parsed as a signed base-10 integer
    #[error("Unable to parse integer from {chunk:?}: {source}")]
    IntegerParse {
        chunk: String,
        #[source]
        source: ParseIntError,
    },

    /// A record name was not found in the registry
    #[error("Record '{0}' not found in registry")]
    UnknownRecord(String),

    /// An error raised while decoding the field at `path`
    #[error("{path}: {source}")]
    Field {
        path: String,
        #[source]
        source: Box<DecodeError>,
    },

    /// I/O error occurred while reading input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    pub(crate) fn schema(
        record: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DecodeError::Schema {
            record: record.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Prefixes the error's field path with `segment`.
    ///
    /// Errors bubble up from the innermost field outwards, so each level of
    /// the decoder prepends its own segment. Index segments (`[3]`) attach
    /// without a dot.
    pub(crate) fn at(self, segment: &str) -> Self {
        match self {
            DecodeError::Field { path, source } => {
                let joined = if path.starts_with('[') {
                    format!("{segment}{path}")
                } else {
                    format!("{segment}.{path}")
                };
                DecodeError::Field {
                    path: joined,
                    source,
                }
            }
            other => DecodeError::Field {
                path: segment.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The dotted path of the field that failed, if the error arose while
    /// decoding a field.
    pub fn path(&self) -> Option<&str> {
        match self {
            DecodeError::Field { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The underlying error with any field context stripped.
    pub fn root(&self) -> &DecodeError {
        match self {
            DecodeError::Field { source, .. } => source.root(),
            other => other,
        }
    }
}
