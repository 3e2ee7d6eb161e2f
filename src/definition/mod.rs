//! Runtime record definitions.
//!
//! This module parses record definitions written as text and keeps them in
//! a registry, so records can be decoded without a Rust struct.

pub mod parser;
pub mod registry;

pub use parser::DefinitionParser;
pub use registry::SchemaRegistry;
