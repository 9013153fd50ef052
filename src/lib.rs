//! A Rust library for encoding tabular row data into dBase III-style DBF
//! buffers, with per-column schema inference and single-byte code-page
//! transcoding (CP1251, CP866).
//!
//! The crate is a pure encoding engine: rows of named string values in, one
//! contiguous byte buffer out. Parsing the source data, reviewing the
//! inferred schema and persisting the result are collaborator concerns.

pub mod config;
pub mod encoding;
pub mod error;
pub mod schema;
pub mod writer;

// Re-export the most common types for easier use
// Core types
pub use config::DbfWriterConfig;
pub use error::{DbfError, Result};
pub use writer::{DbfBuffer, DbfWriter, write_dbf};

// Schema model and derivation
pub use schema::{
    FieldOverride, FieldSchema, FieldType, Row, Schema, derive_schema,
    derive_schema_with_overrides,
};

// Transcoding
pub use encoding::{CodePage, transcode};
