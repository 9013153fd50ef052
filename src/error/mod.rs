//! Error handling for the DBF writer.
//!
//! Only structural schema problems are errors. A malformed cell value is a
//! degradation handled by the record encoder's fallback renderings and never
//! aborts a conversion.

/// Errors that abort a conversion before any bytes are produced
#[derive(Debug, thiserror::Error)]
pub enum DbfError {
    /// Schema contains no fields
    #[error("schema contains no fields")]
    EmptySchema,

    /// Field width outside the 1..=255 range a descriptor byte can hold
    #[error("field '{field}': width {width} is outside the valid range 1..=255")]
    InvalidWidth {
        /// Name of the offending field
        field: String,
        /// The rejected width
        width: u16,
    },

    /// Fixed-width field type declared with a different width
    #[error("field '{field}': {type_name} fields must have width {expected}, got {width}")]
    InvalidFixedWidth {
        /// Name of the offending field
        field: String,
        /// Display name of the field type
        type_name: &'static str,
        /// Width the type dictates
        expected: u16,
        /// The rejected width
        width: u16,
    },

    /// Header block would not fit the 16-bit header-length slot
    #[error("{fields} fields make the header block too large for its 16-bit length slot")]
    SchemaTooLarge {
        /// Number of fields in the rejected schema
        fields: usize,
    },

    /// Summed field widths would not fit the 16-bit record-length slot
    #[error("record length {len} exceeds the 16-bit limit of the DBF header")]
    RecordTooLong {
        /// The rejected record length in bytes
        len: usize,
    },

    /// More rows than the 32-bit record counter can hold
    #[error("record count {count} exceeds the 32-bit limit of the DBF header")]
    TooManyRecords {
        /// Number of rows submitted
        count: usize,
    },
}

/// Alias for Result with `DbfError`
pub type Result<T> = std::result::Result<T, DbfError>;
