//! DBF buffer assembly.
//!
//! The writer glues the header builder and the record encoder together:
//! validate the schema once, build the header, encode every row in input
//! order, append the end-of-file marker. Each call produces a fresh buffer
//! and holds no state, so independent conversions can run concurrently.

pub mod header;
pub mod record;

use chrono::Local;

use crate::config::DbfWriterConfig;
use crate::error::{DbfError, Result};
use crate::schema::{Row, Schema};

use self::header::build_header;
use self::record::encode_record;

/// End-of-file marker appended after the last record
pub const EOF_MARKER: u8 = 0x1A;

/// A fully assembled DBF file image plus its suggested file name.
///
/// Persistence is the storage collaborator's concern; the engine only
/// produces the bytes and a name to save them under.
#[derive(Debug, Clone)]
pub struct DbfBuffer {
    /// Raw file bytes: header, records in input order, EOF marker
    pub data: Vec<u8>,
    /// Name the caller should save the buffer under
    pub file_name: String,
}

/// Assembles DBF buffers from a schema and rows under one configuration
#[derive(Debug, Clone, Default)]
pub struct DbfWriter {
    config: DbfWriterConfig,
}

impl DbfWriter {
    /// Create a writer with the given configuration
    #[must_use]
    pub fn new(config: DbfWriterConfig) -> Self {
        Self { config }
    }

    /// The writer's configuration
    #[must_use]
    pub fn config(&self) -> &DbfWriterConfig {
        &self.config
    }

    /// Assemble header, records and EOF marker into one buffer.
    ///
    /// Fails fast on a structurally invalid schema or a row count beyond the
    /// header's 32-bit counter; no partial buffer is ever returned.
    /// Malformed cell values degrade to their documented fallback bytes and
    /// do not fail the conversion.
    pub fn write(&self, schema: &Schema, rows: &[Row]) -> Result<DbfBuffer> {
        schema.validate()?;
        let record_count = u32::try_from(rows.len())
            .map_err(|_| DbfError::TooManyRecords { count: rows.len() })?;

        let today = Local::now().date_naive();
        let header = build_header(schema, record_count, self.config.code_page, today)?;

        let record_len = schema.record_len();
        let mut data = Vec::with_capacity(header.len() + rows.len() * record_len + 1);
        data.extend_from_slice(&header);
        for row in rows {
            let record = encode_record(schema, row, self.config.code_page);
            debug_assert_eq!(record.len(), record_len);
            data.extend_from_slice(&record);
        }
        data.push(EOF_MARKER);

        log::debug!(
            "assembled {} records of {} bytes into a {}-byte buffer ({})",
            rows.len(),
            record_len,
            data.len(),
            self.config.code_page
        );
        Ok(DbfBuffer {
            data,
            file_name: self.config.file_name.clone(),
        })
    }
}

/// Assemble a buffer with the default configuration (CP1251, `output.dbf`)
pub fn write_dbf(schema: &Schema, rows: &[Row]) -> Result<DbfBuffer> {
    DbfWriter::default().write(schema, rows)
}
