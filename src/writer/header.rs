//! DBF header construction.
//!
//! Fixed 32-byte prefix, one 32-byte descriptor per field, one terminator
//! byte. The lengths written into the prefix are the same values the
//! assembler later uses to lay out records, so header and body can never
//! disagree about the file geometry.

use chrono::{Datelike, NaiveDate};

use crate::encoding::{CodePage, transcode};
use crate::error::Result;
use crate::schema::{FieldType, HEADER_BLOCK, Schema};

/// dBase III version byte at offset 0
pub const VERSION_DBASE3: u8 = 0x03;

/// Terminator written immediately after the last field descriptor
pub const HEADER_TERMINATOR: u8 = 0x0D;

/// Descriptor bytes reserved for the field name
const FIELD_NAME_LEN: usize = 10;

/// Build the header block for `schema` with `record_count` records.
///
/// The modification date is passed in rather than sampled here so tests can
/// pin it; the writer passes today's local date. Field names are transcoded
/// with the target code page, truncated to 10 bytes and zero-padded.
pub fn build_header(
    schema: &Schema,
    record_count: u32,
    code_page: CodePage,
    modified: NaiveDate,
) -> Result<Vec<u8>> {
    schema.validate()?;

    let header_len = schema.header_len();
    let record_len = schema.record_len();
    let mut header = vec![0u8; header_len];

    header[0] = VERSION_DBASE3;
    header[1] = modified.year().saturating_sub(1900).clamp(0, 255) as u8;
    header[2] = modified.month() as u8;
    header[3] = modified.day() as u8;
    header[4..8].copy_from_slice(&record_count.to_le_bytes());
    header[8..10].copy_from_slice(&(header_len as u16).to_le_bytes());
    header[10..12].copy_from_slice(&(record_len as u16).to_le_bytes());
    header[29] = code_page.language_driver();

    for (index, field) in schema.fields().iter().enumerate() {
        let descriptor = &mut header[HEADER_BLOCK + index * HEADER_BLOCK..][..HEADER_BLOCK];
        let name = transcode(&field.name, code_page);
        let name_len = name.len().min(FIELD_NAME_LEN);
        descriptor[..name_len].copy_from_slice(&name[..name_len]);
        descriptor[11] = field.field_type.code();
        descriptor[16] = field.width as u8;
        if field.field_type == FieldType::Numeric {
            descriptor[17] = field.decimals;
        }
    }

    header[header_len - 1] = HEADER_TERMINATOR;
    Ok(header)
}
