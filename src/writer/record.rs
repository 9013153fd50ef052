//! Fixed-width record serialization.
//!
//! One row becomes one record of exactly `1 + Σ width` bytes: the
//! deleted-flag byte, then every field's bytes in schema order. A cell that
//! does not match its field's expected shape degrades to the type's
//! documented fallback rendering; encoding a record never fails.

use chrono::NaiveDate;

use crate::encoding::{CodePage, transcode};
use crate::schema::{FieldSchema, FieldType, Row, Schema};

/// Deleted-flag byte for a live record
pub const RECORD_LIVE: u8 = 0x20;

/// Serialize one row into a fixed-width record.
///
/// Assumes the schema has already passed `Schema::validate`; the writer
/// checks that once, before the first record.
#[must_use]
pub fn encode_record(schema: &Schema, row: &Row, code_page: CodePage) -> Vec<u8> {
    let mut record = Vec::with_capacity(schema.record_len());
    record.push(RECORD_LIVE);
    for field in schema.fields() {
        let value = row.get(&field.name).map_or("", String::as_str);
        encode_field(&mut record, field, value, code_page);
    }
    record
}

fn encode_field(record: &mut Vec<u8>, field: &FieldSchema, value: &str, code_page: CodePage) {
    let width = usize::from(field.width);
    match field.field_type {
        FieldType::Character => {
            let mut bytes = transcode(value, code_page);
            bytes.truncate(width);
            bytes.resize(width, b' ');
            record.extend_from_slice(&bytes);
        }
        FieldType::Numeric => {
            let rendered = render_numeric(field, value);
            let bytes = rendered.as_bytes();
            if bytes.len() < width {
                record.resize(record.len() + width - bytes.len(), b' ');
                record.extend_from_slice(bytes);
            } else {
                record.extend_from_slice(&bytes[..width]);
            }
        }
        FieldType::Date => record.extend_from_slice(&render_date(field, value)),
        FieldType::Logical => record.push(if is_truthy(value) { b'T' } else { b'F' }),
    }
}

/// Render a numeric cell with exactly the field's decimal digits.
/// An unparsable or non-finite value renders as zero at the same precision.
fn render_numeric(field: &FieldSchema, value: &str) -> String {
    let normalized = value.trim().replace(',', ".");
    let number = match normalized.parse::<f64>() {
        Ok(number) if number.is_finite() => number,
        _ => {
            if !normalized.is_empty() {
                log::debug!(
                    "field '{}': cell '{value}' is not a number, rendering zero",
                    field.name
                );
            }
            0.0
        }
    };
    format!("{number:.prec$}", prec = usize::from(field.decimals))
}

/// Render a `DD.MM.YYYY` cell as `YYYYMMDD`; anything else as eight zeros.
fn render_date(field: &FieldSchema, value: &str) -> Vec<u8> {
    if let Ok(date) = NaiveDate::parse_from_str(value.trim(), "%d.%m.%Y") {
        let rendered = date.format("%Y%m%d").to_string();
        if rendered.len() == 8 {
            return rendered.into_bytes();
        }
    }
    if !value.trim().is_empty() {
        log::debug!(
            "field '{}': cell '{value}' is not a DD.MM.YYYY date, rendering zeros",
            field.name
        );
    }
    vec![b'0'; 8]
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "t" | "1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSchema;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn single(field: FieldSchema, value: &str, code_page: CodePage) -> Vec<u8> {
        let name = field.name.clone();
        let schema = Schema::new(vec![field]);
        encode_record(&schema, &row(&[(name.as_str(), value)]), code_page)
    }

    #[test]
    fn test_character_padding_and_transcoding() {
        let field = FieldSchema::new("t", FieldType::Character, 5, 0);
        let record = single(field, "Кіт", CodePage::Cp1251);
        assert_eq!(record, vec![0x20, 0xCA, 0xB3, 0xF2, b' ', b' ']);
    }

    #[test]
    fn test_character_truncation() {
        let field = FieldSchema::new("t", FieldType::Character, 3, 0);
        let record = single(field, "abcdef", CodePage::Cp1251);
        assert_eq!(&record[1..], b"abc");
    }

    #[test]
    fn test_numeric_comma_separator() {
        let field = FieldSchema::new("n", FieldType::Numeric, 8, 1);
        let record = single(field, "1234,5", CodePage::Cp1251);
        assert_eq!(&record[1..], b"  1234.5");
    }

    #[test]
    fn test_numeric_integer_precision() {
        let field = FieldSchema::new("n", FieldType::Numeric, 4, 0);
        let record = single(field, "7", CodePage::Cp1251);
        assert_eq!(&record[1..], b"   7");
    }

    #[test]
    fn test_numeric_garbage_renders_zero() {
        let field = FieldSchema::new("n", FieldType::Numeric, 6, 2);
        let record = single(field, "oops", CodePage::Cp1251);
        assert_eq!(&record[1..], b"  0.00");
    }

    #[test]
    fn test_numeric_absent_renders_zero() {
        let field = FieldSchema::new("n", FieldType::Numeric, 3, 0);
        let schema = Schema::new(vec![field]);
        let record = encode_record(&schema, &Row::default(), CodePage::Cp1251);
        assert_eq!(&record[1..], b"  0");
    }

    #[test]
    fn test_date_rendering() {
        let field = FieldSchema::new("d", FieldType::Date, 8, 0);
        let record = single(field, "21.03.2024", CodePage::Cp1251);
        assert_eq!(&record[1..], b"20240321");
    }

    #[test]
    fn test_bad_date_renders_zeros() {
        for bad in ["bad", "2024-03-21", "32.01.2024", ""] {
            let field = FieldSchema::new("d", FieldType::Date, 8, 0);
            let record = single(field, bad, CodePage::Cp1251);
            assert_eq!(&record[1..], b"00000000", "input: {bad:?}");
        }
    }

    #[test]
    fn test_logical_truth_table() {
        for truthy in ["true", "TRUE", "T", "t", "1", " 1 "] {
            let field = FieldSchema::new("l", FieldType::Logical, 1, 0);
            assert_eq!(single(field, truthy, CodePage::Cp1251)[1], b'T');
        }
        for falsy in ["false", "FALSE", "0", "", "x", "yes"] {
            let field = FieldSchema::new("l", FieldType::Logical, 1, 0);
            assert_eq!(single(field, falsy, CodePage::Cp1251)[1], b'F');
        }
    }

    #[test]
    fn test_record_layout_never_overlaps() {
        let schema = Schema::new(vec![
            FieldSchema::new("a", FieldType::Character, 3, 0),
            FieldSchema::new("b", FieldType::Numeric, 4, 0),
            FieldSchema::new("c", FieldType::Logical, 1, 0),
            FieldSchema::new("d", FieldType::Date, 8, 0),
        ]);
        let record = encode_record(
            &schema,
            &row(&[("a", "hi"), ("b", "42"), ("c", "1"), ("d", "01.01.2020")]),
            CodePage::Cp1251,
        );
        assert_eq!(record.len(), schema.record_len());
        assert_eq!(record[0], RECORD_LIVE);
        assert_eq!(&record[1..4], b"hi ");
        assert_eq!(&record[4..8], b"  42");
        assert_eq!(record[8], b'T');
        assert_eq!(&record[9..17], b"20200101");
    }
}
