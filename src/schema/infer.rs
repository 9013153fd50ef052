//! Field type inference from sample values.
//!
//! One sample value per column (normally the first row's) decides the
//! field's type, width and decimal count. First match wins: strict
//! `DD.MM.YYYY` date, then number, else text. Inference is a pure function
//! of the sample, so re-running it can never change a derived schema.

use chrono::NaiveDate;

use super::{FieldSchema, FieldType};

/// Widest Character field inference will produce
pub const MAX_CHARACTER_WIDTH: u16 = 254;

/// Widest Numeric field inference will produce
pub const MAX_NUMERIC_WIDTH: u16 = 20;

/// Width used for a column whose sample is empty, and for every column when
/// automatic detection is disabled
pub const DEFAULT_CHARACTER_WIDTH: u16 = 20;

/// Infer a field schema from a single sample value.
#[must_use]
pub fn infer_field(name: &str, sample: &str) -> FieldSchema {
    let sample = sample.trim();
    if sample.is_empty() {
        return default_field(name);
    }
    if is_strict_date(sample) {
        return FieldSchema::new(name, FieldType::Date, 8, 0);
    }
    if let Some((width, decimals)) = numeric_shape(sample) {
        return FieldSchema::new(name, FieldType::Numeric, width, decimals);
    }
    // one byte per character under a single-byte code page
    let width = sample
        .chars()
        .count()
        .clamp(1, usize::from(MAX_CHARACTER_WIDTH)) as u16;
    FieldSchema::new(name, FieldType::Character, width, 0)
}

/// The conservative Character/20 schema used when inference is disabled
#[must_use]
pub fn default_field(name: &str) -> FieldSchema {
    FieldSchema::new(name, FieldType::Character, DEFAULT_CHARACTER_WIDTH, 0)
}

/// Strict `DD.MM.YYYY`: exact length, dots in place, and a real calendar date
fn is_strict_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[2] == b'.'
        && bytes[5] == b'.'
        && NaiveDate::parse_from_str(value, "%d.%m.%Y").is_ok()
}

/// Width and decimal count for a value that parses as a finite number.
///
/// The decimal separator may be `,` or `.`; the width is the length of the
/// value re-rendered with a normalized point at the detected precision,
/// clamped to `MAX_NUMERIC_WIDTH`, and the decimal count is clamped so the
/// point and at least one integer digit still fit.
fn numeric_shape(value: &str) -> Option<(u16, u8)> {
    let normalized = value.replace(',', ".");
    let number: f64 = normalized.parse().ok()?;
    if !number.is_finite() {
        return None;
    }
    let decimals = normalized
        .rsplit_once('.')
        .map_or(0, |(_, fraction)| fraction.len())
        .min(usize::from(u8::MAX)) as u8;
    let rendered = format!("{number:.prec$}", prec = usize::from(decimals));
    let width = rendered.len().min(usize::from(MAX_NUMERIC_WIDTH)) as u16;
    let decimals = if u16::from(decimals) + 2 > width {
        width.saturating_sub(2) as u8
    } else {
        decimals
    };
    Some((width, decimals))
}
