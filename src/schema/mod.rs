//! Field schema model governing DBF output.
//!
//! A `Schema` is derived once per conversion, either from the first row's
//! values (inference) or from caller-supplied overrides, and is immutable
//! while records are encoded. Validation happens up front: a structurally
//! bad schema fails the whole conversion before a single byte is written.

pub mod infer;

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::DbfWriterConfig;
use crate::error::{DbfError, Result};

/// Raw row from the parsing collaborator: column name to raw text value.
/// An absent column is the blank value for its field type, never an error.
pub type Row = FxHashMap<String, String>;

/// Bytes of the fixed header prefix and of each field descriptor
pub const HEADER_BLOCK: usize = 32;

/// DBF field types (closed set; the dBase III dialect has no memo fields)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// Fixed-width text
    Character,
    /// Right-aligned decimal number
    Numeric,
    /// Single `T`/`F` byte
    Logical,
    /// `YYYYMMDD`, 8 ASCII digits
    Date,
}

impl FieldType {
    /// ASCII type-code byte stored at offset 11 of the field descriptor
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            FieldType::Character => b'C',
            FieldType::Numeric => b'N',
            FieldType::Logical => b'L',
            FieldType::Date => b'D',
        }
    }

    /// Reverse lookup from a descriptor type-code byte
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            b'C' => Some(FieldType::Character),
            b'N' => Some(FieldType::Numeric),
            b'L' => Some(FieldType::Logical),
            b'D' => Some(FieldType::Date),
            _ => None,
        }
    }

    /// Width dictated by the format for types that are not free-width
    #[must_use]
    pub const fn fixed_width(self) -> Option<u16> {
        match self {
            FieldType::Date => Some(8),
            FieldType::Logical => Some(1),
            FieldType::Character | FieldType::Numeric => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Character => write!(f, "Character"),
            FieldType::Numeric => write!(f, "Numeric"),
            FieldType::Logical => write!(f, "Logical"),
            FieldType::Date => write!(f, "Date"),
        }
    }
}

/// One output column: name, type, byte width and decimal digits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Column name; truncated to 10 bytes in the descriptor
    pub name: String,
    /// Field type
    pub field_type: FieldType,
    /// Fixed byte width reserved in every record
    pub width: u16,
    /// Decimal digits; meaningful only for Numeric fields
    pub decimals: u8,
}

impl FieldSchema {
    /// Create a new field schema
    pub fn new(name: impl Into<String>, field_type: FieldType, width: u16, decimals: u8) -> Self {
        Self {
            name: name.into(),
            field_type,
            width,
            decimals,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.width > 255 {
            return Err(DbfError::InvalidWidth {
                field: self.name.clone(),
                width: self.width,
            });
        }
        if let Some(expected) = self.field_type.fixed_width() {
            if self.width != expected {
                return Err(DbfError::InvalidFixedWidth {
                    field: self.name.clone(),
                    type_name: match self.field_type {
                        FieldType::Date => "Date",
                        FieldType::Logical => "Logical",
                        _ => unreachable!(),
                    },
                    expected,
                    width: self.width,
                });
            }
        }
        Ok(())
    }
}

/// A partially-specified schema entry from the review boundary.
///
/// Any attribute left `None` is filled in by derivation; a decimal count
/// that does not fit an unsigned byte is coerced to 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldOverride {
    /// Column this override applies to
    pub name: String,
    /// Forced field type, if any
    #[serde(default)]
    pub field_type: Option<FieldType>,
    /// Forced width, if any
    #[serde(default)]
    pub width: Option<u16>,
    /// Forced decimal digit count, if any
    #[serde(default)]
    pub decimals: Option<i64>,
}

impl FieldOverride {
    /// Create an override that only names its column
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn apply(&self, mut base: FieldSchema) -> FieldSchema {
        if let Some(field_type) = self.field_type {
            base.field_type = field_type;
            // a forced fixed-width type resets the derived width unless the
            // override also pins one explicitly
            if let Some(fixed) = field_type.fixed_width() {
                base.width = fixed;
            }
        }
        if let Some(width) = self.width {
            base.width = width;
        }
        if let Some(decimals) = self.decimals {
            base.decimals = u8::try_from(decimals).unwrap_or(0);
        }
        base
    }
}

/// Ordered field schema governing one conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<FieldSchema>,
}

impl Schema {
    /// Create a schema from an ordered field list
    #[must_use]
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        Self { fields }
    }

    /// The fields in output order
    #[must_use]
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Header block length: fixed prefix, one descriptor per field, and the
    /// terminator byte
    #[must_use]
    pub fn header_len(&self) -> usize {
        HEADER_BLOCK + HEADER_BLOCK * self.fields.len() + 1
    }

    /// Record length: the deleted-flag byte plus every field width
    #[must_use]
    pub fn record_len(&self) -> usize {
        1 + self
            .fields
            .iter()
            .map(|field| usize::from(field.width))
            .sum::<usize>()
    }

    /// Check the schema is structurally encodable.
    ///
    /// Rejects empty schemas, widths outside 1..=255, fixed-width types
    /// declared with a different width, and layouts whose header or record
    /// length would overflow the header's 16-bit slots.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(DbfError::EmptySchema);
        }
        for field in &self.fields {
            field.validate()?;
        }
        if u16::try_from(self.header_len()).is_err() {
            return Err(DbfError::SchemaTooLarge {
                fields: self.fields.len(),
            });
        }
        if u16::try_from(self.record_len()).is_err() {
            return Err(DbfError::RecordTooLong {
                len: self.record_len(),
            });
        }
        Ok(())
    }
}

/// Derive a schema for the given columns, sampling each column's value in
/// the first row.
///
/// With `auto_detect_types` set the sample value decides type, width and
/// decimals (see [`infer::infer_field`]); otherwise every column gets the
/// conservative Character/20 default.
#[must_use]
pub fn derive_schema(columns: &[String], rows: &[Row], config: &DbfWriterConfig) -> Schema {
    let first = rows.first();
    let fields = columns
        .iter()
        .map(|name| {
            if config.auto_detect_types {
                let sample = first
                    .and_then(|row| row.get(name))
                    .map_or("", String::as_str);
                infer::infer_field(name, sample)
            } else {
                infer::default_field(name)
            }
        })
        .collect();
    Schema::new(fields)
}

/// Derive a schema, letting caller-supplied overrides win over derivation.
///
/// Overrides are matched to columns by name; columns without an override,
/// and override attributes left unset, fall back to [`derive_schema`]
/// behavior.
#[must_use]
pub fn derive_schema_with_overrides(
    columns: &[String],
    rows: &[Row],
    overrides: &[FieldOverride],
    config: &DbfWriterConfig,
) -> Schema {
    let derived = derive_schema(columns, rows, config);
    let fields = derived
        .fields
        .into_iter()
        .map(|field| {
            match overrides.iter().find(|o| o.name == field.name) {
                Some(o) => o.apply(field),
                None => field,
            }
        })
        .collect();
    Schema::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::CodePage;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_type_codes_round_trip() {
        for field_type in [
            FieldType::Character,
            FieldType::Numeric,
            FieldType::Logical,
            FieldType::Date,
        ] {
            assert_eq!(FieldType::from_code(field_type.code()), Some(field_type));
        }
        assert_eq!(FieldType::from_code(b'M'), None);
    }

    #[test]
    fn test_lengths() {
        let schema = Schema::new(vec![
            FieldSchema::new("a", FieldType::Character, 3, 0),
            FieldSchema::new("b", FieldType::Numeric, 4, 0),
        ]);
        assert_eq!(schema.header_len(), 32 + 64 + 1);
        assert_eq!(schema.record_len(), 1 + 3 + 4);
    }

    #[test]
    fn test_validate_rejects_empty_schema() {
        assert!(matches!(
            Schema::new(vec![]).validate(),
            Err(DbfError::EmptySchema)
        ));
    }

    #[test]
    fn test_validate_rejects_bad_widths() {
        let zero = Schema::new(vec![FieldSchema::new("a", FieldType::Character, 0, 0)]);
        assert!(matches!(zero.validate(), Err(DbfError::InvalidWidth { .. })));

        let wide = Schema::new(vec![FieldSchema::new("a", FieldType::Character, 256, 0)]);
        assert!(matches!(wide.validate(), Err(DbfError::InvalidWidth { .. })));

        let short_date = Schema::new(vec![FieldSchema::new("d", FieldType::Date, 10, 0)]);
        assert!(matches!(
            short_date.validate(),
            Err(DbfError::InvalidFixedWidth { expected: 8, .. })
        ));
    }

    #[test]
    fn test_derive_schema_without_detection() {
        let config = DbfWriterConfig {
            auto_detect_types: false,
            ..DbfWriterConfig::default()
        };
        let columns = vec!["name".to_string(), "price".to_string()];
        let rows = vec![row(&[("name", "item"), ("price", "10.5")])];
        let schema = derive_schema(&columns, &rows, &config);
        for field in schema.fields() {
            assert_eq!(field.field_type, FieldType::Character);
            assert_eq!(field.width, 20);
        }
    }

    #[test]
    fn test_derive_schema_with_detection() {
        let config = DbfWriterConfig::default();
        let columns = vec![
            "title".to_string(),
            "price".to_string(),
            "day".to_string(),
        ];
        let rows = vec![row(&[
            ("title", "молоко"),
            ("price", "12,50"),
            ("day", "21.03.2024"),
        ])];
        let schema = derive_schema(&columns, &rows, &config);
        assert_eq!(schema.fields()[0].field_type, FieldType::Character);
        assert_eq!(schema.fields()[0].width, 6);
        assert_eq!(schema.fields()[1].field_type, FieldType::Numeric);
        assert_eq!(schema.fields()[1].decimals, 2);
        assert_eq!(schema.fields()[2].field_type, FieldType::Date);
        assert_eq!(schema.fields()[2].width, 8);
    }

    #[test]
    fn test_overrides_win_over_derivation() {
        let config = DbfWriterConfig {
            code_page: CodePage::Cp1251,
            ..DbfWriterConfig::default()
        };
        let columns = vec!["flag".to_string(), "note".to_string()];
        let rows = vec![row(&[("flag", "1"), ("note", "hi")])];
        let overrides = vec![
            FieldOverride {
                name: "flag".to_string(),
                field_type: Some(FieldType::Logical),
                ..FieldOverride::default()
            },
            FieldOverride {
                name: "note".to_string(),
                width: Some(40),
                ..FieldOverride::default()
            },
        ];
        let schema = derive_schema_with_overrides(&columns, &rows, &overrides, &config);
        // forced Logical picks up its fixed width
        assert_eq!(schema.fields()[0].field_type, FieldType::Logical);
        assert_eq!(schema.fields()[0].width, 1);
        // explicit width wins over the inferred one
        assert_eq!(schema.fields()[1].width, 40);
        assert_eq!(schema.fields()[1].field_type, FieldType::Character);
    }

    #[test]
    fn test_invalid_override_decimals_coerce_to_zero() {
        let base = FieldSchema::new("n", FieldType::Numeric, 10, 2);
        let negative = FieldOverride {
            name: "n".to_string(),
            decimals: Some(-3),
            ..FieldOverride::default()
        };
        assert_eq!(negative.apply(base.clone()).decimals, 0);

        let oversized = FieldOverride {
            name: "n".to_string(),
            decimals: Some(1000),
            ..FieldOverride::default()
        };
        assert_eq!(oversized.apply(base).decimals, 0);
    }
}
