//! Single-byte code-page transcoding.
//!
//! DBF text is stored in a legacy single-byte encoding, one byte per
//! character. The supported pages are Windows-1251 and DOS 866; the tables
//! come from `encoding_rs`, but the per-character loop is driven here so
//! that an unmappable character degrades to a single fallback byte instead
//! of the HTML escape `encoding_rs` would emit.

use std::fmt;
use std::str::FromStr;

use encoding_rs::{Encoding, IBM866, WINDOWS_1251};
use serde::{Deserialize, Serialize};

/// Byte written in place of a character the target code page cannot map
pub const FALLBACK_BYTE: u8 = b' ';

/// Single-byte code pages the writer can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodePage {
    /// Windows-1251 (Cyrillic)
    #[serde(rename = "cp1251")]
    Cp1251,
    /// DOS code page 866 (Cyrillic)
    #[serde(rename = "cp866")]
    Cp866,
}

impl CodePage {
    /// The `encoding_rs` table backing this code page
    #[must_use]
    pub fn encoding(self) -> &'static Encoding {
        match self {
            CodePage::Cp1251 => WINDOWS_1251,
            CodePage::Cp866 => IBM866,
        }
    }

    /// DBF language-driver byte stored at header offset 29
    #[must_use]
    pub const fn language_driver(self) -> u8 {
        match self {
            CodePage::Cp1251 => 0xC9,
            CodePage::Cp866 => 0x65,
        }
    }
}

impl fmt::Display for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodePage::Cp1251 => write!(f, "CP1251"),
            CodePage::Cp866 => write!(f, "CP866"),
        }
    }
}

impl FromStr for CodePage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cp1251" | "windows-1251" | "1251" => Ok(CodePage::Cp1251),
            "cp866" | "ibm866" | "866" => Ok(CodePage::Cp866),
            other => Err(format!("unsupported code page '{other}'")),
        }
    }
}

/// Transcode text into the code page, exactly one byte per character.
///
/// A character without a mapping in the page becomes `FALLBACK_BYTE`, so the
/// output length always equals the input character count and a single odd
/// character can never abort or resize a record. Pure and total.
#[must_use]
pub fn transcode(text: &str, code_page: CodePage) -> Vec<u8> {
    let encoding = code_page.encoding();
    let mut bytes = Vec::with_capacity(text.len());
    let mut utf8 = [0u8; 4];
    for ch in text.chars() {
        let (encoded, _, had_errors) = encoding.encode(ch.encode_utf8(&mut utf8));
        if had_errors {
            bytes.push(FALLBACK_BYTE);
        } else {
            bytes.extend_from_slice(&encoded);
        }
    }
    bytes
}
