//! Configuration for the `DbfWriter`.

use serde::{Deserialize, Serialize};

use crate::encoding::CodePage;

/// Configuration for the `DbfWriter`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbfWriterConfig {
    /// Target single-byte code page for cell text and field names
    pub code_page: CodePage,
    /// Infer field types from the first row instead of using the
    /// Character/20 default for every unspecified column
    pub auto_detect_types: bool,
    /// Suggested name for the produced file; the storage collaborator
    /// decides where (and whether) the buffer is persisted
    pub file_name: String,
}

impl Default for DbfWriterConfig {
    fn default() -> Self {
        Self {
            code_page: CodePage::Cp1251,
            auto_detect_types: true,
            file_name: "output.dbf".to_string(),
        }
    }
}
