//! Data carried through a single pipeline run.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Entity name used when the reply carries no `entity name="..."` attribute
pub const DEFAULT_ENTITY_NAME: &str = "app.module.Entity";

/// Table name used when the reply carries no `tableName="..."` attribute
pub const DEFAULT_TABLE_NAME: &str = "entity_table";

/// An uploaded configuration file. Content is always decoded as UTF-8.
#[derive(Debug, Clone, Default)]
pub struct UploadedDocument {
    /// Original file name, if the caller knows it
    pub file_name: Option<String>,
    /// Raw bytes as received
    pub content: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: None,
            content: content.into(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Decode the content as UTF-8, replacing invalid sequences
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Structured ORM description pulled out of a model reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub orm_xml: String,
    pub entity_name: String,
    pub table_name: String,
}

impl ExtractionResult {
    /// True when the entity name fell back to the sentinel default
    pub fn has_default_entity_name(&self) -> bool {
        self.entity_name == DEFAULT_ENTITY_NAME
    }

    /// True when the table name fell back to the sentinel default
    pub fn has_default_table_name(&self) -> bool {
        self.table_name == DEFAULT_TABLE_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lossy_decoding() {
        let doc = UploadedDocument::new(vec![b'a', 0xff, b'b']);
        assert_eq!(doc.text(), "a\u{fffd}b");
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = ExtractionResult {
            orm_xml: "<orm/>".to_string(),
            entity_name: "User".to_string(),
            table_name: "users".to_string(),
        };
        let json = serde_json::to_value(&result).expect("serialize result");
        assert_eq!(json["ormXml"], "<orm/>");
        assert_eq!(json["entityName"], "User");
        assert_eq!(json["tableName"], "users");
    }
}
