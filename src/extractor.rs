//! Response Extractor
//!
//! Pulls the ORM XML fragment, entity name and table name out of free-text
//! model replies. The fragment boundaries are located by substring search; the
//! names are best-effort pattern matches over the raw reply with sentinel
//! defaults. Nothing here validates XML well-formedness.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::OrmError;
use crate::types::{DEFAULT_ENTITY_NAME, DEFAULT_TABLE_NAME, ExtractionResult};

static FENCE_OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*```xml\s*").expect("Failed to compile fence opener regex pattern")
});

static FENCE_CLOSER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```\s*\z").expect("Failed to compile fence closer regex pattern")
});

static ENTITY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"entity\s+name\s*=\s*"([^"]+)""#)
        .expect("Failed to compile entity name regex pattern")
});

static TABLE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"tableName\s*=\s*"([^"]+)""#).expect("Failed to compile tableName regex pattern")
});

const START_MARKERS: [&str; 3] = ["<orm", "<entities", "<"];

/// Closing markers in priority order. The matched marker decides how many
/// bytes past its index belong to the fragment.
const END_MARKERS: [&str; 3] = ["</orm>", "</entities>", ">"];

/// Extractor for ORM payloads embedded in model replies
#[derive(Clone, Debug, Default)]
pub struct ResponseExtractor;

impl ResponseExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Run all three extractions over the same reply
    pub fn extract(&self, reply: &str) -> Result<ExtractionResult, OrmError> {
        let orm_xml = self.extract_orm_xml(reply)?;
        let entity_name = self.extract_entity_name(reply);
        let table_name = self.extract_table_name(reply);

        crate::log_info!(
            "Extracted ORM fragment ({} bytes), entity: {}, table: {}",
            orm_xml.len(),
            entity_name,
            table_name
        );

        Ok(ExtractionResult {
            orm_xml,
            entity_name,
            table_name,
        })
    }

    /// Locate the XML fragment. This is the only mandatory extraction.
    pub fn extract_orm_xml(&self, reply: &str) -> Result<String, OrmError> {
        crate::log_debug!("Extracting ORM XML from response - {} chars", reply.len());

        let cleaned = self.strip_code_fence(reply);

        let Some(start) = START_MARKERS
            .iter()
            .find_map(|marker| cleaned.find(marker))
        else {
            crate::log_warn!(
                "Response contains no XML content: {}",
                cleaned.chars().take(200).collect::<String>()
            );
            return Err(OrmError::NoXmlContent);
        };

        let end = END_MARKERS
            .iter()
            .find_map(|marker| cleaned.rfind(marker).map(|index| (index, marker.len())));

        match end {
            Some((end_index, marker_len)) if end_index > start => {
                let fragment = &cleaned[start..end_index + marker_len];
                crate::log_debug!("Extracted XML fragment - {} chars", fragment.len());
                Ok(fragment.to_string())
            }
            _ => {
                let end_index = end.map(|(index, _)| index);
                crate::log_warn!(
                    "Response contains incomplete XML content, start: {}, end: {:?}",
                    start,
                    end_index
                );
                Err(OrmError::IncompleteXmlContent {
                    start,
                    end: end_index,
                })
            }
        }
    }

    /// Remove a markdown ```xml opener line and a trailing fence, then trim
    pub fn strip_code_fence(&self, reply: &str) -> String {
        let without_opener = FENCE_OPENER.replace_all(reply, "");
        let without_closer = FENCE_CLOSER.replace(&without_opener, "");
        without_closer.trim().to_string()
    }

    /// First `entity name="..."` value in the raw reply, or the sentinel default
    pub fn extract_entity_name(&self, reply: &str) -> String {
        first_capture(&ENTITY_NAME, reply).unwrap_or_else(|| {
            crate::log_warn!("No entity name found in response, using default value");
            DEFAULT_ENTITY_NAME.to_string()
        })
    }

    /// First `tableName="..."` value in the raw reply, or the sentinel default
    pub fn extract_table_name(&self, reply: &str) -> String {
        first_capture(&TABLE_NAME, reply).unwrap_or_else(|| {
            crate::log_warn!("No table name found in response, using default value");
            DEFAULT_TABLE_NAME.to_string()
        })
    }
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_angle_bracket_includes_only_one_byte() {
        let extractor = ResponseExtractor::new();
        let xml = extractor
            .extract_orm_xml("prefix <table id=\"1\"/> suffix")
            .expect("fragment");
        assert_eq!(xml, "<table id=\"1\"/>");
    }

    #[test]
    fn test_end_before_start_is_incomplete() {
        let extractor = ResponseExtractor::new();
        let err = extractor
            .extract_orm_xml("a > b <orm")
            .expect_err("should fail");
        assert!(matches!(
            err,
            OrmError::IncompleteXmlContent {
                start: 6,
                end: Some(2)
            }
        ));
    }

    #[test]
    fn test_fence_opener_is_case_sensitive() {
        let extractor = ResponseExtractor::new();
        assert_eq!(
            extractor.strip_code_fence("```XML\n<orm/>\n```"),
            "```XML\n<orm/>"
        );
        assert_eq!(extractor.strip_code_fence("```xml\n<orm/>\n```"), "<orm/>");
    }

    #[test]
    fn test_strip_code_fence() {
        let extractor = ResponseExtractor::new();
        assert_eq!(
            extractor.strip_code_fence("```xml\n<orm></orm>\n```\n"),
            "<orm></orm>"
        );
        assert_eq!(extractor.strip_code_fence("  <orm/>  "), "<orm/>");
    }
}
