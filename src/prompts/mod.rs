//! Prompt templates and prompt assembly.
//!
//! Templates live in the `prompts` namespace. Built-in templates are embedded
//! in the binary; a configured directory of `<name>.md` files replaces them
//! wholesale.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::OrmError;

/// Name of the ORM generation template
pub const ORM_TEMPLATE: &str = "orm";

/// Label placed between the template and the uploaded content
pub const INPUT_LABEL: &str = "Input configuration:";

/// The embedded ORM generation template
const ORM_TEMPLATE_MD: &str = include_str!("orm.md");

/// Resolves template names to template text
#[derive(Debug, Clone, Default)]
pub struct PromptLibrary {
    directory: Option<PathBuf>,
}

impl PromptLibrary {
    /// Library backed by the embedded templates only
    pub fn builtin() -> Self {
        Self { directory: None }
    }

    /// Library backed by `<directory>/<name>.md` files
    pub fn with_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
        }
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Logical resource path for a template name
    pub fn resource_path(name: &str) -> String {
        format!("prompts/{name}.md")
    }

    /// Load a template by name. Absent or blank templates are an error.
    pub fn load_template(&self, name: &str) -> Result<String, OrmError> {
        let template = match &self.directory {
            Some(directory) => {
                let path = directory.join(format!("{name}.md"));
                crate::log_debug!("Loading prompt template from {}", path.display());
                fs::read_to_string(&path).map_err(|e| OrmError::ConfigurationMissing {
                    name: Self::resource_path(name),
                    detail: format!("failed to read {}: {e}", path.display()),
                })?
            }
            None => builtin_template(name)
                .ok_or_else(|| OrmError::ConfigurationMissing {
                    name: Self::resource_path(name),
                    detail: "no built-in template with this name".to_string(),
                })?
                .to_string(),
        };

        if template.trim().is_empty() {
            return Err(OrmError::ConfigurationMissing {
                name: Self::resource_path(name),
                detail: "template is empty".to_string(),
            });
        }

        Ok(template)
    }
}

fn builtin_template(name: &str) -> Option<&'static str> {
    match name {
        ORM_TEMPLATE => Some(ORM_TEMPLATE_MD),
        _ => None,
    }
}

/// Join a template and the uploaded content into one prompt
pub fn assemble(template: &str, uploaded_content: &str) -> String {
    format!("{template}\n\n{INPUT_LABEL}\n{uploaded_content}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_layout() {
        assert_eq!(
            assemble("TEMPLATE", "{\"a\":1}"),
            "TEMPLATE\n\nInput configuration:\n{\"a\":1}"
        );
    }

    #[test]
    fn test_builtin_orm_template_is_present() {
        let template = PromptLibrary::builtin()
            .load_template(ORM_TEMPLATE)
            .expect("builtin ORM template should load");
        assert!(template.contains("<orm>"));
    }

    #[test]
    fn test_unknown_builtin_is_configuration_missing() {
        let err = PromptLibrary::builtin()
            .load_template("nope")
            .expect_err("unknown template");
        assert!(matches!(err, OrmError::ConfigurationMissing { ref name, .. } if name == "prompts/nope.md"));
    }
}
