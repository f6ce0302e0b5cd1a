//! ORM generation pipeline
//!
//! Wires prompt loading, the completion service and the response extractor
//! into one all-or-nothing operation per uploaded document.

use std::sync::Arc;

use crate::config::Config;
use crate::error::OrmError;
use crate::extractor::ResponseExtractor;
use crate::llm::{CompletionService, select_service};
use crate::prompts::{ORM_TEMPLATE, PromptLibrary, assemble};
use crate::types::{ExtractionResult, UploadedDocument};
use crate::{log_debug, log_info, log_warn};

/// Orchestrates a single upload → prompt → completion → extraction run
///
/// The completion service is optional: deployments without an active
/// provider still construct a pipeline, and every run fails with
/// [`OrmError::ProviderUnavailable`] before any network call.
pub struct OrmPipeline {
    service: Option<Arc<dyn CompletionService>>,
    prompts: PromptLibrary,
    extractor: ResponseExtractor,
    max_upload_bytes: Option<usize>,
}

impl OrmPipeline {
    pub fn new(service: Option<Arc<dyn CompletionService>>, prompts: PromptLibrary) -> Self {
        Self {
            service,
            prompts,
            extractor: ResponseExtractor::new(),
            max_upload_bytes: None,
        }
    }

    /// Build the pipeline from configuration, resolving the active provider once
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let service = select_service(config)?;
        let prompts = config
            .pipeline
            .prompts_dir
            .as_ref()
            .map_or_else(PromptLibrary::builtin, |dir| PromptLibrary::with_directory(dir.clone()));

        Ok(Self::new(service, prompts).with_max_upload_bytes(config.pipeline.max_upload_bytes))
    }

    pub fn with_max_upload_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    /// Name of the configured provider, if any
    pub fn provider_name(&self) -> Option<&str> {
        self.service.as_deref().map(|service| service.provider_name())
    }

    /// Generate the ORM description for one uploaded document
    #[tracing::instrument(name = "orm_generation", skip_all, fields(bytes = document.len()))]
    pub async fn run(&self, document: &UploadedDocument) -> Result<ExtractionResult, OrmError> {
        if document.is_empty() {
            return Err(OrmError::EmptyInput);
        }

        if let Some(limit) = self.max_upload_bytes
            && document.len() > limit
        {
            log_warn!(
                "Rejecting upload of {} bytes, limit is {} bytes",
                document.len(),
                limit
            );
            return Err(OrmError::UploadTooLarge {
                size: document.len(),
                limit,
            });
        }

        let Some(service) = self.service.as_deref() else {
            return Err(OrmError::ProviderUnavailable);
        };

        let content = document.text();
        log_info!(
            "Starting ORM generation for {}, size: {} bytes",
            document.file_name.as_deref().unwrap_or("upload"),
            document.len()
        );

        let template = self.prompts.load_template(ORM_TEMPLATE)?;
        let prompt = assemble(&template, &content);
        log_debug!(
            "Assembled prompt - {} chars, preview: {}",
            prompt.len(),
            prompt.chars().take(200).collect::<String>()
        );

        let reply = service.complete(&prompt).await?;
        log_debug!(
            "Received reply from {} - {} chars",
            service.provider_name(),
            reply.len()
        );

        let result = self.extractor.extract(&reply)?;
        log_info!(
            "ORM generation completed, entity: {}, table: {}",
            result.entity_name,
            result.table_name
        );
        Ok(result)
    }
}
