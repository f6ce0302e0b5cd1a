//! orm-forge - AI-assisted ORM entity generation
//!
//! Sends an uploaded configuration document, wrapped in an ORM design prompt,
//! to a chat-completion model and extracts the entity XML, entity name and
//! table name from the free-text reply.

#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod llm_providers;
pub mod logger;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod types;
pub mod ui;

pub use config::Config;
pub use error::OrmError;
pub use extractor::ResponseExtractor;
pub use llm::CompletionService;
pub use pipeline::OrmPipeline;
pub use providers::{Provider, ProviderConfig};
pub use types::{ExtractionResult, UploadedDocument};
