use crate::commands;
use crate::config::{Config, ConfigUpdate};
use crate::error::OrmError;
use crate::log_debug;
use crate::pipeline::OrmPipeline;
use crate::providers::Provider;
use crate::types::UploadedDocument;
use crate::ui;
use anyhow::{Context, Result};
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

const LOG_FILE: &str = "orm-forge-debug.log";

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "orm-forge: generate ORM entity XML from configuration files with AI",
    long_about = "orm-forge sends a configuration document to an AI model together with an ORM design prompt and extracts the entity XML, entity name and table name from the reply.",
    disable_version_flag = true,
    after_help = get_dynamic_help(),
    styles = get_styles(),
)]
pub struct Cli {
    /// Subcommands available for the CLI
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log debug messages to a file
    #[arg(
        short = 'l',
        long = "log",
        global = true,
        help = "Log debug messages to a file"
    )]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(
        long = "log-file",
        global = true,
        help = "Specify a custom log file path"
    )]
    pub log_file: Option<String>,

    /// Suppress non-essential output (spinners, status lines)
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress non-essential output"
    )]
    pub quiet: bool,

    /// Use a configuration file other than the default one
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        help = "Path to the configuration file"
    )]
    pub config: Option<PathBuf>,

    /// Display the version
    #[arg(
        short = 'v',
        long = "version",
        global = true,
        help = "Display the version"
    )]
    pub version: bool,
}

/// Enumeration of available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate ORM XML from a configuration file
    #[command(
        about = "Generate ORM XML from a configuration file using AI",
        long_about = "Send the configuration file to the active AI provider and print the extracted ORM fragment, entity name and table name as JSON."
    )]
    Generate {
        /// Configuration file to convert
        #[arg(help = "Configuration file to convert")]
        file: PathBuf,

        /// Override the active provider for this run
        #[arg(long, help = "Override the active provider for this run", value_parser = provider_parser)]
        provider: Option<Provider>,

        /// Write the output to a file instead of stdout
        #[arg(short, long, help = "Write the output to a file instead of stdout")]
        output: Option<PathBuf>,

        /// Print only the ORM XML fragment
        #[arg(long, help = "Print only the ORM XML fragment")]
        xml_only: bool,
    },

    /// Configure providers and pipeline limits
    #[command(about = "Configure providers and pipeline limits")]
    Config {
        /// Set the active provider
        #[arg(long, help = "Set the active provider", value_parser = provider_parser)]
        provider: Option<Provider>,

        /// Set the API key for the active provider
        #[arg(long, help = "Set the API key for the active provider")]
        api_key: Option<String>,

        /// Set the model for the active provider
        #[arg(long, help = "Set the model for the active provider")]
        model: Option<String>,

        /// Set the API base URL for the active provider
        #[arg(long, help = "Set the API base URL for the active provider")]
        base_url: Option<String>,

        /// Set the request timeout in seconds for the active provider
        #[arg(long, help = "Set the request timeout in seconds")]
        timeout_seconds: Option<u64>,

        /// Reject uploads larger than this many bytes
        #[arg(long, help = "Reject uploads larger than this many bytes")]
        max_upload_bytes: Option<usize>,

        /// Directory of prompt templates replacing the built-in ones
        #[arg(long, help = "Directory of <name>.md prompt templates")]
        prompts_dir: Option<PathBuf>,
    },

    /// List supported providers
    #[command(about = "List supported AI providers")]
    ListProviders,
}

fn provider_parser(s: &str) -> Result<Provider, String> {
    s.parse::<Provider>().map_err(|e| e.to_string())
}

/// Define custom styles for Clap
fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Help footer listing the supported providers
fn get_dynamic_help() -> String {
    let providers_list = Provider::all_names()
        .iter()
        .map(|p| format!("{}", p.bold()))
        .collect::<Vec<_>>()
        .join(" • ");

    format!("\nAvailable AI Providers: {providers_list}")
}

/// Main function to parse arguments and handle the command
pub async fn main() -> Result<()> {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return Ok(());
    }

    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    if cli.log {
        if let Err(e) = crate::logger::init() {
            ui::print_warning(&format!("Logging unavailable: {e}"));
        }
        crate::logger::enable_logging();
        crate::logger::set_log_file(cli.log_file.as_deref().unwrap_or(LOG_FILE))?;
    } else {
        crate::logger::disable_logging();
    }

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::get_config_path()?,
    };
    let config = Config::load_from(&config_path)?;
    crate::logger::set_verbose_logging(config.performance.verbose_logging);

    if let Some(command) = cli.command {
        handle_command(command, config, &config_path).await
    } else {
        let _ = Cli::parse_from(["orm-forge", "--help"]);
        Ok(())
    }
}

/// Dispatch a parsed subcommand
pub async fn handle_command(command: Commands, config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Generate {
            file,
            provider,
            output,
            xml_only,
        } => handle_generate(config, &file, provider, output.as_deref(), xml_only).await,
        Commands::Config {
            provider,
            api_key,
            model,
            base_url,
            timeout_seconds,
            max_upload_bytes,
            prompts_dir,
        } => {
            let mut config = config;
            commands::handle_config_command(
                &mut config,
                config_path,
                ConfigUpdate {
                    provider,
                    api_key,
                    model,
                    base_url,
                    timeout_seconds,
                    max_upload_bytes,
                    prompts_dir,
                },
            )
        }
        Commands::ListProviders => {
            commands::handle_list_providers(&config);
            Ok(())
        }
    }
}

async fn handle_generate(
    mut config: Config,
    file: &Path,
    provider: Option<Provider>,
    output: Option<&Path>,
    xml_only: bool,
) -> Result<()> {
    if let Some(provider) = provider {
        log_debug!("Overriding active provider with {}", provider);
        config.set_active_provider(provider);
    }

    let pipeline = OrmPipeline::from_config(&config)?;
    let content =
        fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let document = UploadedDocument::new(content).with_file_name(file.display().to_string());

    let spinner = ui::create_spinner(&format!(
        "Generating ORM with {}...",
        pipeline.provider_name().unwrap_or("AI")
    ));
    let outcome = pipeline.run(&document).await;
    spinner.finish_and_clear();
    if let Err(e) = &outcome {
        print_failure_hint(e);
    }
    let result = outcome?;

    if result.has_default_entity_name() {
        ui::print_warning("No entity name found in the AI response, using the default");
    }
    if result.has_default_table_name() {
        ui::print_warning("No table name found in the AI response, using the default");
    }

    let rendered = if xml_only {
        result.orm_xml.clone()
    } else {
        serde_json::to_string_pretty(&result)?
    };

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            ui::print_success(&format!(
                "Wrote entity {} ({}) to {}",
                result.entity_name,
                result.table_name,
                path.display()
            ));
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn print_failure_hint(error: &OrmError) {
    match error {
        OrmError::ProviderUnavailable => {
            ui::print_info("Choose a provider with 'orm-forge config --provider <name>'.");
        }
        OrmError::ProviderMisconfigured { api_key_env, .. } => {
            ui::print_info(&format!(
                "Set an API key with 'orm-forge config --api-key <key>' or export {api_key_env}."
            ));
        }
        e if e.is_provider_failure() => {
            ui::print_info("Run 'orm-forge config' to review the provider settings.");
        }
        _ => {}
    }
}
