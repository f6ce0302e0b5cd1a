use crate::config::{Config, ConfigUpdate};
use crate::providers::{Provider, ProviderConfig};
use crate::ui;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

/// Apply configuration changes from the command line, save, and print the result
pub fn handle_config_command(
    config: &mut Config,
    config_path: &Path,
    changes: ConfigUpdate,
) -> Result<()> {
    if config.update(changes)? {
        config.save_to(config_path)?;
        ui::print_success(&format!("Configuration saved to {}", config_path.display()));
    }

    print_configuration(config);
    Ok(())
}

/// Print the supported providers and their defaults
pub fn handle_list_providers(config: &Config) {
    let active = config.active_provider().ok().flatten();

    println!("{}", "Supported providers".bold());
    for provider in Provider::ALL {
        let marker = if Some(*provider) == active {
            "●".green().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {:<8} model: {:<14} key: {}",
            marker,
            provider.name().bold(),
            provider.default_model(),
            provider.api_key_env().dimmed()
        );
    }
}

fn print_configuration(config: &Config) {
    println!("{}", "Current configuration".bold());

    match config.active_provider() {
        Ok(Some(provider)) => {
            let provider_config = config
                .get_provider_config(provider)
                .cloned()
                .unwrap_or_else(|| ProviderConfig::with_defaults(provider));
            let api_key = provider_config.resolve_api_key(provider);

            ui::print_field("Active provider", provider.display_name());
            ui::print_field("Model", provider_config.effective_model(provider));
            ui::print_field("Base URL", provider_config.effective_base_url(provider));
            ui::print_field(
                "Timeout",
                &format!("{}s", provider_config.effective_timeout_seconds()),
            );
            ui::print_field(
                &format!("API key ({})", provider.api_key_env()),
                &ui::mask_secret(&api_key),
            );
        }
        Ok(None) => ui::print_field("Active provider", "(none)"),
        Err(e) => ui::print_field("Active provider", &format!("invalid: {e}")),
    }

    ui::print_field(
        "Max upload size",
        &config
            .pipeline
            .max_upload_bytes
            .map_or_else(|| "unlimited".to_string(), |limit| format!("{limit} bytes")),
    );
    ui::print_field(
        "Prompts",
        &config
            .pipeline
            .prompts_dir
            .as_ref()
            .map_or_else(|| "built-in".to_string(), |dir| dir.display().to_string()),
    );
}
