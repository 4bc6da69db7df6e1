use std::io::{self, BufRead, Write};

use clap::{Args, Subcommand};

use crate::config::{AppConfig, StoredConfig, config_directory, config_file_path};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration and the effective values.
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring helpdesk CLI.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!();

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();

    let fields: [(&str, &mut Option<String>); 4] = [
        ("Ticket service URL (e.g., http://localhost:8888)", &mut cfg.base_url),
        (
            "Default category (general/hardware/email/transfer)",
            &mut cfg.default_category,
        ),
        ("Request timeout in seconds", &mut cfg.timeout_secs),
        ("Cache lifetime in seconds (0 disables)", &mut cfg.cache_ttl_secs),
    ];
    for (field, target) in fields {
        apply_prompt(field, target, &mut input, &mut stdout)?;
    }

    // Refuse to save something `load` would reject later.
    AppConfig::resolve(cfg.clone(), config_directory()?, |_| None)?;
    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;
    let effective = AppConfig::load()?;

    println!("Configuration file: {}", path.display());
    println!(
        "Ticket service URL: {} (effective: {})",
        display_value(&cfg.base_url),
        effective.base_url
    );
    println!("Default category: {}", display_value(&cfg.default_category));
    println!("Request timeout: {}s", effective.request_timeout.as_secs());
    println!("Cache lifetime: {}s", effective.cache_ttl.as_secs());

    Ok(())
}

fn apply_prompt(
    field: &str,
    target: &mut Option<String>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> AppResult<()> {
    match prompt(field, target.as_deref(), input, output)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn prompt(
    field: &str,
    current: Option<&str>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> AppResult<PromptAction> {
    match current {
        Some(value) => write!(output, "{field} [{value}] (Enter to keep, '-' to clear): ")?,
        None => write!(output, "{field} (Enter to skip): ")?,
    }
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let trimmed = line.trim();

    if trimmed.is_empty() {
        Ok(PromptAction::Keep)
    } else if trimmed == "-" {
        Ok(PromptAction::Clear)
    } else {
        Ok(PromptAction::Set(trimmed.to_string()))
    }
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

enum PromptAction {
    Keep,
    Clear,
    Set(String),
}
