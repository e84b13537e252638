//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(&settings),
        ConfigAction::Edit => edit_config(&settings),
        ConfigAction::Path => {
            println!("{}", Settings::default_config_path().display());
            Ok(())
        }
    }
}

/// Print the effective configuration as TOML.
fn show_config(settings: &Settings) -> Result<()> {
    let path = Settings::default_config_path();
    if !path.exists() {
        Output::info(&format!(
            "No config file at {}; showing built-in defaults.",
            path.display()
        ));
        println!();
    }

    let rendered = toml::to_string_pretty(settings)
        .map_err(|e| anyhow::anyhow!("Failed to render config: {}", e))?;
    print!("{}", rendered);
    Ok(())
}

/// Open the config file in the user's editor, creating it first if needed.
fn edit_config(settings: &Settings) -> Result<()> {
    let path = Settings::default_config_path();
    if !path.exists() {
        settings.save()?;
        Output::info(&format!("Wrote default config to {}", path.display()));
    }

    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());

    match std::process::Command::new(&editor).arg(&path).status() {
        Ok(status) if status.success() => Output::success("Config updated."),
        Ok(_) => Output::warning("Editor exited with a non-zero status."),
        Err(e) => {
            Output::error(&format!("Could not launch {}: {}", editor, e));
            Output::info(&format!("Edit the file directly: {}", path.display()));
        }
    }

    Ok(())
}
