//! Interactive first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, Write};

/// Walk through API key, storage, and config file setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Lese Setup");
    println!();

    // API access
    if std::env::var("OPENAI_API_KEY").is_ok() {
        Output::success("OPENAI_API_KEY is set.");
    } else {
        Output::warning("OPENAI_API_KEY is not set.");
        println!();
        println!("  Lese needs an OpenAI API key for embeddings and answer generation.");
        println!(
            "  Create one at {}",
            style("https://platform.openai.com/api-keys").underlined()
        );
        println!("  and export it in your shell profile:");
        println!();
        println!("    {}", style("export OPENAI_API_KEY=sk-...").green());
        println!();

        if !confirm("Continue without an API key?")? {
            Output::info("Setup stopped. Run 'lese init' again once the key is set.");
            return Ok(());
        }
    }

    println!();

    // Storage
    let data_dir = settings.data_dir();
    if data_dir.exists() {
        Output::info(&format!("Data directory: {}", data_dir.display()));
    } else {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory {}", data_dir.display()));
    }

    Output::kv("Storage provider", &settings.storage.provider);
    if settings.storage.provider == "sqlite" {
        Output::kv("Database", &settings.sqlite_path().display().to_string());
    }

    println!();

    // Config file
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file: {}", config_path.display()));
    } else if confirm("Write the default config file?")? {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        settings.save_to(&config_path)?;
        Output::success(&format!("Wrote {}", config_path.display()));
    } else {
        Output::info("Skipped config file creation; defaults apply.");
    }

    println!();
    println!("{}", style("Setup complete.").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Start the API server", style("lese serve").cyan());
    println!("  {} Review the configuration", style("lese config show").cyan());

    Ok(())
}

/// Ask a yes/no question, defaulting to no.
fn confirm(message: &str) -> io::Result<bool> {
    print!("{} {} {} ", style("?").cyan(), message, style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_lowercase();

    Ok(answer == "y" || answer == "yes")
}
