use anyhow::Result;
use colored::Colorize;

use crate::{
    app::{get_config_dir, init_config, Config},
    models::ProviderFactory,
    session::ChatMode,
};

use super::Commands;

/// Handle the informational subcommands
pub async fn handle_command(command: &Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Init => {
            println!("Initializing Parley configuration...");
            match init_config()? {
                Some(path) => println!("Created default configuration at: {}", path.display()),
                None => println!("Configuration already exists, leaving it untouched."),
            }
            Ok(())
        }
        Commands::Version => {
            show_version();
            Ok(())
        }
        Commands::Status => show_status(config).await,
        Commands::Serve { .. } | Commands::Ask { .. } => {
            anyhow::bail!("{:?} is handled by the orchestrator", command)
        }
    }
}

/// Show version information
pub fn show_version() {
    println!("Parley v{}", env!("CARGO_PKG_VERSION"));
    println!("   Mode-aware voice and text assistant backend");
}

/// Show configuration and provider status
async fn show_status(config: &Config) -> Result<()> {
    println!("Parley Status:");
    println!();

    let config_path = get_config_dir()?.join("config.toml");
    if config_path.exists() {
        println!("  [OK] Configuration: {}", config_path.display());
    } else {
        println!("  [WARNING] Configuration: Not found (using defaults)");
    }

    if config.groq.api_key().is_some() {
        println!("  [OK] {}: Set", config.groq.api_key_env);
        match ProviderFactory::validate(config).await {
            Ok(true) => println!("  [OK] Groq API: {}", "reachable".green()),
            Ok(false) => println!("  [ERROR] Groq API: {}", "unreachable".red()),
            Err(e) => println!("  [ERROR] Groq API: {}", e.to_string().red()),
        }
    } else {
        println!("  [ERROR] {}: Not set", config.groq.api_key_env);
    }

    println!("\n  Models:");
    println!("    • chat: {}", config.groq.chat_model);
    println!("    • transcription: {}", config.groq.whisper_model);

    println!("\n  Modes:");
    for mode in ChatMode::ALL {
        let marker = if config.prompts.contains_key(mode.as_str()) {
            "prompt configured".normal()
        } else {
            "general fallback".yellow()
        };
        println!("    • {} ({}): {}", mode, mode.display_name(), marker);
    }

    println!(
        "\n  History window: {} messages",
        config.generation.max_history_messages
    );
    match config.generation.max_stored_messages {
        Some(max) => println!("  Stored history cap: {} messages", max),
        None => println!("  Stored history cap: unbounded"),
    }
    println!("  Audio directory: {}", config.speech.audio_dir.display());

    println!();
    Ok(())
}
