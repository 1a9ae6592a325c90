use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::session::ChatMode;

#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(version)]
#[command(about = "Mode-aware voice and text assistant backend", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "PARLEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Send one prompt and print the reply
    Ask {
        /// Prompt text
        text: String,
        /// Conversation mode
        #[arg(short, long, value_parser = parse_mode)]
        mode: Option<ChatMode>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output_format: OutputFormat,
    },
    /// Initialize configuration
    Init,
    /// Check configuration and provider status
    Status,
    /// Show version information
    Version,
}

fn parse_mode(s: &str) -> Result<ChatMode, String> {
    s.parse::<ChatMode>().map_err(|e| e.to_string())
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
    /// Markdown formatted output
    Markdown,
}
