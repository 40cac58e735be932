//! CLI module for DocQA
//!
//! Command-line parsing for the `docqa-server` binary. Running without a
//! subcommand starts the HTTP server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DocQA - chat with a web page or PDF
#[derive(Parser, Debug)]
#[command(
    name = "docqa-server",
    version,
    about = "DocQA - chat with a web page or PDF",
    long_about = "Indexes a URL or uploaded PDF with Gemini embeddings and answers questions\n\
                  about it over HTTP.\n\n\
                  Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  docqa-server                      # Start with ./docqa.toml\n    \
                  docqa-server --port 9000          # Override the listen port\n    \
                  docqa-server config --validate    # Check the configuration and exit"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "docqa.toml", global = true, env = "DOCQA_CONFIG")]
    pub config: PathBuf,

    /// Override `server.host`
    #[arg(long)]
    pub host: Option<String>,

    /// Override `server.port`
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log at debug level regardless of `server.log_level`
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the effective configuration
    Config {
        /// Also validate it, including the API key environment variable
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
