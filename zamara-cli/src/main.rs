//! Zamara CLI - Command-line tool for StarCraft II replays and MPQ archives
//!
//! The binary is named `zamara-cli` to avoid conflicts with the `zamara` library crate.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use serde::{Deserialize, Serialize};
use std::io;
use std::sync::OnceLock;

mod commands;
mod config;
mod output;

// Global context for commands to access
pub static GLOBAL_OPTS: OnceLock<GlobalOptions> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub output: OutputFormat,
    pub verbose: u8,
    pub quiet: bool,
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "zamara-cli",
    about = "Command-line tool for inspecting StarCraft II replays",
    long_about = None,
    after_help = "EXAMPLES:
    # Summarize a replay
    zamara-cli replay game.SC2Replay

    # List files in the replay archive
    zamara-cli list game.SC2Replay

    # Extract all files
    zamara-cli extract game.SC2Replay -t extracted/

    # Extract a single file
    zamara-cli extract game.SC2Replay -f replay.details

    # Show the hash values of a file name
    zamara-cli hash replay.details --all

    # Generate shell completions
    zamara-cli completion bash > ~/.bash_completion.d/zamara-cli.bash
    zamara-cli completion zsh > ~/.zsh/completions/_zamara-cli

CONFIGURATION:
    Defaults are read from ~/.config/zamara-cli/config.toml:

        output = \"json\"
        extract_dir = \"replays/extracted\""
)]
#[command(version)]
struct Cli {
    /// Output format
    #[arg(global = true, short = 'o', long, value_enum)]
    output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(global = true, short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(global = true, short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,

    /// Disable colored output
    #[arg(global = true, long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show archive and user data headers
    Info {
        /// Path to the MPQ archive
        archive: String,
    },
    /// Display hash and block table contents
    Tables {
        /// Path to the MPQ archive
        archive: String,
        /// Only show one table
        #[arg(short = 't', long, value_enum)]
        table_type: Option<TableType>,
    },
    /// List files in an archive
    List {
        /// Path to the MPQ archive
        archive: String,
    },
    /// Extract files from an archive
    Extract {
        /// Path to the MPQ archive
        archive: String,
        /// Target directory
        #[arg(short, long)]
        target: Option<String>,
        /// Specific file to extract (if not specified, extracts all)
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Summarize a replay's game settings and players
    Replay {
        /// Path to the replay file
        replay: String,
    },
    /// Generate hash values for a file name
    Hash {
        /// File name to hash
        filename: String,
        /// Also show the cipher key hashes
        #[arg(short, long)]
        all: bool,
    },
    /// Generate shell completion scripts
    #[command(about = "Generate completion scripts for your shell")]
    Completion {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum TableType {
    Hash,
    Block,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(None)?;
    let output = cli.output.or(config.output).unwrap_or(OutputFormat::Text);

    // Set up colored output based on flags
    if cli.no_color || output != OutputFormat::Text {
        colored::control::set_override(false);
    }

    // Configure logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Store global options for commands to access
    let global_opts = GlobalOptions {
        output,
        verbose: cli.verbose,
        quiet: cli.quiet,
        no_color: cli.no_color,
    };

    GLOBAL_OPTS
        .set(global_opts)
        .map_err(|_| anyhow::anyhow!("Global options already set"))?;

    match cli.command {
        Commands::Info { archive } => {
            commands::info::info(&archive)?;
        }
        Commands::Tables {
            archive,
            table_type,
        } => {
            commands::tables::tables(&archive, table_type)?;
        }
        Commands::List { archive } => {
            commands::list::list(&archive)?;
        }
        Commands::Extract {
            archive,
            target,
            file,
        } => {
            let target = target
                .or(config.extract_dir)
                .unwrap_or_else(|| ".".to_string());
            commands::extract::extract(&archive, &target, file.as_deref())?;
        }
        Commands::Replay { replay } => {
            commands::replay::replay(&replay)?;
        }
        Commands::Hash { filename, all } => {
            commands::hash::hash(&filename, all)?;
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }

    Ok(())
}
