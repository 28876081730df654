use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// regwizard - drive the registration wizard from the command line
#[derive(Parser, Debug)]
#[command(name = "regwizard")]
#[command(about = "Multi-step registration wizard with resumable drafts")]
#[command(version)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for persisted drafts (overrides the configuration file)
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Storage key for the draft (overrides the configuration file)
    #[arg(long, global = true)]
    pub storage_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the wizard steps
    Steps,
    /// Validate a JSON file of working values against one step
    Check {
        /// Step number (1-based)
        #[arg(short, long)]
        step: usize,
        /// JSON object of field values
        values: PathBuf,
    },
    /// Score a password read from stdin
    ///
    /// The password is read from stdin so it never shows up in the process
    /// list or shell history.
    Strength,
    /// Inspect or delete the persisted draft
    Draft {
        #[command(subcommand)]
        action: DraftCommands,
    },
    /// Run the whole wizard from a JSON array of per-step working values
    Run {
        /// JSON file: `[ {step 1 values}, {step 2 values}, {step 3 values} ]`
        script: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum DraftCommands {
    /// Print the persisted draft with secrets masked
    Show,
    /// Delete the persisted draft
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
