//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Delegate translation jobs to a remote Murasaki server.
///
/// The server address and key fall back to MURASAKI_SERVER_URL,
/// MURASAKI_API_KEY, and MURASAKI_TIMEOUT_MS when not given as flags.
#[derive(Parser, Debug)]
#[command(name = "murasaki-remote")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Server base address, e.g. http://gpu-box:8000
    #[arg(short = 's', long, global = true)]
    pub server: Option<String>,

    /// Bearer credential for the server
    #[arg(short = 'k', long, global = true)]
    pub api_key: Option<String>,

    /// Per-attempt request timeout in milliseconds (1-3600000)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..=3_600_000))]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations exposed on the command line.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Probe server connectivity
    Health,
    /// Show server status
    Status,
    /// List available models
    Models,
    /// List available glossaries
    Glossaries,
    /// Upload a local file for translation
    Upload {
        /// File to upload
        path: PathBuf,
    },
    /// Start a translation and wait for the result
    Translate(TranslateArgs),
    /// Show the status of a task
    Task {
        /// Task identifier
        id: String,
    },
    /// Cancel a task
    Cancel {
        /// Task identifier
        id: String,
    },
    /// Download a finished task's output
    Download {
        /// Task identifier
        id: String,
        /// Where to write the output
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Arguments of the `translate` command.
#[derive(ClapArgs, Debug)]
pub struct TranslateArgs {
    /// Inline text to translate
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub text: Option<String>,

    /// Local file to upload and translate
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Model name on the server
    #[arg(short, long)]
    pub model: Option<String>,

    /// Glossary name on the server
    #[arg(short, long)]
    pub glossary: Option<String>,

    /// Prompt preset
    #[arg(long)]
    pub preset: Option<String>,

    /// Follow the live event stream instead of polling
    #[arg(long)]
    pub follow: bool,
}
