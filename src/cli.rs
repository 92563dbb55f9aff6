//! Command-line interface for podscribe
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Podcast episode transcription via chunked speech-to-text API calls
#[derive(Parser, Debug)]
#[command(
    name = "podscribe",
    version,
    about = "Transcribe podcast episodes from RSS feeds"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: pipeline info, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Transcription model (default: whisper-1)
    #[arg(long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Language code hint for transcription (e.g. en, no, de)
    #[arg(long, global = true, value_name = "LANG")]
    pub language: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List episodes with audio enclosures from an RSS feed
    Episodes {
        /// RSS feed URL
        feed_url: String,

        /// Show every episode instead of the first ten
        #[arg(long)]
        all: bool,
    },

    /// Download and transcribe an episode from an RSS feed
    Transcribe {
        /// RSS feed URL
        feed_url: String,

        /// Episode index (0 = most recent)
        #[arg(short, long, value_name = "N", default_value_t = 0)]
        episode: usize,

        /// Directory for the .txt and .srt output files (default: current)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Transcribe a local audio file
    File {
        /// Path to the audio file (wav, mp3, m4a, ...)
        audio: PathBuf,

        /// Directory for the .txt and .srt output files (default: current)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
}
