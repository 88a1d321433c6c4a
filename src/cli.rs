//! CLI definitions for domsift.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// domsift CLI.
#[derive(Parser)]
#[command(name = "domsift")]
#[command(about = "Compact, identifier-stable digests of DOM snapshots")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.domsift/config.toml)
    #[arg(short, long, global = true, env = "DOMSIFT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Print the digest of a snapshot file
    Digest {
        /// Snapshot JSON file
        snapshot: PathBuf,

        /// Options: [all|onscreen] [position]. Overrides the config file.
        words: Vec<String>,

        /// Write the annotated snapshot to this path
        #[arg(long, conflicts_with = "in_place")]
        write_back: Option<PathBuf>,

        /// Overwrite the input snapshot with the annotated document
        #[arg(long)]
        in_place: bool,

        /// Maximum characters per text node
        #[arg(long)]
        text_limit: Option<usize>,
    },

    /// Validate the configuration file
    Validate,
}
